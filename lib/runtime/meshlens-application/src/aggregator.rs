//! Concurrent detail + validations fan-out with an all-or-nothing merge.
//!
//! The detail lookup runs on the calling task. When validations are requested
//! a single task is spawned for them and its handle is awaited on every path
//! before [`ConcurrentAggregator::aggregate`] returns. Both branches share one
//! [`CancellationToken`]: the first branch to fail cancels it so the other
//! can stop at its next await point. Dropping the `aggregate` future cancels
//! the token and aborts the validation task.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;

use meshlens_domain::{
    CollaboratorError, RateInterval, ServiceDetails, ServiceError, ValidationSet,
};
use meshlens_ports::{PortSet, ServicePort, ValidationsPort};

use crate::request::RequestContext;

/// Merged detail, or the single error that made the merge fail.
pub type AggregationOutcome = Result<ServiceDetails, ServiceError>;

#[derive(Debug)]
enum BranchError {
    Failed(CollaboratorError),
    Cancelled,
}

type BranchResult<T> = Result<T, BranchError>;

#[derive(Clone)]
pub struct ConcurrentAggregator {
    services: Arc<dyn ServicePort>,
    validations: Arc<dyn ValidationsPort>,
}

impl ConcurrentAggregator {
    pub fn new(services: Arc<dyn ServicePort>, validations: Arc<dyn ValidationsPort>) -> Self {
        Self {
            services,
            validations,
        }
    }

    pub fn from_ports(ports: &PortSet) -> Self {
        Self::new(Arc::clone(&ports.services), Arc::clone(&ports.validations))
    }

    pub async fn aggregate(&self, ctx: &RequestContext, interval: &RateInterval) -> AggregationOutcome {
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let validation_task = ctx
            .include_validations
            .then(|| self.spawn_validations(ctx, cancel.clone()));

        let detail = self.fetch_detail(ctx, interval, &cancel).await;

        let validations = match validation_task {
            Some(handle) => Some(join_validations(handle).await),
            None => None,
        };

        merge(detail, validations)
    }

    async fn fetch_detail(
        &self,
        ctx: &RequestContext,
        interval: &RateInterval,
        cancel: &CancellationToken,
    ) -> BranchResult<ServiceDetails> {
        let lookup = self.services.get_service(
            &ctx.namespace,
            &ctx.service,
            &interval.expression,
            ctx.now,
        );
        let result = tokio::select! {
            biased;
            result = lookup => result,
            _ = cancel.cancelled() => return Err(BranchError::Cancelled),
        };
        result.map_err(|err| {
            cancel.cancel();
            BranchError::Failed(err)
        })
    }

    fn spawn_validations(
        &self,
        ctx: &RequestContext,
        cancel: CancellationToken,
    ) -> AbortOnDropHandle<BranchResult<ValidationSet>> {
        let port = Arc::clone(&self.validations);
        let namespace = ctx.namespace.clone();
        let service = ctx.service.clone();
        AbortOnDropHandle::new(tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(BranchError::Cancelled),
                result = port.get_validations(&namespace, &service) => result,
            };
            result.map_err(|err| {
                cancel.cancel();
                BranchError::Failed(err)
            })
        }))
    }
}

async fn join_validations(
    handle: AbortOnDropHandle<BranchResult<ValidationSet>>,
) -> BranchResult<ValidationSet> {
    match handle.await {
        Ok(result) => result,
        Err(err) => Err(BranchError::Failed(CollaboratorError::internal(format!(
            "validation task did not complete: {err}"
        )))),
    }
}

fn merge(
    detail: BranchResult<ServiceDetails>,
    validations: Option<BranchResult<ValidationSet>>,
) -> AggregationOutcome {
    match (detail, validations) {
        (Err(BranchError::Failed(err)), _) => Err(ServiceError::EntityLookup(err)),
        (Err(BranchError::Cancelled), Some(Err(BranchError::Failed(err)))) => {
            Err(ServiceError::ValidationFetch(err))
        }
        (Err(BranchError::Cancelled), _) => Err(ServiceError::EntityLookup(
            CollaboratorError::internal("service lookup cancelled"),
        )),
        (Ok(_), Some(Err(BranchError::Failed(err)))) => Err(ServiceError::ValidationFetch(err)),
        (Ok(_), Some(Err(BranchError::Cancelled))) => Err(ServiceError::ValidationFetch(
            CollaboratorError::internal("validation lookup cancelled"),
        )),
        (Ok(mut details), Some(Ok(validations))) => {
            details.validations = Some(validations);
            Ok(details)
        }
        (Ok(mut details), None) => {
            details.validations = None;
            Ok(details)
        }
    }
}
