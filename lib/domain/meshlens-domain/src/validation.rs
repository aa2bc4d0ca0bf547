use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCheck {
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectValidation {
    pub name: String,
    pub object_type: String,
    pub valid: bool,
    #[serde(default)]
    pub checks: Vec<ValidationCheck>,
}

impl ObjectValidation {
    pub fn new(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            valid: true,
            checks: Vec::new(),
        }
    }

    pub fn with_check(mut self, check: ValidationCheck) -> Self {
        if check.severity == Severity::Error {
            self.valid = false;
        }
        self.checks.push(check);
        self
    }
}

/// Validation findings keyed by object type, then object name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationSet(BTreeMap<String, BTreeMap<String, ObjectValidation>>);

impl ValidationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, validation: ObjectValidation) {
        self.0
            .entry(validation.object_type.clone())
            .or_default()
            .insert(validation.name.clone(), validation);
    }

    pub fn get(&self, object_type: &str, name: &str) -> Option<&ObjectValidation> {
        self.0.get(object_type).and_then(|by_name| by_name.get(name))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectValidation> {
        self.0.values().flat_map(BTreeMap::values)
    }
}

impl FromIterator<ObjectValidation> for ValidationSet {
    fn from_iter<I: IntoIterator<Item = ObjectValidation>>(iter: I) -> Self {
        let mut set = Self::new();
        for validation in iter {
            set.insert(validation);
        }
        set
    }
}
