use std::collections::BTreeMap;

use crate::{EnrichedFields, EnrichmentResult, Field, FieldNames, Outcome};

/// Accessor over the owning form's field storage.
pub trait FormState {
    fn get_field(&self, name: &str) -> Option<&str>;
    fn set_field(&mut self, name: &str, value: String);
}

/// Plain in-memory field set, used by the terminal harness and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormRecord {
    fields: BTreeMap<String, String>,
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FormState for FormRecord {
    fn get_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn set_field(&mut self, name: &str, value: String) {
        self.fields.insert(name.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub populated: Vec<Field>,
}

impl MergeReport {
    pub fn populated_count(&self) -> usize {
        self.populated.len()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Copy fetched values into fields that are currently blank. Fields that
/// already hold a value are never touched. Image values, including
/// `MANUAL_EXTRACT:` ones, are written verbatim.
pub fn merge_fields(
    fields: &EnrichedFields,
    target: &mut dyn FormState,
    names: &FieldNames,
) -> MergeReport {
    let mut report = MergeReport::default();
    for (field, value) in fields.present() {
        let name = names.name_of(field);
        if is_blank(target.get_field(name)) {
            target.set_field(name, value.to_string());
            report.populated.push(field);
        }
    }
    report
}

/// Merge a settled result and classify it for reporting.
pub fn apply_result(
    result: &EnrichmentResult,
    target: &mut dyn FormState,
    names: &FieldNames,
) -> Outcome {
    if !result.success {
        return Outcome::ServerError(result.message.clone());
    }
    if result.fields.is_empty() {
        return Outcome::EmptyResult;
    }
    let report = merge_fields(&result.fields, target, names);
    match report.populated_count() {
        0 => Outcome::NoOpMerge,
        count => Outcome::PartialMerge(count),
    }
}
