pub mod patterns;
pub mod synonyms;

use tracing::debug;

use crate::core::model::FieldRecord;

pub use patterns::{FieldRule, PatternTable};

/// Pulls raw field strings out of recognized listing text.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    table: PatternTable,
}

impl FieldExtractor {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn extract(&self, text: &str) -> FieldRecord {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let flat = lines.join(" ");

        let mut record = FieldRecord::new();

        for rule in self.table.rules() {
            if let Some(value) = rule.first_match(&flat) {
                debug!(field = rule.key.label(), value = %value, "pattern match");
                record.insert_if_absent(rule.key, value);
            }
        }

        for line in &lines {
            let Some((key, value)) = split_key_value(line) else {
                continue;
            };
            let Some(field) = synonyms::canonical_field(key) else {
                continue;
            };
            if !value.is_empty() && record.insert_if_absent(field, value) {
                debug!(field = field.label(), value, "line-scan match");
            }
        }

        debug!(table = self.table.name(), fields = record.len(), "extraction finished");
        record
    }
}

/// Splits at the first full-width or ASCII colon.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    line.split_once(['：', ':'])
        .map(|(key, value)| (key.trim(), value.trim()))
}
