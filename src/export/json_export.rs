use anyhow::Result;

use crate::core::model::PropertyRecord;
use crate::export::Exporter;

#[derive(Debug, Clone, Default)]
pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for JsonExporter {
    fn render(&self, record: &PropertyRecord) -> Result<String> {
        Ok(serde_json::to_string_pretty(record)?)
    }
}
