pub mod json_export;
pub mod sql_export;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::model::PropertyRecord;

pub use json_export::JsonExporter;
pub use sql_export::SqlExporter;

pub trait Exporter {
    fn render(&self, record: &PropertyRecord) -> Result<String>;

    fn export(&self, record: &PropertyRecord, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = self.render(record)?;
        fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
