pub mod assemble;
pub mod core;
pub mod export;
pub mod extract;
pub mod normalize;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;

pub use core::model::{AddressParts, FieldKey, FieldRecord, OcrCandidate, PropertyRecord};
pub use pipeline::{Extraction, PipelineConfig, Profile};
