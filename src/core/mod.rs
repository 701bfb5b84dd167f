pub mod japanese;
pub mod model;
pub mod scoring;
