//! Format conversion
//!
//! # Module Structure
//!
//! - `single`: one-file conversion with eager format validation
//! - `batch`: fan-out over many requests with per-item isolation

pub mod batch;
pub mod single;

pub use batch::{convert_all, ConversionRequest, ConversionResult};
pub use single::{FileConverter, DEFAULT_OUTPUT_DIR};
