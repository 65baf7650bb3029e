//! Core types, filter design, and the resampling loop.

pub mod filter;
pub mod resample;
pub mod types;
pub mod window;

pub use filter::FilterTable;
pub use resample::Resampler;
pub use types::*;
