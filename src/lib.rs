//! Box-office report extraction pipeline: per-exhibitor line-classification
//! state machines, field normalization, screen-count estimation, four-bucket
//! aggregation and append-only workbook output.

pub mod aggregate;
pub mod document;
pub mod extract;
pub mod identify;
pub mod normalize;
pub mod pipeline;
pub mod reference;
pub mod rows;
pub mod workbook;
