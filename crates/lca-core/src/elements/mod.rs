//! Raw element records and their canonical form.

mod normalize;
mod raw;

pub use normalize::{GuidSource, NormalizedElement, normalize_batch, normalize_element};
pub use raw::{RawClassification, RawElement, RawMaterial, parse_element_batch};
