//! Built-in pipeline units, one or two worked examples per category.

pub mod boots;
pub mod sieves;
pub mod steps;
pub mod strides;
pub mod wraps;
