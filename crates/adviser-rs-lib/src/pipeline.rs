//! Pluggable policy pipeline: unit contract, assembly and built-in units.
//!
//! A pipeline is assembled once per run from inclusion factories consulting
//! a shared [`PipelineBuilderContext`], then consumed read-only by the
//! resolver: boots once up front, sieves/steps per expansion, strides on
//! complete states and wraps on accepted ones, each category in declaration
//! order.

pub mod unit;
pub use unit::{Boot, Sieve, Step, Stride, Wrap};
pub use unit::{NotAcceptable, StepReport};

pub mod builder;
pub use builder::{Pipeline, PipelineBuilder, PipelineBuilderContext, PipelineKind, PipelineSummary};

pub mod units;
