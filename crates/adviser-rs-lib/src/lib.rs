//! Recommendation and enumeration of valid software dependency stacks.
//!
//! The library is built around two drivers sharing one candidate database:
//!
//! - [`resolver::Resolver`] runs a bounded best-first search over partially
//!   resolved stacks, scored and filtered by a [`pipeline::Pipeline`] of
//!   pluggable units.
//! - [`dependency_graph::DependencyGraphWalker`] enumerates the entire
//!   constraint-satisfying version space for external inspection.

pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::AdviserOptions;

pub mod packagedb;
pub use packagedb::PackageDb;

pub mod project;
pub use project::Project;

pub mod pipeline;
pub mod resolver;
pub mod dependency_graph;
pub mod report;
