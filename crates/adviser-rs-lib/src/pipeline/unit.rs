//! The capability contract every pipeline stage implements.
//!
//! Pruning is expressed as data, not unwinding: a unit that wants to drop a
//! branch returns [`NotAcceptable`] through its result and the search loop
//! handles it like any other value. Anything a unit cannot express that way
//! is a bug and surfaces as [`crate::Error::Internal`] from the resolver.

use crate::packagedb::Candidate;
use crate::project::Project;
use crate::resolver::state::{JustificationEntry, PinnedPackage, State};

/// The expected, recoverable-by-pruning rejection signal.
///
/// From a boot it aborts the whole run (reported, not a crash); from a step
/// or stride it prunes exactly one branch or candidate stack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct NotAcceptable(pub String);

/// Score adjustment and evidence produced by a step for one expansion edge.
#[derive(Debug, Default)]
pub struct StepReport {
	pub score: f64,
	pub justification: Vec<JustificationEntry>,
}

/// Runs once before any search begins; used for whole-run preconditions.
pub trait Boot: std::fmt::Debug {
	fn name(&self) -> &'static str;
	fn run(&self, project: &Project) -> Result<(), NotAcceptable>;
}

/// Narrows candidate versions of one package before they become expansion
/// choices. Sieves never see resolver state.
pub trait Sieve: std::fmt::Debug {
	fn name(&self) -> &'static str;
	fn filter(&self, package_name: &str, candidates: Vec<Candidate>) -> Vec<Candidate>;
}

/// Scores or prunes a single expansion edge.
///
/// Called once per newly pinned package, with the child state already
/// carrying the pin. The first `NotAcceptable` from any step discards the
/// child; no partial score is kept.
pub trait Step: std::fmt::Debug {
	fn name(&self) -> &'static str;
	fn run(&self, state: &State, resolved: &PinnedPackage) -> Result<Option<StepReport>, NotAcceptable>;
}

/// The final gate before a complete state is accepted as an output.
pub trait Stride: std::fmt::Debug {
	fn name(&self) -> &'static str;
	fn run(&self, state: &State) -> Result<(), NotAcceptable>;
}

/// Post-processes an accepted state; cannot reject it.
pub trait Wrap: std::fmt::Debug {
	fn name(&self) -> &'static str;
	fn run(&self, state: &mut State);
}
