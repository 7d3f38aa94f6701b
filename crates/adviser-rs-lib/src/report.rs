//! Result envelope produced by the workflows wrapping the core.

use serde::Serialize;

use crate::project::{Lockfile, Project};
use crate::resolver::state::JustificationEntry;

/// Locked output of a successful advise run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviseOutput {
	pub requirements: Project,
	pub requirements_locked: Lockfile,
}

/// The envelope serialized at the workflow boundary.
#[derive(Debug, Serialize)]
pub struct ResultEnvelope {
	pub error: bool,
	pub report: Vec<JustificationEntry>,
	pub parameters: serde_json::Value,
	pub input: Option<serde_json::Value>,
	pub output: Option<AdviseOutput>,
}

impl ResultEnvelope {
	pub fn new(parameters: serde_json::Value) -> Self {
		Self {
			error: false,
			report: Vec::new(),
			parameters,
			input: None,
			output: None,
		}
	}

	/// Envelope for a failure caught at the workflow boundary: one ERROR
	/// entry carrying the error class name and message.
	pub fn from_error(parameters: serde_json::Value, error: &crate::Error) -> Self {
		Self {
			error: true,
			report: vec![JustificationEntry::error(format!("{} ({})", error, error.kind()))],
			parameters,
			input: None,
			output: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_envelope_names_the_error_class() {
		let error = crate::Error::Solver(crate::packagedb::SolverError::UnknownPackage("ghost".to_string()));
		let envelope = ResultEnvelope::from_error(serde_json::json!({}), &error);
		assert!(envelope.error);
		assert_eq!(envelope.report.len(), 1);
		assert!(envelope.report[0].message.contains("SolverError"));
		assert!(envelope.report[0].message.contains("ghost"));
	}
}
