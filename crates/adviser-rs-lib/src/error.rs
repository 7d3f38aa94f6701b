//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Failures surfacing from the library.
///
/// `Solver` wraps problems originating in the candidate database and is
/// expected to be caught at the workflow boundary and turned into a reported
/// result. `Internal` marks a broken invariant and must propagate to the
/// outermost caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("bincode error: {0}")]
	Bincode(#[from] bincode::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("solver error: {0}")]
	Solver(#[from] crate::packagedb::SolverError),
	#[error("internal error: {0}")]
	Internal(String),
}

impl Error {
	/// Short name of the error class, used in reported justifications.
	pub fn kind(&self) -> &'static str {
		match self {
			Error::IO(_) => "IOError",
			Error::SerdeJSON(_) => "JSONError",
			Error::Bincode(_) => "BincodeError",
			Error::Parse(_) => "ParseError",
			Error::Solver(_) => "SolverError",
			Error::Internal(_) => "InternalError",
		}
	}
}
