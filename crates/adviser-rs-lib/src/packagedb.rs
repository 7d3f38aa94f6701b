//! Snapshot of known package releases used as the candidate source.
//!
//! The database is immutable for the duration of one resolution run; both
//! the resolver and the dependency graph walker only read from it. Queries
//! are deterministic for a fixed snapshot: versions are kept sorted newest
//! first and ties keep insertion order.

use std::collections::HashMap;

use serde::{Serialize, Deserialize};

pub mod version;
pub use version::PackageVersion;
pub mod specifier;
pub use specifier::VersionSpecifier;

use crate::project::Requirement;

/// Failures originating from the candidate database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
	/// The package name is not present in the snapshot at all.
	#[error("package {0:?} is not known to the package database")]
	UnknownPackage(String),
	/// No known version satisfies the given specifier.
	#[error("no version of {package:?} satisfies {specifier}")]
	NoCompatibleVersion {
		package: String,
		specifier: String,
	},
}

/// One released version of a package together with its declared dependencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
	pub package_name: String,
	pub version: PackageVersion,
	pub index_url: String,
	pub dependencies: Vec<Requirement>,
}

/// A version choice offered for expansion, tagged with its index origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	pub version: PackageVersion,
	pub index_url: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PackageDb {
	packages: HashMap<String, Vec<Release>>,
}

impl PackageDb {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a release keeping the per package list sorted newest first.
	///
	/// Releases of the same version from different indexes are kept in
	/// insertion order.
	pub fn add_release(&mut self, release: Release) {
		let releases = self.packages.entry(release.package_name.clone()).or_default();
		let pos = releases.iter()
			.position(|r| r.version < release.version)
			.unwrap_or(releases.len());
		releases.insert(pos, release);
	}

	pub fn package_count(&self) -> usize {
		self.packages.len()
	}

	pub fn releases(&self, package_name: &str) -> Option<&[Release]> {
		self.packages.get(package_name).map(Vec::as_slice)
	}

	/// All versions of `package_name` matching `specifier`, newest first.
	///
	/// An unknown package is an error; a known package with no matching
	/// version yields an empty list so callers can decide whether that is a
	/// dead search branch or a hard failure.
	pub fn get_versions(&self, package_name: &str, specifier: &VersionSpecifier) -> Result<Vec<Candidate>, SolverError> {
		let releases = self.packages.get(package_name)
			.ok_or_else(|| SolverError::UnknownPackage(package_name.to_string()))?;

		Ok(releases.iter()
			.filter(|r| specifier.matches(&r.version))
			.map(|r| Candidate { version: r.version.clone(), index_url: r.index_url.clone() })
			.collect())
	}

	/// Declared dependencies of one concrete release.
	pub fn get_dependencies(&self, package_name: &str, version: &PackageVersion) -> Result<&[Requirement], SolverError> {
		let releases = self.packages.get(package_name)
			.ok_or_else(|| SolverError::UnknownPackage(package_name.to_string()))?;

		releases.iter()
			.find(|r| r.version == *version)
			.map(|r| r.dependencies.as_slice())
			.ok_or_else(|| SolverError::NoCompatibleVersion {
				package: package_name.to_string(),
				specifier: format!("=={}", version),
			})
	}

	pub fn save_to_disk(&self, options: &crate::AdviserOptions) -> crate::Result<()> {
		self.save_to_path(options.db_path())
	}

	pub fn save_to_path(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let file = std::fs::File::create(path)?;
		bincode::serialize_into(std::io::BufWriter::new(file), self)?;
		Ok(())
	}

	pub fn load_from_disk(options: &crate::AdviserOptions) -> crate::Result<Self> {
		Self::load_from_path(options.db_path())
	}

	pub fn load_from_path(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		let db = bincode::deserialize_from(std::io::BufReader::new(file))?;
		Ok(db)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn release(name: &str, version: &str) -> Release {
		Release {
			package_name: name.to_string(),
			version: PackageVersion::new(version).expect("test version should parse"),
			index_url: "https://pypi.org/simple".to_string(),
			dependencies: Vec::new(),
		}
	}

	#[test]
	fn versions_sorted_newest_first() {
		let mut db = PackageDb::new();
		db.add_release(release("a", "1.0"));
		db.add_release(release("a", "3.0"));
		db.add_release(release("a", "2.0"));

		let versions: Vec<String> = db.get_versions("a", &VersionSpecifier::any())
			.expect("package is known")
			.into_iter()
			.map(|c| c.version.to_string())
			.collect();
		assert_eq!(versions, ["3.0", "2.0", "1.0"]);
	}

	#[test]
	fn unknown_package_is_an_error() {
		let db = PackageDb::new();
		assert_eq!(
			db.get_versions("ghost", &VersionSpecifier::any()),
			Err(SolverError::UnknownPackage("ghost".to_string()))
		);
	}

	#[test]
	fn no_matching_version_is_empty_not_error() {
		let mut db = PackageDb::new();
		db.add_release(release("a", "1.0"));
		let candidates = db.get_versions("a", &VersionSpecifier::parse(">=2").expect("valid specifier"))
			.expect("package is known");
		assert!(candidates.is_empty());
	}

	#[test]
	fn same_version_keeps_insertion_order() {
		let mut db = PackageDb::new();
		let mut internal = release("a", "1.0");
		internal.index_url = "https://internal.example.com/simple".to_string();
		db.add_release(release("a", "1.0"));
		db.add_release(internal);

		let candidates = db.get_versions("a", &VersionSpecifier::any()).expect("package is known");
		assert_eq!(candidates[0].index_url, "https://pypi.org/simple");
		assert_eq!(candidates[1].index_url, "https://internal.example.com/simple");
	}
}
