//! The two logical documents the core operates on: an unlocked requirements
//! document ([`Project`]) and a locked one ([`Lockfile`]). Both are
//! structured in-memory representations; reading and writing files is left
//! to the surrounding tooling.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::packagedb::{PackageVersion, VersionSpecifier};

/// A single declared dependency, e.g. `flask >=2,<3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
	pub name: String,
	#[serde(default)]
	pub specifier: VersionSpecifier,
}

impl Requirement {
	pub fn new(name: impl Into<String>, specifier: VersionSpecifier) -> Self {
		Self { name: name.into(), specifier }
	}
}

/// Description of the environment a recommended stack should run in.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEnvironment {
	#[serde(default)]
	pub os_name: Option<String>,
	#[serde(default)]
	pub os_version: Option<String>,
	#[serde(default)]
	pub python_version: Option<String>,
}

impl RuntimeEnvironment {
	pub fn is_fully_specified(&self) -> bool {
		self.os_name.is_some() && self.os_version.is_some() && self.python_version.is_some()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
	Stable,
	Testing,
	Latest,
}

impl std::str::FromStr for RecommendationType {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"stable" => Ok(RecommendationType::Stable),
			"testing" => Ok(RecommendationType::Testing),
			"latest" => Ok(RecommendationType::Latest),
			_ => Err(crate::Error::Parse(format!("unknown recommendation type {:?}", s))),
		}
	}
}

impl std::fmt::Display for RecommendationType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			RecommendationType::Stable => "stable",
			RecommendationType::Testing => "testing",
			RecommendationType::Latest => "latest",
		};
		write!(f, "{}", s)
	}
}

/// The unlocked requirements document resolution starts from.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
	pub requirements: Vec<Requirement>,
	#[serde(default)]
	pub runtime_environment: RuntimeEnvironment,
	#[serde(default)]
	pub allow_prereleases: bool,
}

impl Project {
	pub fn from_json(input: &str) -> crate::Result<Self> {
		Ok(serde_json::from_str(input)?)
	}

	pub fn to_json(&self) -> crate::Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}
}

/// One exactly pinned package in a locked document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedPackage {
	pub version: PackageVersion,
	pub index_url: String,
	/// Content digests, filled by external index adapters, never by the core.
	#[serde(default)]
	pub hashes: Vec<String>,
}

/// The locked requirements document: every package pinned to one version.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lockfile {
	pub packages: BTreeMap<String, LockedPackage>,
}
