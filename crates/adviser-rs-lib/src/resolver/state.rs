use std::collections::{BTreeMap, VecDeque};

use serde::{Serialize, Deserialize};

use crate::packagedb::{PackageVersion, VersionSpecifier};
use crate::project::{LockedPackage, Lockfile, Requirement};

/// Category of a justification entry.
///
/// The derived order (INFO < WARNING < ERROR < LATEST) is the sort key used
/// by justification sorting wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JustificationType {
	Info,
	Warning,
	Error,
	Latest,
}

/// One piece of evidence attached to a state or a run report.
///
/// Entries are kept in insertion order and duplicates are legal; repeated
/// evidence is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationEntry {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub package_name: Option<String>,
	#[serde(rename = "type")]
	pub entry_type: JustificationType,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
}

impl JustificationEntry {
	pub fn error(message: impl Into<String>) -> Self {
		Self {
			package_name: None,
			entry_type: JustificationType::Error,
			message: message.into(),
			link: None,
		}
	}

	pub fn warning(message: impl Into<String>) -> Self {
		Self {
			package_name: None,
			entry_type: JustificationType::Warning,
			message: message.into(),
			link: None,
		}
	}
}

/// A package pinned to one concrete version from one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedPackage {
	pub name: String,
	pub version: PackageVersion,
	pub index_url: String,
}

/// One point in the search space: a partially or fully resolved stack.
///
/// A state is complete iff `unresolved` is empty. States are cloned on every
/// expansion so sibling branches never observe each other's mutations.
#[derive(Debug, Clone, Serialize)]
pub struct State {
	resolved: BTreeMap<String, PinnedPackage>,
	unresolved: VecDeque<String>,
	constraints: BTreeMap<String, VersionSpecifier>,
	score: f64,
	justification: Vec<JustificationEntry>,
}

impl State {
	/// Root state of a search: nothing resolved, the direct requirements
	/// queued in declaration order. A package required twice gets the
	/// intersection of both specifiers.
	pub fn from_requirements(requirements: &[Requirement]) -> Self {
		let mut unresolved = VecDeque::new();
		let mut constraints: BTreeMap<String, VersionSpecifier> = BTreeMap::new();

		for requirement in requirements {
			match constraints.get_mut(&requirement.name) {
				Some(existing) => *existing = existing.intersect(&requirement.specifier),
				None => {
					constraints.insert(requirement.name.clone(), requirement.specifier.clone());
					unresolved.push_back(requirement.name.clone());
				}
			}
		}

		State {
			resolved: BTreeMap::new(),
			unresolved,
			constraints,
			score: 0.0,
			justification: Vec::new(),
		}
	}

	pub fn is_complete(&self) -> bool {
		self.unresolved.is_empty()
	}

	pub fn resolved(&self) -> &BTreeMap<String, PinnedPackage> {
		&self.resolved
	}

	pub fn unresolved(&self) -> &VecDeque<String> {
		&self.unresolved
	}

	/// The merged specifier recorded for a package, direct or transitive.
	///
	/// Entries are kept after the package is pinned so a finished stack can
	/// be checked against the constraints that produced it.
	pub fn constraint_for(&self, package_name: &str) -> Option<&VersionSpecifier> {
		self.constraints.get(package_name)
	}

	pub fn score(&self) -> f64 {
		self.score
	}

	pub(crate) fn add_score(&mut self, delta: f64) {
		self.score += delta;
	}

	pub fn justification(&self) -> &[JustificationEntry] {
		&self.justification
	}

	pub fn add_justification(&mut self, entry: JustificationEntry) {
		self.justification.push(entry);
	}

	/// Mutable access for wraps post-processing an accepted state.
	pub fn justification_mut(&mut self) -> &mut Vec<JustificationEntry> {
		&mut self.justification
	}

	/// Pop the next package to expand, in queue insertion order.
	pub(crate) fn take_next_unresolved(&mut self) -> Option<String> {
		self.unresolved.pop_front()
	}

	/// Assign a version to a package and queue its newly introduced
	/// dependencies.
	///
	/// Returns `false` when a dependency of the pinned release contradicts a
	/// version already resolved in this state; the branch is then dead and
	/// the caller discards the state.
	pub(crate) fn pin(&mut self, pinned: PinnedPackage, dependencies: &[Requirement]) -> bool {
		for dependency in dependencies {
			if let Some(existing) = self.resolved.get(&dependency.name) {
				if !dependency.specifier.matches(&existing.version) {
					return false;
				}
				continue;
			}

			match self.constraints.get_mut(&dependency.name) {
				Some(existing) => *existing = existing.intersect(&dependency.specifier),
				None => {
					self.constraints.insert(dependency.name.clone(), dependency.specifier.clone());
				}
			}

			if !self.unresolved.contains(&dependency.name) {
				self.unresolved.push_back(dependency.name.clone());
			}
		}

		self.resolved.insert(pinned.name.clone(), pinned);
		true
	}

	pub fn to_lockfile(&self) -> Lockfile {
		let packages = self.resolved.values()
			.map(|p| (p.name.clone(), LockedPackage {
				version: p.version.clone(),
				index_url: p.index_url.clone(),
				hashes: Vec::new(),
			}))
			.collect();
		Lockfile { packages }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::packagedb::VersionSpecifier;

	fn requirement(name: &str, specifier: &str) -> Requirement {
		Requirement::new(name, VersionSpecifier::parse(specifier).expect("valid specifier"))
	}

	fn pinned(name: &str, version: &str) -> PinnedPackage {
		PinnedPackage {
			name: name.to_string(),
			version: PackageVersion::new(version).expect("valid version"),
			index_url: "https://pypi.org/simple".to_string(),
		}
	}

	#[test]
	fn root_state_queues_requirements_in_order() {
		let state = State::from_requirements(&[
			requirement("b", ">=1"),
			requirement("a", "*"),
		]);
		assert!(!state.is_complete());
		assert_eq!(state.unresolved().iter().collect::<Vec<_>>(), ["b", "a"]);
	}

	#[test]
	fn duplicate_requirement_intersects() {
		let state = State::from_requirements(&[
			requirement("a", ">=1"),
			requirement("a", "<3"),
		]);
		assert_eq!(state.unresolved().len(), 1);
		let merged = state.constraint_for("a").expect("constraint recorded");
		assert!(merged.matches(&PackageVersion::new("2").expect("valid version")));
		assert!(!merged.matches(&PackageVersion::new("3").expect("valid version")));
	}

	#[test]
	fn pin_queues_new_dependencies_once() {
		let mut state = State::from_requirements(&[requirement("a", "*")]);
		state.take_next_unresolved();
		assert!(state.pin(pinned("a", "1.0"), &[requirement("b", ">=1"), requirement("b", "<2")]));
		assert_eq!(state.unresolved().iter().collect::<Vec<_>>(), ["b"]);
		assert!(state.resolved().contains_key("a"));
	}

	#[test]
	fn pin_rejects_contradiction_with_resolved() {
		let mut state = State::from_requirements(&[requirement("a", "*")]);
		state.take_next_unresolved();
		assert!(state.pin(pinned("a", "1.0"), &[]));
		assert!(!state.pin(pinned("b", "1.0"), &[requirement("a", ">=2")]));
	}

	#[test]
	fn clone_branches_are_independent() {
		let mut parent = State::from_requirements(&[requirement("a", "*")]);
		let mut child = parent.clone();
		child.take_next_unresolved();
		child.pin(pinned("a", "1.0"), &[]);
		child.add_score(1.5);

		assert!(parent.resolved().is_empty());
		assert_eq!(parent.score(), 0.0);
		assert_eq!(parent.take_next_unresolved().as_deref(), Some("a"));
	}

	#[test]
	fn lockfile_from_complete_state() {
		let mut state = State::from_requirements(&[requirement("a", "*")]);
		state.take_next_unresolved();
		state.pin(pinned("a", "1.0"), &[]);
		let lockfile = state.to_lockfile();
		assert_eq!(lockfile.packages["a"].version, PackageVersion::new("1.0").expect("valid version"));
		assert!(lockfile.packages["a"].hashes.is_empty());
	}
}
