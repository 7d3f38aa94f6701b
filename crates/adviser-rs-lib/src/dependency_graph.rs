//! Exhaustive, decision-filtered enumeration of the version combination
//! space.
//!
//! Unlike the resolver this walker consults no pipeline units and keeps no
//! scores; its purpose is generation, not ranking. Combinations are produced
//! lazily: each call to [`Iterator::next`] advances the depth-first
//! traversal, there is no replay of already consumed output.

use std::collections::{BTreeMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::packagedb::{Candidate, PackageDb, SolverError, VersionSpecifier};
use crate::project::{Lockfile, LockedPackage, Project, Requirement};
use crate::resolver::state::PinnedPackage;

/// A fully pinned version combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinnedStack {
	pub packages: BTreeMap<String, PinnedPackage>,
}

impl PinnedStack {
	pub fn to_lockfile(&self) -> Lockfile {
		let packages = self.packages.values()
			.map(|p| (p.name.clone(), LockedPackage {
				version: p.version.clone(),
				index_url: p.index_url.clone(),
				hashes: Vec::new(),
			}))
			.collect();
		Lockfile { packages }
	}
}

/// Filter applied to every complete combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPolicy {
	/// Accept every combination.
	All,
	/// Accept roughly one in `n` combinations, sampled with the seeded RNG.
	OneIn(u32),
	/// Accept only the first combination seen.
	First,
}

impl std::str::FromStr for DecisionPolicy {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"all" => Ok(DecisionPolicy::All),
			"first" => Ok(DecisionPolicy::First),
			_ => {
				if let Some(n) = s.strip_prefix("one-in-") {
					let n = n.parse::<u32>()
						.map_err(|_| crate::Error::Parse(format!("invalid decision {:?}", s)))?;
					if n == 0 {
						return Err(crate::Error::Parse("one-in-0 never accepts anything".to_string()));
					}
					return Ok(DecisionPolicy::OneIn(n));
				}
				Err(crate::Error::Parse(format!("unknown decision {:?}", s)))
			}
		}
	}
}

#[derive(Debug)]
struct DecisionFunction {
	policy: DecisionPolicy,
	rng: StdRng,
	considered: u64,
}

impl DecisionFunction {
	fn new(policy: DecisionPolicy, seed: Option<u64>) -> Self {
		Self {
			policy,
			rng: match seed {
				Some(seed) => StdRng::seed_from_u64(seed),
				None => StdRng::from_entropy(),
			},
			considered: 0,
		}
	}

	fn accept(&mut self, _stack: &PinnedStack) -> bool {
		self.considered += 1;
		match self.policy {
			DecisionPolicy::All => true,
			DecisionPolicy::First => self.considered == 1,
			DecisionPolicy::OneIn(n) => self.rng.gen_range(0..n) == 0,
		}
	}
}

/// One level of the depth-first traversal: the package assigned at this
/// depth, its remaining candidate versions and the pending-work snapshot to
/// restore before every attempt.
#[derive(Debug)]
struct Frame {
	name: String,
	candidates: Vec<Candidate>,
	next: usize,
	saved_unresolved: VecDeque<String>,
	saved_constraints: BTreeMap<String, VersionSpecifier>,
}

/// Depth-first enumerator over all constraint-satisfying combinations.
#[derive(Debug)]
pub struct DependencyGraphWalker<'a> {
	db: &'a PackageDb,
	frames: Vec<Frame>,
	resolved: BTreeMap<String, PinnedPackage>,
	unresolved: VecDeque<String>,
	constraints: BTreeMap<String, VersionSpecifier>,
	decision: DecisionFunction,
	remaining: Option<usize>,
	done: bool,
}

impl<'a> DependencyGraphWalker<'a> {
	pub fn new(db: &'a PackageDb, project: &Project) -> Self {
		let mut unresolved = VecDeque::new();
		let mut constraints: BTreeMap<String, VersionSpecifier> = BTreeMap::new();
		for requirement in &project.requirements {
			match constraints.get_mut(&requirement.name) {
				Some(existing) => *existing = existing.intersect(&requirement.specifier),
				None => {
					constraints.insert(requirement.name.clone(), requirement.specifier.clone());
					unresolved.push_back(requirement.name.clone());
				}
			}
		}

		Self {
			db,
			frames: Vec::new(),
			resolved: BTreeMap::new(),
			unresolved,
			constraints,
			decision: DecisionFunction::new(DecisionPolicy::All, None),
			remaining: None,
			done: false,
		}
	}

	pub fn decision(mut self, policy: DecisionPolicy) -> Self {
		self.decision.policy = policy;
		self
	}

	/// Fix randomized sampling so runs are reproducible.
	pub fn seed(mut self, seed: u64) -> Self {
		self.decision.rng = StdRng::seed_from_u64(seed);
		self
	}

	/// Stop after this many accepted combinations.
	pub fn count(mut self, count: usize) -> Self {
		self.remaining = Some(count);
		self
	}

	/// Pin the next candidate of the top frame, backtracking through
	/// exhausted frames. Returns whether an assignment was made; `false`
	/// means the whole space is exhausted.
	fn advance(&mut self) -> crate::Result<bool> {
		'frames: loop {
			if self.frames.is_empty() {
				return Ok(false);
			}
			let index = self.frames.len() - 1;
			let name = self.frames[index].name.clone();
			self.resolved.remove(&name);

			loop {
				let candidate = {
					let frame = &mut self.frames[index];
					if frame.next >= frame.candidates.len() {
						break;
					}
					let candidate = frame.candidates[frame.next].clone();
					frame.next += 1;
					candidate
				};

				/* Every attempt starts from the snapshot taken when this
				 * level was entered; a failed sibling's constraint merges
				 * must not leak into the next attempt. */
				self.unresolved = self.frames[index].saved_unresolved.clone();
				self.constraints = self.frames[index].saved_constraints.clone();

				if self.apply(&name, &candidate)? {
					return Ok(true);
				}
			}

			self.frames.pop();
			continue 'frames;
		}
	}

	/// Try to pin `candidate` for `name`: check its dependencies against
	/// already pinned packages and queue the new ones.
	fn apply(&mut self, name: &str, candidate: &Candidate) -> crate::Result<bool> {
		let dependencies = self.db.get_dependencies(name, &candidate.version)
			.map_err(|e| crate::Error::Internal(format!("candidate without a release record: {}", e)))?;

		for dependency in dependencies {
			if let Some(existing) = self.resolved.get(&dependency.name) {
				if !dependency.specifier.matches(&existing.version) {
					return Ok(false);
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

		self.resolved.insert(name.to_string(), PinnedPackage {
			name: name.to_string(),
			version: candidate.version.clone(),
			index_url: candidate.index_url.clone(),
		});
		Ok(true)
	}
}

impl Iterator for DependencyGraphWalker<'_> {
	type Item = crate::Result<PinnedStack>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		if self.remaining == Some(0) {
			self.done = true;
			return None;
		}

		loop {
			/* Descend until every required package is pinned. */
			while let Some(name) = self.unresolved.pop_front() {
				let specifier = self.constraints.get(&name).cloned().unwrap_or_default();
				let candidates = match self.db.get_versions(&name, &specifier) {
					Ok(candidates) => candidates,
					Err(error) => {
						self.done = true;
						return Some(Err(error.into()));
					}
				};
				self.frames.push(Frame {
					name,
					candidates,
					next: 0,
					saved_unresolved: self.unresolved.clone(),
					saved_constraints: self.constraints.clone(),
				});

				match self.advance() {
					Ok(true) => {}
					Ok(false) => {
						self.done = true;
						return None;
					}
					Err(error) => {
						self.done = true;
						return Some(Err(error));
					}
				}
			}

			let stack = PinnedStack { packages: self.resolved.clone() };
			let accepted = self.decision.accept(&stack);

			/* Advance the odometer before yielding so the next call resumes
			 * from the following combination. */
			match self.advance() {
				Ok(true) => {}
				Ok(false) => self.done = true,
				Err(error) => {
					self.done = true;
					return Some(Err(error));
				}
			}

			if accepted {
				if let Some(remaining) = self.remaining.as_mut() {
					*remaining -= 1;
					if *remaining == 0 {
						self.done = true;
					}
				}
				return Some(Ok(stack));
			}
			if self.done {
				return None;
			}
		}
	}
}

/// Upper bound on the number of combinations the walker can produce:
/// the product of known version counts over the reachable package closure.
pub fn estimate_stacks(db: &PackageDb, project: &Project) -> Result<u128, SolverError> {
	let mut queue: VecDeque<&str> = project.requirements.iter().map(|r| r.name.as_str()).collect();
	let mut visited: Vec<&str> = Vec::new();
	let mut estimate: u128 = 1;

	while let Some(name) = queue.pop_front() {
		if visited.contains(&name) {
			continue;
		}
		visited.push(name);

		let releases = db.releases(name)
			.ok_or_else(|| SolverError::UnknownPackage(name.to_string()))?;
		estimate = estimate.saturating_mul(releases.len() as u128);

		for release in releases {
			for dependency in &release.dependencies {
				queue.push_back(dependency.name.as_str());
			}
		}
	}

	Ok(estimate)
}
