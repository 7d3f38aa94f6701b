//! Bounded best-first search producing a ranked top-K of complete stacks.
//!
//! # Usage
//! 1. Assemble a [`crate::pipeline::Pipeline`] with a [`crate::pipeline::PipelineBuilder`].
//! 1. Create a [`Resolver`] over a [`crate::PackageDb`] snapshot and a [`crate::Project`].
//! 1. Adjust `beam_width`, `count` and budgets as needed.
//! 1. [`Resolver::resolve()`] to obtain a [`Resolution`] with the accepted
//!    states in acceptance order and any top-level report entries.

use std::collections::HashSet;

use crate::packagedb::{PackageDb, SolverError};
use crate::pipeline::{NotAcceptable, Pipeline};
use crate::project::Project;

pub mod state;
pub use state::{JustificationEntry, JustificationType, PinnedPackage, State};
mod beam;
use beam::Beam;

/// Outcome of one resolver run.
///
/// `stack_info` carries run-level report entries: a boot rejection, a
/// graceful budget stop, or candidate database inconsistencies found while
/// expanding.
#[derive(Debug)]
pub struct Resolution {
	pub states: Vec<State>,
	pub stack_info: Vec<JustificationEntry>,
	/// Number of states expanded before termination.
	pub expanded: usize,
}

pub struct Resolver<'a> {
	db: &'a PackageDb,
	project: &'a Project,
	pipeline: Pipeline,
	beam_width: usize,
	count: usize,
	expansion_budget: Option<usize>,
	deadline: Option<std::time::Instant>,
}

impl<'a> Resolver<'a> {
	pub fn new(db: &'a PackageDb, project: &'a Project, pipeline: Pipeline) -> Self {
		Self {
			db,
			project,
			pipeline,
			beam_width: crate::config::DEFAULT_BEAM_WIDTH,
			count: crate::config::DEFAULT_COUNT,
			expansion_budget: None,
			deadline: None,
		}
	}

	/// Maximum number of states retained between expansion rounds.
	pub fn beam_width(mut self, beam_width: usize) -> Self {
		self.beam_width = beam_width;
		self
	}

	/// Maximum number of accepted results to produce.
	pub fn count(mut self, count: usize) -> Self {
		self.count = count;
		self
	}

	/// Stop cleanly after expanding this many states.
	pub fn expansion_budget(mut self, budget: usize) -> Self {
		self.expansion_budget = Some(budget);
		self
	}

	/// Stop cleanly once this much wall-clock time has passed.
	pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
		self.deadline = Some(std::time::Instant::now() + timeout);
		self
	}

	/// Run the search to completion, budget expiry or `count` results.
	///
	/// A boot rejection yields an empty resolution with a single ERROR
	/// report entry. Unresolvable direct requirements surface as
	/// [`crate::Error::Solver`]. Broken invariants surface as
	/// [`crate::Error::Internal`] and are never converted into pruning.
	pub fn resolve(&mut self) -> crate::Result<Resolution> {
		let mut stack_info = Vec::new();

		for boot in self.pipeline.boots() {
			log::debug!("running boot {:?}", boot.name());
			if let Err(NotAcceptable(msg)) = boot.run(self.project) {
				log::warn!("boot {:?} rejected the run: {}", boot.name(), msg);
				stack_info.push(JustificationEntry::error(msg));
				return Ok(Resolution { states: Vec::new(), stack_info, expanded: 0 });
			}
		}

		/* Direct requirements must be satisfiable before any state exists;
		 * a miss here is a hard solver failure, not a prunable branch. */
		for requirement in &self.project.requirements {
			let candidates = self.db.get_versions(&requirement.name, &requirement.specifier)?;
			if candidates.is_empty() {
				return Err(SolverError::NoCompatibleVersion {
					package: requirement.name.clone(),
					specifier: requirement.specifier.to_string(),
				}.into());
			}
		}

		let mut beam = Beam::new(self.beam_width);
		beam.push(State::from_requirements(&self.project.requirements));

		let mut accepted: Vec<State> = Vec::new();
		let mut expanded = 0usize;
		let mut missing_reported: HashSet<String> = HashSet::new();

		log::info!(
			"starting stack resolution, producing at most {} stack(s) with beam width {}",
			self.count, self.beam_width,
		);

		while accepted.len() < self.count {
			if let Some(deadline) = self.deadline {
				if std::time::Instant::now() >= deadline {
					let msg = "Wall-clock budget exceeded, returning stacks accepted so far".to_string();
					log::warn!("{}", msg);
					stack_info.push(JustificationEntry::warning(msg));
					break;
				}
			}
			if let Some(budget) = self.expansion_budget {
				if expanded >= budget {
					let msg = format!(
						"Expansion budget of {} state(s) exceeded, returning stacks accepted so far", budget,
					);
					log::warn!("{}", msg);
					stack_info.push(JustificationEntry::warning(msg));
					break;
				}
			}

			let Some(mut current) = beam.pop() else {
				break;
			};

			if current.is_complete() {
				if self.finish_state(&mut current)? {
					accepted.push(current);
				}
				continue;
			}

			expanded += 1;
			self.expand_state(current, &mut beam, &mut stack_info, &mut missing_reported)?;
		}

		log::info!(
			"resolution produced {} stack(s), expanded {} state(s)",
			accepted.len(), expanded,
		);

		Ok(Resolution { states: accepted, stack_info, expanded })
	}

	/// Gate a complete state through strides and post-process it with wraps.
	fn finish_state(&self, state: &mut State) -> crate::Result<bool> {
		for stride in self.pipeline.strides() {
			if let Err(NotAcceptable(msg)) = stride.run(state) {
				log::debug!("stride {:?} removed stack: {}", stride.name(), msg);
				return Ok(false);
			}
		}
		for wrap in self.pipeline.wraps() {
			wrap.run(state);
		}
		Ok(true)
	}

	/// Expand one incomplete state: next unresolved package, sieved
	/// candidates, one child per surviving version run through all steps.
	fn expand_state(
		&self,
		mut state: State,
		beam: &mut Beam,
		stack_info: &mut Vec<JustificationEntry>,
		missing_reported: &mut HashSet<String>,
	) -> crate::Result<()> {
		let package_name = state.take_next_unresolved().ok_or_else(|| {
			crate::Error::Internal("incomplete state without pending packages".to_string())
		})?;
		let specifier = state.constraint_for(&package_name).cloned().ok_or_else(|| {
			crate::Error::Internal(format!("no recorded constraint for package {:?}", package_name))
		})?;

		let mut candidates = match self.db.get_versions(&package_name, &specifier) {
			Ok(candidates) => candidates,
			Err(error @ SolverError::UnknownPackage(_)) => {
				/* A dependency pointing outside the snapshot kills this
				 * branch but keeps results collected elsewhere. */
				if missing_reported.insert(package_name.clone()) {
					log::warn!("{}", error);
					stack_info.push(JustificationEntry {
						package_name: Some(package_name),
						entry_type: JustificationType::Error,
						message: error.to_string(),
						link: None,
					});
				}
				return Ok(());
			}
			Err(error) => return Err(error.into()),
		};

		if candidates.is_empty() {
			log::trace!("no version of {:?} satisfies {}", package_name, specifier);
			return Ok(());
		}

		for sieve in self.pipeline.sieves() {
			candidates = sieve.filter(&package_name, candidates);
			if candidates.is_empty() {
				log::debug!("sieve {:?} removed all candidates of {:?}", sieve.name(), package_name);
				return Ok(());
			}
		}

		'candidates: for candidate in candidates {
			/* The candidate came out of the snapshot, so its release record
			 * must exist; anything else is an inconsistency, not a prune. */
			let dependencies = self.db.get_dependencies(&package_name, &candidate.version)
				.map_err(|e| crate::Error::Internal(format!("candidate without a release record: {}", e)))?;

			let pinned = PinnedPackage {
				name: package_name.clone(),
				version: candidate.version.clone(),
				index_url: candidate.index_url.clone(),
			};

			let mut child = state.clone();
			if !child.pin(pinned.clone(), dependencies) {
				log::trace!(
					"version {} of {:?} contradicts packages already resolved",
					pinned.version, package_name,
				);
				continue;
			}

			for step in self.pipeline.steps() {
				match step.run(&child, &pinned) {
					Err(NotAcceptable(msg)) => {
						log::debug!(
							"step {:?} removed {:?} in version {}: {}",
							step.name(), package_name, pinned.version, msg,
						);
						continue 'candidates;
					}
					Ok(Some(report)) => {
						child.add_score(report.score);
						for entry in report.justification {
							child.add_justification(entry);
						}
					}
					Ok(None) => {}
				}
			}

			beam.push(child);
		}

		Ok(())
	}
}
