use super::state::State;

/// Bounded best-first container of in-progress states.
///
/// Kept sorted best first: score descending, then fewer unresolved
/// packages, then earlier insertion sequence. The sequence number makes the
/// order total, so results are deterministic for a fixed candidate source
/// and unit set. Admission beyond capacity evicts the worst entry; a state
/// that falls out is permanently discarded.
#[derive(Debug)]
pub(super) struct Beam {
	width: usize,
	entries: Vec<BeamEntry>,
	seq: u64,
}

#[derive(Debug)]
struct BeamEntry {
	score: f64,
	unresolved: usize,
	seq: u64,
	state: State,
}

fn rank(a: &BeamEntry, b: &BeamEntry) -> std::cmp::Ordering {
	b.score.total_cmp(&a.score)
		.then(a.unresolved.cmp(&b.unresolved))
		.then(a.seq.cmp(&b.seq))
}

impl Beam {
	pub fn new(width: usize) -> Self {
		Self {
			width: width.max(1),
			entries: Vec::new(),
			seq: 0,
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Admit a state; returns whether it was retained.
	pub fn push(&mut self, state: State) -> bool {
		let entry = BeamEntry {
			score: state.score(),
			unresolved: state.unresolved().len(),
			seq: self.seq,
			state,
		};
		self.seq += 1;

		let pos = match self.entries.binary_search_by(|e| rank(e, &entry)) {
			Ok(pos) | Err(pos) => pos,
		};
		if pos >= self.width {
			log::trace!("state with score {} fell outside the beam", entry.score);
			return false;
		}

		self.entries.insert(pos, entry);
		if self.entries.len() > self.width {
			let dropped = self.entries.pop().expect("beam has entries beyond capacity");
			log::trace!("state with score {} evicted from the beam", dropped.score);
		}
		true
	}

	/// Remove and return the best state.
	pub fn pop(&mut self) -> Option<State> {
		if self.is_empty() {
			None
		} else {
			Some(self.entries.remove(0).state)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::packagedb::VersionSpecifier;
	use crate::project::Requirement;

	fn state_with_score(score: f64) -> State {
		let mut state = State::from_requirements(&[Requirement::new("a", VersionSpecifier::any())]);
		state.add_score(score);
		state
	}

	#[test]
	fn pops_highest_score_first() {
		let mut beam = Beam::new(10);
		beam.push(state_with_score(1.0));
		beam.push(state_with_score(3.0));
		beam.push(state_with_score(2.0));

		assert_eq!(beam.pop().map(|s| s.score()), Some(3.0));
		assert_eq!(beam.pop().map(|s| s.score()), Some(2.0));
		assert_eq!(beam.pop().map(|s| s.score()), Some(1.0));
		assert!(beam.pop().is_none());
	}

	#[test]
	fn never_exceeds_width() {
		let mut beam = Beam::new(2);
		assert!(beam.push(state_with_score(1.0)));
		assert!(beam.push(state_with_score(2.0)));
		assert!(beam.push(state_with_score(3.0)));
		assert_eq!(beam.len(), 2);

		/* The worst was evicted. */
		assert_eq!(beam.pop().map(|s| s.score()), Some(3.0));
		assert_eq!(beam.pop().map(|s| s.score()), Some(2.0));
		assert!(beam.pop().is_none());
	}

	#[test]
	fn rejects_worse_than_worst_at_capacity() {
		let mut beam = Beam::new(2);
		beam.push(state_with_score(2.0));
		beam.push(state_with_score(3.0));
		assert!(!beam.push(state_with_score(1.0)));
		assert_eq!(beam.len(), 2);
	}

	#[test]
	fn equal_scores_keep_insertion_order() {
		let mut beam = Beam::new(10);
		let mut first = state_with_score(1.0);
		first.add_justification(crate::resolver::state::JustificationEntry::warning("first"));
		beam.push(first);
		beam.push(state_with_score(1.0));

		let popped = beam.pop().expect("beam has entries");
		assert_eq!(popped.justification().len(), 1);
	}

	#[test]
	fn fewer_unresolved_breaks_score_ties() {
		let mut beam = Beam::new(10);
		let two_pending = State::from_requirements(&[
			Requirement::new("a", VersionSpecifier::any()),
			Requirement::new("b", VersionSpecifier::any()),
		]);
		let one_pending = State::from_requirements(&[Requirement::new("a", VersionSpecifier::any())]);
		beam.push(two_pending);
		beam.push(one_pending);

		let popped = beam.pop().expect("beam has entries");
		assert_eq!(popped.unresolved().len(), 1);
	}
}
