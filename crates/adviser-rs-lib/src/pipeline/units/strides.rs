use std::cell::RefCell;
use std::collections::HashSet;

use crate::pipeline::builder::PipelineBuilderContext;
use crate::pipeline::unit::{NotAcceptable, Stride};
use crate::resolver::state::State;

/// Keeps only the first complete stack of each score.
///
/// Stacks sharing a score are usually interchangeable from the policy's
/// point of view; reporting one of them keeps the output diverse.
#[derive(Debug, Default)]
pub struct ScoreFilteringStride {
	seen: RefCell<HashSet<u64>>,
}

impl ScoreFilteringStride {
	pub const NAME: &'static str = "ScoreFilteringStride";

	pub fn should_include(context: &PipelineBuilderContext) -> Vec<Box<dyn Stride>> {
		if context.is_adviser_pipeline() && !context.is_included(Self::NAME) {
			vec![Box::new(Self::default())]
		} else {
			Vec::new()
		}
	}
}

impl Stride for ScoreFilteringStride {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn run(&self, state: &State) -> Result<(), NotAcceptable> {
		/* Bit pattern keys the score exactly; the search is deterministic so
		 * equal scores repeat bit for bit. */
		if self.seen.borrow_mut().insert(state.score().to_bits()) {
			Ok(())
		} else {
			Err(NotAcceptable(format!(
				"a stack with score {} was already accepted", state.score(),
			)))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::packagedb::VersionSpecifier;
	use crate::project::Requirement;

	#[test]
	fn second_stack_with_same_score_is_removed() {
		let stride = ScoreFilteringStride::default();
		let state = State::from_requirements(&[Requirement::new("a", VersionSpecifier::any())]);

		assert!(stride.run(&state).is_ok());
		assert!(stride.run(&state).is_err());

		let mut scored = state.clone();
		scored.add_score(1.0);
		assert!(stride.run(&scored).is_ok());
	}
}
