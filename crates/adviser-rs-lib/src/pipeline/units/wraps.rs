use crate::pipeline::builder::PipelineBuilderContext;
use crate::pipeline::unit::Wrap;
use crate::resolver::state::State;

/// Sorts an accepted state's justification log for reproducible output.
///
/// Key is `(package_name using "" for absent, type, message)`; the sort is
/// stable, so applying the wrap twice yields the same ordering as once.
#[derive(Debug, Default)]
pub struct SortJustificationsWrap;

impl SortJustificationsWrap {
	pub const NAME: &'static str = "SortJustificationsWrap";

	pub fn should_include(context: &PipelineBuilderContext) -> Vec<Box<dyn Wrap>> {
		if !context.is_included(Self::NAME) {
			vec![Box::new(Self)]
		} else {
			Vec::new()
		}
	}
}

impl Wrap for SortJustificationsWrap {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn run(&self, state: &mut State) {
		state.justification_mut().sort_by(|a, b| {
			(a.package_name.as_deref().unwrap_or(""), a.entry_type, &a.message)
				.cmp(&(b.package_name.as_deref().unwrap_or(""), b.entry_type, &b.message))
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::packagedb::VersionSpecifier;
	use crate::project::Requirement;
	use crate::resolver::state::{JustificationEntry, JustificationType};

	fn entry(package: Option<&str>, entry_type: JustificationType, message: &str) -> JustificationEntry {
		JustificationEntry {
			package_name: package.map(str::to_string),
			entry_type,
			message: message.to_string(),
			link: None,
		}
	}

	fn state_with_entries() -> State {
		let mut state = State::from_requirements(&[Requirement::new("a", VersionSpecifier::any())]);
		state.add_justification(entry(Some("b"), JustificationType::Info, "second"));
		state.add_justification(entry(None, JustificationType::Warning, "no package"));
		state.add_justification(entry(Some("a"), JustificationType::Latest, "latest"));
		state.add_justification(entry(Some("a"), JustificationType::Info, "first"));
		state
	}

	#[test]
	fn sorts_by_package_type_message() {
		let wrap = SortJustificationsWrap;
		let mut state = state_with_entries();
		wrap.run(&mut state);

		let order: Vec<(&str, &str)> = state.justification().iter()
			.map(|e| (e.package_name.as_deref().unwrap_or(""), e.message.as_str()))
			.collect();
		assert_eq!(order, [
			("", "no package"),
			("a", "first"),
			("a", "latest"),
			("b", "second"),
		]);
	}

	#[test]
	fn idempotent() {
		let wrap = SortJustificationsWrap;
		let mut once = state_with_entries();
		wrap.run(&mut once);
		let mut twice = once.clone();
		wrap.run(&mut twice);
		assert_eq!(once.justification(), twice.justification());
	}
}
