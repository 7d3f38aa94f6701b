use crate::pipeline::builder::PipelineBuilderContext;
use crate::pipeline::unit::{NotAcceptable, Step, StepReport};
use crate::resolver::state::{JustificationEntry, JustificationType, PinnedPackage, State};

/// Prunes every branch that pins a blocked package.
///
/// One instance is created per blocked package name in the builder context,
/// a worked example of a factory yielding several parameter sets.
#[derive(Debug)]
pub struct BlockedPackageStep {
	package: String,
}

impl BlockedPackageStep {
	pub const NAME: &'static str = "BlockedPackageStep";

	pub fn should_include(context: &PipelineBuilderContext) -> Vec<Box<dyn Step>> {
		if !context.is_adviser_pipeline() || context.is_included(Self::NAME) {
			return Vec::new();
		}

		context.blocked_packages().iter()
			.map(|p| Box::new(BlockedPackageStep { package: p.clone() }) as Box<dyn Step>)
			.collect()
	}
}

impl Step for BlockedPackageStep {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn run(&self, _state: &State, resolved: &PinnedPackage) -> Result<Option<StepReport>, NotAcceptable> {
		if resolved.name == self.package {
			return Err(NotAcceptable(format!(
				"package {:?} is blocked for this run", self.package,
			)));
		}
		Ok(None)
	}
}

/// Rewards packages resolved from the configured preferred index.
#[derive(Debug)]
pub struct PreferredIndexStep {
	index_url: String,
}

impl PreferredIndexStep {
	pub const NAME: &'static str = "PreferredIndexStep";

	const SCORE_BONUS: f64 = 0.2;

	pub fn should_include(context: &PipelineBuilderContext) -> Vec<Box<dyn Step>> {
		if !context.is_adviser_pipeline() || context.is_included(Self::NAME) {
			return Vec::new();
		}

		match context.preferred_index() {
			Some(index_url) => vec![Box::new(PreferredIndexStep { index_url: index_url.to_string() })],
			None => Vec::new(),
		}
	}
}

impl Step for PreferredIndexStep {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn run(&self, _state: &State, resolved: &PinnedPackage) -> Result<Option<StepReport>, NotAcceptable> {
		if resolved.index_url != self.index_url {
			return Ok(None);
		}

		Ok(Some(StepReport {
			score: Self::SCORE_BONUS,
			justification: vec![JustificationEntry {
				package_name: Some(resolved.name.clone()),
				entry_type: JustificationType::Info,
				message: format!(
					"Package {:?} in version {} is served by the preferred index {:?}",
					resolved.name, resolved.version, self.index_url,
				),
				link: None,
			}],
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::packagedb::PackageVersion;
	use crate::pipeline::builder::PipelineKind;
	use crate::project::{Project, RecommendationType, Requirement};
	use crate::packagedb::VersionSpecifier;

	fn pinned(name: &str, index_url: &str) -> PinnedPackage {
		PinnedPackage {
			name: name.to_string(),
			version: PackageVersion::new("1.0").expect("valid version"),
			index_url: index_url.to_string(),
		}
	}

	fn empty_state() -> State {
		State::from_requirements(&[Requirement::new("a", VersionSpecifier::any())])
	}

	#[test]
	fn one_instance_per_blocked_package() {
		let mut context = PipelineBuilderContext::new(PipelineKind::Adviser, Project::default(), RecommendationType::Stable);
		context.set_blocked_packages(vec!["left-pad".to_string(), "setuptools".to_string()]);
		assert_eq!(BlockedPackageStep::should_include(&context).len(), 2);

		context.set_blocked_packages(Vec::new());
		assert!(BlockedPackageStep::should_include(&context).is_empty());
	}

	#[test]
	fn blocked_package_is_not_acceptable() {
		let step = BlockedPackageStep { package: "left-pad".to_string() };
		let state = empty_state();
		assert!(step.run(&state, &pinned("left-pad", "https://pypi.org/simple")).is_err());
		assert!(matches!(step.run(&state, &pinned("flask", "https://pypi.org/simple")), Ok(None)));
	}

	#[test]
	fn preferred_index_scores_and_justifies() {
		let step = PreferredIndexStep { index_url: "https://internal.example.com/simple".to_string() };
		let state = empty_state();

		let report = step.run(&state, &pinned("flask", "https://internal.example.com/simple"))
			.expect("step accepts")
			.expect("step reports");
		assert!(report.score > 0.0);
		assert_eq!(report.justification.len(), 1);
		assert_eq!(report.justification[0].package_name.as_deref(), Some("flask"));

		assert!(matches!(step.run(&state, &pinned("flask", "https://pypi.org/simple")), Ok(None)));
	}
}
