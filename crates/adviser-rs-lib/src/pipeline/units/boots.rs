use crate::pipeline::builder::PipelineBuilderContext;
use crate::pipeline::unit::{Boot, NotAcceptable};
use crate::project::Project;

/// Rejects a run whose target runtime environment is underspecified.
///
/// Recommendations depend on knowing the operating system and interpreter
/// version, so an adviser run without them is aborted before any state is
/// created.
#[derive(Debug, Default)]
pub struct FullySpecifiedEnvironmentBoot;

impl FullySpecifiedEnvironmentBoot {
	pub const NAME: &'static str = "FullySpecifiedEnvironmentBoot";

	pub fn should_include(context: &PipelineBuilderContext) -> Vec<Box<dyn Boot>> {
		if context.is_adviser_pipeline() && !context.is_included(Self::NAME) {
			vec![Box::new(Self)]
		} else {
			Vec::new()
		}
	}
}

impl Boot for FullySpecifiedEnvironmentBoot {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn run(&self, project: &Project) -> Result<(), NotAcceptable> {
		let env = &project.runtime_environment;
		if env.is_fully_specified() {
			return Ok(());
		}

		Err(NotAcceptable(format!(
			"Runtime environment supplied is not fully specified, OS name is {:?} in version {:?} using Python {:?}",
			env.os_name, env.os_version, env.python_version,
		)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::builder::PipelineKind;
	use crate::project::{RecommendationType, RuntimeEnvironment};

	fn project(env: RuntimeEnvironment) -> Project {
		Project { runtime_environment: env, ..Default::default() }
	}

	fn specified() -> RuntimeEnvironment {
		RuntimeEnvironment {
			os_name: Some("fedora".to_string()),
			os_version: Some("36".to_string()),
			python_version: Some("3.10".to_string()),
		}
	}

	#[test]
	fn included_for_adviser_only() {
		let context = PipelineBuilderContext::new(
			PipelineKind::Adviser,
			project(specified()),
			RecommendationType::Stable,
		);
		assert_eq!(FullySpecifiedEnvironmentBoot::should_include(&context).len(), 1);

		let monkey = PipelineBuilderContext::new(
			PipelineKind::DependencyMonkey,
			project(specified()),
			RecommendationType::Stable,
		);
		assert!(FullySpecifiedEnvironmentBoot::should_include(&monkey).is_empty());
	}

	#[test]
	fn declines_double_registration() {
		let context = PipelineBuilderContext::new(
			PipelineKind::Adviser,
			project(specified()),
			RecommendationType::Stable,
		);
		let pipeline = crate::pipeline::PipelineBuilder::new(context)
			.add_boot(FullySpecifiedEnvironmentBoot::NAME, FullySpecifiedEnvironmentBoot::should_include)
			.add_boot(FullySpecifiedEnvironmentBoot::NAME, FullySpecifiedEnvironmentBoot::should_include)
			.build();
		assert_eq!(pipeline.boots().len(), 1);
	}

	#[test]
	fn rejects_underspecified_environment() {
		let boot = FullySpecifiedEnvironmentBoot;
		assert!(boot.run(&project(RuntimeEnvironment::default())).is_err());
		assert!(boot.run(&project(specified())).is_ok());
	}
}
