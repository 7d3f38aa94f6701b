use crate::packagedb::Candidate;
use crate::pipeline::builder::PipelineBuilderContext;
use crate::pipeline::unit::Sieve;

/// Drops pre-release versions before they become expansion choices.
///
/// Included for adviser pipelines unless the project explicitly allows
/// pre-releases.
#[derive(Debug, Default)]
pub struct CutPreReleasesSieve;

impl CutPreReleasesSieve {
	pub const NAME: &'static str = "CutPreReleasesSieve";

	pub fn should_include(context: &PipelineBuilderContext) -> Vec<Box<dyn Sieve>> {
		if context.is_adviser_pipeline()
			&& !context.project().allow_prereleases
			&& !context.is_included(Self::NAME)
		{
			vec![Box::new(Self)]
		} else {
			Vec::new()
		}
	}
}

impl Sieve for CutPreReleasesSieve {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn filter(&self, package_name: &str, candidates: Vec<Candidate>) -> Vec<Candidate> {
		let before = candidates.len();
		let retained: Vec<Candidate> = candidates.into_iter()
			.filter(|c| !c.version.is_prerelease())
			.collect();
		if retained.len() != before {
			log::debug!(
				"removed {} pre-release version(s) of {:?}",
				before - retained.len(),
				package_name,
			);
		}
		retained
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::packagedb::PackageVersion;
	use crate::pipeline::builder::PipelineKind;
	use crate::project::{Project, RecommendationType};

	fn candidate(version: &str) -> Candidate {
		Candidate {
			version: PackageVersion::new(version).expect("valid version"),
			index_url: "https://pypi.org/simple".to_string(),
		}
	}

	#[test]
	fn cuts_prereleases() {
		let sieve = CutPreReleasesSieve;
		let retained = sieve.filter("jinja2", vec![
			candidate("3.1.0rc1"),
			candidate("3.0.0"),
			candidate("2.11.3"),
		]);
		let versions: Vec<String> = retained.iter().map(|c| c.version.to_string()).collect();
		assert_eq!(versions, ["3.0.0", "2.11.3"]);
	}

	#[test]
	fn not_included_when_prereleases_allowed() {
		let project = Project { allow_prereleases: true, ..Default::default() };
		let context = PipelineBuilderContext::new(PipelineKind::Adviser, project, RecommendationType::Latest);
		assert!(CutPreReleasesSieve::should_include(&context).is_empty());

		let context = PipelineBuilderContext::new(PipelineKind::Adviser, Project::default(), RecommendationType::Stable);
		assert_eq!(CutPreReleasesSieve::should_include(&context).len(), 1);
	}
}
