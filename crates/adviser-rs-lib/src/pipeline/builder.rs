use crate::project::{Project, RecommendationType, RuntimeEnvironment};

use super::unit::{Boot, Sieve, Step, Stride, Wrap};

/// Which workflow the pipeline is being assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
	Adviser,
	ProvenanceChecker,
	DependencyMonkey,
}

/// Build-time context consulted by every unit's inclusion factory.
///
/// Mutable only while the pipeline is assembled; the search phase never sees
/// it, only the finished [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineBuilderContext {
	kind: PipelineKind,
	project: Project,
	recommendation_type: RecommendationType,
	blocked_packages: Vec<String>,
	preferred_index: Option<String>,
	included: Vec<&'static str>,
}

impl PipelineBuilderContext {
	pub fn new(kind: PipelineKind, project: Project, recommendation_type: RecommendationType) -> Self {
		Self {
			kind,
			project,
			recommendation_type,
			blocked_packages: Vec::new(),
			preferred_index: None,
			included: Vec::new(),
		}
	}

	pub fn is_adviser_pipeline(&self) -> bool {
		self.kind == PipelineKind::Adviser
	}
	pub fn is_provenance_checker_pipeline(&self) -> bool {
		self.kind == PipelineKind::ProvenanceChecker
	}
	pub fn is_dependency_monkey_pipeline(&self) -> bool {
		self.kind == PipelineKind::DependencyMonkey
	}

	/// Whether a unit of the given name has already been added.
	///
	/// Declining on double registration is the unit's own responsibility;
	/// the builder never rejects a second inclusion on its own.
	pub fn is_included(&self, unit_name: &str) -> bool {
		self.included.iter().any(|n| *n == unit_name)
	}

	pub fn project(&self) -> &Project {
		&self.project
	}
	pub fn runtime_environment(&self) -> &RuntimeEnvironment {
		&self.project.runtime_environment
	}
	pub fn recommendation_type(&self) -> RecommendationType {
		self.recommendation_type
	}

	pub fn blocked_packages(&self) -> &[String] {
		&self.blocked_packages
	}
	pub fn set_blocked_packages(&mut self, packages: Vec<String>) {
		self.blocked_packages = packages;
	}

	pub fn preferred_index(&self) -> Option<&str> {
		self.preferred_index.as_deref()
	}
	pub fn set_preferred_index(&mut self, index_url: Option<String>) {
		self.preferred_index = index_url;
	}
}

/// Inclusion factory: consulted once during assembly, returns one configured
/// unit per applicable parameter set, or nothing when the unit does not
/// apply to this run.
pub type BootFactory = fn(&PipelineBuilderContext) -> Vec<Box<dyn Boot>>;
pub type SieveFactory = fn(&PipelineBuilderContext) -> Vec<Box<dyn Sieve>>;
pub type StepFactory = fn(&PipelineBuilderContext) -> Vec<Box<dyn Step>>;
pub type StrideFactory = fn(&PipelineBuilderContext) -> Vec<Box<dyn Stride>>;
pub type WrapFactory = fn(&PipelineBuilderContext) -> Vec<Box<dyn Wrap>>;

/// Assembles an ordered pipeline from registered unit factories.
///
/// Factories are consulted exactly once each, in declaration order, boots
/// first and wraps last. A factory sees in the context which units were
/// already included by earlier factories.
pub struct PipelineBuilder {
	context: PipelineBuilderContext,
	boots: Vec<(&'static str, BootFactory)>,
	sieves: Vec<(&'static str, SieveFactory)>,
	steps: Vec<(&'static str, StepFactory)>,
	strides: Vec<(&'static str, StrideFactory)>,
	wraps: Vec<(&'static str, WrapFactory)>,
}

impl PipelineBuilder {
	pub fn new(context: PipelineBuilderContext) -> Self {
		Self {
			context,
			boots: Vec::new(),
			sieves: Vec::new(),
			steps: Vec::new(),
			strides: Vec::new(),
			wraps: Vec::new(),
		}
	}

	pub fn context(&self) -> &PipelineBuilderContext {
		&self.context
	}
	pub fn context_mut(&mut self) -> &mut PipelineBuilderContext {
		&mut self.context
	}

	pub fn add_boot(mut self, name: &'static str, factory: BootFactory) -> Self {
		self.boots.push((name, factory));
		self
	}
	pub fn add_sieve(mut self, name: &'static str, factory: SieveFactory) -> Self {
		self.sieves.push((name, factory));
		self
	}
	pub fn add_step(mut self, name: &'static str, factory: StepFactory) -> Self {
		self.steps.push((name, factory));
		self
	}
	pub fn add_stride(mut self, name: &'static str, factory: StrideFactory) -> Self {
		self.strides.push((name, factory));
		self
	}
	pub fn add_wrap(mut self, name: &'static str, factory: WrapFactory) -> Self {
		self.wraps.push((name, factory));
		self
	}

	/// Register the built-in unit set in its fixed declaration order.
	pub fn with_default_units(self) -> Self {
		use super::units::boots::FullySpecifiedEnvironmentBoot;
		use super::units::sieves::CutPreReleasesSieve;
		use super::units::steps::{BlockedPackageStep, PreferredIndexStep};
		use super::units::strides::ScoreFilteringStride;
		use super::units::wraps::SortJustificationsWrap;

		self.add_boot(FullySpecifiedEnvironmentBoot::NAME, FullySpecifiedEnvironmentBoot::should_include)
			.add_sieve(CutPreReleasesSieve::NAME, CutPreReleasesSieve::should_include)
			.add_step(BlockedPackageStep::NAME, BlockedPackageStep::should_include)
			.add_step(PreferredIndexStep::NAME, PreferredIndexStep::should_include)
			.add_stride(ScoreFilteringStride::NAME, ScoreFilteringStride::should_include)
			.add_wrap(SortJustificationsWrap::NAME, SortJustificationsWrap::should_include)
	}

	pub fn build(mut self) -> Pipeline {
		let mut pipeline = Pipeline::default();

		for (name, factory) in &self.boots {
			let units = factory(&self.context);
			if !units.is_empty() {
				log::debug!("including boot {:?} ({} instance(s))", name, units.len());
				self.context.included.push(name);
				pipeline.boots.extend(units);
			}
		}
		for (name, factory) in &self.sieves {
			let units = factory(&self.context);
			if !units.is_empty() {
				log::debug!("including sieve {:?} ({} instance(s))", name, units.len());
				self.context.included.push(name);
				pipeline.sieves.extend(units);
			}
		}
		for (name, factory) in &self.steps {
			let units = factory(&self.context);
			if !units.is_empty() {
				log::debug!("including step {:?} ({} instance(s))", name, units.len());
				self.context.included.push(name);
				pipeline.steps.extend(units);
			}
		}
		for (name, factory) in &self.strides {
			let units = factory(&self.context);
			if !units.is_empty() {
				log::debug!("including stride {:?} ({} instance(s))", name, units.len());
				self.context.included.push(name);
				pipeline.strides.extend(units);
			}
		}
		for (name, factory) in &self.wraps {
			let units = factory(&self.context);
			if !units.is_empty() {
				log::debug!("including wrap {:?} ({} instance(s))", name, units.len());
				self.context.included.push(name);
				pipeline.wraps.extend(units);
			}
		}

		pipeline
	}
}

/// The assembled, immutable pipeline consumed by the resolver.
#[derive(Debug, Default)]
pub struct Pipeline {
	pub(crate) boots: Vec<Box<dyn Boot>>,
	pub(crate) sieves: Vec<Box<dyn Sieve>>,
	pub(crate) steps: Vec<Box<dyn Step>>,
	pub(crate) strides: Vec<Box<dyn Stride>>,
	pub(crate) wraps: Vec<Box<dyn Wrap>>,
}

/// Serializable description of a pipeline for run reports.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PipelineSummary {
	pub boots: Vec<&'static str>,
	pub sieves: Vec<&'static str>,
	pub steps: Vec<&'static str>,
	pub strides: Vec<&'static str>,
	pub wraps: Vec<&'static str>,
}

impl Pipeline {
	pub fn boots(&self) -> &[Box<dyn Boot>] {
		&self.boots
	}
	pub fn sieves(&self) -> &[Box<dyn Sieve>] {
		&self.sieves
	}
	pub fn steps(&self) -> &[Box<dyn Step>] {
		&self.steps
	}
	pub fn strides(&self) -> &[Box<dyn Stride>] {
		&self.strides
	}
	pub fn wraps(&self) -> &[Box<dyn Wrap>] {
		&self.wraps
	}

	pub fn summary(&self) -> PipelineSummary {
		PipelineSummary {
			boots: self.boots.iter().map(|u| u.name()).collect(),
			sieves: self.sieves.iter().map(|u| u.name()).collect(),
			steps: self.steps.iter().map(|u| u.name()).collect(),
			strides: self.strides.iter().map(|u| u.name()).collect(),
			wraps: self.wraps.iter().map(|u| u.name()).collect(),
		}
	}
}
