//! Fixture package databases and projects shared by integration tests.

pub use tempfile;

use adviser_rs::packagedb::{PackageVersion, Release, VersionSpecifier};
use adviser_rs::project::{Project, Requirement, RuntimeEnvironment};
use adviser_rs::PackageDb;

pub const PYPI: &str = "https://pypi.org/simple";
pub const INTERNAL_INDEX: &str = "https://internal.example.com/simple";

pub fn requirement(name: &str, specifier: &str) -> Requirement {
	Requirement::new(name, VersionSpecifier::parse(specifier).expect("fixture specifier should parse"))
}

pub fn release(name: &str, version: &str, index_url: &str, dependencies: &[(&str, &str)]) -> Release {
	Release {
		package_name: name.to_string(),
		version: PackageVersion::new(version).expect("fixture version should parse"),
		index_url: index_url.to_string(),
		dependencies: dependencies.iter().map(|(n, s)| requirement(n, s)).collect(),
	}
}

pub fn fully_specified_environment() -> RuntimeEnvironment {
	RuntimeEnvironment {
		os_name: Some("fedora".to_string()),
		os_version: Some("36".to_string()),
		python_version: Some("3.10".to_string()),
	}
}

/// A project targeting the fixture ecosystem with a fully specified
/// environment, so adviser boots pass by default.
pub fn project(requirements: &[(&str, &str)]) -> Project {
	Project {
		requirements: requirements.iter().map(|(n, s)| requirement(n, s)).collect(),
		runtime_environment: fully_specified_environment(),
		allow_prereleases: false,
	}
}

/// Minimal database: package `a` in versions 1 and 2, no dependencies.
pub fn tiny_db() -> PackageDb {
	let mut db = PackageDb::new();
	db.add_release(release("a", "1", PYPI, &[]));
	db.add_release(release("a", "2", PYPI, &[]));
	db
}

/// A small synthetic ecosystem:
///
/// - `flask` 2.1.0/2.0.0 depend on `werkzeug >=2` and `jinja2 >=3`;
///   `flask` 1.1.4 depends on `werkzeug <2` and `jinja2 >=2,<3`.
/// - `jinja2` 3.x depends on `markupsafe >=2`; 3.1.0rc1 is a pre-release.
/// - `werkzeug` 2.1.0 is also served from the internal index.
pub fn fixture_db() -> PackageDb {
	let mut db = PackageDb::new();

	db.add_release(release("flask", "2.1.0", PYPI, &[("werkzeug", ">=2"), ("jinja2", ">=3")]));
	db.add_release(release("flask", "2.0.0", PYPI, &[("werkzeug", ">=2"), ("jinja2", ">=3")]));
	db.add_release(release("flask", "1.1.4", PYPI, &[("werkzeug", "<2"), ("jinja2", ">=2,<3")]));

	db.add_release(release("werkzeug", "1.0.1", PYPI, &[]));
	db.add_release(release("werkzeug", "2.0.0", PYPI, &[]));
	db.add_release(release("werkzeug", "2.1.0", PYPI, &[]));
	db.add_release(release("werkzeug", "2.1.0", INTERNAL_INDEX, &[]));

	db.add_release(release("jinja2", "2.11.3", PYPI, &[]));
	db.add_release(release("jinja2", "3.0.0", PYPI, &[("markupsafe", ">=2")]));
	db.add_release(release("jinja2", "3.1.0rc1", PYPI, &[("markupsafe", ">=2")]));

	db.add_release(release("markupsafe", "2.0.0", PYPI, &[]));
	db.add_release(release("markupsafe", "2.1.0", PYPI, &[]));

	db
}
