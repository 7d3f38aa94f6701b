use adviser_rs::dependency_graph::{estimate_stacks, DecisionPolicy, DependencyGraphWalker, PinnedStack};

use adviser_rs_test_utils as fixtures;

fn collect(walker: DependencyGraphWalker) -> Vec<PinnedStack> {
	walker
		.collect::<Result<Vec<_>, _>>()
		.expect("walk should not error")
}

#[test]
fn walks_every_combination_of_a_tiny_space() {
	let db = fixtures::tiny_db();
	let project = fixtures::project(&[("a", ">=1,<3")]);

	let stacks = collect(DependencyGraphWalker::new(&db, &project));
	assert_eq!(stacks.len(), 2);

	/* Candidates are stored newest first, so the walk is too. */
	assert_eq!(stacks[0].packages["a"].version.to_string(), "2");
	assert_eq!(stacks[1].packages["a"].version.to_string(), "1");
}

#[test]
fn count_caps_the_walk() {
	let db = fixtures::tiny_db();
	let project = fixtures::project(&[("a", ">=1,<3")]);

	let mut walker = DependencyGraphWalker::new(&db, &project).count(1);
	assert!(walker.next().expect("one stack").is_ok());
	assert!(walker.next().is_none());
}

#[test]
fn walks_the_full_fixture_ecosystem() {
	let db = fixtures::fixture_db();
	let project = fixtures::project(&[("flask", "*")]);

	/* flask 2.1.0 and 2.0.0 each fan out over 3 werkzeug releases and
	 * 2 jinja2 releases times 2 markupsafe releases; flask 1.1.4 admits
	 * exactly one combination. 2 * 3 * 2 * 2 + 1 = 25. */
	let stacks = collect(DependencyGraphWalker::new(&db, &project));
	assert_eq!(stacks.len(), 25);

	for stack in &stacks {
		let flask = &stack.packages["flask"];
		assert!(project.requirements[0].specifier.matches(&flask.version));
	}
}

#[test]
fn first_policy_yields_a_single_stack() {
	let db = fixtures::fixture_db();
	let project = fixtures::project(&[("flask", "*")]);

	let stacks = collect(DependencyGraphWalker::new(&db, &project).decision(DecisionPolicy::First));
	assert_eq!(stacks.len(), 1);
	assert_eq!(stacks[0].packages["flask"].version.to_string(), "2.1.0");
}

#[test]
fn seeded_sampling_is_reproducible() {
	let db = fixtures::fixture_db();
	let project = fixtures::project(&[("flask", "*")]);

	let run = || {
		let walker = DependencyGraphWalker::new(&db, &project)
			.decision(DecisionPolicy::OneIn(3))
			.seed(42);
		serde_json::to_string(&collect(walker)).expect("stacks serialize")
	};

	assert_eq!(run(), run());
}

#[test]
fn unknown_package_surfaces_as_an_error() {
	let db = fixtures::tiny_db();
	let project = fixtures::project(&[("ghost", "*")]);

	let mut walker = DependencyGraphWalker::new(&db, &project);
	match walker.next() {
		Some(Err(adviser_rs::Error::Solver(_))) => {}
		other => panic!("expected a solver error, got {:?}", other),
	}
}

#[test]
fn estimates_the_search_space() {
	let db = fixtures::tiny_db();
	let project = fixtures::project(&[("a", ">=1,<3")]);
	assert_eq!(estimate_stacks(&db, &project).expect("estimate"), 2);

	let db = fixtures::fixture_db();
	let project = fixtures::project(&[("flask", "*")]);
	/* The estimate ignores constraints: 3 flask, 4 werkzeug, 3 jinja2 and
	 * 2 markupsafe releases. */
	assert_eq!(estimate_stacks(&db, &project).expect("estimate"), 72);
}
