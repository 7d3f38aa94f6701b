use adviser_rs::PackageDb;

use adviser_rs_test_utils as fixtures;

#[test]
fn snapshot_survives_a_save_and_load() {
	let dir = fixtures::tempfile::tempdir().expect("temp dir");
	let path = dir.path().join("packagedb.bin");

	let db = fixtures::fixture_db();
	db.save_to_path(&path).expect("save snapshot");

	let loaded = PackageDb::load_from_path(&path).expect("load snapshot");
	assert_eq!(loaded.package_count(), db.package_count());

	/* Release order is part of the snapshot, the walker and the resolver
	 * both depend on it. */
	assert_eq!(loaded.releases("flask"), db.releases("flask"));
	assert_eq!(loaded.releases("werkzeug"), db.releases("werkzeug"));
}
