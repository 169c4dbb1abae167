use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use mzn_solver::{ArtifactSettings, Identity, MznError, SolverConfiguration};
use serde_json::Value;
use tempfile::tempdir;

fn foo() -> SolverConfiguration {
    SolverConfiguration::new("Foo", "1.2.3", "/bin/foo").expect("valid solver")
}

#[test]
fn end_to_end_scope_creates_and_removes_artifact() {
    let mut solver = foo();
    assert_eq!(solver.effective_id(), "org.minizinc.python.foo");
    let serialized = solver.to_json().expect("json");
    assert!(serialized.contains("\"version\": \"1.2.3\""));
    assert!(serialized.contains("\"id\": \"org.minizinc.python.foo\""));

    let artifact = solver
        .with_materialized_configuration(|scope| {
            let id = scope.id().into_owned();
            let path = PathBuf::from(&id);
            assert!(scope.owns_artifact());
            assert_eq!(scope.artifact_path(), Some(path.as_path()));
            assert!(matches!(scope.identity(), Identity::Materialized(_)));
            let file_name = path.file_name().and_then(|n| n.to_str()).expect("file name");
            assert!(file_name.starts_with("minizinc_solver_"));
            assert!(file_name.ends_with(".msc"));
            assert_eq!(fs::read_to_string(&path).expect("artifact readable"), serialized);
            path
        })
        .expect("materialize");

    assert!(!artifact.exists());
    assert_eq!(solver.identity(), &Identity::Derived);
    assert_eq!(solver.effective_id(), "org.minizinc.python.foo");
}

#[test]
fn explicit_identity_skips_artifact() {
    let mut solver = foo().with_id("org.example.foo");
    let id = solver
        .with_materialized_configuration(|scope| {
            assert!(!scope.owns_artifact());
            assert!(scope.artifact_path().is_none());
            scope.id().into_owned()
        })
        .expect("materialize");
    assert_eq!(id, "org.example.foo");
    assert_eq!(solver.effective_id(), "org.example.foo");
}

#[test]
fn artifact_is_removed_when_body_fails() {
    let mut solver = foo();
    let mut seen = None;
    let outcome: Result<(), MznError> = solver
        .with_materialized_configuration(|scope| {
            seen = scope.artifact_path().map(|path| path.to_path_buf());
            Err(MznError::Driver(mzn_solver::ErrorInfo::new("driver.failed", "boom")))
        })
        .expect("materialize");
    assert!(outcome.is_err());
    let path = seen.expect("artifact path");
    assert!(!path.exists());
    assert_eq!(solver.identity(), &Identity::Derived);
}

#[test]
fn artifact_is_removed_when_body_panics() {
    let mut solver = foo();
    let mut seen = None;
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        solver.with_materialized_configuration(|scope| {
            seen = scope.artifact_path().map(|path| path.to_path_buf());
            panic!("driver crashed");
        })
    }));
    assert!(result.is_err());
    let path = seen.expect("artifact path");
    assert!(!path.exists());
    assert_eq!(solver.identity(), &Identity::Derived);
}

#[test]
fn mutation_inside_scope_falls_back_to_derived_id() {
    let mut solver = foo();
    let dir = tempdir().expect("tmp dir");
    let settings = ArtifactSettings::in_dir(dir.path());
    {
        let mut scope = solver.materialize_with(&settings).expect("materialize");
        let path = scope.artifact_path().expect("artifact").to_path_buf();
        assert_eq!(scope.id(), path.to_string_lossy());

        scope.set_executable("/bin/bar");
        assert_eq!(scope.identity(), &Identity::Derived);
        assert_eq!(scope.id(), "org.minizinc.python.foo");
        assert!(path.exists());
    }
    assert_eq!(solver.executable(), "/bin/bar");
    assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[test]
fn repeated_scopes_use_fresh_artifacts() {
    let mut solver = foo();
    let first = solver
        .with_materialized_configuration(|scope| scope.id().into_owned())
        .expect("first");
    let second = solver
        .with_materialized_configuration(|scope| scope.id().into_owned())
        .expect("second");
    assert_ne!(first, second);
}

#[test]
fn nested_scope_reuses_outer_identity() {
    let mut solver = foo();
    let mut outer = solver.materialize().expect("outer");
    let outer_id = outer.id().into_owned();
    {
        let inner = outer.materialize().expect("inner");
        assert!(!inner.owns_artifact());
        assert_eq!(inner.id(), outer_id);
    }
    assert_eq!(outer.id(), outer_id);
    assert!(PathBuf::from(&outer_id).exists());
    drop(outer);
    assert!(!PathBuf::from(&outer_id).exists());
    assert_eq!(solver.identity(), &Identity::Derived);
}

#[test]
fn custom_settings_control_name_and_location() {
    let dir = tempdir().expect("tmp dir");
    let settings = ArtifactSettings {
        prefix: "gecode_".into(),
        suffix: ".json".into(),
        dir: Some(dir.path().to_path_buf()),
    };
    let mut solver = foo();
    solver
        .with_materialized_configuration_in(&settings, |scope| {
            let path = scope.artifact_path().expect("artifact");
            assert_eq!(path.parent(), Some(dir.path()));
            let name = path.file_name().and_then(|n| n.to_str()).expect("name");
            assert!(name.starts_with("gecode_") && name.ends_with(".json"));
            let value: Value =
                serde_json::from_slice(&fs::read(path).expect("read")).expect("json");
            assert_eq!(value["name"], "Foo");
            assert_eq!(value["id"], "org.minizinc.python.foo");
        })
        .expect("materialize");
}

#[test]
fn creation_failure_leaves_identity_unset() {
    let dir = tempdir().expect("tmp dir");
    let missing = dir.path().join("does").join("not").join("exist");
    let mut solver = foo();
    let err = solver
        .with_materialized_configuration_in(&ArtifactSettings::in_dir(&missing), |_| ())
        .expect_err("missing directory");
    assert!(matches!(err, MznError::Io(_)));
    assert_eq!(err.code(), "mzn_solver.artifact_create");
    assert_eq!(solver.identity(), &Identity::Derived);
}

#[test]
fn clones_taken_inside_scope_fall_back_to_derived_id() {
    let mut solver = foo();
    let (copy, path) = solver
        .with_materialized_configuration(|scope| {
            let path = scope.artifact_path().expect("artifact").to_path_buf();
            ((**scope).clone(), path)
        })
        .expect("materialize");
    assert!(!path.exists());
    assert_eq!(copy.identity(), &Identity::Derived);
    assert_eq!(copy.effective_id(), "org.minizinc.python.foo");
    assert_eq!(copy.to_json().expect("json"), solver.to_json().expect("json"));
}

#[test]
fn clones_keep_registered_identity() {
    let solver = foo().with_id("org.example.foo");
    let copy = solver.clone();
    assert_eq!(copy.identity(), &Identity::Registered("org.example.foo".into()));
    assert_eq!(copy.effective_id(), "org.example.foo");
}
