//! Integration tests for the reader role across the canonical repository.
//!
//! `examplereader` holds READER on the three top-level objects. It may read
//! wherever that grant is inherited or re-granted, may read open resources
//! anywhere, and may never write, add children, attach ACLs or delete.

use quire_authz::DecisionEngine;
use quire_core::{Decision, Operation};
use quire_test::{test_engine, test_path, test_reader, test_roles_repository};

use quire_core::Operation::{AddAcl, CreateChild, CreateDatastream, Delete, Read, UpdateDatastream};

fn engine() -> DecisionEngine {
    test_engine(&test_roles_repository())
}

async fn decide(engine: &DecisionEngine, path: &str, op: Operation) -> Decision {
    engine
        .decide(&test_reader(), &test_path(path), op)
        .await
        .unwrap()
}

async fn assert_allowed(engine: &DecisionEngine, path: &str, op: Operation) {
    assert_eq!(
        decide(engine, path, op).await,
        Decision::Allow,
        "reader should be allowed {op} on {path}"
    );
}

async fn assert_denied(engine: &DecisionEngine, path: &str, op: Operation) {
    assert_eq!(
        decide(engine, path, op).await,
        Decision::Deny,
        "reader should not be allowed {op} on {path}"
    );
}

#[tokio::test]
async fn test_open_object() {
    let engine = engine();
    let obj = "/testparent1";

    assert_allowed(&engine, obj, Read).await;
    // New datastreams and children are decided on the container.
    assert_denied(&engine, obj, CreateDatastream).await;
    assert_denied(&engine, obj, CreateChild).await;
    assert_denied(&engine, obj, AddAcl).await;
}

#[tokio::test]
async fn test_open_object_with_restricted_datastream() {
    let engine = engine();

    assert_allowed(&engine, "/testparent2", Read).await;

    let open_ds = "/testparent2/tsp1_data";
    assert_allowed(&engine, open_ds, Read).await;
    assert_denied(&engine, open_ds, UpdateDatastream).await;
    assert_denied(&engine, open_ds, AddAcl).await;

    let restricted_ds = "/testparent2/tsp2_data";
    assert_allowed(&engine, restricted_ds, Read).await;
    assert_denied(&engine, restricted_ds, UpdateDatastream).await;
    assert_denied(&engine, restricted_ds, AddAcl).await;
}

#[tokio::test]
async fn test_child_inheriting_acl() {
    let engine = engine();
    let child = "/testparent1/testchild1NoACL";

    assert_allowed(&engine, child, Read).await;
    assert_denied(&engine, child, CreateDatastream).await;
    assert_denied(&engine, child, CreateChild).await;
    assert_denied(&engine, child, AddAcl).await;

    let ds = "/testparent1/testchild1NoACL/tsc1_data";
    assert_allowed(&engine, ds, Read).await;
    assert_denied(&engine, ds, UpdateDatastream).await;
    assert_denied(&engine, ds, AddAcl).await;
}

#[tokio::test]
async fn test_restricted_child_with_own_acl() {
    let engine = engine();
    let child = "/testparent1/testchild2WithACL";

    assert_allowed(&engine, child, Read).await;
    assert_denied(&engine, child, CreateDatastream).await;
    assert_denied(&engine, child, CreateChild).await;
    assert_denied(&engine, child, AddAcl).await;

    let ds = "/testparent1/testchild2WithACL/tsc1_data";
    assert_allowed(&engine, ds, Read).await;
    assert_denied(&engine, ds, UpdateDatastream).await;
    assert_denied(&engine, ds, AddAcl).await;

    // Admin-only datastream under a reader-visible child.
    let admin_ds = "/testparent1/testchild2WithACL/tsc2_data";
    assert_denied(&engine, admin_ds, Read).await;
    assert_denied(&engine, admin_ds, UpdateDatastream).await;
    assert_denied(&engine, admin_ds, AddAcl).await;
}

#[tokio::test]
async fn test_writer_restricted_child() {
    let engine = engine();
    let child = "/testparent1/testchild4WithACL";

    assert_denied(&engine, child, Read).await;
    assert_denied(&engine, child, CreateDatastream).await;
    assert_denied(&engine, child, CreateChild).await;
    assert_denied(&engine, child, AddAcl).await;

    for ds in [
        "/testparent1/testchild4WithACL/tsc1_data",
        "/testparent1/testchild4WithACL/tsc2_data",
    ] {
        assert_denied(&engine, ds, Read).await;
        assert_denied(&engine, ds, UpdateDatastream).await;
        assert_denied(&engine, ds, AddAcl).await;
    }
}

#[tokio::test]
async fn test_admin_object_with_open_datastream() {
    let engine = engine();
    let obj = "/testparent2/testchild5WithACL";

    assert_denied(&engine, obj, Read).await;
    assert_denied(&engine, obj, CreateDatastream).await;
    assert_denied(&engine, obj, CreateChild).await;
    assert_denied(&engine, obj, AddAcl).await;

    let open_ds = "/testparent2/testchild5WithACL/tsc2_data";
    assert_allowed(&engine, open_ds, Read).await;
    assert_denied(&engine, open_ds, UpdateDatastream).await;
    assert_denied(&engine, open_ds, AddAcl).await;

    // Not open, and the admin-only ACL above it grants the reader nothing.
    assert_denied(&engine, "/testparent2/testchild5WithACL/tsc1_data", Read).await;
}

#[tokio::test]
async fn test_deletions() {
    let engine = engine();
    for path in [
        "/testparent3",
        "/testparent3/tsp1_data",
        "/testparent3/tsp2_data",
        "/testparent3/testchild3a",
        "/testparent3/testchild3b",
    ] {
        assert_denied(&engine, path, Delete).await;
    }
}

#[tokio::test]
async fn test_root_node() {
    let engine = engine();
    assert_denied(&engine, "/", Read).await;
    assert_denied(&engine, "/", CreateDatastream).await;
    assert_denied(&engine, "/", CreateChild).await;
    assert_denied(&engine, "/", AddAcl).await;
}

#[tokio::test]
async fn test_not_yet_created_paths_follow_their_container() {
    let engine = engine();
    // Targets that would be created by the request itself.
    assert_allowed(&engine, "/testparent1/testchild1NoACL/readertestchild", Read).await;
    assert_denied(&engine, "/testparent1/readertestds", UpdateDatastream).await;
    // The nearest existing ancestor is open, but a missing target never is.
    assert_denied(&engine, "/testparent2/testchild5WithACL/new", Read).await;
    assert_denied(&engine, "/readertestchild", Read).await;
}
