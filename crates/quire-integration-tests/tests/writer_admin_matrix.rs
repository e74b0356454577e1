//! Integration tests for the writer and admin roles across the canonical
//! repository.

use quire_authz::{DecisionEngine, Reason};
use quire_core::Operation::{AddAcl, CreateChild, CreateDatastream, Delete, Read, UpdateDatastream};
use quire_core::{Operation, Requester, Role};
use quire_test::{test_admin, test_engine, test_path, test_roles_repository, test_writer};

async fn allowed(engine: &DecisionEngine, who: &Requester, path: &str, op: Operation) -> bool {
    engine
        .decide(who, &test_path(path), op)
        .await
        .unwrap()
        .is_allowed()
}

#[tokio::test]
async fn test_writer_writes_but_never_administers() {
    let engine = test_engine(&test_roles_repository());
    let writer = test_writer();

    for obj in ["/testparent1", "/testparent1/testchild1NoACL", "/testparent1/testchild4WithACL"] {
        assert!(allowed(&engine, &writer, obj, Read).await, "{obj}");
        assert!(allowed(&engine, &writer, obj, CreateChild).await, "{obj}");
        assert!(allowed(&engine, &writer, obj, CreateDatastream).await, "{obj}");
        assert!(!allowed(&engine, &writer, obj, AddAcl).await, "{obj}");
        assert!(!allowed(&engine, &writer, obj, Delete).await, "{obj}");
    }

    assert!(allowed(&engine, &writer, "/testparent1/testchild4WithACL/tsc1_data", UpdateDatastream).await);
    assert!(!allowed(&engine, &writer, "/testparent1/testchild4WithACL/tsc2_data", Read).await);
}

#[tokio::test]
async fn test_writer_loses_grant_where_acl_omits_it() {
    let engine = test_engine(&test_roles_repository());
    let writer = test_writer();

    // tsp2_data re-grants only reader and admin.
    assert!(!allowed(&engine, &writer, "/testparent2/tsp2_data", UpdateDatastream).await);
    assert!(!allowed(&engine, &writer, "/testparent2/tsp2_data", Read).await);
    // The writer is not named at all under testchild5WithACL.
    let eval = engine
        .evaluate(&writer, &test_path("/testparent2/testchild5WithACL"), CreateChild)
        .await
        .unwrap();
    assert!(matches!(eval.reason, Reason::NoMatchingEntry { .. }));
}

#[tokio::test]
async fn test_admin_everywhere_an_acl_names_them() {
    let repo = test_roles_repository();
    let engine = test_engine(&repo);
    let admin = test_admin();

    for resource in repo.resources() {
        let path = resource.path.as_str();
        let expected = !resource.path.is_root();
        for op in Operation::ALL {
            assert_eq!(
                allowed(&engine, &admin, path, op).await,
                expected,
                "{op} on {path}"
            );
        }
    }
}

#[tokio::test]
async fn test_admin_grant_is_reported_with_its_origin() {
    let engine = test_engine(&test_roles_repository());
    let eval = engine
        .evaluate(
            &test_admin(),
            &test_path("/testparent3/testchild3b"),
            Delete,
        )
        .await
        .unwrap();
    assert_eq!(
        eval.reason,
        Reason::Granted {
            role: Role::Admin,
            acl_defined_on: test_path("/testparent3"),
        }
    );
}

#[tokio::test]
async fn test_group_membership_grants_through_named_entries() {
    let repo = test_roles_repository();
    repo.set_acl(
        &test_path("/testparent3/testchild3b"),
        vec![quire_core::StoredAclEntry::new("curators", "writer")],
    )
    .unwrap();
    let engine = test_engine(&repo);

    let curator = Requester::user("someone").with_group("curators");
    assert!(allowed(&engine, &curator, "/testparent3/testchild3b", CreateDatastream).await);
    // The own ACL replaces the parent's, so the admin loses access here.
    assert!(!allowed(&engine, &test_admin(), "/testparent3/testchild3b", Delete).await);
}
