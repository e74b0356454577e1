//! Integration tests for evaluation failures and malformed ACL data.

use std::sync::Arc;

use quire_authz::{AuthzError, DecisionEngine, DecisionOutcome, MemoryRepository, Reason, StorageError};
use quire_core::{Decision, Operation, Requester, Role, StoredAclEntry};
use quire_test::{
    FailingAcls, FailingTree, test_audited_engine, test_path, test_reader, test_roles_repository,
};

#[tokio::test]
async fn test_unavailable_tree_is_an_error_not_a_denial() {
    let repo = test_roles_repository();
    let engine = DecisionEngine::new(Arc::new(FailingTree::new("disk gone")), repo)
        .with_sink(Arc::new(quire_authz::NullSink));

    let err = engine
        .decide(&test_reader(), &test_path("/testparent1"), Operation::Read)
        .await
        .unwrap_err();
    assert!(err.is_storage());
    assert!(matches!(
        err,
        AuthzError::StorageUnavailable(StorageError::Unavailable(ref m)) if m == "disk gone"
    ));
}

#[tokio::test]
async fn test_acl_timeout_is_audited_as_failed() {
    let repo = test_roles_repository();
    let sink = Arc::new(quire_authz::MemorySink::new());
    let engine = DecisionEngine::new(repo, Arc::new(FailingAcls::new(500))).with_sink(sink.clone());

    // Open resources never reach the ACL store on READ.
    let open = engine
        .decide(&test_reader(), &test_path("/testparent1"), Operation::Read)
        .await
        .unwrap();
    assert_eq!(open, Decision::Allow);

    let err = engine
        .decide(&test_reader(), &test_path("/testparent1"), Operation::Delete)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthzError::StorageUnavailable(StorageError::Timeout { timeout_ms: 500 })
    ));

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].outcome.decision(), Some(Decision::Allow));
    assert!(matches!(records[1].outcome, DecisionOutcome::Failed { .. }));
}

#[tokio::test]
async fn test_malformed_entries_are_skipped() {
    let repo = test_roles_repository();
    repo.set_acl(
        &test_path("/testparent3/testchild3b"),
        vec![
            StoredAclEntry::new("user:", "admin"),
            StoredAclEntry::new("examplereader", "superuser"),
            StoredAclEntry::new("examplereader", "writer"),
        ],
    )
    .unwrap();
    let (engine, _) = test_audited_engine(&repo);

    let eval = engine
        .evaluate(&test_reader(), &test_path("/testparent3/testchild3b"), Operation::CreateChild)
        .await
        .unwrap();
    assert_eq!(
        eval.reason,
        Reason::Granted {
            role: Role::Writer,
            acl_defined_on: test_path("/testparent3/testchild3b"),
        }
    );
}

#[tokio::test]
async fn test_all_malformed_acl_still_governs() {
    let repo = test_roles_repository();
    let child = test_path("/testparent3/testchild3b");
    repo.set_acl(&child, vec![StoredAclEntry::new("examplereader", "owner")])
        .unwrap();
    let (engine, _) = test_audited_engine(&repo);

    let eval = engine.evaluate(&test_reader(), &child, Operation::Read).await.unwrap();
    assert_eq!(
        eval.reason,
        Reason::NoMatchingEntry {
            acl_defined_on: child
        }
    );
}

#[tokio::test]
async fn test_unknown_operation_fails_loudly() {
    let repo = test_roles_repository();
    let (engine, sink) = test_audited_engine(&repo);

    let err = engine
        .decide_named(&test_reader(), &test_path("/testparent1"), "PURGE")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthzError::UnknownOperation(ref op) if op == "PURGE"));
    assert!(sink.is_empty());

    let ok = engine
        .decide_named(&test_reader(), &test_path("/testparent1"), "read")
        .await
        .unwrap();
    assert_eq!(ok, Decision::Allow);
}

#[tokio::test]
async fn test_snapshot_file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("repo.toml");
    std::fs::write(&file, quire_test::ROLES_SNAPSHOT).unwrap();

    let repo = Arc::new(MemoryRepository::load_snapshot(&file).unwrap());
    let (engine, _) = test_audited_engine(&repo);
    let anonymous = Requester::anonymous();

    assert!(engine
        .decide(&anonymous, &test_path("/testparent2/testchild5WithACL/tsc2_data"), Operation::Read)
        .await
        .unwrap()
        .is_allowed());
    assert!(!engine
        .decide(&anonymous, &test_path("/"), Operation::Read)
        .await
        .unwrap()
        .is_allowed());
}
