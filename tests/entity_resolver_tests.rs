//! Get-or-create behaviour of the entity resolver.

#[path = "test_utils/mod.rs"]
mod test_utils;

use classroom::error::ServiceError;
use classroom::models::{EntityKind, Person, STATUS_INACTIVE};
use classroom::repositories::StudentRepository;
use classroom::services::entity_resolver::find_in;
use classroom::services::{EntityResolver, TxScope};
use sea_orm::TransactionTrait;
use test_utils::{TEST_ACTOR, row_counts, setup_test_db, test_actor};

#[tokio::test]
async fn creates_missing_entity_with_defaults() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    let person = resolver
        .get_or_create(EntityKind::Student, "s1@x.com", TxScope::Own)
        .await
        .unwrap();

    let Person::Student(student) = person else {
        panic!("expected a student");
    };
    assert!(student.id > 0);
    assert_eq!(student.email, "s1@x.com");
    assert_eq!(student.status, STATUS_INACTIVE);
    assert!(!student.is_suspended);
    assert_eq!(student.created_by.as_deref(), Some(TEST_ACTOR));
    assert!(student.updated_by.is_none());
}

#[tokio::test]
async fn repeated_resolution_returns_same_row() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    let first = resolver
        .get_or_create(EntityKind::Teacher, "t@x.com", TxScope::Own)
        .await
        .unwrap();
    let second = resolver
        .get_or_create(EntityKind::Teacher, "t@x.com", TxScope::Own)
        .await
        .unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(first, second);
    assert_eq!(row_counts(&db).await.unwrap(), (1, 0, 0));
}

#[tokio::test]
async fn teachers_and_students_are_separate_namespaces() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    let teacher = resolver
        .get_or_create(EntityKind::Teacher, "both@x.com", TxScope::Own)
        .await
        .unwrap();
    let student = resolver
        .get_or_create(EntityKind::Student, "both@x.com", TxScope::Own)
        .await
        .unwrap();

    assert_eq!(teacher.kind(), EntityKind::Teacher);
    assert_eq!(student.kind(), EntityKind::Student);
    assert_eq!(row_counts(&db).await.unwrap(), (1, 1, 0));
}

#[tokio::test]
async fn blank_email_is_rejected_without_writes() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    let err = resolver
        .get_or_create(EntityKind::Student, "  ", TxScope::Own)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InvalidArgument(_)));
    assert_eq!(row_counts(&db).await.unwrap(), (0, 0, 0));
}

#[tokio::test]
async fn lookup_reports_absence_as_none() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    assert!(
        resolver
            .get_by_email(EntityKind::Teacher, "nobody@x.com")
            .await
            .unwrap()
            .is_none()
    );

    resolver
        .get_or_create(EntityKind::Teacher, "somebody@x.com", TxScope::Own)
        .await
        .unwrap();
    let found = resolver
        .get_by_email(EntityKind::Teacher, "somebody@x.com")
        .await
        .unwrap();
    assert_eq!(found.map(|p| p.email().to_string()).as_deref(), Some("somebody@x.com"));
}

#[tokio::test]
async fn lookup_is_case_sensitive() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    resolver
        .get_or_create(EntityKind::Student, "Mixed@x.com", TxScope::Own)
        .await
        .unwrap();

    assert!(
        resolver
            .get_by_email(EntityKind::Student, "mixed@x.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn duplicate_insert_surfaces_as_conflict() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let repo = StudentRepository::new(&db);

    repo.insert("dup@x.com", &actor).await.unwrap();
    let err: ServiceError = repo.insert("dup@x.com", &actor).await.unwrap_err().into();

    assert!(matches!(err, ServiceError::Conflict(_)), "got {err:?}");
    assert!(err.is_retryable());
    assert_eq!(row_counts(&db).await.unwrap(), (0, 1, 0));
}

/// On a single-connection pool, overlapping calls queue and all succeed.
#[tokio::test]
async fn queued_first_creations_share_one_row() {
    let db = setup_test_db().await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            let actor = test_actor();
            EntityResolver::new(&db, &actor)
                .get_or_create(EntityKind::Student, "race@x.com", TxScope::Own)
                .await
                .map(|person| person.id())
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }

    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(row_counts(&db).await.unwrap(), (0, 1, 0));
}

#[tokio::test]
async fn joined_scope_leaves_commit_to_the_caller() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    let txn = db.begin().await.unwrap();
    let person = resolver
        .get_or_create(EntityKind::Teacher, "joined@x.com", TxScope::Join(&txn))
        .await
        .unwrap();

    let inside = find_in(&txn, EntityKind::Teacher, "joined@x.com")
        .await
        .unwrap();
    assert_eq!(inside.map(|p| p.id()), Some(person.id()));

    txn.rollback().await.unwrap();

    assert!(
        resolver
            .get_by_email(EntityKind::Teacher, "joined@x.com")
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(row_counts(&db).await.unwrap(), (0, 0, 0));
}

#[tokio::test]
async fn joined_scope_commits_with_the_caller() {
    let db = setup_test_db().await.unwrap();
    let actor = test_actor();
    let resolver = EntityResolver::new(&db, &actor);

    let txn = db.begin().await.unwrap();
    resolver
        .get_or_create(EntityKind::Student, "a@x.com", TxScope::Join(&txn))
        .await
        .unwrap();
    resolver
        .get_or_create(EntityKind::Student, "b@x.com", TxScope::Join(&txn))
        .await
        .unwrap();
    txn.commit().await.unwrap();

    assert_eq!(row_counts(&db).await.unwrap(), (0, 2, 0));
}
