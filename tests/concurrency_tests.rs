//! Overlapping units of work against file-backed SQLite.
//!
//! With several pooled connections the store reports lost races as
//! unique violations or `BUSY`; both must come back as retryable conflicts.
//! Through `db::init_pool` the pool is clamped so writers queue instead.

#[path = "test_utils/mod.rs"]
mod test_utils;

use std::future::Future;
use std::time::Duration;

use classroom::config::AppConfig;
use classroom::db;
use classroom::error::ServiceError;
use classroom::models::EntityKind;
use classroom::services::{ClassroomService, EntityResolver, TxScope};
use tempfile::TempDir;

use test_utils::{emails, row_counts, setup_file_db, test_actor};

const WORKERS: usize = 8;
const MAX_ATTEMPTS: usize = 100;

/// Runs `op` until it succeeds, failing the test on a non-retryable error.
/// Returns the value and the number of retryable failures seen on the way.
async fn until_settled<T, F, Fut>(mut op: F) -> (T, usize)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut conflicts = 0;
    for attempt in 1..=MAX_ATTEMPTS {
        match op().await {
            Ok(value) => return (value, conflicts),
            Err(err) if err.is_retryable() => {
                assert!(matches!(err, ServiceError::Conflict(_)), "got {err:?}");
                conflicts += 1;
                tokio::time::sleep(Duration::from_millis(2 * attempt as u64)).await;
            }
            Err(err) => panic!("non-retryable error under contention: {err:?}"),
        }
    }
    panic!("no success after {MAX_ATTEMPTS} attempts");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_first_creations_fail_only_with_conflicts() {
    let dir = TempDir::new().unwrap();
    let db = setup_file_db(dir.path(), WORKERS as u32).await.unwrap();

    for round in 0..5 {
        let email = format!("race{round}@x.com");
        let mut handles = Vec::new();
        for _ in 0..WORKERS {
            let db = db.clone();
            let email = email.clone();
            handles.push(tokio::spawn(async move {
                let actor = test_actor();
                let resolver = EntityResolver::new(&db, &actor);
                let (person, _conflicts) = until_settled(|| {
                    resolver.get_or_create(EntityKind::Student, &email, TxScope::Own)
                })
                .await;
                person.id()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        assert!(ids.iter().all(|id| *id == ids[0]), "round {round}: {ids:?}");
    }

    assert_eq!(row_counts(&db).await.unwrap(), (0, 5, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_registrations_of_one_pair_converge_on_one_link() {
    let dir = TempDir::new().unwrap();
    let db = setup_file_db(dir.path(), WORKERS as u32).await.unwrap();
    let service = ClassroomService::new(db.clone(), test_actor());

    let mut handles = Vec::new();
    for _ in 0..WORKERS {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let students = emails(&["pair-student@x.com"]);
            until_settled(|| service.register_students("pair-teacher@x.com", &students)).await
        }));
    }
    for handle in handles {
        let (registration, _conflicts) = handle.await.unwrap();
        assert_eq!(registration.registered_count, 1);
    }

    assert_eq!(row_counts(&db).await.unwrap(), (1, 1, 1));
    assert_eq!(
        service
            .roster_of("pair-teacher@x.com", None)
            .await
            .unwrap(),
        vec!["pair-student@x.com"]
    );
}

async fn init_file_pool(dir: &TempDir) -> sea_orm::DatabaseConnection {
    let config = AppConfig {
        database_url: format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("classroom.db").display()
        ),
        db_max_connections: WORKERS as u32,
        ..AppConfig::default()
    };
    let db = db::init_pool(&config).await.unwrap();
    db::migrate(&db).await.unwrap();
    db
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn default_sqlite_pool_runs_disjoint_registrations_without_errors() {
    let dir = TempDir::new().unwrap();
    let db = init_file_pool(&dir).await;
    let service = ClassroomService::new(db.clone(), test_actor());

    let mut handles = Vec::new();
    for worker in 0..WORKERS {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let teacher = format!("teacher{worker}@x.com");
            let students = vec![
                format!("a{worker}@x.com"),
                format!("b{worker}@x.com"),
            ];
            service.register_students(&teacher, &students).await
        }));
    }
    for handle in handles {
        let registration = handle.await.unwrap().expect("queued writers never collide");
        assert_eq!(registration.registered_count, 2);
    }

    let workers = WORKERS as u64;
    assert_eq!(
        row_counts(&db).await.unwrap(),
        (workers, 2 * workers, 2 * workers)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn default_sqlite_pool_converges_same_pair_without_errors() {
    let dir = TempDir::new().unwrap();
    let db = init_file_pool(&dir).await;
    let service = ClassroomService::new(db.clone(), test_actor());

    let mut handles = Vec::new();
    for _ in 0..WORKERS {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let students = emails(&["shared@x.com"]);
            service.register_students("ken@x.com", &students).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("queued writers never collide");
    }

    assert_eq!(row_counts(&db).await.unwrap(), (1, 1, 1));
}
