use classroom::config::{ConfigError, ConfigLoader};
use std::{
    env, fs,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

const KEYS: &[&str] = &[
    "CLASSROOM_PROFILE",
    "CLASSROOM_API_BIND_ADDR",
    "CLASSROOM_LOG_LEVEL",
    "CLASSROOM_LOG_FORMAT",
    "CLASSROOM_DATABASE_URL",
    "CLASSROOM_DB_MAX_CONNECTIONS",
    "CLASSROOM_AUDIT_ACTOR",
    "CLASSROOM_AUTO_MIGRATE",
];

fn clear_env() {
    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let cfg = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.log_format, "json");
    assert_eq!(cfg.database_url, "sqlite://classroom.db?mode=rwc");
    assert_eq!(cfg.db_max_connections, 10);
    assert_eq!(cfg.audit_actor, "classroom-api");
    assert!(cfg.auto_migrate);
    cfg.bind_addr().expect("default bind addr parses");
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "CLASSROOM_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.local",
        "CLASSROOM_PROFILE=test\nCLASSROOM_API_BIND_ADDR=127.0.0.1:4000\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test",
        "CLASSROOM_API_BIND_ADDR=192.168.0.10:5000\nCLASSROOM_AUDIT_ACTOR=test-runner\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "CLASSROOM_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    let cfg = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .expect("layered config loads");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.audit_actor, "test-runner");
}

#[test]
fn process_env_overrides_files() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "CLASSROOM_LOG_LEVEL=warn\nCLASSROOM_AUTO_MIGRATE=true\nUNRELATED=1\n",
    );

    unsafe {
        env::set_var("CLASSROOM_LOG_LEVEL", "debug");
        env::set_var("CLASSROOM_AUTO_MIGRATE", "no");
    }

    let cfg = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .expect("config loads");

    assert_eq!(cfg.log_level, "debug");
    assert!(!cfg.auto_migrate);
    clear_env();
}

#[test]
fn invalid_bind_addr_is_rejected() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("CLASSROOM_API_BIND_ADDR", "not-an-address");
    }

    let temp_dir = TempDir::new().unwrap();
    let err = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    clear_env();
}

#[test]
fn invalid_values_are_rejected() {
    let _guard = env_guard();
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());

    unsafe {
        env::set_var("CLASSROOM_AUTO_MIGRATE", "sometimes");
    }
    assert!(matches!(
        loader.load().unwrap_err(),
        ConfigError::InvalidBool { .. }
    ));
    clear_env();

    unsafe {
        env::set_var("CLASSROOM_LOG_FORMAT", "xml");
    }
    assert!(matches!(
        loader.load().unwrap_err(),
        ConfigError::InvalidLogFormat { .. }
    ));
    clear_env();

    unsafe {
        env::set_var("CLASSROOM_DB_MAX_CONNECTIONS", "0");
    }
    assert!(matches!(
        loader.load().unwrap_err(),
        ConfigError::InvalidMaxConnections { value: 0 }
    ));
    clear_env();

    unsafe {
        env::set_var("CLASSROOM_AUDIT_ACTOR", "   ");
    }
    assert!(matches!(
        loader.load().unwrap_err(),
        ConfigError::MissingAuditActor
    ));
    clear_env();
}
