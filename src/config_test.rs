use std::sync::{Mutex, MutexGuard, PoisonError};

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers hold [`env_lock`] so no other test touches the environment.
unsafe fn clear_clinica_env() {
    unsafe {
        std::env::remove_var("CLINICA_API_URL");
        std::env::remove_var("CLINICA_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("CLINICA_REFRESH_TIMEOUT_SECS");
        std::env::remove_var("CLINICA_STATE_DIR");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_lock();
    unsafe { clear_clinica_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.refresh_timeout(), Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS));
    assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    assert_eq!(cfg.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_clinica_env();
        std::env::set_var("CLINICA_API_URL", "https://api.clinica.test/");
        std::env::set_var("CLINICA_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("CLINICA_REFRESH_TIMEOUT_SECS", "3");
        std::env::set_var("CLINICA_STATE_DIR", "/tmp/clinica-state");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://api.clinica.test");
    assert_eq!(cfg.timeouts, ClientTimeouts { request_secs: 5, refresh_secs: 3 });
    assert_eq!(cfg.state_dir, PathBuf::from("/tmp/clinica-state"));

    unsafe { clear_clinica_env() };
}

#[test]
fn from_env_ignores_unparseable_timeouts() {
    let _guard = env_lock();
    unsafe {
        clear_clinica_env();
        std::env::set_var("CLINICA_REFRESH_TIMEOUT_SECS", "soon");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.refresh_secs, DEFAULT_REFRESH_TIMEOUT_SECS);

    unsafe { clear_clinica_env() };
}

#[test]
fn build_rejects_non_http_url() {
    let timeouts = ClientTimeouts { request_secs: 1, refresh_secs: 1 };
    let err = ClientConfig::build("localhost:8000", timeouts, PathBuf::new()).unwrap_err();
    assert_eq!(err, ConfigError::InvalidApiUrl("localhost:8000".to_owned()));
    assert!(ClientConfig::build("https://", timeouts, PathBuf::new()).is_err());
}

#[test]
fn build_rejects_zero_timeouts() {
    let err = ClientConfig::build(
        DEFAULT_API_URL,
        ClientTimeouts { request_secs: 30, refresh_secs: 0 },
        PathBuf::new(),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::ZeroTimeout { var: "CLINICA_REFRESH_TIMEOUT_SECS" });
}

#[test]
fn url_for_joins_base_and_path() {
    let cfg = ClientConfig::default();
    assert_eq!(cfg.url_for("/api/v1/doctors"), "http://localhost:8000/api/v1/doctors");
}
