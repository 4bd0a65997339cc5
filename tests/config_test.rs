//! # Config File Tests
//!
//! Loading TOML config files from disk and the anon key environment
//! fallback.
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test --test config_test
//! ```

use std::io::Write;
use std::path::PathBuf;

use brisk::config::{AppConfig, BackendConfig, ConfigError, ANON_KEY_ENV};

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brisk.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    (dir, path)
}

const HOSTED_WITHOUT_KEY: &str = r#"
port = 4000
bind = "127.0.0.1"

[backend]
type = "hosted"
url = "https://project.supabase.co"
request_timeout_secs = 15
"#;

#[test]
fn test_load_local_config() {
    let (_dir, path) = write_config(
        r#"
[backend]
type = "local"
sqlite_file = "data/brisk.sqlite"
"#,
    );

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.port, 3000);
    match config.backend {
        BackendConfig::Local(local) => {
            assert_eq!(local.sqlite_file, PathBuf::from("data/brisk.sqlite"))
        }
        other => panic!("expected local backend, got {:?}", other),
    }
}

#[test]
fn test_anon_key_falls_back_to_environment() {
    let (_dir, path) = write_config(HOSTED_WITHOUT_KEY);

    temp_env::with_var(ANON_KEY_ENV, Some("env-anon-key"), || {
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.bind, "127.0.0.1");

        let BackendConfig::Hosted(hosted) = &config.backend else {
            panic!("expected hosted backend");
        };
        let hosted = hosted.to_hosted_config().unwrap();
        assert_eq!(hosted.anon_key, "env-anon-key");
        assert_eq!(hosted.request_timeout, Some(std::time::Duration::from_secs(15)));
    });
}

#[test]
fn test_file_anon_key_wins_over_environment() {
    let (_dir, path) = write_config(
        r#"
[backend]
type = "hosted"
url = "https://project.supabase.co"
anon_key = "file-key"
"#,
    );

    temp_env::with_var(ANON_KEY_ENV, Some("env-anon-key"), || {
        let config = AppConfig::load(&path).unwrap();
        let BackendConfig::Hosted(hosted) = &config.backend else {
            panic!("expected hosted backend");
        };
        assert_eq!(hosted.resolve_anon_key().unwrap(), "file-key");
    });
}

#[test]
fn test_missing_anon_key_is_invalid() {
    let (_dir, path) = write_config(HOSTED_WITHOUT_KEY);

    temp_env::with_var_unset(ANON_KEY_ENV, || {
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains(ANON_KEY_ENV));
    });
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = AppConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let (_dir, path) = write_config("port = \"not a number\"\n[backend]\ntype = \"local\"\nsqlite_file = \"x\"\n");

    let err = AppConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("brisk.toml"));
}
