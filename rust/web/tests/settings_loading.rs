use gang_web::{AppSettings, SettingsError, SettingsOverrides, CONFIG_ENV};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const VARS: [&str; 6] = [
    CONFIG_ENV,
    "GANG_HOST",
    "GANG_PORT",
    "GANG_STATIC_DIR",
    "GANG_LOG",
    "GANG_SEED",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn load(path: Option<&std::path::Path>) -> Result<AppSettings, SettingsError> {
    AppSettings::load(path, &SettingsOverrides::default())
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
#[serial]
fn defaults_without_file_or_env() {
    clear_env();
    let settings = load(None).expect("load");
    assert_eq!(settings, AppSettings::default());
}

#[test]
#[serial]
fn file_values_override_defaults() {
    clear_env();
    let file = config_file(
        r#"
host = "0.0.0.0"
port = 4000
static_dir = "client/dist"
seed = 99
"#,
    );

    let settings = load(Some(file.path())).expect("load");
    assert_eq!(settings.host, "0.0.0.0");
    assert_eq!(settings.port, 4000);
    assert_eq!(settings.static_dir, PathBuf::from("client/dist"));
    assert_eq!(settings.seed, Some(99));
    assert_eq!(settings.log_filter, AppSettings::default().log_filter);
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let file = config_file("port = 4000\nlog_filter = \"warn\"\n");
    std::env::set_var(CONFIG_ENV, file.path());
    std::env::set_var("GANG_PORT", "5000");
    std::env::set_var("GANG_SEED", "17");

    let settings = load(None).expect("load");
    clear_env();

    assert_eq!(settings.port, 5000);
    assert_eq!(settings.log_filter, "warn");
    assert_eq!(settings.seed, Some(17));
}

#[test]
#[serial]
fn empty_env_values_are_ignored() {
    clear_env();
    std::env::set_var("GANG_HOST", "");
    let settings = load(None).expect("load");
    clear_env();
    assert_eq!(settings.host, "127.0.0.1");
}

#[test]
#[serial]
fn invalid_env_port_is_rejected() {
    clear_env();
    std::env::set_var("GANG_PORT", "not-a-port");
    let err = load(None).expect_err("bad port");
    clear_env();
    assert!(matches!(err, SettingsError::InvalidValue(_)));
}

#[test]
#[serial]
fn malformed_file_is_a_parse_error() {
    clear_env();
    let file = config_file("port = \"eighty\"");
    let err = load(Some(file.path())).expect_err("bad file");
    assert!(matches!(err, SettingsError::Parse(_)));
}

#[test]
#[serial]
fn missing_file_is_an_io_error() {
    clear_env();
    let err = load(Some(std::path::Path::new("/nonexistent/gang.toml")))
        .expect_err("missing file");
    assert!(matches!(err, SettingsError::Io { .. }));
}

#[test]
#[serial]
fn empty_host_in_file_fails_validation() {
    clear_env();
    let file = config_file("host = \"\"");
    let err = load(Some(file.path())).expect_err("empty host");
    assert!(matches!(err, SettingsError::InvalidValue(_)));
}

#[test]
#[serial]
fn flag_overrides_repair_an_invalid_file_host() {
    clear_env();
    let file = config_file("host = \"\"\nport = 4000\n");
    let overrides = SettingsOverrides {
        host: Some("0.0.0.0".to_string()),
        ..Default::default()
    };

    let settings = AppSettings::load(Some(file.path()), &overrides).expect("overridden host");
    assert_eq!(settings.host, "0.0.0.0");
    assert_eq!(settings.port, 4000);
}

#[test]
#[serial]
fn flag_overrides_beat_env() {
    clear_env();
    std::env::set_var("GANG_PORT", "5000");
    std::env::set_var("GANG_SEED", "17");
    let overrides = SettingsOverrides {
        port: Some(6000),
        ..Default::default()
    };

    let settings = AppSettings::load(None, &overrides).expect("load");
    clear_env();

    assert_eq!(settings.port, 6000);
    assert_eq!(settings.seed, Some(17));
}

#[test]
#[serial]
fn flag_overrides_cannot_hide_an_invalid_result() {
    clear_env();
    let overrides = SettingsOverrides {
        static_dir: Some(PathBuf::new()),
        ..Default::default()
    };
    let err = AppSettings::load(None, &overrides).expect_err("empty static dir");
    assert!(matches!(err, SettingsError::InvalidValue(_)));
}
