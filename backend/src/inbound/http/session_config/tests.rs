//! Unit tests for session configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use std::collections::HashMap;
use uuid::Uuid;

struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(len: usize) -> Self {
        let path = std::env::temp_dir().join(format!("orderdesk-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write temporary key file");
        Self { path }
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn key_file() -> TempKeyFile {
    TempKeyFile::new(SESSION_KEY_MIN_LEN)
}

fn release_vars(key_file: &TempKeyFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key_file.path_str()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

#[rstest]
fn release_accepts_complete_configuration(key_file: TempKeyFile) {
    let env = mock_env(release_vars(&key_file));

    let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.fingerprint().len(), 16);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_rejects_missing_toggle(key_file: TempKeyFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&key_file);
    vars.remove(missing);

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);

    assert!(matches!(
        result,
        Err(SessionConfigError::MissingEnv { name }) if name == missing
    ));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(COOKIE_SECURE_ENV, "")]
#[case(SAMESITE_ENV, "sideways")]
#[case(ALLOW_EPHEMERAL_ENV, "perhaps")]
fn release_rejects_malformed_toggle(
    key_file: TempKeyFile,
    #[case] variable: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&key_file);
    vars.insert(variable, value.to_owned());

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);

    assert!(matches!(
        result,
        Err(SessionConfigError::InvalidEnv { name, .. }) if name == variable
    ));
}

#[rstest]
fn release_rejects_ephemeral_keys(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::EphemeralNotAllowed)));
}

#[rstest]
fn release_rejects_insecure_same_site_none(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::InsecureSameSiteNone)));
}

#[rstest]
fn release_rejects_short_key() {
    let short = TempKeyFile::new(DEBUG_KEY_MIN_LEN);
    let env = mock_env(release_vars(&short));

    let result = session_settings_from_env(&env, BuildMode::Release);

    assert!(matches!(
        result,
        Err(SessionConfigError::KeyTooShort { length: DEBUG_KEY_MIN_LEN, .. })
    ));
}

#[rstest]
fn release_rejects_unreadable_key(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(
        KEY_FILE_ENV,
        format!("/nonexistent/orderdesk-{}", Uuid::new_v4()),
    );

    let result = session_settings_from_env(&mock_env(vars), BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::KeyRead { .. })));
}

#[rstest]
fn debug_defaults_every_toggle() {
    let vars = HashMap::from([(
        KEY_FILE_ENV,
        format!("/nonexistent/orderdesk-{}", Uuid::new_v4()),
    )]);

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug defaults");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_tolerates_malformed_same_site(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(SAMESITE_ENV, "unexpected".to_owned());

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug fallback");

    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
#[case("TRUE", Some(true))]
#[case(" n ", Some(false))]
#[case("2", None)]
fn booleans_accept_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}

#[rstest]
fn default_cookie_policy_uses_session_name_and_hour_window() {
    let policy = SessionCookiePolicy::default();
    assert_eq!(policy.cookie_name, "session");
    assert_eq!(policy.window, chrono::Duration::minutes(60));
}

#[rstest]
fn process_environment_feeds_release_settings(key_file: TempKeyFile) {
    let _guard = env_lock::lock_env([
        (KEY_FILE_ENV, Some(key_file.path_str())),
        (COOKIE_SECURE_ENV, Some("1".to_owned())),
        (SAMESITE_ENV, Some("Strict".to_owned())),
        (ALLOW_EPHEMERAL_ENV, Some("0".to_owned())),
    ]);

    let settings = session_settings_from_env(&mockable::DefaultEnv::new(), BuildMode::Release)
        .expect("settings from process environment");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}
