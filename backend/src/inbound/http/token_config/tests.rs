//! Unit tests for token key loading.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;
use uuid::Uuid;

struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(contents: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!("token-key-{}", Uuid::new_v4()));
        std::fs::write(&path, contents).expect("write key file");
        Self { path }
    }

    fn path_str(&self) -> String {
        self.path.to_str().expect("utf-8 temp path").to_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn missing_path() -> String {
    std::env::temp_dir()
        .join(format!("token-key-missing-{}", Uuid::new_v4()))
        .to_str()
        .expect("utf-8 temp path")
        .to_owned()
}

#[rstest]
#[case(BuildMode::Release)]
#[case(BuildMode::Debug)]
fn key_files_are_loaded(#[case] mode: BuildMode) {
    let file = TempKeyFile::new(&[7_u8; MIN_SIGNING_KEY_LEN]);
    let env = mock_env(&[(KEY_FILE_ENV, &file.path_str())]);
    let key = token_key_from_env(&env, mode).expect("key loads");
    assert_eq!(key.source(), KeySource::File);
    assert_eq!(key.into_bytes(), vec![7_u8; MIN_SIGNING_KEY_LEN]);
}

#[rstest]
fn release_rejects_short_keys() {
    let file = TempKeyFile::new(b"short");
    let env = mock_env(&[(KEY_FILE_ENV, &file.path_str())]);
    let err = token_key_from_env(&env, BuildMode::Release)
        .err()
        .expect("short key rejected");
    assert!(matches!(
        err,
        TokenConfigError::KeyTooShort { length: 5, .. }
    ));
}

#[rstest]
fn debug_tolerates_short_keys() {
    let file = TempKeyFile::new(b"short");
    let env = mock_env(&[(KEY_FILE_ENV, &file.path_str())]);
    let key = token_key_from_env(&env, BuildMode::Debug).expect("short key accepted");
    assert_eq!(key.len(), 5);
}

#[rstest]
fn release_requires_a_readable_key() {
    let path = missing_path();
    let env = mock_env(&[(KEY_FILE_ENV, &path)]);
    let err = token_key_from_env(&env, BuildMode::Release)
        .err()
        .expect("missing key rejected");
    assert!(matches!(err, TokenConfigError::KeyRead { .. }));
}

#[rstest]
#[case(&[])]
#[case(&[(ALLOW_EPHEMERAL_ENV, "yes")])]
#[case(&[(ALLOW_EPHEMERAL_ENV, "perhaps")])]
fn debug_falls_back_to_an_ephemeral_key(#[case] extra: &[(&str, &str)]) {
    let path = missing_path();
    let mut vars = vec![(KEY_FILE_ENV, path.as_str())];
    vars.extend_from_slice(extra);
    let key = token_key_from_env(&mock_env(&vars), BuildMode::Debug).expect("ephemeral key");
    assert_eq!(key.source(), KeySource::Ephemeral);
    assert!(key.len() >= MIN_SIGNING_KEY_LEN);
}

#[rstest]
fn debug_fallback_can_be_disabled() {
    let path = missing_path();
    let env = mock_env(&[(KEY_FILE_ENV, &path), (ALLOW_EPHEMERAL_ENV, "0")]);
    assert!(matches!(
        token_key_from_env(&env, BuildMode::Debug),
        Err(TokenConfigError::KeyRead { .. })
    ));
}

#[rstest]
#[case("1", "ephemeral")]
#[case("perhaps", "invalid")]
fn release_validates_the_ephemeral_toggle(#[case] value: &str, #[case] expected: &str) {
    let file = TempKeyFile::new(&[1_u8; MIN_SIGNING_KEY_LEN]);
    let env = mock_env(&[
        (KEY_FILE_ENV, &file.path_str()),
        (ALLOW_EPHEMERAL_ENV, value),
    ]);
    let err = token_key_from_env(&env, BuildMode::Release)
        .err()
        .expect("toggle rejected");
    match expected {
        "ephemeral" => assert!(matches!(err, TokenConfigError::EphemeralNotAllowed)),
        _ => assert!(matches!(err, TokenConfigError::InvalidEnv { .. })),
    }
}

#[rstest]
fn fingerprints_are_short_stable_hex() {
    let file = TempKeyFile::new(&[9_u8; MIN_SIGNING_KEY_LEN]);
    let env = mock_env(&[(KEY_FILE_ENV, &file.path_str())]);
    let first = token_key_from_env(&env, BuildMode::Release).expect("key");
    let second = token_key_from_env(&env, BuildMode::Release).expect("key");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.fingerprint().len(), FINGERPRINT_BYTES * 2);
    assert!(first.fingerprint().chars().all(|c| c.is_ascii_hexdigit()));
}
