use base64::Engine;
use secrecy::ExposeSecret;
use tempfile::TempDir;
use webui_core::Error;
use webui_core::secret_key::{DEFAULT_KEY_FILE, KeySource, resolve};

#[test]
fn explicit_value_wins_and_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(DEFAULT_KEY_FILE);

    let (key, source) = resolve(Some("from-env"), &key_file).unwrap();

    assert_eq!(key.expose_secret(), "from-env");
    assert_eq!(source, KeySource::Explicit);
    assert!(!key_file.exists());
}

#[test]
fn blank_explicit_value_falls_back_to_file() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(DEFAULT_KEY_FILE);
    std::fs::write(&key_file, "stored-key\n").unwrap();

    let (key, source) = resolve(Some("   "), &key_file).unwrap();

    assert_eq!(key.expose_secret(), "stored-key");
    assert_eq!(source, KeySource::File);
}

#[test]
fn generates_and_persists_key_when_file_absent() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(DEFAULT_KEY_FILE);

    let (key, source) = resolve(None, &key_file).unwrap();

    assert_eq!(source, KeySource::Generated);
    // 12 bytes → 16 base64 characters, no padding
    assert_eq!(key.expose_secret().len(), 16);
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(key.expose_secret())
        .unwrap();
    assert_eq!(decoded.len(), 12);

    let stored = std::fs::read_to_string(&key_file).unwrap();
    assert_eq!(stored.trim(), key.expose_secret());
}

#[test]
fn second_resolve_reuses_generated_key() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(DEFAULT_KEY_FILE);

    let (first, _) = resolve(None, &key_file).unwrap();
    let (second, source) = resolve(None, &key_file).unwrap();

    assert_eq!(source, KeySource::File);
    assert_eq!(first.expose_secret(), second.expose_secret());
}

#[test]
fn empty_key_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(DEFAULT_KEY_FILE);
    std::fs::write(&key_file, "\n").unwrap();

    let result = resolve(None, &key_file);
    assert!(matches!(result, Err(Error::EmptySecretKey(_))));
}

#[test]
fn generated_keys_differ_between_files() {
    let tmp = TempDir::new().unwrap();

    let (a, _) = resolve(None, &tmp.path().join("a")).unwrap();
    let (b, _) = resolve(None, &tmp.path().join("b")).unwrap();

    assert_ne!(a.expose_secret(), b.expose_secret());
}

#[cfg(unix)]
#[test]
fn generated_key_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let key_file = tmp.path().join(DEFAULT_KEY_FILE);

    resolve(None, &key_file).unwrap();

    let mode = std::fs::metadata(&key_file).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
