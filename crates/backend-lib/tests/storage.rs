//! Credential persistence across restarts with the flat-file store.

use backend_lib::{
    config::{Settings, MAX_TOKEN_TTL_SECS},
    AppState,
};
use tempfile::TempDir;

fn settings_in(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = "storage-secret".to_string();
    settings.data_dir = Some(dir.path().to_path_buf());
    settings
}

#[tokio::test]
async fn accounts_survive_restart() {
    let dir = TempDir::new().unwrap();

    let first = AppState::from_settings(settings_in(&dir)).unwrap();
    first.auth.register("a@x.com", "pw1".into()).await.unwrap();
    let pair = first.auth.login("a@x.com", "pw1").await.unwrap();
    drop(first);

    let second = AppState::from_settings(settings_in(&dir)).unwrap();
    assert!(second.auth.login("a@x.com", "pw2").await.is_err());

    // Same secret: the refresh token issued before the restart is still current
    let rotated = second.auth.refresh(&pair.refresh_token).await.unwrap();
    assert_eq!(
        second.auth.authenticate(&rotated.access_token).await.unwrap(),
        "a@x.com"
    );
    assert!(second.auth.refresh(&pair.refresh_token).await.is_err());
}

#[tokio::test]
async fn state_requires_secret() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings_in(&dir);
    settings.auth.jwt_secret.clear();
    assert!(AppState::from_settings(settings).is_err());
}

#[tokio::test]
async fn state_rejects_unrepresentable_ttl() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings_in(&dir);
    settings.auth.refresh_token_ttl_secs = 10_u64.pow(16);
    assert!(AppState::from_settings(settings).is_err());

    // The longest accepted lifetimes still issue tokens
    let mut settings = settings_in(&dir);
    settings.auth.access_token_ttl_secs = MAX_TOKEN_TTL_SECS - 1;
    settings.auth.refresh_token_ttl_secs = MAX_TOKEN_TTL_SECS;
    let state = AppState::from_settings(settings).unwrap();
    state.auth.register("a@x.com", "pw1".into()).await.unwrap();
    let pair = state.auth.login("a@x.com", "pw1").await.unwrap();
    assert!(state.auth.refresh(&pair.refresh_token).await.is_ok());
}
