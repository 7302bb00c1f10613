use mindwtr_sync::{SyncConfig, SyncError, SyncOptions, TargetConfig};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

// ── Defaults ────────────────────────────────────────────────────

#[test]
fn sync_config_default() {
    let cfg = SyncConfig::default();
    assert_eq!(cfg.local_path, PathBuf::from("data.json"));
    assert!(cfg.seed_empty_target);
    assert!(cfg.pretty);
    assert!(matches!(cfg.target, TargetConfig::File { .. }));
}

#[test]
fn options_follow_config() {
    let cfg = SyncConfig {
        seed_empty_target: false,
        ..Default::default()
    };
    assert_eq!(
        cfg.options(),
        SyncOptions {
            seed_empty_target: false
        }
    );
    assert!(SyncOptions::default().seed_empty_target);
}

// ── Parsing ─────────────────────────────────────────────────────

#[test]
fn parses_file_target() {
    let cfg: SyncConfig = serde_json::from_str(
        r#"{"localPath":"/home/me/data.json","target":{"kind":"file","path":"/sync/data.json"}}"#,
    )
    .unwrap();
    assert_eq!(cfg.local_path, PathBuf::from("/home/me/data.json"));
    assert!(cfg.seed_empty_target);
    match cfg.target {
        TargetConfig::File { path } => assert_eq!(path, PathBuf::from("/sync/data.json")),
        other => panic!("expected file target, got {other:?}"),
    }
}

#[test]
fn parses_webdav_target() {
    let cfg: SyncConfig = serde_json::from_str(
        r#"{
            "localPath": "data.json",
            "seedEmptyTarget": false,
            "pretty": false,
            "target": {
                "kind": "webdav",
                "url": "https://dav.example.com/mindwtr/data.json",
                "username": "alice",
                "password": "secret",
                "headers": {"X-Client": "mindwtr"}
            }
        }"#,
    )
    .unwrap();
    assert!(!cfg.seed_empty_target);
    assert!(!cfg.pretty);
    match cfg.target {
        TargetConfig::WebDav(dav) => {
            assert_eq!(dav.url, "https://dav.example.com/mindwtr/data.json");
            assert_eq!(dav.username.as_deref(), Some("alice"));
            assert_eq!(dav.headers["X-Client"], "mindwtr");
            assert_eq!(dav.timeout_secs, 60);
        }
        other => panic!("expected WebDAV target, got {other:?}"),
    }
}

#[test]
fn unknown_target_kind_is_rejected() {
    let result: Result<SyncConfig, _> = serde_json::from_str(
        r#"{"localPath":"data.json","target":{"kind":"dropbox"}}"#,
    );
    assert!(result.is_err());
}

// ── Loading ─────────────────────────────────────────────────────

#[tokio::test]
async fn load_reads_json_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sync.json");
    std::fs::write(
        &path,
        r#"{"localPath":"local.json","target":{"kind":"file","path":"remote.json"}}"#,
    )
    .unwrap();

    let cfg = SyncConfig::load(&path).await.unwrap();
    assert_eq!(cfg.local_path, PathBuf::from("local.json"));
}

#[tokio::test]
async fn load_missing_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let err = SyncConfig::load(temp.path().join("absent.json")).await.unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "got {err:?}");
}

#[tokio::test]
async fn load_malformed_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sync.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = SyncConfig::load(&path).await.unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "got {err:?}");
}

// ── Building stores ─────────────────────────────────────────────

#[test]
fn builds_file_stores() {
    let cfg = SyncConfig {
        local_path: PathBuf::from("/data/local.json"),
        target: TargetConfig::File {
            path: PathBuf::from("/data/shared.json"),
        },
        ..Default::default()
    };
    assert_eq!(cfg.build_local().describe(), "file /data/local.json");
    assert_eq!(cfg.build_target().unwrap().describe(), "file /data/shared.json");
}

#[test]
fn blank_webdav_url_is_config_error() {
    let cfg = SyncConfig {
        target: TargetConfig::WebDav(mindwtr_sync::WebDavConfig::new("  ")),
        ..Default::default()
    };
    let err = cfg.build_target().err().unwrap();
    assert!(matches!(err, SyncError::Config(_)), "got {err:?}");
}
