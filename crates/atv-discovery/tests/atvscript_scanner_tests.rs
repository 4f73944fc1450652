//! `AtvScriptScanner` against a scripted stand-in for `atvscript`

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

use atv_discovery::{
    AtvScriptScanner, DeviceDirectory, DeviceScanner, DiscoveryError, DiscoverySettings,
    ScanOptions,
};
use atv_process::ProcessError;
use tempfile::TempDir;

fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("atvscript");
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

const SCAN_SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
cat <<'JSON'
{"result": "success", "devices": [
  {"name": "Living Room", "address": "10.0.0.5", "identifier": "AA:BB:CC:DD:EE:01",
   "device_info": {"mac": "AA:BB:CC:DD:EE:01", "model": "Gen4K", "model_str": "Apple TV 4K",
                   "operating_system": "TvOS", "version": "17.4"}},
  {"name": "Speaker", "address": "10.0.0.7", "identifier": "AA:BB:CC:DD:EE:02",
   "device_info": {"mac": "AA:BB:CC:DD:EE:02", "model": "HomePod"}}
]}
JSON
"#;

/// Retry spawn failures caused by another test thread still holding the script open
async fn scan_with_retry(
    scanner: &AtvScriptScanner,
    options: &ScanOptions,
) -> atv_discovery::Result<Vec<atv_discovery::DeviceInfo>> {
    let mut result = scanner.scan(options).await;
    for _ in 0..20 {
        match &result {
            Err(DiscoveryError::Process(ProcessError::SpawnFailed { .. })) => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                result = scanner.scan(options).await;
            }
            _ => break,
        }
    }
    result
}

#[tokio::test]
async fn test_unicast_scan_passes_hosts() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, SCAN_SCRIPT);
    let scanner = AtvScriptScanner::new(script.to_string_lossy());

    let options = ScanOptions::unicast(vec!["10.0.0.5".to_string(), "10.0.0.7".to_string()]);
    let devices = scan_with_retry(&scanner, &options).await.unwrap();

    assert_eq!(devices.len(), 2);
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec!["--scan-hosts", "10.0.0.5,10.0.0.7", "scan"]
    );
}

#[tokio::test]
async fn test_directory_over_real_scanner() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, SCAN_SCRIPT);
    let scanner = AtvScriptScanner::new(script.to_string_lossy());
    // Warm up until the freshly written script is executable by this process
    scan_with_retry(&scanner, &ScanOptions::multicast()).await.unwrap();

    let directory = DeviceDirectory::new(scanner);
    let found = directory.discover(&DiscoverySettings::default()).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Living Room");
    assert_eq!(
        directory.device("aa:bb:cc:dd:ee:02").map(|d| d.name),
        Some("Speaker".to_string())
    );
}

#[tokio::test]
async fn test_failure_report_is_scan_error() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "#!/bin/sh\necho '{\"result\": \"failure\", \"error\": \"timeout\"}'\nexit 1\n",
    );
    let scanner = AtvScriptScanner::new(script.to_string_lossy());

    let result = scan_with_retry(&scanner, &ScanOptions::multicast()).await;

    assert!(matches!(result, Err(DiscoveryError::Scan(message)) if message == "timeout"));
}

#[tokio::test]
async fn test_scan_timeout() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "#!/bin/sh\nexec sleep 30\n");
    let scanner = AtvScriptScanner::new(script.to_string_lossy()).with_timeout(Duration::from_millis(300));

    let result = scan_with_retry(&scanner, &ScanOptions::multicast()).await;

    assert!(matches!(
        result,
        Err(DiscoveryError::Process(ProcessError::Timeout { .. }))
    ));
}
