//! Binary-level tests for `hangar`

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const APP_CONFIG: &str = r#"
app_name = "demo"
primary_region = "ord"

[processes]
web = "bin/web"

[[mounts]]
source = "data"
destination = "/data"

[deploy]
strategy = "rolling"
release_command = "bin/migrate"
"#;

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn hangar() -> Command {
    let mut cmd = Command::cargo_bin("hangar").unwrap();
    cmd.env_remove("HANGAR_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn preflight_first_deploy_as_json() {
    let dir = TempDir::new().unwrap();
    let app_config = write_fixture(&dir, "app.toml", APP_CONFIG);
    let state = write_fixture(
        &dir,
        "state.json",
        r#"{
            "app": { "name": "demo", "deployed": false },
            "volumes": [ { "id": "vol_1", "name": "data" } ]
        }"#,
    );

    hangar()
        .args(["--output", "json", "preflight", "--image", "registry/demo:v1"])
        .arg("--app-config")
        .arg(&app_config)
        .arg("--state")
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"first_deploy\": true"))
        .stdout(predicate::str::contains("\"image_source\": \"explicit\""))
        .stdout(predicate::str::contains("\"reservable\": 1"));
}

#[test]
fn preflight_rejects_orphaned_mount() {
    let dir = TempDir::new().unwrap();
    let app_config = write_fixture(
        &dir,
        "app.toml",
        "app_name = \"demo\"\n[processes]\nweb = \"bin/web\"\n",
    );
    let state = write_fixture(
        &dir,
        "state.json",
        r#"{
            "app": { "name": "demo", "deployed": true },
            "current_image": "registry/demo:v1",
            "machines": [
                {
                    "id": "m1",
                    "image": "registry/demo:v1",
                    "state": "started",
                    "metadata": {
                        "hangar_platform_version": "v2",
                        "hangar_process_group": "web"
                    },
                    "mounts": [ { "volume": "vol_1", "name": "data", "path": "/data" } ]
                }
            ]
        }"#,
    );

    hangar()
        .arg("preflight")
        .arg("--app-config")
        .arg(&app_config)
        .arg("--state")
        .arg(&state)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "machine m1 in group 'web' has volume 'data' mounted",
        ));
}

#[test]
fn preflight_rejects_unknown_size() {
    let dir = TempDir::new().unwrap();
    let app_config = write_fixture(&dir, "app.toml", APP_CONFIG);
    let state = write_fixture(&dir, "state.json", r#"{ "app": { "name": "demo" } }"#);

    hangar()
        .args(["preflight", "--image", "registry/demo:v1", "--vm-size", "giant"])
        .arg("--app-config")
        .arg(&app_config)
        .arg("--state")
        .arg(&state)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid machine size 'giant'"));
}

#[test]
fn sizes_lists_presets() {
    hangar()
        .arg("sizes")
        .assert()
        .success()
        .stdout(predicate::str::contains("shared-cpu-1x"))
        .stdout(predicate::str::contains("performance-16x"));
}
