use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const VALID: &str = r#"
applicationId = "com.example.app"
minSdk = 21
targetSdk = 36
compileSdk = 36
signing = "debug"
minify = true
"#;

const CONFIG: &str = r#"
[general]
output_format = "json"

[[signing.identities]]
name = "upload"
key_ref = "/secure/upload.jks"
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        ws.write("buildplan.toml", CONFIG);
        ws
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("buildplan").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("BUILDPLAN_CONFIG")
            .arg("--no-color")
            .arg("--config")
            .arg(self.path("buildplan.toml"));
        cmd
    }
}

fn descriptor_with(extra: &str) -> String {
    format!("{VALID}{extra}")
}

#[test]
fn plan_emits_json_to_stdout() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", VALID);

    let output = ws
        .cmd()
        .arg("plan")
        .arg(&descriptor)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(plan["formatVersion"], 1);
    assert_eq!(plan["gradleTask"], "assembleRelease");
    assert_eq!(plan["signing"]["name"], "debug");
    assert_eq!(plan["descriptor"]["applicationId"], "com.example.app");
    assert_eq!(plan["descriptor"]["minify"], true);
}

#[test]
fn plan_writes_gradle_output_file() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", VALID);
    let out = ws.path("plan.gradle.kts");

    ws.cmd()
        .args(["plan", "--format", "gradle", "--output"])
        .arg(&out)
        .arg(&descriptor)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote gradle plan"));

    let kts = std::fs::read_to_string(&out).unwrap();
    assert!(kts.contains("applicationId = \"com.example.app\""));
    assert!(kts.contains("signingConfig = signingConfigs.getByName(\"debug\")"));
}

#[test]
fn plan_reads_json_descriptor_from_stdin() {
    let ws = Workspace::new();
    let json = r#"{
        "applicationId": "com.example.app",
        "minSdk": 21,
        "targetSdk": 34,
        "compileSdk": 35,
        "signing": "upload",
        "buildType": "release",
        "artifact": "aab"
    }"#;

    ws.cmd()
        .args(["plan", "--input-format", "json", "--format", "toml", "-"])
        .write_stdin(json)
        .assert()
        .success()
        .stdout(predicate::str::contains("gradleTask = \"bundleRelease\""))
        .stdout(predicate::str::contains("/secure/upload.jks"));
}

#[test]
fn check_reports_valid_descriptor() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", VALID);

    ws.cmd()
        .arg("check")
        .arg(&descriptor)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("is valid"));
}

#[test]
fn unknown_key_exits_with_parse_error() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", &descriptor_with("isMinifyEnabled = true\n"));

    ws.cmd()
        .arg("check")
        .arg(&descriptor)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("isMinifyEnabled"));
}

#[test]
fn missing_key_exits_with_parse_error() {
    let ws = Workspace::new();
    let descriptor = ws.write(
        "app.json",
        r#"{ "applicationId": "com.example.app", "minSdk": 21, "targetSdk": 36, "signing": "debug" }"#,
    );

    ws.cmd()
        .arg("plan")
        .arg(&descriptor)
        .assert()
        .code(4)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("compileSdk"));
}

#[test]
fn sdk_ordering_exits_with_validation_error() {
    let ws = Workspace::new();
    let descriptor = ws.write(
        "app.toml",
        r#"
applicationId = "com.example.app"
minSdk = 30
targetSdk = 21
compileSdk = 36
signing = "debug"
"#,
    );

    ws.cmd()
        .arg("plan")
        .arg(&descriptor)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E5001"));
}

#[test]
fn unknown_signing_identity_json_error_report() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", &VALID.replace("\"debug\"", "\"release\""));

    let stderr = ws
        .cmd()
        .arg("--json-errors")
        .arg("plan")
        .arg(&descriptor)
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();

    let line = String::from_utf8(stderr).unwrap();
    let report: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(report["code"], "UNKNOWN_SIGNING_IDENTITY");
    assert_eq!(report["category"], "Validation");
    assert_eq!(report["context"], "field `signing`");
}

#[test]
fn missing_descriptor_exits_with_io_error() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("plan")
        .arg(ws.path("absent.toml"))
        .assert()
        .code(5);
}

#[test]
fn missing_config_file_exits_with_config_error() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", VALID);

    let mut cmd = Command::cargo_bin("buildplan").unwrap();
    cmd.current_dir(ws.dir.path())
        .args(["--config", "does-not-exist.toml", "check"])
        .arg(&descriptor)
        .assert()
        .code(3);
}

#[test]
fn keys_lists_schema_as_json() {
    let ws = Workspace::new();

    let output = ws
        .cmd()
        .args(["keys", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let keys: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let names: Vec<_> = keys
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["key"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"applicationId".to_string()));
    assert!(names.contains(&"dependencies".to_string()));
}

#[test]
fn identities_include_builtin_debug() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["identities", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"debug\""))
        .stdout(predicate::str::contains("\"upload\""));
}

#[test]
fn unknown_plan_format_is_usage_error() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", VALID);

    ws.cmd()
        .args(["plan", "--format", "yaml"])
        .arg(&descriptor)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid value 'yaml'"));
}

#[test]
fn unknown_input_format_is_usage_error() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["check", "--input-format", "yaml", "-"])
        .write_stdin(VALID)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid value 'yaml'"));
}

#[test]
fn kts_alias_selects_gradle_output() {
    let ws = Workspace::new();
    let descriptor = ws.write("app.toml", VALID);

    ws.cmd()
        .args(["plan", "--format", "kts"])
        .arg(&descriptor)
        .assert()
        .success()
        .stdout(predicate::str::contains("android {"));
}

#[test]
fn unknown_configured_output_format_is_config_error() {
    let ws = Workspace::new();
    ws.write("buildplan.toml", "[general]\noutput_format = \"yaml\"\n");
    let descriptor = ws.write("app.toml", VALID);

    ws.cmd()
        .arg("plan")
        .arg(&descriptor)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("output_format"));
}

#[test]
fn version_name_with_control_characters_exits_with_parse_error() {
    let ws = Workspace::new();
    let descriptor = ws.write(
        "app.json",
        r#"{ "applicationId": "com.example.app", "minSdk": 21, "targetSdk": 36,
            "compileSdk": 36, "signing": "debug", "versionName": "1.0\r\u0007" }"#,
    );

    ws.cmd()
        .args(["plan", "--format", "gradle"])
        .arg(&descriptor)
        .assert()
        .code(4)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("versionName"));
}
