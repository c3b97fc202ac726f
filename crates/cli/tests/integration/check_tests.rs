//! Check and list integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn check_passes_when_make_agrees_or_is_unset() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  env
    .makevars_cmd()
    .args(["check", "-p"])
    .arg(&providers)
    .env("FOO", "bar")
    .env("TARGETS", "a b c")
    .env_remove("BAZ")
    .env_remove("MIN_SUPPORTED_SDK_VERSION")
    .assert()
    .success()
    .stdout(predicate::str::contains("Strict failures: 0"));
}

#[test]
fn strict_mismatch_fails() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  env
    .makevars_cmd()
    .args(["check", "-p"])
    .arg(&providers)
    .env("FOO", "not-bar")
    .assert()
    .failure()
    .stderr(predicate::str::contains("FOO does not match between Make and Soong:"))
    .stderr(predicate::str::contains("Make : not-bar"))
    .stderr(predicate::str::contains("Soong: bar"))
    .stderr(predicate::str::contains("Soong variable check failed"));
}

#[test]
fn checked_mismatch_only_warns() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  env
    .makevars_cmd()
    .args(["check", "-p"])
    .arg(&providers)
    .env_remove("FOO")
    .env_remove("BAZ")
    .env_remove("MIN_SUPPORTED_SDK_VERSION")
    .env("TARGETS", "a b d")
    .assert()
    .success()
    .stderr(predicate::str::contains("Make  adds: d"))
    .stderr(predicate::str::contains("Soong adds: c"))
    .stdout(predicate::str::contains("Warnings: 1"));
}

#[test]
fn check_json_reports_status() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  let output = env
    .makevars_cmd()
    .args(["check", "--no-builtin", "-o", "json", "-p"])
    .arg(&providers)
    .env("FOO", "bar")
    .env("BAZ", "other")
    .env_remove("TARGETS")
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let vars = json["variables"].as_array().unwrap();
  assert_eq!(vars.len(), 3);
  assert_eq!(vars[0]["name"], "FOO");
  assert_eq!(vars[0]["status"], "match");
  assert_eq!(vars[1]["name"], "BAZ");
  assert_eq!(vars[1]["status"], "mismatch");
  assert_eq!(vars[2]["status"], "adopt");
  assert_eq!(json["strict_failures"], 0);
  assert_eq!(json["warnings"], 1);
}

#[test]
fn duplicate_strict_names_compare_against_adopted_value() {
  let env = TestEnv::new();
  let providers = env.providers("duplicates.lua");

  let output = env
    .makevars_cmd()
    .args(["check", "--no-builtin", "-o", "json", "-p"])
    .arg(&providers)
    .env_remove("DUP")
    .output()
    .unwrap();
  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Soong variable check failed"));

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let vars = json["variables"].as_array().unwrap();
  assert_eq!(vars[0]["status"], "adopt");
  assert_eq!(vars[1]["status"], "mismatch");
  assert_eq!(vars[1]["make"], "first");
  assert_eq!(vars[1]["soong"], "second");
  assert_eq!(json["strict_failures"], 1);
}

#[test]
fn list_text() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  env
    .makevars_cmd()
    .args(["list", "--config"])
    .arg(&env.config_path)
    .arg("-p")
    .arg(&providers)
    .assert()
    .success()
    .stdout(predicate::str::contains("MIN_SUPPORTED_SDK_VERSION := 23 (strict)"))
    .stdout(predicate::str::contains("FOO := bar (strict)"))
    .stdout(predicate::str::contains("TARGETS := c b a (check, sorted)"));
}

#[test]
fn list_json() {
  let env = TestEnv::new();
  let providers = env.providers("modules.lua");

  let output = env
    .makevars_cmd()
    .args(["list", "--no-builtin", "-o", "json", "-p"])
    .arg(&providers)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let vars = json.as_array().unwrap();
  assert_eq!(vars[0]["name"], "PRODUCT_APPS");
  assert_eq!(vars[0]["value"], "Settings Calendar");
  assert_eq!(vars[0]["sort"], true);
  assert_eq!(vars[1]["name"], "DEVICE_ARCH");
  assert_eq!(vars[1]["value"], "arm64");
  assert_eq!(vars[1]["strict"], true);
}
