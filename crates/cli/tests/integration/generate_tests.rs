//! Generate and show integration tests.

use std::fs;

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn generate_writes_fragment() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  env
    .makevars_cmd()
    .arg("generate")
    .arg("--providers")
    .arg(&providers)
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote"));

  let out = fs::read_to_string(env.out_file()).unwrap();
  assert!(out.starts_with("# Autogenerated file\n"));
  assert!(out.contains(
    "SOONG_MIN_SUPPORTED_SDK_VERSION := 23\n$(eval $(call soong-compare-var,MIN_SUPPORTED_SDK_VERSION,,my_check_failed := true))"
  ));
  assert!(out.contains("SOONG_FOO := bar\n$(eval $(call soong-compare-var,FOO,,my_check_failed := true))"));
  assert!(out.contains("SOONG_BAZ := qux\n$(eval $(call soong-compare-var,BAZ,))"));
  assert!(out.contains("SOONG_TARGETS := c b a\n$(eval $(call soong-compare-var,TARGETS,true))"));
  assert!(out.ends_with("\nsoong-compare-var :=\n"));
}

#[test]
fn second_generate_is_unchanged() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  env
    .makevars_cmd()
    .args(["generate", "-p"])
    .arg(&providers)
    .assert()
    .success();
  let first = fs::read(env.out_file()).unwrap();

  env
    .makevars_cmd()
    .args(["generate", "-p"])
    .arg(&providers)
    .assert()
    .success()
    .stdout(predicate::str::contains("up to date"));
  assert_eq!(fs::read(env.out_file()).unwrap(), first);
}

#[test]
fn generate_without_config_uses_defaults() {
  let env = TestEnv::empty();

  env.makevars_cmd().arg("generate").assert().success();

  let out = fs::read_to_string(env.out_file()).unwrap();
  assert!(out.contains("SOONG_MIN_SUPPORTED_SDK_VERSION := 21\n"));
}

#[test]
fn out_dir_flag_and_suffix_env() {
  let env = TestEnv::new();

  env
    .makevars_cmd()
    .args(["generate", "--out-dir", "elsewhere"])
    .env("MAKEVARS_MAKE_SUFFIX", "-aosp_arm64")
    .assert()
    .success();

  assert!(env.temp.path().join("elsewhere").join("make_vars-aosp_arm64.mk").exists());
  assert!(!env.out_file().exists());
}

#[test]
fn not_embedded_in_make_skips() {
  let env = TestEnv::empty();
  env.write_file("makevars.toml", "embedded_in_make = false\n");

  env
    .makevars_cmd()
    .arg("generate")
    .assert()
    .success()
    .stdout(predicate::str::contains("nothing to write"));

  assert!(!env.out_file().exists());
}

#[test]
fn eval_error_aborts_and_keeps_previous_output() {
  let env = TestEnv::new();
  env.write_file("out/soong/make_vars.mk", "previous\n");
  let providers = env.providers("broken.lua");

  env
    .makevars_cmd()
    .args(["generate", "-p"])
    .arg(&providers)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Missing"))
    .stderr(predicate::str::contains("aborted"));

  assert_eq!(fs::read_to_string(env.out_file()).unwrap(), "previous\n");
}

#[test]
fn invalid_config_fails() {
  let env = TestEnv::empty();
  env.write_file("makevars.toml", "out_dir = [\n");

  env
    .makevars_cmd()
    .arg("generate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn show_prints_without_writing() {
  let env = TestEnv::new();
  let providers = env.providers("basic.lua");

  env
    .makevars_cmd()
    .args(["show", "--no-builtin", "-p"])
    .arg(&providers)
    .assert()
    .success()
    .stdout(predicate::str::starts_with("# Autogenerated file"))
    .stdout(predicate::str::contains("SOONG_FOO := bar"))
    .stdout(predicate::str::contains("MIN_SUPPORTED_SDK_VERSION").not());

  assert!(!env.out_file().exists());
}
