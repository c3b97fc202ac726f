//! Lua provider integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn modules_and_device_config_reach_providers() {
  let env = TestEnv::new();
  let providers = env.providers("modules.lua");

  env
    .makevars_cmd()
    .args(["show", "--no-builtin", "-p"])
    .arg(&providers)
    .assert()
    .success()
    .stdout(predicate::str::contains(
      "SOONG_PRODUCT_APPS := Settings Calendar\n$(eval $(call soong-compare-var,PRODUCT_APPS,true))",
    ))
    .stdout(predicate::str::contains(
      "SOONG_DEVICE_ARCH := arm64\n$(eval $(call soong-compare-var,DEVICE_ARCH,,my_check_failed := true))",
    ));
}

#[test]
fn multiple_scripts_run_in_order() {
  let env = TestEnv::new();
  let first = env.providers("modules.lua");
  let second = env.providers("basic.lua");

  let output = env
    .makevars_cmd()
    .args(["list", "--no-builtin", "-p"])
    .arg(&first)
    .arg("-p")
    .arg(&second)
    .output()
    .unwrap();
  assert!(output.status.success());

  let stdout = String::from_utf8(output.stdout).unwrap();
  let apps = stdout.find("PRODUCT_APPS").unwrap();
  let foo = stdout.find("FOO := bar").unwrap();
  assert!(apps < foo);
}

#[test]
fn runtime_error_aborts_generation() {
  let env = TestEnv::new();
  let providers = env.providers("lua_error.lua");

  env
    .makevars_cmd()
    .args(["generate", "-p"])
    .arg(&providers)
    .assert()
    .failure()
    .stderr(predicate::str::contains("provider exploded"));

  assert!(!env.out_file().exists());
}

#[test]
fn missing_script_fails() {
  let env = TestEnv::new();

  env
    .makevars_cmd()
    .args(["generate", "-p", "does-not-exist.lua"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load providers"));
}

#[test]
fn syntax_error_fails() {
  let env = TestEnv::new();
  env.write_file("bad.lua", "makevars.register(\"android\"");

  env
    .makevars_cmd()
    .args(["list", "-p", "bad.lua"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load providers: bad.lua"));
}
