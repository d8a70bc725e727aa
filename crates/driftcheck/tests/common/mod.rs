#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_AWS: &str = r#"#!/bin/sh
if [ -n "$FAKE_AWS_SLEEP" ]; then
  exec sleep "$FAKE_AWS_SLEEP"
fi
if [ -n "$FAKE_AWS_FAIL" ]; then
  echo "$FAKE_AWS_FAIL" >&2
  exit 254
fi
echo "${FAKE_AWS_COUNT:-1}"
"#;

const FAKE_TERRAFORM: &str = r#"#!/bin/sh
case "$2" in
  show) cat "$FAKE_STATE" ;;
  plan) exit "${FAKE_PLAN_EXIT:-0}" ;;
  *) exit 1 ;;
esac
"#;

/// Scratch project with fake `aws` and `terraform` executables on PATH
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let project = Self { root };
        project.write_executable("bin/aws", FAKE_AWS);
        project.write_executable("bin/terraform", FAKE_TERRAFORM);
        project.write_state(1);
        project
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.path().join("state.json")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.path().join("driftcheck.yaml"), content).unwrap();
    }

    /// State with `count` of every core resource and of every service
    /// resource in each group
    pub fn write_state(&self, count: usize) {
        let mut root = Vec::new();
        for resource_type in ["aws_vpc", "aws_db_instance", "aws_ecs_cluster"] {
            for i in 0..count {
                root.push(resource(resource_type, &format!("{}.r{}", resource_type, i)));
            }
        }

        let children: Vec<serde_json::Value> = ["api", "graphql", "grpc"]
            .iter()
            .map(|group| {
                let mut resources = Vec::new();
                for resource_type in ["aws_ecs_service", "aws_lb", "aws_lb_target_group"] {
                    for i in 0..count {
                        let address = format!("module.{}.{}.r{}", group, resource_type, i);
                        resources.push(resource(resource_type, &address));
                    }
                }
                serde_json::json!({ "address": format!("module.{}", group), "resources": resources })
            })
            .collect();

        let state = serde_json::json!({
            "format_version": "1.0",
            "values": { "root_module": { "resources": root, "child_modules": children } }
        });
        fs::write(self.state_path(), state.to_string()).unwrap();
    }

    /// `driftcheck` running inside the project, isolated from the caller's
    /// config and environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("driftcheck").unwrap();
        let path = format!("{}:/usr/bin:/bin", self.root.path().join("bin").display());
        cmd.current_dir(self.root.path())
            .env("PATH", path)
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join(".config"))
            .env("FAKE_STATE", self.state_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("DRIFTCHECK_CONFIG_PATH")
            .env_remove("DRIFTCHECK_ENV");
        for key in [
            "ENVIRONMENT",
            "SUFFIX",
            "TIMEOUT_SECS",
            "SKIP_PLAN",
            "IGNORE_RESOURCE_ERRORS",
            "TERRAFORM_DIR",
            "STATE_FILE",
        ] {
            cmd.env_remove(format!("DRIFTCHECK_{}", key));
        }
        cmd
    }

    fn write_executable(&self, relative: &str, content: &str) {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        make_executable(&path);
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

fn resource(resource_type: &str, address: &str) -> serde_json::Value {
    serde_json::json!({
        "type": resource_type,
        "address": address,
        "values": { "id": format!("id-{}", address) }
    })
}
