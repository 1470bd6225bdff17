//! Test helpers for behavioral specifications.
//!
//! Provides a scaffolded project directory and a small DSL over the
//! stagecraft binary: `project.stagecraft().args(..).passes()`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::Path;
use std::process::Output;

pub const CONFIG: &str = r#"
project: shopd
environments:
  production:
    vars:
      DB: "5433:5432"
    hosts:
      - id: web-1
        address: 10.0.0.5
        roles: [db]
services:
  api:
    context: services/api
databases:
  app:
    connection_env: DATABASE_URL
    migrations: db/migrations
"#;

pub const COMPOSE: &str = r#"
services:
  db:
    role: db
    image: postgres:16
    ports:
      - "${DB:-}"
  api:
    mode: external
    image: api:latest
"#;

/// A temporary project directory under test.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    /// A bare directory with no configuration.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// A minimal project: config, compose file, one migration.
    pub fn scaffolded() -> Self {
        let project = Self::empty();
        project.file("stagecraft.yml", CONFIG);
        project.file("compose.yml", COMPOSE);
        project.file("db/migrations/001_init.sql", "create schema app;\n");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file below the project root, creating parents.
    pub fn file(&self, path: &str, content: &str) {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(path)).unwrap()
    }

    /// Start building a stagecraft invocation rooted here.
    pub fn stagecraft(&self) -> Spec {
        let mut cmd = assert_cmd::Command::cargo_bin("stagecraft").unwrap();
        cmd.current_dir(self.dir.path());
        Spec { cmd }
    }
}

/// A pending invocation.
pub struct Spec {
    cmd: assert_cmd::Command,
}

impl Spec {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn output(mut self) -> Output {
        self.cmd.output().unwrap()
    }

    /// Run and require exit code 0.
    pub fn passes(self) -> Run {
        let run = Run {
            output: self.output(),
        };
        assert_eq!(run.code(), 0, "expected success\n{}", run.dump());
        run
    }

    /// Run and require a non-zero exit code.
    pub fn fails(self) -> Run {
        let run = Run {
            output: self.output(),
        };
        assert_ne!(run.code(), 0, "expected failure\n{}", run.dump());
        run
    }

    /// Run and require a specific exit code.
    pub fn exits(self, code: i32) -> Run {
        let run = Run {
            output: self.output(),
        };
        assert_eq!(run.code(), code, "expected exit {}\n{}", code, run.dump());
        run
    }
}

/// A finished invocation with assertion helpers.
pub struct Run {
    output: Output,
}

impl Run {
    pub fn code(&self) -> i32 {
        self.output.status.code().unwrap_or(-1)
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }

    fn dump(&self) -> String {
        format!("stdout:\n{}\nstderr:\n{}", self.stdout(), self.stderr())
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout().contains(needle),
            "stdout missing `{}`\n{}",
            needle,
            self.dump(),
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr().contains(needle),
            "stderr missing `{}`\n{}",
            needle,
            self.dump(),
        );
        self
    }
}
