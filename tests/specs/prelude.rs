//! Shared helpers for black-box CLI specs.

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// Components chained onto a service nobody provides
pub const BROKEN_CHAIN: &str = r#"
[[component]]
name = "Obj"
provides = "Obj"
[[component.reference]]
name = "math"
service = "Math"

[[component]]
name = "Math"
provides = "Math"
[[component.reference]]
name = "string"
service = "java.lang.String"
"#;

/// Two components requiring each other
pub const RING: &str = r#"
[[component]]
name = "A"
provides = "A"
[[component.reference]]
name = "b"
service = "B"

[[component]]
name = "B"
provides = "B"
[[component.reference]]
name = "a"
service = "A"
"#;

/// Everything resolvable
pub const HEALTHY: &str = r#"
[[configuration]]
pid = "db"
values = { url = "postgres://shop" }

[[service]]
interfaces = ["Log"]

[[component]]
name = "Db"
provides = "Db"
pid = "db"
[[component.reference]]
name = "log"
service = "Log"
[component.validate]
required = ["url"]

[[component]]
name = "Cart"
[[component.reference]]
name = "db"
service = "Db"
"#;

/// A scratch directory holding assembly files
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// `fx` run from the project directory with logging off
    pub fn fx(&self) -> Cli {
        let mut cmd = Command::cargo_bin("fx").unwrap();
        cmd.current_dir(self.path()).env("FX_LOG", "off");
        Cli { cmd }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        let output = Output::from(output);
        assert_eq!(output.code, 0, "expected success, stderr:\n{}", output.stderr);
        output
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> Output {
        let output = Output::from(self.cmd.output().unwrap());
        assert_ne!(output.code, 0, "expected failure, stdout:\n{}", output.stdout);
        output
    }
}

pub struct Output {
    code: i32,
    stdout: String,
    stderr: String,
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Output {
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout missing {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr missing {:?}:\n{}",
            needle,
            self.stderr
        );
        self
    }
}
