use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// TestHarness provides an isolated project with `specs/`, `concepts/` and
/// `syncs/` directories, in the layout the default configuration expects.
pub struct TestHarness {
    pub dir: TempDir,
    pub specs_dir: PathBuf,
    pub concepts_dir: PathBuf,
    pub syncs_dir: PathBuf,
    #[allow(dead_code)]
    pub binary: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let specs_dir = dir.path().join("specs");
        let concepts_dir = dir.path().join("concepts");
        let syncs_dir = dir.path().join("syncs");

        fs::create_dir_all(&specs_dir).expect("Failed to create specs dir");
        fs::create_dir_all(&concepts_dir).expect("Failed to create concepts dir");
        fs::create_dir_all(&syncs_dir).expect("Failed to create syncs dir");

        TestHarness {
            dir,
            specs_dir,
            concepts_dir,
            syncs_dir,
            binary: PathBuf::from(env!("CARGO_BIN_EXE_concept-lint")),
        }
    }

    /// Returns the project root (the TempDir path).
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `specs/<name>`.
    pub fn write_spec(&self, name: &str, content: &str) -> PathBuf {
        write(&self.specs_dir.join(name), content)
    }

    /// Writes `concepts/<relative>`, creating subdirectories.
    pub fn write_impl(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.concepts_dir.join(relative), content)
    }

    /// Writes `syncs/<name>`.
    #[allow(dead_code)]
    pub fn write_sync(&self, name: &str, content: &str) -> PathBuf {
        write(&self.syncs_dir.join(name), content)
    }

    /// Runs the binary with the given arguments in the project root.
    #[allow(dead_code)]
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary)
            .args(args)
            .current_dir(self.path())
            .env_remove("CONCEPT_LINT_API_KEY")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to run concept-lint")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}

#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[allow(dead_code)]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
