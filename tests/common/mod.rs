//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::TWO_ENVIRONMENTS);
//!     fixture.command().args(["env", "list"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common `mu.yml` snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// A managed and an unmanaged environment plus a service.
    pub const TWO_ENVIRONMENTS: &str = r#"
environments:
  - name: dev
    cluster:
      instanceType: t2.micro
      desiredCapacity: 1
  - name: prod
    vpcTarget:
      vpcId: vpc-0ext
      publicSubnetIds: [subnet-a, subnet-b]
service:
  name: api
  port: 8080
  imageRepository: registry.example.com/api
  pathPatterns: ["/api/*"]
"#;

    /// Environments only, no service section.
    pub const NO_SERVICE: &str = r#"
environments:
  - name: dev
"#;

    /// Duplicate environment names.
    pub const DUPLICATE_ENVIRONMENTS: &str = r#"
environments:
  - name: dev
  - name: dev
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "environments: [name: : dev";

    /// Image catalog with two matching images and one that does not match.
    pub const IMAGES: &str = r#"
- id: ami-old
  name: amzn-ami-2017.03.a-amazon-ecs-optimized
  created: 1490000000
- id: ami-new
  name: amzn-ami-2017.09.a-amazon-ecs-optimized
  created: 1506470400
- id: ami-other
  name: ubuntu-xenial-16.04
  created: 1600000000
"#;
}

/// A temporary project directory with a `mu.yml` and its own stack state.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `mu.yml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("mu.yml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add the standard image catalog to the stack state directory.
    #[allow(dead_code)]
    pub fn with_images(self) -> Self {
        self.temp_dir
            .child("state")
            .child("images.yml")
            .write_str(configs::IMAGES)
            .expect("Failed to write image catalog");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("mu.yml")
    }

    /// Directory the local provider keeps stacks in.
    pub fn state_dir(&self) -> PathBuf {
        self.temp_dir.path().join("state")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Path of the state document for `stack`.
    #[allow(dead_code)]
    pub fn stack_file(&self, stack: &str) -> PathBuf {
        self.state_dir().join(format!("{}.json", stack))
    }

    /// Create a command running in this fixture with its own state directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mu");
        cmd.current_dir(self.path())
            .env("MU_STATE_DIR", self.state_dir())
            .env_remove("MU_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
