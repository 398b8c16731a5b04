//! Application context
//!
//! Everything a command needs to build a workflow: the loaded configuration,
//! where the configuration lives in source control, and the stack provider.
//! One `Context` can build any number of workflows; each workflow run gets
//! its own [`WorkflowContext`](crate::workflow::WorkflowContext).

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::{self, Config};
use crate::error::Result;
use crate::git;
use crate::provider::{LocalStackManager, StackManager};
use crate::stack::ParameterMap;

/// Revision used when the configuration is not inside a git working copy
pub const UNKNOWN_REVISION: &str = "unknown";

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    pub revision: String,
}

impl RepoInfo {
    /// Discover the repository containing `config_path`.
    ///
    /// Never fails: outside a git working copy the directory name and an
    /// `unknown` revision are used.
    pub fn discover(config_path: &Path) -> Self {
        let fallback_name = config_path
            .canonicalize()
            .ok()
            .and_then(|path| {
                path.parent()
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "mu".to_string());

        let name = git::find_git_directory(config_path)
            .ok()
            .and_then(|dir| git::repository_name(&dir))
            .unwrap_or(fallback_name);

        let revision = match git::find_revision(config_path) {
            Ok(revision) => revision,
            Err(e) => {
                warn!("{}", e);
                UNKNOWN_REVISION.to_string()
            }
        };
        debug!("Repository '{}' at revision {}", name, revision);
        Self { name, revision }
    }
}

/// Shared state for building workflows
pub struct Context {
    pub config: Config,
    pub repo: RepoInfo,
    pub stack_manager: Box<dyn StackManager>,
}

impl Context {
    pub fn new(config: Config, repo: RepoInfo, stack_manager: Box<dyn StackManager>) -> Self {
        Self {
            config,
            repo,
            stack_manager,
        }
    }

    /// Load the configuration at `config_path` and use a local provider
    /// keeping its state in `state_dir`.
    pub fn initialize(config_path: &Path, state_dir: PathBuf) -> Result<Self> {
        let config = config::from_file(config_path)?;
        let repo = RepoInfo::discover(config_path);
        debug!("Using stack state directory {}", state_dir.display());
        Ok(Self::new(
            config,
            repo,
            Box::new(LocalStackManager::new(state_dir)),
        ))
    }

    /// Tags every stack built from this context carries.
    pub fn base_tags(&self) -> ParameterMap {
        let mut tags = ParameterMap::new();
        tags.insert("mu:repo".to_string(), self.repo.name.clone());
        tags.insert("mu:revision".to_string(), self.repo.revision.clone());
        tags
    }
}
