//! File-backed stack provider
//!
//! Keeps one JSON document per stack in a state directory. Every request is
//! applied synchronously, so stacks are never observed mid-transition, but
//! status queries still go through [`await_terminal`] like a remote provider
//! would.
//!
//! Outputs are taken from the keys of the template's `Outputs:` mapping. Each
//! is published under its export name, `<stack>-<key>`.
//!
//! Machine images are read from `images.yml` in the same directory:
//!
//! ```yaml
//! - id: ami-0a1b2c
//!   name: amzn-ami-2017.09.a-amazon-ecs-optimized
//!   created: 1506470400
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    await_terminal, ImageFinder, PollSettings, StackDeleter, StackUpserter, StackWaiter,
};
use crate::error::{Error, Result};
use crate::stack::{ParameterMap, Stack, StackStatus};

/// Image catalog file name inside the state directory
pub const IMAGES_FILE: &str = "images.yml";

/// A machine image known to the local provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    /// Seconds since the unix epoch
    pub created: u64,
}

/// Stack provider that persists stacks under a local directory
#[derive(Debug, Clone)]
pub struct LocalStackManager {
    state_dir: PathBuf,
    poll: PollSettings,
}

impl LocalStackManager {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            state_dir,
            poll: PollSettings::default(),
        }
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Default state directory: `~/.mu/stacks`
    pub fn default_state_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mu")
            .join("stacks")
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    fn stack_path(&self, name: &str) -> PathBuf {
        self.state_dir.join(format!("{}.json", name))
    }

    /// Read the current document for `name` without waiting.
    pub fn describe_stack(&self, name: &str) -> Result<Option<Stack>> {
        let path = self.stack_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_stack(&self, stack: &Stack) -> Result<()> {
        fs::create_dir_all(&self.state_dir)?;
        let content = serde_json::to_string_pretty(stack)?;
        fs::write(self.stack_path(&stack.name), content)?;
        Ok(())
    }

    /// Images listed in the catalog, empty when there is none.
    pub fn images(&self) -> Result<Vec<Image>> {
        let path = self.state_dir.join(IMAGES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Keys declared under the template's top level `Outputs:` mapping.
fn declared_outputs(body: &str) -> Result<Vec<String>> {
    let template: serde_yaml::Value = serde_yaml::from_str(body)?;
    let keys = template
        .get("Outputs")
        .and_then(serde_yaml::Value::as_mapping)
        .map(|outputs| {
            outputs
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Ok(keys)
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl StackUpserter for LocalStackManager {
    fn upsert_stack(
        &self,
        name: &str,
        body: &str,
        parameters: &ParameterMap,
        tags: &ParameterMap,
    ) -> Result<()> {
        let outputs = declared_outputs(body)?
            .into_iter()
            .map(|key| {
                let value = format!("{}-{}", name, key);
                (key, value)
            })
            .collect();

        let stack = match self.describe_stack(name)? {
            Some(existing) => {
                debug!("Updating stack '{}'", name);
                Stack {
                    status: StackStatus::UpdateComplete,
                    status_reason: None,
                    last_update_time: now(),
                    tags: tags.clone(),
                    outputs,
                    parameters: parameters.clone(),
                    ..existing
                }
            }
            None => {
                debug!("Creating stack '{}'", name);
                Stack {
                    id: format!("local:{}", name),
                    name: name.to_string(),
                    status: StackStatus::CreateComplete,
                    status_reason: None,
                    last_update_time: now(),
                    tags: tags.clone(),
                    outputs,
                    parameters: parameters.clone(),
                }
            }
        };
        self.write_stack(&stack)
    }
}

impl StackWaiter for LocalStackManager {
    fn await_final_status(&self, name: &str) -> Result<Option<Stack>> {
        await_terminal(name, &self.poll, || self.describe_stack(name))
    }
}

impl StackDeleter for LocalStackManager {
    fn delete_stack(&self, name: &str) -> Result<()> {
        let path = self.stack_path(name);
        if path.exists() {
            debug!("Deleting stack '{}'", name);
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl ImageFinder for LocalStackManager {
    fn find_latest_image_id(&self, pattern: &str) -> Result<String> {
        let matcher = glob::Pattern::new(pattern)?;
        self.images()?
            .into_iter()
            .filter(|image| matcher.matches(&image.name))
            .max_by_key(|image| image.created)
            .map(|image| image.id)
            .ok_or_else(|| Error::ImageNotFound {
                pattern: pattern.to_string(),
            })
    }
}
