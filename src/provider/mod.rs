//! # Stack Provider Capabilities
//!
//! The workflow engine never talks to an orchestration backend directly. It
//! depends on four narrow capabilities, each a separate trait so that a
//! reconciler only asks for what it uses and test doubles stay small:
//!
//! - **`StackUpserter`**: create the stack if it is absent, update it otherwise.
//! - **`StackWaiter`**: block until the stack is no longer mid-transition and
//!   report it, or report that it does not exist.
//! - **`StackDeleter`**: start deleting a stack.
//! - **`ImageFinder`**: find the most recent machine image matching a pattern.
//!
//! `StackManager` bundles all four and is implemented for every type that
//! provides them. Retries, polling intervals and timeouts belong to the
//! implementation; `await_terminal` is the shared polling loop they build on.
//!
//! `LocalStackManager` is a file-backed implementation used by the CLI.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};
use crate::stack::{ParameterMap, Stack, StackStatus};

pub mod local;
#[cfg(test)]
pub(crate) mod mock;

pub use local::{Image, LocalStackManager};

/// Creates or updates stacks
pub trait StackUpserter {
    /// Create the stack `name` from `body` if it does not exist, otherwise
    /// update it in place. Returns once the request has been accepted.
    fn upsert_stack(
        &self,
        name: &str,
        body: &str,
        parameters: &ParameterMap,
        tags: &ParameterMap,
    ) -> Result<()>;
}

/// Waits for stacks to settle
pub trait StackWaiter {
    /// Block until `name` reaches a terminal status.
    ///
    /// `Ok(None)` means no stack by that name exists, which is a valid answer
    /// rather than an error.
    fn await_final_status(&self, name: &str) -> Result<Option<Stack>>;
}

/// Deletes stacks
pub trait StackDeleter {
    fn delete_stack(&self, name: &str) -> Result<()>;
}

/// Looks up machine images
pub trait ImageFinder {
    /// Id of the most recently created image whose name matches `pattern`.
    fn find_latest_image_id(&self, pattern: &str) -> Result<String>;
}

/// Every capability the workflows need from a provider
///
/// The `as_*` accessors hand out the narrow capability a single executor
/// needs, including from behind a `Box<dyn StackManager>`.
pub trait StackManager: StackUpserter + StackWaiter + StackDeleter + ImageFinder {
    fn as_upserter(&self) -> &dyn StackUpserter;
    fn as_waiter(&self) -> &dyn StackWaiter;
    fn as_deleter(&self) -> &dyn StackDeleter;
    fn as_image_finder(&self) -> &dyn ImageFinder;
}

impl<T> StackManager for T
where
    T: StackUpserter + StackWaiter + StackDeleter + ImageFinder,
{
    fn as_upserter(&self) -> &dyn StackUpserter {
        self
    }

    fn as_waiter(&self) -> &dyn StackWaiter {
        self
    }

    fn as_deleter(&self) -> &dyn StackDeleter {
        self
    }

    fn as_image_finder(&self) -> &dyn ImageFinder {
        self
    }
}

/// How a provider polls for a terminal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause between two observations of a stack still in transition
    pub interval: Duration,
    /// Give up once this much time has passed
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Poll `describe` until the stack is absent or terminal.
///
/// A stack reported as `DELETE_COMPLETE` is treated as absent.
pub fn await_terminal<F>(
    stack_name: &str,
    settings: &PollSettings,
    mut describe: F,
) -> Result<Option<Stack>>
where
    F: FnMut() -> Result<Option<Stack>>,
{
    let started = Instant::now();
    loop {
        match describe()? {
            None => return Ok(None),
            Some(stack) if stack.status == StackStatus::DeleteComplete => return Ok(None),
            Some(stack) if stack.status.is_terminal() => return Ok(Some(stack)),
            Some(stack) => {
                let waited = started.elapsed();
                if waited >= settings.timeout {
                    return Err(Error::AwaitTimeout {
                        stack: stack_name.to_string(),
                        waited,
                    });
                }
                debug!("  Stack '{}' is {}, waiting", stack_name, stack.status);
                thread::sleep(settings.interval);
            }
        }
    }
}
