//! Recording test double for the provider capabilities

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::{ImageFinder, StackDeleter, StackUpserter, StackWaiter};
use crate::error::{Error, Result};
use crate::stack::{ParameterMap, Stack};

/// One call made against the mock
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Await(String),
    Upsert {
        name: String,
        parameters: ParameterMap,
        tags: ParameterMap,
    },
    Delete(String),
    FindImage(String),
}

/// Scripted stack manager that records every call.
///
/// Status answers are queued per stack name. The last queued answer is
/// repeated once the queue runs down to it; unscripted names are absent.
#[derive(Default)]
pub(crate) struct MockStackManager {
    pub(crate) calls: Arc<Mutex<Vec<Call>>>,
    statuses: Mutex<HashMap<String, VecDeque<Option<Stack>>>>,
    upsert_error: Option<String>,
    delete_error: Option<String>,
    image_id: Option<String>,
}

impl MockStackManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the answers `await_final_status(name)` gives, in order.
    pub(crate) fn with_statuses(self, name: &str, answers: Vec<Option<Stack>>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(name.to_string(), answers.into());
        self
    }

    pub(crate) fn with_upsert_error(mut self, message: &str) -> Self {
        self.upsert_error = Some(message.to_string());
        self
    }

    pub(crate) fn with_delete_error(mut self, message: &str) -> Self {
        self.delete_error = Some(message.to_string());
        self
    }

    pub(crate) fn with_image(mut self, id: &str) -> Self {
        self.image_id = Some(id.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matcher(c)).count()
    }

    pub(crate) fn awaits(&self) -> usize {
        self.count(|c| matches!(c, Call::Await(_)))
    }

    pub(crate) fn upserts(&self) -> usize {
        self.count(|c| matches!(c, Call::Upsert { .. }))
    }

    pub(crate) fn deletes(&self) -> usize {
        self.count(|c| matches!(c, Call::Delete(_)))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl StackUpserter for MockStackManager {
    fn upsert_stack(
        &self,
        name: &str,
        _body: &str,
        parameters: &ParameterMap,
        tags: &ParameterMap,
    ) -> Result<()> {
        self.record(Call::Upsert {
            name: name.to_string(),
            parameters: parameters.clone(),
            tags: tags.clone(),
        });
        match &self.upsert_error {
            Some(message) => Err(Error::Io(std::io::Error::other(message.clone()))),
            None => Ok(()),
        }
    }
}

impl StackWaiter for MockStackManager {
    fn await_final_status(&self, name: &str) -> Result<Option<Stack>> {
        self.record(Call::Await(name.to_string()));
        let mut statuses = self.statuses.lock().unwrap();
        let answer = match statuses.get_mut(name) {
            Some(queue) if queue.len() > 1 => queue.pop_front().flatten(),
            Some(queue) => queue.front().cloned().flatten(),
            None => None,
        };
        Ok(answer)
    }
}

impl StackDeleter for MockStackManager {
    fn delete_stack(&self, name: &str) -> Result<()> {
        self.record(Call::Delete(name.to_string()));
        match &self.delete_error {
            Some(message) => Err(Error::Io(std::io::Error::other(message.clone()))),
            None => Ok(()),
        }
    }
}

impl ImageFinder for MockStackManager {
    fn find_latest_image_id(&self, pattern: &str) -> Result<String> {
        self.record(Call::FindImage(pattern.to_string()));
        self.image_id.clone().ok_or_else(|| Error::ImageNotFound {
            pattern: pattern.to_string(),
        })
    }
}
