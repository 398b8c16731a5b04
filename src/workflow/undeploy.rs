//! Stack teardown
//!
//! Deleting a stack that does not exist succeeds without touching the
//! provider, so a teardown can be re-run after a partial failure.

use log::info;

use super::{Executor, WorkflowContext};
use crate::error::{Error, Result};
use crate::provider::{StackDeleter, StackWaiter};

type NameResolver<'a> = Box<dyn Fn(&WorkflowContext) -> Result<Option<String>> + 'a>;

/// Executor that deletes one stack and waits for the deletion to settle
pub struct StackUndeployer<'a> {
    description: String,
    stack_name: NameResolver<'a>,
    waiter: &'a dyn StackWaiter,
    deleter: &'a dyn StackDeleter,
}

impl<'a> StackUndeployer<'a> {
    /// `stack_name` resolves the stack to delete from the context. `None`
    /// means there is nothing this workflow may delete.
    pub fn new<F>(
        description: &str,
        stack_name: F,
        waiter: &'a dyn StackWaiter,
        deleter: &'a dyn StackDeleter,
    ) -> Self
    where
        F: Fn(&WorkflowContext) -> Result<Option<String>> + 'a,
    {
        Self {
            description: description.to_string(),
            stack_name: Box::new(stack_name),
            waiter,
            deleter,
        }
    }
}

impl Executor<WorkflowContext> for StackUndeployer<'_> {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn execute(&self, ctx: &mut WorkflowContext) -> Result<()> {
        let Some(name) = (self.stack_name)(ctx)? else {
            info!("  Nothing to undeploy for {}", self.description);
            return Ok(());
        };

        info!("Undeploying stack '{}'", name);
        let current = self
            .waiter
            .await_final_status(&name)
            .map_err(|e| e.for_stack(&name, "await"))?;
        if current.is_none() {
            info!("  Stack is already deleted.");
            return Ok(());
        }

        self.deleter
            .delete_stack(&name)
            .map_err(|e| Error::stack_operation(&name, "delete", e))?;

        match self
            .waiter
            .await_final_status(&name)
            .map_err(|e| e.for_stack(&name, "await"))?
        {
            None => {
                info!("  Stack '{}' deleted", name);
                Ok(())
            }
            Some(stack) => Err(Error::StackFailed {
                stack: name,
                status: stack.status,
                reason: stack.status_reason,
            }),
        }
    }
}
