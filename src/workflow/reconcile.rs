//! Upsert-then-await reconciliation of a single stack
//!
//! Every stack type follows the same protocol:
//!
//! 1. derive the stack name from the context,
//! 2. if the strategy bypasses the stack (an unmanaged network), copy the
//!    external values into the parameter map and stop,
//! 3. wait for any in-flight change on the stack to settle,
//! 4. derive the input parameters,
//! 5. upsert, even if the stack already looks current,
//! 6. wait for the upsert to settle and fail unless it succeeded,
//! 7. publish the stack's outputs into the parameter map.
//!
//! What differs between network, cluster and service stacks lives in a
//! [`StackStrategy`].

use log::{debug, info, warn};

use super::{Executor, WorkflowContext};
use crate::error::{Error, Result};
use crate::provider::{StackUpserter, StackWaiter};
use crate::stack::{ParameterMap, Stack, StackType};

/// Per stack type behaviour plugged into [`StackReconciler`]
pub trait StackStrategy {
    fn stack_type(&self) -> StackType;

    /// Deterministic name of the stack this strategy manages.
    fn stack_name(&self, ctx: &WorkflowContext) -> Result<String>;

    /// Body sent with the upsert.
    fn template(&self) -> &str;

    /// Parameters to publish instead of managing the stack at all.
    fn bypass(&self, _ctx: &WorkflowContext) -> Option<ParameterMap> {
        None
    }

    /// Input parameters for the upsert.
    fn parameters(&self, ctx: &WorkflowContext) -> Result<ParameterMap>;

    /// Keys this stack publishes for later stacks.
    fn output_keys(&self) -> Vec<String>;

    /// Tags specific to this stack, added to the workflow's base tags.
    fn tags(&self, ctx: &WorkflowContext) -> Result<ParameterMap> {
        let mut tags = ParameterMap::new();
        tags.insert("mu:type".to_string(), self.stack_type().to_string());
        tags.insert(
            "mu:environment".to_string(),
            ctx.environment()?.name.clone(),
        );
        Ok(tags)
    }

    /// Values to publish once the stack has settled.
    fn outputs(&self, stack_name: &str, stack: &Stack) -> ParameterMap {
        extract_outputs(stack_name, stack, &self.output_keys())
    }
}

/// Read `keys` from the stack's outputs.
///
/// A key the stack does not report falls back to its export name,
/// `<stack>-<key>`, which later templates can import.
pub fn extract_outputs(stack_name: &str, stack: &Stack, keys: &[String]) -> ParameterMap {
    keys.iter()
        .map(|key| {
            let value = stack
                .outputs
                .get(key)
                .cloned()
                .unwrap_or_else(|| format!("{}-{}", stack_name, key));
            (key.clone(), value)
        })
        .collect()
}

/// Copy `keys` that are present in the parameter map.
pub fn forward_params(ctx: &WorkflowContext, keys: &[String], into: &mut ParameterMap) {
    for key in keys {
        if let Some(value) = ctx.params.get(key) {
            into.insert(key.clone(), value.clone());
        }
    }
}

/// Executor that upserts one stack and publishes its outputs
pub struct StackReconciler<'a, S> {
    strategy: S,
    base_tags: ParameterMap,
    waiter: &'a dyn StackWaiter,
    upserter: &'a dyn StackUpserter,
}

impl<'a, S: StackStrategy> StackReconciler<'a, S> {
    pub fn new(strategy: S, waiter: &'a dyn StackWaiter, upserter: &'a dyn StackUpserter) -> Self {
        Self {
            strategy,
            base_tags: ParameterMap::new(),
            waiter,
            upserter,
        }
    }

    /// Tags applied to the stack in addition to the strategy's own.
    pub fn with_tags(mut self, tags: ParameterMap) -> Self {
        self.base_tags = tags;
        self
    }
}

impl<S: StackStrategy> Executor<WorkflowContext> for StackReconciler<'_, S> {
    fn describe(&self) -> String {
        format!("upsert {} stack", self.strategy.stack_type())
    }

    fn execute(&self, ctx: &mut WorkflowContext) -> Result<()> {
        let stack_type = self.strategy.stack_type();
        let name = self.strategy.stack_name(ctx)?;

        if let Some(params) = self.strategy.bypass(ctx) {
            info!(
                "Using unmanaged {} for environment '{}'",
                stack_type,
                ctx.environment()?.name
            );
            ctx.params.extend(params);
            return Ok(());
        }

        info!("Upserting {} stack '{}'", stack_type, name);
        match self
            .waiter
            .await_final_status(&name)
            .map_err(|e| e.for_stack(&name, "await"))?
        {
            None => debug!("  Stack '{}' does not exist yet", name),
            Some(stack) if stack.status.is_failure() => warn!(
                "  Stack '{}' is in {}, applying again",
                name, stack.status
            ),
            Some(stack) => debug!("  Stack '{}' is {}", name, stack.status),
        }

        let parameters = self
            .strategy
            .parameters(ctx)
            .map_err(|e| e.for_stack(&name, "prepare"))?;
        let mut tags = self.base_tags.clone();
        tags.extend(self.strategy.tags(ctx)?);

        self.upserter
            .upsert_stack(&name, self.strategy.template(), &parameters, &tags)
            .map_err(|e| Error::stack_operation(&name, "upsert", e))?;

        let stack = self
            .waiter
            .await_final_status(&name)
            .map_err(|e| e.for_stack(&name, "await"))?
            .ok_or_else(|| Error::StackMissing {
                stack: name.clone(),
            })?;
        if !stack.status.is_success() {
            return Err(Error::StackFailed {
                stack: name,
                status: stack.status,
                reason: stack.status_reason,
            });
        }

        info!("  Stack '{}' is {}", name, stack.status);
        ctx.params.extend(self.strategy.outputs(&name, &stack));
        Ok(())
    }
}

/// Executor that publishes the outputs of an existing stack
pub struct StackOutputReader<'a> {
    stack_type: StackType,
    waiter: &'a dyn StackWaiter,
}

impl<'a> StackOutputReader<'a> {
    /// Read the environment-scoped stack of `stack_type`.
    pub fn new(stack_type: StackType, waiter: &'a dyn StackWaiter) -> Self {
        Self { stack_type, waiter }
    }
}

impl Executor<WorkflowContext> for StackOutputReader<'_> {
    fn describe(&self) -> String {
        format!("read {} stack outputs", self.stack_type)
    }

    fn execute(&self, ctx: &mut WorkflowContext) -> Result<()> {
        let name = crate::stack::stack_name(self.stack_type, &ctx.environment()?.name);
        let stack = self
            .waiter
            .await_final_status(&name)
            .map_err(|e| e.for_stack(&name, "await"))?
            .ok_or_else(|| Error::StackMissing {
                stack: name.clone(),
            })?;
        debug!(
            "  Read {} outputs from stack '{}'",
            stack.outputs.len(),
            name
        );
        ctx.params.extend(stack.outputs);
        Ok(())
    }
}
