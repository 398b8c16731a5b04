//! # Stack Workflows
//!
//! A workflow is an ordered list of executors run against one
//! [`WorkflowContext`]. Each executor is a pending unit of work with its
//! dependencies (configuration, provider capabilities, stack strategy) bound
//! at construction time; the only thing it receives when run is the context.
//!
//! ## Execution Model
//!
//! `Workflow::run` takes the context by value, hands each executor exclusive
//! access to it in turn, and returns it once every step has succeeded. The
//! first executor to fail stops the run and its error is returned unchanged.
//! Nothing is rolled back: every step is safe to repeat, so re-running the
//! workflow is how a partial failure is recovered.
//!
//! ## Data Flow
//!
//! 1. [`EnvironmentFinder`] resolves the target environment into the context.
//! 2. [`StackReconciler`]s run in dependency order. Each may read parameters
//!    written by an earlier reconciler and writes its own stack outputs back
//!    into [`WorkflowContext::params`].
//!
//! The concrete workflows are assembled by [`environment_upserter`],
//! [`environment_terminator`], [`service_deployer`] and
//! [`service_undeployer`].

use log::debug;

use crate::config::Environment;
use crate::error::{Error, Result};
use crate::stack::ParameterMap;

pub mod environment;
pub mod reconcile;
pub mod service;
pub mod stacks;
pub mod undeploy;

pub use environment::{environment_terminator, environment_upserter, EnvironmentFinder};
pub use reconcile::{StackOutputReader, StackReconciler, StackStrategy};
pub use service::{service_deployer, service_undeployer, ServiceInput};
pub use stacks::{ClusterStack, NetworkStack, ServiceStack};
pub use undeploy::StackUndeployer;

/// State shared by the executors of one workflow run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowContext {
    /// The resolved environment, `None` until an `EnvironmentFinder` succeeds
    pub environment: Option<Environment>,
    /// The service being acted on, for service workflows
    pub service_name: Option<String>,
    /// Parameters published by earlier stacks for later ones
    pub params: ParameterMap,
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved environment, or an error if no finder has run yet.
    pub fn environment(&self) -> Result<&Environment> {
        self.environment.as_ref().ok_or_else(|| Error::Unresolved {
            what: "environment".to_string(),
        })
    }

    pub fn service_name(&self) -> Result<&str> {
        self.service_name.as_deref().ok_or_else(|| Error::Unresolved {
            what: "service".to_string(),
        })
    }
}

/// A unit of work with its inputs bound
pub trait Executor<C> {
    /// Short human readable label used in logs.
    fn describe(&self) -> String;

    fn execute(&self, ctx: &mut C) -> Result<()>;
}

/// Executor backed by a closure
pub struct FnExecutor<F> {
    description: String,
    f: F,
}

/// Wrap a closure as an executor.
pub fn executor<C, F>(description: &str, f: F) -> FnExecutor<F>
where
    F: Fn(&mut C) -> Result<()>,
{
    FnExecutor {
        description: description.to_string(),
        f,
    }
}

impl<C, F> Executor<C> for FnExecutor<F>
where
    F: Fn(&mut C) -> Result<()>,
{
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn execute(&self, ctx: &mut C) -> Result<()> {
        (self.f)(ctx)
    }
}

/// An ordered sequence of executors that stops at the first failure
pub struct Workflow<'a, C> {
    name: String,
    steps: Vec<Box<dyn Executor<C> + 'a>>,
}

impl<'a, C> Workflow<'a, C> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn then(mut self, step: impl Executor<C> + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Labels of the steps, in execution order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.describe()).collect()
    }

    /// Run every step in order against `ctx`, returning the final context.
    pub fn run(&self, mut ctx: C) -> Result<C> {
        self.execute(&mut ctx)?;
        Ok(ctx)
    }
}

impl<C> Executor<C> for Workflow<'_, C> {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn execute(&self, ctx: &mut C) -> Result<()> {
        let total = self.steps.len();
        for (index, step) in self.steps.iter().enumerate() {
            debug!(
                "[{}] step {}/{}: {}",
                self.name,
                index + 1,
                total,
                step.describe()
            );
            step.execute(ctx)?;
        }
        Ok(())
    }
}
