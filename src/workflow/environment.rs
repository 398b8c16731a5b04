//! Environment workflows: resolving an environment, bringing its network and
//! cluster up to date, and tearing them down again.

use log::info;

use super::{Executor, StackReconciler, StackUndeployer, Workflow, WorkflowContext};
use super::{ClusterStack, NetworkStack};
use crate::config::Config;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::stack::{stack_name, StackType};

/// Executor that resolves a named environment from the configuration.
///
/// On success the environment is stored in the context. On failure the
/// context is left untouched.
pub struct EnvironmentFinder<'a> {
    config: &'a Config,
    name: String,
}

impl<'a> EnvironmentFinder<'a> {
    pub fn new(config: &'a Config, name: &str) -> Self {
        Self {
            config,
            name: name.to_string(),
        }
    }
}

impl Executor<WorkflowContext> for EnvironmentFinder<'_> {
    fn describe(&self) -> String {
        format!("find environment '{}'", self.name)
    }

    fn execute(&self, ctx: &mut WorkflowContext) -> Result<()> {
        let env = self
            .config
            .environment(&self.name)
            .ok_or_else(|| Error::EnvironmentNotFound {
                name: self.name.clone(),
            })?;
        ctx.environment = Some(env.clone());
        Ok(())
    }
}

/// Create or update the network and cluster of an environment.
pub fn environment_upserter<'a>(
    ctx: &'a Context,
    environment_name: &str,
) -> Workflow<'a, WorkflowContext> {
    let manager = ctx.stack_manager.as_ref();
    Workflow::new("environment upsert")
        .then(EnvironmentFinder::new(&ctx.config, environment_name))
        .then(
            StackReconciler::new(NetworkStack, manager.as_waiter(), manager.as_upserter())
                .with_tags(ctx.base_tags()),
        )
        .then(
            StackReconciler::new(
                ClusterStack::new(manager.as_image_finder()),
                manager.as_waiter(),
                manager.as_upserter(),
            )
            .with_tags(ctx.base_tags()),
        )
}

/// Delete the cluster and then the network of an environment.
///
/// An externally-managed network is never deleted.
pub fn environment_terminator<'a>(
    ctx: &'a Context,
    environment_name: &str,
) -> Workflow<'a, WorkflowContext> {
    let manager = ctx.stack_manager.as_ref();
    Workflow::new("environment terminate")
        .then(EnvironmentFinder::new(&ctx.config, environment_name))
        .then(StackUndeployer::new(
            "cluster",
            |ctx: &WorkflowContext| {
                Ok(Some(stack_name(
                    StackType::Cluster,
                    &ctx.environment()?.name,
                )))
            },
            manager.as_waiter(),
            manager.as_deleter(),
        ))
        .then(StackUndeployer::new(
            "network",
            |ctx: &WorkflowContext| {
                let env = ctx.environment()?;
                if env.unmanaged_vpc().is_some() {
                    info!("  Network for '{}' is unmanaged, leaving it in place", env.name);
                    return Ok(None);
                }
                Ok(Some(stack_name(StackType::Vpc, &env.name)))
            },
            manager.as_waiter(),
            manager.as_deleter(),
        ))
}
