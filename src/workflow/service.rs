//! Service workflows: deploying the repository's service into an environment
//! and removing it again.

use super::{
    EnvironmentFinder, Executor, ServiceStack, StackOutputReader, StackReconciler,
    StackUndeployer, Workflow, WorkflowContext,
};
use crate::config::Service;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::stack::{service_stack_name, StackType};

/// Executor that decides which service the workflow acts on.
///
/// An explicit name wins over the one in the configuration.
pub struct ServiceInput<'a> {
    service: &'a Service,
    explicit: Option<String>,
}

impl<'a> ServiceInput<'a> {
    pub fn new(service: &'a Service, explicit: Option<&str>) -> Self {
        Self {
            service,
            explicit: explicit.map(str::to_string),
        }
    }
}

impl Executor<WorkflowContext> for ServiceInput<'_> {
    fn describe(&self) -> String {
        "resolve service name".to_string()
    }

    fn execute(&self, ctx: &mut WorkflowContext) -> Result<()> {
        let name = self
            .explicit
            .clone()
            .or_else(|| self.service.name.clone())
            .filter(|name| !name.is_empty())
            .ok_or(Error::ServiceNotConfigured)?;
        crate::config::validate_service_name(&name)?;
        ctx.service_name = Some(name);
        Ok(())
    }
}

/// Image the service stack runs: `<imageRepository>:<revision>`.
pub fn image_url(service: &Service, revision: &str) -> Option<String> {
    service
        .image_repository
        .as_ref()
        .map(|repository| format!("{}:{}", repository, revision))
}

/// Deploy the configured service into an environment whose cluster is up.
pub fn service_deployer<'a>(
    ctx: &'a Context,
    environment_name: &str,
    service_name: Option<&str>,
) -> Workflow<'a, WorkflowContext> {
    let manager = ctx.stack_manager.as_ref();
    let service = ctx.config.service.clone();
    let image = image_url(&service, &ctx.repo.revision);
    Workflow::new("service deploy")
        .then(EnvironmentFinder::new(&ctx.config, environment_name))
        .then(ServiceInput::new(&ctx.config.service, service_name))
        .then(StackOutputReader::new(
            StackType::Cluster,
            manager.as_waiter(),
        ))
        .then(
            StackReconciler::new(
                ServiceStack::new(service, image),
                manager.as_waiter(),
                manager.as_upserter(),
            )
            .with_tags(ctx.base_tags()),
        )
}

/// Remove a service from an environment.
///
/// The environment does not need to be declared in the configuration any
/// more, so a service can still be cleaned out of a retired environment.
pub fn service_undeployer<'a>(
    ctx: &'a Context,
    environment_name: &str,
    service_name: Option<&str>,
) -> Workflow<'a, WorkflowContext> {
    let manager = ctx.stack_manager.as_ref();
    let environment_name = environment_name.to_string();
    Workflow::new("service undeploy")
        .then(ServiceInput::new(&ctx.config.service, service_name))
        .then(StackUndeployer::new(
            "service",
            move |ctx: &WorkflowContext| {
                crate::config::validate_name("environment", &environment_name)?;
                Ok(Some(service_stack_name(
                    StackType::Service,
                    ctx.service_name()?,
                    &environment_name,
                )))
            },
            manager.as_waiter(),
            manager.as_deleter(),
        ))
}
