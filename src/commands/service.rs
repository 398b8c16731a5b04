//! # Service Command Implementation
//!
//! `mu service deploy|undeploy|show`. The service defaults to the one
//! declared in `mu.yml`; `--service` acts on another name.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{finish, Globals};
use mu::context::Context;
use mu::output::{format_status, render_table, OutputConfig};
use mu::stack::{service_stack_name, StackType};
use mu::workflow::{service_deployer, service_undeployer, WorkflowContext};
use mu::Error;

/// Manage the repository's service
#[derive(Args, Debug)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Deploy the service into an environment
    Deploy {
        /// Name of the environment in mu.yml
        environment: String,

        /// Service name, overriding the one in mu.yml
        #[arg(short, long, value_name = "NAME")]
        service: Option<String>,
    },

    /// Remove the service from an environment
    Undeploy {
        /// Environment the service runs in; it no longer needs to be in mu.yml
        environment: String,

        /// Service name, overriding the one in mu.yml
        #[arg(short, long, value_name = "NAME")]
        service: Option<String>,
    },

    /// Show the service stack in every configured environment
    Show {
        /// Service name, overriding the one in mu.yml
        #[arg(short, long, value_name = "NAME")]
        service: Option<String>,
    },
}

/// Execute the `service` command.
pub fn execute(args: ServiceArgs, globals: &Globals) -> Result<()> {
    let ctx = globals.context()?;
    let output = &globals.output;

    match args.command {
        ServiceCommand::Deploy {
            environment,
            service,
        } => finish(
            output,
            service_deployer(&ctx, &environment, service.as_deref()).run(WorkflowContext::new()),
            &format!("Service deployed to '{}'", environment),
        ),
        ServiceCommand::Undeploy {
            environment,
            service,
        } => finish(
            output,
            service_undeployer(&ctx, &environment, service.as_deref())
                .run(WorkflowContext::new()),
            &format!("Service undeployed from '{}'", environment),
        ),
        ServiceCommand::Show { service } => show(&ctx, output, service.as_deref()),
    }
}

fn show(ctx: &Context, output: &OutputConfig, service: Option<&str>) -> Result<()> {
    let name = service
        .map(str::to_string)
        .or_else(|| ctx.config.service.name.clone())
        .ok_or(Error::ServiceNotConfigured)?;
    mu::config::validate_service_name(&name)?;

    let waiter = ctx.stack_manager.as_waiter();
    let mut rows = Vec::with_capacity(ctx.config.environments.len());
    for env in &ctx.config.environments {
        let stack_name = service_stack_name(StackType::Service, &name, &env.name);
        let stack = waiter.await_final_status(&stack_name)?;
        let image = stack
            .as_ref()
            .and_then(|s| s.parameters.get("ImageUrl").cloned())
            .unwrap_or_else(|| "-".to_string());
        rows.push(vec![
            env.name.clone(),
            stack_name,
            format_status(output, stack.map(|s| s.status)),
            image,
        ]);
    }

    println!("Service '{}'", name);
    println!(
        "{}",
        render_table(&["ENVIRONMENT", "STACK", "STATUS", "IMAGE"], &rows)
    );
    Ok(())
}
