//! # Environment Command Implementation
//!
//! `mu environment list|upsert|terminate`. Upsert and terminate run the
//! library workflows; list reports the status of each environment's network
//! and cluster stacks.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{finish, Globals};
use mu::config::Environment;
use mu::context::Context;
use mu::output::{format_status, render_table, OutputConfig};
use mu::stack::{stack_name, StackType};
use mu::workflow::{environment_terminator, environment_upserter, WorkflowContext};

/// Manage environments
#[derive(Args, Debug)]
pub struct EnvironmentArgs {
    #[command(subcommand)]
    pub command: EnvironmentCommand,
}

#[derive(Subcommand, Debug)]
pub enum EnvironmentCommand {
    /// List configured environments and their stack status
    #[command(alias = "ls")]
    List,

    /// Create or update an environment's network and cluster
    Upsert {
        /// Name of the environment in mu.yml
        environment: String,
    },

    /// Delete an environment's cluster and, when managed, its network
    #[command(alias = "rm")]
    Terminate {
        /// Name of the environment in mu.yml
        environment: String,
    },
}

/// Execute the `environment` command.
pub fn execute(args: EnvironmentArgs, globals: &Globals) -> Result<()> {
    let ctx = globals.context()?;
    let output = &globals.output;

    match args.command {
        EnvironmentCommand::List => list(&ctx, output),
        EnvironmentCommand::Upsert { environment } => finish(
            output,
            environment_upserter(&ctx, &environment).run(WorkflowContext::new()),
            &format!("Environment '{}' upserted", environment),
        ),
        EnvironmentCommand::Terminate { environment } => finish(
            output,
            environment_terminator(&ctx, &environment).run(WorkflowContext::new()),
            &format!("Environment '{}' terminated", environment),
        ),
    }
}

fn list(ctx: &Context, output: &OutputConfig) -> Result<()> {
    if ctx.config.environments.is_empty() {
        println!("No environments configured.");
        return Ok(());
    }

    let waiter = ctx.stack_manager.as_waiter();
    let mut rows = Vec::with_capacity(ctx.config.environments.len());
    for env in &ctx.config.environments {
        let network_status = match env.unmanaged_vpc() {
            Some(_) => None,
            None => waiter
                .await_final_status(&stack_name(StackType::Vpc, &env.name))?
                .map(|stack| stack.status),
        };
        let cluster_status = waiter
            .await_final_status(&stack_name(StackType::Cluster, &env.name))?
            .map(|stack| stack.status);

        rows.push(vec![
            env.name.clone(),
            network_label(env),
            format_status(output, network_status),
            format_status(output, cluster_status),
        ]);
    }

    println!(
        "{}",
        render_table(
            &["ENVIRONMENT", "NETWORK", "NETWORK STACK", "CLUSTER STACK"],
            &rows
        )
    );
    Ok(())
}

fn network_label(env: &Environment) -> String {
    match env.unmanaged_vpc() {
        Some(target) => format!("{} (unmanaged)", target.vpc_id),
        None => "managed".to_string(),
    }
}
