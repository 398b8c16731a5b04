//! # mu
//!
//! Builds and tears down deployment environments and services by reconciling
//! named infrastructure stacks against an orchestration backend. The `mu`
//! binary is a thin CLI over this library.
//!
//! ## Quick Example
//!
//! ```
//! use mu::config;
//! use mu::stack::{stack_name, StackType};
//!
//! let config = config::parse(
//!     r#"
//! environments:
//!   - name: dev
//!   - name: prod
//!     vpcTarget:
//!       vpcId: vpc-0abc
//!       publicSubnetIds: [subnet-1, subnet-2]
//! "#,
//! )
//! .unwrap();
//!
//! assert!(config.environment("dev").unwrap().unmanaged_vpc().is_none());
//! assert!(config.environment("prod").unwrap().unmanaged_vpc().is_some());
//! assert_eq!(stack_name(StackType::Cluster, "dev"), "mu-cluster-dev");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: the `mu.yml` schema of environments and
//!   the repository's service.
//! - **Stacks (`stack`)**: stack naming, statuses and the stack record a
//!   provider reports.
//! - **Providers (`provider`)**: capability traits for upserting, awaiting
//!   and deleting stacks and for finding machine images, plus a file-backed
//!   local implementation.
//! - **Workflows (`workflow`)**: ordered executors that resolve an
//!   environment and reconcile its stacks in dependency order, passing each
//!   stack's outputs on to the next.
//! - **Context (`context`)**: the loaded configuration, repository revision
//!   and provider a command builds its workflows from.

pub mod config;
pub mod context;
pub mod error;
pub mod git;
pub mod output;
pub mod provider;
pub mod stack;
pub mod templates;
pub mod workflow;

#[cfg(test)]
mod naming_proptest;

pub use error::{Error, Result};
