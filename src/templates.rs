//! Built-in stack templates.
//!
//! The body sent with every upsert. Each template declares the outputs its
//! reconciler publishes for later stacks.

use crate::stack::StackType;

pub const VPC: &str = include_str!("templates/vpc.yml");
pub const CLUSTER: &str = include_str!("templates/cluster.yml");
pub const SERVICE: &str = include_str!("templates/service.yml");

/// Template body for a stack type, if mu ships one.
pub fn template(stack_type: StackType) -> Option<&'static str> {
    match stack_type {
        StackType::Vpc => Some(VPC),
        StackType::Cluster => Some(CLUSTER),
        StackType::Service => Some(SERVICE),
        StackType::Repo | StackType::Pipeline => None,
    }
}
