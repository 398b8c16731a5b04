//! # Stacks
//!
//! Data model for the remote resource groups mu reconciles, and the naming
//! convention that makes every upsert idempotent: the same stack type, logical
//! name and environment always address the same remote stack.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of public subnet slots an owned network stack publishes.
pub const OWNED_SUBNET_COUNT: usize = 3;

/// Parameter key carrying the network id.
pub const VPC_ID_KEY: &str = "VpcId";

/// Parameter keys published by a cluster stack.
pub const CLUSTER_NAME_KEY: &str = "EcsCluster";
pub const LISTENER_ARN_KEY: &str = "EcsElbListenerArn";
pub const LB_SECURITY_GROUP_KEY: &str = "EcsElbSecurityGroup";

/// Parameter key for the public subnet in slot `n` (1-based).
pub fn subnet_key(n: usize) -> String {
    format!("PublicSubnetAZ{}Id", n)
}

/// Mapping of parameter keys to values, shared between reconcilers.
pub type ParameterMap = HashMap<String, String>;

/// The kinds of stack mu manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackType {
    Vpc,
    Cluster,
    Repo,
    Service,
    Pipeline,
}

impl StackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackType::Vpc => "vpc",
            StackType::Cluster => "cluster",
            StackType::Repo => "repo",
            StackType::Service => "service",
            StackType::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for StackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of an environment-scoped stack: `mu-<type>-<name>`
pub fn stack_name(stack_type: StackType, name: &str) -> String {
    format!("mu-{}-{}", stack_type, name)
}

/// Name of a service-scoped stack: `mu-<type>-<service>-<environment>`
pub fn service_stack_name(stack_type: StackType, service: &str, environment: &str) -> String {
    format!("mu-{}-{}-{}", stack_type, service, environment)
}

/// Lifecycle states reported by the orchestration backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StackStatus {
    CreateInProgress,
    CreateFailed,
    CreateComplete,
    RollbackInProgress,
    RollbackFailed,
    RollbackComplete,
    DeleteInProgress,
    DeleteFailed,
    DeleteComplete,
    UpdateInProgress,
    UpdateCompleteCleanupInProgress,
    UpdateComplete,
    UpdateRollbackInProgress,
    UpdateRollbackFailed,
    UpdateRollbackCompleteCleanupInProgress,
    UpdateRollbackComplete,
    ReviewInProgress,
}

impl StackStatus {
    /// Every status, in declaration order.
    pub const ALL: [StackStatus; 17] = [
        StackStatus::CreateInProgress,
        StackStatus::CreateFailed,
        StackStatus::CreateComplete,
        StackStatus::RollbackInProgress,
        StackStatus::RollbackFailed,
        StackStatus::RollbackComplete,
        StackStatus::DeleteInProgress,
        StackStatus::DeleteFailed,
        StackStatus::DeleteComplete,
        StackStatus::UpdateInProgress,
        StackStatus::UpdateCompleteCleanupInProgress,
        StackStatus::UpdateComplete,
        StackStatus::UpdateRollbackInProgress,
        StackStatus::UpdateRollbackFailed,
        StackStatus::UpdateRollbackCompleteCleanupInProgress,
        StackStatus::UpdateRollbackComplete,
        StackStatus::ReviewInProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StackStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            StackStatus::CreateFailed => "CREATE_FAILED",
            StackStatus::CreateComplete => "CREATE_COMPLETE",
            StackStatus::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            StackStatus::RollbackFailed => "ROLLBACK_FAILED",
            StackStatus::RollbackComplete => "ROLLBACK_COMPLETE",
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteFailed => "DELETE_FAILED",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::UpdateInProgress => "UPDATE_IN_PROGRESS",
            StackStatus::UpdateCompleteCleanupInProgress => "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            StackStatus::UpdateComplete => "UPDATE_COMPLETE",
            StackStatus::UpdateRollbackInProgress => "UPDATE_ROLLBACK_IN_PROGRESS",
            StackStatus::UpdateRollbackFailed => "UPDATE_ROLLBACK_FAILED",
            StackStatus::UpdateRollbackCompleteCleanupInProgress => {
                "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            StackStatus::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            StackStatus::ReviewInProgress => "REVIEW_IN_PROGRESS",
        }
    }

    /// A stack in a terminal state is not mid-transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            StackStatus::CreateInProgress
                | StackStatus::RollbackInProgress
                | StackStatus::DeleteInProgress
                | StackStatus::UpdateInProgress
                | StackStatus::UpdateCompleteCleanupInProgress
                | StackStatus::UpdateRollbackInProgress
                | StackStatus::UpdateRollbackCompleteCleanupInProgress
                | StackStatus::ReviewInProgress
        )
    }

    /// The last create or update applied cleanly.
    pub fn is_success(&self) -> bool {
        matches!(self, StackStatus::CreateComplete | StackStatus::UpdateComplete)
    }

    /// Terminal, and neither a successful apply nor a completed delete.
    pub fn is_failure(&self) -> bool {
        self.is_terminal() && !self.is_success() && *self != StackStatus::DeleteComplete
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StackStatus::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown stack status '{}'", s))
    }
}

/// Summary of a remote stack as reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: String,
    pub name: String,
    pub status: StackStatus,
    #[serde(default)]
    pub status_reason: Option<String>,
    /// Seconds since the unix epoch
    #[serde(default)]
    pub last_update_time: u64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub outputs: HashMap<String, String>,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl Stack {
    /// A stack with the given name and status and nothing else set.
    pub fn new(name: impl Into<String>, status: StackStatus) -> Self {
        let name = name.into();
        Self {
            id: format!("stack/{}", name),
            name,
            status,
            status_reason: None,
            last_update_time: 0,
            tags: HashMap::new(),
            outputs: HashMap::new(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_output(mut self, key: &str, value: &str) -> Self {
        self.outputs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.status_reason = Some(reason.to_string());
        self
    }
}
