//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the `mu.yml`
//! configuration file and the logic for loading it.
//!
//! ## Key Components
//!
//! - **`Config`**: The whole file: the ordered list of environments and the
//!   service definition for the repository.
//! - **`Environment`**: A named deployment target. Its name is the key used by
//!   every environment-scoped stack name, so names must be unique and usable
//!   inside a stack name.
//! - **`VpcTarget`**: An optional externally-managed network. When present the
//!   network stack of that environment is never touched by mu.
//! - **`Service`**: The service built from this repository.
//!
//! The workflow engine only reads environment names, the network target, the
//! cluster settings and the service block. Everything else is carried through
//! to stack parameters.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "mu.yml";

/// Parsed `mu.yml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory the configuration was loaded from
    #[serde(skip)]
    pub basedir: PathBuf,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub service: Service,
}

/// A named deployment target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub loadbalancer: Loadbalancer,
    #[serde(default)]
    pub cluster: ClusterSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_target: Option<VpcTarget>,
}

impl Environment {
    /// Create an environment with only a name, everything else defaulted.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// The externally-managed network, if one is configured and non-empty.
    pub fn unmanaged_vpc(&self) -> Option<&VpcTarget> {
        self.vpc_target.as_ref().filter(|t| t.is_unmanaged())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loadbalancer {
    #[serde(default)]
    pub hostname: Option<String>,
}

/// Sizing and scaling settings for the environment's container cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSettings {
    /// Pin the machine image instead of looking up the latest one
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub instance_tenancy: Option<String>,
    #[serde(default)]
    pub desired_capacity: Option<u32>,
    #[serde(default)]
    pub max_size: Option<u32>,
    #[serde(default)]
    pub key_name: Option<String>,
    #[serde(default)]
    pub ssh_allow: Option<String>,
    #[serde(default)]
    pub scale_out_threshold: Option<u32>,
    #[serde(default)]
    pub scale_in_threshold: Option<u32>,
}

/// An externally-managed network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcTarget {
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default)]
    pub public_subnet_ids: Vec<String>,
}

impl VpcTarget {
    /// An empty `vpcTarget:` block behaves as if it were absent.
    pub fn is_unmanaged(&self) -> bool {
        !self.vpc_id.is_empty()
    }
}

/// The service built from this repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desired_count: Option<u32>,
    #[serde(default)]
    pub dockerfile: Option<String>,
    #[serde(default)]
    pub image_repository: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub health_endpoint: Option<String>,
    #[serde(default)]
    pub cpu: Option<u32>,
    #[serde(default)]
    pub memory: Option<u32>,
    #[serde(default)]
    pub path_patterns: Vec<String>,
}

impl Config {
    /// Find an environment by exact name.
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.name == name)
    }

    /// Check the invariants the stack naming convention depends on.
    pub fn validate(&self) -> Result<()> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.environments.len());
        for env in &self.environments {
            validate_name("environment", &env.name)?;
            if seen.contains(&env.name.as_str()) {
                return Err(Error::ConfigParse {
                    message: format!("Duplicate environment '{}'", env.name),
                    hint: Some("Environment names must be unique".to_string()),
                });
            }
            seen.push(&env.name);
        }
        if let Some(name) = &self.service.name {
            validate_service_name(name)?;
        }
        Ok(())
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][-A-Za-z0-9]*$").expect("valid name regex"))
}

fn service_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("valid service regex"))
}

/// Ensure a logical name can be embedded in a stack name.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            kind: kind.to_string(),
            name: name.to_string(),
            allowed: "letters, digits and hyphens",
        })
    }
}

/// Ensure a service name can be embedded in a service stack name.
///
/// Hyphens are reserved: `mu-service-<service>-<environment>` splits at the
/// first hyphen after the prefix, so the environment keeps them.
pub fn validate_service_name(name: &str) -> Result<()> {
    if service_name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            kind: "service".to_string(),
            name: name.to_string(),
            allowed: "letters and digits",
        })
    }
}

/// Parse and validate a YAML configuration string.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let config: Config = if yaml_content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: None,
        })?
    };
    config.validate()?;
    Ok(config)
}

/// Load the configuration from a file, recording its directory as `basedir`.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let mut config = parse(&content)?;
    config.basedir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(config)
}

/// Pick the configuration file: explicit path, then `MU_CONFIG`, then `mu.yml`.
pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os("MU_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
