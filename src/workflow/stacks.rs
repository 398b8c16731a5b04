//! Strategies for the stack types mu reconciles.

use super::reconcile::{forward_params, StackStrategy};
use super::WorkflowContext;
use crate::config::Service;
use crate::error::Result;
use crate::provider::ImageFinder;
use crate::stack::{
    service_stack_name, stack_name, subnet_key, ParameterMap, StackType, CLUSTER_NAME_KEY,
    LB_SECURITY_GROUP_KEY, LISTENER_ARN_KEY, OWNED_SUBNET_COUNT, VPC_ID_KEY,
};
use crate::templates;

/// Image name pattern used when an environment does not pin its image
pub const ECS_IMAGE_PATTERN: &str = "amzn-ami-*-amazon-ecs-optimized";

fn network_keys() -> Vec<String> {
    let mut keys = vec![VPC_ID_KEY.to_string()];
    keys.extend((1..=OWNED_SUBNET_COUNT).map(subnet_key));
    keys
}

fn insert_opt<T: ToString>(params: &mut ParameterMap, key: &str, value: Option<T>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value.to_string());
    }
}

/// The environment's network.
///
/// Bypassed entirely when the environment targets an externally-managed
/// network; the external ids are published under the same keys.
pub struct NetworkStack;

impl StackStrategy for NetworkStack {
    fn stack_type(&self) -> StackType {
        StackType::Vpc
    }

    fn stack_name(&self, ctx: &WorkflowContext) -> Result<String> {
        Ok(stack_name(StackType::Vpc, &ctx.environment()?.name))
    }

    fn template(&self) -> &str {
        templates::VPC
    }

    fn bypass(&self, ctx: &WorkflowContext) -> Option<ParameterMap> {
        let target = ctx.environment.as_ref()?.unmanaged_vpc()?;
        let mut params = ParameterMap::new();
        params.insert(VPC_ID_KEY.to_string(), target.vpc_id.clone());
        for (index, subnet) in target.public_subnet_ids.iter().enumerate() {
            params.insert(subnet_key(index + 1), subnet.clone());
        }
        Some(params)
    }

    fn parameters(&self, _ctx: &WorkflowContext) -> Result<ParameterMap> {
        Ok(ParameterMap::new())
    }

    fn output_keys(&self) -> Vec<String> {
        network_keys()
    }
}

/// The environment's container cluster, placed in the network published by
/// [`NetworkStack`].
pub struct ClusterStack<'a> {
    image_finder: &'a dyn ImageFinder,
}

impl<'a> ClusterStack<'a> {
    pub fn new(image_finder: &'a dyn ImageFinder) -> Self {
        Self { image_finder }
    }
}

impl StackStrategy for ClusterStack<'_> {
    fn stack_type(&self) -> StackType {
        StackType::Cluster
    }

    fn stack_name(&self, ctx: &WorkflowContext) -> Result<String> {
        Ok(stack_name(StackType::Cluster, &ctx.environment()?.name))
    }

    fn template(&self) -> &str {
        templates::CLUSTER
    }

    fn parameters(&self, ctx: &WorkflowContext) -> Result<ParameterMap> {
        let env = ctx.environment()?;
        let cluster = &env.cluster;
        let mut params = ParameterMap::new();

        forward_params(ctx, &network_keys(), &mut params);
        // Unmanaged networks may publish more subnets than an owned one.
        let mut slot = OWNED_SUBNET_COUNT + 1;
        while let Some(subnet) = ctx.params.get(&subnet_key(slot)) {
            params.insert(subnet_key(slot), subnet.clone());
            slot += 1;
        }

        let image_id = match &cluster.image_id {
            Some(id) => id.clone(),
            None => self.image_finder.find_latest_image_id(ECS_IMAGE_PATTERN)?,
        };
        params.insert("ImageId".to_string(), image_id);

        insert_opt(&mut params, "InstanceType", cluster.instance_type.as_ref());
        insert_opt(&mut params, "InstanceTenancy", cluster.instance_tenancy.as_ref());
        insert_opt(&mut params, "DesiredCapacity", cluster.desired_capacity);
        insert_opt(&mut params, "MaxSize", cluster.max_size);
        insert_opt(&mut params, "KeyName", cluster.key_name.as_ref());
        insert_opt(&mut params, "SshAllow", cluster.ssh_allow.as_ref());
        insert_opt(&mut params, "ScaleOutThreshold", cluster.scale_out_threshold);
        insert_opt(&mut params, "ScaleInThreshold", cluster.scale_in_threshold);
        insert_opt(&mut params, "ElbHostName", env.loadbalancer.hostname.as_ref());
        Ok(params)
    }

    fn output_keys(&self) -> Vec<String> {
        vec![
            CLUSTER_NAME_KEY.to_string(),
            LISTENER_ARN_KEY.to_string(),
            LB_SECURITY_GROUP_KEY.to_string(),
        ]
    }
}

/// A service running on the environment's cluster.
pub struct ServiceStack {
    service: Service,
    image_url: Option<String>,
}

impl ServiceStack {
    /// `image_url` is the container image to run, when it is known.
    pub fn new(service: Service, image_url: Option<String>) -> Self {
        Self { service, image_url }
    }
}

impl StackStrategy for ServiceStack {
    fn stack_type(&self) -> StackType {
        StackType::Service
    }

    fn stack_name(&self, ctx: &WorkflowContext) -> Result<String> {
        Ok(service_stack_name(
            StackType::Service,
            ctx.service_name()?,
            &ctx.environment()?.name,
        ))
    }

    fn template(&self) -> &str {
        templates::SERVICE
    }

    fn parameters(&self, ctx: &WorkflowContext) -> Result<ParameterMap> {
        let service = &self.service;
        let mut params = ParameterMap::new();
        params.insert("ServiceName".to_string(), ctx.service_name()?.to_string());
        forward_params(
            ctx,
            &[
                CLUSTER_NAME_KEY.to_string(),
                LISTENER_ARN_KEY.to_string(),
                VPC_ID_KEY.to_string(),
            ],
            &mut params,
        );

        insert_opt(&mut params, "ImageUrl", self.image_url.as_ref());
        insert_opt(&mut params, "ServicePort", service.port);
        insert_opt(&mut params, "ServiceHealthEndpoint", service.health_endpoint.as_ref());
        insert_opt(&mut params, "ServiceCpu", service.cpu);
        insert_opt(&mut params, "ServiceMemory", service.memory);
        insert_opt(&mut params, "ServiceDesiredCount", service.desired_count);
        if !service.path_patterns.is_empty() {
            params.insert("PathPattern".to_string(), service.path_patterns.join(","));
        }
        Ok(params)
    }

    fn output_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn tags(&self, ctx: &WorkflowContext) -> Result<ParameterMap> {
        let mut tags = ParameterMap::new();
        tags.insert("mu:type".to_string(), StackType::Service.to_string());
        tags.insert(
            "mu:environment".to_string(),
            ctx.environment()?.name.clone(),
        );
        tags.insert("mu:service".to_string(), ctx.service_name()?.to_string());
        Ok(tags)
    }
}
