//! Property-based tests for stack naming, name validation and output
//! extraction.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::config::{validate_name, validate_service_name, Environment, VpcTarget};
    use crate::stack::{service_stack_name, stack_name, Stack, StackStatus, StackType};
    use crate::workflow::reconcile::{extract_outputs, StackStrategy};
    use crate::workflow::{NetworkStack, WorkflowContext};
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = StackStatus> {
        proptest::sample::select(StackStatus::ALL.to_vec())
    }

    fn environment_type() -> impl Strategy<Value = StackType> {
        prop_oneof![Just(StackType::Vpc), Just(StackType::Cluster)]
    }

    // ============================================================================
    // stack naming
    // ============================================================================

    proptest! {
        /// Property: the same inputs always address the same stack
        #[test]
        fn stack_name_is_deterministic(
            stack_type in environment_type(),
            name in "[A-Za-z][-A-Za-z0-9]{0,20}",
        ) {
            prop_assert_eq!(stack_name(stack_type, &name), stack_name(stack_type, &name));
            prop_assert_eq!(
                stack_name(stack_type, &name),
                format!("mu-{}-{}", stack_type.as_str(), name)
            );
        }

        /// Property: distinct environments never share a stack
        #[test]
        fn distinct_environments_get_distinct_stacks(
            stack_type in environment_type(),
            a in "[A-Za-z][-A-Za-z0-9]{0,20}",
            b in "[A-Za-z][-A-Za-z0-9]{0,20}",
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(stack_name(stack_type, &a), stack_name(stack_type, &b));
        }

        /// Property: network and cluster stacks of one environment never collide
        #[test]
        fn stack_types_do_not_collide(name in "[A-Za-z][-A-Za-z0-9]{0,20}") {
            prop_assert_ne!(
                stack_name(StackType::Vpc, &name),
                stack_name(StackType::Cluster, &name)
            );
        }

        /// Property: service stacks carry both the service and the environment
        #[test]
        fn service_stack_name_embeds_both_names(
            service in "[A-Za-z][A-Za-z0-9]{0,12}",
            environment in "[A-Za-z][-A-Za-z0-9]{0,12}",
        ) {
            prop_assert!(validate_service_name(&service).is_ok());
            let name = service_stack_name(StackType::Service, &service, &environment);
            let suffix = format!("-{}", environment);
            let infix = format!("-{}-", service);
            prop_assert!(name.starts_with("mu-service-"));
            prop_assert!(name.ends_with(&suffix));
            prop_assert!(name.contains(&infix));
        }

        /// Property: distinct valid (service, environment) pairs never share a stack
        #[test]
        fn distinct_service_pairs_get_distinct_stacks(
            a in ("[A-Za-z][A-Za-z0-9]{0,6}", "[A-Za-z][-A-Za-z0-9]{0,6}"),
            b in ("[A-Za-z][A-Za-z0-9]{0,6}", "[A-Za-z][-A-Za-z0-9]{0,6}"),
        ) {
            prop_assume!(a != b);
            prop_assert!(validate_service_name(&a.0).is_ok());
            prop_assert!(validate_name("environment", &a.1).is_ok());
            prop_assert_ne!(
                service_stack_name(StackType::Service, &a.0, &a.1),
                service_stack_name(StackType::Service, &b.0, &b.1)
            );
        }

        /// Property: a hyphen anywhere in a service name is rejected
        #[test]
        fn service_names_with_hyphens_are_invalid(
            head in "[A-Za-z][A-Za-z0-9]{0,6}",
            tail in "[-A-Za-z0-9]{0,6}",
        ) {
            let name = format!("{}-{}", head, tail);
            prop_assert!(validate_service_name(&name).is_err());
            prop_assert!(validate_name("environment", &name).is_ok());
        }
    }

    #[test]
    fn hyphenated_service_cannot_shadow_hyphenated_environment() {
        // Both would be mu-service-a-b-c.
        assert_eq!(
            service_stack_name(StackType::Service, "a-b", "c"),
            service_stack_name(StackType::Service, "a", "b-c")
        );
        assert!(validate_service_name("a-b").is_err());
        assert!(validate_service_name("a").is_ok());
        assert!(validate_name("environment", "b-c").is_ok());
    }

    // ============================================================================
    // name validation
    // ============================================================================

    proptest! {
        /// Property: names made of a letter then letters, digits and dashes are accepted
        #[test]
        fn well_formed_names_are_valid(name in "[A-Za-z][-A-Za-z0-9]{0,30}") {
            prop_assert!(validate_name("environment", &name).is_ok());
        }

        /// Property: any whitespace makes a name invalid
        #[test]
        fn names_with_whitespace_are_invalid(
            head in "[A-Za-z][a-z0-9]{0,8}",
            tail in "[a-z0-9]{0,8}",
            space in "[ \t\n]",
        ) {
            let name = format!("{}{}{}", head, space, tail);
            prop_assert!(validate_name("environment", &name).is_err());
        }

        /// Property: names starting with a digit or dash are invalid
        #[test]
        fn names_must_start_with_a_letter(name in "[-0-9][-A-Za-z0-9]{0,10}") {
            prop_assert!(validate_name("environment", &name).is_err());
            prop_assert!(validate_service_name(&name).is_err());
        }
    }

    // ============================================================================
    // statuses
    // ============================================================================

    proptest! {
        /// Property: success and failure are disjoint and both terminal
        #[test]
        fn status_classes_are_consistent(status in any_status()) {
            prop_assert!(!(status.is_success() && status.is_failure()));
            if status.is_success() || status.is_failure() {
                prop_assert!(status.is_terminal());
            }
            if status.is_terminal() {
                prop_assert!(
                    status.is_success()
                        || status.is_failure()
                        || status == StackStatus::DeleteComplete
                );
            }
        }

        /// Property: the wire form of a status parses back to itself
        #[test]
        fn status_wire_form_parses(status in any_status()) {
            prop_assert_eq!(status.as_str().parse::<StackStatus>(), Ok(status));
        }
    }

    // ============================================================================
    // outputs and bypass
    // ============================================================================

    proptest! {
        /// Property: every requested key is published, reported or not
        #[test]
        fn extract_outputs_covers_every_key(
            keys in proptest::collection::btree_set("[A-Z][A-Za-z]{0,10}", 0..6),
            reported in proptest::collection::btree_set("[A-Z][A-Za-z]{0,10}", 0..6),
        ) {
            let mut stack = Stack::new("mu-vpc-dev", StackStatus::CreateComplete);
            for key in &reported {
                stack = stack.with_output(key, "value");
            }
            let keys: Vec<String> = keys.into_iter().collect();

            let outputs = extract_outputs("mu-vpc-dev", &stack, &keys);
            prop_assert_eq!(outputs.len(), keys.len());
            for key in &keys {
                let expected = if reported.contains(key) {
                    "value".to_string()
                } else {
                    format!("mu-vpc-dev-{}", key)
                };
                prop_assert_eq!(&outputs[key], &expected);
            }
        }

        /// Property: an unmanaged network publishes its own ids, a managed one is never bypassed
        #[test]
        fn network_bypass_follows_vpc_target(
            vpc_id in "(vpc-[0-9a-f]{4,8})?",
            subnets in proptest::collection::vec("subnet-[0-9a-f]{4}", 0..5),
        ) {
            let mut env = Environment::named("dev");
            env.vpc_target = Some(VpcTarget {
                vpc_id: vpc_id.clone(),
                public_subnet_ids: subnets.clone(),
            });
            let ctx = WorkflowContext {
                environment: Some(env),
                ..Default::default()
            };

            match NetworkStack.bypass(&ctx) {
                Some(params) => {
                    prop_assert!(!vpc_id.is_empty());
                    prop_assert_eq!(&params["VpcId"], &vpc_id);
                    prop_assert_eq!(params.len(), subnets.len() + 1);
                }
                None => prop_assert!(vpc_id.is_empty()),
            }
        }
    }
}
