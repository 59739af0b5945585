//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (`depends_on` names existing components)
//! - Validate value ranges (timeouts > 0, metrics address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: `&LifecycleConfig → Result<(), Vec<ValidationError>>`
//! - Cycles are left to the dependency registry, which reports them with
//!   the offending edge

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::LifecycleConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("component #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("component {0} is declared more than once")]
    DuplicateName(String),

    #[error("component {component} depends on unknown component {missing}")]
    UnknownDependency { component: String, missing: String },

    #[error("component {0} depends on itself")]
    SelfDependency(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("metrics.address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &LifecycleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for (index, component) in config.components.iter().enumerate() {
        if component.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(component.name.as_str()) {
            errors.push(ValidationError::DuplicateName(component.name.clone()));
        }
    }

    for component in &config.components {
        for dep in &component.depends_on {
            if dep == &component.name {
                errors.push(ValidationError::SelfDependency(component.name.clone()));
            } else if !names.contains(dep.as_str()) {
                errors.push(ValidationError::UnknownDependency {
                    component: component.name.clone(),
                    missing: dep.clone(),
                });
            }
        }
    }

    if config.timeouts.start_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("start_secs"));
    }
    if config.timeouts.stop_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("stop_secs"));
    }

    if config.metrics.enabled && config.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(config.metrics.address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
