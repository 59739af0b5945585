//! Lifecycle error definitions.

use thiserror::Error;

use crate::component::ComponentId;

/// Error type returned by component `start`/`stop` implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while wiring or starting an orchestrator.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The edge would make two (or more) components mutually dependent.
    #[error("dependency cycle: component {dependency} already depends on component {dependent}")]
    DependencyCycle { dependent: String, dependency: String },

    /// The edge has already been registered.
    #[error("component {dependent} already has a dependency on component {dependency}")]
    AlreadyRegistered { dependent: String, dependency: String },

    /// The id does not belong to any component this orchestrator manages.
    #[error("component {0} is not managed by this orchestrator")]
    UnknownComponent(ComponentId),

    /// A component returned an error from `start`.
    #[error("failed to start component {component}: {source}")]
    StartFailed {
        component: String,
        #[source]
        source: BoxError,
    },
}

impl LifecycleError {
    /// Name of the component whose start failed, if this is a start failure.
    pub fn failed_component(&self) -> Option<&str> {
        match self {
            LifecycleError::StartFailed { component, .. } => Some(component),
            _ => None,
        }
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::sync::Arc;

    use crate::component::simulated::SimulatedComponent;
    use crate::component::Component;

    #[test]
    fn test_error_display() {
        let err = LifecycleError::DependencyCycle {
            dependent: "a".into(),
            dependency: "b".into(),
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle: component b already depends on component a"
        );

        let err = LifecycleError::AlreadyRegistered {
            dependent: "a".into(),
            dependency: "b".into(),
        };
        assert_eq!(err.to_string(), "component a already has a dependency on component b");
    }

    #[test]
    fn test_unknown_component_display() {
        let component: Arc<dyn Component> = Arc::new(SimulatedComponent::new("x"));
        let err = LifecycleError::UnknownComponent(ComponentId::of(&component));
        assert!(err.to_string().ends_with("is not managed by this orchestrator"));
        assert_eq!(err.failed_component(), None);
    }

    #[test]
    fn test_start_failed_source() {
        let err = LifecycleError::StartFailed {
            component: "broker".into(),
            source: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "failed to start component broker: connection refused");
        assert_eq!(err.failed_component(), Some("broker"));
        assert_eq!(err.source().map(|s| s.to_string()), Some("connection refused".to_string()));
    }
}
