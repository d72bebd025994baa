//! Manager Errors
//!
//! User-facing failures. `Display` renders the banner text.

use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManagerError {
    /// Loading the workspace failed
    #[error("Failed to load your lists. Starting with an empty workspace.")]
    Initialization(#[source] DomainError),

    /// A title was empty or whitespace
    #[error("{entity} title cannot be empty")]
    Validation { entity: &'static str },

    /// A storage call failed
    #[error("Failed to {action}. Please try again.")]
    Operation {
        action: &'static str,
        #[source]
        source: DomainError,
    },
}

impl ManagerError {
    /// Underlying storage error, if any
    pub fn domain_error(&self) -> Option<&DomainError> {
        match self {
            Self::Initialization(source) | Self::Operation { source, .. } => Some(source),
            Self::Validation { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let init = ManagerError::Initialization(DomainError::CorruptImage("bad".into()));
        assert_eq!(
            init.to_string(),
            "Failed to load your lists. Starting with an empty workspace."
        );

        let validation = ManagerError::Validation { entity: "List" };
        assert_eq!(validation.to_string(), "List title cannot be empty");
        assert!(validation.domain_error().is_none());

        let op = ManagerError::Operation {
            action: "create list",
            source: DomainError::Storage("disk full".into()),
        };
        assert_eq!(op.to_string(), "Failed to create list. Please try again.");
        assert_eq!(
            op.domain_error(),
            Some(&DomainError::Storage("disk full".into()))
        );
    }
}
