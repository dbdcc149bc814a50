use thiserror::Error;

/// Outcome classification for a subscription-creation attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The storefront refused the request (unknown pet or plan, pet already subscribed, ...).
    #[error("Subscription rejected: {reason}")]
    Rejected { reason: String },

    /// Network fault, timeout or server-side failure. Retrying with the same snapshot is safe.
    #[error("Subscription request failed: {message}")]
    Transient { message: String },

    /// A submission is already in flight for this workflow.
    #[error("A subscription request is already being processed")]
    Duplicate,
}

impl SubmissionError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Errors raised by workflow transitions. None of these end the workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Selection required: please select {}", missing.join(" and "))]
    SelectionRequired { missing: Vec<&'static str> },

    #[error("Cannot {action} while {step}")]
    StepLocked { action: &'static str, step: String },

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("No async runtime available to run the submission")]
    NoRuntime,
}

impl WorkflowError {
    /// True for the "selection required" guard, which callers surface as a prompt.
    pub fn is_guard(&self) -> bool {
        matches!(self, Self::SelectionRequired { .. })
    }
}

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{resource} unavailable: {message}")]
    DataUnavailable { resource: String, message: String },

    #[error("Unknown {kind} '{id}'")]
    UnknownSelection { kind: &'static str, id: String },

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl From<SubmissionError> for StorefrontError {
    fn from(err: SubmissionError) -> Self {
        Self::Workflow(WorkflowError::Submission(err))
    }
}

impl StorefrontError {
    pub fn data_unavailable(resource: &str, message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the storefront".to_string(),
            Self::Io(e) => format!("File access failed: {}", e),
            Self::Serialization(_) => "The storefront sent an unexpected response".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => format!("Configuration problem: {}", self),
            Self::DataUnavailable { resource, .. } => {
                format!("{} are currently unavailable", resource)
            }
            Self::UnknownSelection { kind, id } => format!("No {} with id {} is available", kind, id),
            Self::Workflow(WorkflowError::Submission(SubmissionError::Rejected { reason })) => {
                format!("Error creating subscription: {}", reason)
            }
            Self::Workflow(e) => e.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Http(_) | Self::DataUnavailable { .. } => {
                "Check that the storefront API is running and the base URL is correct"
            }
            Self::Io(_) => "Check that the configuration file exists and is readable",
            Self::Serialization(_) => "Check that the base URL points at the storefront API",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration file or command line flags",
            Self::UnknownSelection { .. } => "List the catalog and your pets to find valid ids",
            Self::Workflow(WorkflowError::SelectionRequired { .. }) => {
                "Select a pet and a subscription plan to continue"
            }
            Self::Workflow(WorkflowError::Submission(SubmissionError::Transient { .. })) => {
                "Retry the same request; your choices have been kept"
            }
            Self::Workflow(WorkflowError::Submission(SubmissionError::Rejected { .. })) => {
                "Adjust your pet, plan or add-ons and submit again"
            }
            Self::Workflow(_) => "Wait for the pending request to finish and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(SubmissionError::transient("timeout").is_retryable());
        assert!(!SubmissionError::rejected("pet already subscribed").is_retryable());
        assert!(!SubmissionError::Duplicate.is_retryable());
    }

    #[test]
    fn test_selection_required_message_lists_missing_fields() {
        let err = WorkflowError::SelectionRequired {
            missing: vec!["a pet", "a subscription plan"],
        };
        assert!(err.is_guard());
        assert_eq!(
            err.to_string(),
            "Selection required: please select a pet and a subscription plan"
        );
    }

    #[test]
    fn test_rejection_surfaces_reason_to_user() {
        let err: StorefrontError = SubmissionError::rejected("pet already subscribed").into();
        assert_eq!(
            err.user_friendly_message(),
            "Error creating subscription: pet already subscribed"
        );
    }
}
