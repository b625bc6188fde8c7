//! The unified error type for the compilation and execution engine.
//!
//! Every failure mode named in the engine's error-handling design collapses
//! into one of these variants. Compilation errors are recoverable per
//! request (the engine handle is untouched); execution errors are retried a
//! bounded number of times by the caller before surfacing here.

use crate::ConfigError;

/// Result type alias used throughout the engine crates.
pub type Result<T> = std::result::Result<T, FraiseQLError>;

/// Unified error type for the GraphQL-to-SQL engine.
#[derive(Debug, thiserror::Error)]
pub enum FraiseQLError {
    /// The GraphQL document text was rejected by the parser.
    #[error("parse error: {message}")]
    Parse {
        /// Human-readable parse failure.
        message: String,
    },

    /// A field, column, or relationship path does not exist under the
    /// active schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of the missing or mismatched schema element.
        message: String,
    },

    /// The operation is forbidden for the resolved role.
    #[error("operation denied for role '{role}': {message}")]
    RoleDenied {
        /// The role the request was compiled under.
        role: String,
        /// Why the operation was denied.
        message: String,
    },

    /// A required variable (`$user_id`, `$cursor`, or an arg flagged
    /// required) was not supplied.
    #[error("missing required variable: {name}")]
    VariableRequired {
        /// Name of the missing variable.
        name: String,
    },

    /// A variable was supplied but could not be coerced to the type the
    /// bind site expects.
    #[error("variable '{name}' has the wrong type: {message}")]
    VariableTypeMismatch {
        /// Name of the offending variable.
        name: String,
        /// Explanation of the mismatch.
        message: String,
    },

    /// A configured constraint predicate rejected a variable's value.
    #[error("validation failed for '{field}': {message}")]
    ValidationFailed {
        /// Name of the field or variable that failed validation.
        field: String,
        /// Explanation of the failure.
        message: String,
    },

    /// The active dialect cannot express a requested query form.
    #[error("compilation error: {message}")]
    Compilation {
        /// Description of the unsupported construct.
        message: String,
    },

    /// The database driver returned an error after retries were exhausted.
    #[error("execution error: {message}")]
    Execution {
        /// Driver-reported message.
        message: String,
    },

    /// A mutation targeted a database marked read-only.
    #[error("database '{database}' is read-only; mutation rejected")]
    ReadOnlyViolation {
        /// Name of the read-only database.
        database: String,
    },

    /// A cross-database join placeholder could not be resolved.
    #[error("cross-database join failed for field '{field}': {message}")]
    CrossDbJoin {
        /// The placeholder field that failed to splice.
        field: String,
        /// Explanation of the failure.
        message: String,
    },

    /// A transaction or non-subscription query was routed into the
    /// subscription path.
    #[error("subscription protocol error: {message}")]
    SubscriptionProtocol {
        /// Explanation of the protocol violation.
        message: String,
    },

    /// Invalid configuration was detected at init or reload.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An operation was cancelled via its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

impl FraiseQLError {
    /// Stable machine-readable error code, used to key the structured
    /// per-problem entries in a response's `errors` array.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse_error",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::RoleDenied { .. } => "role_denied",
            Self::VariableRequired { .. } => "variable_required",
            Self::VariableTypeMismatch { .. } => "variable_type_mismatch",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::Compilation { .. } => "compilation_error",
            Self::Execution { .. } => "execution_error",
            Self::ReadOnlyViolation { .. } => "read_only_violation",
            Self::CrossDbJoin { .. } => "cross_db_join_error",
            Self::SubscriptionProtocol { .. } => "subscription_protocol_error",
            Self::Config(_) => "config_error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a caller should retry the operation that produced this
    /// error. Execution errors are retryable; everything else is a
    /// deterministic rejection that retrying would not fix.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// Whether this error should be classified as a client mistake (bad
    /// query, missing variable, denied role) as opposed to a server-side
    /// or infrastructure failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::SchemaMismatch { .. }
                | Self::RoleDenied { .. }
                | Self::VariableRequired { .. }
                | Self::VariableTypeMismatch { .. }
                | Self::ValidationFailed { .. }
                | Self::ReadOnlyViolation { .. }
        )
    }

    // ------------------------------------------------------------------
    // Constructor helpers
    // ------------------------------------------------------------------

    /// Build a [`FraiseQLError::Parse`].
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }

    /// Build a [`FraiseQLError::SchemaMismatch`].
    #[must_use]
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch { message: message.into() }
    }

    /// Build a [`FraiseQLError::RoleDenied`].
    #[must_use]
    pub fn role_denied(role: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RoleDenied { role: role.into(), message: message.into() }
    }

    /// Build a [`FraiseQLError::VariableRequired`].
    #[must_use]
    pub fn variable_required(name: impl Into<String>) -> Self {
        Self::VariableRequired { name: name.into() }
    }

    /// Build a [`FraiseQLError::Compilation`].
    #[must_use]
    pub fn compilation(message: impl Into<String>) -> Self {
        Self::Compilation { message: message.into() }
    }

    /// Build a [`FraiseQLError::Execution`].
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution { message: message.into() }
    }
}
