use thiserror::Error;

/// A declared parameter has the wrong shape.
///
/// Raised before any command is rendered, so a rejected declaration never
/// emits a partial set of resources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {found} is not an Array")]
    NotAnArray { field: String, found: String },
    #[error("{field}: {found} is not a Hash")]
    NotAHash { field: String, found: String },
    #[error("{field}: {found} is not a string")]
    NotAString { field: String, found: String },
    #[error("{field}: option '{flag}' must be a boolean, integer or string, found {found}")]
    InvalidOptionValue {
        field: String,
        flag: String,
        found: String,
    },
    #[error("{field}: must not be empty")]
    Empty { field: String },
}

impl ValidationError {
    /// Name of the offending parameter.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::NotAnArray { field, .. }
            | ValidationError::NotAHash { field, .. }
            | ValidationError::NotAString { field, .. }
            | ValidationError::InvalidOptionValue { field, .. }
            | ValidationError::Empty { field } => field,
        }
    }
}

#[derive(Debug, Error)]
pub enum CommonError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{kind} '{name}': {source}")]
    Declaration {
        kind: &'static str,
        name: String,
        #[source]
        source: ValidationError,
    },
    #[error("{}", join_errors(.0))]
    InvalidDeclarations(Vec<CommonError>),
}

fn join_errors(errors: &[CommonError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
