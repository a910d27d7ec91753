use crate::logic::validate::ValidationErrors;
use crate::model::Id;

/// Everything a form submission can fail with.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Input was rejected; nothing was written.
    #[error("Validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Id },

    /// A natural-key lookup could not produce a single record.
    #[error("Could not resolve {kind}: {detail}")]
    Resolution { kind: &'static str, detail: String },

    /// A validated field was not present in the cleaned data.
    #[error("Cleaned data is missing field '{0}'")]
    MissingField(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        FormError::Invalid(errors)
    }
}

impl FormError {
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            FormError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}
