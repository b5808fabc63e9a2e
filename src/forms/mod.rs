//! Form definitions and their validation errors.

use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::forms::errors::ErrorTree;

pub mod case;
pub mod client;
pub mod errors;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {} message(s)", .0.message_count())]
    Validation(ErrorTree),
}

impl FormError {
    /// The per-field errors to show next to the inputs.
    pub fn into_error_tree(self) -> ErrorTree {
        match self {
            FormError::Validation(tree) => tree,
        }
    }
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        FormError::Validation(ErrorTree::from(&errors))
    }
}

/// Runs the form's validators and converts failures into an [`ErrorTree`].
pub fn validate_form<F>(form: &F) -> Result<(), FormError>
where
    F: Validate,
{
    form.validate().map_err(|err| {
        log::debug!("Failed to validate form: {err}");
        FormError::from(err)
    })
}
