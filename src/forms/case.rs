//! Forms for opening and editing legal cases.

use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
/// A person assigned to a case in a given role (lead counsel, paralegal, ...).
pub struct RoleAssignment {
    #[validate(range(min = 1, message = "Select a user"))]
    pub user_id: i32,
    #[validate(length(min = 1, message = "Select a role"))]
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "at_least_one_assignment"))]
pub struct RoleAssignmentsForm {
    #[serde(default)]
    #[validate(nested)]
    pub assignments: Vec<RoleAssignment>,
}

fn at_least_one_assignment(form: &RoleAssignmentsForm) -> Result<(), ValidationError> {
    if form.assignments.is_empty() {
        let mut error = ValidationError::new("assignments_required");
        error.message = Some(Cow::Borrowed("Assign at least one person"));
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
/// Form data for opening a case.
pub struct CaseForm {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    /// Court or internal docket number.
    #[validate(length(min = 1, message = "Case number is required"))]
    pub case_number: String,
    #[validate(range(min = 1, message = "Select a client"))]
    pub client_id: i32,
    #[serde(default)]
    #[validate(nested)]
    pub role_assignments: RoleAssignmentsForm,
}
