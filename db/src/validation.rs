//! Validation of untrusted doctor input.
//!
//! All field checks live in [`DoctorDraft::validate`]. The table constraints in
//! [`schema`](crate::schema) only act as a backstop for the same rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{Gender, NewDoctor};

/// Errors produced while validating a [`DoctorDraft`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// At least one field is missing or blank.
    #[error("All fields are required.")]
    MissingFields,

    /// The gender is not one of the known values.
    #[error("Gender must be one of: male, female, other.")]
    InvalidGender(String),

    /// A field contains a NUL character, which text columns cannot store.
    #[error("Fields must not contain NUL characters.")]
    NulCharacter,
}

/// Doctor details as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DoctorDraft {
    #[schema(example = "Dr. Amy Lee")]
    pub name: Option<String>,

    #[schema(example = "female")]
    pub gender: Option<String>,

    #[schema(example = "Cardiology")]
    pub specialization: Option<String>,

    #[schema(example = "10 years experience")]
    pub description: Option<String>,
}

/// Returns the field if it has any non-whitespace content.
fn required(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Returns the field if it is not empty. Whitespace counts as content.
fn present(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|v| !v.is_empty())
}

impl DoctorDraft {
    /// Validates the draft and turns it into a [`NewDoctor`].
    ///
    /// `name` and `specialization` are trimmed and must not be blank.
    /// `description` only has to be non-empty and is kept verbatim, and
    /// `gender` has to match exactly.
    pub fn validate(&self) -> Result<NewDoctor, ValidationError> {
        let (Some(name), Some(gender), Some(specialization), Some(description)) = (
            required(self.name.as_ref()),
            required(self.gender.as_ref()),
            required(self.specialization.as_ref()),
            present(self.description.as_ref()),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        if [name, gender, specialization, description]
            .iter()
            .any(|field| field.contains('\0'))
        {
            return Err(ValidationError::NulCharacter);
        }

        Ok(NewDoctor {
            name: name.trim().to_string(),
            gender: gender.parse::<Gender>()?,
            specialization: specialization.trim().to_string(),
            description: description.to_string(),
        })
    }
}
