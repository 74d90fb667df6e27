//! Models for doctor records.
//!
//! [`Doctor`] is what the store hands out, [`NewDoctor`] is what it accepts.
//! A [`NewDoctor`] can only be obtained by validating a
//! [`DoctorDraft`](crate::validation::DoctorDraft).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Gender of a doctor, as shown in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// The stored representation of this gender.
    pub const fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    /// Parses the exact, lowercase representation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidGender(s.to_string()))
    }
}

/// A persisted doctor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub gender: Gender,
    pub specialization: String,
    pub description: String,

    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

/// A validated doctor that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewDoctor {
    pub(crate) name: String,
    pub(crate) gender: Gender,
    pub(crate) specialization: String,
    pub(crate) description: String,
}

impl NewDoctor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn specialization(&self) -> &str {
        &self.specialization
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether `doctor` carries exactly the same details.
    pub fn same_details_as(&self, doctor: &Doctor) -> bool {
        self.name == doctor.name
            && self.gender == doctor.gender
            && self.specialization == doctor.specialization
            && self.description == doctor.description
    }

    /// Turns this draft into a record with the given identity and timestamps.
    pub(crate) fn into_doctor(self, id: Uuid, now: OffsetDateTime) -> Doctor {
        Doctor {
            id,
            name: self.name,
            gender: self.gender,
            specialization: self.specialization,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Generates a new UUID v7.
///
/// These ids are used as the identifier of every doctor record.
pub fn generate_id() -> Uuid {
    Uuid::now_v7()
}
