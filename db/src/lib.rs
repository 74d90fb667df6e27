#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Doctor records and their storage.
//!
//! Records enter through [`DoctorDraft::validate`] and are persisted by a
//! [`DoctorStore`]. Listing goes through a [`DoctorFilter`].

pub mod models;
pub mod schema;
pub mod search;
pub mod store;
pub mod validation;

pub use models::{Doctor, Gender, NewDoctor};
pub use search::{DoctorFilter, MatchOperator};
pub use store::{DoctorStore, MemoryDoctorStore, PgDoctorStore, StoreError, StoreOptions};
pub use validation::{DoctorDraft, ValidationError};
