//! Persistence of doctor records.
//!
//! [`DoctorStore`] is the seam between the HTTP layer and the storage backend.
//! [`PgDoctorStore`] is the production backend, [`MemoryDoctorStore`] keeps
//! everything in process.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    models::{Doctor, NewDoctor},
    search::DoctorFilter,
};

mod memory;
mod postgres;

pub use memory::MemoryDoctorStore;
pub use postgres::{PgDoctorStore, StoreOptions};

/// Errors returned by a [`DoctorStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No database url was configured.
    #[error("no database url configured")]
    NotConfigured,

    /// No connection to the database could be established.
    #[error("could not connect to the database")]
    Connection(#[source] sqlx::Error),

    /// A doctor with exactly the same details already exists.
    #[error("Doctor already exists with the same details.")]
    Duplicate,

    /// A stored row does not form a valid doctor.
    #[error("stored doctor {id} is invalid: {reason}")]
    CorruptRecord { id: uuid::Uuid, reason: String },

    /// The database failed to execute a query.
    #[error("database error")]
    Database(
        #[source]
        #[from]
        sqlx::Error,
    ),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Storage backend for doctor records.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    /// Inserts a new doctor, unless one with the same details exists.
    ///
    /// Returns [`StoreError::Duplicate`] without writing anything if there is
    /// already a doctor with identical name, gender, specialization and
    /// description. The check and the insert are atomic.
    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor>;

    /// Returns all doctors matching `filter`, in storage order.
    async fn find(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>>;
}
