use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{DoctorStore, Result, StoreError};
use crate::{
    models::{Doctor, NewDoctor, generate_id},
    search::DoctorFilter,
};

/// Doctor store that keeps all records in process memory, in insertion order.
///
/// Nothing survives a restart. Used for tests and for running the service
/// without a database.
#[derive(Debug, Default)]
pub struct MemoryDoctorStore {
    doctors: RwLock<Vec<Doctor>>,
}

impl MemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored doctors.
    pub async fn len(&self) -> usize {
        self.doctors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DoctorStore for MemoryDoctorStore {
    #[instrument(skip(self))]
    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor> {
        // check and insert under one lock
        let mut doctors = self.doctors.write().await;

        if doctors.iter().any(|d| doctor.same_details_as(d)) {
            return Err(StoreError::Duplicate);
        }

        let doctor = doctor.into_doctor(generate_id(), OffsetDateTime::now_utc());
        doctors.push(doctor.clone());

        Ok(doctor)
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>> {
        let doctors = self.doctors.read().await;

        Ok(doctors
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }
}
