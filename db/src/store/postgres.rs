use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{DoctorStore, Result, StoreError};
use crate::{
    models::{Doctor, NewDoctor, generate_id},
    schema,
    search::DoctorFilter,
};

const DOCTOR_COLUMNS: &str = r#""id", "name", "gender", "specialization", "description", "created_at", "updated_at""#;

/// Connection settings for [`PgDoctorStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub database_url: Option<String>,
    pub max_connections: u32,

    /// How long a query waits for a free pooled connection.
    pub acquire_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Doctor store backed by a PostgreSQL connection pool.
///
/// Construct it once at startup and share it; the pool is cheap to clone.
#[derive(Debug, Clone)]
pub struct PgDoctorStore {
    pool: PgPool,
}

/// A row of the `doctors` table.
#[derive(Debug, FromRow)]
struct DoctorRow {
    id: Uuid,
    name: String,
    gender: String,
    specialization: String,
    description: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<DoctorRow> for Doctor {
    type Error = StoreError;

    fn try_from(row: DoctorRow) -> Result<Self> {
        let gender = row
            .gender
            .parse()
            .map_err(|err: crate::ValidationError| StoreError::CorruptRecord {
                id: row.id,
                reason: err.to_string(),
            })?;

        Ok(Doctor {
            id: row.id,
            name: row.name,
            gender,
            specialization: row.specialization,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgDoctorStore {
    /// Connects to the configured database and prepares the schema.
    ///
    /// Fails with [`StoreError::NotConfigured`] if no url is set, and with
    /// [`StoreError::Connection`] if the url is invalid or unreachable.
    pub async fn connect(options: &StoreOptions) -> Result<Self> {
        let url = options
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(StoreError::NotConfigured)?;

        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(url)
            .await
            .map_err(StoreError::Connection)?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, after checking it is usable.
    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(StoreError::Connection)?;
        info!("database connection established");

        schema::ensure_schema(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DoctorStore for PgDoctorStore {
    #[instrument(skip(self))]
    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor> {
        // The unique index on the details turns a duplicate into "no row".
        let inserted = sqlx::query_as::<_, DoctorRow>(&format!(
            r#"
            INSERT INTO "doctors" ("id", "name", "gender", "specialization", "description")
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            RETURNING {DOCTOR_COLUMNS}
            "#
        ))
        .bind(generate_id())
        .bind(&doctor.name)
        .bind(doctor.gender.as_str())
        .bind(&doctor.specialization)
        .bind(&doctor.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Database(err),
        })?;

        let Some(row) = inserted else {
            return Err(StoreError::Duplicate);
        };

        Doctor::try_from(row)
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            r#"SELECT {DOCTOR_COLUMNS} FROM "doctors""#
        ));

        let mut separator = " WHERE ";
        for constraint in filter.constraints() {
            query
                .push(separator)
                .push(format!(
                    r#""{}" {} "#,
                    constraint.column,
                    constraint.operator.to_postgres_operator()
                ))
                .push_bind(constraint.operator.to_postgres_value(&constraint.value));
            separator = " AND ";
        }

        let rows = query
            .build_query_as::<DoctorRow>()
            .fetch_all(&self.pool)
            .await?;
        debug!(count = rows.len(), "fetched doctors");

        rows.into_iter().map(Doctor::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a running PostgreSQL instance, reachable through
    //! `DATABASE_URL`. Every test works on its own, freshly created details.

    use super::*;
    use crate::{search::MatchOperator, validation::DoctorDraft};

    async fn store() -> PgDoctorStore {
        let options = StoreOptions {
            database_url: std::env::var("DATABASE_URL").ok(),
            ..StoreOptions::default()
        };
        PgDoctorStore::connect(&options).await.unwrap()
    }

    fn unique_doctor(specialization: &str) -> NewDoctor {
        DoctorDraft {
            name: Some(format!("Dr. {}", Uuid::now_v7())),
            gender: Some("female".into()),
            specialization: Some(specialization.into()),
            description: Some("10 years experience".into()),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn missing_url_is_not_configured() {
        let err = PgDoctorStore::connect(&StoreOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured));
    }

    #[tokio::test]
    async fn invalid_url_fails_to_connect() {
        let options = StoreOptions {
            database_url: Some("not a database url".into()),
            ..StoreOptions::default()
        };
        let err = PgDoctorStore::connect(&options).await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn insert_assigns_identity_and_timestamps() {
        let store = store().await;
        let new = unique_doctor("Cardiology");

        let doctor = store.insert(new.clone()).await.unwrap();

        assert!(new.same_details_as(&doctor));
        assert_eq!(doctor.created_at, doctor.updated_at);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn duplicate_insert_is_rejected() {
        let store = store().await;
        let new = unique_doctor("Cardiology");

        store.insert(new.clone()).await.unwrap();
        let err = store.insert(new.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        let filter = DoctorFilter {
            name: Some(new.name().into()),
            ..DoctorFilter::all()
        };
        assert_eq!(store.find(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn concurrent_duplicates_insert_once() {
        let store = store().await;
        let new = unique_doctor("Neurology");

        let (a, b) = tokio::join!(store.insert(new.clone()), store.insert(new.clone()));
        assert_eq!([a, b].iter().filter(|r| r.is_ok()).count(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn long_details_are_indexable() {
        let store = store().await;
        let name: String = (0..300).map(|_| Uuid::now_v7().simple().to_string()).collect();
        let specialization: String = (0..300)
            .map(|_| Uuid::now_v7().simple().to_string())
            .collect();

        let new = DoctorDraft {
            name: Some(name),
            gender: Some("other".into()),
            specialization: Some(specialization),
            description: Some("   ".into()),
        }
        .validate()
        .unwrap();

        let doctor = store.insert(new.clone()).await.unwrap();
        assert!(new.same_details_as(&doctor));

        let err = store.insert(new).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn find_escapes_like_patterns() {
        let store = store().await;
        let new = unique_doctor("Paediatrics 100%");
        store.insert(new.clone()).await.unwrap();

        let by = |specialization: &str| {
            DoctorFilter::new(
                Some(new.name().into()),
                None,
                Some(specialization.into()),
                MatchOperator::Exact,
            )
        };

        assert_eq!(store.find(&by("PAEDIATRICS")).await.unwrap().len(), 1);
        assert_eq!(store.find(&by("100%")).await.unwrap().len(), 1);
        assert!(store.find(&by("Paed_atrics")).await.unwrap().is_empty());
    }
}
