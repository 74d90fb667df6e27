//! The SQL code for the `doctors` table
//! that is required for the Postgres store to work.

use sqlx::PgPool;
use tracing::debug;

/// Creates the `doctors` table and its indices, if they do not exist yet.
///
/// The `CHECK` constraints mirror [`DoctorDraft::validate`](crate::validation::DoctorDraft::validate).
/// The unique index makes duplicate detection part of the insert itself. The
/// free text columns are indexed through their hashes, since a btree entry is
/// limited to a few kilobytes.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "doctors" (
    "id" UUID PRIMARY KEY,
    "name" TEXT NOT NULL CHECK (btrim("name") <> ''),
    "gender" TEXT NOT NULL CHECK ("gender" IN ('male', 'female', 'other')),
    "specialization" TEXT NOT NULL CHECK (btrim("specialization") <> ''),
    "description" TEXT NOT NULL CHECK ("description" <> ''),
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
);

ALTER TABLE "doctors" DROP CONSTRAINT IF EXISTS "doctors_description_check";
ALTER TABLE "doctors" ADD CONSTRAINT "doctors_description_check" CHECK ("description" <> '');

DROP INDEX IF EXISTS "doctors_details_key";
CREATE UNIQUE INDEX IF NOT EXISTS "doctors_details_digest_key"
    ON "doctors" (md5("name"), "gender", md5("specialization"), md5("description"));
"#;

/// Runs the schema DDL. Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> sqlx::Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    debug!("doctors schema is up to date");

    Ok(())
}
