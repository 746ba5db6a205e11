//! Repository for the `projects` table.

use sqlx::PgPool;
use workboard_core::projects::{PlannedWrite, DEFAULT_STATE};
use workboard_core::types::DbId;

use crate::models::project::{CreateProject, Project, StateCount, StatusCounts};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, description, state, active, start_date, end_date, created_at, updated_at";

/// Label used when counting rows whose state is missing or empty.
pub const NO_STATE_LABEL: &str = "No state";

/// Name of the unique constraint guarding project names.
pub const NAME_CONSTRAINT: &str = "uq_projects_name";

/// Name of the check constraint guarding `end_date >= start_date`.
pub const DATE_RANGE_CONSTRAINT: &str = "ck_projects_date_range";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new active project, returning the created row.
    ///
    /// If `state` is `None` in the input, defaults to "In progress".
    pub async fn insert(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, state, start_date, end_date)
             VALUES ($1, $2, COALESCE($3, $4), $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.state)
            .bind(DEFAULT_STATE)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a project by ID, including inactive rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active project by ID.
    pub async fn find_active_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND active = TRUE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the project holding `name`, including inactive rows.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE name = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List active projects ordered by most recently created first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE active = TRUE ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Apply a planned write. Only non-`None` changes are applied.
    ///
    /// The row is only touched while its `active` flag still equals
    /// `write.expect_active`. Returns `None` if the row is gone or a
    /// concurrent request flipped the flag first.
    pub async fn apply(pool: &PgPool, write: &PlannedWrite) -> Result<Option<Project>, sqlx::Error> {
        let changes = &write.changes;
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                state = COALESCE($5, state),
                active = COALESCE($6, active),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                updated_at = NOW()
             WHERE id = $1 AND active = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(write.id)
            .bind(write.expect_active)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(&changes.state)
            .bind(changes.active)
            .bind(changes.start_date)
            .bind(changes.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an active project. Returns `true` if a row was deactivated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET active = FALSE, updated_at = NOW()
             WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count active projects per state label, ordered by label.
    pub async fn count_by_state(pool: &PgPool) -> Result<Vec<StateCount>, sqlx::Error> {
        sqlx::query_as::<_, StateCount>(
            "SELECT COALESCE(NULLIF(state, ''), $1) AS state, COUNT(*) AS count
             FROM projects
             WHERE active = TRUE
             GROUP BY 1
             ORDER BY 1 ASC",
        )
        .bind(NO_STATE_LABEL)
        .fetch_all(pool)
        .await
    }

    /// Count active, inactive, and total rows.
    pub async fn count_by_status(pool: &PgPool) -> Result<StatusCounts, sqlx::Error> {
        sqlx::query_as::<_, StatusCounts>(
            "SELECT
                COUNT(*) FILTER (WHERE active) AS active,
                COUNT(*) FILTER (WHERE NOT active) AS inactive,
                COUNT(*) AS total
             FROM projects",
        )
        .fetch_one(pool)
        .await
    }
}
