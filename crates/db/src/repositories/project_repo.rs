//! Repository for the `projects` table.

use roofdesk_core::roles::Role;
use roofdesk_core::types::DbId;
use roofdesk_core::workflow::ProjectStatus;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProposalDetails, StatusChange, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, address, user_id, client_id, contractor_id, status, \
    proposal_status, roof_area, roof_pitch, estimated_cost, proposal_amount, proposal_notes, \
    proposal_materials, proposal_sent_at, decline_reason, warehouse_id, created_at, updated_at, \
    deleted_at";

/// Reason recorded on reserved lines released by a soft delete.
pub const CANCELLATION_REASON: &str = "Project cancelled";

/// Provides CRUD and workflow writes for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project in `DRAFT`, owned by `user_id`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, address, user_id, status, roof_area, roof_pitch, estimated_cost)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(user_id)
            .bind(ProjectStatus::Draft.as_str())
            .bind(input.roof_area)
            .bind(input.roof_pitch)
            .bind(input.estimated_cost)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the live projects `user_id` may see, newest first.
    ///
    /// Clients see projects they own or are the client of, admins those they
    /// own or are contracted on, developers everything.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: DbId,
        role: Role,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let filter = match role {
            Role::Client => "AND (user_id = $1 OR client_id = $1)",
            Role::Admin => "AND (user_id = $1 OR contractor_id = $1)",
            Role::Developer => "",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NULL {filter}
             ORDER BY created_at DESC"
        );
        let mut q = sqlx::query_as::<_, Project>(&query);
        if role != Role::Developer {
            q = q.bind(user_id);
        }
        q.fetch_all(pool).await
    }

    /// Soft-deleted projects owned by `user_id`, most recently deleted first.
    pub async fn list_deleted_owned(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE user_id = $1 AND deleted_at IS NOT NULL
             ORDER BY deleted_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update editable fields. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                roof_area = COALESCE($4, roof_area),
                roof_pitch = COALESCE($5, roof_pitch),
                estimated_cost = COALESCE($6, estimated_cost),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.roof_area)
            .bind(input.roof_pitch)
            .bind(input.estimated_cost)
            .fetch_optional(pool)
            .await
    }

    /// Write a status change and its side-effect fields.
    ///
    /// `proposal_status` and `decline_reason` are only overwritten when set.
    pub async fn apply_status(
        pool: &PgPool,
        id: DbId,
        change: &StatusChange,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                status = $2,
                proposal_status = COALESCE($3, proposal_status),
                decline_reason = COALESCE($4, decline_reason),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&change.status)
            .bind(&change.proposal_status)
            .bind(&change.decline_reason)
            .fetch_optional(pool)
            .await
    }

    /// Assign contractor and client and move the project on, in one
    /// transaction.
    ///
    /// The row is locked first; if its status is no longer `expected` the
    /// transaction is rolled back and `None` is returned.
    pub async fn send_to_contractor(
        pool: &PgPool,
        id: DbId,
        expected: ProjectStatus,
        contractor_id: DbId,
        client_id: DbId,
        change: &StatusChange,
    ) -> Result<Option<Project>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT status FROM projects WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if current.as_deref() != Some(expected.as_str()) {
            return Ok(None);
        }

        sqlx::query(
            "UPDATE projects SET contractor_id = $2, client_id = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(contractor_id)
        .bind(client_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE projects SET
                status = $2,
                proposal_status = COALESCE($3, proposal_status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&change.status)
            .bind(&change.proposal_status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Record a proposal together with the status change that sends it.
    pub async fn record_proposal(
        pool: &PgPool,
        id: DbId,
        proposal: &ProposalDetails,
        change: &StatusChange,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                proposal_amount = $2,
                proposal_notes = $3,
                warehouse_id = $4,
                proposal_materials = $5,
                proposal_sent_at = NOW(),
                decline_reason = NULL,
                status = $6,
                proposal_status = COALESCE($7, proposal_status),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(proposal.amount)
            .bind(&proposal.notes)
            .bind(proposal.warehouse_id)
            .bind(Json(&proposal.materials))
            .bind(&change.status)
            .bind(&change.proposal_status)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a project and release its reserved ledger lines.
    ///
    /// Returns `true` if a row was marked deleted. Released lines never
    /// decremented stock, so stock is left alone.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let released = sqlx::query(
            "UPDATE project_materials SET
                status = 'RETURNED', return_reason = $2, returned_at = NOW(), updated_at = NOW()
             WHERE project_id = $1 AND status = 'RESERVED'",
        )
        .bind(id)
        .bind(CANCELLATION_REASON)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if released.rows_affected() > 0 {
            tracing::info!(
                project_id = id,
                lines = released.rows_affected(),
                "Released reserved materials of cancelled project",
            );
        }
        Ok(true)
    }

    /// Restore a soft-deleted project. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a soft-deleted project. Live rows are never removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND deleted_at IS NOT NULL")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
