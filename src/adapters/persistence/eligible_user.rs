use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::{
        approval_status::ApprovalStatus,
        credit::Credit,
        eligible_user::{EligibleUser, EligibleUserWithCredit},
    },
    use_cases::inventory::{DeleteOutcome, EligibleUserRepo, NewEligibleUser, UserCounts},
};

pub(super) const USER_COLUMNS: &str = "id, email, name, company, role, approval_status, has_claimed, claimed_at, credit_id, created_at";

/// Unknown stored statuses are treated as not approved.
fn parse_status(raw: &str, user_id: Uuid) -> ApprovalStatus {
    ApprovalStatus::from_raw(raw).unwrap_or_else(|| {
        tracing::warn!(
            user_id = %user_id,
            raw_status = raw,
            "Unknown approval status, treating as pending_approval"
        );
        ApprovalStatus::PendingApproval
    })
}

pub(super) fn row_to_user(row: &PgRow) -> EligibleUser {
    let id: Uuid = row.get("id");
    let raw_status: String = row.get("approval_status");
    EligibleUser {
        id,
        email: row.get("email"),
        name: row.get("name"),
        company: row.get("company"),
        role: row.get("role"),
        approval_status: parse_status(&raw_status, id),
        has_claimed: row.get("has_claimed"),
        claimed_at: row.get("claimed_at"),
        credit_id: row.get("credit_id"),
        created_at: row.get("created_at"),
    }
}

fn row_to_user_with_credit(row: &PgRow) -> EligibleUserWithCredit {
    let credit_id: Option<Uuid> = row.get("c_id");
    let credit = credit_id.map(|id| Credit {
        id,
        code: row.get("c_code"),
        link: row.get("c_link"),
        is_used: row.get("c_is_used"),
        is_test: row.get("c_is_test"),
        created_at: row.get("c_created_at"),
        assigned_at: row.get("c_assigned_at"),
    });
    EligibleUserWithCredit {
        user: row_to_user(row),
        credit,
    }
}

#[async_trait]
impl EligibleUserRepo for PostgresPersistence {
    async fn create(&self, user: NewEligibleUser) -> AppResult<EligibleUser> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO eligible_users (id, email, name, company, role, approval_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.company)
        .bind(&user.role)
        .bind(user.approval_status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_user(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<EligibleUser>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM eligible_users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<EligibleUser>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM eligible_users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn list_with_credits(&self) -> AppResult<Vec<EligibleUserWithCredit>> {
        let rows = sqlx::query(
            r#"
            SELECT
                u.id, u.email, u.name, u.company, u.role, u.approval_status,
                u.has_claimed, u.claimed_at, u.credit_id, u.created_at,
                c.id AS c_id, c.code AS c_code, c.link AS c_link, c.is_used AS c_is_used,
                c.is_test AS c_is_test, c.created_at AS c_created_at,
                c.assigned_at AS c_assigned_at
            FROM eligible_users u
            LEFT JOIN credits c ON c.id = u.credit_id
            ORDER BY u.created_at ASC, u.email ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_user_with_credit).collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApprovalStatus,
    ) -> AppResult<Option<EligibleUser>> {
        let row = sqlx::query(&format!(
            "UPDATE eligible_users SET approval_status = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn delete_unclaimed(&self, id: Uuid) -> AppResult<DeleteOutcome<EligibleUser>> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM eligible_users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let Some(user) = row.as_ref().map(row_to_user) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if user.has_claimed {
            return Ok(DeleteOutcome::Refused(user));
        }

        sqlx::query("DELETE FROM eligible_users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;
        tx.commit().await.map_err(AppError::from)?;

        Ok(DeleteOutcome::Deleted(user))
    }

    async fn counts(&self) -> AppResult<UserCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE approval_status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE approval_status = 'pending_approval') AS pending_approval,
                COUNT(*) FILTER (WHERE has_claimed) AS claimed
            FROM eligible_users
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(UserCounts {
            total: row.get("total"),
            approved: row.get("approved"),
            pending_approval: row.get("pending_approval"),
            claimed: row.get("claimed"),
        })
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM eligible_users")
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
