use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    adapters::persistence::{
        PostgresPersistence,
        credit::{CREDIT_COLUMNS, row_to_credit},
        eligible_user::{USER_COLUMNS, row_to_user},
    },
    app_error::{AppError, AppResult},
    domain::entities::{credit::Credit, eligible_user::EligibleUser},
    use_cases::allocation::{Allocation, AllocationStore, ClaimOutcome, ClaimRequest},
};

async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> AppResult<EligibleUser> {
    let row = sqlx::query(&format!(
        "SELECT {USER_COLUMNS} FROM eligible_users WHERE id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(AppError::from)?;

    row.as_ref()
        .map(row_to_user)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn held_credit(
    tx: &mut Transaction<'_, Postgres>,
    user: &EligibleUser,
) -> AppResult<Credit> {
    let credit_id = user
        .credit_id
        .ok_or_else(|| AppError::Internal(format!("User {} claimed without credit", user.id)))?;

    let row = sqlx::query(&format!("SELECT {CREDIT_COLUMNS} FROM credits WHERE id = $1"))
        .bind(credit_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::from)?;
    Ok(row_to_credit(&row))
}

#[async_trait]
impl AllocationStore for PostgresPersistence {
    async fn claim(&self, request: ClaimRequest) -> AppResult<ClaimOutcome> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        // Serializes claims for the same user.
        let user = lock_user(&mut tx, request.user_id).await?;
        if user.has_claimed {
            let credit = held_credit(&mut tx, &user).await?;
            return Ok(ClaimOutcome::AlreadyClaimed(Allocation { user, credit }));
        }

        // SKIP LOCKED: concurrent claims for different users take different rows.
        let candidate = sqlx::query(&format!(
            r#"
            SELECT {CREDIT_COLUMNS} FROM credits
            WHERE is_used = FALSE AND is_test = $1
            ORDER BY created_at ASC, code ASC
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#
        ))
        .bind(request.pool.is_test())
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let Some(candidate) = candidate.as_ref().map(row_to_credit) else {
            return Err(AppError::PoolExhausted);
        };

        let now = Utc::now().naive_utc();

        let credit_row = sqlx::query(&format!(
            "UPDATE credits SET is_used = TRUE, assigned_at = $2 WHERE id = $1 RETURNING {CREDIT_COLUMNS}"
        ))
        .bind(candidate.id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let user_row = sqlx::query(&format!(
            r#"
            UPDATE eligible_users
            SET has_claimed = TRUE, claimed_at = $2, credit_id = $3, name = COALESCE($4, name)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(now)
        .bind(candidate.id)
        .bind(request.display_name.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;

        Ok(ClaimOutcome::Assigned(Allocation {
            user: row_to_user(&user_row),
            credit: row_to_credit(&credit_row),
        }))
    }

    async fn revoke(&self, user_id: Uuid) -> AppResult<Allocation> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let user = lock_user(&mut tx, user_id).await?;
        if !user.has_claimed {
            return Err(AppError::NothingToRevoke);
        }
        let credit = held_credit(&mut tx, &user).await?;

        // Clear the reference first; credit_id is a foreign key.
        let user_row = sqlx::query(&format!(
            r#"
            UPDATE eligible_users
            SET has_claimed = FALSE, claimed_at = NULL, credit_id = NULL
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let credit_row = sqlx::query(&format!(
            "UPDATE credits SET is_used = FALSE, assigned_at = NULL WHERE id = $1 RETURNING {CREDIT_COLUMNS}"
        ))
        .bind(credit.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;

        Ok(Allocation {
            user: row_to_user(&user_row),
            credit: row_to_credit(&credit_row),
        })
    }
}
