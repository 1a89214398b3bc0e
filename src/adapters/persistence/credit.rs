use async_trait::async_trait;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::credit::Credit,
    use_cases::inventory::{CreditCounts, CreditRepo, DeleteOutcome, NewCredit},
};

pub(super) const CREDIT_COLUMNS: &str = "id, code, link, is_used, is_test, created_at, assigned_at";

pub(super) fn row_to_credit(row: &PgRow) -> Credit {
    Credit {
        id: row.get("id"),
        code: row.get("code"),
        link: row.get("link"),
        is_used: row.get("is_used"),
        is_test: row.get("is_test"),
        created_at: row.get("created_at"),
        assigned_at: row.get("assigned_at"),
    }
}

#[async_trait]
impl CreditRepo for PostgresPersistence {
    async fn create(&self, credit: NewCredit) -> AppResult<Credit> {
        let row = sqlx::query(&format!(
            "INSERT INTO credits (id, code, link, is_test) VALUES ($1, $2, $3, $4) RETURNING {CREDIT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&credit.code)
        .bind(&credit.link)
        .bind(credit.is_test)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_credit(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Credit>> {
        let row = sqlx::query(&format!("SELECT {CREDIT_COLUMNS} FROM credits WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_credit))
    }

    async fn list_all(&self) -> AppResult<Vec<Credit>> {
        let rows = sqlx::query(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits ORDER BY created_at ASC, code ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_credit).collect())
    }

    async fn delete_unused(&self, id: Uuid) -> AppResult<DeleteOutcome<Credit>> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let row = sqlx::query(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let Some(credit) = row.as_ref().map(row_to_credit) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if credit.is_used {
            return Ok(DeleteOutcome::Refused(credit));
        }

        sqlx::query("DELETE FROM credits WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;
        tx.commit().await.map_err(AppError::from)?;

        Ok(DeleteOutcome::Deleted(credit))
    }

    async fn counts(&self) -> AppResult<CreditCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_used) AS used,
                COUNT(*) FILTER (WHERE NOT is_used AND NOT is_test) AS available_real,
                COUNT(*) FILTER (WHERE is_test) AS test
            FROM credits
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(CreditCounts {
            total: row.get("total"),
            used: row.get("used"),
            available_real: row.get("available_real"),
            test: row.get("test"),
        })
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM credits")
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
