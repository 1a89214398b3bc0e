//! Bulk import of credits and eligible users from CSV exports.
//!
//! The format is deliberately loose: a header row, comma separated values,
//! double quotes stripped, header names matched case-insensitively. Fields
//! containing commas are not supported.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{is_valid_credit_code, is_valid_email, normalize_email},
    domain::entities::approval_status::ApprovalStatus,
    use_cases::inventory::{CreditRepo, EligibleUserRepo, NewCredit, NewEligibleUser},
};

pub const REFERRAL_BASE_URL: &str = "https://cursor.com/referral?code=";
const FALLBACK_CODE_LEN: usize = 12;
const DEFAULT_USER_NAME: &str = "Unknown";

pub type CsvRow = HashMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: u64,
    pub duplicates: u64,
    pub skipped: u64,
}

pub fn parse_csv(content: &str) -> Vec<CsvRow> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = split_line(header_line)
        .map(|h| h.to_lowercase())
        .collect();

    lines
        .map(|line| {
            let mut values = split_line(line);
            headers
                .iter()
                .map(|h| (h.clone(), values.next().unwrap_or_default()))
                .collect()
        })
        .collect()
}

fn split_line(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(',').map(|v| v.replace('"', "").trim().to_string())
}

fn field<'a>(row: &'a CsvRow, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| row.get(*name))
        .map(|v| v.as_str())
        .find(|v| !v.is_empty())
}

/// The `code=` query value of a referral link, or the first alphanumerics of it.
pub fn extract_code(link: &str) -> String {
    for (idx, _) in link.match_indices("code=") {
        let code: String = link[idx + "code=".len()..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if !code.is_empty() {
            return code;
        }
    }
    link.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(FALLBACK_CODE_LEN)
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// `None` for rows that must not be imported: no link, no usable code, or
/// already taken.
pub fn credit_from_row(row: &CsvRow) -> Option<NewCredit> {
    let link = field(row, &["link", "url"])?;
    if field(row, &["status"]).is_some_and(|s| s.eq_ignore_ascii_case("taken")) {
        return None;
    }

    let code = extract_code(link);
    if !is_valid_credit_code(&code) {
        return None;
    }
    let link = if link.starts_with("http") {
        link.to_string()
    } else {
        format!("{REFERRAL_BASE_URL}{code}")
    };

    Some(NewCredit {
        code,
        link,
        is_test: field(row, &["is_test", "test"]).is_some_and(is_truthy),
    })
}

/// `None` for rows with an invalid email or a status other than approved.
pub fn user_from_row(row: &CsvRow) -> Option<NewEligibleUser> {
    let email = field(row, &["email"])?;
    if !is_valid_email(email) {
        return None;
    }
    let status = field(row, &["approval_status", "status"])
        .map(ApprovalStatus::from_raw)
        .unwrap_or(Some(ApprovalStatus::Approved))?;
    if status != ApprovalStatus::Approved {
        return None;
    }

    Some(NewEligibleUser {
        email: normalize_email(email),
        name: field(row, &["name"]).unwrap_or(DEFAULT_USER_NAME).to_string(),
        company: field(row, &["company"]).map(str::to_string),
        role: field(row, &["role"]).map(str::to_string),
        approval_status: status,
    })
}

pub async fn import_credits(repo: &dyn CreditRepo, content: &str) -> AppResult<ImportReport> {
    let mut report = ImportReport::default();
    for row in parse_csv(content) {
        let Some(credit) = credit_from_row(&row) else {
            report.skipped += 1;
            continue;
        };
        let code = credit.code.clone();
        match repo.create(credit).await {
            Ok(_) => report.created += 1,
            Err(AppError::Conflict(_)) => {
                tracing::info!(%code, "Skipping duplicate credit");
                report.duplicates += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

pub async fn import_users(repo: &dyn EligibleUserRepo, content: &str) -> AppResult<ImportReport> {
    let mut report = ImportReport::default();
    for row in parse_csv(content) {
        let Some(user) = user_from_row(&row) else {
            report.skipped += 1;
            continue;
        };
        let email = user.email.clone();
        match repo.create(user).await {
            Ok(_) => report.created += 1,
            Err(AppError::Conflict(_)) => {
                tracing::info!(%email, "Skipping duplicate eligible user");
                report.duplicates += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

/// Deletes users first; credits are referenced by them.
pub async fn reset(users: &dyn EligibleUserRepo, credits: &dyn CreditRepo) -> AppResult<(u64, u64)> {
    let removed_users = users.delete_all().await?;
    let removed_credits = credits.delete_all().await?;
    Ok((removed_users, removed_credits))
}
