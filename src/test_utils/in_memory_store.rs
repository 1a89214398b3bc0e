//! In-memory implementation of the credit, eligibility and allocation ports.
//!
//! One mutex guards both tables so `claim` and `revoke` are atomic the same
//! way the Postgres transaction is.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        approval_status::ApprovalStatus,
        credit::Credit,
        credit_pool::CreditPool,
        eligible_user::{EligibleUser, EligibleUserWithCredit},
    },
    use_cases::{
        allocation::{Allocation, AllocationStore, ClaimOutcome, ClaimRequest},
        inventory::{
            CreditCounts, CreditRepo, DeleteOutcome, EligibleUserRepo, NewCredit,
            NewEligibleUser, UserCounts,
        },
    },
};

#[derive(Default)]
struct Tables {
    credits: HashMap<Uuid, Credit>,
    users: HashMap<Uuid, EligibleUser>,
}

/// Full copy of both tables, sorted by id, for before/after comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub credits: Vec<Credit>,
    pub users: Vec<EligibleUser>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

fn conflict() -> AppError {
    AppError::Conflict("A record with this value already exists".into())
}

fn now() -> chrono::NaiveDateTime {
    Utc::now().naive_utc()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_credit(&self, credit: Credit) {
        self.tables.lock().unwrap().credits.insert(credit.id, credit);
    }

    pub fn insert_user(&self, user: EligibleUser) {
        self.tables.lock().unwrap().users.insert(user.id, user);
    }

    pub fn credit(&self, id: Uuid) -> Option<Credit> {
        self.tables.lock().unwrap().credits.get(&id).cloned()
    }

    pub fn user(&self, id: Uuid) -> Option<EligibleUser> {
        self.tables.lock().unwrap().users.get(&id).cloned()
    }

    pub fn available_count(&self, pool: CreditPool) -> usize {
        self.tables
            .lock()
            .unwrap()
            .credits
            .values()
            .filter(|c| !c.is_used && c.pool() == pool)
            .count()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let tables = self.tables.lock().unwrap();
        let mut credits: Vec<Credit> = tables.credits.values().cloned().collect();
        let mut users: Vec<EligibleUser> = tables.users.values().cloned().collect();
        credits.sort_by_key(|c| c.id);
        users.sort_by_key(|u| u.id);
        StoreSnapshot { credits, users }
    }

    /// Panics unless every used credit is held by exactly one claimed user and
    /// every claimed user points at a used credit.
    pub fn assert_consistent(&self) {
        let tables = self.tables.lock().unwrap();
        let mut holders: HashMap<Uuid, usize> = HashMap::new();
        for user in tables.users.values() {
            match (user.has_claimed, user.credit_id) {
                (true, Some(credit_id)) => {
                    let credit = tables.credits.get(&credit_id).expect("dangling credit_id");
                    assert!(credit.is_used, "claimed credit {credit_id} is not marked used");
                    assert!(user.claimed_at.is_some());
                    *holders.entry(credit_id).or_default() += 1;
                }
                (false, None) => assert!(user.claimed_at.is_none()),
                other => panic!("inconsistent claim state for {}: {other:?}", user.email),
            }
        }
        for credit in tables.credits.values() {
            let count = holders.get(&credit.id).copied().unwrap_or(0);
            assert_eq!(count, usize::from(credit.is_used), "credit {}", credit.code);
        }
    }

    fn oldest_unused(tables: &Tables, pool: CreditPool) -> Option<Uuid> {
        tables
            .credits
            .values()
            .filter(|c| !c.is_used && c.pool() == pool)
            .min_by(|a, b| (a.created_at, &a.code).cmp(&(b.created_at, &b.code)))
            .map(|c| c.id)
    }
}

#[async_trait]
impl CreditRepo for InMemoryStore {
    async fn create(&self, credit: NewCredit) -> AppResult<Credit> {
        let mut tables = self.tables.lock().unwrap();
        if tables.credits.values().any(|c| c.code == credit.code) {
            return Err(conflict());
        }
        let credit = Credit {
            id: Uuid::new_v4(),
            code: credit.code,
            link: credit.link,
            is_used: false,
            is_test: credit.is_test,
            created_at: now(),
            assigned_at: None,
        };
        tables.credits.insert(credit.id, credit.clone());
        Ok(credit)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Credit>> {
        Ok(self.credit(id))
    }

    async fn list_all(&self) -> AppResult<Vec<Credit>> {
        let mut credits: Vec<Credit> =
            self.tables.lock().unwrap().credits.values().cloned().collect();
        credits.sort_by(|a, b| (a.created_at, &a.code).cmp(&(b.created_at, &b.code)));
        Ok(credits)
    }

    async fn delete_unused(&self, id: Uuid) -> AppResult<DeleteOutcome<Credit>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.credits.get(&id).cloned() {
            None => DeleteOutcome::NotFound,
            Some(credit) if credit.is_used => DeleteOutcome::Refused(credit),
            Some(credit) => {
                tables.credits.remove(&id);
                DeleteOutcome::Deleted(credit)
            }
        })
    }

    async fn counts(&self) -> AppResult<CreditCounts> {
        let tables = self.tables.lock().unwrap();
        let mut counts = CreditCounts::default();
        for credit in tables.credits.values() {
            counts.total += 1;
            if credit.is_test {
                counts.test += 1;
            }
            if credit.is_used {
                counts.used += 1;
            } else if !credit.is_test {
                counts.available_real += 1;
            }
        }
        Ok(counts)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.values().any(|u| u.credit_id.is_some()) {
            return Err(AppError::Conflict("Credits are still referenced".into()));
        }
        let removed = tables.credits.len() as u64;
        tables.credits.clear();
        Ok(removed)
    }
}

#[async_trait]
impl EligibleUserRepo for InMemoryStore {
    async fn create(&self, user: NewEligibleUser) -> AppResult<EligibleUser> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(conflict());
        }
        let user = EligibleUser {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            company: user.company,
            role: user.role,
            approval_status: user.approval_status,
            has_claimed: false,
            claimed_at: None,
            credit_id: None,
            created_at: now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<EligibleUser>> {
        Ok(self.user(id))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<EligibleUser>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_with_credits(&self) -> AppResult<Vec<EligibleUserWithCredit>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<EligibleUserWithCredit> = tables
            .users
            .values()
            .map(|user| EligibleUserWithCredit {
                credit: user.credit_id.and_then(|id| tables.credits.get(&id).cloned()),
                user: user.clone(),
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.user.created_at, &a.user.email).cmp(&(b.user.created_at, &b.user.email))
        });
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApprovalStatus,
    ) -> AppResult<Option<EligibleUser>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.users.get_mut(&id).map(|user| {
            user.approval_status = status;
            user.clone()
        }))
    }

    async fn delete_unclaimed(&self, id: Uuid) -> AppResult<DeleteOutcome<EligibleUser>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.users.get(&id).cloned() {
            None => DeleteOutcome::NotFound,
            Some(user) if user.has_claimed => DeleteOutcome::Refused(user),
            Some(user) => {
                tables.users.remove(&id);
                DeleteOutcome::Deleted(user)
            }
        })
    }

    async fn counts(&self) -> AppResult<UserCounts> {
        let tables = self.tables.lock().unwrap();
        let mut counts = UserCounts::default();
        for user in tables.users.values() {
            counts.total += 1;
            match user.approval_status {
                ApprovalStatus::Approved => counts.approved += 1,
                ApprovalStatus::PendingApproval => counts.pending_approval += 1,
                _ => {}
            }
            if user.has_claimed {
                counts.claimed += 1;
            }
        }
        Ok(counts)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let removed = tables.users.len() as u64;
        tables.users.clear();
        Ok(removed)
    }
}

#[async_trait]
impl AllocationStore for InMemoryStore {
    async fn claim(&self, request: ClaimRequest) -> AppResult<ClaimOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .get(&request.user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if user.has_claimed {
            let credit = user
                .credit_id
                .and_then(|id| tables.credits.get(&id).cloned())
                .ok_or_else(|| AppError::Internal("claimed user without credit".into()))?;
            return Ok(ClaimOutcome::AlreadyClaimed(Allocation { user, credit }));
        }

        let credit_id =
            Self::oldest_unused(&tables, request.pool).ok_or(AppError::PoolExhausted)?;
        let at = now();

        let credit = {
            let credit = tables
                .credits
                .get_mut(&credit_id)
                .ok_or_else(|| AppError::Internal("credit vanished".into()))?;
            credit.is_used = true;
            credit.assigned_at = Some(at);
            credit.clone()
        };
        let user = {
            let user = tables
                .users
                .get_mut(&request.user_id)
                .ok_or_else(|| AppError::Internal("user vanished".into()))?;
            user.has_claimed = true;
            user.claimed_at = Some(at);
            user.credit_id = Some(credit_id);
            if let Some(name) = request.display_name {
                user.name = name;
            }
            user.clone()
        };

        Ok(ClaimOutcome::Assigned(Allocation { user, credit }))
    }

    async fn revoke(&self, user_id: Uuid) -> AppResult<Allocation> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let Some(credit_id) = user.credit_id.filter(|_| user.has_claimed) else {
            return Err(AppError::NothingToRevoke);
        };

        let credit = {
            let credit = tables
                .credits
                .get_mut(&credit_id)
                .ok_or_else(|| AppError::Internal("claimed user without credit".into()))?;
            credit.is_used = false;
            credit.assigned_at = None;
            credit.clone()
        };
        let user = {
            let user = tables
                .users
                .get_mut(&user_id)
                .ok_or_else(|| AppError::Internal("user vanished".into()))?;
            user.has_claimed = false;
            user.claimed_at = None;
            user.credit_id = None;
            user.clone()
        };

        Ok(Allocation { user, credit })
    }
}
