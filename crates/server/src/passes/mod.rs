//! Pass Request Module
//!
//! Submit, list and delete travel pass requests. Every operation takes the
//! session principal explicitly and only touches rows owned by it.

pub mod notifier;

use crate::accounts::validate::optional_text;
use crate::core::ctx::Ctx;
use crate::core::db::Database;
use crate::core::error::{Error, Result};
use crate::models::{
    NewPassRequest, PassRequest, PassSummary, SubmitReceipt, CREATED_AT_FORMAT, DATE_FORMAT,
    STATUS_PROCESSING,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use notifier::{Notifier, SMS_NOTICE};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

/// Days from creation until a pass expires
pub const VALIDITY_DAYS: i64 = 365;
/// Days from creation until a pass is expected at the station
pub const DELIVERY_DAYS: i64 = 3;

/// Dates fixed at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSchedule {
    pub created_at: NaiveDateTime,
    pub expiry_date: NaiveDate,
    pub estimated_arrival: NaiveDate,
}

impl PassSchedule {
    pub fn starting(created_at: NaiveDateTime) -> Self {
        Self {
            created_at,
            expiry_date: (created_at + Duration::days(VALIDITY_DAYS)).date(),
            estimated_arrival: (created_at + Duration::days(DELIVERY_DAYS)).date(),
        }
    }

    /// Schedule for a pass created now, truncated to whole seconds
    pub fn now() -> Self {
        let now = Utc::now().naive_utc();
        Self::starting(now.with_nanosecond(0).unwrap_or(now))
    }
}

#[derive(sqlx::FromRow)]
struct PassRow {
    id: i64,
    account_id: i64,
    from_place: String,
    to_place: String,
    via1: Option<String>,
    via2: Option<String>,
    status: String,
    created_at: String,
    expiry_date: Option<String>,
    estimated_arrival: Option<String>,
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| {
            NaiveDate::parse_from_str(&v, DATE_FORMAT)
                .map_err(|e| Error::Internal(format!("Invalid date {:?}: {}", v, e)))
        })
        .transpose()
}

impl TryFrom<PassRow> for PassRequest {
    type Error = Error;

    fn try_from(row: PassRow) -> Result<Self> {
        let created_at = NaiveDateTime::parse_from_str(&row.created_at, CREATED_AT_FORMAT)
            .map_err(|e| Error::Internal(format!("Invalid timestamp {:?}: {}", row.created_at, e)))?;

        Ok(PassRequest {
            id: row.id,
            account_id: row.account_id,
            from_place: row.from_place,
            to_place: row.to_place,
            via1: row.via1,
            via2: row.via2,
            status: row.status,
            created_at,
            expiry_date: parse_date(row.expiry_date)?,
            estimated_arrival: parse_date(row.estimated_arrival)?,
        })
    }
}

pub struct PassManager {
    db: Database,
    notifier: Arc<dyn Notifier>,
}

impl PassManager {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Store a new pass request for the session's account
    pub async fn submit(
        &self,
        ctx: &Ctx,
        account_id: i64,
        input: NewPassRequest,
    ) -> Result<SubmitReceipt> {
        ctx.require_account(account_id)?;

        let from_place = input.from_place.trim().to_string();
        let to_place = input.to_place.trim().to_string();
        if from_place.is_empty() || to_place.is_empty() {
            return Err(Error::validation("From and To places are required."));
        }

        let schedule = PassSchedule::now();
        let mut pass = PassRequest {
            id: 0,
            account_id,
            from_place,
            to_place,
            via1: optional_text(input.via1),
            via2: optional_text(input.via2),
            status: STATUS_PROCESSING.to_string(),
            created_at: schedule.created_at,
            expiry_date: Some(schedule.expiry_date),
            estimated_arrival: Some(schedule.estimated_arrival),
        };

        let row = pass.clone();
        pass.id = self
            .db
            .scoped(|pool| async move { insert_pass(&pool, &row).await })
            .await?;

        info!(
            "[Passes] Pass {} submitted by account {} ({} -> {})",
            pass.id, account_id, pass.from_place, pass.to_place
        );

        // Notification is best effort and never undoes the insert
        if let Err(e) = self.notifier.pass_submitted(&pass).await {
            warn!("[Passes] Notifier failed for pass {}: {}", pass.id, e);
        }

        Ok(SubmitReceipt {
            id: pass.id,
            notices: vec![
                format!("Pass application submitted! Your Pass ID: {}", pass.id),
                SMS_NOTICE.to_string(),
            ],
            pass,
        })
    }

    /// All passes owned by `account_id`, most recent first
    pub async fn list_by_owner(&self, ctx: &Ctx, account_id: i64) -> Result<Vec<PassRequest>> {
        ctx.require_account(account_id)?;

        let rows = self
            .db
            .scoped(|pool| async move { select_by_owner(&pool, account_id).await })
            .await?;

        rows.into_iter().map(PassRequest::try_from).collect()
    }

    /// Short history view, same order as [`PassManager::list_by_owner`]
    pub async fn history(&self, ctx: &Ctx, account_id: i64) -> Result<Vec<PassSummary>> {
        Ok(self
            .list_by_owner(ctx, account_id)
            .await?
            .into_iter()
            .map(PassSummary::from)
            .collect())
    }

    /// Delete a pass owned by `account_id`
    pub async fn delete(&self, ctx: &Ctx, account_id: i64, pass_id: i64) -> Result<()> {
        ctx.require_account(account_id)?;

        self.db
            .scoped(|pool| async move { delete_owned(&pool, account_id, pass_id).await })
            .await
            .inspect_err(|e| {
                if matches!(e, Error::Authorization) {
                    warn!(
                        "[Passes] Account {} tried to delete pass {} it does not own",
                        account_id, pass_id
                    );
                }
            })?;

        info!("[Passes] Pass {} deleted by account {}", pass_id, account_id);
        Ok(())
    }
}

async fn insert_pass(pool: &SqlitePool, pass: &PassRequest) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO pass_requests
            (account_id, from_place, to_place, via1, via2, status, created_at, expiry_date, estimated_arrival)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(pass.account_id)
    .bind(&pass.from_place)
    .bind(&pass.to_place)
    .bind(&pass.via1)
    .bind(&pass.via2)
    .bind(&pass.status)
    .bind(pass.created_at.format(CREATED_AT_FORMAT).to_string())
    .bind(pass.expiry_date.map(|d| d.format(DATE_FORMAT).to_string()))
    .bind(pass.estimated_arrival.map(|d| d.format(DATE_FORMAT).to_string()))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn select_by_owner(pool: &SqlitePool, account_id: i64) -> Result<Vec<PassRow>> {
    Ok(sqlx::query_as(
        r#"
        SELECT id, account_id, from_place, to_place, via1, via2, status,
               created_at, expiry_date, estimated_arrival
        FROM pass_requests
        WHERE account_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?)
}

/// Delete only if owned. The ownership predicate and the delete are one
/// statement, so it takes the write lock directly and never upgrades from a
/// read lock held by a concurrent delete.
async fn delete_owned(pool: &SqlitePool, account_id: i64, pass_id: i64) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM pass_requests WHERE id = ? AND account_id = ?")
        .bind(pass_id)
        .bind(account_id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 1 {
        return Ok(());
    }

    let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM pass_requests WHERE id = ?")
        .bind(pass_id)
        .fetch_optional(pool)
        .await?;

    match exists {
        Some(_) => Err(Error::Authorization),
        None => Err(Error::NotFound { id: pass_id }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_dates() {
        let created = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let schedule = PassSchedule::starting(created);

        assert_eq!(schedule.expiry_date, NaiveDate::from_ymd_opt(2027, 10, 16).unwrap());
        assert_eq!(
            schedule.estimated_arrival,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
    }

    #[test]
    fn test_schedule_across_leap_day() {
        let created = NaiveDate::from_ymd_opt(2028, 2, 28)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let schedule = PassSchedule::starting(created);

        // 2028 is a leap year, so 365 days lands one calendar day early
        assert_eq!(schedule.expiry_date, NaiveDate::from_ymd_opt(2029, 2, 27).unwrap());
        assert_eq!(schedule.estimated_arrival, NaiveDate::from_ymd_opt(2028, 3, 2).unwrap());
    }

    #[test]
    fn test_schedule_now_has_whole_seconds() {
        assert_eq!(PassSchedule::now().created_at.nanosecond(), 0);
    }

    #[test]
    fn test_row_with_blank_dates() {
        let row = PassRow {
            id: 1,
            account_id: 2,
            from_place: "CityA".into(),
            to_place: "CityB".into(),
            via1: None,
            via2: None,
            status: "Approved by hand".into(),
            created_at: "2026-10-16 10:00:00".into(),
            expiry_date: Some(String::new()),
            estimated_arrival: None,
        };

        let pass = PassRequest::try_from(row).unwrap();
        assert_eq!(pass.status, "Approved by hand");
        assert_eq!(pass.expiry_date, None);
        assert_eq!(pass.estimated_arrival, None);
    }
}
