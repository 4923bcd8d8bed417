use anyhow::Result;
use tracing::info;

use crate::domain::schedule;
use crate::storage::{is_unique_violation, DbConnection, MonthRepository};
use shared::{ContributionMonth, CreateMonthRequest, MonthListResponse, MonthResponse};

/// Failure modes of contribution month management
#[derive(Debug, thiserror::Error)]
pub enum MonthError {
    #[error("A contribution month for {0} already exists")]
    DuplicateMonth(String),
    #[error("Contribution month not found: {0}")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Service for managing monthly billing periods
#[derive(Clone)]
pub struct MonthService {
    months: MonthRepository,
}

impl MonthService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            months: MonthRepository::new(db),
        }
    }

    /// Open a new contribution month.
    ///
    /// The month date is normalized to the 1st. The due date defaults to the
    /// 5th of the following month and is derived exactly once, here; it is
    /// never recomputed afterwards.
    pub async fn create_month(&self, request: CreateMonthRequest) -> Result<MonthResponse, MonthError> {
        let month_date = schedule::month_start(request.month);
        let label = schedule::month_label(month_date);
        info!("Opening contribution month: {}", label);

        if self.months.get_month_by_date(month_date).await?.is_some() {
            return Err(MonthError::DuplicateMonth(label));
        }

        let month = ContributionMonth {
            id: 0,
            month: month_date,
            due_date: request.due_date.unwrap_or_else(|| schedule::default_due_date(month_date)),
            is_locked: false,
        };

        let id = self.months.store_month(&month).await.map_err(|e| {
            if is_unique_violation(&e) {
                MonthError::DuplicateMonth(schedule::month_label(month_date))
            } else {
                MonthError::Storage(e)
            }
        })?;

        let month = ContributionMonth { id, ..month };
        info!("Opened contribution month {} with due date {}", label, month.due_date);

        Ok(MonthResponse {
            month,
            success_message: format!("Contribution month {} created successfully", label),
        })
    }

    /// Get a contribution month by id
    pub async fn get_month(&self, month_id: i64) -> Result<Option<ContributionMonth>> {
        self.months.get_month(month_id).await
    }

    /// List all contribution months, most recent first
    pub async fn list_months(&self) -> Result<MonthListResponse> {
        let months = self.months.list_months().await?;
        Ok(MonthListResponse { months })
    }

    /// The candidate set for new payment entry: unlocked months only
    pub async fn open_months(&self) -> Result<MonthListResponse> {
        let months = self.months.list_open_months().await?;
        Ok(MonthListResponse { months })
    }

    /// Lock or unlock a month for new payment entry.
    ///
    /// A lock only narrows the candidate set; payments already recorded
    /// against the month are untouched.
    pub async fn set_locked(&self, month_id: i64, is_locked: bool) -> Result<MonthResponse, MonthError> {
        let month = self
            .months
            .get_month(month_id)
            .await?
            .ok_or(MonthError::NotFound(month_id))?;

        self.months.set_locked(month_id, is_locked).await?;

        let label = schedule::month_label(month.month);
        let action = if is_locked { "locked" } else { "unlocked" };
        info!("Contribution month {} {}", label, action);

        Ok(MonthResponse {
            month: ContributionMonth { is_locked, ..month },
            success_message: format!("Contribution month {} {}", label, action),
        })
    }

    /// Delete a contribution month; its payments go with it
    pub async fn delete_month(&self, month_id: i64) -> Result<(), MonthError> {
        info!("Deleting contribution month: {}", month_id);

        self.months
            .get_month(month_id)
            .await?
            .ok_or(MonthError::NotFound(month_id))?;

        self.months.delete_month(month_id).await?;
        Ok(())
    }
}
