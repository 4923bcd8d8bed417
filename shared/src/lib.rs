use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contribution amount assumed when a payment is entered without one.
pub const DEFAULT_CONTRIBUTION: f64 = 2500.0;

/// A person eligible to contribute to the group fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    /// Display name used in lists and validation messages
    pub name: String,
    pub phone: String,
    /// Date the member joined the group
    pub joined_date: NaiveDate,
    /// Inactive members are kept for history but excluded from new payment entry
    pub is_active: bool,
}

/// A monthly billing period members contribute against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionMonth {
    pub id: i64,
    /// First day of the calendar month this period covers
    pub month: NaiveDate,
    /// Deadline after which fines accrue (5th of the following month by default)
    pub due_date: NaiveDate,
    /// Locked months are excluded from new payment entry
    pub is_locked: bool,
}

/// Settlement state of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No paid date recorded yet
    Pending,
    /// Paid on or before the due date
    #[serde(rename = "On Time")]
    OnTime,
    /// Paid after the due date
    Late,
}

impl PaymentStatus {
    /// The label stored in the database and shown to users.
    pub fn as_label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::OnTime => "On Time",
            PaymentStatus::Late => "Late",
        }
    }

    /// Parse a stored label back into a status.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pending" => Some(PaymentStatus::Pending),
            "On Time" => Some(PaymentStatus::OnTime),
            "Late" => Some(PaymentStatus::Late),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// One member's payment against one contribution month.
///
/// `fine_amount` and `status` are derived from `paid_date` and the owning
/// month's due date every time the record is saved; callers never set them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub member_id: i64,
    pub month_id: i64,
    pub amount_paid: f64,
    /// Date the money was received; absent while the record is still pending
    pub paid_date: Option<NaiveDate>,
    /// Derived late fine, 0 when paid on time
    pub fine_amount: f64,
    /// Derived settlement state
    pub status: PaymentStatus,
    /// Creation timestamp (RFC 3339), immutable once set
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub phone: String,
    /// Defaults to today when not provided
    pub joined_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub member: Member,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMonthRequest {
    /// Any date within the intended calendar month; normalized to the 1st
    pub month: NaiveDate,
    /// Overrides the derived due date when provided
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMonthLockedRequest {
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthResponse {
    pub month: ContributionMonth,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthListResponse {
    pub months: Vec<ContributionMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub member_id: i64,
    pub month_id: i64,
    /// Defaults to DEFAULT_CONTRIBUTION when not provided
    pub amount_paid: Option<f64>,
    /// Absent while the payment is still pending
    pub paid_date: Option<NaiveDate>,
}

/// Fields an edit may change. The member or month of an existing record can
/// be corrected, which re-runs the duplicate check against the new pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePaymentRequest {
    pub member_id: Option<i64>,
    pub month_id: Option<i64>,
    pub amount_paid: Option<f64>,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in [PaymentStatus::Pending, PaymentStatus::OnTime, PaymentStatus::Late] {
            assert_eq!(PaymentStatus::from_label(status.as_label()), Some(status));
        }
        assert_eq!(PaymentStatus::from_label("Overdue"), None);
    }

    #[test]
    fn status_serializes_with_spaced_label() {
        let json = serde_json::to_string(&PaymentStatus::OnTime).expect("Failed to serialize status");
        assert_eq!(json, "\"On Time\"");

        let parsed: PaymentStatus = serde_json::from_str("\"On Time\"").expect("Failed to parse status");
        assert_eq!(parsed, PaymentStatus::OnTime);
    }
}
