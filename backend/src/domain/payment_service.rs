//! Payment entry and the fine/status derivation that runs on every save.
//!
//! Validation here is the advisory half of a two-phase contract: it gives
//! the caller early, readable feedback against the current storage
//! snapshot, while the UNIQUE (member_id, month_id) constraint in the
//! schema remains the final authority. A duplicate that slips through the
//! window between check and write comes back as [`PaymentError::Conflict`].

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use crate::domain::{fines, schedule};
use crate::storage::{
    is_unique_violation, DbConnection, MemberRepository, MonthRepository, PaymentRepository,
};
use shared::{
    ContributionMonth, CreatePaymentRequest, Member, Payment, PaymentListResponse,
    PaymentResponse, PaymentStatus, UpdatePaymentRequest, DEFAULT_CONTRIBUTION,
};

/// A single user-correctable problem with a candidate payment entry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentValidationError {
    #[error("{member} already has a payment recorded for {month}")]
    DuplicatePayment { member: String, month: String },
    #[error("Payment date cannot be before the contribution month ({month})")]
    PaidBeforeMonth { month: String },
    #[error("Amount paid cannot be negative")]
    NegativeAmount,
}

fn join_messages(errors: &[PaymentValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure modes of payment entry
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Every validation failure found for the candidate entry, together
    #[error("{}", join_messages(.0))]
    Validation(Vec<PaymentValidationError>),
    #[error("Member not found: {0}")]
    MemberNotFound(i64),
    #[error("Contribution month not found: {0}")]
    MonthNotFound(i64),
    #[error("Payment not found: {0}")]
    PaymentNotFound(i64),
    /// The database rejected the write on uniqueness; the race the advisory
    /// duplicate check cannot close
    #[error("Could not save payment")]
    Conflict(#[source] anyhow::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Service for recording and correcting member payments
#[derive(Clone)]
pub struct PaymentService {
    payments: PaymentRepository,
    members: MemberRepository,
    months: MonthRepository,
}

impl PaymentService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            payments: PaymentRepository::new(db.clone()),
            members: MemberRepository::new(db.clone()),
            months: MonthRepository::new(db),
        }
    }

    /// Run the entry-time checks for a candidate payment, accumulating
    /// every failure rather than stopping at the first.
    async fn validate_entry(
        &self,
        member: &Member,
        month: &ContributionMonth,
        amount_paid: f64,
        paid_date: Option<NaiveDate>,
        editing_id: Option<i64>,
    ) -> Result<Vec<PaymentValidationError>> {
        let mut errors = Vec::new();

        if let Some(existing) = self.payments.find_by_member_and_month(member.id, month.id).await? {
            if editing_id != Some(existing.id) {
                errors.push(PaymentValidationError::DuplicatePayment {
                    member: member.name.clone(),
                    month: schedule::month_label(month.month),
                });
            }
        }

        if let Some(paid) = paid_date {
            if paid < month.month {
                errors.push(PaymentValidationError::PaidBeforeMonth {
                    month: schedule::month_label(month.month),
                });
            }
        }

        if amount_paid < 0.0 {
            errors.push(PaymentValidationError::NegativeAmount);
        }

        Ok(errors)
    }

    /// Record a new payment.
    ///
    /// Fine and status are derived from the paid date and the owning
    /// month's due date; a payment entered without a paid date stays
    /// Pending with no fine.
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentResponse, PaymentError> {
        info!(
            "Recording payment: member_id={}, month_id={}",
            request.member_id, request.month_id
        );

        let member = self
            .members
            .get_member(request.member_id)
            .await?
            .ok_or(PaymentError::MemberNotFound(request.member_id))?;
        let month = self
            .months
            .get_month(request.month_id)
            .await?
            .ok_or(PaymentError::MonthNotFound(request.month_id))?;

        let amount_paid = request.amount_paid.unwrap_or(DEFAULT_CONTRIBUTION);

        let errors = self
            .validate_entry(&member, &month, amount_paid, request.paid_date, None)
            .await?;
        if !errors.is_empty() {
            return Err(PaymentError::Validation(errors));
        }

        let (fine_amount, status) = match request.paid_date {
            Some(paid) => fines::derive(paid, month.due_date),
            None => (0.0, PaymentStatus::Pending),
        };

        let payment = Payment {
            id: 0,
            member_id: member.id,
            month_id: month.id,
            amount_paid,
            paid_date: request.paid_date,
            fine_amount,
            status,
            recorded_at: Utc::now().to_rfc3339(),
        };

        let id = self.payments.store_payment(&payment).await.map_err(|e| {
            if is_unique_violation(&e) {
                error!(
                    "Duplicate payment slipped past the pre-check: member_id={}, month_id={}",
                    member.id, month.id
                );
                PaymentError::Conflict(e)
            } else {
                PaymentError::Storage(e)
            }
        })?;

        let payment = Payment { id, ..payment };
        info!(
            "Recorded payment {} for {} ({}): fine={}, status={}",
            payment.id,
            member.name,
            schedule::month_label(month.month),
            payment.fine_amount,
            payment.status
        );

        Ok(PaymentResponse {
            payment,
            success_message: "Payment recorded successfully".to_string(),
        })
    }

    /// Correct an existing payment.
    ///
    /// Runs the same validation as entry, with the record itself excluded
    /// from the duplicate check. Whenever the effective paid date is
    /// present, fine and status are recomputed against the owning month's
    /// current due date, overwriting the stored values. recorded_at is
    /// carried through untouched.
    pub async fn update_payment(
        &self,
        payment_id: i64,
        request: UpdatePaymentRequest,
    ) -> Result<PaymentResponse, PaymentError> {
        info!("Updating payment: {}", payment_id);

        let existing = self
            .payments
            .get_payment(payment_id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;

        let member_id = request.member_id.unwrap_or(existing.member_id);
        let month_id = request.month_id.unwrap_or(existing.month_id);

        let member = self
            .members
            .get_member(member_id)
            .await?
            .ok_or(PaymentError::MemberNotFound(member_id))?;
        let month = self
            .months
            .get_month(month_id)
            .await?
            .ok_or(PaymentError::MonthNotFound(month_id))?;

        let amount_paid = request.amount_paid.unwrap_or(existing.amount_paid);
        let paid_date = request.paid_date.or(existing.paid_date);

        let errors = self
            .validate_entry(&member, &month, amount_paid, paid_date, Some(existing.id))
            .await?;
        if !errors.is_empty() {
            return Err(PaymentError::Validation(errors));
        }

        let (fine_amount, status) = match paid_date {
            Some(paid) => fines::derive(paid, month.due_date),
            None => (existing.fine_amount, existing.status),
        };

        let payment = Payment {
            id: existing.id,
            member_id,
            month_id,
            amount_paid,
            paid_date,
            fine_amount,
            status,
            recorded_at: existing.recorded_at,
        };

        self.payments.update_payment(&payment).await.map_err(|e| {
            if is_unique_violation(&e) {
                PaymentError::Conflict(e)
            } else {
                PaymentError::Storage(e)
            }
        })?;

        info!(
            "Updated payment {}: fine={}, status={}",
            payment.id, payment.fine_amount, payment.status
        );

        Ok(PaymentResponse {
            payment,
            success_message: "Payment updated successfully".to_string(),
        })
    }

    /// Get a payment by id
    pub async fn get_payment(&self, payment_id: i64) -> Result<Option<Payment>> {
        self.payments.get_payment(payment_id).await
    }

    /// List all payments, most recent month first
    pub async fn list_payments(&self) -> Result<PaymentListResponse> {
        let payments = self.payments.list_payments().await?;
        Ok(PaymentListResponse { payments })
    }

    /// List the payments recorded against one contribution month
    pub async fn payments_for_month(&self, month_id: i64) -> Result<PaymentListResponse> {
        let payments = self.payments.list_for_month(month_id).await?;
        Ok(PaymentListResponse { payments })
    }

    /// List one member's payment history
    pub async fn payments_for_member(&self, member_id: i64) -> Result<PaymentListResponse> {
        let payments = self.payments.list_for_member(member_id).await?;
        Ok(PaymentListResponse { payments })
    }

    /// Delete a payment record
    pub async fn delete_payment(&self, payment_id: i64) -> Result<(), PaymentError> {
        info!("Deleting payment: {}", payment_id);

        self.payments
            .get_payment(payment_id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(payment_id))?;

        self.payments.delete_payment(payment_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberService, MonthService};
    use shared::{CreateMemberRequest, CreateMonthRequest};

    struct TestContext {
        payments: PaymentService,
        members: MemberService,
        months: MonthService,
    }

    async fn setup_test() -> TestContext {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        TestContext {
            payments: PaymentService::new(db.clone()),
            members: MemberService::new(db.clone()),
            months: MonthService::new(db),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    impl TestContext {
        async fn member(&self, name: &str) -> Member {
            self.members
                .create_member(CreateMemberRequest {
                    name: name.to_string(),
                    phone: "0712345678".to_string(),
                    joined_date: None,
                })
                .await
                .expect("Failed to create member")
                .member
        }

        async fn month(&self, month: NaiveDate) -> ContributionMonth {
            self.months
                .create_month(CreateMonthRequest { month, due_date: None })
                .await
                .expect("Failed to create month")
                .month
        }

        fn payment_request(
            &self,
            member: &Member,
            month: &ContributionMonth,
            paid_date: Option<NaiveDate>,
        ) -> CreatePaymentRequest {
            CreatePaymentRequest {
                member_id: member.id,
                month_id: month.id,
                amount_paid: None,
                paid_date,
            }
        }
    }

    #[tokio::test]
    async fn test_on_time_payment_has_no_fine() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let response = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 5))))
            .await
            .expect("Failed to record payment");

        assert_eq!(response.payment.fine_amount, 0.0);
        assert_eq!(response.payment.status, PaymentStatus::OnTime);
        assert_eq!(response.payment.amount_paid, DEFAULT_CONTRIBUTION);
    }

    #[tokio::test]
    async fn test_late_payment_gets_fine_and_status() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        // due 2024-07-05, paid 3 days late
        let response = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 8))))
            .await
            .expect("Failed to record payment");

        assert_eq!(response.payment.fine_amount, 300.0);
        assert_eq!(response.payment.status, PaymentStatus::Late);
    }

    #[tokio::test]
    async fn test_fine_capped_at_stop_date() {
        let ctx = setup_test().await;
        let alice = ctx.member("Alice").await;
        let bob = ctx.member("Bob").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        // stop date is 2024-08-05; both payments land on the cap
        let at_stop = ctx
            .payments
            .create_payment(ctx.payment_request(&alice, &month, Some(date(2024, 8, 5))))
            .await
            .expect("Failed to record payment");
        let far_past_stop = ctx
            .payments
            .create_payment(ctx.payment_request(&bob, &month, Some(date(2024, 11, 13))))
            .await
            .expect("Failed to record payment");

        assert_eq!(at_stop.payment.fine_amount, 1150.0);
        assert_eq!(far_past_stop.payment.fine_amount, at_stop.payment.fine_amount);
    }

    #[tokio::test]
    async fn test_pending_without_paid_date() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let response = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, None))
            .await
            .expect("Failed to record payment");

        assert_eq!(response.payment.status, PaymentStatus::Pending);
        assert_eq!(response.payment.fine_amount, 0.0);
        assert!(response.payment.paid_date.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_payment_rejected_with_member_and_month() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        ctx.payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 1))))
            .await
            .expect("Failed to record payment");

        let err = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 2))))
            .await
            .expect_err("Duplicate payment should be rejected");

        match &err {
            PaymentError::Validation(errors) => {
                assert_eq!(
                    errors,
                    &vec![PaymentValidationError::DuplicatePayment {
                        member: "Alice".to_string(),
                        month: "June 2024".to_string(),
                    }]
                );
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Alice already has a payment recorded for June 2024");
    }

    #[tokio::test]
    async fn test_payment_before_contribution_month_rejected() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let err = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 5, 28))))
            .await
            .expect_err("Backdated payment should be rejected");

        assert_eq!(
            err.to_string(),
            "Payment date cannot be before the contribution month (June 2024)"
        );
    }

    #[tokio::test]
    async fn test_validation_accumulates_all_failures() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        ctx.payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 1))))
            .await
            .expect("Failed to record payment");

        // duplicate pair, backdated, and negative amount all at once
        let err = ctx
            .payments
            .create_payment(CreatePaymentRequest {
                member_id: member.id,
                month_id: month.id,
                amount_paid: Some(-100.0),
                paid_date: Some(date(2024, 5, 1)),
            })
            .await
            .expect_err("Invalid entry should be rejected");

        match err {
            PaymentError::Validation(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(matches!(errors[0], PaymentValidationError::DuplicatePayment { .. }));
                assert!(matches!(errors[1], PaymentValidationError::PaidBeforeMonth { .. }));
                assert!(matches!(errors[2], PaymentValidationError::NegativeAmount));
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_member_and_month() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let err = ctx
            .payments
            .create_payment(CreatePaymentRequest {
                member_id: 999,
                month_id: month.id,
                amount_paid: None,
                paid_date: None,
            })
            .await
            .expect_err("Unknown member should fail");
        assert!(matches!(err, PaymentError::MemberNotFound(999)));

        let err = ctx
            .payments
            .create_payment(CreatePaymentRequest {
                member_id: member.id,
                month_id: 999,
                amount_paid: None,
                paid_date: None,
            })
            .await
            .expect_err("Unknown month should fail");
        assert!(matches!(err, PaymentError::MonthNotFound(999)));
    }

    #[tokio::test]
    async fn test_update_recomputes_fine_and_keeps_recorded_at() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let created = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 8))))
            .await
            .expect("Failed to record payment")
            .payment;
        assert_eq!(created.fine_amount, 300.0);

        let updated = ctx
            .payments
            .update_payment(
                created.id,
                UpdatePaymentRequest {
                    member_id: None,
                    month_id: None,
                    amount_paid: None,
                    paid_date: Some(date(2024, 7, 3)),
                },
            )
            .await
            .expect("Failed to update payment")
            .payment;

        assert_eq!(updated.fine_amount, 0.0);
        assert_eq!(updated.status, PaymentStatus::OnTime);
        assert_eq!(updated.recorded_at, created.recorded_at);

        let stored = ctx
            .payments
            .get_payment(created.id)
            .await
            .expect("Failed to fetch payment")
            .expect("Payment should exist");
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_does_not_trip_over_its_own_record() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let created = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 1))))
            .await
            .expect("Failed to record payment")
            .payment;

        // same (member, month) pair, only the amount changes
        let updated = ctx
            .payments
            .update_payment(
                created.id,
                UpdatePaymentRequest {
                    member_id: None,
                    month_id: None,
                    amount_paid: Some(3000.0),
                    paid_date: None,
                },
            )
            .await
            .expect("Editing a payment in place should not be a duplicate")
            .payment;

        assert_eq!(updated.amount_paid, 3000.0);
        assert_eq!(updated.paid_date, created.paid_date);
    }

    #[tokio::test]
    async fn test_update_onto_occupied_pair_rejected() {
        let ctx = setup_test().await;
        let alice = ctx.member("Alice").await;
        let bob = ctx.member("Bob").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        ctx.payments
            .create_payment(ctx.payment_request(&alice, &month, Some(date(2024, 7, 1))))
            .await
            .expect("Failed to record payment");
        let bobs = ctx
            .payments
            .create_payment(ctx.payment_request(&bob, &month, Some(date(2024, 7, 1))))
            .await
            .expect("Failed to record payment")
            .payment;

        let err = ctx
            .payments
            .update_payment(
                bobs.id,
                UpdatePaymentRequest {
                    member_id: Some(alice.id),
                    month_id: None,
                    amount_paid: None,
                    paid_date: None,
                },
            )
            .await
            .expect_err("Moving onto an occupied pair should be rejected");

        assert_eq!(err.to_string(), "Alice already has a payment recorded for June 2024");
    }

    #[tokio::test]
    async fn test_payments_listed_by_month_then_member() {
        let ctx = setup_test().await;
        let alice = ctx.member("Alice").await;
        let bob = ctx.member("Bob").await;
        let june = ctx.month(date(2024, 6, 1)).await;
        let july = ctx.month(date(2024, 7, 1)).await;

        ctx.payments
            .create_payment(ctx.payment_request(&bob, &june, Some(date(2024, 6, 3))))
            .await
            .unwrap();
        ctx.payments
            .create_payment(ctx.payment_request(&alice, &july, Some(date(2024, 7, 2))))
            .await
            .unwrap();
        ctx.payments
            .create_payment(ctx.payment_request(&alice, &june, Some(date(2024, 6, 4))))
            .await
            .unwrap();

        let listed = ctx.payments.list_payments().await.expect("Failed to list payments");
        let pairs: Vec<(i64, i64)> = listed
            .payments
            .iter()
            .map(|p| (p.month_id, p.member_id))
            .collect();
        assert_eq!(
            pairs,
            vec![(july.id, alice.id), (june.id, alice.id), (june.id, bob.id)]
        );

        let june_only = ctx
            .payments
            .payments_for_month(june.id)
            .await
            .expect("Failed to list month payments");
        assert_eq!(june_only.payments.len(), 2);
    }

    #[tokio::test]
    async fn test_deleting_member_removes_their_payments() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let created = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 1))))
            .await
            .unwrap()
            .payment;

        ctx.members.delete_member(member.id).await.expect("Failed to delete member");

        assert!(ctx.payments.get_payment(created.id).await.unwrap().is_none());
        assert!(ctx.payments.list_payments().await.unwrap().payments.is_empty());
    }

    #[tokio::test]
    async fn test_delete_payment() {
        let ctx = setup_test().await;
        let member = ctx.member("Alice").await;
        let month = ctx.month(date(2024, 6, 1)).await;

        let created = ctx
            .payments
            .create_payment(ctx.payment_request(&member, &month, Some(date(2024, 7, 1))))
            .await
            .unwrap()
            .payment;

        ctx.payments.delete_payment(created.id).await.expect("Failed to delete payment");
        assert!(ctx.payments.get_payment(created.id).await.unwrap().is_none());

        let err = ctx
            .payments
            .delete_payment(created.id)
            .await
            .expect_err("Deleting twice should fail");
        assert!(matches!(err, PaymentError::PaymentNotFound(_)));
    }
}
