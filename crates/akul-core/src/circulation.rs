//! # Circulation Workflow Rules
//!
//! Pure planning for the two loan transitions. The database layer loads the
//! rows, asks this module what should happen, then applies the plan inside
//! one transaction.
//!
//! ## Issue / Return Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ISSUE (member, book, issue_date)                                       │
//! │     │                                                                   │
//! │     ├── loan limit enforced and reached?  → LoanLimitReached           │
//! │     ├── available_quantity == 0?          → NoCopiesAvailable          │
//! │     └── OK → IssuePlan { due_date = issue_date + loan_duration }       │
//! │                                                                         │
//! │  RETURN (circulation, today)                                            │
//! │     │                                                                   │
//! │     ├── status != issued?                 → AlreadyReturned            │
//! │     ├── today <= due_date                 → ReturnPlan { no charge }   │
//! │     └── today >  due_date                 → ReturnPlan {               │
//! │             days = today - due_date,                                    │
//! │             fine = days × penalty_per_day (capped if enabled),          │
//! │             unpaid penalty "Overdue: <title>" }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::penalty::NewPenalty;
use crate::settings::{EnforcementPolicy, LibrarySettings};
use crate::types::{Book, Circulation, CirculationStatus, Member};
use crate::DATE_FORMAT;

// =============================================================================
// Date & Fine Arithmetic
// =============================================================================

/// Parses an operator-supplied `YYYY-MM-DD` date.
///
/// ## Example
/// ```rust
/// use akul_core::circulation::parse_date;
///
/// assert!(parse_date("2024-01-01").is_ok());
/// assert!(parse_date("01/01/2024").is_err());
/// ```
pub fn parse_date(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| CoreError::InvalidDate {
        value: value.to_string(),
    })
}

/// Due date for a loan issued on `issue_date`.
///
/// ## Errors
/// * `DueDateOutOfRange` - the sum leaves chrono's date range
pub fn due_date(issue_date: NaiveDate, loan_duration_days: i64) -> CoreResult<NaiveDate> {
    Duration::try_days(loan_duration_days)
        .and_then(|span| issue_date.checked_add_signed(span))
        .ok_or(CoreError::DueDateOutOfRange {
            issue_date,
            days: loan_duration_days,
        })
}

/// Whole calendar days between the due date and the return date.
///
/// Zero when returned on or before the due date.
#[inline]
pub fn overdue_days(due_date: NaiveDate, return_date: NaiveDate) -> i64 {
    (return_date - due_date).num_days().max(0)
}

/// Uncapped fine for `days` late at `rate` per day.
///
/// ## Errors
/// * `FineOverflow` - the product does not fit in cents
#[inline]
pub fn compute_fine(days: i64, rate: Money) -> CoreResult<Money> {
    rate.checked_multiply_days(days).ok_or(CoreError::FineOverflow { days, rate })
}

/// Fine after applying the enforcement policy.
///
/// Overflow is an error even when capping is on.
pub fn assess_fine(
    days: i64,
    settings: &LibrarySettings,
    policy: &EnforcementPolicy,
) -> CoreResult<Money> {
    let fine = compute_fine(days, settings.penalty_per_day())?;
    if policy.cap_fines {
        Ok(fine.min(settings.max_penalty()))
    } else {
        Ok(fine)
    }
}

// =============================================================================
// Issue
// =============================================================================

/// What an accepted issue request will write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IssuePlan {
    pub member_id: i64,
    pub book_id: i64,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
}

/// Decides whether `book` can be lent to `member`.
///
/// ## Arguments
/// * `active_loans` - loans the member currently holds (status issued)
///
/// ## Errors
/// * `LoanLimitReached` - only when the policy enforces `max_books`
/// * `NoCopiesAvailable` - no copy on the shelf
/// * `DueDateOutOfRange` - loan duration too large for the calendar
pub fn plan_issue(
    member: &Member,
    book: &Book,
    active_loans: i64,
    settings: &LibrarySettings,
    policy: &EnforcementPolicy,
    issue_date: NaiveDate,
) -> CoreResult<IssuePlan> {
    if policy.enforce_loan_limit && active_loans >= settings.max_books {
        return Err(CoreError::LoanLimitReached {
            member_id: member.id,
            active: active_loans,
            max: settings.max_books,
        });
    }

    if !book.can_issue() {
        return Err(CoreError::NoCopiesAvailable {
            book_id: book.id,
            title: book.title.clone(),
        });
    }

    Ok(IssuePlan {
        member_id: member.id,
        book_id: book.id,
        issue_date,
        due_date: due_date(issue_date, settings.loan_duration_days)?,
    })
}

// =============================================================================
// Return
// =============================================================================

/// The charge raised by a late return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OverdueCharge {
    pub days: i64,
    pub fine: Money,
    pub penalty: NewPenalty,
}

/// What an accepted return will write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnPlan {
    pub circulation_id: i64,
    #[ts(as = "String")]
    pub return_date: NaiveDate,
    pub overdue: Option<OverdueCharge>,
}

impl ReturnPlan {
    /// Fine to store on the circulation row (zero when on time).
    pub fn fine(&self) -> Money {
        self.overdue
            .as_ref()
            .map(|charge| charge.fine)
            .unwrap_or_default()
    }

    pub fn is_late(&self) -> bool {
        self.overdue.is_some()
    }
}

/// Decides what returning `circulation` on `today` entails.
///
/// ## Errors
/// * `AlreadyReturned` - the loan is not in status issued
/// * `FineOverflow` - the configured rate is too large for the delay
///
/// ## Example
/// ```rust
/// use akul_core::circulation::plan_return;
/// use akul_core::{Circulation, CirculationStatus, EnforcementPolicy, LibrarySettings};
/// use chrono::NaiveDate;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let loan = Circulation {
///     id: 9, member_id: 2, book_id: 4,
///     issue_date: d(1), due_date: d(15), return_date: None,
///     status: CirculationStatus::Issued, fine_cents: 0, remarks: None,
/// };
/// let plan = plan_return(&loan, "Dune", &LibrarySettings::default(),
///                        &EnforcementPolicy::default(), d(20)).unwrap();
/// assert_eq!(plan.fine().cents(), 5000);
/// ```
pub fn plan_return(
    circulation: &Circulation,
    book_title: &str,
    settings: &LibrarySettings,
    policy: &EnforcementPolicy,
    today: NaiveDate,
) -> CoreResult<ReturnPlan> {
    if circulation.status != CirculationStatus::Issued {
        return Err(CoreError::AlreadyReturned {
            circulation_id: circulation.id,
        });
    }

    let overdue = if today > circulation.due_date {
        let days = overdue_days(circulation.due_date, today);
        let fine = assess_fine(days, settings, policy)?;
        Some(OverdueCharge {
            days,
            fine,
            penalty: NewPenalty::overdue(circulation, book_title, days, fine),
        })
    } else {
        None
    };

    Ok(ReturnPlan {
        circulation_id: circulation.id,
        return_date: today,
        overdue,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PenaltyStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn member() -> Member {
        Member {
            id: 2,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "555".to_string(),
            address: "1 Elm".to_string(),
            joined_date: d(2023, 6, 1),
        }
    }

    fn book(available: i64) -> Book {
        Book {
            id: 4,
            title: "Dune".to_string(),
            author_id: 1,
            publisher_id: 1,
            isbn: "9780441013593".to_string(),
            quantity: 3,
            available_quantity: available,
            thumbnail_link: None,
        }
    }

    fn loan(status: CirculationStatus) -> Circulation {
        Circulation {
            id: 9,
            member_id: 2,
            book_id: 4,
            issue_date: d(2024, 1, 1),
            due_date: d(2024, 1, 15),
            return_date: None,
            status,
            fine_cents: 0,
            remarks: None,
        }
    }

    #[test]
    fn test_due_date_adds_loan_duration() {
        assert_eq!(due_date(d(2024, 1, 1), 14).unwrap(), d(2024, 1, 15));
        // Month and leap-year rollover
        assert_eq!(due_date(d(2024, 2, 20), 14).unwrap(), d(2024, 3, 5));
        assert_eq!(due_date(d(2023, 12, 25), 14).unwrap(), d(2024, 1, 8));
    }

    #[test]
    fn test_due_date_past_calendar_is_an_error() {
        assert!(matches!(
            due_date(d(2024, 1, 1), 1_000_000_000),
            Err(CoreError::DueDateOutOfRange {
                days: 1_000_000_000,
                ..
            })
        ));
        assert!(due_date(d(2024, 1, 1), i64::MAX).is_err());

        let settings = LibrarySettings {
            loan_duration_days: 1_000_000_000,
            ..Default::default()
        };
        let err = plan_issue(
            &member(),
            &book(1),
            0,
            &settings,
            &EnforcementPolicy::default(),
            d(2024, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DueDateOutOfRange { .. }));
    }

    #[test]
    fn test_huge_rate_fails_instead_of_wrapping() {
        let settings = LibrarySettings {
            penalty_per_day_cents: 9_223_372_036_854_775_800,
            ..Default::default()
        };

        for policy in [EnforcementPolicy::default(), EnforcementPolicy::strict()] {
            let err = plan_return(
                &loan(CirculationStatus::Issued),
                "Dune",
                &settings,
                &policy,
                d(2024, 1, 20),
            )
            .unwrap_err();
            assert!(matches!(err, CoreError::FineOverflow { days: 5, .. }));
        }
    }

    #[test]
    fn test_overdue_days_never_negative() {
        assert_eq!(overdue_days(d(2024, 1, 15), d(2024, 1, 20)), 5);
        assert_eq!(overdue_days(d(2024, 1, 15), d(2024, 1, 15)), 0);
        assert_eq!(overdue_days(d(2024, 1, 15), d(2024, 1, 3)), 0);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-01").unwrap(), d(2024, 1, 1));
        assert_eq!(parse_date(" 2024-02-29 ").unwrap(), d(2024, 2, 29));
        assert!(matches!(
            parse_date("2023-02-29"),
            Err(CoreError::InvalidDate { .. })
        ));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_plan_issue_computes_due_date() {
        let settings = LibrarySettings::default();
        let plan = plan_issue(
            &member(),
            &book(1),
            0,
            &settings,
            &EnforcementPolicy::default(),
            d(2024, 1, 1),
        )
        .unwrap();

        assert_eq!(plan.member_id, 2);
        assert_eq!(plan.book_id, 4);
        assert_eq!(plan.due_date, d(2024, 1, 15));
    }

    #[test]
    fn test_plan_issue_refuses_empty_shelf() {
        let err = plan_issue(
            &member(),
            &book(0),
            0,
            &LibrarySettings::default(),
            &EnforcementPolicy::default(),
            d(2024, 1, 1),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::NoCopiesAvailable { book_id: 4, .. }));
    }

    #[test]
    fn test_loan_limit_only_when_enforced() {
        let settings = LibrarySettings::default();

        // Lenient policy ignores max_books
        assert!(plan_issue(
            &member(),
            &book(1),
            10,
            &settings,
            &EnforcementPolicy::default(),
            d(2024, 1, 1)
        )
        .is_ok());

        let policy = EnforcementPolicy {
            enforce_loan_limit: true,
            ..Default::default()
        };
        assert!(plan_issue(&member(), &book(1), 2, &settings, &policy, d(2024, 1, 1)).is_ok());
        let err =
            plan_issue(&member(), &book(1), 3, &settings, &policy, d(2024, 1, 1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::LoanLimitReached {
                member_id: 2,
                active: 3,
                max: 3
            }
        ));
    }

    #[test]
    fn test_late_return_fine_and_penalty() {
        let plan = plan_return(
            &loan(CirculationStatus::Issued),
            "Dune",
            &LibrarySettings::default(),
            &EnforcementPolicy::default(),
            d(2024, 1, 20),
        )
        .unwrap();

        assert_eq!(plan.return_date, d(2024, 1, 20));
        let charge = plan.overdue.as_ref().unwrap();
        assert_eq!(charge.days, 5);
        assert_eq!(charge.fine, Money::from_cents(5000));
        assert_eq!(charge.penalty.amount, Money::from_cents(5000));
        assert_eq!(charge.penalty.reason, "Overdue: Dune");
        assert_eq!(charge.penalty.status, PenaltyStatus::Unpaid);
        assert_eq!(charge.penalty.book_id, Some(4));
        assert_eq!(charge.penalty.due_date, Some(d(2024, 1, 15)));
        assert_eq!(charge.penalty.days_overdue, 5);
    }

    #[test]
    fn test_on_time_return_has_no_charge() {
        let plan = plan_return(
            &loan(CirculationStatus::Issued),
            "Dune",
            &LibrarySettings::default(),
            &EnforcementPolicy::default(),
            d(2024, 1, 15),
        )
        .unwrap();

        assert!(!plan.is_late());
        assert!(plan.fine().is_zero());
    }

    #[test]
    fn test_fine_cap_only_when_enforced() {
        let settings = LibrarySettings::default();
        // 100 days × 10.00 = 1000.00, cap is 500.00
        assert_eq!(
            assess_fine(100, &settings, &EnforcementPolicy::default()).unwrap(),
            Money::from_cents(100_000)
        );
        let capped = EnforcementPolicy {
            cap_fines: true,
            ..Default::default()
        };
        assert_eq!(assess_fine(100, &settings, &capped).unwrap(), Money::from_cents(50_000));
        assert_eq!(assess_fine(3, &settings, &capped).unwrap(), Money::from_cents(3_000));
    }

    #[test]
    fn test_second_return_is_refused() {
        let err = plan_return(
            &loan(CirculationStatus::Returned),
            "Dune",
            &LibrarySettings::default(),
            &EnforcementPolicy::default(),
            d(2024, 1, 20),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyReturned { circulation_id: 9 }));
    }
}
