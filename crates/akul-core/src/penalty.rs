//! # Penalty Ledger Rules
//!
//! Construction of new penalty rows, both the automatic kind raised by a
//! late return and the manual kind entered by an administrator.
//!
//! ## Member Lookup Strategy
//! A manual penalty names its member loosely. The lookup is an ordered list
//! of steps; the first step that finds a member wins.
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  member input "42", fallback name "Bob"                                 │
//! │                                                                         │
//! │  1. ById(42)         ← only when the input is all digits               │
//! │  2. ByName("42")     ← exact name, ASCII case ignored                   │
//! │  3. ByName("Bob")    ← the secondary name field                         │
//! │                                                                         │
//! │  Nothing matched → MemberUnresolved, nothing written                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Circulation, PenaltyStatus};

// =============================================================================
// New Penalty
// =============================================================================

/// A penalty ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPenalty {
    pub member_id: i64,
    pub book_id: Option<i64>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub days_overdue: i64,
    pub amount: Money,
    pub reason: String,
    pub status: PenaltyStatus,
}

impl NewPenalty {
    /// Unpaid penalty for a late return.
    pub fn overdue(circulation: &Circulation, book_title: &str, days: i64, fine: Money) -> Self {
        NewPenalty {
            member_id: circulation.member_id,
            book_id: Some(circulation.book_id),
            due_date: Some(circulation.due_date),
            days_overdue: days,
            amount: fine,
            reason: format!("Overdue: {}", book_title),
            status: PenaltyStatus::Unpaid,
        }
    }

    /// Unpaid penalty entered by an administrator.
    pub fn manual(member_id: i64, book_id: Option<i64>, amount: Money, reason: String) -> Self {
        NewPenalty {
            member_id,
            book_id,
            due_date: None,
            days_overdue: 0,
            amount,
            reason,
            status: PenaltyStatus::Unpaid,
        }
    }
}

// =============================================================================
// Member Lookup
// =============================================================================

/// One step of the member lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "by", content = "value")]
pub enum MemberLookup {
    /// Exact row id.
    ById(i64),
    /// Exact name, ignoring ASCII case. Non-ASCII letters must match
    /// exactly ("élise" does not find "Élise").
    ByName(String),
}

/// Builds the ordered lookup steps for a manual penalty.
///
/// ## Example
/// ```rust
/// use akul_core::penalty::{lookup_plan, MemberLookup};
///
/// let plan = lookup_plan(Some("42"), Some("Bob"));
/// assert_eq!(plan, vec![
///     MemberLookup::ById(42),
///     MemberLookup::ByName("42".to_string()),
///     MemberLookup::ByName("Bob".to_string()),
/// ]);
///
/// assert_eq!(lookup_plan(Some("Alice"), None),
///            vec![MemberLookup::ByName("Alice".to_string())]);
/// ```
pub fn lookup_plan(member_input: Option<&str>, fallback_name: Option<&str>) -> Vec<MemberLookup> {
    let mut steps = Vec::with_capacity(3);

    if let Some(input) = non_blank(member_input) {
        if input.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = input.parse::<i64>() {
                steps.push(MemberLookup::ById(id));
            }
        }
        steps.push(MemberLookup::ByName(input.to_string()));
    }

    if let Some(name) = non_blank(fallback_name) {
        steps.push(MemberLookup::ByName(name.to_string()));
    }

    steps
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Manual Penalty Request
// =============================================================================

/// Raw form input for a manual penalty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ManualPenaltyRequest {
    /// Member id or name.
    pub member: Option<String>,
    /// Secondary name field, tried last.
    pub fallback_name: Option<String>,
    pub amount: Option<String>,
    pub reason: Option<String>,
    /// Case-insensitive exact book title.
    pub book_title: Option<String>,
}

/// A manual penalty request that passed the input checks.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPenalty {
    pub lookup: Vec<MemberLookup>,
    pub amount: Money,
    pub reason: String,
    pub book_title: Option<String>,
}

impl ManualPenaltyRequest {
    /// Validates the request and derives the lookup steps and reason.
    ///
    /// ## Errors
    /// * `AmountMissing` - no amount given
    /// * `Validation` - amount is not a non-negative decimal
    /// * `MemberUnresolved` - neither member field was filled in
    pub fn prepare(&self) -> CoreResult<PreparedPenalty> {
        let amount_text = non_blank(self.amount.as_deref()).ok_or(CoreError::AmountMissing)?;
        let amount: Money = amount_text.parse()?;

        let lookup = lookup_plan(self.member.as_deref(), self.fallback_name.as_deref());
        if lookup.is_empty() {
            return Err(CoreError::MemberUnresolved {
                input: String::new(),
            });
        }

        let book_title = non_blank(self.book_title.as_deref()).map(str::to_string);

        Ok(PreparedPenalty {
            lookup,
            amount,
            reason: default_reason(self.reason.as_deref(), book_title.as_deref()),
            book_title,
        })
    }

    /// The text shown when no member could be found.
    pub fn member_label(&self) -> String {
        non_blank(self.member.as_deref())
            .or_else(|| non_blank(self.fallback_name.as_deref()))
            .unwrap_or_default()
            .to_string()
    }
}

/// Reason text for a manual penalty.
///
/// The given reason when present, otherwise `Book: <title>`, otherwise
/// `Penalty`.
pub fn default_reason(reason: Option<&str>, book_title: Option<&str>) -> String {
    match (non_blank(reason), non_blank(book_title)) {
        (Some(reason), _) => reason.to_string(),
        (None, Some(title)) => format!("Book: {}", title),
        (None, None) => "Penalty".to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_input_tries_id_before_name() {
        assert_eq!(
            lookup_plan(Some(" 3 "), None),
            vec![MemberLookup::ById(3), MemberLookup::ByName("3".to_string())]
        );
        // Digits too large for an id still get the name step
        assert_eq!(
            lookup_plan(Some("99999999999999999999"), None),
            vec![MemberLookup::ByName("99999999999999999999".to_string())]
        );
    }

    #[test]
    fn test_fallback_name_is_tried_last() {
        assert_eq!(
            lookup_plan(Some("Nobody"), Some("bob")),
            vec![
                MemberLookup::ByName("Nobody".to_string()),
                MemberLookup::ByName("bob".to_string()),
            ]
        );
        assert_eq!(
            lookup_plan(None, Some("bob")),
            vec![MemberLookup::ByName("bob".to_string())]
        );
    }

    #[test]
    fn test_blank_inputs_produce_no_steps() {
        assert!(lookup_plan(None, None).is_empty());
        assert!(lookup_plan(Some("  "), Some("")).is_empty());
    }

    #[test]
    fn test_default_reason() {
        assert_eq!(default_reason(Some("Damaged"), Some("Dune")), "Damaged");
        assert_eq!(default_reason(Some(" "), Some("Dune")), "Book: Dune");
        assert_eq!(default_reason(None, None), "Penalty");
    }

    #[test]
    fn test_prepare_requires_amount() {
        let request = ManualPenaltyRequest {
            member: Some("1".to_string()),
            ..Default::default()
        };
        assert!(matches!(request.prepare(), Err(CoreError::AmountMissing)));

        let request = ManualPenaltyRequest {
            member: Some("1".to_string()),
            amount: Some("ten".to_string()),
            ..Default::default()
        };
        assert!(matches!(request.prepare(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_prepare_requires_some_member_field() {
        let request = ManualPenaltyRequest {
            amount: Some("5".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            request.prepare(),
            Err(CoreError::MemberUnresolved { .. })
        ));
    }

    #[test]
    fn test_prepare_success() {
        let request = ManualPenaltyRequest {
            member: Some("Alice".to_string()),
            amount: Some("12.5".to_string()),
            book_title: Some("Dune".to_string()),
            ..Default::default()
        };
        let prepared = request.prepare().unwrap();
        assert_eq!(prepared.amount, Money::from_cents(1250));
        assert_eq!(prepared.reason, "Book: Dune");
        assert_eq!(prepared.book_title.as_deref(), Some("Dune"));
        assert_eq!(prepared.lookup, vec![MemberLookup::ByName("Alice".to_string())]);
    }
}
