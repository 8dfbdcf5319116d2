//! # Library Settings
//!
//! The single active configuration record and the policy toggles that decide
//! whether its limits are enforced.
//!
//! Settings are threaded explicitly into every workflow call rather than
//! read from a global, so the circulation functions stay pure.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Upper bound for `loan_duration_days` (ten years).
pub const MAX_LOAN_DURATION_DAYS: i64 = 3650;
/// Upper bound for the daily rate: 10,000.00.
pub const MAX_PENALTY_PER_DAY_CENTS: i64 = 1_000_000;
/// Upper bound for the fine cap: 1,000,000.00.
pub const MAX_PENALTY_CAP_CENTS: i64 = 100_000_000;
/// Upper bound for `max_books`.
pub const MAX_BOOKS_LIMIT: i64 = 1000;

/// The singleton settings record.
///
/// ## Defaults
/// | Field | Default |
/// |-------|---------|
/// | loan_duration_days | 14 |
/// | penalty_per_day | 10.00 |
/// | max_penalty | 500.00 |
/// | max_books | 3 |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LibrarySettings {
    /// Display only.
    pub library_name: String,
    /// Display only.
    pub address: String,
    /// Display only.
    pub contact: String,
    /// Days between issue date and due date.
    pub loan_duration_days: i64,
    pub penalty_per_day_cents: i64,
    /// Fine cap, applied only when [`EnforcementPolicy::cap_fines`] is set.
    pub max_penalty_cents: i64,
    /// Loans per member, enforced only when
    /// [`EnforcementPolicy::enforce_loan_limit`] is set.
    pub max_books: i64,
}

impl LibrarySettings {
    pub fn penalty_per_day(&self) -> Money {
        Money::from_cents(self.penalty_per_day_cents)
    }

    pub fn max_penalty(&self) -> Money {
        Money::from_cents(self.max_penalty_cents)
    }

    /// Overwrites every field present in `update`.
    ///
    /// Call [`SettingsUpdate::validate`] first; this only copies values.
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(name) = &update.library_name {
            self.library_name = name.clone();
        }
        if let Some(address) = &update.address {
            self.address = address.clone();
        }
        if let Some(contact) = &update.contact {
            self.contact = contact.clone();
        }
        if let Some(days) = update.loan_duration_days {
            self.loan_duration_days = days;
        }
        if let Some(rate) = update.penalty_per_day {
            self.penalty_per_day_cents = rate.cents();
        }
        if let Some(cap) = update.max_penalty {
            self.max_penalty_cents = cap.cents();
        }
        if let Some(max) = update.max_books {
            self.max_books = max;
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        LibrarySettings {
            library_name: "Central City Library".to_string(),
            address: "123 Main Street, City".to_string(),
            contact: "+1 234 567 8900".to_string(),
            loan_duration_days: 14,
            penalty_per_day_cents: 1000,
            max_penalty_cents: 50000,
            max_books: 3,
        }
    }
}

/// Named fields to overwrite on the settings record. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettingsUpdate {
    pub library_name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub loan_duration_days: Option<i64>,
    pub penalty_per_day: Option<Money>,
    pub max_penalty: Option<Money>,
    pub max_books: Option<i64>,
}

impl SettingsUpdate {
    /// Range-checks every numeric field that is present.
    ///
    /// The bounds mirror the settings table's CHECK constraints and keep
    /// due dates and fines inside the date and money types.
    ///
    /// ## Example
    /// ```rust
    /// use akul_core::SettingsUpdate;
    ///
    /// let update = SettingsUpdate { loan_duration_days: Some(0), ..Default::default() };
    /// assert!(update.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        let check = |field: &str, value: Option<i64>, min: i64, max: i64| match value {
            Some(v) if v < min || v > max => Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min,
                max,
            }),
            _ => Ok(()),
        };

        check("loan_duration_days", self.loan_duration_days, 1, MAX_LOAN_DURATION_DAYS)?;
        check(
            "penalty_per_day",
            self.penalty_per_day.map(|m| m.cents()),
            0,
            MAX_PENALTY_PER_DAY_CENTS,
        )?;
        check(
            "max_penalty",
            self.max_penalty.map(|m| m.cents()),
            0,
            MAX_PENALTY_CAP_CENTS,
        )?;
        check("max_books", self.max_books, 0, MAX_BOOKS_LIMIT)?;
        Ok(())
    }
}

/// Which configured limits the circulation workflow actually applies.
///
/// Both default to off, which reproduces the historical behavior where
/// `max_penalty` and `max_books` were stored but never consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EnforcementPolicy {
    /// Clamp each overdue fine to `max_penalty`.
    pub cap_fines: bool,
    /// Refuse to issue when the member already holds `max_books` loans.
    pub enforce_loan_limit: bool,
}

impl EnforcementPolicy {
    /// Every limit switched on.
    pub fn strict() -> Self {
        EnforcementPolicy {
            cap_fines: true,
            enforce_loan_limit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LibrarySettings::default();
        assert_eq!(settings.loan_duration_days, 14);
        assert_eq!(settings.penalty_per_day(), Money::from_cents(1000));
        assert_eq!(settings.max_penalty(), Money::from_cents(50000));
        assert_eq!(settings.max_books, 3);
    }

    #[test]
    fn test_apply_overwrites_only_named_fields() {
        let mut settings = LibrarySettings::default();
        settings.apply(&SettingsUpdate {
            loan_duration_days: Some(21),
            penalty_per_day: Some(Money::from_cents(250)),
            ..Default::default()
        });

        assert_eq!(settings.loan_duration_days, 21);
        assert_eq!(settings.penalty_per_day_cents, 250);
        assert_eq!(settings.max_books, 3);
        assert_eq!(settings.library_name, "Central City Library");
    }

    #[test]
    fn test_validate_bounds() {
        assert!(SettingsUpdate::default().validate().is_ok());
        assert!(SettingsUpdate {
            loan_duration_days: Some(MAX_LOAN_DURATION_DAYS),
            penalty_per_day: Some(Money::from_cents(MAX_PENALTY_PER_DAY_CENTS)),
            max_penalty: Some(Money::zero()),
            max_books: Some(0),
            ..Default::default()
        }
        .validate()
        .is_ok());

        let err = SettingsUpdate {
            loan_duration_days: Some(1_000_000_000),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { ref field, min: 1, max: MAX_LOAN_DURATION_DAYS }
                if field == "loan_duration_days"
        ));

        let rate: Money = "92233720368547758".parse().unwrap();
        let err = SettingsUpdate {
            penalty_per_day: Some(rate),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "penalty_per_day"));
    }

    #[test]
    fn test_policy_defaults_to_lenient() {
        let policy = EnforcementPolicy::default();
        assert!(!policy.cap_fines);
        assert!(!policy.enforce_loan_limit);
        assert_eq!(
            EnforcementPolicy::strict(),
            EnforcementPolicy {
                cap_fines: true,
                enforce_loan_limit: true
            }
        );
    }
}
