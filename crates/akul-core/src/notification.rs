//! # Notification Messages
//!
//! Wording of the rolling notification log. Every state-changing operation
//! appends exactly one of these; the log keeps the newest
//! [`NOTIFICATION_CAPACITY`](crate::NOTIFICATION_CAPACITY) entries.

use crate::money::Money;

pub fn book_issued(title: &str, member: &str) -> String {
    format!("Book '{}' issued to {}", title, member)
}

pub fn book_returned(title: &str, member: &str) -> String {
    format!("Book '{}' returned by {}", title, member)
}

pub fn book_returned_overdue(title: &str, member: &str, fine: Money) -> String {
    format!(
        "Book '{}' returned overdue by {}. Penalty: {}",
        title, member, fine
    )
}

pub fn penalty_added(member: &str, amount: Money) -> String {
    format!("Penalty of {} added for {}.", amount, member)
}

pub fn penalty_paid(member: &str) -> String {
    format!("Penalty for {} marked as Paid.", member)
}

pub fn penalty_deleted(member: &str) -> String {
    format!("Penalty for {} deleted.", member)
}

pub fn settings_updated() -> String {
    "Settings updated successfully.".to_string()
}

pub fn book_added(title: &str) -> String {
    format!("Book '{}' added successfully.", title)
}

pub fn book_updated(title: &str) -> String {
    format!("Book '{}' updated successfully.", title)
}

pub fn book_deleted(title: &str) -> String {
    format!("Book '{}' deleted successfully.", title)
}

pub fn member_added(name: &str) -> String {
    format!("Member '{}' added successfully.", name)
}

pub fn member_updated(name: &str) -> String {
    format!("Member '{}' updated successfully.", name)
}

pub fn member_deleted(name: &str) -> String {
    format!("Member '{}' deleted successfully.", name)
}

pub fn author_added(name: &str) -> String {
    format!("Author '{}' added successfully.", name)
}

pub fn author_deleted(name: &str) -> String {
    format!("Author '{}' deleted successfully.", name)
}

pub fn publisher_added(name: &str) -> String {
    format!("Publisher '{}' added successfully.", name)
}

pub fn publisher_deleted(name: &str) -> String {
    format!("Publisher '{}' deleted successfully.", name)
}

/// Failure entry, e.g. `Failed to add book: A book with this ISBN already exists.`
pub fn failed(action: &str, reason: &str) -> String {
    format!("Failed to {}: {}", action, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circulation_wording() {
        assert_eq!(book_issued("Dune", "Alice"), "Book 'Dune' issued to Alice");
        assert_eq!(book_returned("Dune", "Alice"), "Book 'Dune' returned by Alice");
        assert_eq!(
            book_returned_overdue("Dune", "Alice", Money::from_cents(5000)),
            "Book 'Dune' returned overdue by Alice. Penalty: 50.00"
        );
    }

    #[test]
    fn test_failure_wording() {
        assert_eq!(
            failed("add book", "A book with this ISBN already exists."),
            "Failed to add book: A book with this ISBN already exists."
        );
    }
}
