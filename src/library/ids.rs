//! Book and borrower identifier generation
//!
//! Book ids draw from a shared counter that never goes back, so a deleted
//! book's number is never handed out again. Borrower serials are recomputed
//! from the roster and fill the lowest gap, so freed serials are reused.

use std::collections::BTreeSet;

pub const BORROWER_PREFIX: &str = "STU";

/// Two-letter prefix derived from a title.
///
/// A single word gives its first two letters; several words give the first
/// letter of each of the first two.
pub fn title_prefix(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    let prefix: String = match words.as_slice() {
        [] => String::new(),
        [word] => word.chars().take(2).collect(),
        [first, second, ..] => first.chars().take(1).chain(second.chars().take(1)).collect(),
    };
    prefix.to_uppercase()
}

/// Monotonic book id counter shared by all titles
#[derive(Debug, Clone, Default)]
pub struct BookIdSequence {
    last: u32,
}

impl BookIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last number handed out (0 before the first id)
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Next id for `title`, e.g. `TB-0001`
    pub fn next_id(&mut self, title: &str) -> String {
        self.last += 1;
        format!("{}-{:04}", title_prefix(title), self.last)
    }
}

/// Numeric part of a serial such as `STU-007`
pub fn serial_number(serial: &str) -> Option<u32> {
    let digits: String = serial
        .split('-')
        .nth(1)?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Smallest positive serial number not used by `serials`
pub fn next_borrower_serial<'a>(serials: impl IntoIterator<Item = &'a str>) -> String {
    let used: BTreeSet<u32> = serials.into_iter().filter_map(serial_number).collect();
    let number = (1..)
        .find(|n| !used.contains(n))
        .unwrap_or(1);
    format!("{}-{:03}", BORROWER_PREFIX, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefix() {
        assert_eq!(title_prefix("Utopia"), "UT");
        assert_eq!(title_prefix("The Barometz"), "TB");
        assert_eq!(title_prefix("  the   prince of  Persia "), "TP");
        assert_eq!(title_prefix("X"), "X");
        assert_eq!(title_prefix("élan vital"), "ÉV");
    }

    #[test]
    fn test_book_ids_are_monotonic() {
        let mut seq = BookIdSequence::new();
        assert_eq!(seq.next_id("The Barometz"), "TB-0001");
        assert_eq!(seq.next_id("The Canterbury Tales"), "TC-0002");
        assert_eq!(seq.next_id("Utopia"), "UT-0003");
        assert_eq!(seq.last(), 3);
    }

    #[test]
    fn test_serial_number() {
        assert_eq!(serial_number("STU-001"), Some(1));
        assert_eq!(serial_number("STU-042"), Some(42));
        assert_eq!(serial_number("STU-12x"), Some(12));
        assert_eq!(serial_number("STU"), None);
        assert_eq!(serial_number("STU-abc"), None);
    }

    #[test]
    fn test_next_borrower_serial_fills_gaps() {
        assert_eq!(next_borrower_serial([]), "STU-001");
        assert_eq!(next_borrower_serial(["STU-001", "STU-003"]), "STU-002");
        assert_eq!(next_borrower_serial(["STU-002", "STU-001"]), "STU-003");
        assert_eq!(next_borrower_serial(["STU-002"]), "STU-001");
    }

    #[test]
    fn test_next_borrower_serial_ignores_noise() {
        assert_eq!(next_borrower_serial(["STU-001", "STU-001", "STU-002"]), "STU-003");
        assert_eq!(next_borrower_serial(["STU-000", "STU-001"]), "STU-002");
        assert_eq!(next_borrower_serial(["guest", "STU-001"]), "STU-002");
    }
}
