//! Case-insensitive natural ordering.
//!
//! Digit runs compare by numeric value so that `"item 9"` sorts before
//! `"item 10"`; everything else compares by lowercase character. Leading
//! whitespace is ignored.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings in natural, case-insensitive order.
///
/// Strings that differ only in letter case (or in leading zeros) are `Equal`.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.trim_start().chars().peekable();
    let mut right = b.trim_start().chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ordering = compare_numbers(&take_digits(&mut left), &take_digits(&mut right));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    // Equal-length digit strings compare lexically as numbers
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(natural_cmp("alice", "ALICE"), Ordering::Equal);
        assert_eq!(natural_cmp("alice", "Bob"), Ordering::Less);
        assert_eq!(natural_cmp("Bob", "alice"), Ordering::Greater);
    }

    #[test]
    fn test_numbers_by_value() {
        assert_eq!(natural_cmp("user9", "user10"), Ordering::Less);
        assert_eq!(natural_cmp("user10", "user9"), Ordering::Greater);
        assert_eq!(natural_cmp("user007", "user7"), Ordering::Equal);
        assert_eq!(natural_cmp("a2b", "a2c"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("bob", "bobby"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }

    #[test]
    fn test_leading_whitespace_ignored() {
        assert_eq!(natural_cmp("  carol", "carol"), Ordering::Equal);
    }

    #[test]
    fn test_digits_before_letters() {
        assert_eq!(natural_cmp("1st", "first"), Ordering::Less);
    }
}
