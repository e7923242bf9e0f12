//! Vehicle plate normalization
//!
//! Every path that accepts a plate from a caller (start, lookup, filters)
//! goes through [`normalize_plate`] so stored and queried values agree.

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Maximum plate length, in characters, after normalization.
pub const MAX_PLATE_LEN: usize = 16;

/// Trim and upper-case a raw plate. Blank input yields `None`.
pub fn normalize_plate(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Normalize a set of raw plates: drop blanks, de-duplicate, keep first-seen order.
/// Returns `None` when nothing is left, meaning "no constraint".
pub fn normalize_plate_set<I, S>(raw: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut plates: Vec<String> = Vec::new();
    for plate in raw.into_iter().filter_map(|p| normalize_plate(p.as_ref())) {
        if !plates.contains(&plate) {
            plates.push(plate);
        }
    }

    if plates.is_empty() {
        None
    } else {
        Some(plates)
    }
}

/// Normalize and validate a plate for a new ticket.
pub fn validate_plate(raw: &str) -> DomainResult<String> {
    let plate = normalize_plate(raw)
        .ok_or_else(|| DomainError::InvalidInput("The vehicle plate must be informed".to_string()))?;

    if plate.chars().count() > MAX_PLATE_LEN {
        return Err(DomainError::InvalidInput(format!(
            "The vehicle plate must be at most {} characters",
            MAX_PLATE_LEN
        )));
    }

    Ok(plate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_uppercases() {
        assert_eq!(normalize_plate("  abc1d23 ").as_deref(), Some("ABC1D23"));
    }

    #[test]
    fn blank_is_none() {
        assert_eq!(normalize_plate(""), None);
        assert_eq!(normalize_plate("   \t"), None);
    }

    #[test]
    fn set_drops_blanks_and_duplicates() {
        let plates = normalize_plate_set(["abc123", " ABC123 ", "", "xyz9", "Xyz9"]);
        assert_eq!(
            plates,
            Some(vec!["ABC123".to_string(), "XYZ9".to_string()])
        );
    }

    #[test]
    fn set_of_blanks_is_no_constraint() {
        assert_eq!(normalize_plate_set(["", " "]), None);
        assert_eq!(normalize_plate_set(Vec::<String>::new()), None);
    }

    #[test]
    fn validate_rejects_blank() {
        assert!(matches!(
            validate_plate("  "),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn validate_length_counts_characters_after_trim() {
        assert_eq!(
            validate_plate("  abcdefghijklmnop  ").unwrap(),
            "ABCDEFGHIJKLMNOP"
        );
        assert!(validate_plate("abcdefghijklmnopq").is_err());
    }
}
