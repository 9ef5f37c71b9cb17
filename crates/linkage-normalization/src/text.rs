//! Text canonicalization for comparison.
//!
//! All functions borrow their input and return a fresh value; blank input
//! normalizes to `None` so callers can tell "missing" from "different".

/// Trim, collapse inner whitespace and lowercase.
pub fn normalize_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}

/// Keep digits only, so `+251 91-123 4567` equals `251911234567`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Fold common spellings of sex onto single-letter codes.
pub fn normalize_sex(raw: &str) -> Option<String> {
    let text = normalize_text(raw)?;
    let code = match text.as_str() {
        "m" | "male" | "man" => "m",
        "f" | "female" | "woman" => "f",
        _ => return Some(text),
    };
    Some(code.to_string())
}

/// Case-fold and drop all whitespace.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let folded: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if folded.is_empty() { None } else { Some(folded) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_folded() {
        assert_eq!(normalize_text("  Adi   Ha ").as_deref(), Some("adi ha"));
        assert_eq!(normalize_text(" \t "), None);
    }

    #[test]
    fn phone_keeps_digits() {
        assert_eq!(
            normalize_phone("+251 91-123 4567").as_deref(),
            Some("251911234567")
        );
        assert_eq!(normalize_phone("n/a"), None);
    }

    #[test]
    fn sex_spellings_fold() {
        assert_eq!(normalize_sex("Male").as_deref(), Some("m"));
        assert_eq!(normalize_sex(" F ").as_deref(), Some("f"));
        assert_eq!(normalize_sex("Other").as_deref(), Some("other"));
    }

    #[test]
    fn identifiers_ignore_spacing_and_case() {
        assert_eq!(normalize_identifier(" ab 12 C").as_deref(), Some("ab12c"));
    }
}
