/// Default length for clamped list text.
pub const CLAMP_LENGTH: usize = 70;

/// Keep only ASCII digits, e.g. for chat links that want a bare number
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Clamp text to `max` characters, ending with a single `…` when cut.
pub fn clamp_text(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max - 1).collect();
    format!("{}…", kept)
}

/// Lowercase one character at a time.
///
/// Unlike `str::to_lowercase` the result for a character never depends on
/// its neighbours (final sigma), so folding a substring yields a substring
/// of the folded whole.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+47 912 34 567"), "4791234567");
        assert_eq!(digits_only("(555) 123-4567"), "5551234567");
        assert_eq!(digits_only("no digits"), "");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_clamp_text() {
        assert_eq!(clamp_text("short", CLAMP_LENGTH), "short");
        assert_eq!(clamp_text("abcdef", 4), "abc…");
        assert_eq!(clamp_text("", 4), "");
        assert_eq!(clamp_text("ærfugl", 3), "ær…");
    }

    #[test]
    fn test_fold_case() {
        assert_eq!(fold_case("UNDER Sink"), "under sink");
        assert_eq!(fold_case("VERKTØY"), "verktøy");
        assert_eq!(fold_case("ΟΔΟΣ"), "οδοσ");
        assert!(fold_case("ΟΔΟΣ").contains(&fold_case("Σ")));
    }
}
