use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Country digit rendered when the visitor types only subscriber digits.
pub const COUNTRY_DIGIT: char = '7';
pub const SUBSCRIBER_DIGITS: usize = 10;
pub const SIGNIFICANT_DIGITS: usize = SUBSCRIBER_DIGITS + 1;
/// Length of `+7 (XXX) XXX-XX-XX`.
pub const CANONICAL_LEN: usize = 18;

static LOOSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+7\s?\(?\d{3}\)?\s?\d{3}-?\d{2}-?\d{2}$").expect("static phone pattern")
});

/// Which completeness check gates submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneRule {
    /// Exactly 11 digits and exactly the canonical length.
    #[default]
    Strict,
    /// Loose regex accepting optional spaces, brackets and dashes.
    Pattern,
}

impl PhoneRule {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            PhoneRule::Strict => is_complete(value),
            PhoneRule::Pattern => matches_pattern(value),
        }
    }
}

pub fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Split raw input into `(country digit, subscriber digits)`.
///
/// A value that already carries a `+` or has a full 11 digits keeps its
/// first digit as the country digit. Anything shorter is subscriber digits
/// typed behind the implied `+7`.
fn split(raw: &str) -> Option<(char, String)> {
    let all = digits(raw);
    let mut chars = all.chars();
    if raw.trim_start().starts_with('+') || all.len() >= SIGNIFICANT_DIGITS {
        let country = chars.next()?;
        Some((country, chars.take(SUBSCRIBER_DIGITS).collect()))
    } else if all.is_empty() {
        None
    } else {
        Some((COUNTRY_DIGIT, chars.take(SUBSCRIBER_DIGITS).collect()))
    }
}

/// Render raw keystrokes as `+C (DDD) DDD-DD-DD`, adding punctuation only
/// for the groups typed so far. Digits past the eleventh are dropped.
pub fn format(raw: &str) -> String {
    let Some((country, subscriber)) = split(raw) else {
        return String::new();
    };

    let mut out = String::with_capacity(CANONICAL_LEN);
    out.push('+');
    out.push(country);

    let groups: [(usize, usize, &str); 4] = [(0, 3, " ("), (3, 6, ") "), (6, 8, "-"), (8, 10, "-")];

    for (start, end, prefix) in groups {
        if subscriber.len() <= start {
            break;
        }
        out.push_str(prefix);
        out.push_str(&subscriber[start..end.min(subscriber.len())]);
    }

    out
}

/// Both checks are required: 11 significant digits and the exact canonical length.
pub fn is_complete(value: &str) -> bool {
    digits(value).len() == SIGNIFICANT_DIGITS && value.chars().count() == CANONICAL_LEN
}

pub fn matches_pattern(value: &str) -> bool {
    LOOSE_PATTERN.is_match(value)
}

/// Clean pasted text before it reaches `format`: only digits survive, a
/// domestic trunk `8` becomes the country digit and a bare 10-digit number
/// gets the country digit prepended.
pub fn normalize_paste(pasted: &str) -> String {
    let mut d = digits(pasted);
    if d.len() == SIGNIFICANT_DIGITS && d.starts_with('8') {
        d.replace_range(0..1, "7");
    } else if d.len() == SUBSCRIBER_DIGITS {
        d.insert(0, COUNTRY_DIGIT);
    }
    d
}

