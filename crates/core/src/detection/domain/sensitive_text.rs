//! Regex predicates for personally identifiable text.
//!
//! Matching is a plain substring search: no normalization and no locale
//! awareness. False positives inherent to the patterns (any run of three
//! digits looks like a phone number) are accepted as-is.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

macro_rules! sensitive_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($regex_str).expect("built-in pattern must compile"));
    };
}

// ── Email ──────────────────────────────────────────────────────────────────
sensitive_pattern!(
    RE_EMAIL,
    r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"
);

// ── IBAN-like: country code, check digits, 1-30 alphanumerics ─────────────
sensitive_pattern!(RE_IBAN, r"[A-Z]{2}[0-9]{2}[A-Z0-9]{1,30}");

// ── Phone-like: optional +CC, up to three separated digit groups ──────────
sensitive_pattern!(
    RE_PHONE,
    r"(?:\+\d{1,3}[-.\s]?)?\(?\d{1,4}\)?[-.\s]?\d{1,4}[-.\s]?\d{1,9}"
);

// ── Date: DD.MM.YYYY ───────────────────────────────────────────────────────
sensitive_pattern!(RE_DATE, r"\b\d{2}\.\d{2}\.\d{4}\b");

/// The category of the first pattern a text matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitiveKind {
    Email,
    Iban,
    Phone,
    Date,
}

impl SensitiveKind {
    /// Test order used by [`classify`].
    pub const ALL: [SensitiveKind; 4] = [
        SensitiveKind::Email,
        SensitiveKind::Iban,
        SensitiveKind::Phone,
        SensitiveKind::Date,
    ];

    pub fn matches(self, text: &str) -> bool {
        let regex: &Regex = match self {
            SensitiveKind::Email => &*RE_EMAIL,
            SensitiveKind::Iban => &*RE_IBAN,
            SensitiveKind::Phone => &*RE_PHONE,
            SensitiveKind::Date => &*RE_DATE,
        };
        regex.is_match(text)
    }
}

impl std::fmt::Display for SensitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensitiveKind::Email => write!(f, "email"),
            SensitiveKind::Iban => write!(f, "iban"),
            SensitiveKind::Phone => write!(f, "phone"),
            SensitiveKind::Date => write!(f, "date"),
        }
    }
}

pub fn contains_email(text: &str) -> bool {
    SensitiveKind::Email.matches(text)
}

pub fn contains_iban(text: &str) -> bool {
    SensitiveKind::Iban.matches(text)
}

pub fn contains_phone(text: &str) -> bool {
    SensitiveKind::Phone.matches(text)
}

pub fn contains_date(text: &str) -> bool {
    SensitiveKind::Date.matches(text)
}

/// First matching category, testing email, IBAN, phone, then date.
pub fn classify(text: &str) -> Option<SensitiveKind> {
    SensitiveKind::ALL.into_iter().find(|kind| kind.matches(text))
}

/// True when `text` contains an email, IBAN, phone number or date.
pub fn is_sensitive(text: &str) -> bool {
    classify(text).is_some()
}
