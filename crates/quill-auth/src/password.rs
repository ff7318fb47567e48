//! Password criteria validation and strength scoring for signup and
//! password-reset forms.
//!
//! Five required criteria gate validity; two advisory checks (common
//! patterns, repeated runs) only feed the strength score. The score blends
//! criteria coverage with length, character-class diversity, and Shannon
//! entropy bonuses, normalized to 0-100.

use std::collections::HashMap;
use std::fmt;

pub const MIN_LENGTH: usize = 8;

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>[]\\/_+=~`-";

const COMMON_PATTERNS: &[&str] = &[
    "123", "abc", "qwerty", "password", "admin", "letmein", "welcome", "monkey", "dragon",
    "master",
];

const LABEL_MIN_LENGTH: &str = "At least 8 characters";
const LABEL_UPPERCASE: &str = "Contains uppercase letter (A-Z)";
const LABEL_LOWERCASE: &str = "Contains lowercase letter (a-z)";
const LABEL_DIGIT: &str = "Contains at least one number (0-9)";
const LABEL_SPECIAL: &str = "Contains special character (!@#$%^&*)";

/// Strength bands over the normalized 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    VeryWeak,
    Weak,
    Fair,
    Good,
    Strong,
}

impl Strength {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }

    /// Band for a normalized score.
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        match percent {
            0..=19 => Self::VeryWeak,
            20..=39 => Self::Weak,
            40..=59 => Self::Fair,
            60..=79 => Self::Good,
            _ => Self::Strong,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-criterion results. The first five are required; the last two are
/// advisory and only affect the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criteria {
    pub min_length: bool,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_digit: bool,
    pub has_special: bool,
    pub no_common_patterns: bool,
    pub no_repeated_runs: bool,
}

impl Criteria {
    #[must_use]
    pub fn check(password: &str) -> Self {
        Self {
            min_length: password.chars().count() >= MIN_LENGTH,
            has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            has_lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            has_digit: password.chars().any(|c| c.is_ascii_digit()),
            has_special: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
            no_common_patterns: !password.is_empty() && !contains_common_pattern(password),
            no_repeated_runs: !password.is_empty() && !has_repeated_run(password),
        }
    }

    #[must_use]
    pub const fn required_met(&self) -> bool {
        self.min_length
            && self.has_uppercase
            && self.has_lowercase
            && self.has_digit
            && self.has_special
    }

    fn missing_required(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if !self.min_length {
            errors.push(LABEL_MIN_LENGTH);
        }
        if !self.has_uppercase {
            errors.push(LABEL_UPPERCASE);
        }
        if !self.has_lowercase {
            errors.push(LABEL_LOWERCASE);
        }
        if !self.has_digit {
            errors.push(LABEL_DIGIT);
        }
        if !self.has_special {
            errors.push(LABEL_SPECIAL);
        }
        errors
    }
}

/// Full validation result for form rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    pub is_valid: bool,
    /// Labels of unmet required criteria, in display order.
    pub errors: Vec<&'static str>,
    pub criteria: Criteria,
    pub strength: Strength,
    /// Normalized 0-100 score backing the strength band.
    pub score_percent: u8,
}

/// Validate a candidate password and score its strength.
#[must_use]
pub fn validate(password: &str) -> PasswordCheck {
    let criteria = Criteria::check(password);
    let score_percent = score_percent(password, criteria);
    PasswordCheck {
        is_valid: criteria.required_met(),
        errors: criteria.missing_required(),
        criteria,
        strength: Strength::from_percent(score_percent),
        score_percent,
    }
}

fn contains_common_pattern(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PATTERNS.iter().any(|p| lowered.contains(p))
}

/// Three or more consecutive identical characters.
fn has_repeated_run(password: &str) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for c in password.chars() {
        if prev == Some(c) {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            run = 1;
            prev = Some(c);
        }
    }
    false
}

/// Fraction of the four character classes present, 0-1.
fn character_diversity(criteria: Criteria) -> f64 {
    let present = [
        criteria.has_lowercase,
        criteria.has_uppercase,
        criteria.has_digit,
        criteria.has_special,
    ]
    .iter()
    .filter(|&&p| p)
    .count();
    present as f64 / 4.0
}

/// Shannon entropy over the character frequency distribution.
fn entropy(password: &str) -> f64 {
    if password.is_empty() {
        return 0.0;
    }
    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in password.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }
    let len = password.chars().count() as f64;
    freq.values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn score_percent(password: &str, criteria: Criteria) -> u8 {
    if password.is_empty() {
        return 0;
    }

    // Required criteria are worth double the advisory ones.
    let weighted = [
        (criteria.min_length, 2.0),
        (criteria.has_uppercase, 2.0),
        (criteria.has_lowercase, 2.0),
        (criteria.has_digit, 2.0),
        (criteria.has_special, 2.0),
        (criteria.no_common_patterns, 1.0),
        (criteria.no_repeated_runs, 1.0),
    ];
    let mut score: f64 = weighted.iter().filter(|(met, _)| *met).map(|(_, w)| *w).sum();
    let mut max_score: f64 = weighted.iter().map(|(_, w)| *w).sum();

    let length = password.chars().count();
    let length_bonus = length.saturating_sub(MIN_LENGTH).min(8) as f64 * 0.5;
    let diversity_bonus = character_diversity(criteria) * 2.0;
    let entropy_bonus = entropy(password) * 0.1;

    score += length_bonus + diversity_bonus + entropy_bonus;
    max_score += 8.0 + 2.0 + 2.0;

    ((score / max_score) * 100.0).min(100.0).round() as u8
}
