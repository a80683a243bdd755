//! Acceptable answers: normalization and guess checking.
//!
//! Comparison is case-insensitive via Unicode lowercasing. Accents and
//! transliterations are not folded, so `"Zurich"` does not match
//! `"Zürich"`.

use std::cmp::Ordering;

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Case-insensitive equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || fold(a) == fold(b)
}

/// Case-insensitive ordinal ordering on the lowercased text.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b))
}

/// Normalize an answer list.
///
/// - An empty list becomes `[""]`.
/// - Case-insensitive duplicates are dropped, keeping the first seen.
/// - The first answer stays first; the alternates are sorted
///   case-insensitively.
///
/// Applying it twice gives the same result as applying it once.
pub fn fix_acceptables(answers: &[String]) -> Vec<String> {
    if answers.is_empty() {
        return vec![String::new()];
    }

    let mut unique: Vec<String> = Vec::with_capacity(answers.len());
    for answer in answers {
        if !unique.iter().any(|kept| eq_ignore_case(kept, answer)) {
            unique.push(answer.clone());
        }
    }

    unique[1..].sort_by(|a, b| cmp_ignore_case(a, b));
    unique
}

/// Whether `guess` matches any of the answers, ignoring case.
pub fn is_acceptable(guess: &str, answers: &[String]) -> bool {
    answers.iter().any(|answer| eq_ignore_case(guess, answer))
}
