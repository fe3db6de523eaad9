use std::collections::HashSet;

use chrono::Utc;

/// Trims user-entered text, returning `None` when nothing is left.
///
/// Every text-accepting operation runs input through here before touching
/// the list, so an empty item can never be stored.
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Picks an id for a new item: the current time in milliseconds, bumped past
/// the largest id already in use.
///
/// When the largest id is `i64::MAX` there is nothing past it, so the first
/// free id from the current time onwards (wrapping to zero) is used instead.
pub fn next_id(existing: &[i64]) -> i64 {
    let now = Utc::now().timestamp_millis();
    let Some(&largest) = existing.iter().max() else {
        return now;
    };
    if largest < now {
        return now;
    }
    if let Some(id) = largest.checked_add(1) {
        return id;
    }

    let used: HashSet<i64> = existing.iter().copied().collect();
    (now..=i64::MAX)
        .chain(0..now)
        .find(|id| !used.contains(id))
        .unwrap_or(now)
}
