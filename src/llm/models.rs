use crate::error::{AssistError, Result};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Installed model names from an `/api/tags` reply.
///
/// Names are sorted naturally and case-insensitively. Duplicates differing only in
/// case collapse to the first-seen spelling.
pub fn model_names(map: &Map<String, Value>) -> Result<Vec<String>> {
    let entries = map
        .get("models")
        .and_then(Value::as_array)
        .ok_or_else(|| AssistError::Domain("response has no `models` list".to_string()))?;

    let mut names: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.as_object()?.get("name")?.as_str())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    // Stable sort keeps the first-seen spelling ahead of its case variants.
    names.sort_by(|a, b| natural_cmp(a, b));
    names.dedup_by(|later, earlier| later.to_lowercase() == earlier.to_lowercase());

    if names.is_empty() {
        return Err(AssistError::Domain("no installed models found".to_string()));
    }
    Ok(names)
}

/// Case-insensitive ordering that compares runs of digits by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = compare_chunks(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_chunks(l: &str, r: &str) -> Ordering {
    let l_digits = l.starts_with(|c: char| c.is_ascii_digit());
    let r_digits = r.starts_with(|c: char| c.is_ascii_digit());
    match (l_digits, r_digits) {
        (true, true) => {
            let l_trim = l.trim_start_matches('0');
            let r_trim = r.trim_start_matches('0');
            l_trim
                .len()
                .cmp(&r_trim.len())
                .then_with(|| l_trim.cmp(r_trim))
                .then_with(|| l.len().cmp(&r.len()))
        }
        _ => l.to_lowercase().cmp(&r.to_lowercase()),
    }
}

/// Splits into alternating runs of ASCII digits and everything else.
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}
