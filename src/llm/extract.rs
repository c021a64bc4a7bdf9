//! Pulls a JSON object out of free-form model output.
//!
//! Candidates are tried in order: the whole reply, the first code fence, the first
//! `<response>` and `<json>` tags, then the first balanced brace block. Each one is
//! parsed strictly, then once more after a missing-comma repair.

use crate::error::{AssistError, Result};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::iter;

lazy_static! {
    static ref CODE_FENCE_RE: Regex =
        Regex::new(r"(?s)```[A-Za-z0-9_+.\-]*[ \t]*\r?\n?(.*?)```").unwrap();
    static ref RESPONSE_TAG_RE: Regex = Regex::new(r"(?is)<response>(.*?)</response>").unwrap();
    static ref JSON_TAG_RE: Regex = Regex::new(r"(?is)<json>(.*?)</json>").unwrap();
}

/// Finds and parses the first JSON object in `raw`.
///
/// `expected_key` only feeds the error message.
pub fn extract_json_object(raw: &str, expected_key: &str) -> Result<Map<String, Value>> {
    let candidates = candidates(raw);

    let parsed = candidates
        .iter()
        .flat_map(|candidate| attempts(candidate))
        .find_map(|text| parse_object(&text))
        .ok_or_else(|| AssistError::Extraction {
            expected: expected_key.to_string(),
            raw: raw.to_string(),
        });
    parsed
}

/// Ordered, deduplicated substrings that may hold the JSON payload.
pub fn candidates(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let found = [
        Some(trimmed),
        first_capture(&CODE_FENCE_RE, raw),
        first_capture(&RESPONSE_TAG_RE, raw),
        first_capture(&JSON_TAG_RE, raw),
        first_balanced_object(raw),
    ];

    let mut out: Vec<String> = Vec::new();
    for candidate in found.into_iter().flatten() {
        let candidate = candidate.trim();
        if candidate.is_empty() || out.iter().any(|c| c == candidate) {
            continue;
        }
        out.push(candidate.to_string());
    }

    if out.is_empty() {
        out.push(trimmed.to_string());
    }
    out
}

fn first_capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The candidate as-is, then its repaired form if the repair changed anything.
fn attempts(candidate: &str) -> impl Iterator<Item = Cow<'_, str>> {
    iter::once(Cow::Borrowed(candidate)).chain(
        iter::once_with(move || repair_missing_commas(candidate).map(Cow::Owned)).flatten(),
    )
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            debug!("Candidate parsed to a non-object JSON value: {}", other);
            None
        }
        Err(e) => {
            debug!("Candidate failed to parse: {}", e);
            None
        }
    }
}

/// Returns the end index (exclusive) of the string literal opening at `start`,
/// or `None` if it never closes.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// First `{...}` block whose braces balance, ignoring braces inside string literals.
///
/// An opening brace that never closes is skipped in favour of the next balanced block.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut open: Vec<usize> = Vec::new();
    // Earliest-starting block closed so far, as (start, end inclusive).
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => match string_end(bytes, i) {
                Some(end) => {
                    i = end;
                    continue;
                }
                None => break,
            },
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    if open.is_empty() {
                        // No earlier brace is still open, so nothing can start before this one.
                        return Some(&text[start..=i]);
                    }
                    if best.map_or(true, |(s, _)| start < s) {
                        best = Some((start, i));
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    best.map(|(start, end)| &text[start..=end])
}

/// Inserts the comma a model dropped between two adjacent string tokens, when the
/// second one is a key (followed by `:`). Returns `None` if nothing needed fixing.
pub fn repair_missing_commas(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut insert_at: Vec<usize> = Vec::new();
    // End of the previous string token, while only whitespace has followed it.
    let mut prev_string_end: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            let end = match string_end(bytes, i) {
                Some(end) => end,
                None => break,
            };
            if let Some(prev) = prev_string_end {
                let next = bytes[end..]
                    .iter()
                    .find(|c| !c.is_ascii_whitespace());
                if next == Some(&b':') {
                    insert_at.push(prev);
                }
            }
            prev_string_end = Some(end);
            i = end;
            continue;
        }
        if !b.is_ascii_whitespace() {
            prev_string_end = None;
        }
        i += 1;
    }

    if insert_at.is_empty() {
        return None;
    }

    let mut repaired = String::with_capacity(text.len() + insert_at.len());
    let mut last = 0;
    for pos in insert_at {
        repaired.push_str(&text[last..pos]);
        repaired.push(',');
        last = pos;
    }
    repaired.push_str(&text[last..]);
    Some(repaired)
}
