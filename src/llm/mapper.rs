use crate::error::{AssistError, Result};
use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub command: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplanationResult {
    pub command: String,
    pub explanation: String,
}

/// Maps the `suggestions` array onto typed suggestions, keeping the model's order.
///
/// Entries that aren't objects or lack a usable `command` are dropped. Fails if
/// nothing survives.
pub fn to_suggestions(map: &Map<String, Value>) -> Result<Vec<Suggestion>> {
    let entries = match map.get("suggestions") {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(AssistError::Domain(
                "`suggestions` is not a list".to_string(),
            ))
        }
        None => {
            return Err(AssistError::Domain(
                "response has no `suggestions` key".to_string(),
            ))
        }
    };

    let suggestions: Vec<Suggestion> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let suggestion = suggestion_from(entry);
            if suggestion.is_none() {
                warn!("Skipping malformed suggestion #{}: {}", index + 1, entry);
            }
            suggestion
        })
        .collect();

    if suggestions.is_empty() {
        return Err(AssistError::Domain("no usable suggestions".to_string()));
    }
    Ok(suggestions)
}

fn suggestion_from(entry: &Value) -> Option<Suggestion> {
    let fields = entry.as_object()?;
    let command = fields.get("command").and_then(scalar_text)?;
    let command = command.trim();
    if command.is_empty() {
        return None;
    }

    let description = fields
        .get("description")
        .and_then(scalar_text)
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    Some(Suggestion {
        command: command.to_string(),
        description,
    })
}

/// Returns the trimmed `explanation` field.
pub fn to_explanation(map: &Map<String, Value>) -> Result<String> {
    map.get("explanation")
        .and_then(scalar_text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| AssistError::Domain("response has no `explanation` key".to_string()))
}

/// String form of a scalar JSON value; `None` for null, arrays and objects.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
