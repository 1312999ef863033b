//! Formatters for the nested directors and ownership sub-records.
//!
//! Both accept the raw appended-field value, which may be JSON text or an
//! already-parsed object, and never fail: unusable input turns into a fixed
//! sentinel string so the rest of the row is still reported.

use crate::domain::model::NestedPayload;
use crate::utils::json::{as_number, is_truthy, text_or};
use serde_json::Value;
use std::borrow::Cow;

pub const INVALID_DIRECTORS: &str = "Invalid JSON for Directors";
pub const INVALID_OWNERSHIP: &str = "Invalid JSON for Ownership";

const NOT_AVAILABLE: &str = "N/A";

struct Unusable;

/// 解析成物件；JSON 字串才需要 parse
fn resolve(payload: NestedPayload<'_>) -> Result<Option<Cow<'_, Value>>, Unusable> {
    match payload {
        NestedPayload::Empty => Ok(None),
        NestedPayload::RawText(text) => serde_json::from_str::<Value>(text)
            .map(|value| Some(Cow::Owned(value)))
            .map_err(|_| Unusable),
        NestedPayload::Parsed(value) => Ok(Some(Cow::Borrowed(value))),
    }
}

/// Entries of the named list field. A falsy field means no entries; a parsed
/// `null` document or a truthy non-list field is unusable.
fn list_entries<'v>(document: &'v Value, list_field: &str) -> Result<&'v [Value], Unusable> {
    if document.is_null() {
        return Err(Unusable);
    }

    match document.get(list_field) {
        None => Ok(&[]),
        Some(value) if !is_truthy(value) => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries.as_slice()),
        Some(_) => Err(Unusable),
    }
}

fn label(entry: &Value, name_field: &str, detail_field: &str) -> String {
    format!(
        "{} ({})",
        text_or(entry.get(name_field), NOT_AVAILABLE),
        text_or(entry.get(detail_field), NOT_AVAILABLE)
    )
}

fn format_sub_records(
    payload: NestedPayload<'_>,
    list_field: &str,
    keep: impl Fn(&Value) -> bool,
    name_field: &str,
    detail_field: &str,
) -> Result<String, Unusable> {
    let Some(document) = resolve(payload)? else {
        return Ok(String::new());
    };

    let mut lines = Vec::new();
    for entry in list_entries(&document, list_field)? {
        if entry.is_null() {
            return Err(Unusable);
        }
        if keep(entry) {
            lines.push(label(entry, name_field, detail_field));
        }
    }

    Ok(lines.join("\n"))
}

/// `"{FullName} ({Position})"` per director or officer, one per line, in source order.
pub fn format_directors(payload: NestedPayload<'_>) -> String {
    format_sub_records(
        payload,
        "StandardizedDirectorsOfficers",
        |_| true,
        "FullName",
        "Position",
    )
    .unwrap_or_else(|_| INVALID_DIRECTORS.to_string())
}

/// `"{FullName} ({BeneficiaryType})"` per owner, one per line. The company itself
/// (degree of separation 0) and entries without a positive degree are skipped.
pub fn format_ownership(payload: NestedPayload<'_>) -> String {
    format_sub_records(
        payload,
        "Ownerships",
        |owner| {
            owner
                .get("DegreeOfSeparation")
                .and_then(as_number)
                .is_some_and(|degree| degree > 0.0)
        },
        "FullName",
        "BeneficiaryType",
    )
    .unwrap_or_else(|_| INVALID_OWNERSHIP.to_string())
}
