use crate::core::extractor::{find_field_data, find_field_text};
use crate::core::formatters::{format_directors, format_ownership};
use crate::domain::model::{DatasourceResult, FlatRecord, NestedPayload, RawResponse};
use crate::utils::json::{display_text, is_truthy};
use serde_json::Value;

pub const COMPREHENSIVE_VIEW: &str = "Comprehensive View";
pub const BUSINESS_INSIGHTS: &str = "Business Insights";

static EMPTY_LIST: Value = Value::Array(Vec::new());

/// Picks the datasource whose appended fields feed the report.
///
/// An exact `Comprehensive View` with a non-empty `AppendedFields` list wins. Otherwise the
/// first `Business Insights` variant carrying any `AppendedFields` is taken, even an empty list.
pub fn select_datasource(datasources: &[Value]) -> Option<DatasourceResult<'_>> {
    let candidates: Vec<DatasourceResult<'_>> = datasources
        .iter()
        .map(DatasourceResult::from_value)
        .collect();

    candidates
        .iter()
        .find(|ds| ds.name == Some(COMPREHENSIVE_VIEW) && ds.has_appended_fields())
        .or_else(|| {
            candidates.iter().find(|ds| {
                ds.name.is_some_and(|name| name.contains(BUSINESS_INSIGHTS))
                    && ds.carries_appended_fields()
            })
        })
        .copied()
}

/// `YYYY-MM-DD` as given by the three incorporation fields, or empty unless all three are set.
/// Values pass through untouched: no padding, no calendar check.
pub fn incorporation_date(appended_fields: &Value) -> String {
    let parts: Vec<&Value> = ["YearOfIncorporation", "MonthOfIncorporation", "DayOfIncorporation"]
        .iter()
        .filter_map(|name| find_field_data(appended_fields, name))
        .filter(|value| is_truthy(value))
        .collect();

    match parts.as_slice() {
        [year, month, day] => format!(
            "{}-{}-{}",
            display_text(year),
            display_text(month),
            display_text(day)
        ),
        _ => String::new(),
    }
}

fn top_level_text(object: &Value, key: &str) -> String {
    match object.get(key) {
        Some(value) if is_truthy(value) => display_text(value),
        _ => String::new(),
    }
}

/// Maps one response to a report row. `None` means the response is left out of the report:
/// no body, a falsy body, or a body carrying an `error`.
pub fn flatten_response(response: &RawResponse) -> Option<FlatRecord> {
    let body = response.response_body.as_ref().filter(|body| is_truthy(body))?;
    if body.get("error").is_some_and(is_truthy) {
        return None;
    }

    let record = body.get("Record").filter(|record| is_truthy(record));
    let datasources = record
        .and_then(|record| record.get("DatasourceResults"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let appended_fields = select_datasource(datasources)
        .and_then(|ds| ds.appended_fields)
        .unwrap_or(&EMPTY_LIST);

    let field = |name: &str| find_field_text(appended_fields, name, "");

    Some(FlatRecord {
        transaction_id: top_level_text(body, "TransactionID"),
        overall_status: record
            .map(|record| top_level_text(record, "RecordStatus"))
            .unwrap_or_default(),
        country: top_level_text(body, "CountryCode"),
        business_name: field("BusinessName"),
        business_registration_number: field("BusinessRegistrationNumber"),
        tax_id_number: field("TaxIDNumber"),
        business_status: field("BusinessStatus"),
        legal_form: field("BusinessLegalForm"),
        full_address: field("Address1"),
        incorporation_date: incorporation_date(appended_fields),
        directors_and_officers: format_directors(NestedPayload::from_value(find_field_data(
            appended_fields,
            "StandardizedDirectorsOfficers",
        ))),
        ownership: format_ownership(NestedPayload::from_value(find_field_data(
            appended_fields,
            "StandardizedCompanyOwnershipHierarchy",
        ))),
    })
}

/// Flattens every response in order, dropping the excluded ones.
pub fn flatten_responses(responses: &[RawResponse]) -> Vec<FlatRecord> {
    responses
        .iter()
        .filter_map(|response| {
            let flattened = flatten_response(response);
            if flattened.is_none() {
                tracing::warn!(
                    "⚠️ Skipping '{}' (status {:?}): {}",
                    response.request_name,
                    response.status_code,
                    skip_reason(response)
                );
            }
            flattened
        })
        .collect()
}

fn skip_reason(response: &RawResponse) -> String {
    response
        .response_body
        .as_ref()
        .and_then(|body| body.get("error"))
        .map(display_text)
        .unwrap_or_else(|| "empty response body".to_string())
}
