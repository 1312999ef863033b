use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

/// One executed request of the batch, as saved to the responses file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    pub request_name: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub response_body: Option<Value>,
}

impl RawResponse {
    pub const NO_RESPONSE: &'static str = "No response received for this request.";

    pub fn new(request_name: impl Into<String>, status_code: Option<u16>, response_body: Option<Value>) -> Self {
        Self {
            request_name: request_name.into(),
            status_code,
            response_body,
        }
    }

    /// 請求沒有拿到任何回應
    pub fn no_response(request_name: impl Into<String>) -> Self {
        Self::failed(request_name, None, Self::NO_RESPONSE)
    }

    pub fn failed(request_name: impl Into<String>, status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self::new(
            request_name,
            status_code,
            Some(serde_json::json!({ "error": message.into() })),
        )
    }
}

/// Borrowed view of one `{ FieldName, Data }` element of an `AppendedFields` list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppendedField<'a> {
    pub field_name: &'a str,
    pub data: &'a Value,
}

impl<'a> AppendedField<'a> {
    /// Elements without a string `FieldName` are not addressable and yield `None`.
    /// A missing `Data` reads as `null`.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        let field_name = value.get("FieldName")?.as_str()?;
        Some(Self {
            field_name,
            data: value.get("Data").unwrap_or(&NULL),
        })
    }
}

/// Borrowed view of one entry of `Record.DatasourceResults`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasourceResult<'a> {
    pub name: Option<&'a str>,
    pub appended_fields: Option<&'a Value>,
}

impl<'a> DatasourceResult<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        Self {
            name: value.get("DatasourceName").and_then(Value::as_str),
            appended_fields: value.get("AppendedFields"),
        }
    }

    /// `AppendedFields` is a list with at least one element.
    pub fn has_appended_fields(&self) -> bool {
        self.appended_fields
            .and_then(Value::as_array)
            .is_some_and(|fields| !fields.is_empty())
    }

    /// `AppendedFields` is present and truthy; an empty list still counts.
    pub fn carries_appended_fields(&self) -> bool {
        self.appended_fields
            .is_some_and(crate::utils::json::is_truthy)
    }
}

/// Nested sub-record payload as it arrives in an appended field: JSON text that
/// still needs parsing, or a value already parsed upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestedPayload<'a> {
    Empty,
    RawText(&'a str),
    Parsed(&'a Value),
}

impl<'a> NestedPayload<'a> {
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            None => NestedPayload::Empty,
            Some(v) if !crate::utils::json::is_truthy(v) => NestedPayload::Empty,
            Some(Value::String(text)) => NestedPayload::RawText(text.as_str()),
            Some(v) => NestedPayload::Parsed(v),
        }
    }
}

/// One row of the verification report.
///
/// Field order is the column order of the CSV; the serde names are the header labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    #[serde(rename = "Transaction ID")]
    pub transaction_id: String,
    #[serde(rename = "Overall Status")]
    pub overall_status: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Business Name")]
    pub business_name: String,
    #[serde(rename = "Business Registration Number")]
    pub business_registration_number: String,
    #[serde(rename = "Tax ID Number")]
    pub tax_id_number: String,
    #[serde(rename = "Business Status")]
    pub business_status: String,
    #[serde(rename = "Legal Form")]
    pub legal_form: String,
    #[serde(rename = "Full Address")]
    pub full_address: String,
    #[serde(rename = "Incorporation Date")]
    pub incorporation_date: String,
    #[serde(rename = "Directors & Officers")]
    pub directors_and_officers: String,
    #[serde(rename = "Ownership")]
    pub ownership: String,
}

impl FlatRecord {
    pub const COLUMNS: [&'static str; 12] = [
        "Transaction ID",
        "Overall Status",
        "Country",
        "Business Name",
        "Business Registration Number",
        "Tax ID Number",
        "Business Status",
        "Legal Form",
        "Full Address",
        "Incorporation Date",
        "Directors & Officers",
        "Ownership",
    ];

    /// Cell values in column order.
    pub fn cells(&self) -> [&str; 12] {
        [
            self.transaction_id.as_str(),
            self.overall_status.as_str(),
            self.country.as_str(),
            self.business_name.as_str(),
            self.business_registration_number.as_str(),
            self.tax_id_number.as_str(),
            self.business_status.as_str(),
            self.legal_form.as_str(),
            self.full_address.as_str(),
            self.incorporation_date.as_str(),
            self.directors_and_officers.as_str(),
            self.ownership.as_str(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ReportResult {
    pub responses: Vec<RawResponse>,
    pub records: Vec<FlatRecord>,
    pub csv_output: String,
    pub dropped: usize,
}
