use crate::domain::model::AppendedField;
use crate::utils::json::display_text;
use serde_json::Value;

/// First `Data` whose `FieldName` equals `field_name`.
///
/// `fields` is expected to be an `AppendedFields` list; any other shape simply has no match.
pub fn find_field_data<'a>(fields: &'a Value, field_name: &str) -> Option<&'a Value> {
    fields
        .as_array()?
        .iter()
        .filter_map(AppendedField::from_value)
        .find(|field| field.field_name == field_name)
        .map(|field| field.data)
}

/// Cell text of an appended field, or `default` when the field is absent.
pub fn find_field_text(fields: &Value, field_name: &str, default: &str) -> String {
    find_field_data(fields, field_name)
        .map(display_text)
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Value {
        json!([
            {"FieldName": "BusinessName", "Data": "Acme"},
            {"FieldName": "YearOfIncorporation", "Data": 2001},
            {"FieldName": "BusinessName", "Data": "Acme Duplicate"},
            {"Data": "orphan"}
        ])
    }

    #[test]
    fn test_first_match_wins() {
        let fields = fields();
        assert_eq!(find_field_data(&fields, "BusinessName"), Some(&json!("Acme")));
        assert_eq!(find_field_text(&fields, "BusinessName", ""), "Acme");
    }

    #[test]
    fn test_missing_field_uses_default() {
        let fields = fields();
        assert_eq!(find_field_data(&fields, "TaxIDNumber"), None);
        assert_eq!(find_field_text(&fields, "TaxIDNumber", ""), "");
        assert_eq!(find_field_text(&fields, "TaxIDNumber", "-"), "-");
    }

    #[test]
    fn test_non_list_input_is_silent() {
        assert_eq!(find_field_data(&json!(null), "BusinessName"), None);
        assert_eq!(find_field_data(&json!({"FieldName": "BusinessName"}), "BusinessName"), None);
        assert_eq!(find_field_text(&json!("text"), "BusinessName", ""), "");
    }

    #[test]
    fn test_non_string_data_is_rendered() {
        let fields = fields();
        assert_eq!(find_field_text(&fields, "YearOfIncorporation", ""), "2001");
    }
}
