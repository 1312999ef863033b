use crate::domain::model::FlatRecord;
use crate::utils::error::{EtlError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::borrow::Cow;

/// Quotes a cell holding a comma, a double quote or `\n`, doubling inner quotes.
/// Anything else, a lone `\r` included, is written as is.
pub fn escape_cell(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

/// Renders the report as CSV text.
///
/// Columns follow `FlatRecord::COLUMNS`. Cells are escaped by `escape_cell` and the
/// writer itself never adds quotes. Lines are joined with `\n` and the text has no
/// trailing newline. An empty slice gives an empty string, not a lone header.
pub fn to_csv(records: &[FlatRecord]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(FlatRecord::COLUMNS.map(|label| escape_cell(label).into_owned()))?;
    for record in records {
        writer.write_record(record.cells().map(|cell| escape_cell(cell).into_owned()))?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV writer: {}", e.error()),
    })?;
    let mut text = String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })?;

    if text.ends_with('\n') {
        text.pop();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> FlatRecord {
        FlatRecord {
            transaction_id: id.to_string(),
            ..FlatRecord::default()
        }
    }

    #[test]
    fn test_empty_input_is_empty_string() {
        assert_eq!(to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_header_order_and_no_trailing_newline() {
        let csv = to_csv(&[record("T1"), record("T2")]).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], FlatRecord::COLUMNS.join(","));
        assert_eq!(lines[1], "T1,,,,,,,,,,,");
        assert_eq!(lines[2], "T2,,,,,,,,,,,");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_header_quotes_nothing() {
        let csv = to_csv(&[record("T1")]).unwrap();
        assert!(csv.starts_with(
            "Transaction ID,Overall Status,Country,Business Name,Business Registration Number,\
             Tax ID Number,Business Status,Legal Form,Full Address,Incorporation Date,\
             Directors & Officers,Ownership\n"
        ));
    }

    #[test]
    fn test_cell_escaping() {
        let mut row = record("T1");
        row.directors_and_officers = "Smith, John \"Boss\"\nCEO".to_string();
        row.business_name = "Plain Name".to_string();
        row.full_address = "1 Main St, Springfield".to_string();

        let csv = to_csv(&[row]).unwrap();
        let body = csv.split_once('\n').map(|(_, rest)| rest).unwrap();

        assert_eq!(
            body,
            "T1,,,Plain Name,,,,,\"1 Main St, Springfield\",,\"Smith, John \"\"Boss\"\"\nCEO\","
        );
    }

    #[test]
    fn test_multiline_cell_at_row_end_keeps_closing_quote() {
        let mut row = record("T1");
        row.ownership = "A (UBO)\nB (Shareholder)".to_string();

        let csv = to_csv(&[row]).unwrap();
        assert!(csv.ends_with("\"A (UBO)\nB (Shareholder)\""));
    }

    #[test]
    fn test_carriage_return_alone_is_not_quoted() {
        let mut row = record("T1");
        row.business_name = "Line 1\rLine 2".to_string();

        let csv = to_csv(&[row]).unwrap();
        let body = csv.split_once('\n').map(|(_, rest)| rest).unwrap();
        assert_eq!(body, "T1,,,Line 1\rLine 2,,,,,,,,");
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("Acme"), "Acme");
        assert_eq!(escape_cell(""), "");
        assert_eq!(escape_cell("a,b"), "\"a,b\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("a\nb"), "\"a\nb\"");
    }
}
