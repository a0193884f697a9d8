// src/fetch/parse.rs

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{DashError, DashResult};
use crate::table::Table;

/// Cell texts read as "no value": the usual spreadsheet and dataframe
/// spellings of a missing or error cell. Matched exactly, case included.
static MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parse comma-delimited text into a `Table`.
///
/// The first record is the header row and is kept verbatim (no trimming).
/// Empty fields and missing markers (`#N/A`, `NaN`, `null`, ...) become absent
/// cells, short rows are padded with absent cells, and a row wider than the
/// header is rejected.
pub fn parse_table(text: &str) -> DashResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(String::from).collect(),
        None => return Err(DashError::format("empty body: no header row")),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(DashError::format(format!(
                "line {}: {} fields but the header has {}",
                line,
                record.len(),
                headers.len()
            )));
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|field| (!is_missing(field)).then(|| field.to_string()))
            .collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "parsed table");
    Ok(Table::new(headers, rows))
}

fn is_missing(field: &str) -> bool {
    MISSING_MARKERS.contains(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_parse_basic_table() {
        let table = parse_table("Total Registered,Visitors\n10,5\n12,7\n").unwrap();
        assert_eq!(table.headers, vec!["Total Registered", "Visitors"]);
        assert_eq!(
            table.rows,
            vec![vec![cell("10"), cell("5")], vec![cell("12"), cell("7")]]
        );
    }

    #[test]
    fn test_headers_are_not_trimmed() {
        let table = parse_table(" Visitors ,Total Registered\n5,10\n").unwrap();
        assert_eq!(table.headers[0], " Visitors ");
    }

    #[test]
    fn test_empty_fields_are_absent() {
        let table = parse_table("a,b,c\n1,,3\n").unwrap();
        assert_eq!(table.rows[0], vec![cell("1"), None, cell("3")]);
    }

    #[test]
    fn test_missing_markers_are_absent() {
        let table = parse_table("a,b,c,d,e\n#N/A,NaN,null,N/A,NA\n").unwrap();
        assert_eq!(table.rows[0], vec![None::<String>; 5]);
    }

    #[test]
    fn test_marker_lookalikes_are_kept() {
        let table = parse_table("a,b,c\n #N/A,Nan,NAB\n").unwrap();
        assert_eq!(table.rows[0], vec![cell(" #N/A"), cell("Nan"), cell("NAB")]);
    }

    #[test]
    fn test_short_row_is_padded() {
        let table = parse_table("a,b,c\n1\n").unwrap();
        assert_eq!(table.rows[0], vec![cell("1"), None, None]);
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let table = parse_table("Amount,Note\n\"1,200\",\"ok\"\n").unwrap();
        assert_eq!(table.rows[0], vec![cell("1,200"), cell("ok")]);
    }

    #[test]
    fn test_header_only_gives_zero_rows() {
        let table = parse_table("a,b\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_body_is_format_error() {
        let err = parse_table("").unwrap_err();
        assert!(matches!(err, DashError::Format { .. }));
    }

    #[test]
    fn test_wide_row_is_format_error() {
        let err = parse_table("a,b\n1,2\n1,2,3\n").unwrap_err();
        match err {
            DashError::Format { message } => assert!(message.contains("3 fields")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
