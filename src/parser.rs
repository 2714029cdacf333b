// 📥 Import Converter - SWIFT code spreadsheet (xlsx workbook or CSV export)
//    → normalized SWIFT code records
//
// Expected header row (extra columns are ignored):
//   SWIFT CODE, NAME, ADDRESS, COUNTRY ISO2 CODE, COUNTRY NAME
//
// Each row is converted independently. A bad row is skipped with a warning
// and never aborts the rest of the file.

use calamine::{open_workbook_auto, Data, Reader};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::codes;
use crate::db::{NewSwiftCode, StoreError};
use crate::operations;

pub const COL_SWIFT_CODE: &str = "SWIFT CODE";
pub const COL_NAME: &str = "NAME";
pub const COL_ADDRESS: &str = "ADDRESS";
pub const COL_COUNTRY_ISO2: &str = "COUNTRY ISO2 CODE";
pub const COL_COUNTRY_NAME: &str = "COUNTRY NAME";

const REQUIRED_COLUMNS: [&str; 5] = [
    COL_SWIFT_CODE,
    COL_NAME,
    COL_ADDRESS,
    COL_COUNTRY_ISO2,
    COL_COUNTRY_NAME,
];

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Import file not found at path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read import file {}: {}", .path.display(), .reason)]
    Malformed { path: PathBuf, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of converting one source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Parsed(NewSwiftCode),
    Skipped { line: u64, reason: String },
}

/// Parsed rows in source order, plus how many were dropped
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub records: Vec<NewSwiftCode>,
    pub skipped: usize,
}

/// Counts for a full parse + bulk insert run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub parsed: usize,
    pub skipped: usize,
    pub inserted: usize,
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    swift_code: usize,
    name: usize,
    address: usize,
    country_iso2: usize,
    country_name: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, String> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| format!("missing required column '{}'", column))
        };

        Ok(ColumnMap {
            swift_code: find(COL_SWIFT_CODE)?,
            name: find(COL_NAME)?,
            address: find(COL_ADDRESS)?,
            country_iso2: find(COL_COUNTRY_ISO2)?,
            country_name: find(COL_COUNTRY_NAME)?,
        })
    }
}

/// Normalize one row: code kept as-is, country fields upper-cased,
/// headquarter flag derived from the "XXX" suffix.
fn convert_row(columns: &ColumnMap, record: &csv::StringRecord, line: u64) -> RowOutcome {
    let field = |idx: usize, column: &str| -> Result<String, String> {
        match record.get(idx).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            Some(_) => Err(format!("empty value in column '{}'", column)),
            None => Err(format!("missing column '{}'", column)),
        }
    };

    let converted = (|| -> Result<NewSwiftCode, String> {
        let swift_code = field(columns.swift_code, COL_SWIFT_CODE)?;
        let is_headquarter = codes::is_headquarter_code(&swift_code);

        Ok(NewSwiftCode {
            swift_code,
            bank_name: field(columns.name, COL_NAME)?,
            address: field(columns.address, COL_ADDRESS)?,
            country_iso2: field(columns.country_iso2, COL_COUNTRY_ISO2)?.to_uppercase(),
            country_name: field(columns.country_name, COL_COUNTRY_NAME)?.to_uppercase(),
            is_headquarter,
        })
    })();

    match converted {
        Ok(code) => RowOutcome::Parsed(code),
        Err(reason) => RowOutcome::Skipped { line, reason },
    }
}

/// Extensions read as workbooks; anything else is treated as CSV
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn is_workbook(file_path: &Path) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

fn malformed(file_path: &Path, reason: impl ToString) -> ImportError {
    ImportError::Malformed {
        path: file_path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Fold row outcomes into a report, logging each skipped row
fn collect_rows(file_path: &Path, outcomes: impl Iterator<Item = RowOutcome>) -> ImportReport {
    let mut report = ImportReport::default();

    for outcome in outcomes {
        match outcome {
            RowOutcome::Parsed(code) => report.records.push(code),
            RowOutcome::Skipped { line, reason } => {
                tracing::warn!(line, %reason, "skipping invalid row");
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        file = %file_path.display(),
        parsed = report.records.len(),
        skipped = report.skipped,
        "parsed SWIFT code file"
    );

    report
}

/// Parse a SWIFT code file, choosing the reader by extension
/// (.xlsx/.xlsm/.xlsb/.xls/.ods as a workbook, anything else as CSV)
pub fn parse_swift_file(file_path: &Path) -> Result<ImportReport, ImportError> {
    if is_workbook(file_path) {
        parse_swift_sheet(file_path)
    } else {
        parse_swift_csv(file_path)
    }
}

/// Parse the first worksheet of a SWIFT code workbook
pub fn parse_swift_sheet(file_path: &Path) -> Result<ImportReport, ImportError> {
    if !file_path.is_file() {
        return Err(ImportError::NotFound(file_path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(file_path).map_err(|e| malformed(file_path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| malformed(file_path, "workbook has no sheets"))?
        .map_err(|e| malformed(file_path, e))?;

    let mut rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<String>>()
    });

    let headers = rows
        .next()
        .map(csv::StringRecord::from)
        .ok_or_else(|| malformed(file_path, "no header row"))?;
    let columns = ColumnMap::from_headers(&headers).map_err(|e| malformed(file_path, e))?;

    // header is sheet line 1
    let outcomes = rows.enumerate().map(|(idx, cells)| {
        convert_row(&columns, &csv::StringRecord::from(cells), idx as u64 + 2)
    });

    Ok(collect_rows(file_path, outcomes))
}

/// Parse a SWIFT code CSV export
pub fn parse_swift_csv(file_path: &Path) -> Result<ImportReport, ImportError> {
    if !file_path.is_file() {
        return Err(ImportError::NotFound(file_path.to_path_buf()));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(file_path)
        .map_err(|e| malformed(file_path, e))?;

    let headers = rdr.headers().map_err(|e| malformed(file_path, e))?.clone();
    if headers.is_empty() {
        return Err(malformed(file_path, "no header row"));
    }
    let columns = ColumnMap::from_headers(&headers).map_err(|e| malformed(file_path, e))?;

    let outcomes = rdr.records().map(|result| match result {
        Ok(record) => {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            convert_row(&columns, &record, line)
        }
        Err(e) => RowOutcome::Skipped {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        },
    });

    Ok(collect_rows(file_path, outcomes))
}

/// Parse a file and bulk insert its rows
pub fn import_file(conn: &mut Connection, file_path: &Path) -> Result<ImportSummary, ImportError> {
    let report = parse_swift_file(file_path)?;
    let inserted = operations::bulk_insert(conn, &report.records)?;

    Ok(ImportSummary {
        parsed: report.records.len(),
        skipped: report.skipped,
        inserted,
    })
}

/// Startup preload: import `file_path` if it exists.
///
/// Never fails; a missing file or a failed import is logged and the store is
/// left as it was.
pub fn preload_if_present(conn: &mut Connection, file_path: &Path) -> Option<ImportSummary> {
    if !file_path.exists() {
        tracing::info!(file = %file_path.display(), "no data file found, skipping preload");
        return None;
    }

    match import_file(conn, file_path) {
        Ok(summary) => {
            tracing::info!(
                parsed = summary.parsed,
                skipped = summary.skipped,
                inserted = summary.inserted,
                "preloaded SWIFT codes"
            );
            Some(summary)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to preload SWIFT code data");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rust_xlsxwriter::Workbook;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn write_xlsx(rows: &[&[&str]]) -> NamedTempFile {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save(file.path()).unwrap();

        file
    }

    const SHEET_HEADER: &[&str] = &[
        "COUNTRY ISO2 CODE",
        "SWIFT CODE",
        "CODE TYPE",
        "NAME",
        "ADDRESS",
        "TOWN NAME",
        "COUNTRY NAME",
        "TIME ZONE",
    ];

    const SAMPLE: &str = "\
COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE
us,AAAAUS33XXX,BIC11,Alpha Bank,1 Wall Street,NEW YORK,united states,America/New_York
BB,AAAABB33,BIC11,Alpha Barbados,Bridgetown Road,BRIDGETOWN,Barbados,America/Barbados
PL,BBBBPLPWXXX,BIC11,Beta Bank,Marszalkowska 1,WARSZAWA,POLAND,Europe/Warsaw
";

    #[test]
    fn test_parse_normalizes_rows() {
        let file = write_csv(SAMPLE);
        let report = parse_swift_csv(file.path()).unwrap();

        assert_eq!(report.skipped, 0);
        assert_eq!(report.records.len(), 3);

        let hq = &report.records[0];
        assert_eq!(hq.swift_code, "AAAAUS33XXX");
        assert_eq!(hq.bank_name, "Alpha Bank");
        assert_eq!(hq.country_iso2, "US");
        assert_eq!(hq.country_name, "UNITED STATES");
        assert!(hq.is_headquarter);

        let branch = &report.records[1];
        assert_eq!(branch.swift_code, "AAAABB33");
        assert_eq!(branch.country_name, "BARBADOS");
        assert!(!branch.is_headquarter);
    }

    #[test]
    fn test_parse_keeps_code_case() {
        let file = write_csv(
            "SWIFT CODE,NAME,ADDRESS,COUNTRY ISO2 CODE,COUNTRY NAME\n\
             aaaaus33xxx,Lower Bank,Somewhere,us,united states\n",
        );
        let report = parse_swift_csv(file.path()).unwrap();

        assert_eq!(report.records[0].swift_code, "aaaaus33xxx");
        // suffix test is literal, so a lower-case code is not a headquarter
        assert!(!report.records[0].is_headquarter);
    }

    #[test]
    fn test_bad_rows_are_skipped_in_order() {
        let file = write_csv(
            "SWIFT CODE,NAME,ADDRESS,COUNTRY ISO2 CODE,COUNTRY NAME\n\
             AAAAUS33XXX,Alpha,Addr 1,US,UNITED STATES\n\
             BBBBUS33XXX,,Addr 2,US,UNITED STATES\n\
             CCCCUS33XXX,Gamma\n\
             DDDDUS33XXX,Delta,Addr 4,US,UNITED STATES\n",
        );
        let report = parse_swift_csv(file.path()).unwrap();

        let codes: Vec<&str> = report.records.iter().map(|r| r.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["AAAAUS33XXX", "DDDDUS33XXX"]);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_convert_row_reports_reason() {
        let headers = csv::StringRecord::from(REQUIRED_COLUMNS.to_vec());
        let columns = ColumnMap::from_headers(&headers).unwrap();
        let row = csv::StringRecord::from(vec!["AAAAUS33XXX", "Alpha"]);

        match convert_row(&columns, &row, 7) {
            RowOutcome::Skipped { line, reason } => {
                assert_eq!(line, 7);
                assert!(reason.contains(COL_ADDRESS));
            }
            other => panic!("expected skipped row, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = parse_swift_csv(Path::new("/nonexistent/swift_codes.csv")).unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[test]
    fn test_missing_required_header_is_malformed() {
        let file = write_csv("CODE,NAME\nAAAAUS33XXX,Alpha\n");
        let err = parse_swift_csv(file.path()).unwrap_err();

        match err {
            ImportError::Malformed { reason, .. } => assert!(reason.contains(COL_SWIFT_CODE)),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_is_malformed() {
        let file = write_csv("");
        let err = parse_swift_csv(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::Malformed { .. }));
    }

    #[test]
    fn test_preload_missing_file_is_skipped() {
        let mut conn = db::tests::memory_db();
        let summary = preload_if_present(&mut conn, Path::new("/nonexistent/swift_codes.csv"));

        assert!(summary.is_none());
        assert_eq!(db::count_codes(&conn).unwrap(), 0);
    }

    #[test]
    fn test_preload_malformed_file_keeps_existing_data() {
        let mut conn = db::tests::memory_db();
        db::insert(&conn, &db::tests::new_code("AAAAUS33XXX", "US", true)).unwrap();
        let file = write_csv("not,a,swift,export\n1,2,3,4\n");

        assert!(preload_if_present(&mut conn, file.path()).is_none());
        assert_eq!(db::count_codes(&conn).unwrap(), 1);
    }

    #[test]
    fn test_import_file_twice_inserts_nothing_new() {
        let file = write_csv(SAMPLE);
        let mut conn = db::tests::memory_db();

        let first = import_file(&mut conn, file.path()).unwrap();
        let second = import_file(&mut conn, file.path()).unwrap();

        assert_eq!(first, ImportSummary { parsed: 3, skipped: 0, inserted: 3 });
        assert_eq!(second.inserted, 0);
        assert_eq!(db::count_codes(&conn).unwrap(), 3);
    }

    #[test]
    fn test_parse_xlsx_normalizes_rows() {
        let file = write_xlsx(&[
            SHEET_HEADER,
            &["us", "AAAAUS33XXX", "BIC11", "Alpha Bank", "1 Wall Street", "NEW YORK", "united states", "America/New_York"],
            &["BB", "AAAABB33", "BIC11", "Alpha Barbados", "Bridgetown Road", "BRIDGETOWN", "Barbados", "America/Barbados"],
            &["PL", "BBBBPLPWXXX", "BIC11", "Beta Bank", "Marszalkowska 1", "WARSZAWA", "POLAND", "Europe/Warsaw"],
        ]);

        let report = parse_swift_file(file.path()).unwrap();

        assert_eq!(report.skipped, 0);
        assert_eq!(report.records.len(), 3);

        let hq = &report.records[0];
        assert_eq!(hq.swift_code, "AAAAUS33XXX");
        assert_eq!(hq.bank_name, "Alpha Bank");
        assert_eq!(hq.country_iso2, "US");
        assert_eq!(hq.country_name, "UNITED STATES");
        assert!(hq.is_headquarter);

        assert_eq!(report.records[1].swift_code, "AAAABB33");
        assert!(!report.records[1].is_headquarter);
        assert_eq!(report.records[2].country_name, "POLAND");
    }

    #[test]
    fn test_xlsx_rows_missing_values_are_skipped() {
        let file = write_xlsx(&[
            &["SWIFT CODE", "NAME", "ADDRESS", "COUNTRY ISO2 CODE", "COUNTRY NAME"],
            &["AAAAUS33XXX", "Alpha", "Addr 1", "US", "UNITED STATES"],
            &["BBBBUS33XXX", "Beta"],
            &["CCCCUS33XXX", "Gamma", "Addr 3", "US", "UNITED STATES"],
        ]);

        let report = parse_swift_sheet(file.path()).unwrap();

        let codes: Vec<&str> = report.records.iter().map(|r| r.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["AAAAUS33XXX", "CCCCUS33XXX"]);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_xlsx_missing_required_header_is_malformed() {
        let file = write_xlsx(&[&["CODE", "NAME"], &["AAAAUS33XXX", "Alpha"]]);

        match parse_swift_file(file.path()).unwrap_err() {
            ImportError::Malformed { reason, .. } => assert!(reason.contains(COL_SWIFT_CODE)),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_workbook_is_malformed() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"this is not a zip archive").unwrap();
        file.flush().unwrap();

        let err = parse_swift_file(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::Malformed { .. }));
    }

    #[test]
    fn test_missing_workbook_is_not_found() {
        let err = parse_swift_file(Path::new("/nonexistent/swift_codes.xlsx")).unwrap_err();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[test]
    fn test_reader_chosen_by_extension() {
        assert!(is_workbook(Path::new("data/Interns_2025_SWIFT_CODES.xlsx")));
        assert!(is_workbook(Path::new("codes.XLSX")));
        assert!(!is_workbook(Path::new("codes.csv")));
        assert!(!is_workbook(Path::new("codes")));

        // a CSV path still goes through the CSV reader
        let file = write_csv(SAMPLE);
        assert_eq!(parse_swift_file(file.path()).unwrap().records.len(), 3);
    }

    #[test]
    fn test_import_workbook_twice_inserts_nothing_new() {
        let file = write_xlsx(&[
            &["SWIFT CODE", "NAME", "ADDRESS", "COUNTRY ISO2 CODE", "COUNTRY NAME"],
            &["AAAAUS33XXX", "Alpha", "Addr 1", "US", "UNITED STATES"],
            &["AAAAUS33001", "Alpha Branch", "Addr 2", "US", "UNITED STATES"],
        ]);
        let mut conn = db::tests::memory_db();

        let first = import_file(&mut conn, file.path()).unwrap();
        let second = import_file(&mut conn, file.path()).unwrap();

        assert_eq!(first.inserted, 2);
        assert_eq!(second.inserted, 0);

        let branch = db::find_by_code(&conn, "AAAAUS33001").unwrap().unwrap();
        assert!(!branch.is_headquarter);
    }
}
