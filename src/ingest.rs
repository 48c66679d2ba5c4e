//! Batch ingestion: semicolon-separated exports with a header row.
//!
//! Input is decoded as UTF-8 first and re-read as latin-1 when that fails,
//! which covers the two encodings the scraper has shipped. Rows with the
//! wrong field count are padded or truncated to the header width rather
//! than aborting the batch.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::error::IngestError;
use crate::records::RawRecord;

/// Header names the pipeline cannot run without.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Título",
    "Descripción",
    "Requerimientos",
    "Empresa",
    "Salario",
];

const SEPARATOR: char = ';';
const ATTEMPTED_ENCODINGS: &str = "utf-8, latin-1";

/// Decode a raw batch into records, header-mapped and width-normalized.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    let decoded = match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("batch is not valid utf-8, retrying as latin-1");
            Cow::Owned(bytes.iter().map(|&b| b as char).collect())
        }
    };
    parse_records(decoded.trim_start_matches('\u{feff}'))
}

/// Parse already-decoded text. Exposed separately so callers holding a
/// string do not pay the encoding detour.
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>, IngestError> {
    let mut rows = split_rows(text);
    if rows.is_empty() {
        return Err(IngestError::BatchDecode {
            attempted: ATTEMPTED_ENCODINGS,
        });
    }

    let header: Vec<String> = rows.remove(0).iter().map(|h| h.trim().to_string()).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !header.iter().any(|h| h == *required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns { missing });
    }

    let mut padded = 0usize;
    let mut truncated = 0usize;
    let mut records = Vec::with_capacity(rows.len());
    for mut fields in rows {
        if fields.len() < header.len() {
            padded += 1;
            fields.resize(header.len(), String::new());
        } else if fields.len() > header.len() {
            truncated += 1;
            fields.truncate(header.len());
        }

        let mut record = RawRecord::default();
        for (name, value) in header.iter().zip(fields) {
            match name.as_str() {
                "Título" => record.title = value,
                "Subtítulo" => record.subtitle = value,
                "Descripción" => record.description = value,
                "Requerimientos" => record.requirements = value,
                "Empresa" => record.company = value,
                "Jornada" => record.workday = value,
                "Tipo_Asistencia" => record.modality = value,
                "Salario" => record.salary_text = value,
                _ => {
                    record.extras.insert(name.clone(), value);
                }
            }
        }
        records.push(record);
    }

    if padded > 0 || truncated > 0 {
        warn!(padded, truncated, "normalized rows with a bad field count");
    }
    debug!(records = records.len(), "batch decoded");
    Ok(records)
}

/// Split into rows of fields. Double quotes fence fields that embed the
/// separator or line breaks; `""` inside a fenced field is a literal quote.
/// Rows with no content at all are dropped.
fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            SEPARATOR => row.push(std::mem::take(&mut field)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                end_row(&mut rows, &mut row, &mut field);
            }
            '\n' => end_row(&mut rows, &mut row, &mut field),
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        end_row(&mut rows, &mut row, &mut field);
    }
    rows
}

fn end_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String) {
    row.push(std::mem::take(field));
    if row.iter().any(|f| !f.trim().is_empty()) {
        rows.push(std::mem::take(row));
    } else {
        row.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Título;Subtítulo;Descripción;Requerimientos;Empresa;Jornada;Tipo_Asistencia;Salario;Región";

    #[test]
    fn maps_known_columns_and_extras() {
        let text = format!(
            "{HEADER}\ndev python;junior;desc;reqs;Acme;Completa;Remoto;S/ 2,500.00;Lima\n"
        );
        let records = parse_records(&text).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title, "dev python");
        assert_eq!(r.salary_text, "S/ 2,500.00");
        assert_eq!(r.extras.get("Región").map(String::as_str), Some("Lima"));
    }

    #[test]
    fn quoted_fields_keep_separators_and_breaks() {
        let text = format!("{HEADER}\n\"a;b\";s;\"line1\nline2\";r;\"Say \"\"hi\"\"\";j;m;;x\n");
        let records = parse_records(&text).unwrap();
        assert_eq!(records[0].title, "a;b");
        assert_eq!(records[0].description, "line1\nline2");
        assert_eq!(records[0].company, "Say \"hi\"");
    }

    #[test]
    fn short_rows_are_padded() {
        let text = format!("{HEADER}\nsolo titulo;;;;;;;\n");
        let records = parse_records(&text).unwrap();
        assert_eq!(records[0].title, "solo titulo");
        assert_eq!(records[0].salary_text, "");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = format!("{HEADER}\n\n;;;;;;;;\nt;s;d;r;e;j;m;sal;x\n\n");
        let records = parse_records(&text).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_required_columns_abort() {
        let err = parse_records("Título;Empresa\nx;y\n").unwrap_err();
        match err {
            IngestError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["Descripción", "Requerimientos", "Salario"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_aborts() {
        assert!(matches!(
            parse_records(""),
            Err(IngestError::BatchDecode { .. })
        ));
    }

    #[test]
    fn latin1_bytes_decode_on_retry() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"T\xedtulo;Descripci\xf3n;Requerimientos;Empresa;Salario\n");
        bytes.extend_from_slice(b"ingeniero;dise\xf1o;reqs;Acme;1500\n");
        let records = decode_batch(&bytes).unwrap();
        assert_eq!(records[0].description, "diseño");
    }

    #[test]
    fn bom_does_not_hide_the_first_header() {
        let text = format!("\u{feff}{HEADER}\nt;s;d;r;e;j;m;sal;x\n");
        let records = decode_batch(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }
}
