//! The on-disk table format used by `LOAD`/`DUMP` (spec.md §6.3).
//!
//! Grounded on `examples/original_source/src/db/Database.cpp`'s
//! `readTable`/`writeTable` pair: header line `name\tfieldCount`, a `KEY`-led
//! field line, then one row per line. `DUMP` right-aligns every column to a
//! fixed 10-character field; `LOAD` tolerates arbitrary leading whitespace.

use std::io::{BufRead, Write};

use crate::error::FileFormatError;
use crate::table::{Table, KEY};
use crate::value::{parse_int_literal, Value};

const COLUMN_WIDTH: usize = 10;

/// Parses a table in the LOAD file format from `reader`. `source` names the
/// stream for error messages (typically the file path).
pub fn load_table_from_reader(
    mut reader: impl BufRead,
    source: &str,
) -> Result<Table, FileFormatError> {
    let mut header = String::new();
    reader.read_line(&mut header)?;
    let mut header_parts = header.trim_end_matches(['\n', '\r']).splitn(2, '\t');
    let name = header_parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(source, "missing table name in header"))?;
    let field_count: usize = header_parts
        .next()
        .ok_or_else(|| malformed(source, "missing field count in header"))?
        .trim()
        .parse()
        .map_err(|_| malformed(source, "field count is not an integer"))?;
    if field_count == 0 {
        return Err(malformed(source, "field count must include the KEY column"));
    }

    let mut field_line = String::new();
    reader.read_line(&mut field_line)?;
    let mut field_tokens = field_line.split_whitespace();
    match field_tokens.next() {
        Some(KEY) => {}
        _ => return Err(malformed(source, "field line must start with KEY")),
    }
    let fields: Vec<String> = field_tokens.map(str::to_string).collect();
    if fields.len() != field_count - 1 {
        return Err(malformed(source, "field line does not match declared field count"));
    }

    let mut table = Table::new(name, fields)
        .map_err(|e| malformed(source, &e.to_string()))?;

    let mut batch = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        let mut tokens = line.split_whitespace();
        let key = tokens
            .next()
            .ok_or_else(|| malformed(source, "empty row"))?
            .to_string();
        let values: Vec<Value> = tokens.map(parse_int_literal).collect();
        if values.len() != field_count - 1 {
            return Err(malformed(source, &format!("row \"{key}\" has the wrong arity")));
        }
        batch.push((key, values));
    }
    table
        .insert_batch(batch)
        .map_err(|e| malformed(source, &e.to_string()))?;
    Ok(table)
}

/// Writes `table` in the LOAD file format to `writer`, columns right-aligned
/// to [`COLUMN_WIDTH`].
pub fn dump_table_to_writer(table: &Table, mut writer: impl Write) -> std::io::Result<()> {
    writeln!(writer, "{}\t{}", table.name(), table.arity() + 1)?;

    write!(writer, "{:>width$}", KEY, width = COLUMN_WIDTH)?;
    for field in table.fields() {
        write!(writer, "{:>width$}", field, width = COLUMN_WIDTH)?;
    }
    writeln!(writer)?;

    for row in table.iter() {
        write!(writer, "{:>width$}", row.key, width = COLUMN_WIDTH)?;
        for cell in &row.cells {
            write!(writer, "{:>width$}", cell, width = COLUMN_WIDTH)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn malformed(source: &str, reason: &str) -> FileFormatError {
    FileFormatError::Malformed { source_name: source.to_string(), reason: reason.to_string() }
}
