//! Line-oriented CSV reader for sheet exports.
//!
//! Rows are split on line feeds before fields are read, so a quoted field never
//! spans two lines. Blank lines produce no row at all.

use std::iter::Peekable;
use std::str::Chars;

/// One parsed line: its fields in column order
pub type Row = Vec<String>;

/// Parse exported CSV text into rows of fields.
///
/// Unquoted fields are trimmed. Quoted fields keep their content verbatim,
/// with `""` read as a single literal quote. Anything between a closing quote
/// and the next comma is dropped.
pub fn parse_csv(text: &str) -> Vec<Row> {
    text.replace("\r\n", "\n")
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Row {
    let mut chars = line.chars().peekable();
    let mut row = Vec::new();

    loop {
        let field = if chars.peek() == Some(&'"') {
            chars.next();
            let value = read_quoted(&mut chars);
            // Tolerate junk after the closing quote
            while chars.next_if(|c| *c != ',').is_some() {}
            value
        } else {
            let mut raw = String::new();
            while let Some(c) = chars.next_if(|c| *c != ',') {
                raw.push(c);
            }
            raw.trim().to_string()
        };
        row.push(field);

        // Either the separating comma or end of line; a trailing comma ends
        // the row without adding a field
        if chars.next().is_none() || chars.peek().is_none() {
            break;
        }
    }

    row
}

/// Read a quoted field body, opening quote already consumed.
/// A quote left open closes at end of line.
fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c != '"' {
            value.push(c);
        } else if chars.next_if_eq(&'"').is_some() {
            value.push('"');
        } else {
            break;
        }
    }
    value
}
