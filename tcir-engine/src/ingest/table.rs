//! Minimal CSV table reader
//!
//! Handles the subset of RFC 4180 produced by spreadsheet exports:
//! quoted fields with embedded commas, doubled quotes and line breaks,
//! LF or CRLF row endings, and a leading UTF-8 BOM.

/// Header plus data rows, each row tagged with its 1-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    /// Normalized header names (trimmed, lowercased)
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Line on which the row starts
    pub line: usize,
    pub fields: Vec<String>,
    /// A quoted field was never closed; fields are cut at its line end
    pub unterminated_quote: bool,
}

impl ParsedTable {
    /// Position of a normalized column name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

impl TableRow {
    /// Field at `index`, empty when the row is short
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

/// Header name normalization: trim then lowercase
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Split text into records of raw fields
fn split_records(text: &str) -> Vec<TableRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut offset = 0;
    let mut line = 1;
    while offset < text.len() {
        let (row, consumed, lines) = read_record(&text[offset..], line);
        records.push(row);
        offset += consumed;
        line += lines;
    }
    records
}

/// Where an open quoted field is cut if its closing quote never comes
struct QuoteCut {
    fields: Vec<String>,
    field: String,
    consumed: usize,
    lines: usize,
}

/// Read one record from the start of `text`
///
/// Returns the row, the bytes consumed and the line breaks consumed. A
/// quote still open at end of input is closed at the first line break
/// after it, and scanning resumes on the next line.
fn read_record(text: &str, line: usize) -> (TableRow, usize, usize) {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut lines = 0;
    let mut cut: Option<QuoteCut> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek().map(|(_, n)| *n) == Some('"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    cut = None;
                }
                '\n' => {
                    lines += 1;
                    if cut.is_none() {
                        cut = Some(QuoteCut {
                            fields: fields.clone(),
                            field: field.trim_end_matches('\r').to_string(),
                            consumed: pos + 1,
                            lines,
                        });
                    }
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek().map(|(_, n)| *n) == Some('\n') => {}
            '\n' => {
                fields.push(field);
                let row = TableRow {
                    line,
                    fields,
                    unterminated_quote: false,
                };
                return (row, pos + 1, lines + 1);
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        if let Some(mut cut) = cut {
            cut.fields.push(cut.field);
            let row = TableRow {
                line,
                fields: cut.fields,
                unterminated_quote: true,
            };
            return (row, cut.consumed, cut.lines);
        }
    }

    fields.push(field);
    let row = TableRow {
        line,
        fields,
        unterminated_quote: in_quotes,
    };
    (row, text.len(), lines)
}

/// Parse CSV text into a header and non-blank data rows
///
/// Returns `None` when the input holds no header row.
pub fn parse_table(text: &str) -> Option<ParsedTable> {
    let mut records = split_records(text)
        .into_iter()
        .filter(|r| !r.is_blank());
    let header_row = records.next()?;
    let header = header_row.fields.iter().map(|h| normalize_header(h)).collect();
    Some(ParsedTable {
        header,
        rows: records.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_normalized() {
        let table = parse_table(" Name , NS_T ,ha_t\nKim,55,48\n").unwrap();
        assert_eq!(table.header, vec!["name", "ns_t", "ha_t"]);
        assert_eq!(table.column("ns_t"), Some(1));
        assert_eq!(table.column("rd_t"), None);
    }

    #[test]
    fn test_quoted_fields() {
        let table = parse_table("name,note\n\"Kim, Minsu\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(table.rows[0].fields, vec!["Kim, Minsu", "said \"hi\""]);
    }

    #[test]
    fn test_embedded_newline_keeps_line_numbers() {
        let table = parse_table("name,note\n\"Kim\",\"two\nlines\"\nLee,x\n").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].get(1), "two\nlines");
        assert_eq!(table.rows[1].line, 4);
    }

    #[test]
    fn test_unterminated_quote_cut_at_line_end() {
        let table = parse_table("name,ns_t\n\"Kim,55\nLee,55\r\nPark,60\n").unwrap();
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows[0].unterminated_quote);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].fields, vec!["Kim,55"]);
        assert_eq!(table.rows[1].fields, vec!["Lee", "55"]);
        assert_eq!(table.rows[1].line, 3);
        assert!(!table.rows[1].unterminated_quote);
        assert_eq!(table.rows[2].fields, vec!["Park", "60"]);
        assert_eq!(table.rows[2].line, 4);
    }

    #[test]
    fn test_unterminated_quote_on_last_line() {
        let table = parse_table("name,note\nKim,\"open").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(table.rows[0].unterminated_quote);
        assert_eq!(table.rows[0].fields, vec!["Kim", "open"]);
    }

    #[test]
    fn test_crlf_and_bom() {
        let table = parse_table("\u{feff}name,ns_t\r\nKim,55\r\nLee,60").unwrap();
        assert_eq!(table.header, vec!["name", "ns_t"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].fields, vec!["Lee", "60"]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = parse_table("name,ns_t\n\nKim,55\n,\n").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 3);
    }

    #[test]
    fn test_short_row_reads_empty() {
        let table = parse_table("name,ns_t,ha_t\nKim,55\n").unwrap();
        assert_eq!(table.rows[0].get(2), "");
        assert_eq!(table.rows[0].get(9), "");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_table("").is_none());
        assert!(parse_table("\n\n").is_none());
    }
}
