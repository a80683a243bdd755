//! CSV tokenizer with quoting, escaping and encoding detection.
//!
//! Turns text into rows of trimmed string cells. No game-specific logic
//! here; see [`crate::validation`] for the table grammar.
//!
//! # Grammar
//!
//! - One record per physical line. Blank lines yield no record.
//! - `,` separates cells. A row has one more cell than it has separators.
//! - `\` starts an escape expression (see [`crate::escape`]), inside or
//!   outside quotes.
//! - `'` or `"` may open a quoted cell only as its first character. Inside
//!   quotes the other quote character and `,` are literal. After the
//!   closing quote only whitespace may precede the next separator.
//! - Unquoted cells are trimmed, quoted cells are kept verbatim.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read};

use crate::error::{CsvError, CsvErrorKind, CsvResult};
use crate::escape::{expand_code, ESCAPE};

pub const SINGLE_QUOTE: char = '\'';
pub const DOUBLE_QUOTE: char = '"';
pub const SEPARATOR: char = ',';

/// One parsed record.
pub type CsvRow = Vec<String>;

/// All records of one input, in file order.
pub type CsvTable = Vec<CsvRow>;

/// Number of lines that precede the parsed text in its source.
///
/// Only used to report error positions: line `n` of the text is
/// reported as line `offset + n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOffset(usize);

impl LineOffset {
    pub fn new(lines: usize) -> Self {
        Self(lines)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for LineOffset {
    type Error = CsvErrorKind;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map(LineOffset)
            .map_err(|_| CsvErrorKind::NegativeStartingLine(value))
    }
}

/// Result of parsing raw bytes, with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub rows: CsvTable,
    /// Detected or forced encoding
    pub encoding: String,
}

// =============================================================================
// Encoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        // chardet reports Windows-1252 text as ISO-8859-1; the superset
        // keeps 0x80-0x9F printable (curly quotes, dashes).
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            "windows-1252".to_string()
        }
        "iso-8859-15" => "iso-8859-15".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes using the given encoding label.
///
/// Returns the text and the name of the encoding actually used, which
/// differs from the label when a BOM overrides it. A leading BOM is
/// dropped. Malformed sequences become U+FFFD.
pub fn decode_content(bytes: &[u8], encoding: &str, origin: &str) -> CsvResult<(String, String)> {
    let encoding = encoding_rs::Encoding::for_label(encoding.trim().as_bytes()).ok_or_else(|| {
        CsvError::new(
            origin,
            0,
            0,
            CsvErrorKind::Encoding(format!("unsupported encoding '{}'", encoding)),
        )
    })?;
    let (text, used, _) = encoding.decode(bytes);
    Ok((text.into_owned(), used.name().to_lowercase()))
}

/// Decode bytes with the detected encoding, falling back to lossy UTF-8
/// when the detected charset is unknown to `encoding_rs`.
pub fn decode_auto(bytes: &[u8], origin: &str) -> (String, String) {
    let encoding = detect_encoding(bytes);
    match decode_content(bytes, &encoding, origin) {
        Ok(decoded) => decoded,
        Err(_) => {
            let (text, _, _) = encoding_rs::UTF_8.decode(bytes);
            (text.into_owned(), "utf-8".to_string())
        }
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellState {
    /// Nothing but whitespace read for this cell.
    Start,
    Unquoted,
    Quoted(char),
    /// Closing quote seen, expecting a separator or line end.
    Closed,
}

fn is_quote(c: char) -> bool {
    c == SINGLE_QUOTE || c == DOUBLE_QUOTE
}

/// Accumulates one cell. `keep` marks the end of the last character that
/// survives trimming, so escaped whitespace is never trimmed away.
#[derive(Default)]
struct CellBuffer {
    text: String,
    keep: usize,
}

impl CellBuffer {
    fn push_literal(&mut self, c: char) {
        self.text.push(c);
        if !c.is_whitespace() {
            self.keep = self.text.len();
        }
    }

    fn push_kept(&mut self, c: char) {
        self.text.push(c);
        self.keep = self.text.len();
    }

    fn finish(&mut self, state: CellState) -> String {
        if state == CellState::Unquoted {
            self.text.truncate(self.keep);
        }
        self.keep = 0;
        std::mem::take(&mut self.text)
    }
}

/// Parse a single physical line.
///
/// `line_number` is the 1-based number used in errors. Returns `None` for
/// a blank line.
pub fn parse_line(line: &str, origin: &str, line_number: usize) -> CsvResult<Option<CsvRow>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let err = |column: usize, kind: CsvErrorKind| CsvError::new(origin, line_number, column, kind);

    let mut row = Vec::new();
    let mut cell = CellBuffer::default();
    let mut state = CellState::Start;
    let mut chars = line.chars().enumerate().map(|(i, c)| (i + 1, c));

    while let Some((column, c)) = chars.next() {
        if c == ESCAPE && state != CellState::Closed {
            let (code_column, code) = chars
                .next()
                .ok_or_else(|| err(column + 1, CsvErrorKind::UnterminatedLine))?;
            let expanded = expand_code(code)
                .ok_or_else(|| err(code_column, CsvErrorKind::UnknownEscapeCode(code)))?;
            cell.push_kept(expanded);
            if state == CellState::Start {
                state = CellState::Unquoted;
            }
            continue;
        }

        state = match state {
            CellState::Start if c == SEPARATOR => {
                row.push(cell.finish(state));
                CellState::Start
            }
            CellState::Start if is_quote(c) => CellState::Quoted(c),
            CellState::Start if c.is_whitespace() => CellState::Start,
            CellState::Start => {
                cell.push_literal(c);
                CellState::Unquoted
            }
            CellState::Unquoted if c == SEPARATOR => {
                row.push(cell.finish(state));
                CellState::Start
            }
            CellState::Unquoted if is_quote(c) => {
                return Err(err(column, CsvErrorKind::IllegalQuoteInCell(c)));
            }
            CellState::Unquoted => {
                cell.push_literal(c);
                CellState::Unquoted
            }
            CellState::Quoted(quote) if c == quote => CellState::Closed,
            CellState::Quoted(quote) => {
                cell.push_kept(c);
                CellState::Quoted(quote)
            }
            CellState::Closed if c == SEPARATOR => {
                row.push(cell.finish(state));
                CellState::Start
            }
            CellState::Closed if c.is_whitespace() => CellState::Closed,
            CellState::Closed => {
                return Err(err(column, CsvErrorKind::UnexpectedCharacterAfterQuote(c)));
            }
        };
    }

    if let CellState::Quoted(_) = state {
        return Err(err(line.chars().count() + 1, CsvErrorKind::UnterminatedLine));
    }
    row.push(cell.finish(state));

    Ok(Some(row))
}

/// Parse CSV text.
///
/// # Example
/// ```
/// use assoc::parser::{parse_str, LineOffset};
///
/// let rows = parse_str("a,\"b,c\",d\n", "inline", LineOffset::default()).unwrap();
/// assert_eq!(rows, vec![vec!["a", "b,c", "d"]]);
/// ```
pub fn parse_str(content: &str, origin: &str, offset: LineOffset) -> CsvResult<CsvTable> {
    let mut rows = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if let Some(row) = parse_line(line, origin, offset.get().saturating_add(idx + 1))? {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Parse CSV from a UTF-8 reader.
pub fn parse<R: Read>(reader: R, origin: &str, offset: LineOffset) -> CsvResult<CsvTable> {
    let buf = BufReader::new(reader);
    let mut rows = Vec::new();

    for (idx, line_result) in buf.lines().enumerate() {
        let line_number = offset.get().saturating_add(idx + 1);
        let line = line_result.map_err(|e| {
            CsvError::new(origin, line_number, 0, CsvErrorKind::Io(e.to_string()))
        })?;

        if let Some(row) = parse_line(&line, origin, line_number)? {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Parse raw bytes, decoding them first.
///
/// With `encoding` unset the encoding is auto-detected.
pub fn parse_bytes(
    bytes: &[u8],
    encoding: Option<&str>,
    origin: &str,
    offset: LineOffset,
) -> CsvResult<ParseResult> {
    let (content, encoding) = match encoding {
        Some(label) => decode_content(bytes, label, origin)?,
        None => decode_auto(bytes, origin),
    };

    let rows = parse_str(&content, origin, offset)?;
    Ok(ParseResult { rows, encoding })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(csv: &str) -> CsvTable {
        parse_str(csv, "test", LineOffset::default()).unwrap()
    }

    fn error(csv: &str) -> CsvError {
        parse_str(csv, "test", LineOffset::default()).unwrap_err()
    }

    #[test]
    fn test_quoted_separator() {
        assert_eq!(rows("a,\"b,c\",d\n"), vec![vec!["a", "b,c", "d"]]);
    }

    #[test]
    fn test_escaped_separator() {
        assert_eq!(rows("x\\,y,z\n"), vec![vec!["x,y", "z"]]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = rows("a,b\n    \n\nc,d\n");
        assert_eq!(table, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_trimming() {
        assert_eq!(rows("  a  ,\tb c\t, "), vec![vec!["a", "b c", ""]]);
    }

    #[test]
    fn test_quoted_whitespace_preserved() {
        assert_eq!(rows("' a ' , \" b\"\t"), vec![vec![" a ", " b"]]);
    }

    #[test]
    fn test_other_quote_literal_inside_quotes() {
        assert_eq!(rows(r#""it's",'say "hi"'"#), vec![vec!["it's", "say \"hi\""]]);
    }

    #[test]
    fn test_escapes_inside_quotes() {
        assert_eq!(rows(r#""a\"b\\c""#), vec![vec!["a\"b\\c"]]);
    }

    #[test]
    fn test_escaped_whitespace_survives_trim() {
        assert_eq!(rows("a\\t , \\tb"), vec![vec!["a\t", "\tb"]]);
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(rows(",a,"), vec![vec!["", "a", ""]]);
        assert_eq!(rows(",,,,"), vec![vec![""; 5]]);
        assert_eq!(rows("''"), vec![vec![""]]);
    }

    #[test]
    fn test_escape_before_quote_makes_quote_illegal() {
        let err = error("\\t'a'");
        assert_eq!(err.kind, CsvErrorKind::IllegalQuoteInCell('\''));
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_illegal_quote_in_cell() {
        let err = error("ab\"c");
        assert_eq!(err.kind, CsvErrorKind::IllegalQuoteInCell('"'));
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn test_unexpected_character_after_quote() {
        let err = error("\"ab\" x,y");
        assert_eq!(err.kind, CsvErrorKind::UnexpectedCharacterAfterQuote('x'));
        assert_eq!(err.column, 6);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = error("a,\"bc");
        assert_eq!(err.kind, CsvErrorKind::UnterminatedLine);
        assert_eq!(err.column, 6);
    }

    #[test]
    fn test_trailing_backslash() {
        let err = error("ok\nab\\");
        assert_eq!(err.kind, CsvErrorKind::UnterminatedLine);
        assert_eq!((err.line, err.column), (2, 4));
    }

    #[test]
    fn test_unknown_escape_code() {
        let err = error("a\\qb");
        assert_eq!(err.kind, CsvErrorKind::UnknownEscapeCode('q'));
        assert_eq!(err.column, 3);
        assert_eq!(err.origin, "test");
    }

    #[test]
    fn test_line_offset_in_errors() {
        let err = parse_str("ok\n\nx\"", "f.csv", LineOffset::new(10)).unwrap_err();
        assert_eq!(err.line, 13);
        assert_eq!(err.to_string(), "f.csv:13:2: illegal quotes '\"' inside cell");
    }

    #[test]
    fn test_negative_offset_rejected() {
        assert_eq!(LineOffset::try_from(4i64), Ok(LineOffset::new(4)));
        assert_eq!(
            LineOffset::try_from(-1i64),
            Err(CsvErrorKind::NegativeStartingLine(-1))
        );
    }

    #[test]
    fn test_reader_matches_str() {
        let csv = "a, b\n\n'c',d\\n\n";
        let from_reader = parse(csv.as_bytes(), "r", LineOffset::default()).unwrap();
        assert_eq!(from_reader, rows(csv));
        assert_eq!(rows(csv), rows(csv));
    }

    #[test]
    fn test_crlf_lines() {
        assert_eq!(rows("a,b\r\nc\r\n"), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_latin1_bytes() {
        // "Société,x" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9, 0x2C, 0x78];
        let result = parse_bytes(bytes, Some("iso-8859-1"), "b", LineOffset::default()).unwrap();
        assert_eq!(result.rows, vec![vec!["Société", "x"]]);
        assert_eq!(result.encoding, "windows-1252");
    }

    #[test]
    fn test_windows_1252_detected() {
        let line: &[u8] =
            b"L\x92eau est tr\xE8s fra\xEEche,n\x92est-ce pas,caf\xE9 \xA4 \xBD\n";
        let bytes = line.repeat(5);

        assert_eq!(detect_encoding(&bytes), "windows-1252");

        let result = parse_bytes(&bytes, None, "b", LineOffset::default()).unwrap();
        assert_eq!(result.encoding, "windows-1252");
        assert_eq!(result.rows.len(), 5);
        assert_eq!(
            result.rows[0],
            vec!["L\u{2019}eau est très fraîche", "n\u{2019}est-ce pas", "café ¤ ½"]
        );
    }

    #[test]
    fn test_bom_dropped() {
        let bytes = b"\xEF\xBB\xBFa,b";
        let result = parse_bytes(bytes, Some("utf-8"), "b", LineOffset::default()).unwrap();
        assert_eq!(result.rows, vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_bom_overrides_forced_label() {
        let bytes = b"\xEF\xBB\xBFcaf\xC3\xA9,b";
        let result = parse_bytes(bytes, Some("windows-1252"), "b", LineOffset::default()).unwrap();
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.rows, vec![vec!["café", "b"]]);
    }

    #[test]
    fn test_huge_offset_saturates() {
        let offset = LineOffset::new(usize::MAX);
        assert_eq!(rows("a\nb\n"), parse_str("a\nb\n", "t", offset).unwrap());

        let err = parse_str("ok\nx\"", "t", offset).unwrap_err();
        assert_eq!(err.line, usize::MAX);

        let from_reader = parse("a\n\"b".as_bytes(), "t", offset).unwrap_err();
        assert_eq!(from_reader.line, usize::MAX);
    }

    #[test]
    fn test_unknown_encoding() {
        let err = parse_bytes(b"a", Some("klingon"), "b", LineOffset::default()).unwrap_err();
        assert!(matches!(err.kind, CsvErrorKind::Encoding(_)));
    }
}
