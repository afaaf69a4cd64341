//! Textual preamble of a compressed file.
//!
//! ```text
//! 'a':0
//! '\'':10
//! 'b':11
//! HEADER
//! 6
//! SIZE
//! <packed bytes>
//! ```

use std::{
    collections::HashSet,
    io::{self, Write},
    iter::Peekable,
    str::Chars,
};

use bit_vec::BitVec;
use log::debug;

use crate::{
    error::{CodecError, Result},
    prefix_code_table::{code_to_string, CodeTable},
};

pub const HEADER_MARKER: &str = "HEADER";
pub const SIZE_MARKER: &str = "SIZE";

const QUOTE: char = '\'';
const ESCAPE: char = '\\';
const SEPARATOR: char = ':';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub table: CodeTable,
    /// Number of meaningful bits in the payload.
    pub encoded_size: usize,
}

impl Header {
    pub fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (ch, code) in self.table.iter() {
            let code = code_to_string(code);
            if ch == QUOTE {
                writeln!(writer, "{QUOTE}{ESCAPE}{QUOTE}{QUOTE}{SEPARATOR}{code}")?;
            } else {
                writeln!(writer, "{QUOTE}{ch}{QUOTE}{SEPARATOR}{code}")?;
            }
        }
        writeln!(writer, "{HEADER_MARKER}")?;
        writeln!(writer, "{}", self.encoded_size)?;
        writeln!(writer, "{SIZE_MARKER}")?;
        Ok(())
    }

    /// Parses the header at the start of `content`, returning it together with
    /// the offset where the packed payload begins.
    pub fn parse(content: &[u8]) -> Result<(Self, usize)> {
        let header_marker = format!("{HEADER_MARKER}\n");
        let size_marker = format!("\n{SIZE_MARKER}\n");

        let header_start = find(content, header_marker.as_bytes())
            .ok_or_else(|| malformed(format!("missing {HEADER_MARKER} marker")))?;
        let size_start = header_start + header_marker.len();
        let size_end = find(&content[size_start..], size_marker.as_bytes())
            .map(|offset| size_start + offset)
            .ok_or_else(|| malformed(format!("missing {SIZE_MARKER} marker")))?;
        let payload_offset = size_end + size_marker.len();

        let encoded_size = parse_size(&content[size_start..size_end])?;
        let records = std::str::from_utf8(&content[..header_start])
            .map_err(|err| malformed(format!("records are not valid UTF-8: {err}")))?;
        let table = Records::new(records).table()?;

        if table.is_empty() && encoded_size > 0 {
            return Err(malformed(format!(
                "{encoded_size} encoded bits declared but the code table is empty"
            )));
        }
        debug!(
            "parsed header with {} codes and {encoded_size} bits, payload at byte {payload_offset}",
            table.len()
        );

        Ok((
            Self {
                table,
                encoded_size,
            },
            payload_offset,
        ))
    }
}

fn malformed(reason: impl Into<String>) -> CodecError {
    CodecError::MalformedHeader(reason.into())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_size(raw: &[u8]) -> Result<usize> {
    let raw = std::str::from_utf8(raw).map_err(|_| malformed("size is not valid UTF-8"))?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(format!("invalid size: {raw:?}")));
    }
    raw.parse()
        .map_err(|err| malformed(format!("invalid size {raw:?}: {err}")))
}

/// Scanner over the `'<symbol>':<code>` records.
struct Records<'a> {
    input: Peekable<Chars<'a>>,
    record: usize,
}

impl<'a> Records<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
            record: 0,
        }
    }

    fn table(mut self) -> Result<CodeTable> {
        let mut table = CodeTable::default();
        let mut seen_codes = HashSet::new();

        while let Some((ch, code)) = self.next_record()? {
            if !seen_codes.insert(code.clone()) {
                return Err(self.error(format!("code {} is used twice", code_to_string(&code))));
            }
            if table.insert(ch, code).is_some() {
                return Err(self.error(format!("symbol {ch:?} appears twice")));
            }
        }

        if !table.is_prefix_free() {
            return Err(malformed("code table is not prefix-free"));
        }
        Ok(table)
    }

    fn next_record(&mut self) -> Result<Option<(char, BitVec)>> {
        self.skip_whitespace();
        if self.input.peek().is_none() {
            return Ok(None);
        }
        self.record += 1;

        let ch = self.symbol()?;
        if self.input.next_if_eq(&SEPARATOR).is_none() {
            return Err(self.error(format!("expected '{SEPARATOR}' after the symbol")));
        }
        let code = self.code()?;
        self.skip_whitespace();

        Ok(Some((ch, code)))
    }

    fn symbol(&mut self) -> Result<char> {
        if self.input.next_if_eq(&QUOTE).is_none() {
            return Err(self.error("expected an opening quote"));
        }
        let ch = self
            .input
            .next()
            .ok_or_else(|| self.error("unterminated symbol"))?;

        // `'\''` is an escaped quote, `'\'` is a backslash
        if ch == ESCAPE && self.input.next_if_eq(&QUOTE).is_some() {
            if self.input.next_if_eq(&QUOTE).is_some() {
                return Ok(QUOTE);
            }
            return Ok(ESCAPE);
        }

        match self.input.next() {
            Some(QUOTE) => Ok(ch),
            Some(_) => Err(self.error("symbol must be a single character")),
            None => Err(self.error("unterminated symbol")),
        }
    }

    fn code(&mut self) -> Result<BitVec> {
        let mut code = BitVec::new();
        while let Some(digit) = self.input.next_if(char::is_ascii_digit) {
            match digit {
                '0' => code.push(false),
                '1' => code.push(true),
                other => return Err(self.error(format!("code digit {other:?} is not a bit"))),
            }
        }
        if code.is_empty() {
            return Err(self.error("missing code"));
        }
        Ok(code)
    }

    fn skip_whitespace(&mut self) {
        while self.input.next_if(|ch| ch.is_whitespace()).is_some() {}
    }

    fn error(&self, reason: impl AsRef<str>) -> CodecError {
        malformed(format!("record {}: {}", self.record, reason.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use bit_vec::BitVec;
    use rstest::rstest;

    use super::Header;
    use crate::{
        error::CodecError,
        prefix_code_table::{generate_codes, CodeTable},
    };

    fn table(entries: &[(char, &str)]) -> CodeTable {
        entries
            .iter()
            .map(|&(ch, code)| (ch, code.chars().map(|bit| bit == '1').collect::<BitVec>()))
            .collect()
    }

    fn serialize(header: &Header) -> Vec<u8> {
        let mut buf = Vec::new();
        header.serialize(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_serialized_layout() {
        let header = Header {
            table: table(&[('a', "0"), ('\'', "10"), ('b', "11")]),
            encoded_size: 6,
        };
        let text = String::from_utf8(serialize(&header)).unwrap();
        assert_eq!(text, "'\\'':10\n'a':0\n'b':11\nHEADER\n6\nSIZE\n");
    }

    #[test]
    fn test_empty_header() {
        let header = Header::default();
        let bytes = serialize(&header);
        assert_eq!(bytes, b"HEADER\n0\nSIZE\n");
        assert_eq!(Header::parse(&bytes).unwrap(), (header, bytes.len()));
    }

    #[rstest]
    #[case(&[('\'', "0"), ('\\', "1")])]
    #[case(&[('\\', "0"), (':', "10"), ('\'', "11")])]
    #[case(&[('\n', "00"), (' ', "01"), ('\t', "10"), ('\r', "11")])]
    #[case(&[('H', "0"), ('🦀', "10"), ('é', "11")])]
    #[case(&[('x', "0")])]
    fn test_header_round_trip(#[case] entries: &[(char, &str)]) {
        for encoded_size in [0, 1, 7, 8, 123_456] {
            let header = Header {
                table: table(entries),
                encoded_size,
            };
            let mut bytes = serialize(&header);
            let payload_offset = bytes.len();
            bytes.extend_from_slice(b"HEADER\n\nSIZE\n\xff");

            let (parsed, offset) = Header::parse(&bytes).unwrap();
            assert_eq!(parsed, header);
            assert_eq!(offset, payload_offset);
        }
    }

    #[test]
    fn test_generated_table_round_trip() {
        let header = Header {
            table: generate_codes("it's a 'quoted' \\ string\n"),
            encoded_size: 42,
        };
        let bytes = serialize(&header);
        assert_eq!(Header::parse(&bytes).unwrap().0, header);
    }

    #[rstest]
    #[case::no_header_marker(b"'a':0\n".as_slice())]
    #[case::no_size_marker(b"'a':0\nHEADER\n1\n".as_slice())]
    #[case::size_not_numeric(b"'a':0\nHEADER\nten\nSIZE\n".as_slice())]
    #[case::size_negative(b"'a':0\nHEADER\n-1\nSIZE\n".as_slice())]
    #[case::size_empty(b"'a':0\nHEADER\n\nSIZE\n".as_slice())]
    #[case::unterminated_symbol(b"'a\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::missing_quote(b"a':0\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::missing_colon(b"'a'0\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::missing_code(b"'a':\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::non_binary_code(b"'a':012\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::long_symbol(b"'ab':0\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::truncated_record(b"'a':0\n'b\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::duplicate_symbol(b"'a':0\n'a':1\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::duplicate_code(b"'a':0\n'b':0\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::not_prefix_free(b"'a':0\n'b':01\nHEADER\n1\nSIZE\n".as_slice())]
    #[case::size_without_table(b"HEADER\n3\nSIZE\n".as_slice())]
    fn test_malformed_headers(#[case] bytes: &[u8]) {
        let err = Header::parse(bytes).unwrap_err();
        assert!(matches!(err, CodecError::MalformedHeader(_)), "{err}");
    }
}
