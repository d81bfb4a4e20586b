//! Delimited-text input and output.
//!
//! The reader decodes the file (UTF-8, falling back to Latin-1), trims every
//! header and cell, and turns each data row into a [`MemberRecord`] keyed by
//! header name. The writers emit CRLF-terminated, minimally quoted UTF-8.

use std::{borrow::Cow, fs, io, path::Path};

use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};
use encoding_rs::{UTF_8, WINDOWS_1252};

use crate::{
    error::{ExportError, Result},
    redaction::MemberRecord,
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encoding a table was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with or without a byte-order mark.
    Utf8,
    /// Latin-1, decoded with the WINDOWS-1252 superset.
    Latin1,
}

impl TextEncoding {
    /// Detects the encoding of `bytes` and decodes them.
    ///
    /// The whole input must be valid UTF-8 to be read as UTF-8; otherwise it
    /// is read as Latin-1, which never fails.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> (Cow<'_, str>, Self) {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => (text, Self::Utf8),
            None => {
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
                (text, Self::Latin1)
            }
        }
    }

    /// Label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
        }
    }
}

/// A header row and the member records under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<MemberRecord>,
    encoding: TextEncoding,
}

impl Table {
    /// Builds a table from already-clean parts.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<MemberRecord>) -> Self {
        Self {
            headers,
            rows,
            encoding: TextEncoding::Utf8,
        }
    }

    /// Reads and decodes a delimited file.
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| ExportError::io(path, err))?;
        Self::from_bytes(&bytes)
    }

    /// Decodes and parses raw file contents.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (text, encoding) = TextEncoding::decode(bytes);
        let mut table = Self::from_str(&text)?;
        table.encoding = encoding;
        Ok(table)
    }

    /// Parses delimited text whose first row is the header.
    ///
    /// Rows may be shorter or longer than the header: missing cells read as
    /// empty, surplus cells are dropped. When a header name repeats, the last
    /// cell under that name wins.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: MemberRecord = headers
                .iter()
                .enumerate()
                .map(|(idx, header)| (header.as_str(), record.get(idx).unwrap_or("")))
                .collect();
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    /// Header names, trimmed, in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[MemberRecord] {
        &self.rows
    }

    /// Encoding the table was decoded from.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }
}

pub(crate) fn csv_writer<W: io::Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .flexible(true)
        .from_writer(writer)
}

/// Writes raw rows as delimited text, with no header interpretation.
pub fn write_grid<W, R, S>(rows: R, writer: W) -> Result<()>
where
    W: io::Write,
    R: IntoIterator,
    R::Item: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut out = csv_writer(writer);
    for row in rows {
        out.write_record(row)?;
    }
    out.flush().map_err(|err| ExportError::Csv(err.into()))?;
    Ok(())
}
