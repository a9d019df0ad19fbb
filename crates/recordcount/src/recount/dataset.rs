//! Labeled dataset reader.
//!
//! The first line names the fields; every following line is a content row
//! whose cells line up positionally with the header. Cells may be quoted.
//! A blank line is a content row too: it holds a single empty cell, so row
//! indices always match the lines of the input.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};

use super::error::RowDefect;
use super::RecountError;
use crate::config::ReplayConfig;
use crate::inference::InputRow;

/// Streams content rows as [`InputRow`]s, numbered from 0.
pub struct DatasetReader<R> {
    reader: csv::Reader<BlankLines<R>>,
    header: Vec<String>,
    record: ByteRecord,
    next_row: usize,
    delimiter: char,
}

impl DatasetReader<File> {
    /// Open a dataset file and read its header.
    pub fn open(path: impl AsRef<Path>, config: &ReplayConfig) -> Result<Self, RecountError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RecountError::DatasetOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, config)
    }
}

impl<R: Read> DatasetReader<R> {
    /// Wrap `source` and read its header.
    ///
    /// # Errors
    ///
    /// [`RecountError::MissingHeader`] if there is no first line,
    /// [`RecountError::DuplicateColumn`] if it names a field twice.
    pub fn from_reader(source: R, config: &ReplayConfig) -> Result<Self, RecountError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(config.delimiter_byte())
            .trim(if config.trim { Trim::All } else { Trim::None })
            .from_reader(BlankLines::new(source, config.delimiter_byte()));

        let mut first = StringRecord::new();
        if !reader.read_record(&mut first)? {
            return Err(RecountError::MissingHeader);
        }
        let header: Vec<String> = first.iter().map(str::to_string).collect();

        let mut seen = HashSet::with_capacity(header.len());
        for name in &header {
            if !seen.insert(name.as_str()) {
                return Err(RecountError::DuplicateColumn { name: name.clone() });
            }
        }

        Ok(Self {
            reader,
            header,
            record: ByteRecord::new(),
            next_row: 0,
            delimiter: config.delimiter,
        })
    }

    /// Field names, in column order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of content rows handed out so far.
    pub fn rows_read(&self) -> usize {
        self.next_row
    }

    /// Map the current record onto the header.
    fn build_row(&self, row: usize) -> Result<InputRow, RecountError> {
        let mut inputs = InputRow::with_capacity(self.header.len());
        for (column, (name, raw)) in self.header.iter().zip(self.record.iter()).enumerate() {
            match std::str::from_utf8(raw) {
                Ok(value) => inputs.insert(name.as_str(), value),
                Err(_) => return Err(self.malformed(row, RowDefect::InvalidUtf8 { column }, inputs)),
            }
        }

        if self.record.len() != self.header.len() {
            let defect = RowDefect::ColumnCount {
                expected: self.header.len(),
                found: self.record.len(),
            };
            return Err(self.malformed(row, defect, inputs));
        }
        Ok(inputs)
    }

    fn malformed(&self, row: usize, defect: RowDefect, inputs: InputRow) -> RecountError {
        let content = self
            .record
            .iter()
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        RecountError::MalformedRow {
            row,
            defect,
            content,
            inputs,
        }
    }
}

impl<R: Read> Iterator for DatasetReader<R> {
    type Item = Result<(usize, InputRow), RecountError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
            Ok(true) => {
                let row = self.next_row;
                self.next_row += 1;
                Some(self.build_row(row).map(|inputs| (row, inputs)))
            }
        }
    }
}

// =============================================================================
// Blank lines
// =============================================================================

/// Where the scanner is within the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    LineStart,
    AfterCr,
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Writes an explicit empty cell (`""`) onto every blank line.
///
/// The CSV parser drops blank lines silently; marked, they come out as
/// one-cell records. Line breaks inside quoted cells are left alone.
struct BlankLines<R> {
    inner: R,
    delimiter: u8,
    state: LineState,
    chunk: Vec<u8>,
    out: Vec<u8>,
    pos: usize,
}

impl<R: Read> BlankLines<R> {
    const CHUNK: usize = 8 * 1024;

    fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            state: LineState::LineStart,
            chunk: vec![0; Self::CHUNK],
            out: Vec::with_capacity(Self::CHUNK),
            pos: 0,
        }
    }

    fn push(&mut self, b: u8) {
        use LineState::*;

        let line_start = match self.state {
            LineStart => true,
            AfterCr => b != b'\n',
            _ => false,
        };
        if line_start && (b == b'\n' || b == b'\r') {
            self.out.extend_from_slice(b"\"\"");
        }

        let state = if line_start { FieldStart } else { self.state };
        self.state = match (state, b) {
            (AfterCr, b'\n') => LineStart,
            (Quoted, b'"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, b'"') => Quoted,
            (_, b'\n') => LineStart,
            (_, b'\r') => AfterCr,
            (_, b) if b == self.delimiter => FieldStart,
            (FieldStart, b'"') => Quoted,
            _ => Unquoted,
        };
        self.out.push(b);
    }
}

impl<R: Read> Read for BlankLines<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.out.len() {
            self.out.clear();
            self.pos = 0;
            let n = self.inner.read(&mut self.chunk)?;
            if n == 0 {
                return Ok(0);
            }
            for i in 0..n {
                let b = self.chunk[i];
                self.push(b);
            }
        }
        let n = buf.len().min(self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str, config: &ReplayConfig) -> Result<Vec<(usize, InputRow)>, RecountError> {
        DatasetReader::from_reader(text.as_bytes(), config)?.collect()
    }

    #[test]
    fn rows_map_positionally_onto_header() {
        let rows = read("x,y\n0.5,yes\n1.5,no\n", &ReplayConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].0, 1);
        assert_eq!(rows[1].1.get("x"), Some("1.5"));
        assert_eq!(rows[1].1.get("y"), Some("no"));
    }

    #[test]
    fn header_only_has_no_rows() {
        let mut reader = DatasetReader::from_reader("x,y\n".as_bytes(), &ReplayConfig::default()).unwrap();
        assert_eq!(reader.header(), &["x".to_string(), "y".to_string()]);
        assert!(reader.next().is_none());
        assert_eq!(reader.rows_read(), 0);
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(read("", &ReplayConfig::default()), Err(RecountError::MissingHeader)));
    }

    #[test]
    fn duplicate_header_names_are_rejected() {
        let err = read("x,y,x\n", &ReplayConfig::default()).unwrap_err();
        assert!(matches!(err, RecountError::DuplicateColumn { name } if name == "x"));
    }

    #[test]
    fn short_row_is_malformed_with_partial_mapping() {
        let err = read("x,y,z\n1,2,3\n4,5\n", &ReplayConfig::default()).unwrap_err();
        let RecountError::MalformedRow {
            row,
            defect,
            content,
            inputs,
        } = &err
        else {
            panic!("expected a malformed row, got {err:?}");
        };
        assert_eq!(*row, 1);
        assert_eq!(*defect, RowDefect::ColumnCount { expected: 3, found: 2 });
        assert_eq!(content, "4,5");
        assert_eq!(inputs.get("y"), Some("5"));
        assert_eq!(inputs.get("z"), None);
    }

    #[test]
    fn blank_line_is_a_short_row() {
        let err = read("x,y\n0.5,yes\n\n1.5,no\n", &ReplayConfig::default()).unwrap_err();
        let RecountError::MalformedRow {
            row,
            defect,
            content,
            ..
        } = &err
        else {
            panic!("expected a malformed row, got {err:?}");
        };
        assert_eq!(*row, 1);
        assert_eq!(*defect, RowDefect::ColumnCount { expected: 2, found: 1 });
        assert_eq!(content, "");
    }

    #[test]
    fn blank_lines_keep_row_indices() {
        // With one column a blank line is a row holding an empty cell.
        let rows = read("x\n1\n\n\r\n2\n", &ReplayConfig::default()).unwrap();
        let cells: Vec<_> = rows.iter().map(|(i, r)| (*i, r.get("x").unwrap().to_string())).collect();
        assert_eq!(
            cells,
            vec![(0, "1".into()), (1, String::new()), (2, String::new()), (3, "2".into())]
        );

        let err = read("x,y\n0.5,yes\n\n", &ReplayConfig::default()).unwrap_err();
        assert!(matches!(err, RecountError::MalformedRow { row: 1, .. }), "got: {err:?}");
    }

    #[test]
    fn crlf_line_ends_are_not_blank_lines() {
        let rows = read("x,y\r\n1,a\r\n2,b\r\n", &ReplayConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].1.get("y"), Some("b"));
    }

    #[test]
    fn line_breaks_inside_quotes_are_kept() {
        let rows = read("x,y\n\"a\n\nb\",\"say \"\"hi\"\"\n\"\n3,c\n", &ReplayConfig::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.get("x"), Some("a\n\nb"));
        assert_eq!(rows[0].1.get("y"), Some("say \"hi\"\n"));
        assert_eq!(rows[1].0, 1);
    }

    #[test]
    fn rows_span_read_chunks() {
        let mut text = String::from("x\n");
        for i in 0..5_000 {
            text.push_str(&format!("{i}\n"));
        }
        let rows = read(&text, &ReplayConfig::default()).unwrap();
        assert_eq!(rows.len(), 5_000);
        assert_eq!(rows[4_999].1.get("x"), Some("4999"));
    }

    #[test]
    fn long_row_is_malformed() {
        let err = read("x,y\n1,2,3\n", &ReplayConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RecountError::MalformedRow {
                row: 0,
                defect: RowDefect::ColumnCount { expected: 2, found: 3 },
                ..
            }
        ));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let mut bytes = b"x,y\n1,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.push(b'\n');
        let err = DatasetReader::from_reader(bytes.as_slice(), &ReplayConfig::default())
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap_err();
        assert!(matches!(
            err,
            RecountError::MalformedRow {
                defect: RowDefect::InvalidUtf8 { column: 1 },
                ..
            }
        ));
    }

    #[test]
    fn delimiter_quotes_and_trim() {
        let config = ReplayConfig::builder().delimiter(';').trim(true).build().unwrap();
        let rows = read(" x ; y\n\"a;b\" ;  yes \n", &config).unwrap();
        assert_eq!(rows[0].1.get("x"), Some("a;b"));
        assert_eq!(rows[0].1.get("y"), Some("yes"));
    }
}
