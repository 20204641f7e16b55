//! Support for a headerless three-column CSV sheet: `key,value,comment`.
//!
//! Rows with only two columns read with an empty comment. This is the
//! hand-off format for translators working in spreadsheet tools.

use std::{
    collections::HashSet,
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    cancel::{CancellationToken, Cancellable},
    error::Error,
    fs::{FileSystem, StdFileSystem},
    traits::{EntrySink, EntryStream, ResourceCodec, release, save_entries},
    types::{ResourceEntry, SaveSummary},
};

/// Codec for `key,value,comment` CSV files.
#[derive(Clone)]
pub struct CsvCodec {
    fs: Arc<dyn FileSystem>,
}

impl CsvCodec {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self::new(Arc::new(StdFileSystem))
    }
}

impl ResourceCodec for CsvCodec {
    fn format_tag(&self) -> &'static str {
        "csv"
    }

    fn load(&self, path: &Path, cancel: &CancellationToken) -> Result<EntryStream, Error> {
        if !self.fs.exists(path) {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let file = self.fs.open_read(path)?;
        let decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .strip_bom(true)
            .build(file);
        let entries = CsvEntries::new(decoder, path);
        Ok(Box::new(Cancellable::new(entries, cancel.clone())))
    }

    fn save(
        &self,
        path: &Path,
        entries: &mut dyn Iterator<Item = ResourceEntry>,
        cancel: &CancellationToken,
    ) -> Result<SaveSummary, Error> {
        let file = self.fs.create(path)?;
        let sink = CsvSink {
            out: BufWriter::new(file),
        };
        save_entries(sink, path, entries, cancel)
    }
}

/// Streaming reader yielding one entry per CSV row.
pub struct CsvEntries<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    path: PathBuf,
    seen: HashSet<String>,
}

impl<R: Read> CsvEntries<R> {
    pub fn new(reader: R, path: &Path) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self {
            records,
            path: path.to_path_buf(),
            seen: HashSet::new(),
        }
    }

    fn to_entry(&mut self, record: csv::StringRecord) -> Result<ResourceEntry, Error> {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() < 2 || record.len() > 3 {
            return Err(Error::format_error(
                &self.path,
                format!("line {line}: expected 2 or 3 columns, found {}", record.len()),
            ));
        }
        let key = record[0].to_string();
        if key.is_empty() {
            return Err(Error::format_error(
                &self.path,
                format!("line {line}: empty key"),
            ));
        }
        if !self.seen.insert(key.clone()) {
            return Err(Error::format_error(
                &self.path,
                format!("line {line}: duplicate key `{key}`"),
            ));
        }
        Ok(ResourceEntry {
            key,
            value: record[1].to_string(),
            comment: record.get(2).unwrap_or_default().to_string(),
        })
    }
}

impl<R: Read> Iterator for CsvEntries<R> {
    type Item = Result<ResourceEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(Error::format_error(&self.path, e.to_string()))),
        };
        Some(self.to_entry(record))
    }
}

/// Rows are encoded one at a time so that the only buffer in front of the
/// handle is the one `finish` releases.
struct CsvSink<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> EntrySink for CsvSink<W> {
    fn begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_entry(&mut self, entry: &ResourceEntry) -> Result<(), Error> {
        let mut row = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        row.write_record([&entry.key, &entry.value, &entry.comment])?;
        row.flush()?;
        self.out.write_all(row.get_ref())?;
        Ok(())
    }

    fn finish(self) -> Result<(), Error> {
        release(self.out, Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(content: &str) -> Vec<Result<ResourceEntry, Error>> {
        CsvEntries::new(Cursor::new(content.as_bytes()), Path::new("test.csv")).collect()
    }

    #[test]
    fn test_parse_simple_csv() {
        let entries = parse("hello,Hello,greeting\nbye,Goodbye\n")
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            entries,
            vec![
                ResourceEntry::new("hello", "Hello", "greeting"),
                ResourceEntry::new("bye", "Goodbye", ""),
            ]
        );
    }

    #[test]
    fn test_quoted_fields() {
        let entries = parse("\"a,b\",\"line\nbreak\",\"say \"\"hi\"\"\"\n")
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(entries[0], ResourceEntry::new("a,b", "line\nbreak", "say \"hi\""));
    }

    #[test]
    fn test_single_column_is_format_error() {
        let results = parse("onlykey\n");
        assert!(matches!(results.as_slice(), [Err(Error::Format { .. })]));
    }

    #[test]
    fn test_duplicate_key_is_format_error() {
        let results = parse("a,1\na,2\n");
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("duplicate key `a`"));
    }

    #[test]
    fn test_sink_writes_three_columns() {
        let mut out = Vec::new();
        let sink = CsvSink {
            out: BufWriter::new(&mut out),
        };
        let entries = vec![
            ResourceEntry::new("hello", "Hello, world", ""),
            ResourceEntry::new("bye", "Bye", "farewell"),
        ];
        let summary = save_entries(
            sink,
            Path::new("test.csv"),
            &mut entries.into_iter(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "hello,\"Hello, world\",\nbye,Bye,farewell\n"
        );
    }
}
