//! Traits for format-agnostic loading and saving of string-resource files.

use std::{
    collections::HashSet,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::{debug, warn};

use crate::{
    cancel::CancellationToken,
    error::Error,
    types::{Finalize, ResourceEntry, SaveSummary},
};

/// A lazily evaluated, forward-only sequence of entries read from one file.
///
/// Every call to [`ResourceCodec::load`] produces a fresh stream. The stream
/// ends after the first error it yields.
pub type EntryStream = Box<dyn Iterator<Item = Result<ResourceEntry, Error>> + Send>;

/// A codec for one string-resource file format.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use transolution::{CancellationToken, ResourceCodec, ResourceEntry, formats::ResxCodec};
///
/// let path = Path::new("Strings.resx");
/// let codec = ResxCodec::default();
/// let token = CancellationToken::new();
/// let entries = vec![ResourceEntry::new("hello", "Hello", "")];
/// codec.save(path, &mut entries.into_iter(), &token)?;
/// for entry in codec.load(path, &token)? {
///     println!("{}", entry?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ResourceCodec: Send + Sync {
    /// Short tag identifying the format, e.g. `"resx"`.
    fn format_tag(&self) -> &'static str;

    /// Opens `path` and returns its entries in file order.
    fn load(&self, path: &Path, cancel: &CancellationToken) -> Result<EntryStream, Error>;

    /// Writes `entries` to `path`, replacing any existing file.
    ///
    /// A save that ends with [`Error::Cancelled`] still closes the file, which
    /// then holds the entries consumed before the token was cancelled.
    fn save(
        &self,
        path: &Path,
        entries: &mut dyn Iterator<Item = ResourceEntry>,
        cancel: &CancellationToken,
    ) -> Result<SaveSummary, Error>;
}

/// Format-specific writing half of a codec, driven by [`save_entries`].
pub(crate) trait EntrySink {
    /// Writes whatever precedes the first entry.
    fn begin(&mut self) -> Result<(), Error>;

    /// Writes one entry.
    fn write_entry(&mut self, entry: &ResourceEntry) -> Result<(), Error>;

    /// Writes closing markup, flushes and releases the handle. Called
    /// exactly once.
    fn finish(self) -> Result<(), Error>;
}

/// Flushes `out` unless `closing` already failed, then releases the handle.
/// Bytes left behind by a failed write are dropped rather than retried.
pub(crate) fn release<W: Write>(
    mut out: BufWriter<W>,
    closing: Result<(), Error>,
) -> Result<(), Error> {
    let result = closing.and_then(|()| out.flush().map_err(Error::from));
    let (_handle, _unflushed) = out.into_parts();
    result
}

/// Runs the shared save protocol over a format sink.
///
/// Entries are consumed in order. An entry that fails is reported as
/// [`Error::Write`] with its content. Whatever happens, `finish` is attempted
/// once and its failure is only logged and reported through
/// [`SaveSummary::finalize`]. The sink (and the file handle it owns) is consumed
/// by `finish`.
pub(crate) fn save_entries<S: EntrySink>(
    mut sink: S,
    path: &Path,
    entries: &mut dyn Iterator<Item = ResourceEntry>,
    cancel: &CancellationToken,
) -> Result<SaveSummary, Error> {
    let body = write_body(&mut sink, entries, cancel);

    let finalize = match sink.finish() {
        Ok(()) => Finalize::Completed,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "finalizing resource file failed");
            Finalize::Failed(e.to_string())
        }
    };

    let written = body?;
    debug!(path = %path.display(), written, "saved resource file");
    Ok(SaveSummary { written, finalize })
}

fn write_body<S: EntrySink>(
    sink: &mut S,
    entries: &mut dyn Iterator<Item = ResourceEntry>,
    cancel: &CancellationToken,
) -> Result<usize, Error> {
    sink.begin()?;

    let mut seen = HashSet::new();
    let mut written = 0;
    for entry in entries {
        cancel
            .check()
            .inspect_err(|_| debug!(written, "save cancelled"))?;
        let result = if entry.key.is_empty() {
            Err(Error::validation_error("resource key must not be empty"))
        } else if !seen.insert(entry.key.clone()) {
            Err(Error::validation_error(format!(
                "duplicate resource key `{}`",
                entry.key
            )))
        } else {
            sink.write_entry(&entry)
        };
        if let Err(source) = result {
            return Err(Error::Write {
                key: entry.key,
                value: entry.value,
                comment: entry.comment,
                source: Box::new(source),
            });
        }
        written += 1;
    }
    Ok(written)
}
