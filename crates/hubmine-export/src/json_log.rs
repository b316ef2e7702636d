//! Append-only JSON array file.
//!
//! The file holds a single pretty-printed array and stays parseable after
//! every successful append. Appending never rewrites earlier elements: the
//! closing bracket is located in the last [`TAIL_WINDOW`] bytes, the file is
//! truncated there and the new element plus a fresh bracket are written.
//!
//! A file that lost its closing bracket mid-write is repaired when the last
//! byte still completes an element (`}`) or opens the array (`[`), and the
//! contents up to that byte parse as an array once closed. Anything else is
//! reported as [`SinkError::Corrupt`] and the file is left as is.

use crate::error::{Result, SinkError};
use serde::de::IgnoredAny;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Bytes read from the end of the file when looking for the closing bracket.
pub const TAIL_WINDOW: u64 = 64;

/// Where and how the next element is spliced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Splice {
    /// Empty or whitespace-only file.
    Fresh,
    /// Truncate at the offset and open the array's first element.
    First { at: u64 },
    /// Truncate at the offset and follow an existing element.
    Next { at: u64 },
}

impl Splice {
    fn offset(self) -> u64 {
        match self {
            Self::Fresh => 0,
            Self::First { at } | Self::Next { at } => at,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Fresh => "[\n",
            Self::First { .. } => "\n",
            Self::Next { .. } => ",\n",
        }
    }
}

/// A JSON array file that grows one element at a time.
#[derive(Debug, Clone)]
pub struct JsonArrayLog {
    path: PathBuf,
}

impl JsonArrayLog {
    /// Bind to `path`; the file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `value` as the array's last element.
    ///
    /// The value is encoded before the file is opened, so an encoding
    /// failure never touches the file.
    pub fn append<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let element = serde_json::to_string_pretty(value)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(SinkError::io(&self.path))?;

        let splice = locate(&mut file)
            .map_err(SinkError::io(&self.path))?
            .map_err(|reason| SinkError::corrupt(&self.path, reason))?;
        tracing::debug!("Appending to {} ({:?})", self.path.display(), splice);

        write_at(&mut file, splice, &element).map_err(SinkError::io(&self.path))
    }
}

fn locate(file: &mut File) -> std::io::Result<std::result::Result<Splice, String>> {
    let len = file.metadata()?.len();
    let start = len.saturating_sub(TAIL_WINDOW);

    let mut tail = Vec::new();
    file.seek(SeekFrom::Start(start))?;
    file.read_to_end(&mut tail)?;

    let splice = match splice_point(&tail, start) {
        Ok(splice) => splice,
        Err(reason) => return Ok(Err(reason)),
    };
    let closed = tail.iter().rev().find(|b| !b.is_ascii_whitespace()) == Some(&b']');
    if splice == Splice::Fresh || closed {
        return Ok(Ok(splice));
    }
    Ok(verify_repair(file, splice)?.map(|()| splice))
}

/// Check that the unclosed array parses when closed at the splice point.
///
/// A trailing `}` or `[` may belong to a nested value of an element whose
/// write was cut short.
fn verify_repair(
    file: &mut File,
    splice: Splice,
) -> std::io::Result<std::result::Result<(), String>> {
    let mut prefix = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    std::io::Read::by_ref(file).take(splice.offset()).read_to_end(&mut prefix)?;
    prefix.push(b']');

    Ok(serde_json::from_slice::<Vec<IgnoredAny>>(&prefix)
        .map(|_| ())
        .map_err(|e| format!("unclosed array does not end on a complete element: {e}")))
}

fn write_at(file: &mut File, splice: Splice, element: &str) -> std::io::Result<()> {
    file.set_len(splice.offset())?;
    file.seek(SeekFrom::Start(splice.offset()))?;
    file.write_all(splice.prefix().as_bytes())?;
    file.write_all(element.as_bytes())?;
    file.write_all(b"\n]")?;
    file.flush()
}

/// Decide where to splice given the file's trailing bytes, which begin at
/// absolute offset `start`.
fn splice_point(tail: &[u8], start: u64) -> std::result::Result<Splice, String> {
    let after = |index: usize| start + index as u64 + 1;
    let last_content = |bytes: &[u8]| bytes.iter().rposition(|b| !b.is_ascii_whitespace());

    let Some(last) = last_content(tail) else {
        return if start == 0 {
            Ok(Splice::Fresh)
        } else {
            Err(format!("no content in the last {TAIL_WINDOW} bytes"))
        };
    };

    match tail[last] {
        b']' => match last_content(&tail[..last]) {
            Some(prev) if tail[prev] == b'[' => Ok(Splice::First { at: after(prev) }),
            Some(prev) if tail[prev] == b',' => Err("dangling comma before ']'".to_string()),
            Some(prev) => Ok(Splice::Next { at: after(prev) }),
            None if start > 0 => Ok(Splice::Next {
                at: start + last as u64,
            }),
            None => Err("closing bracket without an opening one".to_string()),
        },
        b'}' => Ok(Splice::Next { at: after(last) }),
        b'[' => Ok(Splice::First { at: after(last) }),
        other => Err(format!("ends with {:?}", char::from(other))),
    }
}
