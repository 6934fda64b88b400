//! Byte-exact file comparison.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Returns `true` when both files hold exactly the same bytes.
///
/// Files of different length compare unequal without reading content.
///
/// # Errors
/// Propagates any error from opening, stat-ing, or reading either file.
/// A side that is not a regular file (a directory, a socket) cannot be read
/// as content and fails with [`io::ErrorKind::InvalidInput`].
pub fn same_contents(left: &Path, right: &Path) -> io::Result<bool> {
    let left_meta = regular_file(left)?;
    let right_meta = regular_file(right)?;
    if left_meta.len() != right_meta.len() {
        return Ok(false);
    }

    let mut left = BufReader::new(File::open(left)?);
    let mut right = BufReader::new(File::open(right)?);
    loop {
        let l = left.fill_buf()?;
        if l.is_empty() {
            return Ok(right.fill_buf()?.is_empty());
        }
        let r = right.fill_buf()?;
        if r.is_empty() {
            return Ok(false);
        }
        let n = l.len().min(r.len());
        if l[..n] != r[..n] {
            return Ok(false);
        }
        left.consume(n);
        right.consume(n);
    }
}

fn regular_file(path: &Path) -> io::Result<std::fs::Metadata> {
    let meta = std::fs::metadata(path)?;
    if meta.is_file() {
        Ok(meta)
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ))
    }
}
