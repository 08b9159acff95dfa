//! Stream Cursor: a polymorphic source of contiguous byte windows with a
//! mandatory zero-filled sentinel tail.
//!
//! A safe Rust slice's bounds *are* its memory bounds, so the "16 readable
//! bytes past the last valid byte" guarantee from the spec is realized here
//! not as an unchecked overread past a logical length, but as a literal
//! invariant on the buffer: [`StreamCursor::peek`] always returns a slice of
//! at least 16 bytes, consisting of the real unread data followed by a
//! zero-filled sentinel tail. [`StreamCursor::valid_len`] reports where the
//! real data ends within that slice; bytes at or after it are never
//! CSV-meaningful.

#[cfg(feature = "std")]
use std::io::Read;

#[cfg(feature = "mmap")]
use std::{fs::File, path::Path};

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::error::CursorError;

/// Bytes appended past the real data in every window a cursor exposes.
pub const SENTINEL_LEN: usize = 16;

/// A source of contiguous byte windows for the row parser to consume.
///
/// Implementations: [`MappedCursor`] (memory-mapped file), [`BufferedCursor`]
/// (owns a growable buffer fed by a `Read`), [`IterableCursor`] (fed by an
/// arbitrary chunk supplier). All three uphold the same sentinel-tail
/// invariant, so the row parser is written once against this trait.
pub trait StreamCursor {
    /// Returns the current unread window: real data followed by a
    /// zero-filled sentinel tail. Always at least [`SENTINEL_LEN`] bytes
    /// long.
    fn peek(&self) -> &[u8];

    /// Length of meaningful (real) unread data within the slice returned by
    /// [`peek`](StreamCursor::peek). Bytes from this offset onward are the
    /// sentinel tail.
    fn valid_len(&self) -> usize;

    /// Moves the read position forward by `n` bytes. `n` must be `<=
    /// valid_len()` at the time of the call.
    fn advance(&mut self, n: usize);

    /// Returns the `len` bytes immediately before the current read
    /// position, i.e. the bytes an immediately-preceding `advance(len)`
    /// just consumed.
    ///
    /// The row parser calls this once per row, right after `advance`,
    /// rather than holding a `peek()` slice across the row's scan: `peek()`
    /// and `advance` alias through `&mut self`, so a borrow taken before
    /// `advance` cannot survive it. Calling `consumed_window` afterward
    /// gives a fresh, non-conflicting borrow over exactly the bytes that
    /// were scanned.
    fn consumed_window(&self, len: usize) -> &[u8];

    /// Attempts to extend the window with more real data. Returns `Ok(true)`
    /// if more data may now be available (or already was), and `Ok(false)`
    /// only when EOF has been reached and no more bytes will ever arrive.
    /// The sentinel tail is re-established after every call.
    fn refill(&mut self) -> Result<bool, CursorError>;

    /// Whether EOF has definitely been reached (a prior `refill` returned
    /// `Ok(false)`).
    fn at_eof(&self) -> bool;

    /// Total number of bytes consumed via `advance` since the cursor was
    /// created, used for diagnostics (e.g. `ParseError` byte offsets).
    fn position(&self) -> u64;
}

/// Opens a file via `mmap` and returns a [`MappedCursor`] over it.
#[cfg(feature = "mmap")]
pub fn open_mapped(path: impl AsRef<Path>) -> Result<MappedCursor, CursorError> {
    MappedCursor::open(path)
}

/// Wraps a byte source in a [`BufferedCursor`] with the given read-chunk
/// size (default 256 KiB).
#[cfg(feature = "std")]
pub fn open_buffered<R: Read>(source: R, bufsize: usize) -> BufferedCursor<R> {
    BufferedCursor::new(source, bufsize)
}

/// Wraps an externally-driven chunk supplier in an [`IterableCursor`].
#[cfg(feature = "alloc")]
pub fn open_iter<S: ChunkSupplier>(chunk_supplier: S) -> IterableCursor<S> {
    IterableCursor::new(chunk_supplier)
}

/// Default buffer size for [`open_buffered`] when the caller has no
/// stronger opinion.
pub const DEFAULT_BUFSIZE: usize = 256 * 1024;

// ---------------------------------------------------------------------------
// Mapped
// ---------------------------------------------------------------------------

/// Memory-maps a file. The file's own mapped pages supply every window up to
/// its last 16 bytes without copying; only that final, constant-size tail is
/// ever copied, into a small owned scratch buffer padded with zeros.
#[cfg(feature = "mmap")]
pub struct MappedCursor {
    mmap: memmap2::Mmap,
    read_pos: usize,
    tail: [u8; 2 * SENTINEL_LEN],
}

#[cfg(feature = "mmap")]
impl MappedCursor {
    /// Maps `path` read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CursorError> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and this crate never mutates the
        // backing file concurrently with reading it. Callers who need a
        // stronger guarantee against external mutation of the file should
        // prefer `BufferedCursor`.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        let mut cursor = MappedCursor { mmap, read_pos: 0, tail: [0; 2 * SENTINEL_LEN] };
        cursor.refresh_tail();
        Ok(cursor)
    }

    /// Re-copies the real bytes at `read_pos..len` into `tail`, zero-padded.
    /// Called on construction and after every `advance`, since `peek()` can
    /// never populate `tail` lazily: it takes `&self`, not `&mut self`.
    fn refresh_tail(&mut self) {
        let len = self.mmap.len();
        if self.read_pos + SENTINEL_LEN > len {
            let real = len.saturating_sub(self.read_pos);
            self.tail = [0; 2 * SENTINEL_LEN];
            self.tail[..real].copy_from_slice(&self.mmap[self.read_pos..len]);
        }
    }
}

#[cfg(feature = "mmap")]
impl StreamCursor for MappedCursor {
    fn peek(&self) -> &[u8] {
        let len = self.mmap.len();
        if self.read_pos + SENTINEL_LEN <= len {
            // Still comfortably inside the file: a 16-byte load anywhere in
            // this slice lands on real mapped bytes, so no padding is
            // needed.
            &self.mmap[self.read_pos..len]
        } else {
            &self.tail[..(len - self.read_pos) + SENTINEL_LEN]
        }
    }

    fn valid_len(&self) -> usize {
        self.mmap.len() - self.read_pos
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.valid_len());
        self.read_pos += n;
        self.refresh_tail();
    }

    fn consumed_window(&self, len: usize) -> &[u8] {
        &self.mmap[self.read_pos - len..self.read_pos]
    }

    fn refill(&mut self) -> Result<bool, CursorError> {
        // The entire file is already mapped at `open()`, so there is never
        // more data to discover after the fact; this exists only to satisfy
        // the trait. `tail` is kept current by `refresh_tail` in `open` and
        // `advance`, not here.
        Ok(self.valid_len() > 0)
    }

    fn at_eof(&self) -> bool {
        // The whole file is mapped upfront: `valid_len()` already reports
        // every real byte this cursor will ever expose for the current
        // `read_pos`, and no `refill` call can grow it. So, unlike the
        // other cursors, EOF is known immediately rather than discovered
        // after an unsuccessful refill — any index past `valid_len()` is
        // confirmed, not provisional, sentinel padding.
        true
    }

    fn position(&self) -> u64 {
        self.read_pos as u64
    }
}

// ---------------------------------------------------------------------------
// Buffered
// ---------------------------------------------------------------------------

/// Owns a growable byte buffer fed by reading from a [`Read`] source.
/// Compacts the buffer when the unread prefix grows past half its target
/// chunk size, and maintains a zero-filled sentinel tail past every
/// refilled `write_end`.
#[cfg(feature = "std")]
pub struct BufferedCursor<R> {
    source: R,
    buf: Vec<u8>,
    read_pos: usize,
    write_end: usize,
    eof: bool,
    chunk_size: usize,
    dropped: u64,
}

#[cfg(feature = "std")]
impl<R: Read> BufferedCursor<R> {
    /// Creates a cursor that reads from `source` in chunks of `bufsize`
    /// bytes (at most).
    pub fn new(source: R, bufsize: usize) -> Self {
        let bufsize = bufsize.max(SENTINEL_LEN);
        let buf = vec![0u8; SENTINEL_LEN];
        BufferedCursor { source, buf, read_pos: 0, write_end: 0, eof: false, chunk_size: bufsize, dropped: 0 }
    }
}

#[cfg(feature = "std")]
impl<R: Read> StreamCursor for BufferedCursor<R> {
    fn peek(&self) -> &[u8] {
        &self.buf[self.read_pos..]
    }

    fn valid_len(&self) -> usize {
        self.write_end - self.read_pos
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.valid_len());
        self.read_pos += n;
    }

    fn consumed_window(&self, len: usize) -> &[u8] {
        &self.buf[self.read_pos - len..self.read_pos]
    }

    fn refill(&mut self) -> Result<bool, CursorError> {
        if self.eof {
            return Ok(false);
        }

        if self.read_pos > self.chunk_size / 2 {
            self.buf.copy_within(self.read_pos..self.write_end, 0);
            self.write_end -= self.read_pos;
            self.dropped += self.read_pos as u64;
            self.read_pos = 0;
        }

        let read_start = self.write_end;
        self.buf.resize(read_start + self.chunk_size + SENTINEL_LEN, 0);

        let mut total_read = 0;
        while total_read < self.chunk_size {
            let n = self.source.read(&mut self.buf[read_start + total_read..read_start + self.chunk_size])?;
            if n == 0 {
                break;
            }
            total_read += n;
        }

        self.write_end = read_start + total_read;
        self.buf.truncate(self.write_end + SENTINEL_LEN);
        self.buf[self.write_end..].fill(0);

        if total_read == 0 {
            self.eof = true;
            return Ok(false);
        }
        Ok(true)
    }

    fn at_eof(&self) -> bool {
        self.eof && self.read_pos >= self.write_end
    }

    fn position(&self) -> u64 {
        self.dropped + self.read_pos as u64
    }
}

// ---------------------------------------------------------------------------
// Iterable
// ---------------------------------------------------------------------------

/// An externally-driven source of byte chunks of arbitrary size, e.g. one
/// backed by a network stream or an FFI callback.
#[cfg(feature = "alloc")]
pub trait ChunkSupplier {
    /// Returns the next chunk, or `None` once the supplier is exhausted.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, CursorError>;
}

/// Consumes arbitrarily-sized chunks from a [`ChunkSupplier`]. Behaves like
/// [`BufferedCursor`] otherwise (same compaction and sentinel-tail
/// maintenance).
#[cfg(feature = "alloc")]
pub struct IterableCursor<S> {
    supplier: S,
    buf: Vec<u8>,
    read_pos: usize,
    write_end: usize,
    eof: bool,
    compaction_threshold: usize,
    dropped: u64,
}

#[cfg(feature = "alloc")]
impl<S: ChunkSupplier> IterableCursor<S> {
    /// Creates a cursor driven by `supplier`.
    pub fn new(supplier: S) -> Self {
        IterableCursor {
            supplier,
            buf: vec![0u8; SENTINEL_LEN],
            read_pos: 0,
            write_end: 0,
            eof: false,
            compaction_threshold: DEFAULT_BUFSIZE / 2,
            dropped: 0,
        }
    }
}

#[cfg(feature = "alloc")]
impl<S: ChunkSupplier> StreamCursor for IterableCursor<S> {
    fn peek(&self) -> &[u8] {
        &self.buf[self.read_pos..]
    }

    fn valid_len(&self) -> usize {
        self.write_end - self.read_pos
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.valid_len());
        self.read_pos += n;
    }

    fn consumed_window(&self, len: usize) -> &[u8] {
        &self.buf[self.read_pos - len..self.read_pos]
    }

    fn refill(&mut self) -> Result<bool, CursorError> {
        if self.eof {
            return Ok(false);
        }

        if self.read_pos > self.compaction_threshold {
            self.buf.copy_within(self.read_pos..self.write_end, 0);
            self.write_end -= self.read_pos;
            self.dropped += self.read_pos as u64;
            self.read_pos = 0;
        }

        match self.supplier.next_chunk()? {
            Some(chunk) => {
                let new_end = self.write_end + chunk.len();
                self.buf.resize(new_end + SENTINEL_LEN, 0);
                self.buf[self.write_end..new_end].copy_from_slice(&chunk);
                self.write_end = new_end;
                self.buf[self.write_end..].fill(0);
                Ok(true)
            }
            None => {
                self.eof = true;
                Ok(false)
            }
        }
    }

    fn at_eof(&self) -> bool {
        self.eof && self.read_pos >= self.write_end
    }

    fn position(&self) -> u64 {
        self.dropped + self.read_pos as u64
    }
}
