//! Error types surfaced by the row parser and the stream cursors.

#[cfg(feature = "std")]
use std::io;

use thiserror::Error;

/// Errors that can occur while pulling the next row from a [`Reader`](crate::Reader).
///
/// `ParseError` is returned by [`Reader::next_row`](crate::Reader::next_row)
/// in place of a row. Once a [`Cursor`](ParseError::Cursor) error is
/// returned, it is sticky: every subsequent call returns
/// [`Poisoned`](ParseError::Poisoned) instead, since the underlying cursor is
/// no longer trustworthy to retry.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The stream cursor failed to refill (I/O error, or a malformed chunk
    /// from an iterable source). Fatal for the rest of the stream.
    #[error("stream cursor failed: {0}")]
    Cursor(#[from] CursorError),

    /// End-of-file was reached while the parser was in `IN_QUOTED`, and the
    /// dialect does not set `yield_incomplete_row`.
    #[error("unterminated quoted field starting at byte offset {start}")]
    UnterminatedQuotedField {
        /// Byte offset (relative to the start of the stream) of the opening quote.
        start: u64,
    },

    /// A byte other than the delimiter or a newline followed a closing quote
    /// (strict mode, see `Dialect`).
    #[error("malformed quoted field: unexpected byte after closing quote at offset {offset}")]
    MalformedQuotedField {
        /// Byte offset (relative to the start of the stream) of the unexpected byte.
        offset: u64,
    },

    /// A previous call already returned [`Cursor`](ParseError::Cursor), and
    /// the reader has not been recreated since. `CursorError` is not
    /// `Clone`, so this variant carries no payload; the original error was
    /// already delivered once.
    #[error("reader is poisoned by a prior stream cursor failure")]
    Poisoned,
}

/// Errors raised by [`CellView`](crate::CellView) accessors.
///
/// These are local to the view and never disturb parser state: the reader
/// can keep being pulled from after one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// [`RowView::by_index`](crate::RowView::by_index) was called with an
    /// index `>=` the row's cell count.
    #[error("cell index {index} out of range (row has {count} cells)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of cells actually present in the row.
        count: usize,
    },

    /// [`RowView::by_name`](crate::RowView::by_name) was called but no header
    /// column matches the given name.
    #[error("unknown column")]
    UnknownColumn,
}

/// Errors raised while opening or refilling a [`StreamCursor`](crate::StreamCursor).
#[derive(Error, Debug)]
pub enum CursorError {
    /// The underlying byte source failed.
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// An externally-supplied chunk iterator returned a chunk even though it
    /// had already signaled end-of-data, or otherwise violated the chunk
    /// supplier contract.
    #[error("chunk supplier contract violated: {0}")]
    BadChunkSupplier(&'static str),
}
