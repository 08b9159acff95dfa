//! `csvtok`: a vectorized, lazy-decoding, zero-copy CSV tokenizer.
//!
//! Parsing a row never allocates to identify a cell — only
//! [`CellView::unescaped`] or [`CellView::as_double`] do, and only when the
//! cell actually contains an escape sequence. The crate is organized around
//! five small pieces that can each be used independently:
//!
//! - [`bcs`] — the byte-class scanner, a 16-byte vectorized search
//!   primitive with a scalar fallback of identical contract.
//! - [`cursor`] — [`StreamCursor`], a source of byte windows with a
//!   zero-filled sentinel tail, realized over a memory-mapped file
//!   ([`cursor::MappedCursor`]), a `Read` source ([`cursor::BufferedCursor`]),
//!   or an arbitrary chunk supplier ([`cursor::IterableCursor`]).
//! - [`row`] — the record-level state machine, [`row::parse_row`].
//! - [`cell`] — [`CellView`], lazy per-field decoding.
//! - [`reader`] — [`Reader`], [`RowView`], the row-at-a-time public API.
//!
//! ```
//! use csvtok::{make_reader, open_buffered, Dialect, HeaderPolicy};
//!
//! let data: &[u8] = b"id,name\n1,alice\n2,bob\n";
//! let cursor = open_buffered(data, 4096);
//! let mut reader = make_reader(cursor, Dialect::default(), HeaderPolicy::HasHeader).unwrap();
//!
//! while let Some(row) = reader.next_row() {
//!     let row = row.unwrap();
//!     assert!(row.by_name("name").is_ok());
//! }
//! ```

#![no_std]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod bcs;
pub mod cursor;
pub mod dialect;
pub mod error;

#[cfg(feature = "alloc")]
pub mod cell;
#[cfg(feature = "alloc")]
pub mod header;
#[cfg(feature = "alloc")]
pub mod reader;
#[cfg(feature = "alloc")]
pub mod row;

pub use bcs::{scan_window, scan_window_scalar, ByteClass};
pub use cursor::{StreamCursor, SENTINEL_LEN};
pub use dialect::{Dialect, HeaderPolicy};
pub use error::{CursorError, ParseError, ViewError};

#[cfg(feature = "std")]
pub use cursor::{open_buffered, BufferedCursor, DEFAULT_BUFSIZE};

#[cfg(feature = "mmap")]
pub use cursor::{open_mapped, MappedCursor};

#[cfg(feature = "alloc")]
pub use cursor::{open_iter, ChunkSupplier, IterableCursor};

#[cfg(feature = "alloc")]
pub use cell::CellView;
#[cfg(feature = "alloc")]
pub use reader::{make_reader, Reader, RowView};
