//! Reader: ties a [`StreamCursor`], a [`Dialect`], and a header policy
//! together into a row-at-a-time iterator-like API.

use alloc::vec::Vec;

use crate::cell::CellView;
use crate::cursor::StreamCursor;
use crate::dialect::{Dialect, HeaderPolicy};
use crate::error::{ParseError, ViewError};
use crate::header::HeaderMap;
use crate::row::{self, CellSpan};

/// Builds a [`Reader`] over `cursor`, applying `header_policy`.
///
/// When `header_policy` is [`HeaderPolicy::HasHeader`], this eagerly reads
/// and consumes the stream's first row to build the column name map; that
/// row is not returned by any later call to
/// [`Reader::next_row`]. [`HeaderPolicy::ProvidedNames`] builds the map
/// from the given names without touching the stream, so the first row
/// read from the stream is yielded like any other.
pub fn make_reader<C: StreamCursor>(
    mut cursor: C,
    dialect: Dialect,
    header_policy: HeaderPolicy<'_>,
) -> Result<Reader<C>, ParseError> {
    let mut cells = Vec::new();
    let header = match header_policy {
        HeaderPolicy::NoHeader => None,
        HeaderPolicy::ProvidedNames(names) => Some(HeaderMap::from_names(names)),
        HeaderPolicy::HasHeader => match row::parse_row(&mut cursor, &dialect, &mut cells)? {
            Some(meta) => Some(HeaderMap::from_row(cursor.consumed_window(meta.byte_len), &cells)),
            None => Some(HeaderMap::from_names(&[])),
        },
    };
    Ok(Reader { cursor, dialect, header, cells: Vec::new(), poisoned: false })
}

/// A row-at-a-time CSV reader over a [`StreamCursor`].
///
/// Every call to [`next_row`](Reader::next_row) reuses the same internal
/// cell-span buffer; the returned [`RowView`] borrows from `self` and must
/// be dropped (or its contents copied out) before the next call.
pub struct Reader<C> {
    cursor: C,
    dialect: Dialect,
    header: Option<HeaderMap>,
    cells: Vec<CellSpan>,
    poisoned: bool,
}

impl<C: StreamCursor> Reader<C> {
    /// Parses and returns the next row, or `None` at a clean end of stream.
    ///
    /// Once this returns `Some(Err(ParseError::Cursor(_)))`, every later
    /// call returns `Some(Err(ParseError::Poisoned))` instead of touching
    /// the cursor again: a cursor that has already failed is not
    /// trustworthy to retry.
    pub fn next_row(&mut self) -> Option<Result<RowView<'_>, ParseError>> {
        if self.poisoned {
            return Some(Err(ParseError::Poisoned));
        }
        match row::parse_row(&mut self.cursor, &self.dialect, &mut self.cells) {
            Ok(Some(meta)) => {
                let bytes = self.cursor.consumed_window(meta.byte_len);
                Some(Ok(RowView { bytes, spans: &self.cells, dialect: &self.dialect, header: self.header.as_ref() }))
            }
            Ok(None) => None,
            Err(ParseError::Cursor(err)) => {
                self.poisoned = true;
                Some(Err(ParseError::Cursor(err)))
            }
            Err(other) => Some(Err(other)),
        }
    }

    /// The column name map built from a header row or provided names, if
    /// any.
    pub fn header_names(&self) -> Option<impl Iterator<Item = &[u8]> + '_> {
        self.header.as_ref().map(|h| (0..h.column_count()).map(move |i| h.name_at(i)))
    }
}

/// A single parsed record, borrowed from the [`Reader`] that produced it.
#[derive(Copy, Clone)]
pub struct RowView<'a> {
    bytes: &'a [u8],
    spans: &'a [CellSpan],
    dialect: &'a Dialect,
    header: Option<&'a HeaderMap>,
}

impl<'a> RowView<'a> {
    /// Number of cells in this row.
    pub fn count(&self) -> usize {
        self.spans.len()
    }

    /// The cell at `index`.
    pub fn by_index(&self, index: usize) -> Result<CellView<'a>, ViewError> {
        self.spans
            .get(index)
            .map(|span| CellView::new(self.bytes, *span, self.dialect))
            .ok_or(ViewError::IndexOutOfRange { index, count: self.spans.len() })
    }

    /// The cell under the header column named `name`.
    ///
    /// Requires the reader to have been built with
    /// [`HeaderPolicy::HasHeader`](crate::HeaderPolicy::HasHeader) or
    /// [`HeaderPolicy::ProvidedNames`](crate::HeaderPolicy::ProvidedNames).
    pub fn by_name(&self, name: &str) -> Result<CellView<'a>, ViewError> {
        let header = self.header.ok_or(ViewError::UnknownColumn)?;
        let index = header.index_of(name).ok_or(ViewError::UnknownColumn)?;
        self.by_index(index)
    }

    /// Iterates the row's cells in column order.
    pub fn as_tuple(&self) -> impl Iterator<Item = CellView<'a>> + 'a {
        let bytes = self.bytes;
        let dialect = self.dialect;
        self.spans.iter().map(move |span| CellView::new(bytes, *span, dialect))
    }

    /// Iterates `(column name, cell)` pairs. Empty if the reader has no
    /// header map.
    pub fn as_mapping(&self) -> impl Iterator<Item = (&'a [u8], CellView<'a>)> + 'a {
        let bytes = self.bytes;
        let dialect = self.dialect;
        let header = self.header;
        let count = header.map_or(0, |h| h.column_count()).min(self.spans.len());
        let spans = self.spans;
        (0..count).map(move |i| (header.unwrap().name_at(i), CellView::new(bytes, spans[i], dialect)))
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::cursor::open_buffered;
    use std::io::Cursor as IoCursor;

    fn reader_over(data: &'static [u8], policy: HeaderPolicy<'static>) -> Reader<crate::cursor::BufferedCursor<IoCursor<&'static [u8]>>> {
        let cursor = open_buffered(IoCursor::new(data), 64);
        make_reader(cursor, Dialect::default(), policy).unwrap()
    }

    #[test]
    fn basic_rows_no_header() {
        let mut r = reader_over(b"a,b\nc,d\n", HeaderPolicy::NoHeader);
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.count(), 2);
        assert_eq!(row.by_index(0).unwrap().raw(), b"a");
        assert_eq!(row.by_index(1).unwrap().raw(), b"b");
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.by_index(0).unwrap().raw(), b"c");
        assert!(r.next_row().is_none());
    }

    #[test]
    fn header_row_consumed_and_named_lookup() {
        let mut r = reader_over(b"id,name\n1,alice\n2,bob\n", HeaderPolicy::HasHeader);
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.by_name("name").unwrap().raw(), b"alice");
        assert_eq!(row.by_name("id").unwrap().raw(), b"1");
        assert!(row.by_name("missing").is_err());
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.by_name("name").unwrap().raw(), b"bob");
    }

    #[test]
    fn provided_names_yields_first_row_as_data() {
        let mut r = reader_over(b"1,alice\n", HeaderPolicy::ProvidedNames(&["id", "name"]));
        let row = r.next_row().unwrap().unwrap();
        assert_eq!(row.by_name("id").unwrap().raw(), b"1");
        assert_eq!(row.by_name("name").unwrap().raw(), b"alice");
    }
}
