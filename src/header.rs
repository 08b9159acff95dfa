//! Header map: name-to-index lookup built either from the stream's first
//! row or from caller-provided names.

use alloc::vec::Vec;

use crate::dialect::HeaderPolicy;
use crate::row::CellSpan;

/// Resolves column names to indices for a [`Reader`](crate::Reader)
/// configured with [`HeaderPolicy::HasHeader`] or
/// [`HeaderPolicy::ProvidedNames`].
///
/// Lookup is a linear scan over the column names: CSV files in this crate's
/// target range (tens to low hundreds of columns) make a linear scan faster
/// in practice than building a hash map for a structure only looked up a
/// handful of times per row.
#[derive(Clone, Debug, Default)]
pub(crate) struct HeaderMap {
    names: Vec<Vec<u8>>,
}

impl HeaderMap {
    /// Builds a header map from provided names.
    pub(crate) fn from_names(names: &[&str]) -> Self {
        HeaderMap { names: names.iter().map(|n| n.as_bytes().to_vec()).collect() }
    }

    /// Builds a header map from a header row's raw bytes and cell spans.
    /// Cells are copied since the header row's buffer region will be
    /// overwritten by later refills.
    pub(crate) fn from_row(row_bytes: &[u8], spans: &[CellSpan]) -> Self {
        let names = spans.iter().map(|span| row_bytes[span.start..span.start + span.len].to_vec()).collect();
        HeaderMap { names }
    }

    /// Index of the first column whose name equals `name`, or `None`.
    /// On duplicate names, the first match wins.
    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_slice() == name.as_bytes())
    }

    pub(crate) fn column_count(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn name_at(&self, index: usize) -> &[u8] {
        &self.names[index]
    }
}
