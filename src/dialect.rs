//! Dialect configuration: the delimiter/quote/escape/newline rules a
//! particular CSV-family file follows.

/// Immutable configuration fixed at parser construction.
///
/// Built with [`Dialect::default`] plus the `with_*` setters, mirroring the
/// teacher crate's `Csv::new` / `Csv::with_separator` split between a
/// zero-config constructor and explicit customization.
///
/// # Example
///
/// ```
/// use csvtok::Dialect;
///
/// // Parsing TSV instead of CSV
/// let tsv = Dialect::default().with_delimiter(b'\t');
/// assert_eq!(tsv.delimiter(), b'\t');
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Dialect {
    delimiter: u8,
    quote: u8,
    escape: u8,
    yield_incomplete_row: bool,
}

impl Dialect {
    /// Sets the field delimiter. Default: `,`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote byte. Default: `"`.
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the escape byte. Default: equal to the quote byte, giving the
    /// doubled-quote escaping convention. Set to a distinct byte to switch to
    /// single-byte C-style escaping (`escape` followed by the escaped byte,
    /// copied verbatim).
    pub fn with_escape(mut self, escape: u8) -> Self {
        self.escape = escape;
        self
    }

    /// When set, a row that ends mid-quoted-field at EOF is emitted with its
    /// last cell marked `escaped = true` and a diagnostic flag, instead of
    /// raising [`ParseError::UnterminatedQuotedField`](crate::ParseError::UnterminatedQuotedField).
    pub fn with_incomplete_rows(mut self, yield_incomplete_row: bool) -> Self {
        self.yield_incomplete_row = yield_incomplete_row;
        self
    }

    /// The configured field delimiter.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// The configured quote byte.
    pub fn quote(&self) -> u8 {
        self.quote
    }

    /// The configured escape byte.
    pub fn escape(&self) -> u8 {
        self.escape
    }

    /// Whether an incomplete row at EOF is emitted rather than rejected.
    pub fn yield_incomplete_row(&self) -> bool {
        self.yield_incomplete_row
    }

    /// `true` when `escape == quote`, i.e. the doubled-quote escaping
    /// convention applies.
    pub(crate) fn doubled_quote_escape(&self) -> bool {
        self.escape == self.quote
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: b',',
            quote: b'"',
            escape: b'"',
            yield_incomplete_row: false,
        }
    }
}

/// How the first row of a stream is treated.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum HeaderPolicy<'a> {
    /// The first row read from the stream is consumed to build the header
    /// map and is not itself yielded as data.
    HasHeader,
    /// There is no header; rows are accessible only by index.
    #[default]
    NoHeader,
    /// The caller supplies column names directly; every row (including the
    /// first) is yielded as data.
    ProvidedNames(&'a [&'a str]),
}
