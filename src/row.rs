//! Row Parser: the byte-level CSV state machine.
//!
//! Consumes bytes from a [`StreamCursor`]'s current window, emits a sequence
//! of [`CellSpan`]s into a reused cell vector, and advances the cursor by
//! exactly one record's worth of bytes per successful call to
//! [`parse_row`].
//!
//! # Why the cursor only advances once per row
//!
//! [`StreamCursor::refill`] is free to compact or grow its backing buffer.
//! Compaction shifts bytes to the front of the buffer but preserves their
//! position *relative to the current read position*; growth never shifts
//! existing bytes at all. So as long as [`StreamCursor::advance`] is not
//! called until a whole row has been scanned, every offset this module
//! computes (always relative to the row's first byte) stays valid across
//! any number of intervening `refill` calls. This is why `parse_row` tracks
//! a purely local `scan_pos` instead of calling `advance` per field, and
//! only calls `advance` once, right before returning.

use alloc::vec::Vec;

use memchr::{memchr, memchr2, memchr3};

use crate::cursor::StreamCursor;
use crate::dialect::Dialect;
use crate::error::{CursorError, ParseError};

/// A single field within a record: a byte span relative to the row's first
/// byte, plus whether it may contain escape sequences that differ from the
/// decoded content.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CellSpan {
    /// Offset of the cell's first byte, relative to the row's first byte.
    pub start: usize,
    /// Length of the cell's raw (not-yet-unescaped) byte span.
    pub len: usize,
    /// Whether the raw bytes may differ from the decoded content.
    pub escaped: bool,
}

/// Metadata about a successfully parsed row, beyond its cell spans.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct RowMeta {
    /// Set when the row was emitted early due to EOF inside a quoted field
    /// with `yield_incomplete_row` set.
    pub(crate) incomplete: bool,
    /// Total number of bytes this row occupies (what was passed to
    /// `cursor.advance`).
    pub(crate) byte_len: usize,
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum State {
    FieldStart,
    InUnquoted,
    InQuoted,
    AfterQuoted,
}

/// Parses the next record from `cursor` into `cells`, advancing `cursor` by
/// exactly the bytes that record occupies.
///
/// Returns `Ok(None)` at a clean end of stream (no more bytes, no pending
/// row content). `cells` is cleared at the start of the call and is safe to
/// reuse across calls (its allocation is not released).
pub(crate) fn parse_row<C: StreamCursor>(
    cursor: &mut C,
    dialect: &Dialect,
    cells: &mut Vec<CellSpan>,
) -> Result<Option<RowMeta>, ParseError> {
    cells.clear();

    // Make sure there is at least one byte, or a confirmed EOF, before doing
    // anything else.
    ensure_byte_or_eof(cursor, 0)?;
    if cursor.valid_len() == 0 && cursor.at_eof() {
        return Ok(None);
    }

    let mut scan_pos = 0usize;
    let mut field_start = 0usize;
    let mut field_escaped = false;
    let mut state = State::FieldStart;

    loop {
        match state {
            State::FieldStart => {
                ensure_byte_or_eof(cursor, scan_pos)?;
                if cursor.valid_len() <= scan_pos {
                    // EOF exactly at the start of a field.
                    if cells.is_empty() {
                        cursor.advance(scan_pos);
                        return Ok(None);
                    }
                    cells.push(CellSpan { start: field_start, len: 0, escaped: false });
                    cursor.advance(scan_pos);
                    return Ok(Some(RowMeta { incomplete: false, byte_len: scan_pos }));
                }
                let byte = cursor.peek()[scan_pos];
                if byte == dialect.quote() {
                    scan_pos += 1;
                    field_start = scan_pos;
                    field_escaped = false;
                    state = State::InQuoted;
                } else {
                    field_start = scan_pos;
                    field_escaped = false;
                    state = State::InUnquoted;
                }
            }

            State::InUnquoted => {
                match find3(cursor, scan_pos, dialect.delimiter(), b'\r', b'\n')? {
                    Some(pos) => {
                        let byte = cursor.peek()[pos];
                        let cell_len = pos - field_start;
                        if byte == dialect.delimiter() {
                            cells.push(CellSpan { start: field_start, len: cell_len, escaped: false });
                            scan_pos = pos + 1;
                            state = State::FieldStart;
                        } else {
                            cells.push(CellSpan { start: field_start, len: cell_len, escaped: false });
                            scan_pos = consume_newline(cursor, pos, byte)?;
                            cursor.advance(scan_pos);
                            return Ok(Some(RowMeta { incomplete: false, byte_len: scan_pos }));
                        }
                    }
                    None => {
                        // EOF with no delimiter or newline: the last cell ends at
                        // the real data boundary.
                        let valid = cursor.valid_len();
                        let cell_len = valid - field_start;
                        cells.push(CellSpan { start: field_start, len: cell_len, escaped: false });
                        cursor.advance(valid);
                        return Ok(Some(RowMeta { incomplete: false, byte_len: valid }));
                    }
                }
            }

            State::InQuoted => {
                if dialect.doubled_quote_escape() {
                    match find1(cursor, scan_pos, dialect.quote())? {
                        Some(pos) => match byte_after(cursor, pos + 1)? {
                            Some(next) if next == dialect.quote() => {
                                field_escaped = true;
                                scan_pos = pos + 2;
                            }
                            _ => {
                                let cell_len = pos - field_start;
                                cells.push(CellSpan { start: field_start, len: cell_len, escaped: field_escaped });
                                scan_pos = pos + 1;
                                state = State::AfterQuoted;
                            }
                        },
                        None => {
                            return unterminated_quoted(cursor, dialect, cells, field_start, field_escaped);
                        }
                    }
                } else {
                    match find2(cursor, scan_pos, dialect.quote(), dialect.escape())? {
                        Some(pos) => {
                            let byte = cursor.peek()[pos];
                            if byte == dialect.escape() {
                                match byte_after(cursor, pos + 1)? {
                                    Some(_) => {
                                        field_escaped = true;
                                        scan_pos = pos + 2;
                                    }
                                    None => {
                                        return unterminated_quoted(cursor, dialect, cells, field_start, field_escaped);
                                    }
                                }
                            } else {
                                let cell_len = pos - field_start;
                                cells.push(CellSpan { start: field_start, len: cell_len, escaped: field_escaped });
                                scan_pos = pos + 1;
                                state = State::AfterQuoted;
                            }
                        }
                        None => {
                            return unterminated_quoted(cursor, dialect, cells, field_start, field_escaped);
                        }
                    }
                }
            }

            State::AfterQuoted => {
                ensure_byte_or_eof(cursor, scan_pos)?;
                if cursor.valid_len() <= scan_pos {
                    cursor.advance(scan_pos);
                    return Ok(Some(RowMeta { incomplete: false, byte_len: scan_pos }));
                }
                let byte = cursor.peek()[scan_pos];
                if byte == dialect.delimiter() {
                    scan_pos += 1;
                    state = State::FieldStart;
                } else if byte == b'\r' || byte == b'\n' {
                    scan_pos = consume_newline(cursor, scan_pos, byte)?;
                    cursor.advance(scan_pos);
                    return Ok(Some(RowMeta { incomplete: false, byte_len: scan_pos }));
                } else {
                    return Err(ParseError::MalformedQuotedField { offset: cursor.position() + scan_pos as u64 });
                }
            }
        }
    }
}

fn unterminated_quoted<C: StreamCursor>(
    cursor: &mut C,
    dialect: &Dialect,
    cells: &mut Vec<CellSpan>,
    field_start: usize,
    field_escaped: bool,
) -> Result<Option<RowMeta>, ParseError> {
    let valid = cursor.valid_len();
    if dialect.yield_incomplete_row() {
        cells.push(CellSpan { start: field_start, len: valid - field_start, escaped: true });
        let _ = field_escaped;
        cursor.advance(valid);
        Ok(Some(RowMeta { incomplete: true, byte_len: valid }))
    } else {
        let quote_offset = cursor.position() + field_start as u64 - 1;
        Err(ParseError::UnterminatedQuotedField { start: quote_offset })
    }
}

/// Consumes the newline starting at `pos` (which holds `b'\r'` or `b'\n'`)
/// according to the CR/LF/CRLF/LFCR policy, returning the scan position
/// right after the consumed terminator.
fn consume_newline<C: StreamCursor>(cursor: &mut C, pos: usize, byte: u8) -> Result<usize, ParseError> {
    let second = byte_after(cursor, pos + 1)?;
    let pairs_with = if byte == b'\r' { b'\n' } else { b'\r' };
    match second {
        Some(next) if next == pairs_with => Ok(pos + 2),
        _ => Ok(pos + 1),
    }
}

/// Returns `Some(byte)` at `idx`, or `None` if `idx` is at (confirmed) EOF.
/// Blocks on `refill` otherwise.
fn byte_after<C: StreamCursor>(cursor: &mut C, idx: usize) -> Result<Option<u8>, ParseError> {
    ensure_byte_or_eof(cursor, idx)?;
    if cursor.valid_len() <= idx {
        Ok(None)
    } else {
        Ok(Some(cursor.peek()[idx]))
    }
}

/// Refills `cursor` until either `idx` is within the valid region or EOF is
/// confirmed.
fn ensure_byte_or_eof<C: StreamCursor>(cursor: &mut C, idx: usize) -> Result<(), ParseError> {
    while cursor.valid_len() <= idx && !cursor.at_eof() {
        cursor.refill().map_err(cursor_failed)?;
    }
    Ok(())
}

fn cursor_failed(err: CursorError) -> ParseError {
    ParseError::Cursor(err)
}

/// Searches `cursor`'s valid region (refilling as needed) starting at
/// `from` for the first of `a`/`b`/`c`. Returns `None` only once EOF is
/// reached with no match.
fn find3<C: StreamCursor>(cursor: &mut C, from: usize, a: u8, b: u8, c: u8) -> Result<Option<usize>, ParseError> {
    loop {
        let valid = cursor.valid_len();
        if from < valid {
            if let Some(rel) = memchr3(a, b, c, &cursor.peek()[from..valid]) {
                return Ok(Some(from + rel));
            }
        }
        if cursor.at_eof() {
            return Ok(None);
        }
        cursor.refill().map_err(cursor_failed)?;
    }
}

fn find2<C: StreamCursor>(cursor: &mut C, from: usize, a: u8, b: u8) -> Result<Option<usize>, ParseError> {
    loop {
        let valid = cursor.valid_len();
        if from < valid {
            if let Some(rel) = memchr2(a, b, &cursor.peek()[from..valid]) {
                return Ok(Some(from + rel));
            }
        }
        if cursor.at_eof() {
            return Ok(None);
        }
        cursor.refill().map_err(cursor_failed)?;
    }
}

fn find1<C: StreamCursor>(cursor: &mut C, from: usize, needle: u8) -> Result<Option<usize>, ParseError> {
    loop {
        let valid = cursor.valid_len();
        if from < valid {
            if let Some(rel) = memchr(needle, &cursor.peek()[from..valid]) {
                return Ok(Some(from + rel));
            }
        }
        if cursor.at_eof() {
            return Ok(None);
        }
        cursor.refill().map_err(cursor_failed)?;
    }
}
