//! Cell to C-buffer conversion.

use crate::cell::{Cell, Row};

use super::binding::{BufferValue, CType, ColumnBuffer, Indicator, TargetBuffer};
use super::error::CursorError;

/// Outcome of a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Complete,
    /// Character data did not fit; the buffer holds a terminated prefix.
    Truncated,
}

impl Transfer {
    fn merge(self, other: Transfer) -> Transfer {
        if self == Transfer::Truncated || other == Transfer::Truncated {
            Transfer::Truncated
        } else {
            Transfer::Complete
        }
    }
}

/// Writes `cell` into `target` according to its C type.
///
/// NULL only sets the indicator. On error the buffer is left unchanged.
/// Character data is cut at a byte boundary, which may split a multi-byte
/// UTF-8 sequence; the indicator always reports the full byte length.
pub fn transfer_cell(cell: &Cell, target: &mut TargetBuffer) -> Result<Transfer, CursorError> {
    if cell.is_null() {
        target.indicator = Some(Indicator::Null);
        return Ok(Transfer::Complete);
    }

    let value = match target.c_type {
        CType::SLong => BufferValue::Long(narrow(integer(cell)?, cell)?),
        CType::SBigInt => BufferValue::BigInt(integer(cell)?),
        CType::SShort => BufferValue::Short(narrow(integer(cell)?, cell)?),
        CType::Float => BufferValue::Float(real(cell)? as f32),
        CType::Double => BufferValue::Double(real(cell)?),
        CType::Char => return Ok(write_text(cell, target)),
    };

    target.value = value;
    target.indicator = target.c_type.fixed_size().map(Indicator::Length);
    Ok(Transfer::Complete)
}

/// Transfers a fetched row into every bound column within its width.
///
/// All bindings are written even when one fails; the first error wins.
pub fn transfer_row<'a>(
    row: &Row,
    bindings: impl IntoIterator<Item = (u16, &'a ColumnBuffer)>,
) -> Result<Transfer, CursorError> {
    let mut outcome = Transfer::Complete;
    let mut first_error = None;

    for (ordinal, buffer) in bindings {
        let Some(cell) = usize::from(ordinal).checked_sub(1).and_then(|i| row.get(i)) else {
            continue;
        };
        match transfer_cell(cell, &mut buffer.lock()) {
            Ok(t) => outcome = outcome.merge(t),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(outcome),
    }
}

fn write_text(cell: &Cell, target: &mut TargetBuffer) -> Transfer {
    let text = cell.to_text().unwrap_or_default();
    let bytes = text.as_bytes();
    target.indicator = Some(Indicator::Length(bytes.len()));

    if target.capacity == 0 {
        return if bytes.is_empty() {
            Transfer::Complete
        } else {
            Transfer::Truncated
        };
    }

    let copy = bytes.len().min(target.capacity - 1);
    let mut written = Vec::with_capacity(copy + 1);
    written.extend_from_slice(&bytes[..copy]);
    written.push(0);
    target.value = BufferValue::Char(written);

    if copy < bytes.len() {
        Transfer::Truncated
    } else {
        Transfer::Complete
    }
}

fn integer(cell: &Cell) -> Result<i64, CursorError> {
    match cell {
        Cell::Integer(n) => Ok(*n),
        Cell::Real(x) => {
            let t = x.trunc();
            if t >= i64::MIN as f64 && t <= i64::MAX as f64 {
                Ok(t as i64)
            } else {
                Err(CursorError::NumericOutOfRange(x.to_string()))
            }
        }
        Cell::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return Ok(n);
            }
            match s.parse::<f64>() {
                Ok(x) if x.is_finite() => integer(&Cell::Real(x)),
                Ok(_) => Err(CursorError::NumericOutOfRange(s.to_string())),
                Err(_) => Err(CursorError::InvalidCharacterValue(s.to_string())),
            }
        }
        Cell::Null => Ok(0),
    }
}

fn real(cell: &Cell) -> Result<f64, CursorError> {
    match cell {
        Cell::Integer(n) => Ok(*n as f64),
        Cell::Real(x) => Ok(*x),
        Cell::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| CursorError::InvalidCharacterValue(s.clone())),
        Cell::Null => Ok(0.0),
    }
}

fn narrow<T: TryFrom<i64>>(n: i64, cell: &Cell) -> Result<T, CursorError> {
    T::try_from(n).map_err(|_| CursorError::NumericOutOfRange(cell.to_string()))
}
