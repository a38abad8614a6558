//! Column and parameter bindings.
//!
//! A binding shares a buffer between the caller and the statement: the
//! caller keeps one handle to read fetched values (or to set parameter
//! values before execute), the statement keeps the other.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cell::Cell;

/// C data type of a caller buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CType {
    /// `SQL_C_SLONG` (32-bit).
    SLong,
    /// `SQL_C_SBIGINT` (64-bit).
    SBigInt,
    /// `SQL_C_SSHORT` (16-bit).
    SShort,
    /// `SQL_C_FLOAT` (32-bit).
    Float,
    /// `SQL_C_DOUBLE` (64-bit).
    Double,
    /// `SQL_C_CHAR`: null-terminated character data.
    Char,
}

impl CType {
    /// Byte width of fixed-size types.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            CType::SLong | CType::Float => Some(4),
            CType::SBigInt | CType::Double => Some(8),
            CType::SShort => Some(2),
            CType::Char => None,
        }
    }
}

/// Length/indicator value written next to a transferred value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// `SQL_NULL_DATA`
    Null,
    /// Byte length of the full value, before any truncation.
    Length(usize),
}

/// Value last written into a [`TargetBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub enum BufferValue {
    Empty,
    Long(i32),
    BigInt(i64),
    Short(i16),
    Float(f32),
    Double(f64),
    /// Bytes written, including the terminating NUL.
    Char(Vec<u8>),
}

/// A caller-owned output buffer of a fixed C type and capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBuffer {
    pub c_type: CType,
    /// Buffer length in bytes; only meaningful for [`CType::Char`].
    pub capacity: usize,
    pub value: BufferValue,
    pub indicator: Option<Indicator>,
}

impl TargetBuffer {
    pub fn new(c_type: CType, capacity: usize) -> Self {
        Self {
            c_type,
            capacity,
            value: BufferValue::Empty,
            indicator: None,
        }
    }

    /// A character buffer of `capacity` bytes, terminator included.
    pub fn char(capacity: usize) -> Self {
        Self::new(CType::Char, capacity)
    }

    /// Creates a shareable binding around this buffer.
    pub fn shared(self) -> ColumnBuffer {
        Arc::new(Mutex::new(self))
    }

    pub fn is_null(&self) -> bool {
        self.indicator == Some(Indicator::Null)
    }

    /// Character contents up to the terminator.
    pub fn text(&self) -> Option<String> {
        match &self.value {
            BufferValue::Char(bytes) => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            _ => None,
        }
    }

    /// Integer contents of any integer buffer.
    pub fn integer(&self) -> Option<i64> {
        match self.value {
            BufferValue::Long(n) => Some(n.into()),
            BufferValue::BigInt(n) => Some(n),
            BufferValue::Short(n) => Some(n.into()),
            _ => None,
        }
    }

    /// Floating-point contents of a float or double buffer.
    pub fn real(&self) -> Option<f64> {
        match self.value {
            BufferValue::Float(x) => Some(x.into()),
            BufferValue::Double(x) => Some(x),
            _ => None,
        }
    }
}

/// A bound output column.
pub type ColumnBuffer = Arc<Mutex<TargetBuffer>>;

/// A bound input parameter; its value is read at execute time.
pub type ParamBuffer = Arc<Mutex<Cell>>;

/// Creates a parameter binding holding `value`.
pub fn param(value: impl Into<Cell>) -> ParamBuffer {
    Arc::new(Mutex::new(value.into()))
}

/// Sparse bindings keyed by 1-based ordinal.
#[derive(Debug)]
pub struct Bindings<T> {
    slots: BTreeMap<u16, T>,
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }
}

impl<T> Bindings<T> {
    /// Binds `ordinal`, replacing any previous binding. `None` unbinds.
    pub fn bind(&mut self, ordinal: u16, target: Option<T>) {
        match target {
            Some(target) => {
                self.slots.insert(ordinal, target);
            }
            None => {
                self.slots.remove(&ordinal);
            }
        }
    }

    pub fn get(&self, ordinal: u16) -> Option<&T> {
        self.slots.get(&ordinal)
    }

    /// Bindings in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &T)> {
        self.slots.iter().map(|(&k, v)| (k, v))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Bindings<ParamBuffer> {
    /// Snapshot of parameter values `1..=count`; unbound slots are NULL.
    pub fn values(&self, count: usize) -> Vec<Cell> {
        (1..=count)
            .map(|i| {
                u16::try_from(i)
                    .ok()
                    .and_then(|i| self.get(i))
                    .map_or(Cell::Null, |slot| slot.lock().clone())
            })
            .collect()
    }
}
