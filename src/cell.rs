//! Cell values and SQL type tags.
//!
//! This module defines the value model shared by generated, literal and
//! inserted data. [`Cell`] is a closed sum type with a total structural order,
//! and [`SqlType`] carries the ODBC SQL data type codes reported to callers.

use std::cmp::Ordering;
use std::fmt;

/// ODBC SQL data type.
///
/// Each variant maps to the numeric code an ODBC driver reports through
/// `SQLDescribeCol` and the catalog functions (see [`code()`](SqlType::code)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Char,
    Varchar,
    LongVarchar,
    WChar,
    WVarchar,
    WLongVarchar,
    Decimal,
    Numeric,
    SmallInt,
    Integer,
    Real,
    Float,
    Double,
    Bit,
    TinyInt,
    BigInt,
    Binary,
    VarBinary,
    LongVarBinary,
    Date,
    Time,
    Timestamp,
    Guid,
}

impl SqlType {
    /// Returns the ODBC type code (`SQL_INTEGER` = 4, `SQL_TYPE_DATE` = 91, ...).
    pub const fn code(self) -> i16 {
        match self {
            SqlType::Char => 1,
            SqlType::Varchar => 12,
            SqlType::LongVarchar => -1,
            SqlType::WChar => -8,
            SqlType::WVarchar => -9,
            SqlType::WLongVarchar => -10,
            SqlType::Decimal => 3,
            SqlType::Numeric => 2,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::Real => 7,
            SqlType::Float => 6,
            SqlType::Double => 8,
            SqlType::Bit => -7,
            SqlType::TinyInt => -6,
            SqlType::BigInt => -5,
            SqlType::Binary => -2,
            SqlType::VarBinary => -3,
            SqlType::LongVarBinary => -4,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::Guid => -11,
        }
    }

    /// Returns the type name reported in catalog result sets.
    pub const fn type_name(self) -> &'static str {
        match self {
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::LongVarchar => "TEXT",
            SqlType::WChar => "NCHAR",
            SqlType::WVarchar => "NVARCHAR",
            SqlType::WLongVarchar => "NTEXT",
            SqlType::Decimal => "DECIMAL",
            SqlType::Numeric => "NUMERIC",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::BigInt => "BIGINT",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::LongVarBinary => "BLOB",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Guid => "GUID",
        }
    }

    /// Returns true for the exact and approximate numeric types.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            SqlType::Decimal
                | SqlType::Numeric
                | SqlType::SmallInt
                | SqlType::Integer
                | SqlType::Real
                | SqlType::Float
                | SqlType::Double
                | SqlType::TinyInt
                | SqlType::BigInt
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A resolved column type: SQL type tag plus size and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub sql_type: SqlType,
    /// Column size (precision for numerics, characters for strings).
    pub column_size: usize,
    /// Decimal digits (scale).
    pub decimal_digits: i16,
}

impl TypeSpec {
    pub const fn new(sql_type: SqlType, column_size: usize, decimal_digits: i16) -> Self {
        Self {
            sql_type,
            column_size,
            decimal_digits,
        }
    }

    /// Resolves a SQL type name such as `VARCHAR`, `DECIMAL` or `DOUBLE PRECISION`.
    ///
    /// `params` are the parenthesized size arguments, if any. Unknown names
    /// resolve to `VARCHAR(255)`.
    pub fn from_type_name(name: &str, params: &[usize]) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let first = upper.split_whitespace().next().unwrap_or("");
        let size = |default: usize| params.first().copied().unwrap_or(default);
        let scale = |default: i16| {
            params
                .get(1)
                .map(|&s| s.min(i16::MAX as usize) as i16)
                .unwrap_or(default)
        };

        match first {
            "INTEGER" | "INT" => TypeSpec::new(SqlType::Integer, 10, 0),
            "SMALLINT" => TypeSpec::new(SqlType::SmallInt, 5, 0),
            "TINYINT" => TypeSpec::new(SqlType::TinyInt, 3, 0),
            "BIGINT" | "SIGNED" | "UNSIGNED" => TypeSpec::new(SqlType::BigInt, 19, 0),
            "VARCHAR" | "VARCHAR2" | "CHARACTER" if upper.contains("VARYING") || first != "CHARACTER" => {
                TypeSpec::new(SqlType::Varchar, size(255), 0)
            }
            "CHAR" | "CHARACTER" => TypeSpec::new(SqlType::Char, size(1), 0),
            "NVARCHAR" => TypeSpec::new(SqlType::WVarchar, size(255), 0),
            "NCHAR" => TypeSpec::new(SqlType::WChar, size(1), 0),
            "TEXT" | "CLOB" | "LONGVARCHAR" => TypeSpec::new(SqlType::LongVarchar, 65535, 0),
            "NTEXT" => TypeSpec::new(SqlType::WLongVarchar, 65535, 0),
            "DECIMAL" | "DEC" => TypeSpec::new(SqlType::Decimal, size(18), scale(2)),
            "NUMERIC" => TypeSpec::new(SqlType::Numeric, size(18), scale(2)),
            "REAL" => TypeSpec::new(SqlType::Real, 7, 0),
            "FLOAT" => TypeSpec::new(SqlType::Float, 15, 0),
            "DOUBLE" => TypeSpec::new(SqlType::Double, 15, 0),
            "DATE" => TypeSpec::new(SqlType::Date, 10, 0),
            "TIME" => TypeSpec::new(SqlType::Time, 8, 0),
            "TIMESTAMP" | "DATETIME" => TypeSpec::new(SqlType::Timestamp, 26, 6),
            "BIT" | "BOOLEAN" | "BOOL" => TypeSpec::new(SqlType::Bit, 1, 0),
            "BINARY" => TypeSpec::new(SqlType::Binary, size(255), 0),
            "VARBINARY" => TypeSpec::new(SqlType::VarBinary, size(255), 0),
            "BLOB" | "LONGVARBINARY" => TypeSpec::new(SqlType::LongVarBinary, 65535, 0),
            "UUID" | "GUID" | "UNIQUEIDENTIFIER" => TypeSpec::new(SqlType::Guid, 36, 0),
            _ => TypeSpec::new(SqlType::Varchar, 255, 0),
        }
    }
}

/// A single database cell.
///
/// Equality and ordering are structural: two cells are equal only when they
/// hold the same variant and the same value. Across variants the order is
/// `Null < Integer < Real < Text`, which keeps ORDER BY deterministic.
#[derive(Debug, Clone)]
pub enum Cell {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// Double-precision float.
    Real(f64),
    /// Character data.
    Text(String),
}

/// An ordered sequence of cells aligned to a table's column list.
pub type Row = Vec<Cell>;

impl Cell {
    /// Shorthand for `Cell::Text(s.into())`.
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Returns true if this cell is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn tag(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Integer(_) => 1,
            Cell::Real(_) => 2,
            Cell::Text(_) => 3,
        }
    }

    /// Renders the cell as character data, or `None` for NULL.
    ///
    /// Reals use six fixed decimals, matching C's `%f`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Integer(n) => Some(n.to_string()),
            Cell::Real(r) => Some(format!("{r:.6}")),
            Cell::Text(s) => Some(s.clone()),
        }
    }

    /// Renders the cell as a SQL literal that parses back to the same cell.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Cell::Null => "NULL".to_string(),
            Cell::Integer(n) => n.to_string(),
            Cell::Real(r) => {
                let s = r.to_string();
                if s.contains('.') || s.contains('e') || !r.is_finite() {
                    s
                } else {
                    format!("{s}.0")
                }
            }
            Cell::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::Null, Cell::Null) => Ordering::Equal,
            (Cell::Integer(a), Cell::Integer(b)) => a.cmp(b),
            (Cell::Real(a), Cell::Real(b)) => a.total_cmp(b),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            _ => self.tag().cmp(&other.tag()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(s) => f.write_str(&s),
            None => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Integer(n)
    }
}

impl From<f64> for Cell {
    fn from(r: f64) -> Self {
        Cell::Real(r)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}
