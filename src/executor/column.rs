//! Result column metadata.
//!
//! A [`ColumnDesc`] describes a single result column: the name reported by
//! `describe_col`, its SQL type with size and scale, and nullability.

use crate::catalog::Column;
use crate::cell::{SqlType, TypeSpec};

/// Metadata describing a result column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDesc {
    /// Column name (or alias).
    pub name: String,
    /// Type, size and scale.
    pub type_spec: TypeSpec,
    pub nullable: bool,
}

impl ColumnDesc {
    /// Creates a nullable column descriptor.
    pub fn new(name: impl Into<String>, type_spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            type_spec,
            nullable: true,
        }
    }

    /// Describes a catalog column under its own name.
    pub fn from_column(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            type_spec: column.type_spec,
            nullable: column.nullable,
        }
    }

    /// A `VARCHAR(128)` column, as used by catalog result sets.
    pub fn varchar(name: &str) -> Self {
        Self::new(name, TypeSpec::new(SqlType::Varchar, 128, 0))
    }

    pub fn char(name: &str) -> Self {
        Self::new(name, TypeSpec::new(SqlType::Char, 1, 0))
    }

    pub fn smallint(name: &str) -> Self {
        Self::new(name, TypeSpec::new(SqlType::SmallInt, 5, 0))
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, TypeSpec::new(SqlType::Integer, 10, 0))
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn sql_type(&self) -> SqlType {
        self.type_spec.sql_type
    }
}
