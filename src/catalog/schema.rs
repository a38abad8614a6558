//! Table, column and index metadata.

use crate::cell::TypeSpec;

/// Kind of a catalog table, as reported by `SQLTables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Table,
    View,
    SystemTable,
}

impl TableKind {
    /// Returns the `TABLE_TYPE` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Table => "TABLE",
            TableKind::View => "VIEW",
            TableKind::SystemTable => "SYSTEM TABLE",
        }
    }
}

/// Target of a foreign-key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name (unique within its table, case-insensitive).
    pub name: String,
    /// Declared type, size and scale.
    pub type_spec: TypeSpec,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Default value as SQL text (e.g., `'PENDING'` is stored as `PENDING`).
    pub default_value: Option<String>,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl Column {
    /// Creates a nullable column with no constraints.
    pub fn new(name: impl Into<String>, type_spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            type_spec,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            default_value: None,
            foreign_key: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as a NOT NULL primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Catalog (qualifier) name; usually empty.
    pub catalog: String,
    /// Schema (owner) name; usually empty.
    pub schema: String,
    /// Table name (unique, case-insensitive).
    pub name: String,
    pub kind: TableKind,
    /// Free-text `REMARKS`.
    pub remarks: String,
    /// Columns in ordinal order.
    pub columns: Vec<Column>,
    /// Whether SELECT synthesizes rows when nothing was inserted. True for
    /// preset fixtures, false for tables created by CREATE TABLE.
    pub generates_mock_data: bool,
}

impl Table {
    /// Creates a user table with no synthetic data.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            catalog: String::new(),
            schema: String::new(),
            name: name.into(),
            kind: TableKind::Table,
            remarks: String::new(),
            columns,
            generates_mock_data: false,
        }
    }

    /// Creates a fixture table that synthesizes mock rows.
    pub fn fixture(name: impl Into<String>, remarks: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            remarks: remarks.into(),
            generates_mock_data: true,
            ..Self::new(name, columns)
        }
    }

    /// Returns the position of a column by case-insensitive name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns a column by case-insensitive name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }
}

/// Index type reported in `SQLStatistics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Clustered,
    Hashed,
    Other,
}

impl IndexKind {
    /// Returns the ODBC `TYPE` code (`SQL_INDEX_CLUSTERED` = 1, ...).
    pub fn code(&self) -> i64 {
        match self {
            IndexKind::Clustered => 1,
            IndexKind::Hashed => 2,
            IndexKind::Other => 3,
        }
    }
}

/// Index metadata. Read-only fixture data.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub table_name: String,
    pub index_name: String,
    pub unique: bool,
    /// `INDEX_QUALIFIER`; usually empty.
    pub qualifier: String,
    pub kind: IndexKind,
    /// Indexed columns in key order.
    pub columns: Vec<String>,
}

impl Index {
    pub fn new(
        table_name: impl Into<String>,
        index_name: impl Into<String>,
        unique: bool,
        kind: IndexKind,
        columns: &[&str],
    ) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: index_name.into(),
            unique,
            qualifier: String::new(),
            kind,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}
