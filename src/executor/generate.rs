//! Deterministic mock row synthesis.
//!
//! Values are a pure function of the column (name and type) and the row
//! index, so repeated queries return identical data.

use crate::catalog::{Column, Table};
use crate::cell::{Cell, Row, SqlType};

const FIRST_NAMES: [&str; 16] = [
    "John", "Jane", "Bob", "Alice", "Charlie", "Diana", "Eve", "Frank", "Grace", "Henry", "Ivy",
    "Jack", "Kate", "Leo", "Mia", "Noah",
];

const PRODUCTS: [&str; 14] = [
    "Widget",
    "Gadget",
    "Gizmo",
    "Device",
    "Tool",
    "Appliance",
    "Machine",
    "Instrument",
    "Component",
    "Module",
    "Unit",
    "System",
    "Kit",
    "Set",
];

const STATUSES: [&str; 4] = ["PENDING", "ACTIVE", "COMPLETED", "CANCELLED"];

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Food", "Books", "Toys"];

/// Generates the value of `column` in synthetic row `row`.
///
/// The column name is matched by upper-case substring within each type
/// category:
///
/// | Type      | Name                          | Value                         |
/// |-----------|-------------------------------|-------------------------------|
/// | integer   | auto-increment or `_ID`       | `row + 1`                     |
/// | integer   | `QUANTITY`                    | `row % 10 + 1`                |
/// | integer   | `STOCK`                       | `(row * 7) % 100 + 10`        |
/// | numeric   | `PRICE`                       | `9.99 + row % 100`            |
/// | numeric   | `AMOUNT`, `BALANCE`           | `100 + row * 25.5`            |
/// | character | `NAME` and `USER`             | first name, cycling over 16   |
/// | character | `EMAIL`                       | `user{row+1}@example.com`     |
/// | character | `NAME` exactly, `PRODUCT`     | `{product} {row}`             |
/// | date/time | any                           | day `row % 28 + 1` of 2024-01 |
/// | bit       | any                           | `row % 2`                     |
pub fn generate_value(column: &Column, row: usize) -> Cell {
    let name = column.name.to_ascii_uppercase();
    let n = row as i64;

    match column.type_spec.sql_type {
        SqlType::Integer | SqlType::BigInt | SqlType::SmallInt | SqlType::TinyInt => {
            if column.auto_increment || name.contains("_ID") {
                Cell::Integer(n + 1)
            } else if name.contains("QUANTITY") {
                Cell::Integer(n % 10 + 1)
            } else if name.contains("STOCK") {
                Cell::Integer((n * 7) % 100 + 10)
            } else {
                Cell::Integer(n * 10)
            }
        }
        SqlType::Decimal | SqlType::Numeric | SqlType::Real | SqlType::Float | SqlType::Double => {
            if name.contains("PRICE") {
                Cell::Real(9.99 + (n % 100) as f64)
            } else if name.contains("AMOUNT") || name.contains("BALANCE") {
                Cell::Real(100.0 + n as f64 * 25.5)
            } else {
                Cell::Real(n as f64 * 1.5)
            }
        }
        SqlType::Char
        | SqlType::Varchar
        | SqlType::LongVarchar
        | SqlType::WChar
        | SqlType::WVarchar
        | SqlType::WLongVarchar => Cell::Text(generate_text(&name, row)),
        SqlType::Date => Cell::Text(format!("2024-01-{:02}", row % 28 + 1)),
        SqlType::Time => Cell::Text(format!("{:02}:00:00", row % 24)),
        SqlType::Timestamp => Cell::Text(format!("2024-01-{:02} 12:00:00", row % 28 + 1)),
        SqlType::Bit => Cell::Integer(n % 2),
        SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary | SqlType::Guid => {
            Cell::text("Unknown")
        }
    }
}

fn generate_text(name: &str, row: usize) -> String {
    if name.contains("NAME") && name.contains("USER") {
        FIRST_NAMES[row % FIRST_NAMES.len()].to_string()
    } else if name.contains("EMAIL") {
        format!("user{}@example.com", row + 1)
    } else if name == "NAME" || name.contains("PRODUCT") {
        format!("{} {row}", PRODUCTS[row % PRODUCTS.len()])
    } else if name.contains("DESCRIPTION") {
        format!("Description for item {}", row + 1)
    } else if name.contains("STATUS") {
        STATUSES[row % STATUSES.len()].to_string()
    } else if name.contains("CATEGORY") {
        CATEGORIES[row % CATEGORIES.len()].to_string()
    } else {
        format!("Value_{row}")
    }
}

/// Generates `count` rows for `table`.
pub fn generate_mock_data(table: &Table, count: usize) -> Vec<Row> {
    (0..count)
        .map(|row| {
            table
                .columns
                .iter()
                .map(|column| generate_value(column, row))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogPreset};
    use crate::cell::TypeSpec;

    fn column(name: &str, sql_type: SqlType) -> Column {
        Column::new(name, TypeSpec::new(sql_type, 10, 0))
    }

    #[test]
    fn test_integer_rules() {
        let id = column("ORDER_ID", SqlType::Integer);
        assert!((0..100).all(|i| generate_value(&id, i) == Cell::Integer(i as i64 + 1)));

        let auto = column("X", SqlType::Integer).auto_increment();
        assert_eq!(generate_value(&auto, 4), Cell::Integer(5));

        let qty = column("STOCK_QUANTITY", SqlType::Integer);
        assert_eq!(generate_value(&qty, 13), Cell::Integer(4));

        let stock = column("STOCK", SqlType::Integer);
        assert_eq!(generate_value(&stock, 20), Cell::Integer(50));

        let other = column("SCORE", SqlType::SmallInt);
        assert_eq!(generate_value(&other, 3), Cell::Integer(30));
    }

    #[test]
    fn test_numeric_rules() {
        let price = column("UNIT_PRICE", SqlType::Decimal);
        assert_eq!(generate_value(&price, 0), Cell::Real(9.99));
        assert_eq!(generate_value(&price, 101), Cell::Real(10.99));

        let balance = column("BALANCE", SqlType::Decimal);
        assert_eq!(generate_value(&balance, 2), Cell::Real(151.0));

        let other = column("RATIO", SqlType::Double);
        assert_eq!(generate_value(&other, 3), Cell::Real(4.5));
    }

    #[test]
    fn test_text_rules() {
        let v = |name: &str, row| generate_value(&column(name, SqlType::Varchar), row);
        assert_eq!(v("USERNAME", 0), Cell::text("John"));
        assert_eq!(v("USERNAME", 17), Cell::text("Jane"));
        assert_eq!(v("EMAIL", 0), Cell::text("user1@example.com"));
        assert_eq!(v("NAME", 15), Cell::text("Gadget 15"));
        assert_eq!(v("DESCRIPTION", 2), Cell::text("Description for item 3"));
        assert_eq!(v("STATUS", 5), Cell::text("ACTIVE"));
        assert_eq!(v("CATEGORY", 4), Cell::text("Toys"));
        assert_eq!(v("NOTES", 7), Cell::text("Value_7"));
    }

    #[test]
    fn test_temporal_and_bit_rules() {
        assert_eq!(
            generate_value(&column("D", SqlType::Date), 0),
            Cell::text("2024-01-01")
        );
        assert_eq!(
            generate_value(&column("D", SqlType::Date), 28),
            Cell::text("2024-01-01")
        );
        assert_eq!(
            generate_value(&column("T", SqlType::Time), 25),
            Cell::text("01:00:00")
        );
        assert_eq!(
            generate_value(&column("TS", SqlType::Timestamp), 9),
            Cell::text("2024-01-10 12:00:00")
        );
        assert_eq!(generate_value(&column("B", SqlType::Bit), 3), Cell::Integer(1));
        assert_eq!(
            generate_value(&column("G", SqlType::Guid), 0),
            Cell::text("Unknown")
        );
    }

    #[test]
    fn test_generation_is_pure() {
        let catalog = Catalog::with_preset(CatalogPreset::Default);
        let users = catalog.find_table("USERS").unwrap();
        let first = generate_mock_data(users, 50);
        let second = generate_mock_data(users, 50);
        assert_eq!(first, second);
        assert_eq!(first.len(), 50);
        assert!(first.iter().all(|row| row.len() == users.columns.len()));
    }
}
