//! End-to-end tests through the handle layer.
//!
//! Each test opens its own session, so tests share no catalog state.

use mock_odbc::cell::SqlType;
use mock_odbc::cursor::{CType, FetchOrientation, Indicator, TargetBuffer};
use mock_odbc::handle::{Completion, Connection, EndTransaction, Session, Statement};

fn connect(conn_str: &str) -> (Connection, Statement) {
    let session = Session::new();
    let connection = Connection::new(&session);
    connection.driver_connect(conn_str).unwrap();
    let statement = connection.alloc_statement().unwrap();
    (connection, statement)
}

fn text(statement: &Statement, column: u16) -> Option<String> {
    let mut buffer = TargetBuffer::char(256);
    statement.get_data(column, &mut buffer).unwrap();
    if buffer.is_null() { None } else { buffer.text() }
}

fn integer(statement: &Statement, column: u16) -> i64 {
    let mut buffer = TargetBuffer::new(CType::SBigInt, 8);
    statement.get_data(column, &mut buffer).unwrap();
    buffer.integer().unwrap()
}

#[test]
fn test_literal_select_without_from() {
    let (_conn, stmt) = connect("");
    stmt.exec_direct("SELECT 1+0, 'hello' AS greeting").unwrap();

    assert_eq!(stmt.num_result_cols(), 2);
    assert_eq!(stmt.describe_col(1).unwrap().name, "EXPR_1");
    assert_eq!(stmt.describe_col(2).unwrap().name, "greeting");

    assert_eq!(stmt.fetch(), Ok(Completion::Success));
    assert_eq!(text(&stmt, 1).as_deref(), Some("1+0"));
    assert_eq!(text(&stmt, 2).as_deref(), Some("hello"));
    assert_eq!(stmt.fetch(), Ok(Completion::NoData));
}

#[test]
fn test_select_star_from_fixture() {
    let (_conn, stmt) = connect("ResultSetSize=25");
    stmt.exec_direct("SELECT * FROM USERS").unwrap();

    let names: Vec<String> = (1..=6).map(|c| stmt.describe_col(c).unwrap().name).collect();
    assert_eq!(
        names,
        vec!["USER_ID", "USERNAME", "EMAIL", "CREATED_DATE", "IS_ACTIVE", "BALANCE"]
    );
    assert_eq!(stmt.row_count(), 25);

    let id = TargetBuffer::new(CType::SLong, 4).shared();
    stmt.bind_column(1, Some(id.clone())).unwrap();
    let mut seen = Vec::new();
    while stmt.fetch().unwrap() != Completion::NoData {
        seen.push(id.lock().integer().unwrap());
    }
    assert_eq!(seen, (1..=25).collect::<Vec<_>>());
}

#[test]
fn test_count_star_tracks_inserts() {
    let (_conn, stmt) = connect("ResultSetSize=40");
    stmt.exec_direct("SELECT COUNT(*) FROM ORDERS").unwrap();
    stmt.fetch().unwrap();
    assert_eq!(integer(&stmt, 1), 40);

    for id in 1..=3 {
        stmt.exec_direct(&format!(
            "INSERT INTO ORDERS (ORDER_ID, USER_ID, STATUS) VALUES ({id}, 7, 'NEW')"
        ))
        .unwrap();
        assert_eq!(stmt.row_count(), 1);
    }

    stmt.exec_direct("SELECT COUNT(*) FROM ORDERS").unwrap();
    stmt.fetch().unwrap();
    assert_eq!(integer(&stmt, 1), 3);
}

#[test]
fn test_insert_then_select_round_trip() {
    let (_conn, stmt) = connect("");
    stmt.exec_direct(
        "INSERT INTO PRODUCTS VALUES (500, 'Lamp', 'Desk lamp', 12.5, 3, 'Home')",
    )
    .unwrap();
    stmt.exec_direct("SELECT * FROM PRODUCTS").unwrap();
    assert_eq!(stmt.row_count(), 1);

    stmt.fetch().unwrap();
    assert_eq!(integer(&stmt, 1), 500);
    assert_eq!(text(&stmt, 2).as_deref(), Some("Lamp"));
    assert_eq!(text(&stmt, 3).as_deref(), Some("Desk lamp"));
    assert_eq!(text(&stmt, 4).as_deref(), Some("12.500000"));
    assert_eq!(integer(&stmt, 5), 3);
    assert_eq!(text(&stmt, 6).as_deref(), Some("Home"));
}

#[test]
fn test_create_drop_lifecycle() {
    let (_conn, stmt) = connect("");
    let ddl = "CREATE TABLE FOO (ID INTEGER, NAME VARCHAR(50))";
    stmt.exec_direct(ddl).unwrap();

    let err = stmt.exec_direct(ddl).unwrap_err();
    assert_eq!(err.sqlstate(), "42S01");

    stmt.exec_direct("DROP TABLE FOO").unwrap();
    let err = stmt.exec_direct("SELECT * FROM FOO").unwrap_err();
    assert_eq!(err.sqlstate(), "42S02");
    assert_eq!(stmt.diagnostics()[0].sqlstate, "42S02");
}

#[test]
fn test_created_table_is_listed_and_empty() {
    let (_conn, stmt) = connect("Catalog=Empty");
    stmt.exec_direct("CREATE TABLE NOTES (NOTE_ID INTEGER, BODY VARCHAR(200))")
        .unwrap();
    stmt.exec_direct("SELECT * FROM NOTES").unwrap();
    assert_eq!(stmt.fetch(), Ok(Completion::NoData));

    stmt.tables("NOTES", None).unwrap();
    stmt.fetch().unwrap();
    assert_eq!(text(&stmt, 3).as_deref(), Some("NOTES"));
    assert_eq!(text(&stmt, 4).as_deref(), Some("TABLE"));
}

#[test]
fn test_absolute_zero_is_no_data() {
    for size in [0, 1, 10] {
        let (_conn, stmt) = connect(&format!("ResultSetSize={size}"));
        stmt.exec_direct("SELECT * FROM USERS").unwrap();
        assert_eq!(
            stmt.fetch_scroll(FetchOrientation::Absolute(0)),
            Ok(Completion::NoData)
        );
    }
}

#[test]
fn test_scrolling_fetch() {
    let (_conn, stmt) = connect("ResultSetSize=10");
    stmt.exec_direct("SELECT USER_ID FROM USERS").unwrap();

    stmt.fetch_scroll(FetchOrientation::Last).unwrap();
    assert_eq!(integer(&stmt, 1), 10);
    stmt.fetch_scroll(FetchOrientation::Absolute(-3)).unwrap();
    assert_eq!(integer(&stmt, 1), 8);
    stmt.fetch_scroll(FetchOrientation::Relative(-2)).unwrap();
    assert_eq!(integer(&stmt, 1), 6);
    stmt.fetch_scroll(FetchOrientation::First).unwrap();
    assert_eq!(integer(&stmt, 1), 1);
    assert_eq!(
        stmt.fetch_scroll(FetchOrientation::Prior),
        Ok(Completion::NoData)
    );
}

#[test]
fn test_fetch_past_end_keeps_buffers() {
    let (_conn, stmt) = connect("ResultSetSize=1");
    let name = TargetBuffer::char(64).shared();
    stmt.bind_column(2, Some(name.clone())).unwrap();
    stmt.exec_direct("SELECT * FROM USERS").unwrap();

    assert_eq!(stmt.fetch(), Ok(Completion::Success));
    let first = name.lock().clone();
    for _ in 0..3 {
        assert_eq!(stmt.fetch(), Ok(Completion::NoData));
    }
    assert_eq!(*name.lock(), first);
}

#[test]
fn test_close_cursor_rules() {
    let (_conn, stmt) = connect("ResultSetSize=2");
    assert_eq!(stmt.close_cursor().unwrap_err().sqlstate(), "24000");

    stmt.prepare("SELECT * FROM USERS").unwrap();
    stmt.execute().unwrap();
    assert_eq!(stmt.close_cursor(), Ok(Completion::Success));
    assert_eq!(stmt.close_cursor().unwrap_err().sqlstate(), "24000");

    assert!(stmt.is_prepared());
    assert_eq!(stmt.fetch().unwrap_err().sqlstate(), "HY010");
    stmt.execute().unwrap();
    assert_eq!(stmt.fetch(), Ok(Completion::Success));
}

#[test]
fn test_bound_truncation_reports_info() {
    let (_conn, stmt) = connect("ResultSetSize=1");
    let email = TargetBuffer::char(5).shared();
    stmt.bind_column(3, Some(email.clone())).unwrap();
    stmt.exec_direct("SELECT * FROM USERS").unwrap();

    assert_eq!(stmt.fetch(), Ok(Completion::SuccessWithInfo));
    let email = email.lock();
    assert_eq!(email.text().as_deref(), Some("user"));
    assert_eq!(email.indicator, Some(Indicator::Length("user1@example.com".len())));
    assert_eq!(stmt.diagnostics()[0].sqlstate, "01004");
}

#[test]
fn test_null_sets_indicator() {
    let (_conn, stmt) = connect("");
    stmt.exec_direct("INSERT INTO USERS (USER_ID, USERNAME) VALUES (1, 'ann')")
        .unwrap();
    let email = TargetBuffer::char(32).shared();
    stmt.bind_column(3, Some(email.clone())).unwrap();
    stmt.exec_direct("SELECT * FROM USERS").unwrap();
    stmt.fetch().unwrap();
    assert!(email.lock().is_null());
}

#[test]
fn test_keyword_column_names() {
    let (_conn, stmt) = connect("Catalog=Empty");
    stmt.exec_direct("CREATE TABLE KV (ID INTEGER, KEY VARCHAR(10), DESC VARCHAR(20))")
        .unwrap();
    stmt.exec_direct("INSERT INTO KV (ID, KEY, DESC) VALUES (1, 'a', 'first')")
        .unwrap();
    stmt.exec_direct("INSERT INTO KV (ID, KEY, DESC) VALUES (2, 'b', 'second')")
        .unwrap();

    stmt.exec_direct("SELECT KEY, DESC FROM KV WHERE KEY = 'b'").unwrap();
    assert_eq!(stmt.describe_col(1).unwrap().name, "KEY");
    assert_eq!(stmt.describe_col(2).unwrap().name, "DESC");
    assert_eq!(stmt.fetch(), Ok(Completion::Success));
    assert_eq!(text(&stmt, 1).as_deref(), Some("b"));
    assert_eq!(text(&stmt, 2).as_deref(), Some("second"));
    assert_eq!(stmt.fetch(), Ok(Completion::NoData));

    stmt.columns("KV", "%").unwrap();
    let mut names = Vec::new();
    while stmt.fetch().unwrap() != Completion::NoData {
        names.push(text(&stmt, 4).unwrap());
    }
    assert_eq!(names, vec!["ID", "KEY", "DESC"]);
}

#[test]
fn test_where_and_order_by() {
    let (_conn, stmt) = connect("ResultSetSize=20");
    stmt.exec_direct("SELECT USER_ID FROM USERS WHERE USER_ID IN (4, 2, 9) ORDER BY USER_ID DESC")
        .unwrap();
    let mut ids = Vec::new();
    while stmt.fetch().unwrap() != Completion::NoData {
        ids.push(integer(&stmt, 1));
    }
    assert_eq!(ids, vec![9, 4, 2]);
}

#[test]
fn test_escape_sequences_execute() {
    let (_conn, stmt) = connect("");
    stmt.exec_direct("SELECT {fn UCASE('abc')}, {d '2024-02-03'}, CAST('2024-02-03' AS DATE)")
        .unwrap();
    stmt.fetch().unwrap();
    assert_eq!(text(&stmt, 1).as_deref(), Some("ABC"));
    assert_eq!(text(&stmt, 2).as_deref(), Some("2024-02-03"));
    assert_eq!(stmt.describe_col(3).unwrap().sql_type(), SqlType::Date);
}

#[test]
fn test_rollback_discards_inserts() {
    let (conn, stmt) = connect("TransactionMode=Manual;ResultSetSize=5");
    stmt.exec_direct("INSERT INTO ORDERS (ORDER_ID) VALUES (1)").unwrap();
    stmt.exec_direct("SELECT * FROM ORDERS").unwrap();
    assert!(stmt.is_cursor_open());

    conn.end_transaction(EndTransaction::Rollback).unwrap();
    assert!(!stmt.is_cursor_open());
    assert_eq!(stmt.fetch().unwrap_err().sqlstate(), "HY010");

    stmt.exec_direct("SELECT COUNT(*) FROM ORDERS").unwrap();
    stmt.fetch().unwrap();
    assert_eq!(integer(&stmt, 1), 5);
}

#[test]
fn test_commit_keeps_inserts() {
    let (conn, stmt) = connect("TransactionMode=Manual");
    stmt.exec_direct("INSERT INTO ORDERS (ORDER_ID) VALUES (1)").unwrap();
    conn.end_transaction(EndTransaction::Commit).unwrap();
    stmt.exec_direct("SELECT COUNT(*) FROM ORDERS").unwrap();
    stmt.fetch().unwrap();
    assert_eq!(integer(&stmt, 1), 1);
}

#[test]
fn test_sessions_are_isolated() {
    let (_a_conn, a) = connect("");
    let (_b_conn, b) = connect("");
    a.exec_direct("CREATE TABLE ONLY_A (ID INTEGER)").unwrap();
    assert_eq!(
        b.exec_direct("SELECT * FROM ONLY_A").unwrap_err().sqlstate(),
        "42S02"
    );
}

#[test]
fn test_connections_share_session_catalog() {
    let session = Session::new();
    let first = Connection::new(&session);
    let second = Connection::new(&session);
    first.connect("Mock", "", "").unwrap();
    second.connect("Mock", "", "").unwrap();

    let a = first.alloc_statement().unwrap();
    let b = second.alloc_statement().unwrap();
    a.exec_direct("CREATE TABLE SHARED (ID INTEGER)").unwrap();
    assert!(b.exec_direct("SELECT * FROM SHARED").is_ok());
}

#[test]
fn test_catalog_functions() {
    let (_conn, stmt) = connect("");

    stmt.tables("%", None).unwrap();
    assert_eq!(stmt.num_result_cols(), 5);
    assert_eq!(stmt.row_count(), 4);

    stmt.tables("ORD%", None).unwrap();
    assert_eq!(stmt.row_count(), 2);

    stmt.columns("USERS", "%").unwrap();
    assert_eq!(stmt.num_result_cols(), 18);
    assert_eq!(stmt.row_count(), 6);

    stmt.primary_keys("USERS").unwrap();
    assert_eq!(stmt.num_result_cols(), 6);
    stmt.fetch().unwrap();
    assert_eq!(text(&stmt, 4).as_deref(), Some("USER_ID"));

    stmt.foreign_keys("USERS", "").unwrap();
    assert_eq!(stmt.num_result_cols(), 14);
    stmt.fetch().unwrap();
    assert_eq!(text(&stmt, 7).as_deref(), Some("ORDERS"));

    stmt.statistics("USERS").unwrap();
    assert_eq!(stmt.num_result_cols(), 13);
}

#[test]
fn test_update_and_delete_are_acknowledged() {
    let (_conn, stmt) = connect("ResultSetSize=3");
    stmt.exec_direct("UPDATE USERS SET USERNAME = 'x' WHERE USER_ID = 1").unwrap();
    assert_eq!(stmt.row_count(), 1);
    stmt.exec_direct("DELETE FROM USERS").unwrap();
    assert_eq!(stmt.row_count(), 1);
    stmt.exec_direct("SELECT COUNT(*) FROM USERS").unwrap();
    stmt.fetch().unwrap();
    assert_eq!(integer(&stmt, 1), 3);

    assert_eq!(
        stmt.exec_direct("DELETE FROM MISSING").unwrap_err().sqlstate(),
        "42S02"
    );
}
