//! Command-line shell over the mock driver.
//!
//! Connects a single session with the given connection string, runs each
//! statement and prints result sets as tab-separated rows.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mock_odbc::config::read_connection_string;
use mock_odbc::cursor::TargetBuffer;
use mock_odbc::handle::{Completion, Connection, FreeStmtOption, HandleError, Session, Statement};
use mock_odbc::sql::split_statements;
use tracing_subscriber::EnvFilter;

/// Bytes bound per result column.
const COLUMN_BUFFER_LEN: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "mock-odbc", about = "Run SQL against the mock ODBC driver")]
struct Args {
    /// Connection string, e.g. `Mode=Partial;FailOn=SQLFetch`.
    #[arg(long, conflicts_with = "config")]
    connect: Option<String>,

    /// File holding the connection string, one pair per line.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Statement to run; repeatable. Without it, statements are read from
    /// stdin and split at `;`.
    #[arg(long, short = 'e')]
    execute: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mock_odbc=info,warn")),
        )
        .init();

    let args = Args::parse();
    let conn_str = match (&args.connect, &args.config) {
        (Some(conn_str), _) => conn_str.clone(),
        (None, Some(path)) => read_connection_string(path)?,
        (None, None) => String::new(),
    };

    let session = Session::new();
    let connection = Connection::new(&session);
    connection
        .driver_connect(&conn_str)
        .with_context(|| format!("connect failed: {}", records(&connection.diagnostics())))?;
    let statement = connection.alloc_statement()?;

    let script;
    let statements = if args.execute.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read statements from stdin")?;
        script = input;
        split_statements(&script)
    } else {
        args.execute.iter().map(String::as_str).collect()
    };

    let mut failures = 0;
    for sql in statements {
        if let Err(e) = run(&statement, sql) {
            failures += 1;
            eprintln!("error: {e}");
            for record in statement.diagnostics() {
                eprintln!("  {record}");
            }
        }
    }

    connection.disconnect()?;
    if failures > 0 {
        anyhow::bail!("{failures} statement(s) failed");
    }
    Ok(())
}

fn run(statement: &Statement, sql: &str) -> Result<(), HandleError> {
    statement.exec_direct(sql)?;

    let width = statement.num_result_cols();
    if width == 0 {
        println!("{} row(s) affected", statement.row_count());
        return Ok(());
    }

    let mut header = Vec::with_capacity(width);
    let mut buffers = Vec::with_capacity(width);
    for column in (1..=width).filter_map(|c| u16::try_from(c).ok()) {
        header.push(statement.describe_col(column)?.name);
        let buffer = TargetBuffer::char(COLUMN_BUFFER_LEN).shared();
        statement.bind_column(column, Some(buffer.clone()))?;
        buffers.push(buffer);
    }
    println!("{}", header.join("\t"));

    let mut rows = 0;
    while statement.fetch()? != Completion::NoData {
        let line: Vec<String> = buffers
            .iter()
            .map(|b| {
                let b = b.lock();
                if b.is_null() {
                    "NULL".to_string()
                } else {
                    b.text().unwrap_or_default()
                }
            })
            .collect();
        println!("{}", line.join("\t"));
        rows += 1;
    }
    statement.free_stmt(FreeStmtOption::Unbind)?;
    println!("({rows} rows)");
    Ok(())
}

fn records(records: &[mock_odbc::diag::DiagnosticRecord]) -> String {
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
