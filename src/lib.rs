pub mod behavior;
pub mod catalog;
pub mod cell;
pub mod config;
pub mod cursor;
pub mod diag;
pub mod eval;
pub mod executor;
pub mod handle;
pub mod sql;
