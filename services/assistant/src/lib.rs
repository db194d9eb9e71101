//! Teacher Assistant Service Library Crate
//!
//! Everything the runnable assistant needs around the core crate: the
//! environment configuration, the SQLite store, shared application state
//! and the interactive console. The binary is a thin wrapper around this
//! library.

pub mod config;
pub mod console;
pub mod db;
pub mod models;
pub mod state;
