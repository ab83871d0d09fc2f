//! `spool-import` library crate.
//!
//! The binary is a thin wrapper around this library so the import pipeline can
//! be tested without spawning processes or talking to a real Spoolman.

pub mod api;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod io;
pub mod report;
pub mod vendor;
