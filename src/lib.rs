//! RAMS Toolkit
//!
//! A command-line client for building risk assessment method statements
//! against the RAMS web service. The backend owns the data; this crate
//! holds the catalog cache, the task composition model, and the selection
//! sessions that drive edits back through the REST API.

pub mod api;
pub mod cli;
pub mod core;
pub mod entities;
