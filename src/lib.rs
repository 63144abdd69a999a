//! Atelier workshop library backend.
//!
//! HTTP JSON API for browsing, creating, editing, and tagging workshop
//! records, with session authentication, Postgres full-text search, and
//! local file storage for attachments. The `atelier` binary runs the
//! server; the library exposes internals for integration testing.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod models;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;
pub mod workshops;
