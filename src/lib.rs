//! HTTP ingestion endpoint for shipped logs.
//!
//! Each request body is read line by line; every line is expected to be a JSON
//! array of log lines. Decoded lines become structured entries (with the
//! engagement id, title, severity and stack trace pulled out of the message
//! when present), anything else is kept verbatim. One request produces one
//! stored [`ingest::Batch`].

pub mod cli;
pub mod config;
pub mod ingest;
pub mod storage;
pub mod web;
