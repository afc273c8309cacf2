//! # Terraform Log Harness
//!
//! Heuristic field extraction and indexed search for Terraform execution
//! logs.
//!
//! Terraform core and its providers write log lines in inconsistent
//! shapes: structured JSON with differently named keys, free text, and
//! HTTP payloads embedded as JSON strings. The harness infers timestamp,
//! level, resource, request id and execution phase from each line,
//! decodes embedded bodies, and stores everything in SQLite for filtered
//! search.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────────────┐   ┌──────────┐
//! │ log lines │──▶│ Ingestor                 │──▶│  SQLite  │
//! │ file/dir  │   │ fields · section · bodies│   │ logs +   │
//! └───────────┘   └──────────────────────────┘   │ bodies   │
//!                                                └────┬─────┘
//!                                                     ▼
//!                                            ┌────────────────┐
//!                                            │ search / mark  │
//!                                            │ read / summary │
//!                                            └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tflog init                         # create database
//! tflog ingest ./logs                # ingest a file or directory
//! tflog search --level error --unread
//! tflog sections                     # phase summary
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`rules`] | Ordered extraction rule tables |
//! | [`extract`] | Timestamp, level, resource and request-id extraction |
//! | [`section`] | Execution-phase classification |
//! | [`bodies`] | Embedded JSON body extraction |
//! | [`ingest`] | Line ingestion pipeline |
//! | [`store`] | Storage trait |
//! | [`sqlite_store`] | SQLite storage backend |
//! | [`search`] | Filtered search and read-state commands |
//! | [`get`] | Record retrieval |
//! | [`stats`] | Level and section aggregates |
//! | [`export`] | JSON Lines export |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod bodies;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod extract;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod rules;
pub mod search;
pub mod section;
pub mod sqlite_store;
pub mod stats;
pub mod store;
