#![deny(missing_docs)]
#![deny(warnings)]

//! # DynamoDB Helpers
//!
//! Fluent request builders for Amazon DynamoDB's low-level API.
//!
//! ## Overview
//!
//! This library composes the parameter objects of DynamoDB's request schema
//! (GetItem, BatchGetItem, Query, Scan, UpdateItem, DeleteItem,
//! BatchWriteItem) through small chainable builders:
//! - Placeholder names and values are allocated and merged automatically
//! - Enumerated options are validated against their allowed sets
//! - Illegal request shapes (half-configured parallel scan, conflicting
//!   sort-key conditions, ...) are rejected before a request exists
//! - The finished parameters can be inspected as plain structs or handed to
//!   the SDK client
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_helpers::read;
//!
//! # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
//! let query = read::query::Query::new("users")
//!     .key("id", "1")?
//!     .sort_key("ts")
//!     .begins("2024")?
//!     .limit(20)
//!     .forward(false);
//! let output = query.send(client).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Shared expression-attribute machinery and key types
//! - [`mod@error`] - The error taxonomy for invalid request shapes
//! - [`mod@read`] - Read builders (Getter, Query, Scanner)
//! - [`mod@write`] - Write builders (Updater, Deleter, BatchEdit)
//! - [`mod@helper`] - A declarative facade over all builders

/// Shared expression-attribute machinery, projections, and key types.
pub mod common;

/// Errors raised while composing requests.
pub mod error;

/// A declarative facade that instantiates the right builder from an
/// options object.
pub mod helper;

/// Read builders for retrieving data from DynamoDB tables.
///
/// This module provides builders for:
/// - Getting single items or batches of items by key
/// - Querying a partition with an optional sort-key condition
/// - Scanning entire tables, optionally in parallel segments
pub mod read;

/// Write builders for modifying data in DynamoDB tables.
///
/// This module provides builders for:
/// - Partial, multi-clause conditional updates
/// - Single-item conditional deletes
/// - Batch writes mixing puts and deletes
pub mod write;
