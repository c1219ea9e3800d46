//! Read builders for retrieving data from DynamoDB.
//!
//! This module provides builders for composing read requests:
//! - Getting single items or batches of items by primary key
//! - Querying one partition with an optional sort-key condition
//! - Scanning entire tables, optionally split into parallel segments

/// Getter for single-item and batch reads.
pub mod get;

/// Query builder for partition-scoped, sort-key-range reads.
pub mod query;

/// Scanner for full-table reads.
pub mod scan;

/// apply the read parameters shared by query and scan to a builder
#[macro_export]
macro_rules! apply_read_params {
    ($builder:expr, $params:expr) => {
        $builder
            .set_consistent_read($params.consistent_read)
            .set_exclusive_start_key($params.exclusive_start_key)
            .set_expression_attribute_names($params.expression_attribute_names)
            .set_expression_attribute_values($params.expression_attribute_values)
            .set_filter_expression($params.filter_expression)
            .set_index_name($params.index_name)
            .set_limit($params.limit)
            .set_projection_expression($params.projection_expression)
            .set_return_consumed_capacity($params.return_consumed_capacity)
            .set_select($params.select)
            .table_name($params.table_name)
    };
}
