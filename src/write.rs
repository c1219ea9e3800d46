//! Write builders for modifying data in DynamoDB.
//!
//! This module provides builders for composing write requests:
//! - Partial, multi-clause conditional updates with timestamp bookkeeping
//! - Single-item conditional deletes
//! - Batch writes mixing puts and deletes across tables

/// BatchEdit for multi-item batch write/delete requests.
pub mod batch;

/// Deleter for single-item conditional deletes.
pub mod delete;

/// Updater for partial conditional updates.
pub mod update;

/// apply the write parameters shared by update and delete to a builder
#[macro_export]
macro_rules! apply_write_params {
    ($builder:expr, $params:expr) => {
        $builder
            .set_condition_expression($params.condition_expression)
            .set_expression_attribute_names($params.expression_attribute_names)
            .set_expression_attribute_values($params.expression_attribute_values)
            .set_key(Some($params.key))
            .set_return_consumed_capacity($params.return_consumed_capacity)
            .set_return_item_collection_metrics($params.return_item_collection_metrics)
            .table_name($params.table_name)
    };
}
