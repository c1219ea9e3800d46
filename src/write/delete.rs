use crate::{
    common,
    error::{Error, Result},
};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use std::collections;

/// Finished parameters of a delete.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteParams {
    /// Condition that must hold for the delete to apply.
    pub condition_expression: Option<String>,
    /// Placeholder names referenced by the condition.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Placeholder values referenced by the condition.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// The primary key of the item to delete.
    pub key: collections::HashMap<String, types::AttributeValue>,
    /// The capacity-reporting level.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The item-collection-metrics level.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    /// Which attributes to return (`NONE` or `ALL_OLD`).
    pub return_values: Option<types::ReturnValue>,
    /// The name of the table to delete from.
    pub table_name: String,
}

/// Composes a single-item conditional delete request.
///
/// ```rust
/// use dynamodb_helpers::{common::key, write::delete};
///
/// # fn example() -> Result<(), dynamodb_helpers::error::Error> {
/// let deleter = delete::Deleter::new("users", key::Keys::partition("id", "1"))?
///     .condition("attribute_exists(#id)")?
///     .names(std::collections::HashMap::from([(
///         "#id".to_string(),
///         "id".to_string(),
///     )]))
///     .return_values("all_old")?;
/// let params = deleter.into_params();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deleter {
    attributes: common::ExpressionAttributes,
    condition_expression: Option<String>,
    key: collections::HashMap<String, types::AttributeValue>,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    return_values: Option<types::ReturnValue>,
    table_name: String,
}

impl Deleter {
    /// Create a deleter for one item.
    pub fn new<T: Serialize>(
        table_name: impl Into<String>,
        keys: common::key::Keys<T>,
    ) -> Result<Self> {
        Ok(Self {
            key: keys.try_into()?,
            table_name: table_name.into(),
            ..Default::default()
        })
    }

    /// Set the condition that must hold for the delete to apply.
    ///
    /// May be called at most once.
    pub fn condition(mut self, expression: impl Into<String>) -> Result<Self> {
        if self.condition_expression.is_some() {
            return Err(Error::ConditionAlreadySet);
        }
        self.condition_expression = Some(expression.into());
        Ok(self)
    }

    /// Merge caller-supplied placeholder names.
    pub fn names(mut self, names: collections::HashMap<String, String>) -> Self {
        self.attributes.merge_names(names);
        self
    }

    /// Merge caller-supplied placeholder values.
    pub fn values<T: Serialize>(
        mut self,
        values: collections::HashMap<String, T>,
    ) -> Result<Self> {
        self.attributes.merge_values(values)?;
        Ok(self)
    }

    /// Set which attributes to return (`NONE` or `ALL_OLD`).
    pub fn return_values(mut self, mode: &str) -> Result<Self> {
        self.return_values = Some(common::parse_delete_return_values(mode)?);
        Ok(self)
    }

    /// Set the item-collection-metrics level (`NONE` or `SIZE`).
    pub fn metrics(mut self, mode: &str) -> Result<Self> {
        self.return_item_collection_metrics = Some(common::parse_metrics(mode)?);
        Ok(self)
    }

    /// Set the capacity-reporting level (`INDEXES`, `TOTAL`, or `NONE`).
    pub fn capacity(mut self, level: &str) -> Result<Self> {
        self.return_consumed_capacity = Some(common::parse_capacity(level)?);
        Ok(self)
    }

    /// Finish the builder, yielding the delete parameters.
    pub fn into_params(self) -> DeleteParams {
        let (expression_attribute_names, expression_attribute_values) =
            self.attributes.into_options();
        DeleteParams {
            condition_expression: self.condition_expression,
            expression_attribute_names,
            expression_attribute_values,
            key: self.key,
            return_consumed_capacity: self.return_consumed_capacity,
            return_item_collection_metrics: self.return_item_collection_metrics,
            return_values: self.return_values,
            table_name: self.table_name,
        }
    }

    /// Execute the delete.
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::delete_item::DeleteItemOutput,
        error::SdkError<operation::delete_item::DeleteItemError>,
    > {
        let params = self.into_params();
        let builder = client.delete_item().set_return_values(params.return_values);
        crate::apply_write_params!(builder, params).send().await
    }
}
