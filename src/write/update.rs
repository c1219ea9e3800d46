use crate::{common, error::Result};

use aws_sdk_dynamodb::{Client, error, operation, types};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// Field receiving the creation timestamp on first write.
const CREATED_AT_FIELD: &str = "createdAt";

/// Field receiving the update timestamp on every write.
const UPDATED_AT_FIELD: &str = "updatedAt";

/// Finished parameters of an update.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateParams {
    /// Condition that must hold for the update to apply.
    pub condition_expression: Option<String>,
    /// Placeholder names referenced by the expressions.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Placeholder values referenced by the expressions.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// The primary key of the item to update.
    pub key: collections::HashMap<String, types::AttributeValue>,
    /// The capacity-reporting level.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The item-collection-metrics level.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    /// Which attributes to return, `ALL_NEW` unless overridden.
    pub return_values: types::ReturnValue,
    /// The name of the table to write to.
    pub table_name: String,
    /// The assembled `SET`/`ADD`/`REMOVE`/`DELETE` clauses.
    pub update_expression: String,
}

impl Default for UpdateParams {
    fn default() -> Self {
        Self {
            condition_expression: None,
            expression_attribute_names: None,
            expression_attribute_values: None,
            key: collections::HashMap::new(),
            return_consumed_capacity: None,
            return_item_collection_metrics: None,
            return_values: types::ReturnValue::AllNew,
            table_name: String::new(),
            update_expression: String::new(),
        }
    }
}

/// Composes a partial, multi-clause conditional update request.
///
/// Raw `SET`/`ADD`/`REMOVE`/`DELETE` fragments accumulate in call order
/// within their clause; [`Updater::item`] expands a whole item into `SET`
/// fragments and stamps `createdAt` (first write only) and `updatedAt`
/// unless the corresponding `disable_*` method was called first.
///
/// ```rust
/// use dynamodb_helpers::{common::key, write::update};
/// use serde_json::json;
///
/// # fn example() -> Result<(), dynamodb_helpers::error::Error> {
/// let updater = update::Updater::new("users", key::Keys::partition("id", "1"))?
///     .item(json!({"name": "Jane", "age": 42}))?
///     .return_values("updated_new")?;
/// let params = updater.into_params();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Updater {
    add_clauses: Vec<String>,
    attributes: common::ExpressionAttributes,
    condition_expression: Option<String>,
    created_at_enabled: bool,
    delete_clauses: Vec<String>,
    key: collections::HashMap<String, types::AttributeValue>,
    remove_clauses: Vec<String>,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    return_values: types::ReturnValue,
    set_clauses: Vec<String>,
    table_name: String,
    timestamps_injected: bool,
    updated_at_enabled: bool,
}

impl Updater {
    /// Create an updater for one item.
    pub fn new<T: Serialize>(
        table_name: impl Into<String>,
        keys: common::key::Keys<T>,
    ) -> Result<Self> {
        Ok(Self {
            add_clauses: Vec::new(),
            attributes: common::ExpressionAttributes::default(),
            condition_expression: None,
            created_at_enabled: true,
            delete_clauses: Vec::new(),
            key: keys.try_into()?,
            remove_clauses: Vec::new(),
            return_consumed_capacity: None,
            return_item_collection_metrics: None,
            return_values: types::ReturnValue::AllNew,
            set_clauses: Vec::new(),
            table_name: table_name.into(),
            timestamps_injected: false,
            updated_at_enabled: true,
        })
    }

    /// Append a raw `SET` fragment.
    pub fn set(mut self, fragment: impl Into<String>) -> Self {
        self.set_clauses.push(fragment.into());
        self
    }

    /// Append a raw `ADD` fragment.
    pub fn add(mut self, fragment: impl Into<String>) -> Self {
        self.add_clauses.push(fragment.into());
        self
    }

    /// Append a raw `REMOVE` fragment.
    pub fn remove(mut self, fragment: impl Into<String>) -> Self {
        self.remove_clauses.push(fragment.into());
        self
    }

    /// Append a raw `DELETE` fragment.
    pub fn delete(mut self, fragment: impl Into<String>) -> Self {
        self.delete_clauses.push(fragment.into());
        self
    }

    /// Suppress the automatic creation timestamp. Call before
    /// [`Updater::item`].
    pub fn disable_created_at(mut self) -> Self {
        self.created_at_enabled = false;
        self
    }

    /// Suppress the automatic update timestamp. Call before
    /// [`Updater::item`].
    pub fn disable_updated_at(mut self) -> Self {
        self.updated_at_enabled = false;
        self
    }

    /// Expand an item into `SET` fragments, one per field.
    ///
    /// Fields are emitted in name order. While timestamp injection is
    /// enabled, caller-supplied `createdAt`/`updatedAt` fields are
    /// superseded by the injected fragments.
    pub fn item<T: Serialize>(mut self, item: T) -> Result<Self> {
        let item: collections::HashMap<String, types::AttributeValue> = to_item(item)?;
        let mut fields: Vec<_> = item.into_iter().collect();
        fields.sort_by(|left, right| left.0.cmp(&right.0));
        for (field, value) in fields {
            if (self.created_at_enabled && field == CREATED_AT_FIELD)
                || (self.updated_at_enabled && field == UPDATED_AT_FIELD)
            {
                continue;
            }
            let name_placeholder = self.attributes.name(&field);
            let value_placeholder = self.attributes.value_raw(&field, value);
            self.set_clauses
                .push(format!("{name_placeholder} = {value_placeholder}"));
        }
        if !self.timestamps_injected {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            if self.created_at_enabled {
                let name_placeholder = self.attributes.name(CREATED_AT_FIELD);
                let value_placeholder = self.attributes.value(CREATED_AT_FIELD, &now)?;
                self.set_clauses.push(format!(
                    "{name_placeholder} = if_not_exists({name_placeholder}, {value_placeholder})"
                ));
            }
            if self.updated_at_enabled {
                let name_placeholder = self.attributes.name(UPDATED_AT_FIELD);
                let value_placeholder = self.attributes.value(UPDATED_AT_FIELD, &now)?;
                self.set_clauses
                    .push(format!("{name_placeholder} = {value_placeholder}"));
            }
            self.timestamps_injected = self.created_at_enabled || self.updated_at_enabled;
        }
        Ok(self)
    }

    /// Set the condition that must hold for the update to apply.
    pub fn condition(mut self, expression: impl Into<String>) -> Self {
        self.condition_expression = Some(expression.into());
        self
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

    /// Set which attributes to return (`NONE`, `ALL_OLD`, `UPDATED_OLD`,
    /// `ALL_NEW`, or `UPDATED_NEW`). Defaults to `ALL_NEW`.
    pub fn return_values(mut self, mode: &str) -> Result<Self> {
        self.return_values = common::parse_update_return_values(mode)?;
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

    /// Finish the builder, yielding the update parameters.
    pub fn into_params(self) -> UpdateParams {
        let mut sections = Vec::with_capacity(4);
        for (keyword, clauses) in [
            ("SET", self.set_clauses),
            ("ADD", self.add_clauses),
            ("REMOVE", self.remove_clauses),
            ("DELETE", self.delete_clauses),
        ] {
            if !clauses.is_empty() {
                sections.push(format!("{keyword} {}", clauses.join(", ")));
            }
        }
        let (expression_attribute_names, expression_attribute_values) =
            self.attributes.into_options();
        UpdateParams {
            condition_expression: self.condition_expression,
            expression_attribute_names,
            expression_attribute_values,
            key: self.key,
            return_consumed_capacity: self.return_consumed_capacity,
            return_item_collection_metrics: self.return_item_collection_metrics,
            return_values: self.return_values,
            table_name: self.table_name,
            update_expression: sections.join(" "),
        }
    }

    /// Execute the update.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_helpers.update", err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::update_item::UpdateItemOutput,
        error::SdkError<operation::update_item::UpdateItemError>,
    > {
        let params = self.into_params();
        let builder = client
            .update_item()
            .update_expression(params.update_expression)
            .return_values(params.return_values);
        crate::apply_write_params!(builder, params).send().await
    }
}
