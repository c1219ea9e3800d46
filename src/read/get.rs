use crate::{
    common,
    error::{Error, Result},
};

use aws_sdk_dynamodb::{Client, error::SdkError, operation, types};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections;

/// Finished parameters of a single-item read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItemParams {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Placeholder names referenced by the projection expression.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// The primary key of the item to retrieve.
    pub key: collections::HashMap<String, types::AttributeValue>,
    /// The attributes to return.
    pub projection_expression: Option<String>,
    /// The capacity-reporting level.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The name of the table to read from.
    pub table_name: String,
}

/// Per-table portion of a batch read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableKeys {
    /// Whether to use strongly consistent reads.
    pub consistent_read: Option<bool>,
    /// Placeholder names referenced by the projection expression.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// The primary keys of the items to retrieve.
    pub keys: Vec<collections::HashMap<String, types::AttributeValue>>,
    /// The attributes to return.
    pub projection_expression: Option<String>,
}

/// Finished parameters of a batch read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetParams {
    /// The keys to retrieve, grouped by table.
    pub request_items: IndexMap<String, TableKeys>,
    /// The capacity-reporting level.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
}

/// Finished parameters of a [`Getter`], one variant per mode.
#[derive(Clone, Debug, PartialEq)]
pub enum GetParams {
    /// Parameters of a single-item read.
    Single(GetItemParams),
    /// Parameters of a batch read.
    Batch(BatchGetParams),
}

/// Output of a [`Getter`], one variant per mode.
#[derive(Debug)]
pub enum GetOutput {
    /// Output of a single-item read.
    Single(operation::get_item::GetItemOutput),
    /// Output of a batch read.
    Batch(operation::batch_get_item::BatchGetItemOutput),
}

// single-vs-batch is fixed at construction, so a request can never carry
// both (or neither) parameter sets
#[derive(Clone, Debug, PartialEq)]
enum Target {
    Single(collections::HashMap<String, types::AttributeValue>),
    Batch(Vec<collections::HashMap<String, types::AttributeValue>>),
}

/// Composes a single-item or batch read request.
///
/// ```rust
/// use dynamodb_helpers::{common::key, read::get};
///
/// # fn example() -> Result<(), dynamodb_helpers::error::Error> {
/// let getter = get::Getter::new("users", key::Keys::partition("id", "1"))?
///     .strong()
///     .projection(vec!["id".to_string(), "name".to_string()]);
/// let params = getter.into_params();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Getter {
    attributes: common::ExpressionAttributes,
    consistent_read: Option<bool>,
    projection_expression: Option<String>,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    table_name: String,
    target: Target,
}

impl Getter {
    fn with_target(table_name: impl Into<String>, target: Target) -> Self {
        Self {
            attributes: common::ExpressionAttributes::default(),
            consistent_read: None,
            projection_expression: None,
            return_consumed_capacity: None,
            table_name: table_name.into(),
            target,
        }
    }

    /// Create a single-item getter.
    pub fn new<T: Serialize>(
        table_name: impl Into<String>,
        keys: common::key::Keys<T>,
    ) -> Result<Self> {
        let key = keys.try_into()?;
        Ok(Self::with_target(table_name, Target::Single(key)))
    }

    /// Create a batch getter.
    pub fn new_batch<T: Serialize>(
        table_name: impl Into<String>,
        keys: Vec<common::key::Keys<T>>,
    ) -> Result<Self> {
        let mut serialized_keys = Vec::with_capacity(keys.len());
        for key in keys {
            serialized_keys.push(key.try_into()?);
        }
        Ok(Self::with_target(table_name, Target::Batch(serialized_keys)))
    }

    /// Request a strongly consistent read.
    pub fn strong(mut self) -> Self {
        self.consistent_read = Some(true);
        self
    }

    /// Merge caller-supplied placeholder names.
    pub fn names(mut self, names: collections::HashMap<String, String>) -> Self {
        self.attributes.merge_names(names);
        self
    }

    /// Append to the projection expression.
    pub fn projection(mut self, projection: impl Into<common::Projection>) -> Self {
        self.attributes
            .apply_projection(&mut self.projection_expression, projection.into());
        self
    }

    /// Set the capacity-reporting level (`INDEXES`, `TOTAL`, or `NONE`).
    pub fn capacity(mut self, level: &str) -> Result<Self> {
        self.return_consumed_capacity = Some(common::parse_capacity(level)?);
        Ok(self)
    }

    /// Finish the builder, yielding the parameters of its mode.
    pub fn into_params(self) -> GetParams {
        let expression_attribute_names = self.attributes.into_names_option();
        match self.target {
            Target::Single(key) => GetParams::Single(GetItemParams {
                consistent_read: self.consistent_read,
                expression_attribute_names,
                key,
                projection_expression: self.projection_expression,
                return_consumed_capacity: self.return_consumed_capacity,
                table_name: self.table_name,
            }),
            Target::Batch(keys) => {
                let table_keys = TableKeys {
                    consistent_read: self.consistent_read,
                    expression_attribute_names,
                    keys,
                    projection_expression: self.projection_expression,
                };
                GetParams::Batch(BatchGetParams {
                    request_items: IndexMap::from([(self.table_name, table_keys)]),
                    return_consumed_capacity: self.return_consumed_capacity,
                })
            }
        }
    }

    /// Execute the read, dispatching on the mode fixed at construction.
    pub async fn send(self, client: &Client) -> Result<GetOutput> {
        match self.into_params() {
            GetParams::Single(params) => {
                let output = client
                    .get_item()
                    .set_consistent_read(params.consistent_read)
                    .set_expression_attribute_names(params.expression_attribute_names)
                    .set_key(Some(params.key))
                    .set_projection_expression(params.projection_expression)
                    .set_return_consumed_capacity(params.return_consumed_capacity)
                    .table_name(params.table_name)
                    .send()
                    .await?;
                Ok(GetOutput::Single(output))
            }
            GetParams::Batch(params) => {
                let mut request_items =
                    collections::HashMap::with_capacity(params.request_items.len());
                for (table_name, table_keys) in params.request_items {
                    let keys_and_attributes = types::KeysAndAttributes::builder()
                        .set_consistent_read(table_keys.consistent_read)
                        .set_expression_attribute_names(table_keys.expression_attribute_names)
                        .set_keys(Some(table_keys.keys))
                        .set_projection_expression(table_keys.projection_expression)
                        .build()
                        .map_err(SdkError::from)
                        .map_err(Error::BatchGetItem)?;
                    request_items.insert(table_name, keys_and_attributes);
                }
                let output = client
                    .batch_get_item()
                    .set_request_items(Some(request_items))
                    .set_return_consumed_capacity(params.return_consumed_capacity)
                    .send()
                    .await?;
                Ok(GetOutput::Batch(output))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::key;

    use rstest::rstest;
    use serde_json::Value;

    fn composite_keys() -> key::Keys<Value> {
        key::Keys::composite(
            "pk",
            Value::String("P1".to_string()),
            "sk",
            Value::String("S1".to_string()),
        )
    }

    fn composite_key_map() -> collections::HashMap<String, types::AttributeValue> {
        collections::HashMap::from([
            (
                "pk".to_string(),
                types::AttributeValue::S("P1".to_string()),
            ),
            (
                "sk".to_string(),
                types::AttributeValue::S("S1".to_string()),
            ),
        ])
    }

    #[rstest]
    fn test_single_no_options_is_key_and_table_only() {
        let params = Getter::new("T", composite_keys()).unwrap().into_params();
        assert_eq!(
            params,
            GetParams::Single(GetItemParams {
                key: composite_key_map(),
                table_name: "T".to_string(),
                ..Default::default()
            })
        );
    }

    #[rstest]
    fn test_single_full() {
        let params = Getter::new("T", composite_keys())
            .unwrap()
            .strong()
            .projection(vec!["id".to_string(), "name".to_string()])
            .capacity("total")
            .unwrap()
            .into_params();
        assert_eq!(
            params,
            GetParams::Single(GetItemParams {
                consistent_read: Some(true),
                expression_attribute_names: Some(collections::HashMap::from([
                    ("#id".to_string(), "id".to_string()),
                    ("#name".to_string(), "name".to_string()),
                ])),
                key: composite_key_map(),
                projection_expression: Some("#id, #name".to_string()),
                return_consumed_capacity: Some(types::ReturnConsumedCapacity::Total),
                table_name: "T".to_string(),
            })
        );
    }

    #[rstest]
    fn test_verbatim_projection_appends_after_field_list() {
        let params = Getter::new("T", composite_keys())
            .unwrap()
            .projection(vec!["id".to_string()])
            .projection("#name")
            .names(collections::HashMap::from([(
                "#name".to_string(),
                "name".to_string(),
            )]))
            .into_params();
        let GetParams::Single(params) = params else {
            panic!("expected single mode");
        };
        assert_eq!(params.projection_expression, Some("#id, #name".to_string()));
        assert_eq!(
            params.expression_attribute_names,
            Some(collections::HashMap::from([
                ("#id".to_string(), "id".to_string()),
                ("#name".to_string(), "name".to_string()),
            ]))
        );
    }

    #[rstest]
    fn test_batch_mode() {
        let keys = vec![
            key::Keys::partition("pk", Value::String("P1".to_string())),
            key::Keys::partition("pk", Value::String("P2".to_string())),
        ];
        let params = Getter::new_batch("T", keys)
            .unwrap()
            .strong()
            .into_params();
        assert_eq!(
            params,
            GetParams::Batch(BatchGetParams {
                request_items: IndexMap::from([(
                    "T".to_string(),
                    TableKeys {
                        consistent_read: Some(true),
                        keys: vec![
                            collections::HashMap::from([(
                                "pk".to_string(),
                                types::AttributeValue::S("P1".to_string()),
                            )]),
                            collections::HashMap::from([(
                                "pk".to_string(),
                                types::AttributeValue::S("P2".to_string()),
                            )]),
                        ],
                        ..Default::default()
                    },
                )]),
                return_consumed_capacity: None,
            })
        );
    }

    #[rstest]
    fn test_invalid_capacity_is_rejected() {
        let result = Getter::new("T", composite_keys()).unwrap().capacity("bogus");
        assert!(matches!(
            result,
            Err(Error::InvalidOption {
                setter: "capacity",
                ..
            })
        ));
    }
}
