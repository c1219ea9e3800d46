use crate::{
    common,
    error::{Error, Result},
};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Finished parameters of a query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// The exclusive pagination cursor to resume from.
    pub exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Placeholder names referenced by the expressions.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Placeholder values referenced by the expressions.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Filter applied after the key condition.
    pub filter_expression: Option<String>,
    /// The secondary index to query instead of the base table.
    pub index_name: Option<String>,
    /// The partition predicate, optionally `AND`-ed with a sort predicate.
    pub key_condition_expression: Option<String>,
    /// The maximum number of items to evaluate.
    pub limit: Option<i32>,
    /// The attributes to return.
    pub projection_expression: Option<String>,
    /// The capacity-reporting level.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to traverse the sort key ascending (`true`) or descending.
    pub scan_index_forward: Option<bool>,
    /// The result-shape selector.
    pub select: Option<types::Select>,
    /// The name of the table to read from.
    pub table_name: String,
}

/// Composes a partition-scoped, sort-key-range read request.
///
/// The partition predicate is always an equality; at most one sort-key
/// comparison applies on top of it. A sort-key comparison requires
/// [`Query::sort_key`] to have been called first.
///
/// ```rust
/// use dynamodb_helpers::read::query;
///
/// # fn example() -> Result<(), dynamodb_helpers::error::Error> {
/// let query = query::Query::new("events")
///     .key("pk", "P1")?
///     .sort_key("ts")
///     .between("2024-01", "2024-12")?
///     .limit(50);
/// let params = query.into_params();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    attributes: common::ExpressionAttributes,
    consistent_read: Option<bool>,
    exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    filter_expression: Option<String>,
    index_name: Option<String>,
    limit: Option<i32>,
    partition_condition: Option<String>,
    projection_expression: Option<String>,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    scan_index_forward: Option<bool>,
    select: Option<types::Select>,
    sort_condition: Option<String>,
    sort_key_name: Option<String>,
    table_name: String,
}

impl Query {
    /// Create a query against a table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Query a secondary index instead of the base table.
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Set the equality partition predicate.
    pub fn key<T: Serialize>(mut self, name: &str, value: T) -> Result<Self> {
        let name_placeholder = self.attributes.name(name);
        let value_placeholder = self.attributes.value(name, value)?;
        self.partition_condition = Some(format!("{name_placeholder} = {value_placeholder}"));
        Ok(self)
    }

    /// Declare the sort-key field a comparison will apply to.
    pub fn sort_key(mut self, name: impl Into<String>) -> Self {
        self.sort_key_name = Some(name.into());
        self
    }

    fn sort_comparison<T: Serialize>(mut self, operator: &str, value: T) -> Result<Self> {
        let field = self.sort_key_name.clone().ok_or(Error::MissingSortKey)?;
        let name_placeholder = self.attributes.name(&field);
        let value_placeholder = self.attributes.value(&field, value)?;
        self.sort_condition = Some(format!(
            "{name_placeholder} {operator} {value_placeholder}"
        ));
        Ok(self)
    }

    /// Sort-key equality comparison.
    pub fn eq<T: Serialize>(self, value: T) -> Result<Self> {
        self.sort_comparison("=", value)
    }

    /// Sort-key `<` comparison.
    pub fn lt<T: Serialize>(self, value: T) -> Result<Self> {
        self.sort_comparison("<", value)
    }

    /// Sort-key `<=` comparison.
    pub fn lte<T: Serialize>(self, value: T) -> Result<Self> {
        self.sort_comparison("<=", value)
    }

    /// Sort-key `>` comparison.
    pub fn gt<T: Serialize>(self, value: T) -> Result<Self> {
        self.sort_comparison(">", value)
    }

    /// Sort-key `>=` comparison.
    pub fn gte<T: Serialize>(self, value: T) -> Result<Self> {
        self.sort_comparison(">=", value)
    }

    /// Sort-key inclusive range comparison.
    pub fn between<T: Serialize>(mut self, low: T, high: T) -> Result<Self> {
        let field = self.sort_key_name.clone().ok_or(Error::MissingSortKey)?;
        let name_placeholder = self.attributes.name(&field);
        let low_placeholder = self.attributes.numbered_value(&field, 1, low)?;
        let high_placeholder = self.attributes.numbered_value(&field, 2, high)?;
        self.sort_condition = Some(format!(
            "{name_placeholder} BETWEEN {low_placeholder} AND {high_placeholder}"
        ));
        Ok(self)
    }

    /// Sort-key prefix comparison.
    pub fn begins<T: Serialize>(mut self, value: T) -> Result<Self> {
        let field = self.sort_key_name.clone().ok_or(Error::MissingSortKey)?;
        let name_placeholder = self.attributes.name(&field);
        let value_placeholder = self.attributes.value(&field, value)?;
        self.sort_condition = Some(format!(
            "begins_with ( {name_placeholder}, {value_placeholder} )"
        ));
        Ok(self)
    }

    /// Set the exclusive pagination cursor.
    pub fn start<T: Serialize>(
        mut self,
        key: collections::HashMap<String, T>,
    ) -> Result<Self> {
        let mut serialized_key = collections::HashMap::with_capacity(key.len());
        for (name, value) in key {
            serialized_key.insert(name, to_attribute_value(value)?);
        }
        self.exclusive_start_key = Some(serialized_key);
        Ok(self)
    }

    /// Set the filter expression applied after the key condition.
    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
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

    /// Append to the projection expression.
    pub fn projection(mut self, projection: impl Into<common::Projection>) -> Self {
        self.attributes
            .apply_projection(&mut self.projection_expression, projection.into());
        self
    }

    /// Set the result-shape selector (`ALL_ATTRIBUTES`,
    /// `ALL_PROJECTED_ATTRIBUTES`, `SPECIFIC_ATTRIBUTES`, or `COUNT`).
    pub fn select(mut self, mode: &str) -> Result<Self> {
        self.select = Some(common::parse_select(mode)?);
        Ok(self)
    }

    /// Set the maximum number of items to evaluate.
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the sort-key traversal direction.
    pub fn forward(mut self, forward: bool) -> Self {
        self.scan_index_forward = Some(forward);
        self
    }

    /// Request a strongly consistent read.
    pub fn strong(mut self) -> Self {
        self.consistent_read = Some(true);
        self
    }

    /// Set the capacity-reporting level (`INDEXES`, `TOTAL`, or `NONE`).
    pub fn capacity(mut self, level: &str) -> Result<Self> {
        self.return_consumed_capacity = Some(common::parse_capacity(level)?);
        Ok(self)
    }

    /// Finish the builder, yielding the query parameters.
    pub fn into_params(self) -> QueryParams {
        let key_condition_expression = match (self.partition_condition, self.sort_condition) {
            (Some(partition), Some(sort)) => Some(format!("{partition} AND {sort}")),
            (Some(partition), None) => Some(partition),
            (None, Some(sort)) => Some(sort),
            (None, None) => None,
        };
        let (expression_attribute_names, expression_attribute_values) =
            self.attributes.into_options();
        QueryParams {
            consistent_read: self.consistent_read,
            exclusive_start_key: self.exclusive_start_key,
            expression_attribute_names,
            expression_attribute_values,
            filter_expression: self.filter_expression,
            index_name: self.index_name,
            key_condition_expression,
            limit: self.limit,
            projection_expression: self.projection_expression,
            return_consumed_capacity: self.return_consumed_capacity,
            scan_index_forward: self.scan_index_forward,
            select: self.select,
            table_name: self.table_name,
        }
    }

    /// Execute the query.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_helpers.query", err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::query::QueryOutput,
        error::SdkError<operation::query::QueryError>,
    > {
        let params = self.into_params();
        let builder = client
            .query()
            .set_key_condition_expression(params.key_condition_expression)
            .set_scan_index_forward(params.scan_index_forward);
        crate::apply_read_params!(builder, params).send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn test_partition_predicate_only() {
        let params = Query::new("T")
            .key("pk", Value::String("P1".to_string()))
            .unwrap()
            .into_params();
        assert_eq!(
            params,
            QueryParams {
                expression_attribute_names: Some(collections::HashMap::from([(
                    "#pk".to_string(),
                    "pk".to_string()
                )])),
                expression_attribute_values: Some(collections::HashMap::from([(
                    ":pk".to_string(),
                    types::AttributeValue::S("P1".to_string())
                )])),
                key_condition_expression: Some("#pk = :pk".to_string()),
                table_name: "T".to_string(),
                ..Default::default()
            }
        );
    }

    #[rstest]
    #[case::eq("=", "#ts = :ts")]
    #[case::lt("<", "#ts < :ts")]
    #[case::lte("<=", "#ts <= :ts")]
    #[case::gt(">", "#ts > :ts")]
    #[case::gte(">=", "#ts >= :ts")]
    fn test_sort_comparisons(#[case] operator: &str, #[case] expected_sort_clause: &str) {
        let query = Query::new("T")
            .key("pk", "P1")
            .unwrap()
            .sort_key("ts");
        let query = match operator {
            "=" => query.eq("2024"),
            "<" => query.lt("2024"),
            "<=" => query.lte("2024"),
            ">" => query.gt("2024"),
            ">=" => query.gte("2024"),
            _ => unreachable!(),
        }
        .unwrap();
        let params = query.into_params();
        assert_eq!(
            params.key_condition_expression,
            Some(format!("#pk = :pk AND {expected_sort_clause}"))
        );
        assert_eq!(
            params.expression_attribute_values.unwrap()[":ts"],
            types::AttributeValue::S("2024".to_string())
        );
    }

    #[rstest]
    fn test_begins_emits_function_clause() {
        let params = Query::new("T")
            .key("pk", "P1")
            .unwrap()
            .sort_key("ts")
            .begins("2024")
            .unwrap()
            .into_params();
        let expression = params.key_condition_expression.unwrap();
        assert!(expression.contains("begins_with ( #ts, :ts )"));
        assert_eq!(
            params.expression_attribute_values.unwrap()[":ts"],
            types::AttributeValue::S("2024".to_string())
        );
    }

    #[rstest]
    fn test_between_allocates_two_numbered_values() {
        let params = Query::new("T")
            .key("pk", "P1")
            .unwrap()
            .sort_key("ts")
            .between("2024-01", "2024-12")
            .unwrap()
            .into_params();
        assert_eq!(
            params.key_condition_expression,
            Some("#pk = :pk AND #ts BETWEEN :ts1 AND :ts2".to_string())
        );
        assert_eq!(
            params.expression_attribute_values,
            Some(collections::HashMap::from([
                (
                    ":pk".to_string(),
                    types::AttributeValue::S("P1".to_string())
                ),
                (
                    ":ts1".to_string(),
                    types::AttributeValue::S("2024-01".to_string())
                ),
                (
                    ":ts2".to_string(),
                    types::AttributeValue::S("2024-12".to_string())
                ),
            ]))
        );
    }

    #[rstest]
    fn test_comparison_without_sort_key_is_rejected() {
        let result = Query::new("T").key("pk", "P1").unwrap().begins("2024");
        assert!(matches!(result, Err(Error::MissingSortKey)));
    }

    #[rstest]
    fn test_full_options() {
        let params = Query::new("T")
            .index("gsi1")
            .key("pk", "P1")
            .unwrap()
            .filter("#status = :status")
            .names(collections::HashMap::from([(
                "#status".to_string(),
                "status".to_string(),
            )]))
            .values(collections::HashMap::from([(
                ":status".to_string(),
                Value::String("open".to_string()),
            )]))
            .unwrap()
            .start(collections::HashMap::from([(
                "pk".to_string(),
                Value::String("P0".to_string()),
            )]))
            .unwrap()
            .select("all_projected_attributes")
            .unwrap()
            .limit(10)
            .forward(false)
            .strong()
            .capacity("indexes")
            .unwrap()
            .into_params();
        assert_eq!(
            params,
            QueryParams {
                consistent_read: Some(true),
                exclusive_start_key: Some(collections::HashMap::from([(
                    "pk".to_string(),
                    types::AttributeValue::S("P0".to_string())
                )])),
                expression_attribute_names: Some(collections::HashMap::from([
                    ("#pk".to_string(), "pk".to_string()),
                    ("#status".to_string(), "status".to_string()),
                ])),
                expression_attribute_values: Some(collections::HashMap::from([
                    (
                        ":pk".to_string(),
                        types::AttributeValue::S("P1".to_string())
                    ),
                    (
                        ":status".to_string(),
                        types::AttributeValue::S("open".to_string())
                    ),
                ])),
                filter_expression: Some("#status = :status".to_string()),
                index_name: Some("gsi1".to_string()),
                key_condition_expression: Some("#pk = :pk".to_string()),
                limit: Some(10),
                return_consumed_capacity: Some(types::ReturnConsumedCapacity::Indexes),
                scan_index_forward: Some(false),
                select: Some(types::Select::AllProjectedAttributes),
                table_name: "T".to_string(),
                ..Default::default()
            }
        );
    }
}
