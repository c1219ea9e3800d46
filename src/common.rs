//! Common machinery shared by all request builders.
//!
//! This module provides the expression-attribute accumulator that every
//! builder allocates placeholders through, the projection input type, and
//! the parsers for enumerated request options.

/// Key types for identifying items in DynamoDB tables.
pub mod key;

use crate::error::{Error, Result};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Selection of attributes to return from a read.
///
/// A raw expression is appended verbatim to any projection already present,
/// comma-joined. A field list allocates one `#field` placeholder per field
/// and merges the placeholders into the attribute-name table.
///
/// ```rust
/// use dynamodb_helpers::common::Projection;
///
/// let verbatim: Projection = "#a, #b".into();
/// let fields: Projection = vec!["a".to_string(), "b".to_string()].into();
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    /// A projection expression appended verbatim.
    Expression(String),
    /// Attribute names, each allocated a placeholder.
    Attributes(Vec<String>),
}

impl From<&str> for Projection {
    fn from(expression: &str) -> Self {
        Self::Expression(expression.to_string())
    }
}

impl From<String> for Projection {
    fn from(expression: String) -> Self {
        Self::Expression(expression)
    }
}

impl From<Vec<String>> for Projection {
    fn from(fields: Vec<String>) -> Self {
        Self::Attributes(fields)
    }
}

impl From<&[&str]> for Projection {
    fn from(fields: &[&str]) -> Self {
        Self::Attributes(fields.iter().map(ToString::to_string).collect())
    }
}

/// Accumulating expression-attribute tables.
///
/// One instance lives inside each builder; placeholders are unique per
/// instance, re-registering a placeholder overwrites its previous value,
/// and merging an empty map is a no-op.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionAttributes {
    pub(crate) names: collections::HashMap<String, String>,
    pub(crate) values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionAttributes {
    /// Register `#field` for an attribute name and return the placeholder.
    pub(crate) fn name(&mut self, field: &str) -> String {
        let placeholder = format!("#{field}");
        self.names.insert(placeholder.clone(), field.to_string());
        placeholder
    }

    /// Register `:field` for an attribute value and return the placeholder.
    pub(crate) fn value<T: Serialize>(&mut self, field: &str, value: T) -> Result<String> {
        let placeholder = format!(":{field}");
        let value = to_attribute_value(value)?;
        self.values.insert(placeholder.clone(), value);
        Ok(placeholder)
    }

    /// Register `:field` for an already-converted attribute value.
    pub(crate) fn value_raw(&mut self, field: &str, value: types::AttributeValue) -> String {
        let placeholder = format!(":{field}");
        self.values.insert(placeholder.clone(), value);
        placeholder
    }

    /// Register `:field<number>`, the shape used by BETWEEN bounds.
    pub(crate) fn numbered_value<T: Serialize>(
        &mut self,
        field: &str,
        number: usize,
        value: T,
    ) -> Result<String> {
        let placeholder = format!(":{field}{number}");
        let value = to_attribute_value(value)?;
        self.values.insert(placeholder.clone(), value);
        Ok(placeholder)
    }

    /// Merge caller-supplied placeholder names.
    pub(crate) fn merge_names(&mut self, names: collections::HashMap<String, String>) {
        self.names.extend(names);
    }

    /// Merge caller-supplied placeholder values.
    pub(crate) fn merge_values<T: Serialize>(
        &mut self,
        values: collections::HashMap<String, T>,
    ) -> Result<()> {
        for (placeholder, value) in values {
            let value = to_attribute_value(value)?;
            self.values.insert(placeholder, value);
        }
        Ok(())
    }

    /// Apply a projection input to a running projection expression.
    pub(crate) fn apply_projection(
        &mut self,
        projection_expression: &mut Option<String>,
        projection: Projection,
    ) {
        let fragment = match projection {
            Projection::Expression(expression) => expression,
            Projection::Attributes(fields) => {
                let placeholders: Vec<_> =
                    fields.iter().map(|field| self.name(field)).collect();
                placeholders.join(", ")
            }
        };
        *projection_expression = match projection_expression.take() {
            Some(existing) => Some(format!("{existing}, {fragment}")),
            None => Some(fragment),
        };
    }

    /// Convert into the optional maps of the wire schema, `None` when empty.
    pub(crate) fn into_options(
        self,
    ) -> (
        Option<collections::HashMap<String, String>>,
        Option<collections::HashMap<String, types::AttributeValue>>,
    ) {
        let names = (!self.names.is_empty()).then_some(self.names);
        let values = (!self.values.is_empty()).then_some(self.values);
        (names, values)
    }

    /// Convert into the optional name map alone, `None` when empty.
    pub(crate) fn into_names_option(self) -> Option<collections::HashMap<String, String>> {
        (!self.names.is_empty()).then_some(self.names)
    }
}

pub(crate) fn parse_capacity(input: &str) -> Result<types::ReturnConsumedCapacity> {
    match input.to_uppercase().as_str() {
        "INDEXES" => Ok(types::ReturnConsumedCapacity::Indexes),
        "TOTAL" => Ok(types::ReturnConsumedCapacity::Total),
        "NONE" => Ok(types::ReturnConsumedCapacity::None),
        _ => Err(Error::InvalidOption {
            setter: "capacity",
            value: input.to_string(),
            allowed: "INDEXES, TOTAL, NONE",
        }),
    }
}

pub(crate) fn parse_select(input: &str) -> Result<types::Select> {
    match input.to_uppercase().as_str() {
        "ALL_ATTRIBUTES" => Ok(types::Select::AllAttributes),
        "ALL_PROJECTED_ATTRIBUTES" => Ok(types::Select::AllProjectedAttributes),
        "SPECIFIC_ATTRIBUTES" => Ok(types::Select::SpecificAttributes),
        "COUNT" => Ok(types::Select::Count),
        _ => Err(Error::InvalidOption {
            setter: "select",
            value: input.to_string(),
            allowed: "ALL_ATTRIBUTES, ALL_PROJECTED_ATTRIBUTES, SPECIFIC_ATTRIBUTES, COUNT",
        }),
    }
}

pub(crate) fn parse_update_return_values(input: &str) -> Result<types::ReturnValue> {
    match input.to_uppercase().as_str() {
        "NONE" => Ok(types::ReturnValue::None),
        "ALL_OLD" => Ok(types::ReturnValue::AllOld),
        "UPDATED_OLD" => Ok(types::ReturnValue::UpdatedOld),
        "ALL_NEW" => Ok(types::ReturnValue::AllNew),
        "UPDATED_NEW" => Ok(types::ReturnValue::UpdatedNew),
        _ => Err(Error::InvalidOption {
            setter: "return_values",
            value: input.to_string(),
            allowed: "NONE, ALL_OLD, UPDATED_OLD, ALL_NEW, UPDATED_NEW",
        }),
    }
}

pub(crate) fn parse_delete_return_values(input: &str) -> Result<types::ReturnValue> {
    match input.to_uppercase().as_str() {
        "NONE" => Ok(types::ReturnValue::None),
        "ALL_OLD" => Ok(types::ReturnValue::AllOld),
        _ => Err(Error::InvalidOption {
            setter: "return_values",
            value: input.to_string(),
            allowed: "NONE, ALL_OLD",
        }),
    }
}

pub(crate) fn parse_metrics(input: &str) -> Result<types::ReturnItemCollectionMetrics> {
    match input.to_uppercase().as_str() {
        "NONE" => Ok(types::ReturnItemCollectionMetrics::None),
        "SIZE" => Ok(types::ReturnItemCollectionMetrics::Size),
        _ => Err(Error::InvalidOption {
            setter: "metrics",
            value: input.to_string(),
            allowed: "NONE, SIZE",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::upper("INDEXES", types::ReturnConsumedCapacity::Indexes)]
    #[case::lower("total", types::ReturnConsumedCapacity::Total)]
    #[case::mixed("nOnE", types::ReturnConsumedCapacity::None)]
    fn test_parse_capacity(#[case] input: &str, #[case] expected: types::ReturnConsumedCapacity) {
        assert_eq!(parse_capacity(input).unwrap(), expected);
    }

    #[rstest]
    #[case::all("all_attributes", types::Select::AllAttributes)]
    #[case::projected("ALL_PROJECTED_ATTRIBUTES", types::Select::AllProjectedAttributes)]
    #[case::specific("Specific_Attributes", types::Select::SpecificAttributes)]
    #[case::count("count", types::Select::Count)]
    fn test_parse_select(#[case] input: &str, #[case] expected: types::Select) {
        assert_eq!(parse_select(input).unwrap(), expected);
    }

    #[rstest]
    #[case::all_new("all_new", types::ReturnValue::AllNew)]
    #[case::updated_old("UPDATED_OLD", types::ReturnValue::UpdatedOld)]
    fn test_parse_update_return_values(#[case] input: &str, #[case] expected: types::ReturnValue) {
        assert_eq!(parse_update_return_values(input).unwrap(), expected);
    }

    #[rstest]
    #[case::capacity(parse_capacity("bogus"), "INDEXES, TOTAL, NONE")]
    #[case::select(parse_select("SOME"), "ALL_ATTRIBUTES, ALL_PROJECTED_ATTRIBUTES, SPECIFIC_ATTRIBUTES, COUNT")]
    #[case::update_return(parse_update_return_values("OLD"), "NONE, ALL_OLD, UPDATED_OLD, ALL_NEW, UPDATED_NEW")]
    #[case::delete_return(parse_delete_return_values("ALL_NEW"), "NONE, ALL_OLD")]
    #[case::metrics(parse_metrics("bytes"), "NONE, SIZE")]
    fn test_parse_invalid_option<T: std::fmt::Debug>(
        #[case] result: Result<T>,
        #[case] expected_allowed: &str,
    ) {
        match result {
            Err(Error::InvalidOption { allowed, .. }) => assert_eq!(allowed, expected_allowed),
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[rstest]
    fn test_name_and_value_placeholders() {
        let mut attributes = ExpressionAttributes::default();
        assert_eq!(attributes.name("a"), "#a");
        assert_eq!(attributes.value("a", "x").unwrap(), ":a");
        assert_eq!(attributes.numbered_value("a", 1, "y").unwrap(), ":a1");
        assert_eq!(
            attributes.names,
            collections::HashMap::from([("#a".to_string(), "a".to_string())])
        );
        assert_eq!(
            attributes.values,
            collections::HashMap::from([
                (":a".to_string(), types::AttributeValue::S("x".to_string())),
                (":a1".to_string(), types::AttributeValue::S("y".to_string())),
            ])
        );
    }

    #[rstest]
    fn test_value_reregistration_last_write_wins() {
        let mut attributes = ExpressionAttributes::default();
        attributes.value("a", "x").unwrap();
        attributes.value("a", "y").unwrap();
        assert_eq!(
            attributes.values,
            collections::HashMap::from([(
                ":a".to_string(),
                types::AttributeValue::S("y".to_string())
            )])
        );
    }

    #[rstest]
    fn test_empty_merge_is_a_no_op() {
        let mut attributes = ExpressionAttributes::default();
        attributes.name("a");
        let before = attributes.clone();
        attributes.merge_names(collections::HashMap::new());
        attributes
            .merge_values(collections::HashMap::<String, String>::new())
            .unwrap();
        assert_eq!(attributes, before);
    }

    #[rstest]
    #[case::expression_onto_empty(
        None,
        Projection::Expression("#a, #b".to_string()),
        Some("#a, #b".to_string()),
        0
    )]
    #[case::expression_appended(
        Some("#a".to_string()),
        Projection::Expression("#b".to_string()),
        Some("#a, #b".to_string()),
        0
    )]
    #[case::attributes_allocated(
        None,
        Projection::Attributes(vec!["a".to_string(), "b".to_string()]),
        Some("#a, #b".to_string()),
        2
    )]
    #[case::attributes_appended(
        Some("#z".to_string()),
        Projection::Attributes(vec!["a".to_string()]),
        Some("#z, #a".to_string()),
        1
    )]
    fn test_apply_projection(
        #[case] mut projection_expression: Option<String>,
        #[case] projection: Projection,
        #[case] expected_expression: Option<String>,
        #[case] expected_name_count: usize,
    ) {
        let mut attributes = ExpressionAttributes::default();
        attributes.apply_projection(&mut projection_expression, projection);
        assert_eq!(projection_expression, expected_expression);
        assert_eq!(attributes.names.len(), expected_name_count);
        for placeholder in attributes.names.keys() {
            assert!(projection_expression.as_ref().unwrap().contains(placeholder));
        }
    }

    #[rstest]
    fn test_into_options_empty_maps_become_none() {
        let (names, values) = ExpressionAttributes::default().into_options();
        assert_eq!(names, None);
        assert_eq!(values, None);
    }
}
