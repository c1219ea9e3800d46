use crate::{
    common,
    error::{Error, Result},
};

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Finished parameters of a scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanParams {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// The exclusive pagination cursor to resume from.
    pub exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Placeholder names referenced by the expressions.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Placeholder values referenced by the expressions.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Filter applied to every scanned item.
    pub filter_expression: Option<String>,
    /// The secondary index to scan instead of the base table.
    pub index_name: Option<String>,
    /// The maximum number of items to evaluate.
    pub limit: Option<i32>,
    /// The attributes to return.
    pub projection_expression: Option<String>,
    /// The capacity-reporting level.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The zero-based segment this request covers in a parallel scan.
    pub segment: Option<i32>,
    /// The result-shape selector.
    pub select: Option<types::Select>,
    /// The name of the table to read from.
    pub table_name: String,
    /// The total number of segments of a parallel scan.
    pub total_segments: Option<i32>,
}

/// Composes a full-table read request, optionally parallel-segmented.
///
/// Parallel scans must be fully specified or not at all:
/// [`Scanner::segment`] requires [`Scanner::total_segments`] to have been
/// called first, and finishing with only `total_segments` set is an error.
///
/// ```rust
/// use dynamodb_helpers::read::scan;
///
/// # fn example() -> Result<(), dynamodb_helpers::error::Error> {
/// let scanner = scan::Scanner::new("users")
///     .total_segments(4)
///     .segment(0)?
///     .limit(100);
/// let params = scanner.into_params()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scanner {
    attributes: common::ExpressionAttributes,
    consistent_read: Option<bool>,
    exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    filter_expression: Option<String>,
    index_name: Option<String>,
    limit: Option<i32>,
    projection_expression: Option<String>,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    segment: Option<i32>,
    select: Option<types::Select>,
    table_name: String,
    total_segments: Option<i32>,
}

impl Scanner {
    /// Create a scanner against a table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Scan a secondary index instead of the base table.
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Set the total number of segments of a parallel scan.
    pub fn total_segments(mut self, total_segments: i32) -> Self {
        self.total_segments = Some(total_segments);
        self
    }

    /// Set the segment this request covers. Requires
    /// [`Scanner::total_segments`] to have been called first.
    pub fn segment(mut self, segment: i32) -> Result<Self> {
        if self.total_segments.is_none() {
            return Err(Error::SegmentWithoutTotalSegments);
        }
        self.segment = Some(segment);
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

    /// Set the filter expression applied to every scanned item.
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

    /// Request strongly consistent reads.
    pub fn strong(mut self) -> Self {
        self.consistent_read = Some(true);
        self
    }

    /// Set the capacity-reporting level (`INDEXES`, `TOTAL`, or `NONE`).
    pub fn capacity(mut self, level: &str) -> Result<Self> {
        self.return_consumed_capacity = Some(common::parse_capacity(level)?);
        Ok(self)
    }

    /// Finish the builder, yielding the scan parameters.
    pub fn into_params(self) -> Result<ScanParams> {
        if self.segment.is_some() != self.total_segments.is_some() {
            return Err(Error::PartialParallelScan);
        }
        let (expression_attribute_names, expression_attribute_values) =
            self.attributes.into_options();
        Ok(ScanParams {
            consistent_read: self.consistent_read,
            exclusive_start_key: self.exclusive_start_key,
            expression_attribute_names,
            expression_attribute_values,
            filter_expression: self.filter_expression,
            index_name: self.index_name,
            limit: self.limit,
            projection_expression: self.projection_expression,
            return_consumed_capacity: self.return_consumed_capacity,
            segment: self.segment,
            select: self.select,
            table_name: self.table_name,
            total_segments: self.total_segments,
        })
    }

    /// Execute the scan.
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::scan::ScanOutput,
        error::SdkError<operation::scan::ScanError>,
    > {
        let params = self.into_params().map_err(error::BuildError::other)?;
        let builder = client
            .scan()
            .set_segment(params.segment)
            .set_total_segments(params.total_segments);
        crate::apply_read_params!(builder, params).send().await
    }
}
