//! A declarative facade over the request builders.
//!
//! [`HelperService`] exposes one method per operation kind, each taking the
//! operation's mandatory identity plus a declarative options bag. Only
//! options actually present trigger the corresponding builder call, so
//! builder defaults stay untouched. Cross-field validation lives here and
//! fires before any builder exists, so an invalid options bag never causes
//! partial mutation.

use crate::{
    common,
    error::{Error, Result},
    read, write,
};

use aws_sdk_dynamodb::{Client, types};
use serde::Serialize;
use std::collections;

/// Options for a single-item or batch read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetOptions {
    /// Capacity-reporting level.
    pub capacity: Option<String>,
    /// Placeholder names to merge.
    pub names: Option<collections::HashMap<String, String>>,
    /// Projection to apply.
    pub projection: Option<common::Projection>,
    /// Whether to read strongly consistent.
    pub strong: bool,
}

/// Options for a query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryOptions<T> {
    /// Sort-key prefix comparison.
    pub begins: Option<T>,
    /// Sort-key inclusive range comparison.
    pub between: Option<(T, T)>,
    /// Capacity-reporting level.
    pub capacity: Option<String>,
    /// Sort-key equality comparison.
    pub eq: Option<T>,
    /// Filter expression applied after the key condition.
    pub filter: Option<String>,
    /// Sort-key traversal direction.
    pub forward: Option<bool>,
    /// Sort-key `>` comparison.
    pub gt: Option<T>,
    /// Sort-key `>=` comparison.
    pub gte: Option<T>,
    /// Secondary index to query.
    pub index: Option<String>,
    /// Maximum number of items to evaluate.
    pub limit: Option<i32>,
    /// Sort-key `<` comparison.
    pub lt: Option<T>,
    /// Sort-key `<=` comparison.
    pub lte: Option<T>,
    /// Placeholder names to merge.
    pub names: Option<collections::HashMap<String, String>>,
    /// Projection to apply.
    pub projection: Option<common::Projection>,
    /// Result-shape selector.
    pub select: Option<String>,
    /// The sort-key field a comparison applies to.
    pub sort_key: Option<String>,
    /// Exclusive pagination cursor.
    pub start: Option<collections::HashMap<String, T>>,
    /// Whether to read strongly consistent.
    pub strong: bool,
    /// Placeholder values to merge.
    pub values: Option<collections::HashMap<String, T>>,
}

impl<T> Default for QueryOptions<T> {
    fn default() -> Self {
        Self {
            begins: None,
            between: None,
            capacity: None,
            eq: None,
            filter: None,
            forward: None,
            gt: None,
            gte: None,
            index: None,
            limit: None,
            lt: None,
            lte: None,
            names: None,
            projection: None,
            select: None,
            sort_key: None,
            start: None,
            strong: false,
            values: None,
        }
    }
}

/// Options for a scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanOptions<T> {
    /// Capacity-reporting level.
    pub capacity: Option<String>,
    /// Filter expression applied to every scanned item.
    pub filter: Option<String>,
    /// Secondary index to scan.
    pub index: Option<String>,
    /// Maximum number of items to evaluate.
    pub limit: Option<i32>,
    /// Placeholder names to merge.
    pub names: Option<collections::HashMap<String, String>>,
    /// Projection to apply.
    pub projection: Option<common::Projection>,
    /// Zero-based parallel-scan segment.
    pub segment: Option<i32>,
    /// Result-shape selector.
    pub select: Option<String>,
    /// Exclusive pagination cursor.
    pub start: Option<collections::HashMap<String, T>>,
    /// Whether to read strongly consistent.
    pub strong: bool,
    /// Total number of parallel-scan segments.
    pub total_segments: Option<i32>,
    /// Placeholder values to merge.
    pub values: Option<collections::HashMap<String, T>>,
}

impl<T> Default for ScanOptions<T> {
    fn default() -> Self {
        Self {
            capacity: None,
            filter: None,
            index: None,
            limit: None,
            names: None,
            projection: None,
            segment: None,
            select: None,
            start: None,
            strong: false,
            total_segments: None,
            values: None,
        }
    }
}

/// Options for an update.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateOptions<T> {
    /// Raw `ADD` fragments.
    pub add: Vec<String>,
    /// Capacity-reporting level.
    pub capacity: Option<String>,
    /// Condition the update must satisfy.
    pub condition: Option<String>,
    /// Raw `DELETE` fragments.
    pub delete: Vec<String>,
    /// Suppress the automatic creation timestamp.
    pub disable_created_at: bool,
    /// Suppress the automatic update timestamp.
    pub disable_updated_at: bool,
    /// Whole item to expand into `SET` fragments.
    pub item: Option<T>,
    /// Item-collection-metrics level.
    pub metrics: Option<String>,
    /// Placeholder names to merge.
    pub names: Option<collections::HashMap<String, String>>,
    /// Raw `REMOVE` fragments.
    pub remove: Vec<String>,
    /// Which attributes to return.
    pub return_values: Option<String>,
    /// Raw `SET` fragments.
    pub set: Vec<String>,
    /// Placeholder values to merge.
    pub values: Option<collections::HashMap<String, T>>,
}

impl<T> Default for UpdateOptions<T> {
    fn default() -> Self {
        Self {
            add: Vec::new(),
            capacity: None,
            condition: None,
            delete: Vec::new(),
            disable_created_at: false,
            disable_updated_at: false,
            item: None,
            metrics: None,
            names: None,
            remove: Vec::new(),
            return_values: None,
            set: Vec::new(),
            values: None,
        }
    }
}

/// Options for a delete.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteOptions<T> {
    /// Capacity-reporting level.
    pub capacity: Option<String>,
    /// Condition the delete must satisfy.
    pub condition: Option<String>,
    /// Item-collection-metrics level.
    pub metrics: Option<String>,
    /// Placeholder names to merge.
    pub names: Option<collections::HashMap<String, String>>,
    /// Which attributes to return.
    pub return_values: Option<String>,
    /// Placeholder values to merge.
    pub values: Option<collections::HashMap<String, T>>,
}

impl<T> Default for DeleteOptions<T> {
    fn default() -> Self {
        Self {
            capacity: None,
            condition: None,
            metrics: None,
            names: None,
            return_values: None,
            values: None,
        }
    }
}

/// Single entry point that instantiates the right builder from a
/// declarative options object.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_helpers::{common::key, helper};
///
/// # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
/// let service = helper::HelperService::new(client);
/// let query = service.query(
///     "events",
///     key::Key::new("pk", "P1"),
///     helper::QueryOptions {
///         sort_key: Some("ts".to_string()),
///         begins: Some("2024"),
///         limit: Some(50),
///         ..Default::default()
///     },
/// )?;
/// let output = query.send(service.client()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HelperService {
    client: Client,
}

impl HelperService {
    /// Create the facade around a client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The client requests are executed against.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Compose a single-item read.
    pub fn getter<T: Serialize>(
        &self,
        table_name: &str,
        keys: common::key::Keys<T>,
        options: GetOptions,
    ) -> Result<read::get::Getter> {
        let getter = read::get::Getter::new(table_name, keys)?;
        apply_get_options(getter, options)
    }

    /// Compose a batch read.
    pub fn batch_getter<T: Serialize>(
        &self,
        table_name: &str,
        keys: Vec<common::key::Keys<T>>,
        options: GetOptions,
    ) -> Result<read::get::Getter> {
        let getter = read::get::Getter::new_batch(table_name, keys)?;
        apply_get_options(getter, options)
    }

    /// Compose a query.
    pub fn query<T: Serialize>(
        &self,
        table_name: &str,
        partition: common::key::Key<T>,
        options: QueryOptions<T>,
    ) -> Result<read::query::Query> {
        build_query(table_name, partition, options)
    }

    /// Compose a scan.
    pub fn scanner<T: Serialize>(
        &self,
        table_name: &str,
        options: ScanOptions<T>,
    ) -> Result<read::scan::Scanner> {
        build_scanner(table_name, options)
    }

    /// Compose an update.
    pub fn updater<K: Serialize, T: Serialize>(
        &self,
        table_name: &str,
        keys: common::key::Keys<K>,
        options: UpdateOptions<T>,
    ) -> Result<write::update::Updater> {
        build_updater(table_name, keys, options)
    }

    /// Compose a delete.
    pub fn deleter<K: Serialize, T: Serialize>(
        &self,
        table_name: &str,
        keys: common::key::Keys<K>,
        options: DeleteOptions<T>,
    ) -> Result<write::delete::Deleter> {
        build_deleter(table_name, keys, options)
    }

    /// Compose an empty batch write.
    pub fn batch_edit(&self) -> write::batch::BatchEdit {
        write::batch::BatchEdit::new()
    }
}

fn validate_projection_select(
    projection: Option<&common::Projection>,
    select: Option<&String>,
) -> Result<()> {
    if let (Some(_), Some(select)) = (projection, select) {
        if common::parse_select(select)? != types::Select::AllProjectedAttributes {
            return Err(Error::ProjectionSelectConflict {
                select: select.to_uppercase(),
            });
        }
    }
    Ok(())
}

fn validate_query_options<T>(options: &QueryOptions<T>) -> Result<()> {
    let supplied = [
        options.begins.is_some(),
        options.between.is_some(),
        options.eq.is_some(),
        options.gt.is_some(),
        options.gte.is_some(),
        options.lt.is_some(),
        options.lte.is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();
    if supplied > 1 {
        return Err(Error::ConflictingSortKeyConditions(supplied));
    }
    if supplied == 1 && options.sort_key.is_none() {
        return Err(Error::MissingSortKey);
    }
    validate_projection_select(options.projection.as_ref(), options.select.as_ref())
}

fn apply_get_options(
    mut getter: read::get::Getter,
    options: GetOptions,
) -> Result<read::get::Getter> {
    if options.strong {
        getter = getter.strong();
    }
    if let Some(names) = options.names {
        getter = getter.names(names);
    }
    if let Some(projection) = options.projection {
        getter = getter.projection(projection);
    }
    if let Some(capacity) = options.capacity {
        getter = getter.capacity(&capacity)?;
    }
    Ok(getter)
}

fn build_query<T: Serialize>(
    table_name: &str,
    partition: common::key::Key<T>,
    options: QueryOptions<T>,
) -> Result<read::query::Query> {
    validate_query_options(&options)?;
    let mut query = read::query::Query::new(table_name).key(&partition.name, partition.value)?;
    if let Some(index) = options.index {
        query = query.index(index);
    }
    if let Some(sort_key) = options.sort_key {
        query = query.sort_key(sort_key);
    }
    if let Some(value) = options.eq {
        query = query.eq(value)?;
    }
    if let Some(value) = options.lt {
        query = query.lt(value)?;
    }
    if let Some(value) = options.lte {
        query = query.lte(value)?;
    }
    if let Some(value) = options.gt {
        query = query.gt(value)?;
    }
    if let Some(value) = options.gte {
        query = query.gte(value)?;
    }
    if let Some((low, high)) = options.between {
        query = query.between(low, high)?;
    }
    if let Some(value) = options.begins {
        query = query.begins(value)?;
    }
    if let Some(start) = options.start {
        query = query.start(start)?;
    }
    if let Some(filter) = options.filter {
        query = query.filter(filter);
    }
    if let Some(names) = options.names {
        query = query.names(names);
    }
    if let Some(values) = options.values {
        query = query.values(values)?;
    }
    if let Some(projection) = options.projection {
        query = query.projection(projection);
    }
    if let Some(select) = options.select {
        query = query.select(&select)?;
    }
    if let Some(limit) = options.limit {
        query = query.limit(limit);
    }
    if let Some(forward) = options.forward {
        query = query.forward(forward);
    }
    if options.strong {
        query = query.strong();
    }
    if let Some(capacity) = options.capacity {
        query = query.capacity(&capacity)?;
    }
    Ok(query)
}

fn build_scanner<T: Serialize>(
    table_name: &str,
    options: ScanOptions<T>,
) -> Result<read::scan::Scanner> {
    validate_projection_select(options.projection.as_ref(), options.select.as_ref())?;
    let mut scanner = read::scan::Scanner::new(table_name);
    if let Some(index) = options.index {
        scanner = scanner.index(index);
    }
    if let Some(total_segments) = options.total_segments {
        scanner = scanner.total_segments(total_segments);
    }
    if let Some(segment) = options.segment {
        scanner = scanner.segment(segment)?;
    }
    if let Some(start) = options.start {
        scanner = scanner.start(start)?;
    }
    if let Some(filter) = options.filter {
        scanner = scanner.filter(filter);
    }
    if let Some(names) = options.names {
        scanner = scanner.names(names);
    }
    if let Some(values) = options.values {
        scanner = scanner.values(values)?;
    }
    if let Some(projection) = options.projection {
        scanner = scanner.projection(projection);
    }
    if let Some(select) = options.select {
        scanner = scanner.select(&select)?;
    }
    if let Some(limit) = options.limit {
        scanner = scanner.limit(limit);
    }
    if options.strong {
        scanner = scanner.strong();
    }
    if let Some(capacity) = options.capacity {
        scanner = scanner.capacity(&capacity)?;
    }
    Ok(scanner)
}

fn build_updater<K: Serialize, T: Serialize>(
    table_name: &str,
    keys: common::key::Keys<K>,
    options: UpdateOptions<T>,
) -> Result<write::update::Updater> {
    let mut updater = write::update::Updater::new(table_name, keys)?;
    if options.disable_created_at {
        updater = updater.disable_created_at();
    }
    if options.disable_updated_at {
        updater = updater.disable_updated_at();
    }
    for fragment in options.set {
        updater = updater.set(fragment);
    }
    for fragment in options.add {
        updater = updater.add(fragment);
    }
    for fragment in options.remove {
        updater = updater.remove(fragment);
    }
    for fragment in options.delete {
        updater = updater.delete(fragment);
    }
    if let Some(item) = options.item {
        updater = updater.item(item)?;
    }
    if let Some(condition) = options.condition {
        updater = updater.condition(condition);
    }
    if let Some(names) = options.names {
        updater = updater.names(names);
    }
    if let Some(values) = options.values {
        updater = updater.values(values)?;
    }
    if let Some(return_values) = options.return_values {
        updater = updater.return_values(&return_values)?;
    }
    if let Some(metrics) = options.metrics {
        updater = updater.metrics(&metrics)?;
    }
    if let Some(capacity) = options.capacity {
        updater = updater.capacity(&capacity)?;
    }
    Ok(updater)
}

fn build_deleter<K: Serialize, T: Serialize>(
    table_name: &str,
    keys: common::key::Keys<K>,
    options: DeleteOptions<T>,
) -> Result<write::delete::Deleter> {
    let mut deleter = write::delete::Deleter::new(table_name, keys)?;
    if let Some(condition) = options.condition {
        deleter = deleter.condition(condition)?;
    }
    if let Some(names) = options.names {
        deleter = deleter.names(names);
    }
    if let Some(values) = options.values {
        deleter = deleter.values(values)?;
    }
    if let Some(return_values) = options.return_values {
        deleter = deleter.return_values(&return_values)?;
    }
    if let Some(metrics) = options.metrics {
        deleter = deleter.metrics(&metrics)?;
    }
    if let Some(capacity) = options.capacity {
        deleter = deleter.capacity(&capacity)?;
    }
    Ok(deleter)
}
