use crate::{common, error::Result};

use aws_sdk_dynamodb::{Client, error, operation, types};
use indexmap::IndexMap;
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// One entry of a batch write.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteRequest {
    /// Remove an item by its primary key.
    Delete {
        /// The primary key of the item to remove.
        key: collections::HashMap<String, types::AttributeValue>,
    },
    /// Create or replace an item.
    Put {
        /// The full item to write.
        item: collections::HashMap<String, types::AttributeValue>,
    },
}

/// Finished parameters of a batch write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchWriteParams {
    /// The write entries, grouped by table, in insertion order.
    pub request_items: IndexMap<String, Vec<WriteRequest>>,
}

/// Composes a multi-item batch write/delete request.
///
/// Entries accumulate per table in call order. No item-count limit is
/// enforced here; splitting oversized batches is the transport's concern.
///
/// ```rust
/// use dynamodb_helpers::{common::key, write::batch};
/// use serde_json::json;
///
/// # fn example() -> Result<(), dynamodb_helpers::error::Error> {
/// let edit = batch::BatchEdit::new()
///     .add_put("users", json!({"id": "1", "name": "Jane"}))?
///     .add_delete("users", key::Keys::partition("id", "2"))?;
/// let params = edit.into_params();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchEdit {
    request_items: IndexMap<String, Vec<WriteRequest>>,
}

impl BatchEdit {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one delete entry for a table.
    pub fn add_delete<T: Serialize>(
        mut self,
        table_name: impl Into<String>,
        keys: common::key::Keys<T>,
    ) -> Result<Self> {
        let key = keys.try_into()?;
        self.request_items
            .entry(table_name.into())
            .or_default()
            .push(WriteRequest::Delete { key });
        Ok(self)
    }

    /// Append one put entry for a table.
    pub fn add_put<T: Serialize>(
        mut self,
        table_name: impl Into<String>,
        item: T,
    ) -> Result<Self> {
        let item: collections::HashMap<String, types::AttributeValue> = to_item(item)?;
        self.request_items
            .entry(table_name.into())
            .or_default()
            .push(WriteRequest::Put { item });
        Ok(self)
    }

    /// Append many delete entries for a table.
    pub fn add_deletes<T: Serialize>(
        mut self,
        table_name: impl Into<String>,
        keys: Vec<common::key::Keys<T>>,
    ) -> Result<Self> {
        let table_name = table_name.into();
        for key in keys {
            self = self.add_delete(&table_name, key)?;
        }
        Ok(self)
    }

    /// Append many put entries for a table.
    pub fn add_puts<T: Serialize>(
        mut self,
        table_name: impl Into<String>,
        items: Vec<T>,
    ) -> Result<Self> {
        let table_name = table_name.into();
        for item in items {
            self = self.add_put(&table_name, item)?;
        }
        Ok(self)
    }

    /// Finish the builder, yielding the batch write parameters.
    pub fn into_params(self) -> BatchWriteParams {
        BatchWriteParams {
            request_items: self.request_items,
        }
    }

    /// Execute the batch write.
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::batch_write_item::BatchWriteItemOutput,
        error::SdkError<operation::batch_write_item::BatchWriteItemError>,
    > {
        let params = self.into_params();
        let mut request_items = collections::HashMap::with_capacity(params.request_items.len());
        for (table_name, requests) in params.request_items {
            let mut serialized_requests = Vec::with_capacity(requests.len());
            for request in requests {
                let builder = match request {
                    WriteRequest::Put { item } => {
                        let put_request =
                            types::PutRequest::builder().set_item(Some(item)).build()?;
                        types::WriteRequest::builder().set_put_request(Some(put_request))
                    }
                    WriteRequest::Delete { key } => {
                        let delete_request =
                            types::DeleteRequest::builder().set_key(Some(key)).build()?;
                        types::WriteRequest::builder().set_delete_request(Some(delete_request))
                    }
                };
                serialized_requests.push(builder.build());
            }
            request_items.insert(table_name, serialized_requests);
        }
        client
            .batch_write_item()
            .set_request_items(Some(request_items))
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::key;

    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    fn test_entries_accumulate_in_call_order() {
        let params = BatchEdit::new()
            .add_put("users", json!({"id": "1"}))
            .unwrap()
            .add_delete("users", key::Keys::partition("id", Value::String("2".to_string())))
            .unwrap()
            .add_put("audit", json!({"id": "a"}))
            .unwrap()
            .into_params();
        assert_eq!(
            params.request_items.get_index(0),
            Some((
                &"users".to_string(),
                &vec![
                    WriteRequest::Put {
                        item: collections::HashMap::from([(
                            "id".to_string(),
                            types::AttributeValue::S("1".to_string()),
                        )]),
                    },
                    WriteRequest::Delete {
                        key: collections::HashMap::from([(
                            "id".to_string(),
                            types::AttributeValue::S("2".to_string()),
                        )]),
                    },
                ]
            ))
        );
        assert_eq!(params.request_items.len(), 2);
    }

    #[rstest]
    fn test_plural_appenders() {
        let params = BatchEdit::new()
            .add_puts("users", vec![json!({"id": "1"}), json!({"id": "2"})])
            .unwrap()
            .add_deletes(
                "users",
                vec![
                    key::Keys::partition("id", Value::String("3".to_string())),
                    key::Keys::partition("id", Value::String("4".to_string())),
                ],
            )
            .unwrap()
            .into_params();
        assert_eq!(params.request_items["users"].len(), 4);
    }

    #[rstest]
    fn test_empty_batch() {
        assert_eq!(
            BatchEdit::new().into_params(),
            BatchWriteParams::default()
        );
    }
}
