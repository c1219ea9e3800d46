use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::{Error, Result, to_attribute_value};
use std::collections;

/// One component of a primary key.
///
/// ```rust
/// use dynamodb_helpers::common::key;
///
/// let key = key::Key::new("id", "1");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

impl<T> Key<T> {
    /// Create a key component.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Primary key of an item: partition key and optional sort key.
///
/// ```rust
/// use dynamodb_helpers::common::key;
///
/// let simple = key::Keys::partition("id", "1");
/// let composite = key::Keys::composite("pk", "P1", "sk", "S1");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key (required).
    pub partition_key: Key<T>,
    /// The sort key (only for tables with composite primary keys).
    pub sort_key: Option<Key<T>>,
}

impl<T> Keys<T> {
    /// Create a partition-key-only primary key.
    pub fn partition(name: impl Into<String>, value: T) -> Self {
        Self {
            partition_key: Key::new(name, value),
            sort_key: None,
        }
    }

    /// Create a composite primary key.
    pub fn composite(
        partition_name: impl Into<String>,
        partition_value: T,
        sort_name: impl Into<String>,
        sort_value: T,
    ) -> Self {
        Self {
            partition_key: Key::new(partition_name, partition_value),
            sort_key: Some(Key::new(sort_name, sort_value)),
        }
    }
}

impl<T: Serialize> TryFrom<Keys<T>> for collections::HashMap<String, types::AttributeValue> {
    type Error = Error;

    fn try_from(keys: Keys<T>) -> Result<Self> {
        let partition_key_value = to_attribute_value(keys.partition_key.value)?;
        let mut map = Self::from([(keys.partition_key.name, partition_key_value)]);
        if let Some(sort_key) = keys.sort_key {
            let sort_key_value = to_attribute_value(sort_key.value)?;
            map.insert(sort_key.name, sort_key_value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::partition_only(
        Keys::partition("pk", Value::String("P1".to_string())),
        collections::HashMap::from(
            [(
                "pk".to_string(),
                types::AttributeValue::S("P1".to_string()),
            )]
        )
    )]
    #[case::composite(
        Keys::composite(
            "pk",
            Value::String("P1".to_string()),
            "sk",
            Value::String("S1".to_string()),
        ),
        collections::HashMap::from(
            [
                (
                    "pk".to_string(),
                    types::AttributeValue::S("P1".to_string()),
                ),
                (
                    "sk".to_string(),
                    types::AttributeValue::S("S1".to_string()),
                ),
            ]
        )
    )]
    #[case::numeric_sort_key(
        Keys::composite(
            "pk",
            Value::String("P1".to_string()),
            "version",
            Value::Number(7.into()),
        ),
        collections::HashMap::from(
            [
                (
                    "pk".to_string(),
                    types::AttributeValue::S("P1".to_string()),
                ),
                (
                    "version".to_string(),
                    types::AttributeValue::N("7".to_string()),
                ),
            ]
        )
    )]
    fn test_keys_to_attribute_map(
        #[case] keys: Keys<Value>,
        #[case] expected: collections::HashMap<String, types::AttributeValue>,
    ) {
        let actual: collections::HashMap<String, types::AttributeValue> = keys.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
