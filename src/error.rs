use aws_sdk_dynamodb::{error::SdkError, operation};

/// Errors raised while composing a request.
///
/// Every configuration error is raised synchronously at the offending call
/// and carries the offending input together with the allowed-value set.
/// Cross-field errors are raised by [`crate::helper`] before any builder is
/// mutated. Transport errors are surfaced unchanged by the `send` methods;
/// only the dual-mode [`crate::read::get::Getter`] funnels them through this
/// type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An enumerated-option setter received a value outside its allowed set.
    #[error("invalid value `{value}` for `{setter}`: allowed values are {allowed}")]
    InvalidOption {
        /// The setter that rejected the value.
        setter: &'static str,
        /// The offending input, as supplied by the caller.
        value: String,
        /// The documented allowed-value set.
        allowed: &'static str,
    },

    /// `segment` was called before `total_segments`.
    #[error("`segment` requires `total_segments` to be set first")]
    SegmentWithoutTotalSegments,

    /// A parallel scan was configured with only one of its two parameters.
    #[error("parallel scan requires both `segment` and `total_segments`, or neither")]
    PartialParallelScan,

    /// A sort-key comparison was supplied without a declared sort-key field.
    #[error("a sort-key condition requires `sort_key` to be set first")]
    MissingSortKey,

    /// More than one sort-key comparison was supplied for a single query.
    #[error("exactly one sort-key condition may be supplied, got {0}")]
    ConflictingSortKeyConditions(usize),

    /// A projection was combined with an incompatible `select` mode.
    #[error(
        "`projection` cannot be combined with select `{select}`: \
         only `ALL_PROJECTED_ATTRIBUTES` is compatible"
    )]
    ProjectionSelectConflict {
        /// The select mode the caller supplied.
        select: String,
    },

    /// `condition` was called on a builder whose condition was already set.
    #[error("the condition expression may only be set once")]
    ConditionAlreadySet,

    /// A caller value could not be converted to a DynamoDB attribute value.
    #[error(transparent)]
    Serialization(#[from] serde_dynamo::Error),

    /// A single-item get request was rejected by the transport.
    #[error("get item request failed")]
    GetItem(#[from] SdkError<operation::get_item::GetItemError>),

    /// A batch get request was rejected by the transport.
    #[error("batch get item request failed")]
    BatchGetItem(#[from] SdkError<operation::batch_get_item::BatchGetItemError>),
}

/// Result alias for request composition.
pub type Result<T> = std::result::Result<T, Error>;
