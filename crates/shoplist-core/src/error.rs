use crate::ops::OperationKind;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured call rejection with a stable classification.
/// Every error aborts the enclosing call; the host only sees approve/reject,
/// the class and origin exist for diagnostics and tests.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a lifecycle rejection (disallowed action or wrong state).
    pub(crate) fn lifecycle_rejected(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::LifecycleRejected,
            ErrorOrigin::Lifecycle,
            message.into(),
        )
    }

    /// Construct an unknown-operation rejection for an unmatched tag.
    pub(crate) fn unknown_operation(tag: &[u8]) -> Self {
        Self::new(
            ErrorClass::UnknownOperation,
            ErrorOrigin::Dispatch,
            format!("unknown operation tag: '{}'", tag.escape_ascii()),
        )
    }

    /// Construct an out-of-range rejection for an index-taking operation.
    pub(crate) fn index_out_of_range(op: OperationKind, index: u64, count: u64) -> Self {
        Self::new(
            ErrorClass::IndexOutOfRange,
            ErrorOrigin::Operation,
            format!("{op}: index {index} out of range (count {count})"),
        )
    }

    /// Construct a bundle-size rejection for a grouped data call.
    pub(crate) fn bundle_size(group_size: u32) -> Self {
        Self::new(
            ErrorClass::BundleSizeViolation,
            ErrorOrigin::Dispatch,
            format!("data calls must be submitted alone (group size {group_size})"),
        )
    }

    /// Construct a capacity rejection for an add at the configured cap.
    pub(crate) fn capacity_exceeded(count: u64, max_records: u64) -> Self {
        Self::new(
            ErrorClass::CapacityExceeded,
            ErrorOrigin::Operation,
            format!("list is full: count {count} reached max_records {max_records}"),
        )
    }

    /// Construct a store-origin corruption error.
    pub(crate) fn store_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Store, message.into())
    }

    /// Construct a store-origin internal error.
    pub(crate) fn store_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, message.into())
    }

    /// Construct a host-origin internal error.
    pub(crate) fn host_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Host, message.into())
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Rejection taxonomy. All classes are fatal to the call.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorClass {
    LifecycleRejected,
    UnknownOperation,
    IndexOutOfRange,
    BundleSizeViolation,
    MalformedArgument,
    CapacityExceeded,
    HostLimit,
    Corruption,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LifecycleRejected => "lifecycle_rejected",
            Self::UnknownOperation => "unknown_operation",
            Self::IndexOutOfRange => "index_out_of_range",
            Self::BundleSizeViolation => "bundle_size_violation",
            Self::MalformedArgument => "malformed_argument",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::HostLimit => "host_limit",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Which layer produced the rejection.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorOrigin {
    Lifecycle,
    Dispatch,
    Argument,
    Operation,
    Store,
    Host,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Lifecycle => "lifecycle",
            Self::Dispatch => "dispatch",
            Self::Argument => "argument",
            Self::Operation => "operation",
            Self::Store => "store",
            Self::Host => "host",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
