use candid::CandidType;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use shoplist_config::ConfigError;
use shoplist_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// True if the caller can change the call and try again.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self.kind, ErrorKind::Rejected(_))
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::LifecycleRejected => ErrorKind::Rejected(RejectKind::Lifecycle),
            ErrorClass::UnknownOperation => ErrorKind::Rejected(RejectKind::UnknownOperation),
            ErrorClass::IndexOutOfRange => ErrorKind::Rejected(RejectKind::IndexOutOfRange),
            ErrorClass::BundleSizeViolation => ErrorKind::Rejected(RejectKind::BundleSize),
            ErrorClass::MalformedArgument => ErrorKind::Rejected(RejectKind::MalformedArgument),
            ErrorClass::CapacityExceeded => ErrorKind::Rejected(RejectKind::CapacityExceeded),
            ErrorClass::HostLimit => ErrorKind::Rejected(RejectKind::HostLimit),
            ErrorClass::Corruption => ErrorKind::Store(StoreErrorKind::Corruption),
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and canister interfaces.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The call was rejected; state is unchanged.
    Rejected(RejectKind),
    Store(StoreErrorKind),
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// RejectKind
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RejectKind {
    /// Lifecycle action not permitted in the current state.
    Lifecycle,

    /// `argument[0]` matched no enabled operation.
    UnknownOperation,
    IndexOutOfRange,

    /// Data calls must be submitted alone.
    BundleSize,
    MalformedArgument,
    CapacityExceeded,
    HostLimit,
}

///
/// StoreErrorKind
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StoreErrorKind {
    /// Stored state violates the list layout.
    Corruption,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers and canister interfaces.
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Lifecycle,
    Dispatch,
    Argument,
    Operation,
    Store,
    Host,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Lifecycle => Self::Lifecycle,
            CoreErrorOrigin::Dispatch => Self::Dispatch,
            CoreErrorOrigin::Argument => Self::Argument,
            CoreErrorOrigin::Operation => Self::Operation,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Host => Self::Host,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_classes_map_to_rejected_kinds() {
        let err: Error = InternalError::new(
            ErrorClass::IndexOutOfRange,
            CoreErrorOrigin::Operation,
            "Remove: index 5 out of range (count 1)",
        )
        .into();

        assert_eq!(err.kind, ErrorKind::Rejected(RejectKind::IndexOutOfRange));
        assert_eq!(err.origin, ErrorOrigin::Operation);
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "Remove: index 5 out of range (count 1)");
    }

    #[test]
    fn corruption_is_a_store_error() {
        let err: Error =
            InternalError::new(ErrorClass::Corruption, CoreErrorOrigin::Store, "bad").into();

        assert_eq!(err.kind, ErrorKind::Store(StoreErrorKind::Corruption));
        assert!(!err.is_rejection());
    }

    #[test]
    fn config_errors_keep_their_message() {
        let err: Error = ConfigError::Invalid("host.app_id must be non-zero".to_string()).into();

        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(err.origin.to_string(), "Config");
        assert!(err.message.contains("app_id"));
    }

    #[test]
    fn error_round_trips_through_candid() {
        let err = Error::new(
            ErrorKind::Rejected(RejectKind::BundleSize),
            ErrorOrigin::Dispatch,
            "data calls must be submitted alone (group size 2)",
        );

        let bytes = candid::encode_one(&err).unwrap();
        let decoded: Error = candid::decode_one(&bytes).unwrap();

        assert_eq!(decoded, err);
    }
}
