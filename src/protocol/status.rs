//! Key-value status codes
//!
//! Status codes carried in response headers, with their classification into
//! terminal error kinds and retry reasons.

use crate::context::RetryReason;
use crate::error::ErrorKind;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyValueStatus {
    Success,
    NotFound,
    Exists,
    TooBig,
    Invalid,
    NotStored,
    DeltaBadValue,
    NotMyVbucket,
    NoBucket,
    Locked,
    AuthStale,
    AuthError,
    AuthContinue,
    RangeError,
    Rollback,
    NoAccess,
    NotInitialized,
    UnknownFrameInfo,
    UnknownCommand,
    NoMemory,
    NotSupported,
    Internal,
    Busy,
    TemporaryFailure,
    XattrInvalid,
    UnknownCollection,
    UnknownScope,
    DurabilityInvalidLevel,
    DurabilityImpossible,
    SyncWriteInProgress,
    SyncWriteAmbiguous,
    SyncWriteReCommitInProgress,
    /// A code this client does not know; preserved verbatim
    Unknown(u16),
}

/// What a response status means for the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    Success,
    Failure { kind: ErrorKind, reason: RetryReason },
}

impl KeyValueStatus {
    pub fn from_code(code: u16) -> Self {
        match code {
            0x00 => KeyValueStatus::Success,
            0x01 => KeyValueStatus::NotFound,
            0x02 => KeyValueStatus::Exists,
            0x03 => KeyValueStatus::TooBig,
            0x04 => KeyValueStatus::Invalid,
            0x05 => KeyValueStatus::NotStored,
            0x06 => KeyValueStatus::DeltaBadValue,
            0x07 => KeyValueStatus::NotMyVbucket,
            0x08 => KeyValueStatus::NoBucket,
            0x09 => KeyValueStatus::Locked,
            0x1f => KeyValueStatus::AuthStale,
            0x20 => KeyValueStatus::AuthError,
            0x21 => KeyValueStatus::AuthContinue,
            0x22 => KeyValueStatus::RangeError,
            0x23 => KeyValueStatus::Rollback,
            0x24 => KeyValueStatus::NoAccess,
            0x25 => KeyValueStatus::NotInitialized,
            0x80 => KeyValueStatus::UnknownFrameInfo,
            0x81 => KeyValueStatus::UnknownCommand,
            0x82 => KeyValueStatus::NoMemory,
            0x83 => KeyValueStatus::NotSupported,
            0x84 => KeyValueStatus::Internal,
            0x85 => KeyValueStatus::Busy,
            0x86 => KeyValueStatus::TemporaryFailure,
            0x87 => KeyValueStatus::XattrInvalid,
            0x88 => KeyValueStatus::UnknownCollection,
            0x8c => KeyValueStatus::UnknownScope,
            0xa0 => KeyValueStatus::DurabilityInvalidLevel,
            0xa1 => KeyValueStatus::DurabilityImpossible,
            0xa2 => KeyValueStatus::SyncWriteInProgress,
            0xa3 => KeyValueStatus::SyncWriteAmbiguous,
            0xa4 => KeyValueStatus::SyncWriteReCommitInProgress,
            other => KeyValueStatus::Unknown(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            KeyValueStatus::Success => 0x00,
            KeyValueStatus::NotFound => 0x01,
            KeyValueStatus::Exists => 0x02,
            KeyValueStatus::TooBig => 0x03,
            KeyValueStatus::Invalid => 0x04,
            KeyValueStatus::NotStored => 0x05,
            KeyValueStatus::DeltaBadValue => 0x06,
            KeyValueStatus::NotMyVbucket => 0x07,
            KeyValueStatus::NoBucket => 0x08,
            KeyValueStatus::Locked => 0x09,
            KeyValueStatus::AuthStale => 0x1f,
            KeyValueStatus::AuthError => 0x20,
            KeyValueStatus::AuthContinue => 0x21,
            KeyValueStatus::RangeError => 0x22,
            KeyValueStatus::Rollback => 0x23,
            KeyValueStatus::NoAccess => 0x24,
            KeyValueStatus::NotInitialized => 0x25,
            KeyValueStatus::UnknownFrameInfo => 0x80,
            KeyValueStatus::UnknownCommand => 0x81,
            KeyValueStatus::NoMemory => 0x82,
            KeyValueStatus::NotSupported => 0x83,
            KeyValueStatus::Internal => 0x84,
            KeyValueStatus::Busy => 0x85,
            KeyValueStatus::TemporaryFailure => 0x86,
            KeyValueStatus::XattrInvalid => 0x87,
            KeyValueStatus::UnknownCollection => 0x88,
            KeyValueStatus::UnknownScope => 0x8c,
            KeyValueStatus::DurabilityInvalidLevel => 0xa0,
            KeyValueStatus::DurabilityImpossible => 0xa1,
            KeyValueStatus::SyncWriteInProgress => 0xa2,
            KeyValueStatus::SyncWriteAmbiguous => 0xa3,
            KeyValueStatus::SyncWriteReCommitInProgress => 0xa4,
            KeyValueStatus::Unknown(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == KeyValueStatus::Success
    }

    /// Terminal error for this status; `None` for success
    pub fn error_kind(self) -> Option<ErrorKind> {
        let kind = match self {
            KeyValueStatus::Success => return None,
            KeyValueStatus::NotFound => ErrorKind::DocumentNotFound,
            KeyValueStatus::Exists => ErrorKind::DocumentExists,
            KeyValueStatus::TooBig => ErrorKind::ValueTooLarge,
            KeyValueStatus::Invalid
            | KeyValueStatus::DeltaBadValue
            | KeyValueStatus::XattrInvalid
            | KeyValueStatus::RangeError
            | KeyValueStatus::DurabilityInvalidLevel => ErrorKind::InvalidArgument,
            KeyValueStatus::NotMyVbucket | KeyValueStatus::NoBucket => {
                ErrorKind::ServiceNotAvailable
            }
            KeyValueStatus::Locked => ErrorKind::DocumentLocked,
            KeyValueStatus::AuthStale
            | KeyValueStatus::AuthError
            | KeyValueStatus::AuthContinue
            | KeyValueStatus::NoAccess => ErrorKind::AuthenticationFailure,
            KeyValueStatus::NotStored
            | KeyValueStatus::Rollback
            | KeyValueStatus::Internal => ErrorKind::InternalServerFailure,
            KeyValueStatus::NotInitialized
            | KeyValueStatus::NoMemory
            | KeyValueStatus::Busy
            | KeyValueStatus::TemporaryFailure => ErrorKind::TemporaryFailure,
            KeyValueStatus::UnknownFrameInfo
            | KeyValueStatus::UnknownCommand
            | KeyValueStatus::NotSupported => ErrorKind::UnsupportedOperation,
            KeyValueStatus::UnknownCollection | KeyValueStatus::UnknownScope => {
                ErrorKind::CollectionNotFound
            }
            KeyValueStatus::DurabilityImpossible => ErrorKind::DurabilityImpossible,
            KeyValueStatus::SyncWriteInProgress | KeyValueStatus::SyncWriteReCommitInProgress => {
                ErrorKind::DurableWriteInProgress
            }
            KeyValueStatus::SyncWriteAmbiguous => ErrorKind::AmbiguousTimeout,
            KeyValueStatus::Unknown(_) => ErrorKind::ProtocolError,
        };
        Some(kind)
    }

    /// Reason handed to the retry engine when this status fails an attempt
    pub fn retry_reason(self) -> RetryReason {
        match self {
            KeyValueStatus::NotMyVbucket => RetryReason::KvNotMyVbucket,
            KeyValueStatus::Locked => RetryReason::KvLocked,
            KeyValueStatus::TemporaryFailure | KeyValueStatus::Busy | KeyValueStatus::NoMemory => {
                RetryReason::KvTemporaryFailure
            }
            KeyValueStatus::SyncWriteInProgress => RetryReason::KvSyncWriteInProgress,
            KeyValueStatus::SyncWriteReCommitInProgress => {
                RetryReason::KvSyncWriteReCommitInProgress
            }
            KeyValueStatus::UnknownCollection => RetryReason::KvCollectionOutdated,
            _ => RetryReason::DoNotRetry,
        }
    }

    /// Default interpretation used by operations without special handling
    pub fn outcome(self) -> StatusOutcome {
        match self.error_kind() {
            None => StatusOutcome::Success,
            Some(kind) => StatusOutcome::Failure {
                kind,
                reason: self.retry_reason(),
            },
        }
    }
}
