//! Registry error taxonomy
//!
//! A rejected mutation changes nothing. A negative authorisation answer is not
//! an error at all and never shows up here.

use crate::registry::ListId;
use alloy_primitives::Address;
use registry_core::Timestamp;
use thiserror::Error;

/// Errors returned by registry mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("sender {caller} is not the owner of trust list {list}")]
    NotListOwner { list: ListId, caller: Address },

    #[error("sender {caller} is not the owner of the root trust list")]
    NotRootOwner { caller: Address },

    #[error("trust list {0} already exists")]
    DuplicateList(ListId),

    #[error("owner must not be the zero address")]
    NullOwner,

    #[error("sender {caller} cannot toggle trust lists for wallet {wallet}")]
    NotWallet { wallet: Address, caller: Address },

    #[error("too early: confirmable after {confirmable_after}, now {now}")]
    TooEarly {
        confirmable_after: Timestamp,
        now: Timestamp,
    },

    #[error("dapp {dapp} is not registered in trust list {list}")]
    UnknownDapp { list: ListId, dapp: Address },

    #[error("dapp {dapp} is already registered in trust list {list}")]
    AlreadyRegistered { list: ListId, dapp: Address },

    #[error("no pending update")]
    NoPendingUpdate,
}

/// Coarse classification of a `RegistryError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller is not allowed to do this. Never retried.
    Governance,
    /// The timelock has not elapsed yet. Retry later.
    Timing,
    /// The operation does not apply to the current state.
    State,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::NotListOwner { .. }
            | RegistryError::NotRootOwner { .. }
            | RegistryError::DuplicateList(_)
            | RegistryError::NullOwner
            | RegistryError::NotWallet { .. } => ErrorKind::Governance,
            RegistryError::TooEarly { .. } => ErrorKind::Timing,
            RegistryError::UnknownDapp { .. }
            | RegistryError::AlreadyRegistered { .. }
            | RegistryError::NoPendingUpdate => ErrorKind::State,
        }
    }

    /// Whether retrying the same call later can succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Timing
    }
}
