//! Dapp Registry - timelocked authorisation of wallet calls
//!
//! A smart-contract wallet may skip guardian approval for a call when a trust
//! list it has enabled registers the called dapp and the dapp's filter accepts
//! the calldata.
//!
//! - Owners add dapps to lists; an entry only counts after the timelock.
//! - Filter replacements go through the same request/confirm delay.
//! - Removal is immediate.
//! - Filters decode untrusted calldata and deny anything they do not recognise.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod filter;
pub mod registry;
pub mod relay;
pub mod store;
pub mod timelock;
pub mod tokens;

pub use config::{ConfigLoader, DeploymentConfig, FilterSpec, YamlConfigLoader};
pub use error::{ErrorKind, RegistryError};
pub use evaluator::{AuthorizationEvaluator, Decision, Reason};
pub use events::{EventLog, EventQuery, EventRecord, RegistryEvent, Snapshot};
pub use filter::{CallRequest, Filter, FilterSet};
pub use registry::{Authorisation, ListId, RegistryState, TrustRegistry, ROOT_LIST};
pub use relay::{LocalRelay, RegistryCall, Relay, TransactionHandle};
pub use store::StateStore;
pub use tokens::{SharedTokens, TokenRegistry, TradableTokens};
