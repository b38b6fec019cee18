//! Submitting owner-gated calls
//!
//! List owners are often multi-party accounts, so mutations are described as
//! data first ([`RegistryCall`]) and handed to a [`Relay`] that gets them
//! signed and executed. [`LocalRelay`] executes directly against an
//! in-process registry as a single signer.

use crate::events::EventRecord;
use crate::registry::{ListId, TrustRegistry};
use alloy_primitives::Address;
use anyhow::Result;
use registry_core::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A registry mutation, as submitted for execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RegistryCall {
    CreateRegistry { list: ListId, owner: Address },
    ChangeOwner { list: ListId, new_owner: Address },
    RequestTimelockChange { period: u64 },
    ConfirmTimelockChange,
    AddDapp { list: ListId, dapp: Address, filter: Address },
    RemoveDapp { list: ListId, dapp: Address },
    RequestFilterUpdate { list: ListId, dapp: Address, filter: Address },
    ConfirmFilterUpdate { list: ListId, dapp: Address },
    ToggleTrustList { wallet: Address, list: ListId, enabled: bool },
}

impl RegistryCall {
    pub fn method(&self) -> &'static str {
        match self {
            RegistryCall::CreateRegistry { .. } => "createRegistry",
            RegistryCall::ChangeOwner { .. } => "changeOwner",
            RegistryCall::RequestTimelockChange { .. } => "requestTimelockChange",
            RegistryCall::ConfirmTimelockChange => "confirmTimelockChange",
            RegistryCall::AddDapp { .. } => "addDapp",
            RegistryCall::RemoveDapp { .. } => "removeDapp",
            RegistryCall::RequestFilterUpdate { .. } => "requestFilterUpdate",
            RegistryCall::ConfirmFilterUpdate { .. } => "confirmFilterUpdate",
            RegistryCall::ToggleTrustList { .. } => "toggleTrustList",
        }
    }
}

/// Receipt for an executed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
    /// Position of the call among those this relay executed
    pub sequence: u64,

    pub signer: Address,

    pub call: RegistryCall,

    /// Events the call emitted
    pub events: Vec<EventRecord>,
}

/// Something that can get a registry call executed
pub trait Relay {
    fn execute(&mut self, call: RegistryCall) -> Result<TransactionHandle>;
}

/// Executes calls directly on a registry, signed by one fixed account
pub struct LocalRelay<'a, C: Clock> {
    registry: &'a mut TrustRegistry<C>,
    signer: Address,
    sequence: u64,
}

impl<'a, C: Clock> LocalRelay<'a, C> {
    pub fn new(registry: &'a mut TrustRegistry<C>, signer: Address) -> Self {
        Self {
            registry,
            signer,
            sequence: 0,
        }
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    fn apply(&mut self, call: &RegistryCall) -> Result<()> {
        let signer = self.signer;
        let registry = &mut *self.registry;
        match *call {
            RegistryCall::CreateRegistry { list, owner } => {
                registry.create_registry(signer, list, owner)?;
            }
            RegistryCall::ChangeOwner { list, new_owner } => {
                registry.change_owner(signer, list, new_owner)?;
            }
            RegistryCall::RequestTimelockChange { period } => {
                registry.request_timelock_change(signer, period)?;
            }
            RegistryCall::ConfirmTimelockChange => {
                registry.confirm_timelock_change()?;
            }
            RegistryCall::AddDapp { list, dapp, filter } => {
                registry.add_dapp(signer, list, dapp, filter)?;
            }
            RegistryCall::RemoveDapp { list, dapp } => {
                registry.remove_dapp(signer, list, dapp)?;
            }
            RegistryCall::RequestFilterUpdate { list, dapp, filter } => {
                registry.request_filter_update(signer, list, dapp, filter)?;
            }
            RegistryCall::ConfirmFilterUpdate { list, dapp } => {
                registry.confirm_filter_update(list, dapp)?;
            }
            RegistryCall::ToggleTrustList {
                wallet,
                list,
                enabled,
            } => {
                registry.toggle_trust_list(signer, wallet, list, enabled)?;
            }
        }
        Ok(())
    }
}

impl<C: Clock> Relay for LocalRelay<'_, C> {
    fn execute(&mut self, call: RegistryCall) -> Result<TransactionHandle> {
        let before = self.registry.events().len();
        self.apply(&call)?;
        self.sequence += 1;

        let events = self.registry.events()[before..].to_vec();
        info!(
            sequence = self.sequence,
            signer = %self.signer,
            method = call.method(),
            "call executed"
        );
        Ok(TransactionHandle {
            sequence: self.sequence,
            signer: self.signer,
            call,
            events,
        })
    }
}
