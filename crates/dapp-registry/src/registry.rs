//! Trust lists and their owners
//!
//! A trust list maps dapp addresses to an authorisation: the filter that
//! vets calldata sent to that dapp and the time from which the entry counts.
//! List 0 is the root list. It exists from construction, its owner is the
//! only one who may create further lists or change the timelock, and it is
//! enabled for every wallet unless the wallet opts out.
//!
//! Every mutation either fails with a `RegistryError` and changes nothing,
//! or commits and records exactly one `RegistryEvent`.

use crate::error::RegistryError;
use crate::events::{EventRecord, RegistryEvent};
use crate::timelock::{Pending, Timelock};
use alloy_primitives::Address;
use registry_core::{Clock, SystemClock, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Trust list identifier
pub type ListId = u8;

/// The root trust list
pub const ROOT_LIST: ListId = 0;

/// A dapp entry in a trust list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorisation {
    /// Filter contract vetting calls to the dapp. Zero accepts any call.
    pub filter: Address,

    /// The entry counts from this time on
    pub valid_after: Timestamp,
}

impl Authorisation {
    /// What `get_authorisation` answers for an unknown dapp
    pub const NONE: Authorisation = Authorisation {
        filter: Address::ZERO,
        valid_after: 0,
    };

    /// Whether the entry is in force at `now`
    pub fn is_live(&self, now: Timestamp) -> bool {
        now >= self.valid_after
    }

    /// The filter, if any calldata check applies
    pub fn filter(&self) -> Option<Address> {
        (!self.filter.is_zero()).then_some(self.filter)
    }
}

/// One trust list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustList {
    pub owner: Address,

    #[serde(default)]
    pub dapps: BTreeMap<Address, Authorisation>,

    /// Filter updates waiting for the timelock, keyed by dapp
    #[serde(default)]
    pub pending: BTreeMap<Address, Pending<Address>>,
}

impl TrustList {
    fn new(owner: Address) -> Self {
        Self {
            owner,
            dapps: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }
}

/// Everything the registry persists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    pub lists: BTreeMap<ListId, TrustList>,

    pub timelock: Timelock,

    /// Explicit per-wallet opt-ins and opt-outs
    #[serde(default)]
    pub opt_ins: BTreeMap<Address, BTreeMap<ListId, bool>>,
}

impl RegistryState {
    /// Fresh state: the root list owned by `root_owner`
    pub fn new(root_owner: Address, timelock_period: u64) -> Self {
        let mut lists = BTreeMap::new();
        lists.insert(ROOT_LIST, TrustList::new(root_owner));
        Self {
            lists,
            timelock: Timelock::new(timelock_period),
            opt_ins: BTreeMap::new(),
        }
    }
}

/// The dapp registry
pub struct TrustRegistry<C: Clock = SystemClock> {
    state: RegistryState,
    clock: C,
    journal: Vec<EventRecord>,
}

impl<C: Clock> TrustRegistry<C> {
    /// Deploy a new registry. The deployer owns the root list.
    pub fn new(root_owner: Address, timelock_period: u64, clock: C) -> Self {
        let mut registry = Self {
            state: RegistryState::new(root_owner, timelock_period),
            clock,
            journal: Vec::new(),
        };
        registry.record(RegistryEvent::RegistryCreated {
            list: ROOT_LIST,
            owner: root_owner,
        });
        registry.record(RegistryEvent::TimelockChanged {
            previous_period: 0,
            new_period: timelock_period,
        });
        info!(owner = %root_owner, timelock_period, "registry deployed");
        registry
    }

    /// Resume from persisted state
    pub fn from_state(state: RegistryState, clock: C) -> Self {
        Self {
            state,
            clock,
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    pub fn into_state(self) -> RegistryState {
        self.state
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn timelock(&self) -> &Timelock {
        &self.state.timelock
    }

    pub fn owner_of(&self, list: ListId) -> Option<Address> {
        self.state.lists.get(&list).map(|l| l.owner)
    }

    pub fn root_owner(&self) -> Address {
        self.owner_of(ROOT_LIST).unwrap_or(Address::ZERO)
    }

    pub fn list(&self, list: ListId) -> Option<&TrustList> {
        self.state.lists.get(&list)
    }

    pub fn lists(&self) -> impl Iterator<Item = (ListId, &TrustList)> {
        self.state.lists.iter().map(|(id, list)| (*id, list))
    }

    /// Events recorded since the last `take_events`
    pub fn events(&self) -> &[EventRecord] {
        &self.journal
    }

    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.journal)
    }

    fn record(&mut self, event: RegistryEvent) {
        let at = self.clock.now();
        debug!(event = event.kind(), at, "recording event");
        self.journal.push(EventRecord::new(at, event));
    }

    fn require_root_owner(&self, caller: Address) -> Result<(), RegistryError> {
        if self.owner_of(ROOT_LIST) == Some(caller) {
            Ok(())
        } else {
            Err(RegistryError::NotRootOwner { caller })
        }
    }

    fn owned_list_mut(
        &mut self,
        caller: Address,
        list: ListId,
    ) -> Result<&mut TrustList, RegistryError> {
        match self.state.lists.get_mut(&list) {
            Some(trust_list) if trust_list.owner == caller => Ok(trust_list),
            _ => Err(RegistryError::NotListOwner { list, caller }),
        }
    }

    // ---- governance ----

    /// Create trust list `list` owned by `owner`. Root owner only.
    pub fn create_registry(
        &mut self,
        caller: Address,
        list: ListId,
        owner: Address,
    ) -> Result<(), RegistryError> {
        self.require_root_owner(caller)?;
        if owner.is_zero() {
            return Err(RegistryError::NullOwner);
        }
        if self.state.lists.contains_key(&list) {
            return Err(RegistryError::DuplicateList(list));
        }

        self.state.lists.insert(list, TrustList::new(owner));
        info!(list, owner = %owner, "trust list created");
        self.record(RegistryEvent::RegistryCreated { list, owner });
        Ok(())
    }

    /// Hand a list over to `new_owner`. Current list owner only.
    pub fn change_owner(
        &mut self,
        caller: Address,
        list: ListId,
        new_owner: Address,
    ) -> Result<(), RegistryError> {
        let trust_list = self.owned_list_mut(caller, list)?;
        if new_owner.is_zero() {
            return Err(RegistryError::NullOwner);
        }
        let previous_owner = std::mem::replace(&mut trust_list.owner, new_owner);

        info!(list, from = %previous_owner, to = %new_owner, "trust list owner changed");
        self.record(RegistryEvent::OwnerChanged {
            list,
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    /// Queue a new timelock period. Root owner only.
    ///
    /// Returns when it becomes confirmable.
    pub fn request_timelock_change(
        &mut self,
        caller: Address,
        new_period: u64,
    ) -> Result<Timestamp, RegistryError> {
        self.require_root_owner(caller)?;
        let now = self.clock.now();
        let current_period = self.state.timelock.period;
        let confirmable_after = self.state.timelock.request_change(new_period, now);

        info!(current_period, new_period, confirmable_after, "timelock change requested");
        self.record(RegistryEvent::TimelockChangeRequested {
            current_period,
            new_period,
            confirmable_after,
        });
        Ok(confirmable_after)
    }

    /// Commit the queued timelock period. Anyone may call this.
    pub fn confirm_timelock_change(&mut self) -> Result<u64, RegistryError> {
        let now = self.clock.now();
        let (previous_period, new_period) = self.state.timelock.confirm_change(now)?;

        info!(previous_period, new_period, "timelock changed");
        self.record(RegistryEvent::TimelockChanged {
            previous_period,
            new_period,
        });
        Ok(new_period)
    }

    // ---- dapps ----

    /// Register `dapp` in `list` behind `filter` (zero for no filter).
    ///
    /// The entry counts once the current timelock period has elapsed.
    /// Returns that time.
    pub fn add_dapp(
        &mut self,
        caller: Address,
        list: ListId,
        dapp: Address,
        filter: Address,
    ) -> Result<Timestamp, RegistryError> {
        let valid_after = self.state.timelock.deadline_from(self.clock.now());
        let trust_list = self.owned_list_mut(caller, list)?;
        if trust_list.dapps.contains_key(&dapp) {
            return Err(RegistryError::AlreadyRegistered { list, dapp });
        }
        trust_list.dapps.insert(
            dapp,
            Authorisation {
                filter,
                valid_after,
            },
        );

        info!(list, dapp = %dapp, filter = %filter, valid_after, "dapp added");
        self.record(RegistryEvent::DappAdded {
            list,
            dapp,
            filter,
            valid_after,
        });
        Ok(valid_after)
    }

    /// Drop `dapp` from `list` immediately, along with any queued filter update.
    pub fn remove_dapp(
        &mut self,
        caller: Address,
        list: ListId,
        dapp: Address,
    ) -> Result<(), RegistryError> {
        let trust_list = self.owned_list_mut(caller, list)?;
        let removed = trust_list
            .dapps
            .remove(&dapp)
            .ok_or(RegistryError::UnknownDapp { list, dapp })?;
        trust_list.pending.remove(&dapp);

        info!(list, dapp = %dapp, "dapp removed");
        self.record(RegistryEvent::DappRemoved {
            list,
            dapp,
            filter: removed.filter,
        });
        Ok(())
    }

    /// Queue a new filter for a registered dapp. List owner only.
    ///
    /// Replaces any update already queued for the dapp.
    pub fn request_filter_update(
        &mut self,
        caller: Address,
        list: ListId,
        dapp: Address,
        new_filter: Address,
    ) -> Result<Timestamp, RegistryError> {
        let now = self.clock.now();
        let period = self.state.timelock.period;
        let trust_list = self.owned_list_mut(caller, list)?;
        let current_filter = trust_list
            .dapps
            .get(&dapp)
            .map(|auth| auth.filter)
            .ok_or(RegistryError::UnknownDapp { list, dapp })?;
        let confirmable_after = trust_list
            .pending
            .entry(dapp)
            .or_default()
            .request(new_filter, now, period);

        info!(list, dapp = %dapp, filter = %new_filter, confirmable_after, "filter update requested");
        self.record(RegistryEvent::FilterUpdateRequested {
            list,
            dapp,
            current_filter,
            new_filter,
            confirmable_after,
        });
        Ok(confirmable_after)
    }

    /// Commit a queued filter update. Anyone may call this.
    ///
    /// The waiting period has already elapsed, so the new filter is valid
    /// from the time of confirmation.
    pub fn confirm_filter_update(&mut self, list: ListId, dapp: Address) -> Result<(), RegistryError> {
        let now = self.clock.now();
        let TrustList { dapps, pending, .. } = self
            .state
            .lists
            .get_mut(&list)
            .ok_or(RegistryError::NoPendingUpdate)?;
        let queued = pending
            .get_mut(&dapp)
            .ok_or(RegistryError::NoPendingUpdate)?;
        let auth = dapps
            .get_mut(&dapp)
            .ok_or(RegistryError::UnknownDapp { list, dapp })?;
        let new_filter = queued.confirm(now)?;
        pending.remove(&dapp);

        let previous_filter = std::mem::replace(&mut auth.filter, new_filter);
        auth.valid_after = now;

        info!(list, dapp = %dapp, from = %previous_filter, to = %new_filter, "filter updated");
        self.record(RegistryEvent::FilterUpdated {
            list,
            dapp,
            previous_filter,
            new_filter,
            valid_after: now,
        });
        Ok(())
    }

    /// The entry for `dapp` in `list`, or `Authorisation::NONE`
    pub fn get_authorisation(&self, list: ListId, dapp: Address) -> Authorisation {
        self.state
            .lists
            .get(&list)
            .and_then(|l| l.dapps.get(&dapp))
            .copied()
            .unwrap_or(Authorisation::NONE)
    }

    /// The queued filter update for `dapp` in `list`: `(filter, confirmable_after)`
    pub fn pending_filter_update(&self, list: ListId, dapp: Address) -> Option<(Address, Timestamp)> {
        let pending = self.state.lists.get(&list)?.pending.get(&dapp)?;
        Some((*pending.value()?, pending.confirmable_after()?))
    }

    // ---- wallet opt-in ----

    /// Enable or disable `list` for `wallet`. Only the wallet itself may do this.
    pub fn toggle_trust_list(
        &mut self,
        caller: Address,
        wallet: Address,
        list: ListId,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        if caller != wallet {
            return Err(RegistryError::NotWallet { wallet, caller });
        }
        self.state
            .opt_ins
            .entry(wallet)
            .or_default()
            .insert(list, enabled);

        info!(wallet = %wallet, list, enabled, "trust list toggled");
        self.record(RegistryEvent::TrustListToggled {
            wallet,
            list,
            enabled,
        });
        Ok(())
    }

    /// The root list is on unless turned off; every other list is off unless turned on.
    pub fn is_enabled(&self, wallet: Address, list: ListId) -> bool {
        self.state
            .opt_ins
            .get(&wallet)
            .and_then(|lists| lists.get(&list))
            .copied()
            .unwrap_or(list == ROOT_LIST)
    }

    /// Existing lists enabled for `wallet`, in id order
    pub fn enabled_lists(&self, wallet: Address) -> Vec<ListId> {
        self.state
            .lists
            .keys()
            .copied()
            .filter(|list| self.is_enabled(wallet, *list))
            .collect()
    }
}
