//! Authorisation evaluation
//!
//! Answers "may this wallet make this call without guardian approval?".
//! Walks the trust lists the wallet has enabled and stops at the first one
//! whose entry for the spender is live and whose filter accepts the call.
//! Everything else is a denial, never an error.

use crate::filter::{CallRequest, FilterSet};
use crate::registry::{ListId, TrustRegistry};
use alloy_primitives::Address;
use registry_core::Clock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of an authorisation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub authorised: bool,

    /// List that decided, if any list had a say
    pub list: Option<ListId>,

    pub reason: Reason,

    /// Human readable details
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Live entry without a filter: any call goes
    Unfiltered,
    /// The entry's filter accepted the call
    FilterAccepted,
    /// The wallet has no trust list enabled
    NoListEnabled,
    /// No enabled list has an entry for the spender
    NotRegistered,
    /// An entry exists but its timelock has not elapsed
    NotYetValid,
    /// The entry's filter rejected the call
    FilterRejected,
    /// The entry names a filter that is not loaded
    FilterUnavailable,
}

impl Reason {
    /// How much a denial says about the call; the most telling one is reported
    fn weight(self) -> u8 {
        match self {
            Reason::NoListEnabled => 0,
            Reason::NotRegistered => 1,
            Reason::NotYetValid => 2,
            Reason::FilterUnavailable => 3,
            Reason::FilterRejected => 4,
            Reason::Unfiltered | Reason::FilterAccepted => 5,
        }
    }
}

/// Read-only view over a registry and the filters its entries point at
pub struct AuthorizationEvaluator<'a, C: Clock> {
    registry: &'a TrustRegistry<C>,
    filters: &'a FilterSet,
}

impl<'a, C: Clock> AuthorizationEvaluator<'a, C> {
    pub fn new(registry: &'a TrustRegistry<C>, filters: &'a FilterSet) -> Self {
        Self { registry, filters }
    }

    /// Full decision for a call, with the reason
    pub fn evaluate(&self, request: &CallRequest<'_>) -> Decision {
        let lists = self.registry.enabled_lists(request.wallet);
        if lists.is_empty() {
            return deny(None, Reason::NoListEnabled, format!("wallet {} has no trust list enabled", request.wallet));
        }

        let now = self.registry.now();
        let mut denial = deny(
            None,
            Reason::NotRegistered,
            format!("{} is not registered in any enabled list", request.spender),
        );

        for list in lists {
            let decision = self.evaluate_list(list, request, now);
            if decision.authorised {
                return decision;
            }
            if decision.reason.weight() > denial.reason.weight() {
                denial = decision;
            }
        }

        debug!(
            wallet = %request.wallet,
            spender = %request.spender,
            to = %request.to,
            reason = ?denial.reason,
            "call not authorised"
        );
        denial
    }

    fn evaluate_list(&self, list: ListId, request: &CallRequest<'_>, now: u64) -> Decision {
        let Some(entry) = self
            .registry
            .list(list)
            .and_then(|l| l.dapps.get(&request.spender))
        else {
            return deny(Some(list), Reason::NotRegistered, format!("not registered in list {}", list));
        };
        if !entry.is_live(now) {
            return deny(
                Some(list),
                Reason::NotYetValid,
                format!("valid after {}, now {}", entry.valid_after, now),
            );
        }

        let Some(filter_address) = entry.filter() else {
            return allow(list, Reason::Unfiltered, "registered without a filter");
        };

        match self.filters.get(filter_address) {
            Some(filter) if filter.is_valid(request) => {
                allow(list, Reason::FilterAccepted, format!("accepted by {}", filter.name()))
            }
            Some(filter) => deny(
                Some(list),
                Reason::FilterRejected,
                format!("rejected by {}", filter.name()),
            ),
            None => {
                warn!(list, filter = %filter_address, "no implementation loaded for filter");
                deny(
                    Some(list),
                    Reason::FilterUnavailable,
                    format!("filter {} is not loaded", filter_address),
                )
            }
        }
    }

    /// `evaluate` reduced to yes or no
    pub fn is_authorised(&self, wallet: Address, spender: Address, to: Address, data: &[u8]) -> bool {
        let request = CallRequest {
            wallet,
            spender,
            to,
            data,
        };
        self.evaluate(&request).authorised
    }
}

fn allow(list: ListId, reason: Reason, details: impl Into<String>) -> Decision {
    Decision {
        authorised: true,
        list: Some(list),
        reason,
        details: details.into(),
    }
}

fn deny(list: Option<ListId>, reason: Reason, details: impl Into<String>) -> Decision {
    Decision {
        authorised: false,
        list,
        reason,
        details: details.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::abi::{ICurvePool, IDaiJoin, IERC20};
    use crate::filter::{CurveFilter, DaiJoinFilter};
    use crate::registry::ROOT_LIST;
    use alloy_primitives::{address, U256};
    use alloy_sol_types::SolCall;
    use registry_core::ManualClock;
    use std::sync::Arc;

    const OWNER: Address = address!("1000000000000000000000000000000000000001");
    const WALLET: Address = address!("a11ce00000000000000000000000000000000001");
    const OTHER: Address = address!("b0b0000000000000000000000000000000000002");
    const POOL: Address = address!("bebc44782c7db0a1a60cb6fe97d0b483032ff1c7");
    const COLLECTOR: Address = address!("c011ec7000000000000000000000000000000c01");
    const DAI_JOIN: Address = address!("9759a6ac90977b93b58547b4a71c78317f391a28");
    const TOKEN: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");

    const CURVE_FILTER: Address = address!("f000000000000000000000000000000000000001");
    const JOIN_FILTER: Address = address!("f000000000000000000000000000000000000002");
    const MISSING_FILTER: Address = address!("f0000000000000000000000000000000000000ff");

    const PERIOD: u64 = 10;

    fn setup() -> (TrustRegistry<Arc<ManualClock>>, Arc<ManualClock>, FilterSet) {
        let clock = Arc::new(ManualClock::new(0));
        let registry = TrustRegistry::new(OWNER, PERIOD, clock.clone());
        let filters = FilterSet::new()
            .with(CURVE_FILTER, CurveFilter)
            .with(JOIN_FILTER, DaiJoinFilter);
        (registry, clock, filters)
    }

    fn exchange() -> Vec<u8> {
        ICurvePool::exchangeCall {
            i: 1,
            j: 0,
            dx: U256::from(99),
            min_dy: U256::from(1),
        }
        .abi_encode()
    }

    #[test]
    fn test_timelock_gates_authorisation() {
        let (mut registry, clock, filters) = setup();
        registry.add_dapp(OWNER, ROOT_LIST, POOL, CURVE_FILTER).unwrap();

        let data = exchange();
        {
            let evaluator = AuthorizationEvaluator::new(&registry, &filters);
            let decision = evaluator.evaluate(&CallRequest::direct(WALLET, POOL, &data));
            assert!(!decision.authorised);
            assert_eq!(decision.reason, Reason::NotYetValid);
        }

        clock.advance(PERIOD);
        let evaluator = AuthorizationEvaluator::new(&registry, &filters);
        let decision = evaluator.evaluate(&CallRequest::direct(WALLET, POOL, &data));
        assert!(decision.authorised);
        assert_eq!(decision.list, Some(ROOT_LIST));
        assert_eq!(decision.reason, Reason::FilterAccepted);

        // Bare value transfer to the pool
        assert!(!evaluator.is_authorised(WALLET, POOL, POOL, &[]));
    }

    #[test]
    fn test_unfiltered_entry_allows_anything() {
        let (mut registry, clock, filters) = setup();
        registry.add_dapp(OWNER, ROOT_LIST, COLLECTOR, Address::ZERO).unwrap();
        clock.advance(PERIOD);

        let evaluator = AuthorizationEvaluator::new(&registry, &filters);
        assert!(evaluator.is_authorised(WALLET, COLLECTOR, COLLECTOR, &[]));
        assert!(evaluator.is_authorised(WALLET, COLLECTOR, COLLECTOR, &[1, 2, 3]));
        assert_eq!(
            evaluator
                .evaluate(&CallRequest::direct(WALLET, COLLECTOR, &[]))
                .reason,
            Reason::Unfiltered
        );
    }

    #[test]
    fn test_recipient_locked_filter() {
        let (mut registry, clock, filters) = setup();
        registry.add_dapp(OWNER, ROOT_LIST, DAI_JOIN, JOIN_FILTER).unwrap();
        clock.advance(PERIOD);

        let join = |usr| IDaiJoin::joinCall { usr, wad: U256::from(5) }.abi_encode();
        let evaluator = AuthorizationEvaluator::new(&registry, &filters);
        assert!(evaluator.is_authorised(WALLET, DAI_JOIN, DAI_JOIN, &join(WALLET)));

        let decision = evaluator.evaluate(&CallRequest::direct(WALLET, DAI_JOIN, &join(OTHER)));
        assert!(!decision.authorised);
        assert_eq!(decision.reason, Reason::FilterRejected);
    }

    #[test]
    fn test_approvals_are_looked_up_by_spender() {
        let (mut registry, clock, filters) = setup();
        registry.add_dapp(OWNER, ROOT_LIST, POOL, CURVE_FILTER).unwrap();
        clock.advance(PERIOD);

        let data = IERC20::approveCall {
            spender: POOL,
            amount: U256::from(100),
        }
        .abi_encode();
        let evaluator = AuthorizationEvaluator::new(&registry, &filters);
        assert!(evaluator.is_authorised(WALLET, POOL, TOKEN, &data));
        // The token itself is not registered
        assert!(!evaluator.is_authorised(WALLET, TOKEN, TOKEN, &data));
    }

    #[test]
    fn test_opt_in() {
        let (mut registry, clock, filters) = setup();
        registry.create_registry(OWNER, 1, OTHER).unwrap();
        registry.add_dapp(OTHER, 1, POOL, CURVE_FILTER).unwrap();
        clock.advance(PERIOD);

        let data = exchange();
        {
            let evaluator = AuthorizationEvaluator::new(&registry, &filters);
            assert!(!evaluator.is_authorised(WALLET, POOL, POOL, &data));
        }

        registry.toggle_trust_list(WALLET, WALLET, 1, true).unwrap();
        {
            let evaluator = AuthorizationEvaluator::new(&registry, &filters);
            let decision = evaluator.evaluate(&CallRequest::direct(WALLET, POOL, &data));
            assert!(decision.authorised);
            assert_eq!(decision.list, Some(1));
        }

        registry.toggle_trust_list(WALLET, WALLET, ROOT_LIST, false).unwrap();
        registry.toggle_trust_list(WALLET, WALLET, 1, false).unwrap();
        let evaluator = AuthorizationEvaluator::new(&registry, &filters);
        let decision = evaluator.evaluate(&CallRequest::direct(WALLET, POOL, &data));
        assert_eq!(decision.reason, Reason::NoListEnabled);
    }

    #[test]
    fn test_missing_filter_denies() {
        let (mut registry, clock, filters) = setup();
        registry.add_dapp(OWNER, ROOT_LIST, POOL, MISSING_FILTER).unwrap();
        clock.advance(PERIOD);

        let evaluator = AuthorizationEvaluator::new(&registry, &filters);
        let decision = evaluator.evaluate(&CallRequest::direct(WALLET, POOL, &exchange()));
        assert!(!decision.authorised);
        assert_eq!(decision.reason, Reason::FilterUnavailable);
    }

    #[test]
    fn test_removal_is_immediate() {
        let (mut registry, clock, filters) = setup();
        registry.add_dapp(OWNER, ROOT_LIST, POOL, CURVE_FILTER).unwrap();
        clock.advance(PERIOD);
        registry.remove_dapp(OWNER, ROOT_LIST, POOL).unwrap();

        let evaluator = AuthorizationEvaluator::new(&registry, &filters);
        let decision = evaluator.evaluate(&CallRequest::direct(WALLET, POOL, &exchange()));
        assert_eq!(decision.reason, Reason::NotRegistered);
    }
}
