//! Calldata filters
//!
//! A filter is bound to a dapp entry by address. When a wallet wants to call
//! a dapp, the filter gets the call and answers yes or no. Filters never
//! error: anything they cannot parse is a no.
//!
//! Two shapes of call reach a filter:
//!
//! - a direct call: `spender == to`, the wallet calls the dapp itself
//! - an approval: `spender != to`, the wallet calls `approve(spender, ..)`
//!   on a token `to` so that the dapp may pull funds
//!
//! Filters that accept approvals use [`approve::is_approval_for`] to check
//! the second shape.

pub mod aave;
pub mod abi;
pub mod approve;
pub mod argent;
pub mod balancer;
pub mod calldata;
pub mod compound;
pub mod curve;
pub mod gro;
pub mod lido;
pub mod maker;
pub mod paraswap;
pub mod uniswap;
pub mod weth;
pub mod yearn;
pub mod zksync;

pub use aave::{AaveV1ATokenFilter, AaveV1LendingPoolFilter, AaveV2Filter};
pub use approve::OnlyApproveFilter;
pub use argent::ArgentEnsManagerFilter;
pub use balancer::BalancerFilter;
pub use compound::CompoundFilter;
pub use curve::CurveFilter;
pub use gro::{GroDepositFilter, GroWithdrawFilter};
pub use lido::LidoFilter;
pub use maker::{DaiJoinFilter, PotFilter, VatFilter};
pub use paraswap::ParaswapFilter;
pub use uniswap::{UniswapV2RouterFilter, UniswapV2UniZapFilter};
pub use weth::WethFilter;
pub use yearn::{YearnFilter, YearnV2Filter};
pub use zksync::ZkSyncFilter;

use alloy_primitives::Address;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A call a wallet wants to make
#[derive(Debug, Clone, Copy)]
pub struct CallRequest<'a> {
    /// The wallet making the call
    pub wallet: Address,
    /// The registered dapp
    pub spender: Address,
    /// The contract actually called
    pub to: Address,
    /// Calldata
    pub data: &'a [u8],
}

impl<'a> CallRequest<'a> {
    /// A direct call to `dapp`
    pub fn direct(wallet: Address, dapp: Address, data: &'a [u8]) -> Self {
        Self {
            wallet,
            spender: dapp,
            to: dapp,
            data,
        }
    }

    /// A call on `token` granting `dapp` an allowance
    pub fn approval(wallet: Address, dapp: Address, token: Address, data: &'a [u8]) -> Self {
        Self {
            wallet,
            spender: dapp,
            to: token,
            data,
        }
    }

    pub fn is_approval(&self) -> bool {
        self.spender != self.to
    }
}

/// Decides whether a call to a dapp may go through
pub trait Filter: Send + Sync {
    /// Short name for logs and status output
    fn name(&self) -> &'static str;

    fn is_valid(&self, request: &CallRequest<'_>) -> bool;
}

/// Filter implementations, keyed by the address dapp entries refer to
#[derive(Default, Clone)]
pub struct FilterSet {
    filters: HashMap<Address, Arc<dyn Filter>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address, filter: Arc<dyn Filter>) {
        self.filters.insert(address, filter);
    }

    pub fn with(mut self, address: Address, filter: impl Filter + 'static) -> Self {
        self.insert(address, Arc::new(filter));
        self
    }

    pub fn get(&self, address: Address) -> Option<&Arc<dyn Filter>> {
        self.filters.get(&address)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Arc<dyn Filter>)> {
        self.filters.iter()
    }
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.filters.iter().map(|(addr, filter)| (addr, filter.name())))
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_call_shapes() {
        let direct = CallRequest::direct(WALLET, DAPP, &[]);
        assert!(!direct.is_approval());
        assert_eq!(direct.to, DAPP);

        let approval = CallRequest::approval(WALLET, DAPP, TOKEN, &[]);
        assert!(approval.is_approval());
        assert_eq!(approval.spender, DAPP);
    }

    #[test]
    fn test_filter_set_lookup() {
        let set = FilterSet::new().with(DAPP, OnlyApproveFilter);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(DAPP).map(|f| f.name()), Some("only_approve"));
        assert!(set.get(TOKEN).is_none());
    }
}
