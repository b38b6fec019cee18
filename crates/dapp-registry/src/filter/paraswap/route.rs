//! Swap routes as one recursive shape
//!
//! `multiSwap` is a sequence of hops, `megaSwap` a split between several such
//! sequences. Both decode into `Route` so a single recursive walk checks
//! every adapter call whatever the nesting.
//!
//! Shares are in basis points of the amount entering the hop or split.

use crate::filter::abi::IAugustus;
use alloy_primitives::{Address, Bytes, U256};

/// 100% in basis points
pub const FULL_SHARE: u64 = 10_000;

/// One adapter call against one target exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub adapter: Address,
    pub target: Address,
    pub payload: Bytes,
    /// Share of the hop's input routed through this call
    pub percent: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Leaf(Leaf),
    /// Reach token `to` through any of `routes`
    Hop { to: Address, routes: Vec<Route> },
    /// Hops taken one after the other
    Sequence(Vec<Route>),
    /// Amount split between alternative sequences, each with its share
    Split(Vec<(U256, Route)>),
}

impl Route {
    /// Route of a `multiSwap`
    pub fn from_paths(paths: &[IAugustus::Path]) -> Self {
        Route::Sequence(paths.iter().map(Self::hop).collect())
    }

    /// Route of a `megaSwap`
    pub fn from_mega_paths(paths: &[IAugustus::MegaSwapPath]) -> Self {
        Route::Split(
            paths
                .iter()
                .map(|mega| (mega.fromAmountPercent, Self::from_paths(&mega.path)))
                .collect(),
        )
    }

    fn hop(path: &IAugustus::Path) -> Self {
        Route::Hop {
            to: path.to,
            routes: path
                .routes
                .iter()
                .map(|route| {
                    Route::Leaf(Leaf {
                        adapter: route.exchange,
                        target: route.targetExchange,
                        payload: route.payload.clone(),
                        percent: route.percent,
                    })
                })
                .collect(),
        }
    }

    /// Whether every leaf passes `check`.
    ///
    /// A hop, sequence or split with nothing in it fails.
    pub fn all_leaves<F>(&self, check: &F) -> bool
    where
        F: Fn(&Leaf) -> bool,
    {
        match self {
            Route::Leaf(leaf) => check(leaf),
            Route::Hop { routes, .. } | Route::Sequence(routes) => {
                !routes.is_empty() && routes.iter().all(|route| route.all_leaves(check))
            }
            Route::Split(branches) => {
                !branches.is_empty() && branches.iter().all(|(_, route)| route.all_leaves(check))
            }
        }
    }

    /// Every share is non-zero and the shares of a hop or split add up to at
    /// most 100%.
    pub fn shares_ok(&self) -> bool {
        match self {
            Route::Leaf(leaf) => share_ok(leaf.percent),
            Route::Hop { routes, .. } => {
                let shares = routes.iter().map(|route| match route {
                    Route::Leaf(leaf) => leaf.percent,
                    _ => U256::ZERO,
                });
                total_ok(shares) && routes.iter().all(Route::shares_ok)
            }
            Route::Sequence(hops) => hops.iter().all(Route::shares_ok),
            Route::Split(branches) => {
                total_ok(branches.iter().map(|(percent, _)| *percent))
                    && branches
                        .iter()
                        .all(|(percent, route)| share_ok(*percent) && route.shares_ok())
            }
        }
    }

    /// Final token of every branch
    pub fn destinations(&self) -> Vec<Address> {
        let mut out = Vec::new();
        self.collect_destinations(&mut out);
        out
    }

    fn collect_destinations(&self, out: &mut Vec<Address>) {
        match self {
            Route::Leaf(_) => {}
            Route::Hop { to, .. } => out.push(*to),
            Route::Sequence(hops) => {
                if let Some(last) = hops.last() {
                    last.collect_destinations(out);
                }
            }
            Route::Split(branches) => {
                for (_, branch) in branches {
                    branch.collect_destinations(out);
                }
            }
        }
    }
}

fn share_ok(percent: U256) -> bool {
    !percent.is_zero() && percent <= U256::from(FULL_SHARE)
}

fn total_ok(mut shares: impl Iterator<Item = U256>) -> bool {
    shares
        .try_fold(U256::ZERO, |total, share| total.checked_add(share))
        .is_some_and(|total| total <= U256::from(FULL_SHARE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ADAPTER: Address = address!("0000000000000000000000000000000000000a01");
    const TARGET: Address = address!("0000000000000000000000000000000000000b01");
    const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

    fn path(to: Address, adapters: &[Address]) -> IAugustus::Path {
        let percent = U256::from(FULL_SHARE / adapters.len().max(1) as u64);
        IAugustus::Path {
            to,
            totalNetworkFee: U256::ZERO,
            routes: adapters
                .iter()
                .map(|adapter| IAugustus::Route {
                    exchange: *adapter,
                    targetExchange: TARGET,
                    percent,
                    payload: Bytes::new(),
                    networkFee: U256::ZERO,
                })
                .collect(),
        }
    }

    #[test]
    fn test_multi_swap_shape() {
        let route = Route::from_paths(&[path(USDC, &[ADAPTER]), path(DAI, &[ADAPTER, ADAPTER])]);
        assert_eq!(route.destinations(), vec![DAI]);

        let seen = std::cell::Cell::new(0);
        assert!(route.all_leaves(&|leaf: &Leaf| {
            seen.set(seen.get() + 1);
            leaf.adapter == ADAPTER
        }));
        assert_eq!(seen.get(), 3);
        assert!(route.shares_ok());
    }

    #[test]
    fn test_mega_swap_shape() {
        let mega = [
            IAugustus::MegaSwapPath {
                fromAmountPercent: U256::from(5_000),
                path: vec![path(DAI, &[ADAPTER])],
            },
            IAugustus::MegaSwapPath {
                fromAmountPercent: U256::from(5_000),
                path: vec![path(USDC, &[ADAPTER]), path(DAI, &[TARGET])],
            },
        ];
        let route = Route::from_mega_paths(&mega);
        assert_eq!(route.destinations(), vec![DAI, DAI]);
        assert!(!route.all_leaves(&|leaf: &Leaf| leaf.adapter == ADAPTER));
        assert!(route.shares_ok());
    }

    #[test]
    fn test_shares() {
        let mut hop = path(DAI, &[ADAPTER, ADAPTER]);
        assert!(Route::from_paths(&[hop.clone()]).shares_ok());

        // 60% + 50%
        hop.routes[0].percent = U256::from(6_000);
        assert!(!Route::from_paths(&[hop.clone()]).shares_ok());

        hop.routes[0].percent = U256::ZERO;
        assert!(!Route::from_paths(&[hop.clone()]).shares_ok());

        hop.routes[0].percent = U256::MAX;
        assert!(!Route::from_paths(&[hop]).shares_ok());

        let split = |a: u64, b: u64| {
            Route::from_mega_paths(&[
                IAugustus::MegaSwapPath {
                    fromAmountPercent: U256::from(a),
                    path: vec![path(DAI, &[ADAPTER])],
                },
                IAugustus::MegaSwapPath {
                    fromAmountPercent: U256::from(b),
                    path: vec![path(DAI, &[ADAPTER])],
                },
            ])
        };
        assert!(split(3_000, 7_000).shares_ok());
        assert!(!split(5_000, 5_001).shares_ok());
        assert!(!split(0, 10_000).shares_ok());
    }

    #[test]
    fn test_empty_groups_fail() {
        assert!(!Route::from_paths(&[]).all_leaves(&|_: &Leaf| true));
        assert!(!Route::from_paths(&[path(DAI, &[])]).all_leaves(&|_: &Leaf| true));
        assert!(Route::from_paths(&[]).destinations().is_empty());
    }
}
