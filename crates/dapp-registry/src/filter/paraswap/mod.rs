//! Paraswap aggregator (Augustus v4)
//!
//! The aggregator is a single dapp that will execute whatever route it is
//! given, so the filter has to look inside every route:
//!
//! - `multiSwap` / `megaSwap`: every adapter and target exchange named in the
//!   route must be whitelisted, and 0x adapter payloads must name known market
//!   makers
//! - `simpleSwap`: every raw sub-call is checked against the configured
//!   target exchanges (see [`simple_swap`])
//! - `swapOnUniswap` / `swapOnUniswapFork`: every pair on the path must be
//!   tradable, and the aggregator must still be using the Uniswap proxy we
//!   trust
//!
//! In all cases the proceeds must go to the wallet and the final token must be
//! ether or tradable.

pub mod route;
pub mod simple_swap;

use super::abi::{IAugustus, ZeroExV2Payload, ZeroExV4Payload};
use super::calldata::{decode, decode_value, selector};
use super::uniswap::{UniswapFactory, ETH_TOKEN};
use super::{CallRequest, Filter};
use crate::tokens::TradableTokens;
use alloy_primitives::Address;
use route::{Leaf, Route};
use serde::{Deserialize, Serialize};
use simple_swap::SwapContext;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a route adapter does with its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Payload is not inspected
    #[default]
    Generic,
    /// Payload is a batch of 0x v2 orders
    ZeroExV2,
    /// Payload is a 0x v4 RFQ order
    ZeroExV4,
}

/// Contract family of a target exchange, which fixes what may be called on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    UniswapV1,
    UniswapV2Router,
    UniswapV3Router,
    ZeroExV2,
    ZeroExV4,
    Curve,
    Weth,
    /// Reachable through route adapters only, never called directly
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetExchange {
    pub kind: ExchangeKind,

    /// Contract that pulls tokens on the exchange's behalf, if not the exchange itself
    #[serde(default)]
    pub proxy: Option<Address>,

    /// Token a single-token pool trades against ether (Uniswap v1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Address>,
}

/// Everything the filter needs to know about one aggregator deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParaswapConfig {
    /// The aggregator itself
    pub augustus: Address,

    pub weth: Address,

    /// Uniswap proxy the aggregator was using when this config was written
    pub uniswap_proxy: Address,

    /// Whether the aggregator still uses `uniswap_proxy`
    #[serde(default = "default_true")]
    pub uniswap_proxy_trusted: bool,

    /// Factory behind `swapOnUniswap`
    pub uniswap: UniswapFactory,

    /// Factories accepted by `swapOnUniswapFork`
    #[serde(default)]
    pub uniswap_forks: Vec<UniswapFactory>,

    #[serde(default)]
    pub adapters: BTreeMap<Address, AdapterKind>,

    #[serde(default)]
    pub target_exchanges: BTreeMap<Address, TargetExchange>,

    #[serde(default)]
    pub market_makers: BTreeSet<Address>,
}

fn default_true() -> bool {
    true
}

/// Read access to the live aggregator
pub trait AggregatorReader {
    /// The Uniswap proxy currently in use, `None` if it cannot be read
    fn uniswap_proxy(&self) -> Option<Address>;
}

/// An aggregator whose proxy is already known
#[derive(Debug, Clone, Copy)]
pub struct KnownProxy(pub Address);

impl AggregatorReader for KnownProxy {
    fn uniswap_proxy(&self) -> Option<Address> {
        Some(self.0)
    }
}

pub struct ParaswapFilter {
    config: ParaswapConfig,
    tokens: Arc<dyn TradableTokens>,
    proxy_trusted: AtomicBool,
}

impl ParaswapFilter {
    pub fn new(config: ParaswapConfig, tokens: Arc<dyn TradableTokens>) -> Self {
        let proxy_trusted = AtomicBool::new(config.uniswap_proxy_trusted);
        Self {
            config,
            tokens,
            proxy_trusted,
        }
    }

    pub fn config(&self) -> &ParaswapConfig {
        &self.config
    }

    pub fn is_proxy_trusted(&self) -> bool {
        self.proxy_trusted.load(Ordering::SeqCst)
    }

    /// Re-read the aggregator's Uniswap proxy and trust it only if it is
    /// still the configured one. Returns the new state.
    pub fn refresh_trusted_proxy(&self, reader: &dyn AggregatorReader) -> bool {
        let current = reader.uniswap_proxy();
        let trusted = current == Some(self.config.uniswap_proxy);
        let was = self.proxy_trusted.swap(trusted, Ordering::SeqCst);
        if was != trusted {
            match current {
                Some(proxy) => {
                    info!(proxy = %proxy, trusted, "aggregator uniswap proxy re-evaluated")
                }
                None => warn!("aggregator uniswap proxy unreadable, no longer trusted"),
            }
        }
        trusted
    }

    /// Proceeds must go back to the wallet (zero means the caller)
    fn beneficiary_ok(&self, beneficiary: Address, wallet: Address) -> bool {
        beneficiary.is_zero() || beneficiary == wallet
    }

    fn destination_ok(&self, token: Address) -> bool {
        token == ETH_TOKEN || self.tokens.is_tradable(token)
    }

    fn leaf_ok(&self, leaf: &Leaf) -> bool {
        let Some(kind) = self.config.adapters.get(&leaf.adapter) else {
            debug!(adapter = %leaf.adapter, "adapter not whitelisted");
            return false;
        };
        if !self.config.target_exchanges.contains_key(&leaf.target) {
            debug!(target = %leaf.target, "target exchange not whitelisted");
            return false;
        }
        match kind {
            AdapterKind::Generic => true,
            AdapterKind::ZeroExV2 => decode_value::<ZeroExV2Payload>(&leaf.payload)
                .is_some_and(|payload| {
                    !payload.orders.is_empty()
                        && payload
                            .orders
                            .iter()
                            .all(|order| self.config.market_makers.contains(&order.makerAddress))
                }),
            AdapterKind::ZeroExV4 => decode_value::<ZeroExV4Payload>(&leaf.payload)
                .is_some_and(|payload| self.config.market_makers.contains(&payload.order.maker)),
        }
    }

    fn route_ok(&self, route: &Route, beneficiary: Address, wallet: Address) -> bool {
        let destinations = route.destinations();
        self.beneficiary_ok(beneficiary, wallet)
            && !destinations.is_empty()
            && destinations.iter().all(|token| self.destination_ok(*token))
            && route.shares_ok()
            && route.all_leaves(&|leaf: &Leaf| self.leaf_ok(leaf))
    }

    fn simple_swap_ok(&self, call: &IAugustus::simpleSwapCall, wallet: Address) -> bool {
        if !self.beneficiary_ok(call.beneficiary, wallet) || !self.destination_ok(call.toToken) {
            return false;
        }
        let Some(sub_calls) = simple_swap::split(
            &call.callees,
            &call.exchangeData,
            &call.startIndexes,
            &call.values,
        ) else {
            debug!("simpleSwap framing rejected");
            return false;
        };
        let context = SwapContext::new(&self.config, call);
        !sub_calls.is_empty() && sub_calls.iter().all(|sub| context.check(sub))
    }

    fn uniswap_ok(&self, factory: &UniswapFactory, path: &[Address]) -> bool {
        if !self.is_proxy_trusted() {
            debug!("uniswap proxy not trusted");
            return false;
        }
        factory
            .pairs_along(path, self.config.weth)
            .is_some_and(|pairs| self.tokens.are_tradable(&pairs))
    }
}

impl Filter for ParaswapFilter {
    fn name(&self) -> &'static str {
        "paraswap"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return false;
        }
        let data = request.data;
        let wallet = request.wallet;

        if let Some(call) = decode::<IAugustus::multiSwapCall>(data) {
            let route = Route::from_paths(&call.data.path);
            return self.route_ok(&route, call.data.beneficiary, wallet);
        }
        if let Some(call) = decode::<IAugustus::megaSwapCall>(data) {
            let route = Route::from_mega_paths(&call.data.path);
            return self.route_ok(&route, call.data.beneficiary, wallet);
        }
        if let Some(call) = decode::<IAugustus::simpleSwapCall>(data) {
            return self.simple_swap_ok(&call, wallet);
        }
        if let Some(call) = decode::<IAugustus::swapOnUniswapCall>(data) {
            return self.uniswap_ok(&self.config.uniswap, &call.path);
        }
        if let Some(call) = decode::<IAugustus::swapOnUniswapForkCall>(data) {
            let fork = UniswapFactory::new(call.factory, call.initCode);
            return self.config.uniswap_forks.contains(&fork) && self.uniswap_ok(&fork, &call.path);
        }

        debug!(selector = ?selector(data), "unsupported aggregator call");
        false
    }
}
