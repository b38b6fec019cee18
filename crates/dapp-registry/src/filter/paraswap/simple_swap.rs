//! `simpleSwap`: the aggregator replays raw calls on our behalf
//!
//! The call carries a list of callees, one blob of calldata and the offsets
//! that cut the blob into one sub-call per callee. Each sub-call is checked
//! on its own against the configured target exchanges.

use super::{ExchangeKind, ParaswapConfig, TargetExchange};
use crate::filter::abi::{
    IAugustus, ICurvePool, IParaswapUniV2Router, IUniswapV1Exchange, IUniswapV3Router, IWeth,
    IZeroExV2, IZeroExV4,
};
use crate::filter::approve::approved_spender;
use crate::filter::calldata::decode;
use crate::filter::uniswap::ETH_TOKEN;
use alloy_primitives::{Address, U256};
use tracing::debug;

/// One call the aggregator will make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubCall<'a> {
    pub callee: Address,
    pub data: &'a [u8],
    pub value: U256,
}

/// Cut `exchange_data` into sub-calls.
///
/// `None` unless there is exactly one more start index than callees, the
/// first index is zero, indexes never go backwards, the last one is the end
/// of the data and there is one value per callee.
pub fn split<'a>(
    callees: &[Address],
    exchange_data: &'a [u8],
    start_indexes: &[U256],
    values: &[U256],
) -> Option<Vec<SubCall<'a>>> {
    if start_indexes.len() != callees.len() + 1 || values.len() != callees.len() {
        return None;
    }
    let bounds = start_indexes
        .iter()
        .map(|index| usize::try_from(*index).ok())
        .collect::<Option<Vec<usize>>>()?;
    if bounds.first() != Some(&0) || bounds.last() != Some(&exchange_data.len()) {
        return None;
    }

    callees
        .iter()
        .zip(values)
        .zip(bounds.windows(2))
        .map(|((callee, value), window)| {
            let data = exchange_data.get(window[0]..window[1])?;
            Some(SubCall {
                callee: *callee,
                data,
                value: *value,
            })
        })
        .collect()
}

/// What one `simpleSwap` is allowed to do
pub struct SwapContext<'a> {
    pub config: &'a ParaswapConfig,
    pub from_token: Address,
    pub to_token: Address,
    /// Addresses an approval issued inside this swap may name
    pub spenders: Vec<Address>,
}

impl<'a> SwapContext<'a> {
    pub fn new(config: &'a ParaswapConfig, call: &IAugustus::simpleSwapCall) -> Self {
        let spenders = call
            .callees
            .iter()
            .filter_map(|callee| config.target_exchanges.get(callee).map(|t| (callee, t)))
            .flat_map(|(callee, target)| std::iter::once(*callee).chain(target.proxy))
            .collect();
        Self {
            config,
            from_token: call.fromToken,
            to_token: call.toToken,
            spenders,
        }
    }

    /// `actual` is the token the swap declared, or WETH standing in for ether
    fn same_token(&self, declared: Address, actual: Address) -> bool {
        actual == declared || (declared == ETH_TOKEN && actual == self.config.weth)
    }

    fn is_market_maker(&self, maker: Address) -> bool {
        self.config.market_makers.contains(&maker)
    }

    pub fn check(&self, sub: &SubCall<'_>) -> bool {
        let ok = self.check_inner(sub);
        if !ok {
            debug!(callee = %sub.callee, len = sub.data.len(), "sub-call rejected");
        }
        ok
    }

    fn check_inner(&self, sub: &SubCall<'_>) -> bool {
        if sub.callee == self.config.augustus {
            return sub.value.is_zero()
                && decode::<IAugustus::withdrawAllWETHCall>(sub.data)
                    .is_some_and(|call| call.token == self.config.weth);
        }

        if sub.callee == self.from_token {
            if let Some(spender) = approved_spender(sub.data) {
                return sub.value.is_zero() && self.spenders.contains(&spender);
            }
        }

        match self.config.target_exchanges.get(&sub.callee) {
            Some(target) => self.check_exchange(target, sub),
            None => false,
        }
    }

    fn check_exchange(&self, target: &TargetExchange, sub: &SubCall<'_>) -> bool {
        let data = sub.data;
        let no_value = sub.value.is_zero();

        match target.kind {
            ExchangeKind::UniswapV1 => {
                let Some(pool_token) = target.token else {
                    return false;
                };
                if decode::<IUniswapV1Exchange::ethToTokenSwapInputCall>(data).is_some() {
                    return self.from_token == ETH_TOKEN && self.to_token == pool_token;
                }
                no_value
                    && self.from_token == pool_token
                    && (decode::<IUniswapV1Exchange::tokenToEthSwapInputCall>(data)
                        .is_some_and(|_| self.to_token == ETH_TOKEN)
                        || decode::<IUniswapV1Exchange::tokenToTokenSwapInputCall>(data)
                            .is_some_and(|call| call.token_addr == self.to_token))
            }
            ExchangeKind::UniswapV2Router => {
                decode::<IParaswapUniV2Router::swapCall>(data).is_some_and(|call| {
                    match (call.path.first(), call.path.last()) {
                        (Some(first), Some(last)) if call.path.len() >= 2 => {
                            self.same_token(self.from_token, *first)
                                && self.same_token(self.to_token, *last)
                        }
                        _ => false,
                    }
                })
            }
            ExchangeKind::UniswapV3Router => {
                decode::<IUniswapV3Router::exactInputSingleCall>(data).is_some_and(|call| {
                    let params = call.params;
                    params.recipient == self.config.augustus
                        && self.same_token(self.from_token, params.tokenIn)
                        && self.same_token(self.to_token, params.tokenOut)
                })
            }
            ExchangeKind::ZeroExV2 => {
                no_value
                    && decode::<IZeroExV2::marketSellOrdersNoThrowCall>(data).is_some_and(|call| {
                        !call.orders.is_empty()
                            && call
                                .orders
                                .iter()
                                .all(|order| self.is_market_maker(order.makerAddress))
                    })
            }
            ExchangeKind::ZeroExV4 => {
                no_value
                    && decode::<IZeroExV4::fillRfqOrderCall>(data).is_some_and(|call| {
                        let order = call.order;
                        self.is_market_maker(order.maker)
                            && self.same_token(self.from_token, order.takerToken)
                            && self.same_token(self.to_token, order.makerToken)
                    })
            }
            ExchangeKind::Curve => {
                decode::<ICurvePool::exchangeCall>(data).is_some()
                    || decode::<ICurvePool::exchange_underlyingCall>(data).is_some()
            }
            ExchangeKind::Weth => {
                data.is_empty()
                    || decode::<IWeth::depositCall>(data).is_some()
                    || (no_value && decode::<IWeth::withdrawCall>(data).is_some())
            }
            ExchangeKind::Generic => false,
        }
    }
}
