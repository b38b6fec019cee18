//! Uniswap v2 style AMMs
//!
//! Pools are never looked up on chain: a pair address is derived from the
//! factory and the init-code hash of the pair contract (CREATE2), then checked
//! against the token registry, which lists tradable pairs as well as tokens.

use super::abi::{IUniZap, IUniswapV2Router};
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};
use crate::tokens::TradableTokens;
use alloy_primitives::{address, keccak256, Address, B256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Placeholder aggregators use for native ether
pub const ETH_TOKEN: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// A pair factory and the init-code hash of its pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniswapFactory {
    pub factory: Address,
    pub init_code_hash: B256,
}

impl UniswapFactory {
    pub fn new(factory: Address, init_code_hash: B256) -> Self {
        Self {
            factory,
            init_code_hash,
        }
    }

    /// Address of the pair for `a` and `b`, in either order
    pub fn pair_for(&self, a: Address, b: Address) -> Address {
        let (token0, token1) = if a < b { (a, b) } else { (b, a) };

        let mut salt_input = [0u8; 40];
        salt_input[..20].copy_from_slice(token0.as_slice());
        salt_input[20..].copy_from_slice(token1.as_slice());
        let salt = keccak256(salt_input);

        let mut preimage = Vec::with_capacity(85);
        preimage.push(0xff);
        preimage.extend_from_slice(self.factory.as_slice());
        preimage.extend_from_slice(salt.as_slice());
        preimage.extend_from_slice(self.init_code_hash.as_slice());
        Address::from_slice(&keccak256(&preimage)[12..])
    }

    /// Pairs crossed by a swap along `path`, with the ether placeholder read as `weth`.
    ///
    /// `None` if the path has fewer than two hops.
    pub fn pairs_along(&self, path: &[Address], weth: Address) -> Option<Vec<Address>> {
        if path.len() < 2 {
            return None;
        }
        let hop = |token: Address| if token == ETH_TOKEN { weth } else { token };
        Some(
            path.windows(2)
                .map(|w| self.pair_for(hop(w[0]), hop(w[1])))
                .collect(),
        )
    }
}

/// Pairs of one factory, checked against the token registry
struct TradablePairs {
    factory: UniswapFactory,
    weth: Address,
    tokens: Arc<dyn TradableTokens>,
}

impl TradablePairs {
    fn path_ok(&self, path: &[Address]) -> bool {
        self.factory
            .pairs_along(path, self.weth)
            .is_some_and(|pairs| self.tokens.are_tradable(&pairs))
    }

    fn pair_ok(&self, a: Address, b: Address) -> bool {
        self.tokens.is_tradable(self.factory.pair_for(a, b))
    }
}

/// Uniswap v2 router: swaps and liquidity for the wallet, over tradable pairs only
pub struct UniswapV2RouterFilter {
    pairs: TradablePairs,
}

impl UniswapV2RouterFilter {
    pub fn new(factory: UniswapFactory, weth: Address, tokens: Arc<dyn TradableTokens>) -> Self {
        Self {
            pairs: TradablePairs {
                factory,
                weth,
                tokens,
            },
        }
    }

    /// Recipient and the pair check for a router call, if it is one we know
    fn inspect(&self, data: &[u8]) -> Option<(Address, bool)> {
        use IUniswapV2Router as R;
        let pairs = &self.pairs;

        if let Some(c) = decode::<R::swapExactTokensForTokensCall>(data) {
            return Some((c.to, pairs.path_ok(&c.path)));
        }
        if let Some(c) = decode::<R::swapTokensForExactTokensCall>(data) {
            return Some((c.to, pairs.path_ok(&c.path)));
        }
        if let Some(c) = decode::<R::swapExactETHForTokensCall>(data) {
            return Some((c.to, pairs.path_ok(&c.path)));
        }
        if let Some(c) = decode::<R::swapETHForExactTokensCall>(data) {
            return Some((c.to, pairs.path_ok(&c.path)));
        }
        if let Some(c) = decode::<R::swapExactTokensForETHCall>(data) {
            return Some((c.to, pairs.path_ok(&c.path)));
        }
        if let Some(c) = decode::<R::swapTokensForExactETHCall>(data) {
            return Some((c.to, pairs.path_ok(&c.path)));
        }
        if let Some(c) = decode::<R::addLiquidityCall>(data) {
            return Some((c.to, pairs.pair_ok(c.tokenA, c.tokenB)));
        }
        if let Some(c) = decode::<R::addLiquidityETHCall>(data) {
            return Some((c.to, pairs.pair_ok(c.token, pairs.weth)));
        }
        if let Some(c) = decode::<R::removeLiquidityCall>(data) {
            return Some((c.to, pairs.pair_ok(c.tokenA, c.tokenB)));
        }
        if let Some(c) = decode::<R::removeLiquidityETHCall>(data) {
            return Some((c.to, pairs.pair_ok(c.token, pairs.weth)));
        }
        None
    }
}

impl Filter for UniswapV2RouterFilter {
    fn name(&self) -> &'static str {
        "uniswap_v2_router"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        matches!(self.inspect(request.data), Some((to, true)) if to == request.wallet)
    }
}

/// UniZap: single-call liquidity in and out of tradable pairs, for the wallet
pub struct UniswapV2UniZapFilter {
    pairs: TradablePairs,
}

impl UniswapV2UniZapFilter {
    pub fn new(factory: UniswapFactory, weth: Address, tokens: Arc<dyn TradableTokens>) -> Self {
        Self {
            pairs: TradablePairs {
                factory,
                weth,
                tokens,
            },
        }
    }

    fn inspect(&self, data: &[u8]) -> Option<(Address, bool)> {
        let pairs = &self.pairs;

        if let Some(c) = decode::<IUniZap::swapExactETHAndAddLiquidityCall>(data) {
            return Some((c._to, pairs.pair_ok(c._token, pairs.weth)));
        }
        if let Some(c) = decode::<IUniZap::swapExactTokensAndAddLiquidityCall>(data) {
            return Some((c._to, pairs.pair_ok(c._tokenA, c._tokenB)));
        }
        if let Some(c) = decode::<IUniZap::removeLiquidityAndSwapToETHCall>(data) {
            return Some((c._to, pairs.pair_ok(c._token, pairs.weth)));
        }
        if let Some(c) = decode::<IUniZap::removeLiquidityAndSwapToTokenCall>(data) {
            return Some((c._to, pairs.pair_ok(c._baseToken, c._targetToken)));
        }
        None
    }
}

impl Filter for UniswapV2UniZapFilter {
    fn name(&self) -> &'static str {
        "uniswap_v2_unizap"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        matches!(self.inspect(request.data), Some((to, true)) if to == request.wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::*;
    use crate::tokens::TokenRegistry;
    use alloy_primitives::{b256, U256};
    use alloy_sol_types::SolCall;

    const UNIV2: UniswapFactory = UniswapFactory {
        factory: address!("5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f"),
        init_code_hash: b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f"),
    };
    const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    const DAI_WETH: Address = address!("a478c2975ab1ea89e8196811f51a7b7ade33eb11");
    const USDC_WETH: Address = address!("b4e16d0168e52d35cacd2c6185b44281ec28c9dc");

    #[test]
    fn test_pair_derivation() {
        assert_eq!(UNIV2.pair_for(DAI, WETH), DAI_WETH);
        assert_eq!(UNIV2.pair_for(WETH, DAI), DAI_WETH);
        assert_eq!(UNIV2.pair_for(USDC, WETH), USDC_WETH);

        assert_eq!(
            UNIV2.pairs_along(&[ETH_TOKEN, DAI], WETH),
            Some(vec![DAI_WETH])
        );
        assert_eq!(
            UNIV2.pairs_along(&[USDC, WETH, DAI], WETH),
            Some(vec![USDC_WETH, DAI_WETH])
        );
        assert_eq!(UNIV2.pairs_along(&[DAI], WETH), None);
    }

    fn filter(tradable: &[Address]) -> UniswapV2RouterFilter {
        let mut tokens = TokenRegistry::new(OTHER);
        let flags = vec![true; tradable.len()];
        tokens.set_tradable(OTHER, tradable, &flags).unwrap();
        UniswapV2RouterFilter::new(UNIV2, WETH, Arc::new(tokens))
    }

    fn swap(path: Vec<Address>, to: Address) -> Vec<u8> {
        IUniswapV2Router::swapExactTokensForTokensCall {
            amountIn: U256::from(10),
            amountOutMin: U256::from(1),
            path,
            to,
            deadline: U256::from(u64::MAX),
        }
        .abi_encode()
    }

    #[test]
    fn test_swap_needs_tradable_pairs() {
        let filter = filter(&[DAI_WETH]);

        let data = swap(vec![DAI, WETH], WALLET);
        assert!(filter.is_valid(&CallRequest::direct(WALLET, DAPP, &data)));

        let data = swap(vec![USDC, WETH, DAI], WALLET);
        assert!(!filter.is_valid(&CallRequest::direct(WALLET, DAPP, &data)));

        let data = swap(vec![DAI, WETH], OTHER);
        assert!(!filter.is_valid(&CallRequest::direct(WALLET, DAPP, &data)));

        let data = swap(vec![DAI], WALLET);
        assert!(!filter.is_valid(&CallRequest::direct(WALLET, DAPP, &data)));
    }

    #[test]
    fn test_liquidity() {
        let filter = filter(&[USDC_WETH]);
        let data = IUniswapV2Router::addLiquidityETHCall {
            token: USDC,
            amountTokenDesired: U256::from(1),
            amountTokenMin: U256::ZERO,
            amountETHMin: U256::ZERO,
            to: WALLET,
            deadline: U256::from(1),
        }
        .abi_encode();
        assert!(filter.is_valid(&CallRequest::direct(WALLET, DAPP, &data)));

        let data = IUniswapV2Router::removeLiquidityCall {
            tokenA: DAI,
            tokenB: WETH,
            liquidity: U256::from(1),
            amountAMin: U256::ZERO,
            amountBMin: U256::ZERO,
            to: WALLET,
            deadline: U256::from(1),
        }
        .abi_encode();
        assert!(!filter.is_valid(&CallRequest::direct(WALLET, DAPP, &data)));
    }

    #[test]
    fn test_unizap_add_liquidity() {
        let tokens = {
            let mut tokens = TokenRegistry::new(OTHER);
            tokens.set_tradable(OTHER, &[USDC_WETH], &[true]).unwrap();
            Arc::new(tokens)
        };
        let filter = UniswapV2UniZapFilter::new(UNIV2, WETH, tokens);
        let with_eth = |token, to| {
            IUniZap::swapExactETHAndAddLiquidityCall {
                _token: token,
                _minLiquidity: U256::from(1),
                _to: to,
                _deadline: U256::from(u64::MAX),
            }
            .abi_encode()
        };
        let with_token = |a, b, to| {
            IUniZap::swapExactTokensAndAddLiquidityCall {
                _tokenA: a,
                _tokenB: b,
                _amountIn: U256::from(10),
                _minLiquidity: U256::from(1),
                _to: to,
                _deadline: U256::from(u64::MAX),
            }
            .abi_encode()
        };

        let valid = |data: &[u8]| filter.is_valid(&CallRequest::direct(WALLET, DAPP, data));
        assert!(valid(&with_eth(USDC, WALLET)));
        assert!(!valid(&with_eth(USDC, OTHER)));
        assert!(!valid(&with_eth(DAI, WALLET)));
        assert!(valid(&with_token(USDC, WETH, WALLET)));
        assert!(!valid(&with_token(USDC, WETH, OTHER)));
        assert!(!valid(&with_token(DAI, WETH, WALLET)));
    }

    #[test]
    fn test_unizap_remove_liquidity() {
        let tokens = {
            let mut tokens = TokenRegistry::new(OTHER);
            tokens.set_tradable(OTHER, &[USDC_WETH], &[true]).unwrap();
            Arc::new(tokens)
        };
        let filter = UniswapV2UniZapFilter::new(UNIV2, WETH, tokens);
        let to_eth = |token, to| {
            IUniZap::removeLiquidityAndSwapToETHCall {
                _token: token,
                _liquidity: U256::from(10),
                _minAmount: U256::from(1),
                _to: to,
                _deadline: U256::from(u64::MAX),
            }
            .abi_encode()
        };
        let to_token = |base, target, to| {
            IUniZap::removeLiquidityAndSwapToTokenCall {
                _baseToken: base,
                _targetToken: target,
                _liquidity: U256::from(10),
                _minAmount: U256::from(1),
                _to: to,
                _deadline: U256::from(u64::MAX),
            }
            .abi_encode()
        };

        let valid = |data: &[u8]| filter.is_valid(&CallRequest::direct(WALLET, DAPP, data));
        assert!(valid(&to_eth(USDC, WALLET)));
        assert!(!valid(&to_eth(USDC, OTHER)));
        assert!(!valid(&to_eth(DAI, WALLET)));
        assert!(valid(&to_token(WETH, USDC, WALLET)));
        assert!(!valid(&to_token(WETH, USDC, OTHER)));
        assert!(!valid(&to_token(WETH, DAI, WALLET)));

        // No bare ether, approvals of the LP token to the zap are fine
        assert!(!valid(&[]));
        let data = approve(DAPP);
        assert!(filter.is_valid(&CallRequest::approval(WALLET, DAPP, USDC_WETH, &data)));
        let data = approve(OTHER);
        assert!(!filter.is_valid(&CallRequest::approval(WALLET, DAPP, USDC_WETH, &data)));
    }

    #[test]
    fn test_router_approvals() {
        let filter = filter(&[]);
        let data = approve(DAPP);
        assert!(filter.is_valid(&CallRequest::approval(WALLET, DAPP, DAI, &data)));
        assert!(!filter.is_valid(&CallRequest::direct(WALLET, DAPP, &[])));
    }
}
