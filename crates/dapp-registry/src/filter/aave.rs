//! Aave lending pools and aTokens

use super::abi::{IAToken, IAaveV1LendingPool, IAaveV2LendingPool};
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Deposits and withdrawals that credit the wallet itself
#[derive(Debug, Clone, Copy, Default)]
pub struct AaveV2Filter;

impl Filter for AaveV2Filter {
    fn name(&self) -> &'static str {
        "aave_v2"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        let data = request.data;
        if let Some(call) = decode::<IAaveV2LendingPool::depositCall>(data) {
            return call.onBehalfOf == request.wallet;
        }
        if let Some(call) = decode::<IAaveV2LendingPool::withdrawCall>(data) {
            return call.to == request.wallet;
        }
        false
    }
}

/// v1 lending pool: deposits only
#[derive(Debug, Clone, Copy, Default)]
pub struct AaveV1LendingPoolFilter;

impl Filter for AaveV1LendingPoolFilter {
    fn name(&self) -> &'static str {
        "aave_v1_lending_pool"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        decode::<IAaveV1LendingPool::depositCall>(request.data).is_some()
    }
}

/// v1 aToken: redeem to the underlying
#[derive(Debug, Clone, Copy, Default)]
pub struct AaveV1ATokenFilter;

impl Filter for AaveV1ATokenFilter {
    fn name(&self) -> &'static str {
        "aave_v1_atoken"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        !request.is_approval() && decode::<IAToken::redeemCall>(request.data).is_some()
    }
}
