//! Balancer pools

use super::abi::IBPool;
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Single-asset joins and exits on a BPool
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancerFilter;

impl Filter for BalancerFilter {
    fn name(&self) -> &'static str {
        "balancer"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        let data = request.data;
        decode::<IBPool::joinswapExternAmountInCall>(data).is_some()
            || decode::<IBPool::exitswapExternAmountOutCall>(data).is_some()
            || decode::<IBPool::exitswapPoolAmountInCall>(data).is_some()
    }
}
