//! Curve pools

use super::abi::ICurvePool;
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Swaps on a Curve pool, plus approvals for the pool
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveFilter;

impl Filter for CurveFilter {
    fn name(&self) -> &'static str {
        "curve"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        let data = request.data;
        decode::<ICurvePool::exchangeCall>(data).is_some()
            || decode::<ICurvePool::exchange_underlyingCall>(data).is_some()
    }
}
