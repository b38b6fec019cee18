//! ERC20 approvals

use super::abi::IERC20;
use super::calldata;
use super::{CallRequest, Filter};
use alloy_primitives::Address;

/// The spender named by an `approve` call
pub fn approved_spender(data: &[u8]) -> Option<Address> {
    calldata::decode::<IERC20::approveCall>(data).map(|call| call.spender)
}

/// Whether `request` is an `approve` on some token in favour of the dapp itself
pub fn is_approval_for(request: &CallRequest<'_>) -> bool {
    request.is_approval() && approved_spender(request.data) == Some(request.spender)
}

/// Accepts token approvals for the dapp and nothing else.
///
/// Used for spenders such as token transfer proxies that are never called
/// directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyApproveFilter;

impl Filter for OnlyApproveFilter {
    fn name(&self) -> &'static str {
        "only_approve"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        is_approval_for(request)
    }
}
