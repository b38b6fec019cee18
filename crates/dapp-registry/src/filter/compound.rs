//! Compound markets

use super::abi::{ICEther, ICToken};
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};
use alloy_primitives::Address;

/// Supply, redeem, borrow and repay on one Compound market.
///
/// `underlying` is `None` for the ether market. Repaying on behalf of someone
/// else is never allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundFilter {
    pub underlying: Option<Address>,
}

impl CompoundFilter {
    pub fn ether() -> Self {
        Self { underlying: None }
    }

    pub fn token(underlying: Address) -> Self {
        Self {
            underlying: Some(underlying),
        }
    }

    fn is_ether_call(data: &[u8]) -> bool {
        data.is_empty()
            || decode::<ICEther::mintCall>(data).is_some()
            || decode::<ICEther::repayBorrowCall>(data).is_some()
    }

    fn is_token_call(data: &[u8]) -> bool {
        decode::<ICToken::mintCall>(data).is_some()
            || decode::<ICToken::repayBorrowCall>(data).is_some()
    }

    fn is_shared_call(data: &[u8]) -> bool {
        decode::<ICToken::redeemCall>(data).is_some()
            || decode::<ICToken::redeemUnderlyingCall>(data).is_some()
            || decode::<ICToken::borrowCall>(data).is_some()
    }
}

impl Filter for CompoundFilter {
    fn name(&self) -> &'static str {
        match self.underlying {
            None => "compound_ether",
            Some(_) => "compound_token",
        }
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return self.underlying == Some(request.to) && is_approval_for(request);
        }
        let data = request.data;
        match self.underlying {
            None => Self::is_ether_call(data) || Self::is_shared_call(data),
            Some(_) => Self::is_token_call(data) || Self::is_shared_call(data),
        }
    }
}
