//! Gro protocol deposit and withdraw handlers

use super::abi::{IGroDepositHandler, IGroWithdrawHandler};
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};

#[derive(Debug, Clone, Copy, Default)]
pub struct GroDepositFilter;

impl Filter for GroDepositFilter {
    fn name(&self) -> &'static str {
        "gro_deposit"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        let data = request.data;
        decode::<IGroDepositHandler::depositGvtCall>(data).is_some()
            || decode::<IGroDepositHandler::depositPwrdCall>(data).is_some()
    }
}

/// All four withdrawal paths; nothing else, approvals included
#[derive(Debug, Clone, Copy, Default)]
pub struct GroWithdrawFilter;

impl Filter for GroWithdrawFilter {
    fn name(&self) -> &'static str {
        "gro_withdraw"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return false;
        }
        let data = request.data;
        decode::<IGroWithdrawHandler::withdrawByLPTokenCall>(data).is_some()
            || decode::<IGroWithdrawHandler::withdrawByStablecoinCall>(data).is_some()
            || decode::<IGroWithdrawHandler::withdrawAllSingleCall>(data).is_some()
            || decode::<IGroWithdrawHandler::withdrawAllBalancedCall>(data).is_some()
    }
}
