//! Yearn vaults

use super::abi::{IYearnV2Vault, IYearnVault};
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Deposits into and withdrawals from a v1 vault.
///
/// The WETH vault also takes plain ether and has `*ETH` variants of each
/// entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct YearnFilter {
    weth_vault: bool,
}

impl YearnFilter {
    pub fn new(weth_vault: bool) -> Self {
        Self { weth_vault }
    }
}

impl Filter for YearnFilter {
    fn name(&self) -> &'static str {
        "yearn"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        let data = request.data;
        if decode::<IYearnVault::depositCall>(data).is_some()
            || decode::<IYearnVault::withdrawCall>(data).is_some()
            || decode::<IYearnVault::withdrawAllCall>(data).is_some()
        {
            return true;
        }
        self.weth_vault
            && (data.is_empty()
                || decode::<IYearnVault::depositETHCall>(data).is_some()
                || decode::<IYearnVault::withdrawETHCall>(data).is_some()
                || decode::<IYearnVault::withdrawAllETHCall>(data).is_some())
    }
}

/// v2 vaults: deposit and withdraw, with or without an amount
#[derive(Debug, Clone, Copy, Default)]
pub struct YearnV2Filter;

impl Filter for YearnV2Filter {
    fn name(&self) -> &'static str {
        "yearn_v2"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        let data = request.data;
        decode::<IYearnV2Vault::depositCall>(data).is_some()
            || decode::<IYearnV2Vault::withdrawCall>(data).is_some()
            || decode::<IYearnVault::depositCall>(data).is_some()
            || decode::<IYearnVault::withdrawCall>(data).is_some()
    }
}
