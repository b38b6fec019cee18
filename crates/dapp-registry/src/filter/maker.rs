//! Maker DSR: Vat, Pot and DaiJoin

use super::abi::{IDaiJoin, IPot, IVat};
use super::approve::is_approval_for;
use super::calldata::decode;
use super::{CallRequest, Filter};
use alloy_primitives::Address;

/// The Vat only ever needs to trust the Pot and the DaiJoin adapter
#[derive(Debug, Clone, Copy)]
pub struct VatFilter {
    pub dai_join: Address,
    pub pot: Address,
}

impl VatFilter {
    pub fn new(dai_join: Address, pot: Address) -> Self {
        Self { dai_join, pot }
    }
}

impl Filter for VatFilter {
    fn name(&self) -> &'static str {
        "maker_vat"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return false;
        }
        decode::<IVat::hopeCall>(request.data)
            .is_some_and(|call| call.usr == self.dai_join || call.usr == self.pot)
    }
}

/// Deposit into and withdraw from the DSR
#[derive(Debug, Clone, Copy, Default)]
pub struct PotFilter;

impl Filter for PotFilter {
    fn name(&self) -> &'static str {
        "maker_pot"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return false;
        }
        let data = request.data;
        decode::<IPot::joinCall>(data).is_some()
            || decode::<IPot::exitCall>(data).is_some()
            || decode::<IPot::dripCall>(data).is_some()
    }
}

/// Move DAI in and out of the Vat, for the wallet only
#[derive(Debug, Clone, Copy, Default)]
pub struct DaiJoinFilter;

impl Filter for DaiJoinFilter {
    fn name(&self) -> &'static str {
        "maker_dai_join"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return is_approval_for(request);
        }
        let data = request.data;
        let usr = decode::<IDaiJoin::joinCall>(data)
            .map(|call| call.usr)
            .or_else(|| decode::<IDaiJoin::exitCall>(data).map(|call| call.usr));
        usr == Some(request.wallet)
    }
}
