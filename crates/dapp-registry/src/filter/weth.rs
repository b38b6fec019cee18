//! Wrapped ether

use super::abi::IWeth;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Wrap and unwrap ether.
///
/// Empty calldata is a plain ether transfer, which WETH treats as a deposit.
#[derive(Debug, Clone, Copy, Default)]
pub struct WethFilter;

impl Filter for WethFilter {
    fn name(&self) -> &'static str {
        "weth"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        if request.is_approval() {
            return false;
        }
        let data = request.data;
        data.is_empty()
            || decode::<IWeth::depositCall>(data).is_some()
            || decode::<IWeth::withdrawCall>(data).is_some()
    }
}
