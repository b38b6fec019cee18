//! Lido staking

use super::abi::ILido;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Stake ether with Lido. Both `submit` and a bare transfer stake.
#[derive(Debug, Clone, Copy, Default)]
pub struct LidoFilter;

impl Filter for LidoFilter {
    fn name(&self) -> &'static str {
        "lido"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        !request.is_approval()
            && (request.data.is_empty() || decode::<ILido::submitCall>(request.data).is_some())
    }
}
