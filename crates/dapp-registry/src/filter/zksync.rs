//! zkSync

use super::abi::IZkSync;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Only registering the L2 signing key
#[derive(Debug, Clone, Copy, Default)]
pub struct ZkSyncFilter;

impl Filter for ZkSyncFilter {
    fn name(&self) -> &'static str {
        "zksync"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        !request.is_approval() && decode::<IZkSync::setAuthPubkeyHashCall>(request.data).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::*;
    use alloy_primitives::Bytes;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_zksync_calls() {
        let filter = ZkSyncFilter;
        let ok = |data: &[u8]| filter.is_valid(&CallRequest::direct(WALLET, DAPP, data));

        assert!(ok(&IZkSync::setAuthPubkeyHashCall {
            _pubkeyHash: Bytes::new(),
            _nonce: 0,
        }
        .abi_encode()));
        assert!(!ok(&IZkSync::getNoticePeriodCall {}.abi_encode()));
        assert!(!ok(&[]));

        let data = approve(DAPP);
        assert!(!filter.is_valid(&CallRequest::approval(WALLET, DAPP, TOKEN, &data)));
    }
}
