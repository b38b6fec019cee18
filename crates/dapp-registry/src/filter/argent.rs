//! Argent ENS manager

use super::abi::IArgentEnsManager;
use super::calldata::decode;
use super::{CallRequest, Filter};

/// Claiming an ENS subdomain with a manager signature
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgentEnsManagerFilter;

impl Filter for ArgentEnsManagerFilter {
    fn name(&self) -> &'static str {
        "argent_ens_manager"
    }

    fn is_valid(&self, request: &CallRequest<'_>) -> bool {
        !request.is_approval() && decode::<IArgentEnsManager::registerCall>(request.data).is_some()
    }
}
