//! Tradable token allowlist
//!
//! Swap filters only accept trades whose output token is on this list. The
//! owner curates it; managers can only take tokens off, which lets an
//! operator react to an incident without waiting for the owner.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenRegistryError {
    #[error("{caller} may not change tradable status")]
    Unauthorised { caller: Address },

    #[error("address must not be zero")]
    NullAddress,

    #[error("{0} is not a manager")]
    UnknownManager(Address),

    #[error("{tokens} tokens but {flags} flags")]
    LengthMismatch { tokens: usize, flags: usize },
}

/// Read side used by the filters
pub trait TradableTokens: Send + Sync {
    fn is_tradable(&self, token: Address) -> bool;

    fn are_tradable(&self, tokens: &[Address]) -> bool {
        tokens.iter().all(|token| self.is_tradable(*token))
    }
}

/// The allowlist itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRegistry {
    pub owner: Address,

    #[serde(default)]
    pub managers: BTreeSet<Address>,

    #[serde(default)]
    pub tradable: BTreeSet<Address>,
}

/// Shared handle, written by the CLI and read by the filters
pub type SharedTokens = Arc<RwLock<TokenRegistry>>;

impl TokenRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            ..Default::default()
        }
    }

    pub fn shared(self) -> SharedTokens {
        Arc::new(RwLock::new(self))
    }

    pub fn is_manager(&self, who: Address) -> bool {
        self.managers.contains(&who)
    }

    pub fn change_owner(&mut self, caller: Address, new_owner: Address) -> Result<(), TokenRegistryError> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenRegistryError::NullAddress);
        }
        self.owner = new_owner;
        info!(owner = %new_owner, "token registry owner changed");
        Ok(())
    }

    /// Tradable flag per token, in order
    pub fn get_tradable(&self, tokens: &[Address]) -> Vec<bool> {
        tokens.iter().map(|token| self.is_tradable(*token)).collect()
    }

    pub fn add_manager(&mut self, caller: Address, manager: Address) -> Result<(), TokenRegistryError> {
        self.require_owner(caller)?;
        if manager.is_zero() {
            return Err(TokenRegistryError::NullAddress);
        }
        if self.managers.insert(manager) {
            info!(manager = %manager, "token manager added");
        }
        Ok(())
    }

    pub fn revoke_manager(
        &mut self,
        caller: Address,
        manager: Address,
    ) -> Result<(), TokenRegistryError> {
        self.require_owner(caller)?;
        if !self.managers.remove(&manager) {
            return Err(TokenRegistryError::UnknownManager(manager));
        }
        info!(manager = %manager, "token manager revoked");
        Ok(())
    }

    /// Set the tradable flag for each token.
    ///
    /// Managers may only pass `false` flags; the owner may pass anything.
    pub fn set_tradable(
        &mut self,
        caller: Address,
        tokens: &[Address],
        flags: &[bool],
    ) -> Result<(), TokenRegistryError> {
        if tokens.len() != flags.len() {
            return Err(TokenRegistryError::LengthMismatch {
                tokens: tokens.len(),
                flags: flags.len(),
            });
        }
        if caller != self.owner {
            if !self.is_manager(caller) {
                return Err(TokenRegistryError::Unauthorised { caller });
            }
            // Managers may only take tokens off the list
            if flags.iter().any(|flag| *flag) {
                return Err(TokenRegistryError::Unauthorised { caller });
            }
        }

        for (token, flag) in tokens.iter().zip(flags) {
            if *flag {
                self.tradable.insert(*token);
            } else {
                self.tradable.remove(token);
            }
            info!(token = %token, tradable = *flag, "token status set");
        }
        Ok(())
    }

    fn require_owner(&self, caller: Address) -> Result<(), TokenRegistryError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(TokenRegistryError::Unauthorised { caller })
        }
    }
}

impl TradableTokens for TokenRegistry {
    fn is_tradable(&self, token: Address) -> bool {
        self.tradable.contains(&token)
    }
}

impl TradableTokens for RwLock<TokenRegistry> {
    fn is_tradable(&self, token: Address) -> bool {
        // A poisoned lock reads as "nothing is tradable"
        self.read().map(|r| r.is_tradable(token)).unwrap_or(false)
    }

    fn are_tradable(&self, tokens: &[Address]) -> bool {
        self.read().map(|r| r.are_tradable(tokens)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const OWNER: Address = address!("1000000000000000000000000000000000000001");
    const MANAGER: Address = address!("2000000000000000000000000000000000000002");
    const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

    #[test]
    fn test_owner_and_manager_rights() {
        let mut tokens = TokenRegistry::new(OWNER);

        assert_eq!(
            tokens.set_tradable(MANAGER, &[DAI], &[true]),
            Err(TokenRegistryError::Unauthorised { caller: MANAGER })
        );
        assert_eq!(
            tokens.add_manager(MANAGER, MANAGER),
            Err(TokenRegistryError::Unauthorised { caller: MANAGER })
        );

        tokens.add_manager(OWNER, MANAGER).unwrap();
        tokens.set_tradable(OWNER, &[DAI, USDC], &[true, true]).unwrap();
        assert!(tokens.are_tradable(&[DAI, USDC]));

        assert_eq!(
            tokens.set_tradable(MANAGER, &[DAI, USDC], &[false, true]),
            Err(TokenRegistryError::Unauthorised { caller: MANAGER })
        );
        assert!(tokens.is_tradable(DAI));

        tokens.set_tradable(MANAGER, &[DAI], &[false]).unwrap();
        assert!(!tokens.is_tradable(DAI));
        assert!(!tokens.are_tradable(&[DAI, USDC]));
        assert_eq!(tokens.get_tradable(&[DAI, USDC]), vec![false, true]);
    }

    #[test]
    fn test_change_owner() {
        let mut tokens = TokenRegistry::new(OWNER);
        assert_eq!(
            tokens.change_owner(OWNER, Address::ZERO),
            Err(TokenRegistryError::NullAddress)
        );
        tokens.change_owner(OWNER, MANAGER).unwrap();
        assert!(tokens.set_tradable(OWNER, &[DAI], &[true]).is_err());
        tokens.set_tradable(MANAGER, &[DAI], &[true]).unwrap();
    }

    #[test]
    fn test_manager_revocation() {
        let mut tokens = TokenRegistry::new(OWNER);
        assert_eq!(
            tokens.revoke_manager(OWNER, MANAGER),
            Err(TokenRegistryError::UnknownManager(MANAGER))
        );
        assert_eq!(
            tokens.add_manager(OWNER, Address::ZERO),
            Err(TokenRegistryError::NullAddress)
        );

        tokens.add_manager(OWNER, MANAGER).unwrap();
        tokens.revoke_manager(OWNER, MANAGER).unwrap();
        assert!(tokens.set_tradable(MANAGER, &[DAI], &[false]).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let mut tokens = TokenRegistry::new(OWNER);
        assert_eq!(
            tokens.set_tradable(OWNER, &[DAI], &[]),
            Err(TokenRegistryError::LengthMismatch { tokens: 1, flags: 0 })
        );
    }

    #[test]
    fn test_shared_handle() {
        let mut tokens = TokenRegistry::new(OWNER);
        tokens.set_tradable(OWNER, &[DAI], &[true]).unwrap();
        let shared = tokens.shared();
        assert!(shared.is_tradable(DAI));

        shared
            .write()
            .unwrap()
            .set_tradable(OWNER, &[DAI], &[false])
            .unwrap();
        assert!(!shared.is_tradable(DAI));
    }
}
