//! Administrator authorization for the universal verifier
//!
//! Registry and whitelist mutations are restricted to a single administrator
//! address. The role can be handed over with [`AdminGate::transfer`].

use std::sync::RwLock;

use alloy::primitives::Address;
use tracing::info;

use crate::infra::{Result, VerifierError};

/// Holds the current administrator and checks callers against it.
#[derive(Debug)]
pub struct AdminGate {
    admin: RwLock<Address>,
}

impl AdminGate {
    pub fn new(admin: Address) -> Self {
        Self {
            admin: RwLock::new(admin),
        }
    }

    pub fn admin(&self) -> Result<Address> {
        self.admin
            .read()
            .map(|admin| *admin)
            .map_err(|_| VerifierError::lock_poisoned("admin"))
    }

    /// Fails with `Unauthorized` unless `caller` is the administrator.
    pub fn require_admin(&self, caller: Address) -> Result<()> {
        if self.admin()? != caller {
            return Err(VerifierError::Unauthorized(caller));
        }
        Ok(())
    }

    /// Hand the administrator role to `new_admin`.
    pub fn transfer(&self, caller: Address, new_admin: Address) -> Result<()> {
        if new_admin == Address::ZERO {
            return Err(VerifierError::Configuration(
                "new administrator is the zero address".to_string(),
            ));
        }
        let mut admin = self
            .admin
            .write()
            .map_err(|_| VerifierError::lock_poisoned("admin"))?;
        if *admin != caller {
            return Err(VerifierError::Unauthorized(caller));
        }
        info!(previous = %caller, new = %new_admin, "Administrator transferred");
        *admin = new_admin;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let gate = AdminGate::new(Address::repeat_byte(1));
        assert!(gate.require_admin(Address::repeat_byte(1)).is_ok());
        assert_eq!(
            gate.require_admin(Address::repeat_byte(2)).unwrap_err(),
            VerifierError::Unauthorized(Address::repeat_byte(2))
        );
    }

    #[test]
    fn test_transfer() {
        let gate = AdminGate::new(Address::repeat_byte(1));
        assert!(gate
            .transfer(Address::repeat_byte(2), Address::repeat_byte(3))
            .is_err());

        gate.transfer(Address::repeat_byte(1), Address::repeat_byte(3))
            .unwrap();
        assert_eq!(gate.admin().unwrap(), Address::repeat_byte(3));
        assert!(gate.require_admin(Address::repeat_byte(1)).is_err());
    }

    #[test]
    fn test_transfer_to_zero_rejected() {
        let gate = AdminGate::new(Address::repeat_byte(1));
        assert!(matches!(
            gate.transfer(Address::repeat_byte(1), Address::ZERO),
            Err(VerifierError::Configuration(_))
        ));
        assert_eq!(gate.admin().unwrap(), Address::repeat_byte(1));
    }
}
