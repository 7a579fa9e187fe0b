use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;

use agora_core::{AccountId, AssetId, SpaceAttributes, VerificationStatus};
use agora_ports::{AssetRegistry, RegistryError, RegistryResult};

/// In-memory asset registry
///
/// Mints space tokens with sequential ids, tracks ownership, and exposes
/// attributes and verification as optional capabilities. `fail_transfers`
/// rejects transfer requests and `stall` delays every call past the
/// marketplace timeout, for rollback and unavailability tests.
pub struct SimRegistry {
    owners: DashMap<AssetId, AccountId>,
    attributes: DashMap<AssetId, SpaceAttributes>,
    verification: DashMap<AssetId, VerificationStatus>,
    next_id: AtomicU64,
    fail_transfers: AtomicBool,
    stall: AtomicBool,
}

impl SimRegistry {
    pub fn new() -> Self {
        Self {
            owners: DashMap::new(),
            attributes: DashMap::new(),
            verification: DashMap::new(),
            next_id: AtomicU64::new(1),
            fail_transfers: AtomicBool::new(false),
            stall: AtomicBool::new(false),
        }
    }

    /// Mint a new space token for `owner`
    pub fn mint(&self, owner: AccountId, attrs: SpaceAttributes) -> AssetId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let asset_id = AssetId::new(format!("space-{id}"));
        if let Some(status) = attrs.verification {
            self.verification.insert(asset_id.clone(), status);
        }
        self.owners.insert(asset_id.clone(), owner);
        self.attributes.insert(asset_id.clone(), attrs);
        debug!("minted {asset_id} for {owner}");
        asset_id
    }

    /// Mint a token the registry knows nothing else about
    pub fn mint_bare(&self, owner: AccountId) -> AssetId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let asset_id = AssetId::new(format!("space-{id}"));
        self.owners.insert(asset_id.clone(), owner);
        asset_id
    }

    /// Record a verification review outcome
    pub fn set_verification(&self, asset: &AssetId, status: VerificationStatus) {
        self.verification.insert(asset.clone(), status);
    }

    /// Reject all subsequent transfer requests
    pub fn fail_transfers(&self, fail: bool) {
        self.fail_transfers.store(fail, Ordering::SeqCst);
    }

    /// Delay every call by ten seconds, past any sane engine timeout
    pub fn stall(&self, stall: bool) {
        self.stall.store(stall, Ordering::SeqCst);
    }

    async fn maybe_stall(&self) {
        if self.stall.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
    }
}

impl Default for SimRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetRegistry for SimRegistry {
    async fn owner_of(&self, asset: &AssetId) -> RegistryResult<AccountId> {
        self.maybe_stall().await;
        self.owners
            .get(asset)
            .map(|owner| *owner)
            .ok_or_else(|| RegistryError::AssetNotFound(asset.to_string()))
    }

    async fn transfer(
        &self,
        asset: &AssetId,
        from: AccountId,
        to: AccountId,
    ) -> RegistryResult<()> {
        self.maybe_stall().await;
        if self.fail_transfers.load(Ordering::SeqCst) {
            return Err(RegistryError::TransferRejected(
                "transfers disabled".to_string(),
            ));
        }
        let mut owner = self
            .owners
            .get_mut(asset)
            .ok_or_else(|| RegistryError::AssetNotFound(asset.to_string()))?;
        if *owner != from {
            return Err(RegistryError::TransferRejected(format!(
                "{from} does not own {asset}"
            )));
        }
        *owner = to;
        debug!("transferred {asset}: {from} -> {to}");
        Ok(())
    }

    async fn attributes(&self, asset: &AssetId) -> RegistryResult<Option<SpaceAttributes>> {
        self.maybe_stall().await;
        Ok(self.attributes.get(asset).map(|attrs| attrs.clone()))
    }

    async fn verification(&self, asset: &AssetId) -> RegistryResult<Option<VerificationStatus>> {
        self.maybe_stall().await;
        Ok(self.verification.get(asset).map(|status| *status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn mint_then_transfer_moves_ownership() {
        let registry = SimRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let asset = registry.mint(alice, SpaceAttributes::default());

        assert_eq!(registry.owner_of(&asset).await.unwrap(), alice);
        registry.transfer(&asset, alice, bob).await.unwrap();
        assert_eq!(registry.owner_of(&asset).await.unwrap(), bob);
    }

    #[tokio::test]
    async fn transfer_from_non_owner_rejected() {
        let registry = SimRegistry::new();
        let alice = Uuid::new_v4();
        let mallory = Uuid::new_v4();
        let asset = registry.mint(alice, SpaceAttributes::default());

        let err = registry.transfer(&asset, mallory, mallory).await.unwrap_err();
        assert!(matches!(err, RegistryError::TransferRejected(_)));
    }

    #[tokio::test]
    async fn bare_mint_has_no_attribute_capability() {
        let registry = SimRegistry::new();
        let asset = registry.mint_bare(Uuid::new_v4());
        assert!(registry.attributes(&asset).await.unwrap().is_none());
        assert!(registry.verification(&asset).await.unwrap().is_none());
    }
}
