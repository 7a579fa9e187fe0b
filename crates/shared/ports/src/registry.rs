use async_trait::async_trait;

use agora_core::{AccountId, AssetId, SpaceAttributes, VerificationStatus};

use crate::error::RegistryResult;

/// Port to the external asset registry that owns space tokens
///
/// The marketplace never mutates ownership directly; it only queries the
/// current owner and requests transfers. Attribute and verification lookups
/// are optional capabilities: a registry that does not track them returns
/// `Ok(None)` and the marketplace falls back to neutral behavior.
#[async_trait]
pub trait AssetRegistry: Send + Sync {
    /// Current owner of an asset
    async fn owner_of(&self, asset: &AssetId) -> RegistryResult<AccountId>;

    /// Request an ownership transfer
    async fn transfer(&self, asset: &AssetId, from: AccountId, to: AccountId)
    -> RegistryResult<()>;

    /// Space attributes, if the registry tracks them
    async fn attributes(&self, asset: &AssetId) -> RegistryResult<Option<SpaceAttributes>>;

    /// Verification status, if the registry tracks it
    async fn verification(&self, asset: &AssetId) -> RegistryResult<Option<VerificationStatus>>;
}
