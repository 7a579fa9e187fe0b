use async_trait::async_trait;
use rust_decimal::Decimal;

use agora_core::AccountId;

use crate::error::PaymentResult;

/// Port to the funds-movement collaborator
///
/// The marketplace escrows buyer payments and bids on a dedicated escrow
/// account, then disburses from it at settlement. `refund` always moves
/// funds out of escrow back to a participant.
#[async_trait]
pub trait FundsGateway: Send + Sync {
    /// Move `amount` from one account to another
    async fn pay(&self, from: AccountId, to: AccountId, amount: Decimal) -> PaymentResult<()>;

    /// Return `amount` from the escrow account to `to`
    async fn refund(&self, to: AccountId, amount: Decimal) -> PaymentResult<()>;

    /// The account escrowed funds are held on
    fn escrow_account(&self) -> AccountId;
}
