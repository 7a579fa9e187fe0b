//! The marketplace engine
//!
//! Owns every listing and auction record. Each record lives behind its own
//! mutex: all state-changing operations on a listing serialize, while
//! operations on different listings run concurrently. The per-asset listed
//! flag is claimed with a single map-entry check-and-set, which is what
//! holds the "at most one active listing per asset" invariant under
//! concurrent creates.
//!
//! Collaborator calls (registry, funds) are bounded by a timeout and
//! surfaced as retryable errors; settlement fund movements run through a
//! [`FundPlan`] so a failure at any step rolls the whole operation back.

use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock, mpsc};

use agora_core::{
    AccountId, AssetId, Auction, AuctionStatus, FeePolicy, Listing, ListingId, ListingStatus,
    SettlementEvent, SpaceAttributes, StyleCategory, TransactionRecord, VerificationStatus,
};
use agora_ports::{AssetRegistry, Clock, FundsGateway, RegistryResult};
use agora_valuation::{Appraiser, MarketStatsStore};

use crate::config::MarketplaceConfig;
use crate::error::{MarketError, Result};
use crate::escrow::{FundPlan, FundStep};
use crate::events::MarketEvent;

/// A listing together with its optional auction and the category snapshot
/// used for market-statistics feedback
struct Record {
    listing: Listing,
    auction: Option<Auction>,
    category: StyleCategory,
}

/// Listing/auction state machine with escrow and fee settlement
pub struct MarketplaceEngine {
    registry: Arc<dyn AssetRegistry>,
    funds: Arc<dyn FundsGateway>,
    clock: Arc<dyn Clock>,
    stats: Arc<MarketStatsStore>,
    appraiser: Appraiser,
    config: MarketplaceConfig,
    fee: RwLock<FeePolicy>,
    records: DashMap<ListingId, Arc<Mutex<Record>>>,
    listed: DashMap<AssetId, ListingId>,
    history: RwLock<Vec<TransactionRecord>>,
    events: Option<mpsc::Sender<MarketEvent>>,
}

impl MarketplaceEngine {
    /// Create an engine wired to its collaborators
    pub fn new(
        registry: Arc<dyn AssetRegistry>,
        funds: Arc<dyn FundsGateway>,
        clock: Arc<dyn Clock>,
        stats: Arc<MarketStatsStore>,
        config: MarketplaceConfig,
    ) -> Result<Self> {
        let fee = FeePolicy::new(config.fee_rate).ok_or(MarketError::InvalidFeeRate(config.fee_rate))?;
        Ok(Self {
            registry,
            funds,
            clock,
            stats,
            appraiser: Appraiser::new(),
            config,
            fee: RwLock::new(fee),
            records: DashMap::new(),
            listed: DashMap::new(),
            history: RwLock::new(Vec::new()),
            events: None,
        })
    }

    /// Attach a best-effort event sink
    pub fn with_event_sink(mut self, sink: mpsc::Sender<MarketEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    // ============ Listings ============

    /// List an asset at a fixed price
    pub async fn create_listing(
        &self,
        asset_id: AssetId,
        seller: AccountId,
        price: Decimal,
    ) -> Result<Listing> {
        if price <= Decimal::ZERO {
            return Err(MarketError::InvalidPrice(price));
        }
        let (category, appraised) = self.prepare_listing(&asset_id, seller, price).await?;

        let listing =
            Listing::new_with_time(asset_id.clone(), seller, price, appraised, self.clock.now());
        self.claim_asset(&asset_id, listing.id)?;
        self.records.insert(
            listing.id,
            Arc::new(Mutex::new(Record {
                listing: listing.clone(),
                auction: None,
                category,
            })),
        );
        self.stats.listing_opened(category);

        info!(
            "listing {} created: asset={} seller={} price={} appraised={}",
            listing.id, listing.asset_id, seller, price, appraised
        );
        self.emit(MarketEvent::ListingCreated {
            listing_id: listing.id,
            asset_id,
            price,
        });
        Ok(listing)
    }

    /// List an asset for auction; the listing price is the start price
    pub async fn create_auction(
        &self,
        asset_id: AssetId,
        seller: AccountId,
        start_price: Decimal,
        reserve_price: Decimal,
        duration: Duration,
    ) -> Result<Listing> {
        if start_price <= Decimal::ZERO || reserve_price < start_price {
            return Err(MarketError::InvalidPrice(reserve_price));
        }
        if !self.config.duration_allowed(duration) {
            return Err(MarketError::InvalidDuration {
                hours: duration.num_hours(),
                min_hours: self.config.min_auction_duration.num_hours(),
                max_hours: self.config.max_auction_duration.num_hours(),
            });
        }
        let (category, appraised) = self.prepare_listing(&asset_id, seller, start_price).await?;

        let now = self.clock.now();
        let listing = Listing::new_with_time(asset_id.clone(), seller, start_price, appraised, now);
        let auction = Auction::new(listing.id, start_price, reserve_price, now + duration);
        let end_time = auction.end_time;

        self.claim_asset(&asset_id, listing.id)?;
        self.records.insert(
            listing.id,
            Arc::new(Mutex::new(Record {
                listing: listing.clone(),
                auction: Some(auction),
                category,
            })),
        );
        self.stats.listing_opened(category);

        info!(
            "auction {} created: asset={} start={} reserve={} ends={}",
            listing.id, listing.asset_id, start_price, reserve_price, end_time
        );
        self.emit(MarketEvent::AuctionCreated {
            listing_id: listing.id,
            end_time,
        });
        Ok(listing)
    }

    /// Change the asking price of an active fixed-price or auction listing
    pub async fn update_listing_price(
        &self,
        listing_id: ListingId,
        new_price: Decimal,
        caller: AccountId,
    ) -> Result<()> {
        let record = self.record(listing_id)?;
        let mut record = record.lock().await;

        if !record.listing.status.is_active() {
            return Err(MarketError::NotActive(listing_id));
        }
        if record.listing.seller != caller {
            return Err(MarketError::NotSeller);
        }
        if new_price <= Decimal::ZERO {
            return Err(MarketError::InvalidPrice(new_price));
        }

        record.listing.reprice(new_price, self.clock.now());
        debug!("listing {listing_id} repriced to {new_price}");
        self.emit(MarketEvent::PriceUpdated {
            listing_id,
            price: new_price,
        });
        Ok(())
    }

    /// Withdraw an active listing; seller or platform operator only
    ///
    /// An auction-backed listing refunds its standing bid before the
    /// listing transitions; a refund failure leaves everything active.
    pub async fn cancel_listing(&self, listing_id: ListingId, caller: AccountId) -> Result<()> {
        let record = self.record(listing_id)?;
        let mut record = record.lock().await;

        if !record.listing.status.is_active() {
            return Err(MarketError::NotActive(listing_id));
        }
        if caller != record.listing.seller && caller != self.config.operator {
            return Err(MarketError::Unauthorized);
        }

        if let Some(auction) = &record.auction {
            if let Some(bidder) = auction.highest_bidder {
                self.refund_from_escrow(bidder, auction.highest_bid).await?;
            }
        }

        let now = self.clock.now();
        if let Some(auction) = &mut record.auction {
            auction.status = AuctionStatus::Settled;
        }
        record.listing.close(ListingStatus::Cancelled, now);
        self.release_asset(&record.listing.asset_id);
        self.stats.listing_closed(record.category);

        info!("listing {listing_id} cancelled by {caller}");
        self.emit(MarketEvent::ListingCancelled { listing_id });
        Ok(())
    }

    /// Buy a fixed-price listing outright
    ///
    /// Settlement is atomic: escrow capture, seller payout, platform fee,
    /// overpayment refund, and the ownership transfer either all complete
    /// or are compensated, leaving the listing active.
    pub async fn buy_listing(
        &self,
        listing_id: ListingId,
        buyer: AccountId,
        payment: Decimal,
    ) -> Result<TransactionRecord> {
        let record = self.record(listing_id)?;
        let mut record = record.lock().await;

        if !record.listing.status.is_active() {
            return Err(MarketError::NotActive(listing_id));
        }
        if record.auction.is_some() {
            return Err(MarketError::HasAuction(listing_id));
        }
        if buyer == record.listing.seller {
            return Err(MarketError::SelfPurchase);
        }
        let price = record.listing.price;
        if payment < price {
            return Err(MarketError::InsufficientPayment {
                required: price,
                offered: payment,
            });
        }
        self.check_listed_invariant(&record)?;

        let seller = record.listing.seller;
        let split = self.fee.read().await.split(price);
        let escrow = self.funds.escrow_account();

        let mut plan = FundPlan::new(self.funds.clone(), self.config.collaborator_timeout);
        plan.step(FundStep::Pay {
            from: buyer,
            to: escrow,
            amount: payment,
        })
        .step(FundStep::Pay {
            from: escrow,
            to: seller,
            amount: split.seller_proceeds,
        })
        .step(FundStep::Pay {
            from: escrow,
            to: self.config.operator,
            amount: split.platform_fee,
        })
        .step(FundStep::Refund {
            to: buyer,
            amount: payment - price,
        });
        plan.execute().await?;

        if let Err(err) = self
            .registry_call(
                self.registry
                    .transfer(&record.listing.asset_id, seller, buyer),
            )
            .await
        {
            warn!("ownership transfer failed, rolling back sale of {listing_id}: {err}");
            plan.abort().await;
            return Err(err);
        }

        let tx = self.commit_sale(&mut record, buyer, price).await;
        info!(
            "listing {listing_id} sold: buyer={} price={} seller_proceeds={} platform_fee={}",
            buyer, price, split.seller_proceeds, split.platform_fee
        );
        self.emit(MarketEvent::ListingSold {
            listing_id,
            buyer,
            price,
        });
        Ok(tx)
    }

    // ============ Auctions ============

    /// Place a bid on an active auction
    ///
    /// The incoming bid is escrowed first; the previous highest bid is
    /// refunded in full before the new bid is recorded, so an outbid
    /// bidder's funds are never held past being outbid.
    pub async fn place_bid(
        &self,
        listing_id: ListingId,
        bidder: AccountId,
        amount: Decimal,
    ) -> Result<()> {
        let record = self.record(listing_id)?;
        let mut record = record.lock().await;
        let Record {
            listing, auction, ..
        } = &mut *record;
        let auction = auction.as_mut().ok_or(MarketError::NoAuction(listing_id))?;

        if !listing.status.is_active() || auction.status != AuctionStatus::Active {
            return Err(MarketError::NotActive(listing_id));
        }
        if auction.has_ended(self.clock.now()) {
            return Err(MarketError::AuctionEnded);
        }
        if bidder == listing.seller {
            return Err(MarketError::SelfBid);
        }
        let minimum = auction.minimum_next_bid(self.config.min_bid_increment);
        if amount < minimum {
            return Err(MarketError::BidTooLow {
                minimum,
                offered: amount,
            });
        }

        let mut plan = FundPlan::new(self.funds.clone(), self.config.collaborator_timeout);
        plan.step(FundStep::Pay {
            from: bidder,
            to: self.funds.escrow_account(),
            amount,
        });
        plan.execute().await?;

        if let Some(previous_bidder) = auction.highest_bidder {
            let previous_amount = auction.highest_bid;
            if let Err(err) = self.refund_from_escrow(previous_bidder, previous_amount).await {
                warn!("refund of outbid {previous_bidder} failed, releasing new bid: {err}");
                plan.abort().await;
                return Err(err);
            }
            debug!("outbid {previous_bidder} refunded {previous_amount}");
        }

        auction.record_bid(bidder, amount);
        info!("bid on {listing_id}: bidder={bidder} amount={amount}");
        self.emit(MarketEvent::BidPlaced {
            listing_id,
            bidder,
            amount,
        });
        Ok(())
    }

    /// Conclude an auction
    ///
    /// Anyone may end an auction whose time has passed; the platform
    /// operator may force-end early. Reserve met settles as a sale using
    /// the escrowed highest bid; otherwise the bid is refunded, the listing
    /// cancelled, and no transaction recorded.
    pub async fn end_auction(
        &self,
        listing_id: ListingId,
        caller: AccountId,
    ) -> Result<Option<TransactionRecord>> {
        let record = self.record(listing_id)?;
        let mut record = record.lock().await;

        let auction_view = {
            let auction = record
                .auction
                .as_ref()
                .ok_or(MarketError::NoAuction(listing_id))?;
            if !record.listing.status.is_active() || auction.status != AuctionStatus::Active {
                return Err(MarketError::NotActive(listing_id));
            }
            let now = self.clock.now();
            if now < auction.end_time && caller != self.config.operator {
                return Err(MarketError::TooEarly {
                    ends_at: auction.end_time,
                });
            }
            auction.clone()
        };
        self.check_listed_invariant(&record)?;
        if auction_view.reserve_met() {
            let buyer = auction_view
                .highest_bidder
                .ok_or_else(|| MarketError::Internal("reserve met without a bidder".to_string()))?;
            let price = auction_view.highest_bid;
            let seller = record.listing.seller;
            let split = self.fee.read().await.split(price);
            let escrow = self.funds.escrow_account();

            // The winning bid is already on escrow; only disburse
            let mut plan = FundPlan::new(self.funds.clone(), self.config.collaborator_timeout);
            plan.step(FundStep::Pay {
                from: escrow,
                to: seller,
                amount: split.seller_proceeds,
            })
            .step(FundStep::Pay {
                from: escrow,
                to: self.config.operator,
                amount: split.platform_fee,
            });
            plan.execute().await?;

            if let Err(err) = self
                .registry_call(
                    self.registry
                        .transfer(&record.listing.asset_id, seller, buyer),
                )
                .await
            {
                warn!("ownership transfer failed, rolling back auction {listing_id}: {err}");
                plan.abort().await;
                return Err(err);
            }

            if let Some(auction) = &mut record.auction {
                auction.status = AuctionStatus::Settled;
            }
            let tx = self.commit_sale(&mut record, buyer, price).await;
            info!(
                "auction {listing_id} settled: winner={} price={} seller_proceeds={} platform_fee={}",
                buyer, price, split.seller_proceeds, split.platform_fee
            );
            self.emit(MarketEvent::AuctionSettled {
                listing_id,
                sold: true,
            });
            self.emit(MarketEvent::ListingSold {
                listing_id,
                buyer,
                price,
            });
            Ok(Some(tx))
        } else {
            // No bids or reserve unmet: hand the bid back and unlist
            if let Some(bidder) = auction_view.highest_bidder {
                self.refund_from_escrow(bidder, auction_view.highest_bid)
                    .await?;
                debug!(
                    "auction {listing_id} missed reserve; refunded {} to {bidder}",
                    auction_view.highest_bid
                );
            }

            let now = self.clock.now();
            if let Some(auction) = &mut record.auction {
                auction.status = AuctionStatus::Settled;
            }
            record.listing.close(ListingStatus::Cancelled, now);
            self.release_asset(&record.listing.asset_id);
            self.stats.listing_closed(record.category);

            info!("auction {listing_id} settled without sale");
            self.emit(MarketEvent::AuctionSettled {
                listing_id,
                sold: false,
            });
            Ok(None)
        }
    }

    // ============ Reads ============

    pub async fn get_listing(&self, listing_id: ListingId) -> Option<Listing> {
        let record = self.records.get(&listing_id).map(|r| Arc::clone(&r))?;
        let record = record.lock().await;
        Some(record.listing.clone())
    }

    pub async fn get_auction(&self, listing_id: ListingId) -> Option<Auction> {
        let record = self.records.get(&listing_id).map(|r| Arc::clone(&r))?;
        let record = record.lock().await;
        record.auction.clone()
    }

    /// Audit trail entries for one listing
    pub async fn transaction_history(&self, listing_id: ListingId) -> Vec<TransactionRecord> {
        self.history
            .read()
            .await
            .iter()
            .filter(|tx| tx.listing_id == listing_id)
            .cloned()
            .collect()
    }

    /// The full append-only audit trail
    pub async fn full_history(&self) -> Vec<TransactionRecord> {
        self.history.read().await.clone()
    }

    pub fn is_listed(&self, asset_id: &AssetId) -> bool {
        self.listed.contains_key(asset_id)
    }

    // ============ Fee management ============

    /// Change the platform fee rate; applies to all future settlements
    pub async fn set_fee_rate(&self, rate: Decimal) -> Result<()> {
        let policy = FeePolicy::new(rate).ok_or(MarketError::InvalidFeeRate(rate))?;
        *self.fee.write().await = policy;
        info!("platform fee rate set to {rate}");
        Ok(())
    }

    pub async fn fee_rate(&self) -> Decimal {
        self.fee.read().await.rate()
    }

    // ============ Internals ============

    /// Ownership check, attribute fetch, and appraisal shared by both
    /// listing forms
    async fn prepare_listing(
        &self,
        asset_id: &AssetId,
        seller: AccountId,
        price: Decimal,
    ) -> Result<(StyleCategory, Decimal)> {
        if self.listed.contains_key(asset_id) {
            return Err(MarketError::AlreadyListed(asset_id.clone()));
        }
        let owner = self.registry_call(self.registry.owner_of(asset_id)).await?;
        if owner != seller {
            return Err(MarketError::NotOwner(asset_id.clone()));
        }
        let attrs = self.registry_call(self.registry.attributes(asset_id)).await?;
        let verification = self
            .registry_call(self.registry.verification(asset_id))
            .await?;

        let category = attrs.as_ref().map(|a| a.style).unwrap_or_default();
        let appraised = self.appraise(price, attrs.as_ref(), verification);
        Ok((category, appraised))
    }

    /// Appraisal snapshot for a new listing
    ///
    /// Verified spaces take a fixed premium over the listing price; for the
    /// rest the appraiser estimates from attributes and market history, and
    /// a registry with no attribute capability falls back to the price.
    fn appraise(
        &self,
        price: Decimal,
        attrs: Option<&SpaceAttributes>,
        verification: Option<VerificationStatus>,
    ) -> Decimal {
        if matches!(verification, Some(VerificationStatus::Verified)) {
            return (price * (Decimal::ONE + self.config.verified_premium)).round_dp(2);
        }
        match attrs {
            Some(attrs) => {
                let snapshot = self.stats.snapshot(attrs.style);
                self.appraiser.assess(attrs, &snapshot).value
            }
            None => price,
        }
    }

    /// Claim the per-asset listed flag in one atomic check-and-set
    fn claim_asset(&self, asset_id: &AssetId, listing_id: ListingId) -> Result<()> {
        match self.listed.entry(asset_id.clone()) {
            Entry::Occupied(_) => Err(MarketError::AlreadyListed(asset_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(listing_id);
                Ok(())
            }
        }
    }

    fn release_asset(&self, asset_id: &AssetId) {
        if self.listed.remove(asset_id).is_none() {
            error!("listed flag for {asset_id} was already released");
        }
    }

    /// Settlement pre-flight: an active record must still hold its asset
    /// flag; anything else means a double settlement is in progress
    fn check_listed_invariant(&self, record: &Record) -> Result<()> {
        match self.listed.get(&record.listing.asset_id) {
            Some(current) if *current == record.listing.id => Ok(()),
            _ => {
                error!(
                    "listing {} is active but asset {} flag is inconsistent; aborting settlement",
                    record.listing.id, record.listing.asset_id
                );
                Err(MarketError::Internal(format!(
                    "asset flag inconsistent for listing {}",
                    record.listing.id
                )))
            }
        }
    }

    /// Commit a completed settlement: terminal state, audit record, and
    /// exactly one statistics event
    async fn commit_sale(
        &self,
        record: &mut Record,
        buyer: AccountId,
        price: Decimal,
    ) -> TransactionRecord {
        let now = self.clock.now();
        let seller = record.listing.seller;
        record.listing.close(ListingStatus::Sold, now);
        self.release_asset(&record.listing.asset_id);
        self.stats.listing_closed(record.category);

        let tx = TransactionRecord::new(record.listing.id, seller, buyer, price, now);
        self.history.write().await.push(tx.clone());
        self.stats.apply(&SettlementEvent {
            category: record.category,
            price,
            timestamp: now,
        });
        tx
    }

    fn record(&self, listing_id: ListingId) -> Result<Arc<Mutex<Record>>> {
        self.records
            .get(&listing_id)
            .map(|r| Arc::clone(&r))
            .ok_or(MarketError::NotFound(listing_id))
    }

    async fn registry_call<T>(
        &self,
        call: impl Future<Output = RegistryResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.collaborator_timeout, call).await {
            Ok(result) => result.map_err(MarketError::from),
            Err(_) => Err(MarketError::RegistryUnavailable(
                "registry timed out".to_string(),
            )),
        }
    }

    async fn refund_from_escrow(&self, to: AccountId, amount: Decimal) -> Result<()> {
        match tokio::time::timeout(self.config.collaborator_timeout, self.funds.refund(to, amount))
            .await
        {
            Ok(result) => result.map_err(MarketError::from),
            Err(_) => Err(MarketError::PaymentFailed(
                "funds collaborator timed out".to_string(),
            )),
        }
    }

    fn emit(&self, event: MarketEvent) {
        if let Some(sink) = &self.events {
            if let Err(err) = sink.try_send(event) {
                warn!("event sink dropped a market event: {err}");
            }
        }
    }
}
