//! Shared harness for the settlement integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use presale_ingress::{AssetLedger, MemoryLedger};
use presale_settlement::{Campaign, ClaimRequest, PurchaseRequest};
use presale_types::*;
use tracing_subscriber::EnvFilter;

/// Route engine logs through the test writer; `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn admin() -> AccountId {
    AccountId::from_u128(1)
}

pub fn sale_account() -> AccountId {
    AccountId::from_u128(2)
}

pub fn payee_a() -> AccountId {
    AccountId::from_u128(10)
}

pub fn payee_b() -> AccountId {
    AccountId::from_u128(11)
}

pub fn buyer(n: u128) -> AccountId {
    AccountId::from_u128(1_000 + n)
}

pub fn mid_sale() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn lock_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// `k` whole 100-second tranches after [`lock_start`].
pub fn after_tranches(k: i64) -> DateTime<Utc> {
    lock_start() + chrono::Duration::seconds(100 * k)
}

/// Cap 1000, 20/80 payee split, stable 4:1, native 125:2, secondary at
/// 500 per token.
pub fn config() -> CampaignConfig {
    let payees = PayeeSet::new(vec![Payee::new(payee_a(), 20), Payee::new(payee_b(), 80)])
        .expect("valid payees");
    let mut cfg = CampaignConfig::fixture(admin(), sale_account(), payees);
    cfg.ratios.insert(
        Currency::Native,
        ConversionRatio::new(Currency::Native, 125, 2).unwrap(),
    );
    cfg.ratios.insert(
        Currency::Secondary,
        ConversionRatio::unit_price(Currency::Secondary, 500).unwrap(),
    );
    cfg
}

/// 900 seconds in 9 tranches from [`lock_start`].
pub fn vesting(release_ratio: u32) -> VestingConfig {
    VestingConfig {
        lock_start: lock_start(),
        lock_duration_secs: 900,
        tranche_count: 9,
        release_ratio,
    }
}

/// [`config`] with vesting, and one account allowed to take the whole cap.
pub fn vesting_config(release_ratio: u32) -> CampaignConfig {
    let mut cfg = config();
    cfg.per_max_buy = 1_000;
    cfg.limit_buy = 1_000;
    cfg.vesting = Some(vesting(release_ratio));
    cfg
}

/// A campaign plus the asset ledger it settles against.
pub struct Sale {
    pub campaign: Campaign,
    pub ledger: MemoryLedger,
}

impl Sale {
    /// Sale account stocked with the full cap.
    pub fn new(config: CampaignConfig) -> Self {
        let inventory = config.presale_max;
        Self::with_inventory(config, inventory)
    }

    pub fn with_inventory(config: CampaignConfig, inventory: Amount) -> Self {
        init_tracing();
        let campaign = Campaign::new(CampaignId::from_name("test sale"), config)
            .expect("campaign config should be valid");
        let mut ledger = MemoryLedger::new();
        ledger.mint(Asset::SaleToken, sale_account(), inventory);
        Self { campaign, ledger }
    }

    /// Mint `amount` of `currency` to `account` and approve the sale account.
    pub fn fund(&mut self, account: AccountId, currency: Currency, amount: Amount) {
        self.ledger.mint(currency, account, amount);
        self.ledger
            .approve(currency, account, sale_account(), amount);
    }

    pub fn buy(
        &mut self,
        order_id: u64,
        account: AccountId,
        currency: Currency,
        paid: Amount,
    ) -> Result<Order> {
        self.buy_at(order_id, account, currency, paid, mid_sale())
    }

    pub fn buy_at(
        &mut self,
        order_id: u64,
        account: AccountId,
        currency: Currency,
        paid: Amount,
        now: DateTime<Utc>,
    ) -> Result<Order> {
        self.campaign.buy(
            &mut self.ledger,
            PurchaseRequest::new(order_id, account, currency, paid),
            now,
        )
    }

    pub fn claim(
        &mut self,
        order_id: u64,
        account: AccountId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<DeblockRecord> {
        self.campaign.claim(
            &mut self.ledger,
            ClaimRequest::new(order_id, account, amount),
            now,
        )
    }

    pub fn tokens(&self, account: AccountId) -> Amount {
        self.ledger.balance_of(Asset::SaleToken, account)
    }

    pub fn balance(&self, currency: Currency, account: AccountId) -> Amount {
        self.ledger.balance_of(Asset::from(currency), account)
    }
}
