//! Campaigns built from deployment manifests.

mod common;

use common::*;
use presale_settlement::Campaign;
use presale_types::*;

const COUPON_SALE: &str = r#"{
    "name": "coupon drop",
    "token_decimals": 0,
    "admin": "00000000-0000-0000-0000-000000000001",
    "sale_account": "00000000-0000-0000-0000-000000000002",
    "presale_max": "10",
    "begin_time": "2025-01-01T00:00:00Z",
    "end_time": "2025-12-31T23:59:59Z",
    "per_min_buy": "1",
    "per_max_buy": "3",
    "limit_buy": "5",
    "prices": [
        { "currency": "secondary", "decimals": 0, "unit_price": "500" },
        { "currency": "stable", "decimals": 2, "unit_price": "1.25" }
    ],
    "payees": [
        { "account": "00000000-0000-0000-0000-00000000000a", "percentage": 20 },
        { "account": "00000000-0000-0000-0000-00000000000b", "percentage": 80 }
    ],
    "charge_mode": "exact_cost",
    "vesting": {
        "lock_start": "2026-01-01T00:00:00Z",
        "lock_duration_secs": 900,
        "tranche_count": 3,
        "release_ratio": 50
    }
}"#;

fn coupon_sale() -> Sale {
    init_tracing();
    let manifest = CampaignManifest::from_json_str(COUPON_SALE).expect("manifest parses");
    let id = manifest.campaign_id();
    let config = manifest.into_config().expect("manifest is consistent");
    let mut ledger = presale_ingress::MemoryLedger::new();
    ledger.mint(Asset::SaleToken, sale_account(), config.presale_max);
    Sale {
        campaign: Campaign::new(id, config).expect("campaign builds"),
        ledger,
    }
}

#[test]
fn e2e_manifest_drives_item_sale() {
    let mut sale = coupon_sale();
    assert_eq!(sale.campaign.id(), CampaignId::from_name("coupon drop"));
    assert_eq!(sale.campaign.config().admin, admin());
    assert_eq!(sale.campaign.config().payees.len(), 2);

    let alice = buyer(1);
    sale.fund(alice, Currency::Secondary, 10_000);
    sale.fund(alice, Currency::Stable, 10_000);

    // 1400 at 500 each buys 2 coupons for exactly 1000.
    let order = sale.buy(1, alice, Currency::Secondary, 1_400).unwrap();
    assert_eq!(order.credited_amount, 2);
    assert_eq!(order.paid_amount, 1_000);
    assert_eq!(order.locked_amount, 1);
    assert_eq!(sale.balance(Currency::Secondary, alice), 9_000);
    assert_eq!(sale.balance(Currency::Secondary, payee_a()), 200);
    assert_eq!(sale.balance(Currency::Secondary, payee_b()), 800);
    assert_eq!(sale.tokens(alice), 1);

    // 1.25 with two decimals is 125 base units per coupon.
    let order = sale.buy(2, alice, Currency::Stable, 400).unwrap();
    assert_eq!(order.credited_amount, 3);
    assert_eq!(order.paid_amount, 375);

    // Five coupons bought; the per-account limit is reached.
    assert_eq!(
        sale.buy(3, alice, Currency::Secondary, 500).unwrap_err(),
        PresaleError::AccountLimitExceeded {
            requested: 1,
            remaining: 0
        }
    );

    let end = sale.campaign.lock_schedule().unwrap().lock_end();
    let locked = sale.campaign.claimable_of(alice, end);
    assert_eq!(locked, sale.campaign.totals().total_locked);
    sale.claim(4, alice, locked, end).unwrap();
    assert_eq!(sale.tokens(alice), 5);
    sale.campaign.verify_conservation().unwrap();
}

#[test]
fn e2e_inconsistent_manifest_rejected() {
    let broken = COUPON_SALE.replace("\"percentage\": 80", "\"percentage\": 70");
    let manifest = CampaignManifest::from_json_str(&broken).unwrap();
    assert!(matches!(
        manifest.into_config().unwrap_err(),
        PresaleError::InvalidPayees { .. }
    ));

    let inverted = COUPON_SALE.replace("\"limit_buy\": \"5\"", "\"limit_buy\": \"2\"");
    let manifest = CampaignManifest::from_json_str(&inverted).unwrap();
    assert!(matches!(
        manifest.into_config().unwrap_err(),
        PresaleError::InvalidConfig { .. }
    ));

    assert!(matches!(
        CampaignManifest::from_json_str("{ not json").unwrap_err(),
        PresaleError::Configuration(_)
    ));
    assert!(matches!(
        CampaignManifest::from_path("/nonexistent/presale/manifest.json").unwrap_err(),
        PresaleError::Io(_)
    ));
}
