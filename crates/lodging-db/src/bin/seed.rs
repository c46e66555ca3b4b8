//! # Seed Data Generator
//!
//! Populates an empty database with the campground's sites, pricing rules,
//! coupons and settings for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by LODGING_DATABASE_PATH (default ./lodging.db)
//! cargo run -p lodging-db --bin seed
//!
//! # Specify database path
//! cargo run -p lodging-db --bin seed -- --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - Nine RV pads ($65 - $80 a night) and the rental house ($150)
//! - Weekend, weekly, summer and fall pricing rules
//! - `WELCOME2025`, `LONGSTAY` and `EARLYBIRD` coupons
//! - 9.25% tax, 50% deposit

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::Parser;
use lodging_core::{
    Coupon, CouponDiscount, Money, Percent, PricingRule, RuleCondition, RuleScope, Settings, Site,
    SiteKind, SiteStatus,
};
use lodging_db::{init_tracing, Database, StoreConfig};
use tracing::{info, warn};
use uuid::Uuid;

/// (number, name, nightly dollars, max occupancy, description)
const RV_SITES: &[(i64, &str, i64, u32, &str)] = &[
    (1, "Riverside Retreat", 75, 6, "Pull-through pad on the riverbank"),
    (2, "Mountain View Haven", 70, 6, "Back-in pad facing the ridge"),
    (3, "Creekside Oasis", 68, 4, "Shaded pad beside the creek"),
    (4, "Sunset Point", 80, 6, "Corner pad with the western view"),
    (5, "Forest Edge Escape", 65, 4, "Quiet pad backing onto the woods"),
    (6, "Riverside Family Site", 72, 6, "Wide pad with room for a second tent"),
    (7, "Fisherman's Paradise", 73, 4, "Steps from the fishing access"),
    (8, "Scenic Bluff View", 78, 6, "Raised pad above the bend"),
    (9, "Tranquil Cove", 67, 4, "End-of-loop pad by the cove"),
];

const RV_AMENITIES: &[&str] = &["Water", "Sewer", "30/50A Power", "Wi-Fi", "Fire Ring"];

/// Seed a development database.
#[derive(Debug, Parser)]
#[command(name = "seed", about = "Lodging engine seed data generator")]
struct Args {
    /// Database file path (overrides LODGING_DATABASE_PATH)
    #[arg(short, long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = StoreConfig::from_env()?.db;
    if let Some(path) = args.db {
        config.database_path = path;
    }

    info!(path = %config.database_path.display(), "Seeding database");
    let db = Database::new(config).await?;

    let existing = db.sites().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has sites, skipping seed");
        return Ok(());
    }

    let now = Utc::now();
    for site in sites(now) {
        db.sites().insert(&site).await?;
    }
    info!(count = RV_SITES.len() + 1, "Sites inserted");

    let rules = pricing_rules()?;
    for rule in &rules {
        db.pricing_rules().insert(rule).await?;
    }
    info!(count = rules.len(), "Pricing rules inserted");

    let coupons = coupons()?;
    for coupon in &coupons {
        db.coupons().insert(coupon).await?;
    }
    info!(count = coupons.len(), "Coupons inserted");

    db.settings()
        .upsert(&Settings {
            tax_rate: Percent::from_bps(925),
            deposit_percentage: Percent::from_bps(5000),
        })
        .await?;

    info!("Seed complete");
    db.close().await;
    Ok(())
}

fn sites(now: DateTime<Utc>) -> Vec<Site> {
    let mut sites: Vec<Site> = RV_SITES
        .iter()
        .map(|&(number, name, dollars, max_occupancy, description)| Site {
            id: format!("site-{number}"),
            site_number: number,
            name: name.to_string(),
            kind: SiteKind::Rv,
            description: description.to_string(),
            base_price: Money::from_dollars(dollars),
            max_occupancy,
            status: SiteStatus::Active,
            amenities: RV_AMENITIES.iter().map(|a| a.to_string()).collect(),
            features: vec!["Gravel Pad".to_string(), "Picnic Table".to_string()],
            created_at: now,
            updated_at: now,
        })
        .collect();

    sites.push(Site {
        id: "site-10".to_string(),
        site_number: 10,
        name: "Tittle River House".to_string(),
        kind: SiteKind::Airbnb,
        description: "Three-bedroom house on the river".to_string(),
        base_price: Money::from_dollars(150),
        max_occupancy: 8,
        status: SiteStatus::Active,
        amenities: vec![
            "Kitchen".to_string(),
            "Wi-Fi".to_string(),
            "Washer/Dryer".to_string(),
            "Hot Tub".to_string(),
        ],
        features: vec!["River Access".to_string(), "Deck".to_string()],
        created_at: now,
        updated_at: now,
    });

    sites
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {year}-{month}-{day}"))
}

fn rule(
    name: &str,
    condition: RuleCondition,
    discount_bps: i32,
    priority: i32,
) -> PricingRule {
    PricingRule {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        scope: RuleScope::AllSites,
        condition,
        discount: Some(Percent::from_bps(discount_bps)),
        price_override: None,
        priority,
        active: true,
    }
}

fn pricing_rules() -> Result<Vec<PricingRule>, String> {
    Ok(vec![
        // Negative discount is a surcharge.
        rule(
            "Weekend Premium",
            RuleCondition::DayOfWeek { days_of_week: vec![5, 6] },
            -1000,
            5,
        ),
        rule(
            "Weekly Stay Discount",
            RuleCondition::LengthOfStay { minimum_nights: 7 },
            1500,
            3,
        ),
        rule(
            "Summer Peak Season",
            RuleCondition::Seasonal {
                start_date: date(2025, 6, 1)?,
                end_date: date(2025, 8, 31)?,
            },
            -2000,
            8,
        ),
        rule(
            "Fall Special",
            RuleCondition::Seasonal {
                start_date: date(2025, 10, 1)?,
                end_date: date(2025, 11, 30)?,
            },
            1000,
            6,
        ),
    ])
}

fn instant(year: i32, month: u32, day: u32, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    let (h, m, s) = if end_of_day { (23, 59, 59) } else { (0, 0, 0) };
    Utc.with_ymd_and_hms(year, month, day, h, m, s)
        .single()
        .ok_or_else(|| format!("invalid instant {year}-{month}-{day}"))
}

fn coupons() -> Result<Vec<Coupon>, String> {
    let coupon = |code: &str,
                  description: &str,
                  discount: CouponDiscount,
                  window: (DateTime<Utc>, DateTime<Utc>),
                  usage_limit: u32,
                  minimum_stay: u32| Coupon {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        description: description.to_string(),
        discount,
        valid_from: window.0,
        valid_until: window.1,
        usage_limit: Some(usage_limit),
        used_count: 0,
        minimum_stay: Some(minimum_stay),
        active: true,
    };

    let year = (instant(2025, 1, 1, false)?, instant(2025, 12, 31, true)?);

    Ok(vec![
        coupon(
            "WELCOME2025",
            "10% off your first stay",
            CouponDiscount::Percentage(Percent::from_bps(1000)),
            year,
            100,
            2,
        ),
        coupon(
            "LONGSTAY",
            "20% off stays of two weeks or more",
            CouponDiscount::Percentage(Percent::from_bps(2000)),
            year,
            50,
            14,
        ),
        coupon(
            "EARLYBIRD",
            "$25 off when booked before spring",
            CouponDiscount::Fixed(Money::from_dollars(25)),
            (instant(2025, 1, 1, false)?, instant(2025, 3, 31, true)?),
            30,
            3,
        ),
    ])
}
