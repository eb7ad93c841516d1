use chrono::{DateTime, Months, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::subscription_model::{CreatedSubscription, PlanInfo, SubscriptionType};

/// Pricing, duration and feature set of one subscription tier.
pub trait SubscriptionStrategy: Send + Sync {
    fn tier(&self) -> SubscriptionType;

    fn name(&self) -> &'static str;

    fn price(&self) -> f64;

    /// Human-readable billing period.
    fn duration(&self) -> &'static str;

    fn end_date(&self, start: DateTime<Utc>) -> DateTime<Utc>;

    fn features(&self) -> &'static [&'static str];

    /// Whether a user already holding an active subscription of this tier
    /// may take out another one.
    fn allows_renewal(&self) -> bool {
        true
    }

    fn plan_info(&self) -> PlanInfo {
        PlanInfo {
            plan_type: self.tier(),
            name: self.name().to_string(),
            price: self.price(),
            duration: self.duration().to_string(),
            features: self.features().iter().map(|f| f.to_string()).collect(),
        }
    }
}

fn add_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub struct FreeSubscription;

impl SubscriptionStrategy for FreeSubscription {
    fn tier(&self) -> SubscriptionType {
        SubscriptionType::Free
    }

    fn name(&self) -> &'static str {
        "Free Plan"
    }

    fn price(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> &'static str {
        "Always free"
    }

    // never expires; a century out stands in for "forever"
    fn end_date(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        add_months(start, 100 * 12)
    }

    fn features(&self) -> &'static [&'static str] {
        &[
            "Access to limited basic courses",
            "Community support",
            "No certificates",
            "Limited content",
        ]
    }

    fn allows_renewal(&self) -> bool {
        false
    }
}

pub struct MonthlySubscription;

impl SubscriptionStrategy for MonthlySubscription {
    fn tier(&self) -> SubscriptionType {
        SubscriptionType::Monthly
    }

    fn name(&self) -> &'static str {
        "Premium Monthly Plan"
    }

    fn price(&self) -> f64 {
        9.99
    }

    fn duration(&self) -> &'static str {
        "per month"
    }

    fn end_date(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        add_months(start, 1)
    }

    fn features(&self) -> &'static [&'static str] {
        &[
            "Access to all basic courses",
            "Access to monthly premium courses",
            "Email support",
            "Completion certificates",
        ]
    }
}

pub struct AnnualSubscription;

impl SubscriptionStrategy for AnnualSubscription {
    fn tier(&self) -> SubscriptionType {
        SubscriptionType::Annual
    }

    fn name(&self) -> &'static str {
        "Premium Annual Plan"
    }

    fn price(&self) -> f64 {
        99.99
    }

    fn duration(&self) -> &'static str {
        "per year (2 months free)"
    }

    fn end_date(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        add_months(start, 12)
    }

    fn features(&self) -> &'static [&'static str] {
        &[
            "Access to all premium courses",
            "Priority 24/7 support",
            "Completion certificates",
            "Access to exclusive content",
            "Personal mentoring",
            "Discounts on additional courses",
        ]
    }
}

pub fn strategy_for(tier: SubscriptionType) -> &'static dyn SubscriptionStrategy {
    match tier {
        SubscriptionType::Free => &FreeSubscription,
        SubscriptionType::Monthly => &MonthlySubscription,
        SubscriptionType::Annual => &AnnualSubscription,
    }
}

pub fn all_plans() -> Vec<PlanInfo> {
    SubscriptionType::ALL
        .iter()
        .map(|tier| strategy_for(*tier).plan_info())
        .collect()
}

/// Holds the strategy picked for a request and runs creation through it.
pub struct SubscriptionContext {
    strategy: &'static dyn SubscriptionStrategy,
}

impl SubscriptionContext {
    pub fn new(tier: SubscriptionType) -> Self {
        SubscriptionContext {
            strategy: strategy_for(tier),
        }
    }

    /// Selects the strategy from a request's `type` field.
    pub fn for_type(name: &str) -> AppResult<Self> {
        name.parse::<SubscriptionType>()
            .map(Self::new)
            .map_err(|_| AppError::bad_request("Unsupported subscription type"))
    }

    pub fn set_strategy(&mut self, tier: SubscriptionType) {
        self.strategy = strategy_for(tier);
    }

    pub fn strategy(&self) -> &'static dyn SubscriptionStrategy {
        self.strategy
    }

    pub fn plan_info(&self) -> PlanInfo {
        self.strategy.plan_info()
    }

    pub async fn create(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        start: Option<DateTime<Utc>>,
    ) -> AppResult<CreatedSubscription> {
        let start = start.unwrap_or_else(Utc::now);
        let subscription = db::subscriptions::create(pool, self.strategy, user_id, start).await?;

        log::info!(
            "Created {} subscription {} for user {}",
            self.strategy.tier(),
            subscription.subscription.id,
            user_id
        );

        Ok(CreatedSubscription {
            subscription,
            price: self.strategy.price(),
            features: self.strategy.features().iter().map(|f| f.to_string()).collect(),
        })
    }
}
