use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::user_model::UserSummary;

/// Subscription tier. Declaration order is the access order: a tier grants
/// everything the tiers before it grant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
)]
#[sqlx(type_name = "subscription_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionType {
    #[default]
    Free,
    Monthly,
    Annual,
}

impl SubscriptionType {
    pub const ALL: [SubscriptionType; 3] = [
        SubscriptionType::Free,
        SubscriptionType::Monthly,
        SubscriptionType::Annual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Free => "FREE",
            SubscriptionType::Monthly => "MONTHLY",
            SubscriptionType::Annual => "ANNUAL",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq)]
pub struct UnknownSubscriptionType(pub String);

impl FromStr for SubscriptionType {
    type Err = UnknownSubscriptionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(SubscriptionType::Free),
            "MONTHLY" => Ok(SubscriptionType::Monthly),
            "ANNUAL" => Ok(SubscriptionType::Annual),
            _ => Err(UnknownSubscriptionType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub subscription_type: SubscriptionType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Active, already started and not yet past its end date.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.active && self.start_date <= now && self.end_date > now
    }
}

/// Join row: a subscription plus the owning user's name and email.
#[derive(Debug, sqlx::FromRow)]
pub struct SubscriptionUserRow {
    #[sqlx(flatten)]
    pub subscription: Subscription,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionWithUser {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub user: UserSummary,
}

impl From<SubscriptionUserRow> for SubscriptionWithUser {
    fn from(row: SubscriptionUserRow) -> Self {
        let user = UserSummary {
            id: row.subscription.user_id,
            name: row.user_name,
            email: row.user_email,
        };
        SubscriptionWithUser {
            subscription: row.subscription,
            user,
        }
    }
}

/// Response of a successful subscription creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedSubscription {
    #[serde(flatten)]
    pub subscription: SubscriptionWithUser,
    pub price: f64,
    pub features: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    /// `free`, `monthly` or `annual` (case-insensitive).
    #[serde(rename = "type")]
    pub subscription_type: String,
    pub user_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    #[serde(rename = "type")]
    pub plan_type: SubscriptionType,
    pub name: String,
    pub price: f64,
    pub duration: String,
    pub features: Vec<String>,
}

/// Per-tier counters, serialized with the tier names as keys.
#[derive(Debug, Default, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub struct TierCounts {
    pub free: i64,
    pub monthly: i64,
    pub annual: i64,
}

impl TierCounts {
    pub fn add(&mut self, tier: SubscriptionType, count: i64) {
        match tier {
            SubscriptionType::Free => self.free += count,
            SubscriptionType::Monthly => self.monthly += count,
            SubscriptionType::Annual => self.annual += count,
        }
    }

    pub fn get(&self, tier: SubscriptionType) -> i64 {
        match tier {
            SubscriptionType::Free => self.free,
            SubscriptionType::Monthly => self.monthly,
            SubscriptionType::Annual => self.annual,
        }
    }
}

impl FromIterator<(SubscriptionType, i64)> for TierCounts {
    fn from_iter<I: IntoIterator<Item = (SubscriptionType, i64)>>(iter: I) -> Self {
        let mut counts = TierCounts::default();
        for (tier, count) in iter {
            counts.add(tier, count);
        }
        counts
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    pub total_subscriptions: i64,
    pub active_subscriptions: i64,
    pub by_type: TierCounts,
    pub monthly_revenue: f64,
    pub yearly_revenue: f64,
}
