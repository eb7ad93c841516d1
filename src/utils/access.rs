//! Subscription-tier access control for course content.
//!
//! A viewer may read a course when their effective tier is at least the
//! course's required tier. Viewers without a current subscription (and
//! anonymous viewers) are treated as FREE.

use crate::models::course_model::{AccessLevelInfo, CourseDetails, CourseView};
use crate::models::subscription_model::SubscriptionType;

pub const RESTRICTED_CONTENT: &str = "Restricted content - subscription required";

pub fn can_access(user_tier: SubscriptionType, required: SubscriptionType) -> bool {
    user_tier >= required
}

/// Every tier whose courses `user_tier` unlocks, lowest first.
pub fn accessible_tiers(user_tier: SubscriptionType) -> Vec<SubscriptionType> {
    SubscriptionType::ALL
        .iter()
        .copied()
        .filter(|tier| can_access(user_tier, *tier))
        .collect()
}

pub fn access_level_info(tier: SubscriptionType) -> AccessLevelInfo {
    let (level, icon, description) = match tier {
        SubscriptionType::Free => ("Free", "🆓", "Available to every registered user"),
        SubscriptionType::Monthly => ("Premium", "⭐", "Requires a monthly or annual subscription"),
        SubscriptionType::Annual => ("Premium Plus", "💎", "Requires an annual subscription"),
    };
    AccessLevelInfo {
        level: level.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
    }
}

pub fn course_view(mut details: CourseDetails, user_tier: SubscriptionType) -> CourseView {
    let required = details.course.subscription_required;
    let has_access = can_access(user_tier, required);
    if !has_access {
        details.course.content = RESTRICTED_CONTENT.to_string();
    }
    CourseView {
        details,
        has_access,
        user_subscription_required: !has_access,
        access_level: access_level_info(required),
    }
}
