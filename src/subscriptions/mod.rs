pub mod strategy;

pub use strategy::{all_plans, strategy_for, SubscriptionContext, SubscriptionStrategy};
