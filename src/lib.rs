//! KOK: emergency-room matching client core.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod geocode;
pub mod navigation;
pub mod onboarding;
pub mod shell;
pub mod store;
pub mod validation;
