//! Named navigation destinations.

use serde::{Deserialize, Serialize};

/// A full-screen destination. No nested modal routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Cover page with the start button.
    Cover,
    Login,
    Onboarding,
    SearchMap,
    Profile,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Cover => "/",
            Self::Login => "/login",
            Self::Onboarding => "/onboarding",
            Self::SearchMap => "/search-map",
            Self::Profile => "/profile",
        }
    }

    /// Whether the destination needs a signed-in user.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::SearchMap | Self::Profile)
    }

    /// Where a navigation to `self` actually lands.
    pub fn resolve(self, authenticated: bool) -> Route {
        if self.requires_auth() && !authenticated {
            Self::Login
        } else {
            self
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl std::str::FromStr for Route {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches('/') {
            "" => Ok(Self::Cover),
            "/login" => Ok(Self::Login),
            "/onboarding" => Ok(Self::Onboarding),
            "/search-map" => Ok(Self::SearchMap),
            "/profile" => Ok(Self::Profile),
            _ => Err(format!("Unknown route: {s}")),
        }
    }
}
