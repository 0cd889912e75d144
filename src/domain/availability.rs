//! Composite availability of an episode.
//!
//! An episode carries two independent signals: whether a copy is owned
//! locally and whether it can be streamed online. The state shown to users is
//! always derived from both and is never stored on its own authority.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityState {
    #[default]
    NotAvailable,
    AvailableOnline,
    Owned,
    OwnedAndAvailableOnline,
}

impl AvailabilityState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotAvailable => "not_available",
            Self::AvailableOnline => "available_online",
            Self::Owned => "owned",
            Self::OwnedAndAvailableOnline => "owned_and_available_online",
        }
    }

    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned | Self::OwnedAndAvailableOnline)
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::AvailableOnline | Self::OwnedAndAvailableOnline)
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AvailabilityState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_available" => Ok(Self::NotAvailable),
            "available_online" => Ok(Self::AvailableOnline),
            "owned" => Ok(Self::Owned),
            "owned_and_available_online" => Ok(Self::OwnedAndAvailableOnline),
            other => Err(UnknownVariant {
                kind: "availability state",
                value: other.to_string(),
            }),
        }
    }
}

/// Maps the two signals onto the composite state.
#[must_use]
pub const fn resolve(owned_locally: bool, available_online: bool) -> AvailabilityState {
    match (owned_locally, available_online) {
        (false, false) => AvailabilityState::NotAvailable,
        (false, true) => AvailabilityState::AvailableOnline,
        (true, false) => AvailabilityState::Owned,
        (true, true) => AvailabilityState::OwnedAndAvailableOnline,
    }
}

/// The two stored booleans of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailabilitySignals {
    pub owned_locally: bool,
    pub available_online: bool,
}

impl AvailabilitySignals {
    #[must_use]
    pub const fn new(owned_locally: bool, available_online: bool) -> Self {
        Self {
            owned_locally,
            available_online,
        }
    }

    #[must_use]
    pub const fn state(&self) -> AvailabilityState {
        resolve(self.owned_locally, self.available_online)
    }

    /// Applies only the signals present in `patch`; absent ones keep their
    /// current value.
    #[must_use]
    pub const fn apply(self, patch: SignalPatch) -> Self {
        Self {
            owned_locally: match patch.owned_locally {
                Some(v) => v,
                None => self.owned_locally,
            },
            available_online: match patch.available_online {
                Some(v) => v,
                None => self.available_online,
            },
        }
    }
}

/// Partial update of the availability signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalPatch {
    #[serde(default)]
    pub owned_locally: Option<bool>,
    #[serde(default)]
    pub available_online: Option<bool>,
}

impl SignalPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.owned_locally.is_none() && self.available_online.is_none()
    }
}

/// Per-anime count of episodes in each availability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    pub total: u32,
    pub not_available: u32,
    pub available_online: u32,
    pub owned: u32,
    pub owned_and_available_online: u32,
}

impl AvailabilitySummary {
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = AvailabilityState>,
    {
        states.into_iter().fold(Self::default(), |mut acc, state| {
            acc.total += 1;
            match state {
                AvailabilityState::NotAvailable => acc.not_available += 1,
                AvailabilityState::AvailableOnline => acc.available_online += 1,
                AvailabilityState::Owned => acc.owned += 1,
                AvailabilityState::OwnedAndAvailableOnline => acc.owned_and_available_online += 1,
            }
            acc
        })
    }

    #[must_use]
    pub const fn has_online(&self) -> bool {
        self.available_online + self.owned_and_available_online > 0
    }

    #[must_use]
    pub const fn has_owned(&self) -> bool {
        self.owned + self.owned_and_available_online > 0
    }

    #[must_use]
    pub const fn has_any(&self) -> bool {
        self.has_online() || self.has_owned()
    }
}

/// Anime list filter over the availability summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityFilter {
    #[default]
    All,
    Online,
    Local,
    Available,
}

impl AvailabilityFilter {
    #[must_use]
    pub const fn matches(&self, summary: &AvailabilitySummary) -> bool {
        match self {
            Self::All => true,
            Self::Online => summary.has_online(),
            Self::Local => summary.has_owned(),
            Self::Available => summary.has_any(),
        }
    }
}

impl FromStr for AvailabilityFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "online" => Ok(Self::Online),
            "local" => Ok(Self::Local),
            "available" => Ok(Self::Available),
            other => Err(UnknownVariant {
                kind: "availability filter",
                value: other.to_string(),
            }),
        }
    }
}
