use serde::{Deserialize, Serialize};

use crate::domain::{AnimeId, AvailabilitySignals, AvailabilityState, EpisodeId, WatchStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub anime_id: AnimeId,
    pub number: i32,
    pub title: Option<String>,
    pub watch_status: WatchStatus,
    pub owned_locally: bool,
    pub available_online: bool,
    /// Always derived from the two signals above.
    pub availability: AvailabilityState,
    pub stream_url: Option<String>,
    pub local_path: Option<String>,
    pub air_date: Option<String>,
    pub source_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Episode {
    #[must_use]
    pub const fn signals(&self) -> AvailabilitySignals {
        AvailabilitySignals::new(self.owned_locally, self.available_online)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEpisode {
    pub number: i32,
    pub title: Option<String>,
    pub watch_status: WatchStatus,
    pub owned_locally: bool,
    pub available_online: bool,
    pub stream_url: Option<String>,
    pub local_path: Option<String>,
    pub air_date: Option<String>,
    pub source_url: Option<String>,
}

impl NewEpisode {
    #[must_use]
    pub fn numbered(number: i32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn availability(&self) -> AvailabilityState {
        crate::domain::resolve(self.owned_locally, self.available_online)
    }
}

/// Partial update of an episode.
///
/// The two availability signals are merged over the stored values inside a
/// transaction and the composite state is recomputed from the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodePatch {
    pub number: Option<i32>,
    pub title: Option<String>,
    pub watch_status: Option<WatchStatus>,
    pub owned_locally: Option<bool>,
    pub available_online: Option<bool>,
    pub stream_url: Option<String>,
    pub local_path: Option<String>,
    pub air_date: Option<String>,
    pub source_url: Option<String>,
}

impl EpisodePatch {
    #[must_use]
    pub const fn signal_patch(&self) -> crate::domain::SignalPatch {
        crate::domain::SignalPatch {
            owned_locally: self.owned_locally,
            available_online: self.available_online,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
