use serde::{Deserialize, Serialize};

use crate::domain::{AnimeId, AnimeStatus, KnownTitles};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anime {
    pub id: AnimeId,
    pub title: String,
    pub title_original: Option<String>,
    pub title_romanized: Option<String>,
    pub title_english: Option<String>,
    /// Comma-separated alternate spellings.
    pub synonyms: Option<String>,
    pub status: AnimeStatus,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub kind: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub runtime: Option<String>,
    pub episode_count: Option<i32>,
    pub source_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Anime {
    #[must_use]
    pub fn known_titles(&self) -> KnownTitles<'_> {
        KnownTitles {
            primary: &self.title,
            original: self.title_original.as_deref(),
            romanized: self.title_romanized.as_deref(),
            english: self.title_english.as_deref(),
            synonyms_csv: self.synonyms.as_deref(),
        }
    }
}

/// Payload for creating an anime, either from user input or a scraped page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAnime {
    pub title: String,
    pub title_original: Option<String>,
    pub title_romanized: Option<String>,
    pub title_english: Option<String>,
    pub synonyms: Option<String>,
    pub status: AnimeStatus,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub kind: Option<String>,
    pub genres: Vec<String>,
    pub runtime: Option<String>,
    pub episode_count: Option<i32>,
    pub source_url: Option<String>,
    pub cover_image_url: Option<String>,
}

impl NewAnime {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update; only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimePatch {
    pub title: Option<String>,
    pub title_original: Option<String>,
    pub title_romanized: Option<String>,
    pub title_english: Option<String>,
    pub synonyms: Option<String>,
    pub status: Option<AnimeStatus>,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub kind: Option<String>,
    pub genres: Option<Vec<String>>,
    pub runtime: Option<String>,
    pub episode_count: Option<i32>,
    pub source_url: Option<String>,
    pub cover_image_url: Option<String>,
}

impl AnimePatch {
    #[must_use]
    pub fn status(status: AnimeStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
