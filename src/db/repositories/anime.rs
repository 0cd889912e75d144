use crate::domain::{AnimeId, AvailabilityState, AvailabilitySummary, resolve};
use crate::entities::{anime, episode, prelude::*};
use crate::models::{Anime as AnimeRecord, AnimePatch, NewAnime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

use super::super::StorageError;

pub struct AnimeRepository {
    conn: DatabaseConnection,
}

impl AnimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub(crate) fn map_model(model: anime::Model) -> AnimeRecord {
        AnimeRecord {
            id: AnimeId::new(model.id),
            title: model.title,
            title_original: model.title_original,
            title_romanized: model.title_romanized,
            title_english: model.title_english,
            synonyms: model.synonyms,
            status: model.status.parse().unwrap_or_default(),
            description: model.description,
            year: model.year,
            kind: model.kind,
            genres: model
                .genres
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
            runtime: model.runtime,
            episode_count: model.episode_count,
            source_url: model.source_url,
            cover_image_url: model.cover_image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    fn encode_genres(genres: &[String]) -> Option<String> {
        if genres.is_empty() {
            None
        } else {
            serde_json::to_string(genres).ok()
        }
    }

    pub async fn get(&self, id: AnimeId) -> Result<Option<AnimeRecord>, StorageError> {
        let model = Anime::find_by_id(id.value()).one(&self.conn).await?;
        Ok(model.map(Self::map_model))
    }

    pub async fn list_all(&self) -> Result<Vec<AnimeRecord>, StorageError> {
        let rows = Anime::find()
            .order_by_asc(anime::Column::Title)
            .order_by_asc(anime::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Substring search over every title field, case-insensitive for any
    /// script. The query is matched literally.
    pub async fn search_titles(&self, query: &str) -> Result<Vec<AnimeRecord>, StorageError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self
            .list_all()
            .await?
            .into_iter()
            .filter(|anime| {
                [
                    Some(anime.title.as_str()),
                    anime.title_original.as_deref(),
                    anime.title_romanized.as_deref(),
                    anime.title_english.as_deref(),
                    anime.synonyms.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect();

        Ok(matches)
    }

    pub async fn create(&self, input: &NewAnime) -> Result<AnimeRecord, StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        let active_model = anime::ActiveModel {
            title: Set(input.title.trim().to_string()),
            title_original: Set(input.title_original.clone()),
            title_romanized: Set(input.title_romanized.clone()),
            title_english: Set(input.title_english.clone()),
            synonyms: Set(input.synonyms.clone()),
            status: Set(input.status.as_str().to_string()),
            description: Set(input.description.clone()),
            year: Set(input.year),
            kind: Set(input.kind.clone()),
            genres: Set(Self::encode_genres(&input.genres)),
            runtime: Set(input.runtime.clone()),
            episode_count: Set(input.episode_count),
            source_url: Set(input.source_url.clone()),
            cover_image_url: Set(input.cover_image_url.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.conn).await?;
        info!(anime_id = model.id, title = %model.title, "Created anime");
        Ok(Self::map_model(model))
    }

    pub async fn update(
        &self,
        id: AnimeId,
        patch: &AnimePatch,
    ) -> Result<Option<AnimeRecord>, StorageError> {
        let Some(model) = Anime::find_by_id(id.value()).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: anime::ActiveModel = model.into();
        if let Some(title) = &patch.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(v) = &patch.title_original {
            active.title_original = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.title_romanized {
            active.title_romanized = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.title_english {
            active.title_english = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.synonyms {
            active.synonyms = Set(Some(v.clone()));
        }
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(v) = &patch.description {
            active.description = Set(Some(v.clone()));
        }
        if let Some(v) = patch.year {
            active.year = Set(Some(v));
        }
        if let Some(v) = &patch.kind {
            active.kind = Set(Some(v.clone()));
        }
        if let Some(genres) = &patch.genres {
            active.genres = Set(Self::encode_genres(genres));
        }
        if let Some(v) = &patch.runtime {
            active.runtime = Set(Some(v.clone()));
        }
        if let Some(v) = patch.episode_count {
            active.episode_count = Set(Some(v));
        }
        if let Some(v) = &patch.source_url {
            active.source_url = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.cover_image_url {
            active.cover_image_url = Set(Some(v.clone()));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(Self::map_model(model)))
    }

    /// Removes the anime together with its episodes.
    pub async fn remove(&self, id: AnimeId) -> Result<bool, StorageError> {
        let txn = self.conn.begin().await?;

        episode::Entity::delete_many()
            .filter(episode::Column::AnimeId.eq(id.value()))
            .exec(&txn)
            .await?;

        let result = Anime::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(anime_id = id.value(), "Removed anime");
        }
        Ok(removed)
    }

    /// Availability counts for every anime that has at least one episode.
    ///
    /// Reads the stored state column; a value that does not parse is derived
    /// again from the two signals.
    pub async fn availability_summaries(
        &self,
    ) -> Result<HashMap<AnimeId, AvailabilitySummary>, StorageError> {
        let rows: Vec<(i32, String, bool, bool)> = Episode::find()
            .select_only()
            .column(episode::Column::AnimeId)
            .column(episode::Column::Availability)
            .column(episode::Column::OwnedLocally)
            .column(episode::Column::AvailableOnline)
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut grouped: HashMap<AnimeId, Vec<AvailabilityState>> = HashMap::new();
        for (anime_id, stored, owned, online) in rows {
            let state = stored
                .parse::<AvailabilityState>()
                .unwrap_or_else(|_| resolve(owned, online));
            grouped.entry(AnimeId::new(anime_id)).or_default().push(state);
        }

        Ok(grouped
            .into_iter()
            .map(|(id, states)| (id, AvailabilitySummary::from_states(states)))
            .collect())
    }
}
