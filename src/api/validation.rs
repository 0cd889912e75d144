use super::ApiError;
use crate::constants::limits::MAX_SEARCH_QUERY_LEN;
use crate::domain::{AnimeId, EpisodeId};

pub fn validate_anime_id(id: i32) -> Result<AnimeId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid anime ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(AnimeId::new(id))
}

pub fn validate_episode_id(id: i32) -> Result<EpisodeId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid episode ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(EpisodeId::new(id))
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    if trimmed.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ApiError::validation(format!(
            "Search query must be {MAX_SEARCH_QUERY_LEN} characters or less"
        )));
    }
    Ok(trimmed)
}

pub fn validate_source_url(url: &str) -> Result<&str, ApiError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("URL cannot be empty"));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") || trimmed.starts_with('/')
    {
        return Ok(trimmed);
    }
    Err(ApiError::validation(format!(
        "Invalid URL: '{trimmed}'. Expected an http(s) URL or a site path"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ids() {
        assert_eq!(validate_anime_id(1).unwrap(), AnimeId::new(1));
        assert!(validate_anime_id(12345).is_ok());
        assert!(validate_anime_id(0).is_err());
        assert!(validate_anime_id(-1).is_err());
        assert!(validate_episode_id(7).is_ok());
        assert!(validate_episode_id(0).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  Steins Gate ").unwrap(), "Steins Gate");
        assert!(validate_search_query("").is_err());
        assert!(validate_search_query("   ").is_err());
        assert!(validate_search_query(&"a".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_source_url() {
        assert!(validate_source_url("https://www.anime-loads.org/media/frieren").is_ok());
        assert!(validate_source_url("/media/frieren").is_ok());
        assert!(validate_source_url("  ").is_err());
        assert!(validate_source_url("ftp://example.org").is_err());
    }
}
