use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{DetailScraper, ExternalHit, ExternalSearch, ExternalSourceError, ScrapeResult};
use crate::domain::AnimeStatus;
use crate::models::{NewAnime, NewEpisode};

pub const DEFAULT_BASE_URL: &str = "https://www.anime-loads.org";

const RESULT_CONTAINERS: &[&str] = &[
    "div.card",
    "div.media",
    "div.result",
    "div.search-result",
    "div.anime-item",
    "article.media",
];
const RESULT_TITLES: &[&str] = &[
    "h5.card-title",
    "h3.title",
    "div.title",
    "span.title",
    ".anime-title",
    "h4",
    "h5",
];
const RESULT_IMAGES: &[&str] = &["img.card-img-top", "img.cover", "img.thumb", "img.poster", "img"];
const MEDIA_LINK: &str = r#"a[href*="/media/"]"#;

const DETAIL_TITLES: &[&str] = &[
    "h1.title",
    "h1.anime-title",
    "div.media-heading h1",
    "div.title h1",
    "h1",
    "div.info h2",
];
const DETAIL_DESCRIPTIONS: &[&str] = &["div.description", "div.anime-description", "div.description-content"];
const DETAIL_COVERS: &[&str] = &["div.cover img", "div.anime-cover img", "div.media-left img", "div.poster img", "img.cover-image"];
const DETAIL_GENRES: &[&str] = &["div.genres a", "div.genre-list a", "div.tags a", "span.genre"];

const EPISODE_CONTAINERS: &[&str] = &[
    "div.episodes div.episode",
    "div.episode-list div.episode",
    "div.episode-container",
    "div.episode-list-item",
    "div.episodes li",
    "ul.episodes li",
    "div.episodes a",
    "table.episodes tr",
];
const EPISODE_NUMBERS: &[&str] = &["div.number", "span.number", "span.episode-number", "td:first-child", ".episode-num"];
const EPISODE_TITLES: &[&str] = &["div.title", "span.title", "a.episode-link", "td:nth-child(2)", ".episode-title"];

/// Site boilerplate that shows up in place of a real synopsis.
const BOILERPLATE_DESCRIPTION: &str = "downloads und streams von anime";
const PLACEHOLDER_COVER: &str = "logo_meta.png";

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn first_number(text: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"\d+")
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

fn selector(css: &str) -> Result<Selector, ExternalSourceError> {
    Selector::parse(css).map_err(|e| ExternalSourceError::Parse(format!("{css}: {e}")))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(scope: ElementRef<'_>, candidates: &[&str]) -> Result<Option<String>, ExternalSourceError> {
    for css in candidates {
        let sel = selector(css)?;
        if let Some(text) = scope.select(&sel).map(text_of).find(|t| !t.is_empty()) {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

fn meta_content(document: &Html, css: &str) -> Result<Option<String>, ExternalSourceError> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(ToString::to_string))
}

fn absolute(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

fn last_segment(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |c| {
                c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts de-duplicated search hits from a search result page.
pub fn parse_search_results(html: &str, base: &Url) -> Result<Vec<ExternalHit>, ExternalSourceError> {
    let document = Html::parse_document(html);
    let link_sel = selector(MEDIA_LINK)?;
    let mut results: Vec<ExternalHit> = Vec::new();

    let push = |results: &mut Vec<ExternalHit>, hit: ExternalHit| {
        if !hit.id.is_empty() && !results.iter().any(|r| r.id == hit.id) {
            results.push(hit);
        }
    };

    for css in RESULT_CONTAINERS {
        let container_sel = selector(css)?;
        for container in document.select(&container_sel) {
            let Some(link) = container.select(&link_sel).next() else {
                continue;
            };
            let Some(url) = link.value().attr("href").and_then(|h| absolute(base, h)) else {
                continue;
            };
            let id = last_segment(&url);

            let title = match first_text(container, RESULT_TITLES)? {
                Some(title) => title,
                None => {
                    let link_text = text_of(link);
                    if link_text.is_empty() {
                        title_from_slug(&id)
                    } else {
                        link_text
                    }
                }
            };

            let mut image_url = None;
            for img_css in RESULT_IMAGES {
                let img_sel = selector(img_css)?;
                if let Some(src) = container
                    .select(&img_sel)
                    .find_map(|img| img.value().attr("src"))
                {
                    image_url = absolute(base, src);
                    break;
                }
            }

            push(
                &mut results,
                ExternalHit {
                    id,
                    title,
                    url,
                    image_url,
                },
            );
        }
        if !results.is_empty() {
            debug!(selector = css, count = results.len(), "Matched search result containers");
            return Ok(results);
        }
    }

    // No structured cards: fall back to bare media links and look for an
    // image up to three levels above each link.
    let img_sel = selector("img")?;
    for link in document.select(&link_sel) {
        let Some(url) = link.value().attr("href").and_then(|h| absolute(base, h)) else {
            continue;
        };
        let id = last_segment(&url);
        let link_text = text_of(link);
        let title = if link_text.is_empty() {
            title_from_slug(&id)
        } else {
            link_text
        };

        let image_url = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take(3)
            .find_map(|parent| {
                parent
                    .select(&img_sel)
                    .find_map(|img| img.value().attr("src"))
            })
            .and_then(|src| absolute(base, src));

        push(
            &mut results,
            ExternalHit {
                id,
                title,
                url,
                image_url,
            },
        );
    }

    Ok(results)
}

fn split_genres(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split([',', '/'])
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(ToString::to_string)
}

fn apply_info_row(anime: &mut NewAnime, label: &str, value: &str) {
    let label = label.to_lowercase();
    if label.contains("englisch") {
        anime.title_english.get_or_insert_with(|| value.to_string());
    } else if label.contains("titel") {
        anime.title_original.get_or_insert_with(|| value.to_string());
    } else if label.contains("synonym") {
        anime.synonyms = Some(value.to_string());
    } else if label.contains("typ") {
        anime.kind = Some(value.to_string());
    } else if label.contains("episoden") {
        anime.episode_count = first_number(value);
    } else if label.contains("jahr") {
        anime.year = first_number(value);
    } else if label.contains("laufzeit") {
        anime.runtime = Some(value.to_string());
    } else if label.contains("status") {
        let value = value.to_lowercase();
        if value.contains("abgeschlossen") {
            anime.status = AnimeStatus::Completed;
        } else if value.contains("läuft") || value.contains("laufend") {
            anime.status = AnimeStatus::Watching;
        }
    } else if label.contains("hauptgenre") || label.contains("nebengenre") {
        for genre in split_genres(value) {
            if !anime.genres.contains(&genre) {
                anime.genres.push(genre);
            }
        }
    }
}

fn parse_episodes(document: &Html, base: &Url) -> Result<Vec<NewEpisode>, ExternalSourceError> {
    let link_sel = selector("a")?;

    for css in EPISODE_CONTAINERS {
        let container_sel = selector(css)?;
        let containers: Vec<ElementRef<'_>> = document.select(&container_sel).collect();
        if containers.is_empty() {
            continue;
        }
        debug!(selector = css, count = containers.len(), "Matched episode containers");

        let mut episodes = Vec::with_capacity(containers.len());
        for (index, container) in (1_i32..).zip(containers) {
            let number = first_text(container, EPISODE_NUMBERS)?
                .as_deref()
                .and_then(first_number)
                .unwrap_or(index);
            let title = first_text(container, EPISODE_TITLES)?
                .unwrap_or_else(|| format!("Episode {number}"));

            let href = if container.value().name() == "a" {
                container.value().attr("href")
            } else {
                container
                    .select(&link_sel)
                    .find_map(|a| a.value().attr("href"))
            };

            episodes.push(NewEpisode {
                title: Some(title),
                available_online: true,
                source_url: href.and_then(|h| absolute(base, h)),
                ..NewEpisode::numbered(number)
            });
        }
        return Ok(episodes);
    }

    Ok(Vec::new())
}

/// Extracts the anime and its episode list from a detail page.
pub fn parse_detail(html: &str, page_url: &Url) -> Result<ScrapeResult, ExternalSourceError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = match first_text(root, DETAIL_TITLES)? {
        Some(title) => Some(title),
        None => match meta_content(&document, r#"meta[property="og:title"]"#)? {
            Some(title) => Some(title),
            None => first_text(root, &["title"])?,
        },
    }
    .ok_or_else(|| ExternalSourceError::Parse(format!("no title found on {page_url}")))?;

    let mut anime = NewAnime {
        source_url: Some(page_url.to_string()),
        ..NewAnime::titled(title)
    };

    let description = match first_text(root, DETAIL_DESCRIPTIONS)? {
        Some(text) => Some(text),
        None => match meta_content(&document, r#"meta[property="og:description"]"#)? {
            Some(text) => Some(text),
            None => meta_content(&document, r#"meta[name="description"]"#)?,
        },
    };
    anime.description =
        description.filter(|d| !d.to_lowercase().contains(BOILERPLATE_DESCRIPTION));

    let mut cover = None;
    for css in DETAIL_COVERS {
        let sel = selector(css)?;
        if let Some(src) = root.select(&sel).find_map(|img| img.value().attr("src")) {
            cover = Some(src.to_string());
            break;
        }
    }
    if cover.is_none() {
        cover = meta_content(&document, r#"meta[property="og:image"]"#)?;
    }
    anime.cover_image_url = cover
        .filter(|c| !c.ends_with(PLACEHOLDER_COVER))
        .and_then(|c| absolute(page_url, &c));

    let row_sel = selector("div.info-table tr, table.info-table tr")?;
    let label_sel = selector("th, td:first-child")?;
    let value_sel = selector("td:last-child")?;
    for row in document.select(&row_sel) {
        let (Some(label), Some(value)) = (
            row.select(&label_sel).next().map(text_of),
            row.select(&value_sel).next().map(text_of),
        ) else {
            continue;
        };
        if !value.is_empty() {
            apply_info_row(&mut anime, &label, &value);
        }
    }

    for css in DETAIL_GENRES {
        let sel = selector(css)?;
        let found: Vec<String> = root.select(&sel).map(text_of).filter(|g| !g.is_empty()).collect();
        if found.is_empty() {
            continue;
        }
        for genre in found {
            if !anime.genres.contains(&genre) {
                anime.genres.push(genre);
            }
        }
        break;
    }

    let episodes = parse_episodes(&document, page_url)?;

    Ok(ScrapeResult { anime, episodes })
}

/// HTML client for the anime-loads catalog.
#[derive(Clone)]
pub struct AnimeLoadsClient {
    client: Client,
    base_url: Url,
}

impl AnimeLoadsClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ExternalSourceError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ExternalSourceError::InvalidUrl(base_url.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn resolve_url(&self, url: &str) -> Result<Url, ExternalSourceError> {
        self.base_url
            .join(url.trim())
            .map_err(|_| ExternalSourceError::InvalidUrl(url.to_string()))
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, ExternalSourceError> {
        let response = self.client.get(url.as_str()).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(url = %url, %status, "External catalog returned an error status");
            return Err(ExternalSourceError::Network(format!(
                "{url} returned {status}"
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ExternalSearch for AnimeLoadsClient {
    async fn search(&self, query: &str) -> Result<Vec<ExternalHit>, ExternalSourceError> {
        let url = self.resolve_url(&format!("/search?q={}", urlencoding::encode(query)))?;
        let html = self.fetch_html(&url).await?;
        let hits = parse_search_results(&html, &self.base_url)?;
        info!(query, count = hits.len(), "External search finished");
        Ok(hits)
    }
}

#[async_trait]
impl DetailScraper for AnimeLoadsClient {
    async fn fetch_detail(&self, url: &str) -> Result<ScrapeResult, ExternalSourceError> {
        let url = self.resolve_url(url)?;
        let html = self.fetch_html(&url).await?;
        let result = parse_detail(&html, &url)?;
        info!(
            url = %url,
            title = %result.anime.title,
            episodes = result.episodes.len(),
            "Scraped detail page"
        );
        Ok(result)
    }
}
