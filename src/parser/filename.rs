use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Best-effort title and episode number recovered from a media file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEpisode {
    pub title: String,
    pub episode: i32,
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// Parses a path, preferring the series folder when the file sits in a
/// `Season N` directory.
#[must_use]
pub fn parse_media_path(path: &Path) -> Option<ParsedEpisode> {
    let file_name = path.file_name()?.to_str()?;
    parse_season_folder(path, file_name).or_else(|| parse_filename(file_name))
}

/// Parses a bare file name such as `[Group] Title - 01 [1080p].mkv`.
#[must_use]
pub fn parse_filename(file_name: &str) -> Option<ParsedEpisode> {
    let stem = strip_extension(file_name).replace('_', " ");

    parse_bracket_group(&stem)
        .or_else(|| parse_sxxexx(&stem))
        .or_else(|| parse_dash_number(&stem))
        .or_else(|| parse_trailing_number(&stem))
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= 4 && ext.chars().all(char::is_alphanumeric) => stem,
        _ => file_name,
    }
}

fn clean_title(raw: &str) -> Option<String> {
    static GROUP: OnceLock<Regex> = OnceLock::new();
    static YEAR: OnceLock<Regex> = OnceLock::new();
    let ungrouped = get_regex(&GROUP, r"^\s*(?:\[[^\]]*\]\s*)+").replace(raw, "");
    let spaced = ungrouped.replace('.', " ");
    let without_year = get_regex(&YEAR, r"\(\d{4}\)").replace_all(&spaced, "");
    let title = without_year
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let title = title.trim_end_matches(['-', ' ']).trim().to_string();
    (!title.is_empty()).then_some(title)
}

fn build(title: &str, episode: &str) -> Option<ParsedEpisode> {
    let episode: i32 = episode.parse().ok()?;
    if episode <= 0 {
        return None;
    }
    Some(ParsedEpisode {
        title: clean_title(title)?,
        episode,
    })
}

fn parse_bracket_group(stem: &str) -> Option<ParsedEpisode> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^\[[^\]]+\]\s*(?P<title>.+?)\s*-\s*(?P<episode>\d{1,4})(?:v\d+)?(?:\s*[\[\(].*)?\s*$",
    );
    let caps = re.captures(stem)?;
    build(&caps["title"], &caps["episode"])
}

fn parse_sxxexx(stem: &str) -> Option<ParsedEpisode> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?i)^(?P<title>.+?)[\s._-]+S\d{1,2}E(?P<episode>\d{1,4})(?:v\d+)?\b",
    );
    let caps = re.captures(stem)?;
    build(&caps["title"], &caps["episode"])
}

fn parse_dash_number(stem: &str) -> Option<ParsedEpisode> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)\s+-\s+(?P<episode>\d{1,4})(?:v\d+)?(?:\s.*)?$",
    );
    let caps = re.captures(stem)?;
    build(&caps["title"], &caps["episode"])
}

fn parse_trailing_number(stem: &str) -> Option<ParsedEpisode> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<title>.+?)[\s.]+(?:E|Ep)?(?P<episode>\d{2,3})(?:v\d+)?$",
    );
    let caps = re.captures(stem)?;
    build(&caps["title"], &caps["episode"])
}

fn parse_season_folder(path: &Path, file_name: &str) -> Option<ParsedEpisode> {
    static SEASON_DIR: OnceLock<Regex> = OnceLock::new();
    static SXXEXX: OnceLock<Regex> = OnceLock::new();
    static NUMBER: OnceLock<Regex> = OnceLock::new();

    let season_dir = path.parent()?;
    let season_name = season_dir.file_name()?.to_str()?;
    if !get_regex(&SEASON_DIR, r"(?i)^(?:season|staffel)\s*\d+$").is_match(season_name) {
        return None;
    }
    let series_name = season_dir.parent()?.file_name()?.to_str()?;

    let stem = strip_extension(file_name);
    let episode = get_regex(&SXXEXX, r"(?i)S\d+E(\d{1,4})")
        .captures(stem)
        .or_else(|| get_regex(&NUMBER, r"(?:^|\D)(\d{1,3})(?:\D|$)").captures(stem))
        .map(|caps| caps[1].to_string())?;

    build(series_name, &episode)
}
