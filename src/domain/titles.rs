//! Exact, case-insensitive title comparison against a catalog entry.

/// The title set of one catalog entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownTitles<'a> {
    pub primary: &'a str,
    pub original: Option<&'a str>,
    pub romanized: Option<&'a str>,
    pub english: Option<&'a str>,
    /// Comma-separated free text.
    pub synonyms_csv: Option<&'a str>,
}

impl<'a> KnownTitles<'a> {
    #[must_use]
    pub const fn primary(primary: &'a str) -> Self {
        Self {
            primary,
            original: None,
            romanized: None,
            english: None,
            synonyms_csv: None,
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Returns true when `candidate` equals the primary title, any populated
/// alternate title, or any synonym token after trimming and lower-casing.
///
/// No fuzzy comparison is attempted: "one-piece" does not match "One Piece".
#[must_use]
pub fn matches(candidate: &str, known: &KnownTitles<'_>) -> bool {
    let candidate = normalize(candidate);
    if candidate.is_empty() {
        return false;
    }

    if normalize(known.primary) == candidate {
        return true;
    }

    let alternate_hit = [known.original, known.romanized, known.english]
        .into_iter()
        .flatten()
        .map(normalize)
        .any(|title| !title.is_empty() && title == candidate);
    if alternate_hit {
        return true;
    }

    known.synonyms_csv.is_some_and(|csv| {
        csv.split(',')
            .map(normalize)
            .any(|token| !token.is_empty() && token == candidate)
    })
}
