pub mod anime;
pub mod episode;

pub use anime::{Anime, AnimePatch, NewAnime};
pub use episode::{Episode, EpisodePatch, NewEpisode};
