pub mod filename;

pub use filename::{ParsedEpisode, parse_filename, parse_media_path};
