pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "webm", "m4v"];

pub mod limits {

    pub const DEFAULT_PAGE_LIMIT: u64 = 100;

    pub const MAX_PAGE_LIMIT: u64 = 1000;

    pub const MAX_SEARCH_QUERY_LEN: usize = 200;
}
