pub mod config;
pub mod probe;
pub mod report;
pub mod scanner;

/// Video file extensions we scan
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "avi", "mpg", "mpeg", "mov", "wmv", "flv", "m4v", "ts", "vob",
];

/// Application name for XDG paths
pub const APP_NAME: &str = "mvmeta";
