//! Configuration module for creative-studio service

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub host: String,

    // SQLite
    pub database_url: String,

    // Generated files
    pub output_dir: PathBuf,

    // Rendering
    pub ffmpeg_path: String,
    pub font_file: Option<PathBuf>,

    // Audio
    pub sample_rate: u32,
    pub clip_seconds: f32,

    // Speech recognition (optional)
    pub asr_service_url: Option<String>,
    pub max_upload_bytes: usize,
}

/// Accepted `SAMPLE_RATE` values in Hz
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=48_000;
/// Upper bound for `CLIP_SECONDS`
pub const MAX_CLIP_SECONDS: f32 = 30.0;
/// Upper bound for `MAX_UPLOAD_MB`
pub const MAX_UPLOAD_MB: usize = 1024;

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; out-of-range or unparseable values use the default
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: var("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "creative_studio.db".to_string()),

            output_dir: var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("generated_files")),

            ffmpeg_path: var("FFMPEG_PATH")
                .unwrap_or_else(|| "ffmpeg".to_string()),
            font_file: var("FONT_FILE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),

            sample_rate: var("SAMPLE_RATE")
                .and_then(|s| s.parse::<u32>().ok())
                .filter(|rate| SAMPLE_RATE_RANGE.contains(rate))
                .unwrap_or(22050),
            clip_seconds: var("CLIP_SECONDS")
                .and_then(|s| s.parse().ok())
                .filter(|secs: &f32| *secs > 0.0 && *secs <= MAX_CLIP_SECONDS)
                .unwrap_or(3.0),

            asr_service_url: var("ASR_SERVICE_URL")
                .filter(|s| !s.is_empty()),
            max_upload_bytes: var("MAX_UPLOAD_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|mb| (1..=MAX_UPLOAD_MB).contains(mb))
                .unwrap_or(25)
                * 1024
                * 1024,
        }
    }

    /// SQLite connection string, accepting either a bare path or an `sqlite:` URL
    pub fn sqlite_url(&self) -> String {
        if self.database_url.starts_with("sqlite:") {
            self.database_url.clone()
        } else {
            format!("sqlite://{}", self.database_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_db(database_url: &str) -> Config {
        Config {
            port: 5000,
            host: "0.0.0.0".to_string(),
            database_url: database_url.to_string(),
            output_dir: PathBuf::from("generated_files"),
            ffmpeg_path: "ffmpeg".to_string(),
            font_file: None,
            sample_rate: 22050,
            clip_seconds: 3.0,
            asr_service_url: None,
            max_upload_bytes: 1024 * 1024,
        }
    }

    #[test]
    fn test_sqlite_url_from_bare_path() {
        let config = config_with_db("data/creative_studio.db");
        assert_eq!(config.sqlite_url(), "sqlite://data/creative_studio.db");
    }

    #[test]
    fn test_sqlite_url_passthrough() {
        let config = config_with_db("sqlite::memory:");
        assert_eq!(config.sqlite_url(), "sqlite::memory:");
    }

    fn lookup(pairs: &[(&str, &str)]) -> Config {
        let vars: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = lookup(&[]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_url, "creative_studio.db");
        assert_eq!(config.output_dir, PathBuf::from("generated_files"));
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.clip_seconds, 3.0);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert!(config.font_file.is_none());
        assert!(config.asr_service_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = lookup(&[
            ("PORT", "8080"),
            ("SAMPLE_RATE", "44100"),
            ("CLIP_SECONDS", "30"),
            ("MAX_UPLOAD_MB", "5"),
            ("ASR_SERVICE_URL", "http://asr:9000"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.clip_seconds, 30.0);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.asr_service_url.as_deref(), Some("http://asr:9000"));
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = lookup(&[
            ("PORT", "http"),
            ("SAMPLE_RATE", "lots"),
            ("CLIP_SECONDS", "abc"),
            ("MAX_UPLOAD_MB", "-1"),
        ]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.clip_seconds, 3.0);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn test_out_of_range_numbers_fall_back() {
        for (rate, secs, mb) in [
            ("0", "0", "0"),
            ("1000000000", "1e9", "18446744073709551615"),
            ("7999", "NaN", "1025"),
            ("48001", "-2", "99999999999999"),
        ] {
            let config = lookup(&[
                ("SAMPLE_RATE", rate),
                ("CLIP_SECONDS", secs),
                ("MAX_UPLOAD_MB", mb),
            ]);
            assert_eq!(config.sample_rate, 22050, "{}", rate);
            assert_eq!(config.clip_seconds, 3.0, "{}", secs);
            assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024, "{}", mb);
        }
    }
}
