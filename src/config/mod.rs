//! Configuration handling for a harvest run.
//!
//! Everything the pipeline needs (keywords, quota, header profile,
//! thresholds, detection parameters) lives in one immutable [`Config`] that is
//! built once and handed to the [`crate::harvest::Harvester`]. `Config::from_env`
//! reads the handful of values that usually change between runs and falls
//! back to development defaults for the rest.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Environment variable names.
pub const ENV_KEYWORDS: &str = "GLEANER_KEYWORDS";
pub const ENV_QUOTA: &str = "GLEANER_QUOTA";
pub const ENV_MODE: &str = "GLEANER_MODE";
pub const ENV_OUTPUT_DIR: &str = "GLEANER_OUTPUT_DIR";
pub const ENV_SEARCH_URL: &str = "GLEANER_SEARCH_URL";
pub const ENV_FACE_MODEL: &str = "GLEANER_FACE_MODEL";
pub const ENV_COOLDOWN_MS: &str = "GLEANER_COOLDOWN_MS";

const DEFAULT_QUOTA: usize = 20;
const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
const DEFAULT_FACE_MODEL: &str = "model/seeta_fd_frontal_v1.0.bin";
const DEFAULT_COOLDOWN_MS: u64 = 1000;
const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024; // 20MB

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Which acceptance policy a deployment runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyMode {
    /// Keep large portrait-shaped images whole.
    #[default]
    Aspect,
    /// Keep one crop per detected face.
    Face,
}

impl std::str::FromStr for PolicyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aspect" => Ok(Self::Aspect),
            "face" | "faces" => Ok(Self::Face),
            other => Err(ConfigError::InvalidValue {
                field: ENV_MODE,
                reason: format!("unknown mode '{other}', expected 'aspect' or 'face'"),
            }),
        }
    }
}

/// Browser-like header set sent with every request, plus the locale
/// parameters appended to the search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub accept_encoding: String,
    pub connection: String,
    pub upgrade_insecure_requests: String,
    pub cache_control: String,
    /// Interface language (`hl`).
    pub language: String,
    /// Result region (`gl`).
    pub region: String,
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            accept: ACCEPT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
            accept_encoding: "gzip, deflate".to_string(),
            connection: "keep-alive".to_string(),
            upgrade_insecure_requests: "1".to_string(),
            cache_control: "max-age=0".to_string(),
            language: "ko".to_string(),
            region: "kr".to_string(),
        }
    }
}

/// Bounds for the aspect-ratio policy. The ratio is height / width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectThresholds {
    pub min_width: u32,
    pub min_height: u32,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for AspectThresholds {
    fn default() -> Self {
        Self {
            min_width: 500,
            min_height: 500,
            min_ratio: 1.0,
            max_ratio: 1.3,
        }
    }
}

/// Tuning for the face detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Growth factor between detection scales (> 1.0).
    pub scale_factor: f64,
    /// How many confirmations a detection needs before it is kept.
    pub min_neighbors: u32,
    /// Smallest face box, in pixels per side.
    pub min_size: u32,
    /// Largest face box, in pixels per side.
    pub max_size: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.08,
            min_neighbors: 6,
            min_size: 100,
            max_size: 2000,
        }
    }
}

/// Post-detection crop and enhancement settings for face mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCropSettings {
    /// Padding added on every side, as a fraction of the face width.
    pub padding: f64,
    pub contrast: f32,
    pub sharpness: f32,
}

impl Default for FaceCropSettings {
    fn default() -> Self {
        Self {
            padding: 0.3,
            contrast: 1.2,
            sharpness: 1.1,
        }
    }
}

/// Runtime configuration for a harvest run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    keywords: Vec<String>,
    quota: usize,
    mode: PolicyMode,
    output_dir: PathBuf,
    search_url: String,
    face_model_path: PathBuf,
    cooldown: Duration,
    search_timeout: Duration,
    image_timeout: Duration,
    connect_timeout: Duration,
    max_image_bytes: u64,
    jpeg_quality: u8,
    blocked_domains: Vec<String>,
    profile: RequestProfile,
    aspect: AspectThresholds,
    detection: DetectionParams,
    face_crop: FaceCropSettings,
}

impl Config {
    /// Create a config for the given keywords with every other setting at
    /// its default.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            quota: DEFAULT_QUOTA,
            mode: PolicyMode::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            face_model_path: PathBuf::from(DEFAULT_FACE_MODEL),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            search_timeout: Duration::from_secs(30),
            image_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            jpeg_quality: 95,
            blocked_domains: vec!["gstatic.com".to_string(), "google.com".to_string()],
            profile: RequestProfile::default(),
            aspect: AspectThresholds::default(),
            detection: DetectionParams::default(),
            face_crop: FaceCropSettings::default(),
        }
    }

    /// Load from environment variables, falling back to defaults.
    ///
    /// An empty keyword list is an error: there is nothing to do.
    pub fn from_env() -> Result<Self, ConfigError> {
        let keywords: Vec<String> = env::var(ENV_KEYWORDS)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if keywords.is_empty() {
            return Err(ConfigError::Missing(ENV_KEYWORDS));
        }

        let mut config = Self::new(keywords);

        if let Ok(raw) = env::var(ENV_QUOTA) {
            config.quota = parse_number(ENV_QUOTA, &raw)?;
        }
        if let Ok(raw) = env::var(ENV_MODE) {
            config.mode = raw.parse()?;
        }
        if let Ok(dir) = env::var(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var(ENV_SEARCH_URL) {
            url::Url::parse(&url).map_err(|e| ConfigError::InvalidValue {
                field: ENV_SEARCH_URL,
                reason: e.to_string(),
            })?;
            config.search_url = url;
        }
        if let Ok(path) = env::var(ENV_FACE_MODEL) {
            config.face_model_path = PathBuf::from(path);
        }
        if let Ok(raw) = env::var(ENV_COOLDOWN_MS) {
            config.cooldown = Duration::from_millis(parse_number(ENV_COOLDOWN_MS, &raw)?);
        }

        Ok(config)
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_mode(mut self, mode: PolicyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn with_face_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.face_model_path = path.into();
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_timeouts(mut self, search: Duration, image: Duration) -> Self {
        self.search_timeout = search;
        self.image_timeout = image;
        self
    }

    pub fn with_max_image_bytes(mut self, max: u64) -> Self {
        self.max_image_bytes = max;
        self
    }

    pub fn with_blocked_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_aspect_thresholds(mut self, aspect: AspectThresholds) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_detection_params(mut self, detection: DetectionParams) -> Self {
        self.detection = detection;
        self
    }

    /// Search terms, in processing order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
    /// Target number of accepted images per keyword.
    pub fn quota(&self) -> usize {
        self.quota
    }
    pub fn mode(&self) -> PolicyMode {
        self.mode
    }
    /// Root under which per-keyword directories are created.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
    /// Search endpoint, without query parameters.
    pub fn search_url(&self) -> &str {
        &self.search_url
    }
    pub fn face_model_path(&self) -> &Path {
        &self.face_model_path
    }
    /// Pause after every candidate attempt.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
    pub fn search_timeout(&self) -> Duration {
        self.search_timeout
    }
    pub fn image_timeout(&self) -> Duration {
        self.image_timeout
    }
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_bytes
    }
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
    /// Host substrings whose URLs are never treated as candidates.
    pub fn blocked_domains(&self) -> &[String] {
        &self.blocked_domains
    }
    pub fn profile(&self) -> &RequestProfile {
        &self.profile
    }
    pub fn aspect(&self) -> &AspectThresholds {
        &self.aspect
    }
    pub fn detection(&self) -> &DetectionParams {
        &self.detection
    }
    pub fn face_crop(&self) -> &FaceCropSettings {
        &self.face_crop
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            field,
            reason: format!("'{raw}': {e}"),
        })
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
