//! Data models and structures
//!
//! Defines the typed results returned by the BetaFace endpoints along with
//! credentials and environment-driven configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Vendor production endpoint.
pub const DEFAULT_API_URL: &str = "http://www.betafaceapi.com/service.svc";

/// Key/secret pair sent with every request.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
}

impl ApiCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// Result of uploading an image.
///
/// `ready` preserves the wire convention: `int_response == 0` means the
/// service accepted the image and started processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUpload {
    pub image_uid: String,
    pub ready: bool,
}

/// Processing state of an uploaded image.
///
/// `ready=false` means the image is still being processed and the caller
/// should poll again. A missing `face_uid` on a ready result means no face
/// was detected, which is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub ready: bool,
    pub face_uid: Option<String>,
}

/// Result of associating a face with a person id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonAssignment {
    pub ready: bool,
}

/// Handle for an asynchronous recognition job.
///
/// `ready=false` here means the job could not start, a distinct condition
/// from the not-ready-yet signal seen while polling for its result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionJob {
    pub ready: bool,
    pub job_id: Option<String>,
}

/// Final recognition result: person name to confidence score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionOutcome {
    pub ready: bool,
    #[serde(default)]
    pub matches: HashMap<String, f64>,
}

/// Implemented by results that are polled until the service reports them
/// finished.
pub trait Readiness {
    fn is_ready(&self) -> bool;
}

impl Readiness for ImageInfo {
    fn is_ready(&self) -> bool {
        self.ready
    }
}

impl Readiness for RecognitionOutcome {
    fn is_ready(&self) -> bool {
        self.ready
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
    pub poll_interval: Duration,
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Credentials are mandatory; there are no compiled-in defaults. The API
    /// URL, poll interval, and cache directory fall back to the vendor URL,
    /// one second, and caching disabled.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let poll_interval = match std::env::var("BETAFACE_POLL_INTERVAL_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                crate::Error::Config(format!(
                    "BETAFACE_POLL_INTERVAL_SECS must be an integer, got '{}'",
                    raw
                ))
            })?),
            Err(_) => Duration::from_secs(1),
        };

        Ok(Self {
            api_key: std::env::var("BETAFACE_API_KEY")
                .map_err(|_| crate::Error::Config("BETAFACE_API_KEY not set".to_string()))?,
            api_secret: std::env::var("BETAFACE_API_SECRET")
                .map_err(|_| crate::Error::Config("BETAFACE_API_SECRET not set".to_string()))?,
            api_url: std::env::var("BETAFACE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            poll_interval,
            cache_dir: std::env::var("BETAFACE_CACHE_DIR").ok().map(PathBuf::from),
        })
    }

    pub fn credentials(&self) -> ApiCredentials {
        ApiCredentials::new(self.api_key.clone(), self.api_secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // from_env tests mutate process-wide environment variables, so they
    // serialize on this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: [&str; 5] = [
        "BETAFACE_API_KEY",
        "BETAFACE_API_SECRET",
        "BETAFACE_API_URL",
        "BETAFACE_POLL_INTERVAL_SECS",
        "BETAFACE_CACHE_DIR",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_from_env_requires_credentials() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, crate::Error::Config(msg) if msg.contains("BETAFACE_API_KEY")));

        std::env::set_var("BETAFACE_API_KEY", "key-1");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, crate::Error::Config(msg) if msg.contains("BETAFACE_API_SECRET")));

        clear_env();
    }

    #[test]
    fn test_from_env_rejects_non_integer_poll_interval() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("BETAFACE_API_KEY", "key-1");
        std::env::set_var("BETAFACE_API_SECRET", "secret-1");
        std::env::set_var("BETAFACE_POLL_INTERVAL_SECS", "soon");

        let err = Config::from_env().unwrap_err();
        assert!(
            matches!(err, crate::Error::Config(msg) if msg.contains("BETAFACE_POLL_INTERVAL_SECS"))
        );

        clear_env();
    }

    #[test]
    fn test_from_env_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("BETAFACE_API_KEY", "key-1");
        std::env::set_var("BETAFACE_API_SECRET", "secret-1");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.cache_dir.is_none());

        clear_env();
    }

    #[test]
    fn test_recognition_outcome_deserializes_without_matches() {
        let outcome: RecognitionOutcome = serde_json::from_str(r#"{"ready":false}"#).unwrap();
        assert!(!outcome.ready);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_image_info_round_trips_through_json() {
        let info = ImageInfo {
            ready: true,
            face_uid: Some("face-1".to_string()),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: ImageInfo = serde_json::from_str(&json).unwrap();
        assert!(back.ready);
        assert_eq!(back.face_uid.as_deref(), Some("face-1"));
    }
}
