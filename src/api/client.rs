use super::endpoints::{
    Endpoint, GetImageInfo, GetRecognizeResult, RecognizeFaces, SetPerson, UploadImage,
};
use super::FaceApi;
use crate::cache::{FileCache, ResultCache};
use crate::models::{
    ApiCredentials, Config, ImageInfo, ImageUpload, PersonAssignment, RecognitionJob,
    RecognitionOutcome,
};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// Maximum length of a single parameter value inside a cache key, to keep
/// keys filesystem-safe.
const CACHE_VALUE_MAX_LEN: usize = 254;

/// HTTP client for the BetaFace XML service.
///
/// Every call follows the same shape: optional cache lookup, render the
/// request template, POST it, parse the typed response, optional cache
/// store.
pub struct BetaFaceClient {
    http: Client,
    base_url: String,
    credentials: ApiCredentials,
    cache: Option<Box<dyn ResultCache>>,
}

impl BetaFaceClient {
    pub fn new(base_url: impl Into<String>, credentials: ApiCredentials) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
            credentials,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Box<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build a client from environment configuration, attaching a
    /// [`FileCache`] when a cache directory is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::new(config.api_url.clone(), config.credentials());
        if let Some(dir) = &config.cache_dir {
            client = client.with_cache(Box::new(FileCache::new(dir)?));
        }
        Ok(client)
    }

    /// `<endpoint>?k1=v1&k2=v2...` with each value truncated and `/`
    /// replaced by `-`. Binary parameters were already reduced to a
    /// placeholder by [`Endpoint::cache_params`], so the key does not vary
    /// with blob content.
    fn cache_key(endpoint: &str, params: &[(&'static str, String)]) -> String {
        let joined = params
            .iter()
            .map(|(k, v)| {
                let safe: String = v.replace('/', "-").chars().take(CACHE_VALUE_MAX_LEN).collect();
                format!("{}={}", k, safe)
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", endpoint, joined)
    }

    /// Make one API call: cache lookup, render, POST, status check, parse,
    /// cache store.
    pub async fn call<E: Endpoint>(&self, request: &E) -> Result<E::Output> {
        let cache_key = if E::CACHEABLE && self.cache.is_some() {
            Some(Self::cache_key(E::NAME, &request.cache_params()))
        } else {
            None
        };

        if let (Some(cache), Some(key)) = (self.cache.as_ref(), cache_key.as_deref()) {
            if let Some(bytes) = cache.get(key).await? {
                return Ok(serde_json::from_slice(&bytes)?);
            }
        }

        let body = request.render(&self.credentials)?;
        let url = format!("{}/{}", self.base_url, E::NAME);
        info!("Making HTTP request to {}", url);
        if E::NAME != UploadImage::NAME {
            debug!("Request body:\n{}", body);
        }

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("HTTP request to {} failed: {}", url, e);
                e
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            error!("HTTP request failed with status {}", status);
            return Err(Error::Status(status));
        }

        let text = response.text().await?;
        if E::NAME != GetImageInfo::NAME {
            debug!("Response:\n{}", text);
        }

        let output = E::parse(&text).map_err(|e| {
            error!("Error while parsing {} response: {}", E::NAME, e);
            e
        })?;

        if let (Some(cache), Some(key)) = (self.cache.as_ref(), cache_key.as_deref()) {
            cache.put(key, &serde_json::to_vec(&output)?).await?;
        }

        Ok(output)
    }
}

#[async_trait]
impl FaceApi for BetaFaceClient {
    async fn upload_image(&self, bytes: &[u8], filename: &str) -> Result<ImageUpload> {
        self.call(&UploadImage::from_bytes(bytes, filename)).await
    }

    async fn get_image_info(&self, image_uid: &str) -> Result<ImageInfo> {
        self.call(&GetImageInfo {
            image_uid: image_uid.to_string(),
        })
        .await
    }

    async fn assign_person(&self, face_uid: &str, person_id: &str) -> Result<PersonAssignment> {
        self.call(&SetPerson {
            face_uid: face_uid.to_string(),
            person_id: person_id.to_string(),
        })
        .await
    }

    async fn start_recognition(&self, face_uid: &str, namespace: &str) -> Result<RecognitionJob> {
        self.call(&RecognizeFaces {
            face_uid: face_uid.to_string(),
            namespace: namespace.to_string(),
        })
        .await
    }

    async fn get_recognition_result(&self, job_id: &str) -> Result<RecognitionOutcome> {
        self.call(&GetRecognizeResult {
            recognize_job_id: job_id.to_string(),
        })
        .await
    }
}
