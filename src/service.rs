//! Composite operations over the primitive API calls.
//!
//! [`FaceServiceClient`] drives the multi-step flows: upload an image, poll
//! it to readiness, then tag or recognize the detected face. It is written
//! against the [`FaceApi`] trait so the orchestration can be tested with
//! [`crate::api::MockFaceApi`].

use crate::api::{BetaFaceClient, FaceApi};
use crate::models::{Config, ImageInfo, PersonAssignment, Readiness};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::error;

/// How to wait for an asynchronous job to finish.
///
/// The default polls forever at a fixed one-second interval, matching the
/// service's historical contract. Callers needing a bounded wait set
/// `max_attempts`; exhaustion surfaces as [`Error::NotReady`].
///
/// `max_attempts` counts total fetches and is clamped to at least one:
/// `Some(0)` still performs the initial attempt.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<usize>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

/// High-level client exposing the composite BetaFace operations.
pub struct FaceServiceClient {
    api: Box<dyn FaceApi>,
    poll: PollPolicy,
}

impl FaceServiceClient {
    pub fn new(api: Box<dyn FaceApi>) -> Self {
        Self {
            api,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Build the full client stack from environment configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = BetaFaceClient::from_config(config)?;
        Ok(Self::new(Box::new(api)).with_poll_policy(PollPolicy {
            interval: config.poll_interval,
            max_attempts: None,
        }))
    }

    /// Upload an image, wait for processing, and tag the detected face with
    /// `person_id`.
    ///
    /// Returns `Ok(None)` when the service finds no face in the image:
    /// there is nothing to tag, which is not an error. Transport and parse
    /// failures, and a rejected assignment, abort with `Err`.
    pub async fn upload_face(
        &self,
        path: impl AsRef<Path>,
        person_id: &str,
    ) -> Result<Option<PersonAssignment>> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let filename = path.to_string_lossy();

        let upload = self.api.upload_image(&bytes, &filename).await.map_err(|e| {
            error!("API call to upload image failed: {}", e);
            e
        })?;

        let info = self.poll_image_info(&upload.image_uid).await?;
        let face_uid = match info.face_uid {
            Some(uid) => uid,
            None => return Ok(None),
        };

        let assignment = self.api.assign_person(&face_uid, person_id).await?;
        if !assignment.ready {
            return Err(Error::Api(format!(
                "person assignment for face {} was rejected",
                face_uid
            )));
        }
        Ok(Some(assignment))
    }

    /// Upload an image and recognize the detected face within `namespace`.
    ///
    /// A bare namespace (no `@`) is scoped as `all@<namespace>`. Returns an
    /// empty map when no face is detected or when the service reports no
    /// matches.
    pub async fn recognize_faces(
        &self,
        path: impl AsRef<Path>,
        namespace: &str,
    ) -> Result<HashMap<String, f64>> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let filename = path.to_string_lossy();

        let upload = self.api.upload_image(&bytes, &filename).await.map_err(|e| {
            error!("API call to upload image failed: {}", e);
            e
        })?;

        let info = self.poll_image_info(&upload.image_uid).await?;
        let face_uid = match info.face_uid {
            Some(uid) => uid,
            None => return Ok(HashMap::new()),
        };

        let namespace = normalize_namespace(namespace);
        let job = self.api.start_recognition(&face_uid, &namespace).await?;
        if !job.ready {
            error!("RecognizeFaces returned int_response != 0");
            return Err(Error::Api("recognition job failed to start".to_string()));
        }
        let job_id = job.job_id.ok_or(Error::MissingField("recognize_uid"))?;

        let outcome = self
            .poll_until_ready(|| self.api.get_recognition_result(&job_id))
            .await?;
        Ok(outcome.matches)
    }

    /// Poll an uploaded image's processing state to readiness and return
    /// the full result.
    pub async fn get_image_info(&self, image_uid: &str) -> Result<ImageInfo> {
        self.poll_image_info(image_uid).await
    }

    async fn poll_image_info(&self, image_uid: &str) -> Result<ImageInfo> {
        self.poll_until_ready(|| self.api.get_image_info(image_uid))
            .await
    }

    /// Fetch repeatedly at the configured interval until the result reports
    /// ready. Only the not-ready signal retries; transport and parse errors
    /// abort immediately.
    async fn poll_until_ready<T, F, Fut>(&self, mut fetch: F) -> Result<T>
    where
        T: Readiness,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let action = move || {
            let fut = fetch();
            async move {
                let result = fut.await?;
                if result.is_ready() {
                    Ok(result)
                } else {
                    Err(Error::NotReady)
                }
            }
        };
        let not_ready = |e: &Error| matches!(e, Error::NotReady);
        let strategy = FixedInterval::new(self.poll.interval);

        match self.poll.max_attempts {
            Some(attempts) => {
                RetryIf::spawn(strategy.take(attempts.saturating_sub(1)), action, not_ready).await
            }
            None => RetryIf::spawn(strategy, action, not_ready).await,
        }
    }
}

fn normalize_namespace(namespace: &str) -> String {
    if namespace.contains('@') {
        namespace.to_string()
    } else {
        format!("all@{}", namespace)
    }
}
