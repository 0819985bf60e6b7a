//! Endpoint definitions: request parameters, templates, and parsers.
//!
//! Each remote operation is a request struct implementing [`Endpoint`], so
//! the endpoint-to-parser mapping is resolved at compile time instead of by
//! name lookup. The `NAME` constant doubles as the URL path segment and the
//! request template identity.

use super::xml;
use crate::models::{
    ApiCredentials, ImageInfo, ImageUpload, PersonAssignment, RecognitionJob, RecognitionOutcome,
};
use crate::{Error, Result};
use askama::Template;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

/// Stand-in for binary payload values when building cache keys, so the key
/// is stable regardless of the blob content.
pub const BLOB_PLACEHOLDER: &str = "[BLOB]";

/// A remote BetaFace operation: how to render its request body, how to key
/// it in the cache, and how to parse its response.
pub trait Endpoint {
    /// URL path segment under the service base URL.
    const NAME: &'static str;

    /// Polling endpoints return time-varying results for the same
    /// parameters and must never be cached.
    const CACHEABLE: bool = true;

    type Output: Serialize + DeserializeOwned + Send;

    /// Render the XML request body with credentials merged in.
    fn render(&self, creds: &ApiCredentials) -> Result<String>;

    /// Parameters in declared order, with binary values already replaced by
    /// [`BLOB_PLACEHOLDER`].
    fn cache_params(&self) -> Vec<(&'static str, String)>;

    fn parse(body: &str) -> Result<Self::Output>;
}

#[derive(Template)]
#[template(path = "UploadNewImage_File.xml")]
struct UploadImageTemplate<'a> {
    api_key: &'a str,
    api_secret: &'a str,
    base64_data: &'a str,
    original_filename: &'a str,
}

#[derive(Template)]
#[template(path = "GetImageInfo.xml")]
struct GetImageInfoTemplate<'a> {
    api_key: &'a str,
    api_secret: &'a str,
    image_uid: &'a str,
}

#[derive(Template)]
#[template(path = "SetPerson.xml")]
struct SetPersonTemplate<'a> {
    api_key: &'a str,
    api_secret: &'a str,
    face_uid: &'a str,
    person_id: &'a str,
}

#[derive(Template)]
#[template(path = "RecognizeFaces.xml")]
struct RecognizeFacesTemplate<'a> {
    api_key: &'a str,
    api_secret: &'a str,
    face_uid: &'a str,
    namespace: &'a str,
}

#[derive(Template)]
#[template(path = "GetRecognizeResult.xml")]
struct GetRecognizeResultTemplate<'a> {
    api_key: &'a str,
    api_secret: &'a str,
    recognize_job_id: &'a str,
}

/// Upload a base64-encoded image.
pub struct UploadImage {
    pub base64_data: String,
    pub original_filename: String,
}

impl UploadImage {
    pub fn from_bytes(bytes: &[u8], original_filename: impl Into<String>) -> Self {
        use base64::Engine as _;
        Self {
            base64_data: base64::engine::general_purpose::STANDARD.encode(bytes),
            original_filename: original_filename.into(),
        }
    }
}

impl Endpoint for UploadImage {
    const NAME: &'static str = "UploadNewImage_File";
    type Output = ImageUpload;

    fn render(&self, creds: &ApiCredentials) -> Result<String> {
        Ok(UploadImageTemplate {
            api_key: &creds.key,
            api_secret: &creds.secret,
            base64_data: &self.base64_data,
            original_filename: &self.original_filename,
        }
        .render()?)
    }

    fn cache_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("base64_data", BLOB_PLACEHOLDER.to_string()),
            ("original_filename", self.original_filename.clone()),
        ]
    }

    fn parse(body: &str) -> Result<Self::Output> {
        // img_uid is checked before the readiness flag, matching the
        // service's field order: both are mandatory for this endpoint.
        let image_uid =
            xml::first_text_at(body, &["img_uid"])?.ok_or(Error::MissingField("img_uid"))?;
        let ready = xml::ready_flag(body)?;
        Ok(ImageUpload { image_uid, ready })
    }
}

/// Poll the processing state of an uploaded image.
pub struct GetImageInfo {
    pub image_uid: String,
}

impl Endpoint for GetImageInfo {
    const NAME: &'static str = "GetImageInfo";
    const CACHEABLE: bool = false;
    type Output = ImageInfo;

    fn render(&self, creds: &ApiCredentials) -> Result<String> {
        Ok(GetImageInfoTemplate {
            api_key: &creds.key,
            api_secret: &creds.secret,
            image_uid: &self.image_uid,
        }
        .render()?)
    }

    fn cache_params(&self) -> Vec<(&'static str, String)> {
        vec![("image_uid", self.image_uid.clone())]
    }

    fn parse(body: &str) -> Result<Self::Output> {
        let ready = xml::ready_flag(body)?;
        if !ready {
            return Ok(ImageInfo {
                ready: false,
                face_uid: None,
            });
        }

        let face_uid = xml::first_text_at(body, &["faces", "FaceInfo", "uid"])?;
        if face_uid.is_none() {
            tracing::info!("No faces found in image");
        }
        Ok(ImageInfo { ready, face_uid })
    }
}

/// Associate a detected face with a person id.
pub struct SetPerson {
    pub face_uid: String,
    pub person_id: String,
}

impl Endpoint for SetPerson {
    const NAME: &'static str = "SetPerson";
    type Output = PersonAssignment;

    fn render(&self, creds: &ApiCredentials) -> Result<String> {
        Ok(SetPersonTemplate {
            api_key: &creds.key,
            api_secret: &creds.secret,
            face_uid: &self.face_uid,
            person_id: &self.person_id,
        }
        .render()?)
    }

    fn cache_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("face_uid", self.face_uid.clone()),
            ("person_id", self.person_id.clone()),
        ]
    }

    fn parse(body: &str) -> Result<Self::Output> {
        Ok(PersonAssignment {
            ready: xml::ready_flag(body)?,
        })
    }
}

/// Start an asynchronous recognition job for a face within a namespace.
pub struct RecognizeFaces {
    pub face_uid: String,
    pub namespace: String,
}

impl Endpoint for RecognizeFaces {
    const NAME: &'static str = "RecognizeFaces";
    type Output = RecognitionJob;

    fn render(&self, creds: &ApiCredentials) -> Result<String> {
        Ok(RecognizeFacesTemplate {
            api_key: &creds.key,
            api_secret: &creds.secret,
            face_uid: &self.face_uid,
            namespace: &self.namespace,
        }
        .render()?)
    }

    fn cache_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("face_uid", self.face_uid.clone()),
            ("namespace", self.namespace.clone()),
        ]
    }

    fn parse(body: &str) -> Result<Self::Output> {
        let ready = xml::ready_flag(body)?;
        if !ready {
            return Ok(RecognitionJob {
                ready: false,
                job_id: None,
            });
        }

        let job_id = xml::first_text_at(body, &["recognize_uid"])?
            .ok_or(Error::MissingField("recognize_uid"))?;
        Ok(RecognitionJob {
            ready,
            job_id: Some(job_id),
        })
    }
}

/// Poll the result of a recognition job.
pub struct GetRecognizeResult {
    pub recognize_job_id: String,
}

impl Endpoint for GetRecognizeResult {
    const NAME: &'static str = "GetRecognizeResult";
    const CACHEABLE: bool = false;
    type Output = RecognitionOutcome;

    fn render(&self, creds: &ApiCredentials) -> Result<String> {
        Ok(GetRecognizeResultTemplate {
            api_key: &creds.key,
            api_secret: &creds.secret,
            recognize_job_id: &self.recognize_job_id,
        }
        .render()?)
    }

    fn cache_params(&self) -> Vec<(&'static str, String)> {
        vec![("recognize_job_id", self.recognize_job_id.clone())]
    }

    fn parse(body: &str) -> Result<Self::Output> {
        let ready = xml::ready_flag(body)?;
        if !ready {
            return Ok(RecognitionOutcome {
                ready: false,
                matches: HashMap::new(),
            });
        }

        let pairs = xml::person_matches(body)?;
        if pairs.is_empty() {
            tracing::info!("No matching persons found for image");
        }
        // Later entries overwrite earlier ones on duplicate names.
        let matches: HashMap<String, f64> = pairs.into_iter().collect();
        Ok(RecognitionOutcome { ready, matches })
    }
}
