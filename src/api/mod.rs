//! BetaFace API integration: endpoint definitions, HTTP client, and mock.
//!
//! The [`FaceApi`] trait covers the five primitive remote calls; the
//! composite operations in [`crate::service`] are written against it so
//! they can be exercised with [`MockFaceApi`].

pub mod client;
pub mod endpoints;
pub mod mock;
pub mod xml;

pub use client::BetaFaceClient;
pub use mock::MockFaceApi;

use crate::models::{ImageInfo, ImageUpload, PersonAssignment, RecognitionJob, RecognitionOutcome};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FaceApi: Send + Sync {
    /// Upload raw image bytes (base64-encoded on the wire).
    async fn upload_image(&self, bytes: &[u8], filename: &str) -> Result<ImageUpload>;
    async fn get_image_info(&self, image_uid: &str) -> Result<ImageInfo>;
    async fn assign_person(&self, face_uid: &str, person_id: &str) -> Result<PersonAssignment>;
    async fn start_recognition(&self, face_uid: &str, namespace: &str) -> Result<RecognitionJob>;
    async fn get_recognition_result(&self, job_id: &str) -> Result<RecognitionOutcome>;
}
