use super::FaceApi;
use crate::models::{ImageInfo, ImageUpload, PersonAssignment, RecognitionJob, RecognitionOutcome};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Scripted<T> = Arc<Mutex<VecDeque<std::result::Result<T, String>>>>;

/// Scripted [`FaceApi`] implementation for tests.
///
/// Responses queue up per endpoint and are consumed in order; once a queue
/// is exhausted the mock falls back to a permissive default. Calls and their
/// arguments are recorded for assertions. Clones share the same scripted
/// state, so tests can keep a handle after boxing the mock.
#[derive(Clone, Default)]
pub struct MockFaceApi {
    upload_responses: Scripted<ImageUpload>,
    info_responses: Scripted<ImageInfo>,
    assign_responses: Scripted<PersonAssignment>,
    job_responses: Scripted<RecognitionJob>,
    outcome_responses: Scripted<RecognitionOutcome>,

    info_calls: Arc<Mutex<usize>>,
    result_calls: Arc<Mutex<usize>>,
    assignments: Arc<Mutex<Vec<(String, String)>>>,
    recognitions: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockFaceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_response(self, response: ImageUpload) -> Self {
        self.upload_responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_upload_error(self, message: impl Into<String>) -> Self {
        self.upload_responses
            .lock()
            .unwrap()
            .push_back(Err(message.into()));
        self
    }

    pub fn with_image_info_response(self, response: ImageInfo) -> Self {
        self.info_responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue `n` not-ready image-info responses followed by one ready
    /// response carrying `face_uid`.
    pub fn with_image_info_ready_after(self, n: usize, face_uid: Option<&str>) -> Self {
        {
            let mut queue = self.info_responses.lock().unwrap();
            for _ in 0..n {
                queue.push_back(Ok(ImageInfo {
                    ready: false,
                    face_uid: None,
                }));
            }
            queue.push_back(Ok(ImageInfo {
                ready: true,
                face_uid: face_uid.map(str::to_string),
            }));
        }
        self
    }

    pub fn with_assign_response(self, response: PersonAssignment) -> Self {
        self.assign_responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_job_response(self, response: RecognitionJob) -> Self {
        self.job_responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn with_outcome_response(self, response: RecognitionOutcome) -> Self {
        self.outcome_responses
            .lock()
            .unwrap()
            .push_back(Ok(response));
        self
    }

    /// Queue `n` not-ready recognition results followed by one ready result
    /// with the given matches.
    pub fn with_outcome_ready_after(self, n: usize, matches: HashMap<String, f64>) -> Self {
        {
            let mut queue = self.outcome_responses.lock().unwrap();
            for _ in 0..n {
                queue.push_back(Ok(RecognitionOutcome {
                    ready: false,
                    matches: HashMap::new(),
                }));
            }
            queue.push_back(Ok(RecognitionOutcome {
                ready: true,
                matches,
            }));
        }
        self
    }

    pub fn image_info_call_count(&self) -> usize {
        *self.info_calls.lock().unwrap()
    }

    pub fn recognition_result_call_count(&self) -> usize {
        *self.result_calls.lock().unwrap()
    }

    /// `(face_uid, person_id)` pairs passed to `assign_person`.
    pub fn assignments(&self) -> Vec<(String, String)> {
        self.assignments.lock().unwrap().clone()
    }

    /// `(face_uid, namespace)` pairs passed to `start_recognition`.
    pub fn recognitions(&self) -> Vec<(String, String)> {
        self.recognitions.lock().unwrap().clone()
    }

    fn next<T>(queue: &Scripted<T>, default: T) -> Result<T> {
        match queue.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::Api(message)),
            None => Ok(default),
        }
    }
}

#[async_trait]
impl FaceApi for MockFaceApi {
    async fn upload_image(&self, _bytes: &[u8], _filename: &str) -> Result<ImageUpload> {
        Self::next(
            &self.upload_responses,
            ImageUpload {
                image_uid: "mock-image".to_string(),
                ready: true,
            },
        )
    }

    async fn get_image_info(&self, _image_uid: &str) -> Result<ImageInfo> {
        *self.info_calls.lock().unwrap() += 1;
        Self::next(
            &self.info_responses,
            ImageInfo {
                ready: true,
                face_uid: Some("mock-face".to_string()),
            },
        )
    }

    async fn assign_person(&self, face_uid: &str, person_id: &str) -> Result<PersonAssignment> {
        self.assignments
            .lock()
            .unwrap()
            .push((face_uid.to_string(), person_id.to_string()));
        Self::next(&self.assign_responses, PersonAssignment { ready: true })
    }

    async fn start_recognition(&self, face_uid: &str, namespace: &str) -> Result<RecognitionJob> {
        self.recognitions
            .lock()
            .unwrap()
            .push((face_uid.to_string(), namespace.to_string()));
        Self::next(
            &self.job_responses,
            RecognitionJob {
                ready: true,
                job_id: Some("mock-job".to_string()),
            },
        )
    }

    async fn get_recognition_result(&self, _job_id: &str) -> Result<RecognitionOutcome> {
        *self.result_calls.lock().unwrap() += 1;
        Self::next(
            &self.outcome_responses,
            RecognitionOutcome {
                ready: true,
                matches: HashMap::new(),
            },
        )
    }
}
