use betaface_client::api::MockFaceApi;
use betaface_client::models::{ImageInfo, ImageUpload, PersonAssignment, RecognitionJob};
use betaface_client::{Error, FaceServiceClient, PollPolicy};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn fast_poll() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_attempts: None,
    }
}

fn fake_image(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("photo.jpg");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"\xff\xd8\xff fake jpeg bytes").unwrap();
    path
}

/// Scenario A: upload succeeds, face found, assignment accepted.
#[tokio::test]
async fn test_upload_face_tags_detected_face() {
    let mock = MockFaceApi::new()
        .with_upload_response(ImageUpload {
            image_uid: "IMG1".to_string(),
            ready: true,
        })
        .with_image_info_response(ImageInfo {
            ready: true,
            face_uid: Some("FACE1".to_string()),
        })
        .with_assign_response(PersonAssignment { ready: true });
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let result = client
        .upload_face(fake_image(&dir), "john.doe")
        .await
        .unwrap();

    assert!(result.unwrap().ready);
    assert_eq!(
        handle.assignments(),
        vec![("FACE1".to_string(), "john.doe".to_string())]
    );
}

/// Scenario B: no face in the image means success with no result, and the
/// assignment endpoint is never called.
#[tokio::test]
async fn test_upload_face_without_face_returns_none() {
    let mock = MockFaceApi::new().with_image_info_response(ImageInfo {
        ready: true,
        face_uid: None,
    });
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let result = client
        .upload_face(fake_image(&dir), "john.doe")
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(handle.assignments().is_empty());
}

/// Scenario C: a namespace without '@' is scoped as all@<namespace>.
#[tokio::test]
async fn test_recognize_faces_normalizes_bare_namespace() {
    let mock = MockFaceApi::new();
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    client
        .recognize_faces(fake_image(&dir), "teamX")
        .await
        .unwrap();

    let recognitions = handle.recognitions();
    assert_eq!(recognitions.len(), 1);
    assert_eq!(recognitions[0].1, "all@teamX");
}

#[tokio::test]
async fn test_recognize_faces_keeps_qualified_namespace() {
    let mock = MockFaceApi::new();
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    client
        .recognize_faces(fake_image(&dir), "group@teamX")
        .await
        .unwrap();

    assert_eq!(handle.recognitions()[0].1, "group@teamX");
}

/// Scenario D: the final payload's match entries come back as a
/// name-to-confidence map.
#[tokio::test]
async fn test_recognize_faces_returns_match_map() {
    let mut matches = HashMap::new();
    matches.insert("alice".to_string(), 0.91);
    matches.insert("bob".to_string(), 0.42);

    let mock = MockFaceApi::new().with_outcome_ready_after(0, matches.clone());
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let result = client
        .recognize_faces(fake_image(&dir), "team")
        .await
        .unwrap();

    assert_eq!(result, matches);
}

/// No face detected: recognition resolves to an empty map and the job is
/// never started.
#[tokio::test]
async fn test_recognize_faces_without_face_returns_empty_map() {
    let mock = MockFaceApi::new().with_image_info_response(ImageInfo {
        ready: true,
        face_uid: None,
    });
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let result = client
        .recognize_faces(fake_image(&dir), "team")
        .await
        .unwrap();

    assert!(result.is_empty());
    assert!(handle.recognitions().is_empty());
}

/// N not-ready responses then ready: the poll loop issues exactly N+1 calls.
#[tokio::test]
async fn test_polling_converges_after_n_attempts() {
    let mock = MockFaceApi::new().with_image_info_ready_after(3, Some("FACE1"));
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let info = client.get_image_info("IMG1").await.unwrap();

    assert!(info.ready);
    assert_eq!(info.face_uid.as_deref(), Some("FACE1"));
    assert_eq!(handle.image_info_call_count(), 4);
}

#[tokio::test]
async fn test_recognition_result_polling_converges() {
    let mut matches = HashMap::new();
    matches.insert("alice".to_string(), 0.91);

    let mock = MockFaceApi::new().with_outcome_ready_after(2, matches.clone());
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let result = client
        .recognize_faces(fake_image(&dir), "team")
        .await
        .unwrap();

    assert_eq!(result, matches);
    assert_eq!(handle.recognition_result_call_count(), 3);
}

#[tokio::test]
async fn test_upload_failure_aborts_operation() {
    let mock = MockFaceApi::new().with_upload_error("connection refused");
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let err = client
        .upload_face(fake_image(&dir), "john.doe")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api(_)));
    assert_eq!(handle.image_info_call_count(), 0);
}

#[tokio::test]
async fn test_rejected_assignment_is_an_error() {
    let mock = MockFaceApi::new().with_assign_response(PersonAssignment { ready: false });
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let err = client
        .upload_face(fake_image(&dir), "john.doe")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api(_)));
}

/// A not-ready response at the job-start step means the job failed to
/// start, so the whole operation fails and the result is never polled.
#[tokio::test]
async fn test_job_start_failure_aborts_recognition() {
    let mock = MockFaceApi::new().with_job_response(RecognitionJob {
        ready: false,
        job_id: None,
    });
    let handle = mock.clone();
    let client = FaceServiceClient::new(Box::new(mock)).with_poll_policy(fast_poll());

    let dir = tempfile::tempdir().unwrap();
    let err = client
        .recognize_faces(fake_image(&dir), "team")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api(_)));
    assert_eq!(handle.recognition_result_call_count(), 0);
}

#[tokio::test]
async fn test_missing_file_is_an_io_error() {
    let client =
        FaceServiceClient::new(Box::new(MockFaceApi::new())).with_poll_policy(fast_poll());
    let err = client
        .upload_face("/nonexistent/photo.jpg", "john.doe")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
