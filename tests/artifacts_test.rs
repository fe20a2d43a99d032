//! Artifact serving tests: streaming, cache defeat, traversal safety.

mod common;

use common::{submission_form, TestHarness};

#[tokio::test]
async fn serves_artifact_bytes_with_no_cache_headers() {
    let (h, addr) = TestHarness::with_server().await;
    std::fs::create_dir_all(h.artifact_dir()).unwrap();
    std::fs::write(h.artifact_dir().join("page.xml"), b"<score/>").unwrap();

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/api/artifacts/page.xml"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(resp.headers().get("pragma").unwrap(), "no-cache");
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/xml");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"<score/>");
}

#[tokio::test]
async fn midi_artifacts_get_midi_content_type() {
    let (h, addr) = TestHarness::with_server().await;
    std::fs::create_dir_all(h.artifact_dir()).unwrap();
    std::fs::write(h.artifact_dir().join("song_basic_pitch.mid"), b"MThd").unwrap();

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/api/artifacts/song_basic_pitch.mid"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("content-type").unwrap(), "audio/midi");
}

#[tokio::test]
async fn missing_artifact_is_404() {
    let (_h, addr) = TestHarness::with_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/api/artifacts/missing.xml"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn traversal_cannot_escape_artifact_dir() {
    let (h, addr) = TestHarness::with_server().await;
    std::fs::create_dir_all(h.artifact_dir()).unwrap();

    // A secret outside the artifact directory.
    let secret = h.artifact_dir().parent().unwrap().join("secret.txt");
    std::fs::write(&secret, b"keep out").unwrap();

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/api/artifacts/..%2Fsecret.txt"))
        .send()
        .await
        .unwrap();

    // The traversal segment is stripped, so the request resolves to
    // `secret.txt` inside the artifact dir, which does not exist.
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn direct_fetch_skips_registry_check() {
    // A companion file may be gone (so the record is not listed) while the
    // primary still serves by name.
    let (h, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{addr}/api/convert"))
        .multipart(submission_form("page.png", b"png", Some("image"), None))
        .send()
        .await
        .unwrap();

    std::fs::remove_file(h.artifact_dir().join("page.omr")).unwrap();

    let listed: serde_json::Value = client
        .get(format!("http://{addr}/api/conversions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let resp = client
        .get(format!("http://{addr}/api/artifacts/page.xml"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
