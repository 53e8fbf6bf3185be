//! Integration tests for the record-replay cycle

use std::io::Cursor;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use fixtape::config::{FixtureConfig, Mode};
use fixtape::exchange::{BodyStream, ExchangeRecord, RequestRecord, ResponseRecord};
use fixtape::fingerprint::FINGERPRINT_LEN;
use fixtape::naming::{FixtureFileNamer, FixturePart};
use fixtape::recording::RecordingEngine;
use fixtape::replay::ReplayEngine;
use fixtape::storage::{ExchangeCodec, FixtureAsset};
use fixtape::FixtureError;

fn json_request(url: &str, body: &str) -> RequestRecord {
    RequestRecord::parse("POST", url)
        .unwrap()
        .with_header("Content-Type", "application/json")
        .with_body(body.to_string())
}

#[test]
fn test_record_then_replay() {
    let temp_dir = TempDir::new().unwrap();
    let record_config = FixtureConfig::new(Mode::Record, temp_dir.path().to_path_buf());
    let replay_config = FixtureConfig::new(Mode::Replay, temp_dir.path().to_path_buf());
    replay_config.validate().unwrap();

    // Phase 1: record
    {
        let engine = RecordingEngine::from_config(&record_config);

        for i in 0..10 {
            let mut exchange = ExchangeRecord::new(json_request(
                "https://api.example.com/v1/items",
                &format!(r#"{{"page":{i},"size":20}}"#),
            ));
            let response = ResponseRecord::new(200)
                .with_header("Content-Type", "application/json")
                .with_body(format!(r#"{{"page":{i}}}"#));
            engine.record(&mut exchange, response).unwrap();
        }

        assert_eq!(engine.recorded_count(), 10);
    }

    // Phase 2: replay with keys emitted in a different order
    {
        let engine = ReplayEngine::from_config(&replay_config);

        for i in 0..10 {
            let mut exchange = ExchangeRecord::new(json_request(
                "https://api.example.com/v1/items",
                &format!(r#"{{"size":20,"page":{i}}}"#),
            ));
            let response = engine.replay(&mut exchange).unwrap().unwrap();
            assert_eq!(response.status, 200);
            assert_eq!(
                response.body.as_deref(),
                Some(format!(r#"{{"page":{i}}}"#).as_bytes())
            );
        }

        let stats = engine.cache_stats();
        assert_eq!(stats.size, 10);
        assert_eq!(stats.misses, 10);
    }
}

#[test]
fn test_fixture_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let engine =
        RecordingEngine::from_config(&FixtureConfig::new(Mode::Record, temp_dir.path().into()));

    let mut exchange = ExchangeRecord::new(
        RequestRecord::parse("POST", "https://example.com/upload")
            .unwrap()
            .with_header("Content-Type", "image/png")
            .with_body(vec![0x89, b'P', b'N', b'G']),
    );
    let response = ResponseRecord::new(201)
        .with_header("Content-Type", "text/html; charset=utf-8")
        .with_body("<p>ok</p>");

    let path = engine.record(&mut exchange, response).unwrap();
    let fp = exchange.fingerprint().unwrap().to_string();
    assert_eq!(fp.len(), FINGERPRINT_LEN);

    let host_dir = temp_dir.path().join("example.com");
    assert_eq!(path, host_dir.join(format!("upload-{fp}.json")));
    assert!(host_dir.join(format!("upload-{fp}-request.png")).exists());
    assert!(host_dir.join(format!("upload-{fp}-response.html")).exists());

    let metadata: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let keys: Vec<&String> = metadata.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(
        metadata["request"]["body_file"],
        json!(format!("example.com/upload-{fp}-request.png"))
    );
    assert_eq!(metadata["response"]["status"], json!(201));
}

#[test]
fn test_path_less_url_fixture_name() {
    let namer = FixtureFileNamer::default();
    let mut exchange =
        ExchangeRecord::new(RequestRecord::parse("GET", "https://example.com").unwrap());
    let fp = exchange.fingerprint().unwrap().to_string();

    assert_eq!(
        exchange.file_name(&namer, FixturePart::Metadata).unwrap(),
        Some(format!("example.com-{fp}.json"))
    );
}

#[test]
fn test_query_changes_fingerprint_only() {
    let namer = FixtureFileNamer::default();
    let mut a = ExchangeRecord::new(
        RequestRecord::parse("GET", "https://example.com/v1/items?page=1").unwrap(),
    );
    let mut b = ExchangeRecord::new(
        RequestRecord::parse("GET", "https://example.com/v1/items?page=2").unwrap(),
    );

    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    assert_eq!(
        a.identity().unwrap().base_name(),
        b.identity().unwrap().base_name()
    );
    assert_ne!(
        a.file_name(&namer, FixturePart::Metadata).unwrap(),
        b.file_name(&namer, FixturePart::Metadata).unwrap()
    );
}

#[test]
fn test_normalizer_neutralizes_volatile_query() {
    let temp_dir = TempDir::new().unwrap();
    let config = FixtureConfig::new(Mode::Record, temp_dir.path().to_path_buf());
    let drop_query = Arc::new(|mut request: RequestRecord| {
        if let Some(url) = request.url.as_mut() {
            url.set_query(None);
        }
        request
    });

    let mut recorded = ExchangeRecord::with_normalizer(
        RequestRecord::parse("GET", "https://example.com/feed?ts=1").unwrap(),
        drop_query.clone(),
    );
    RecordingEngine::from_config(&config)
        .record(&mut recorded, ResponseRecord::new(200).with_body("feed"))
        .unwrap();

    let mut issued = ExchangeRecord::with_normalizer(
        RequestRecord::parse("GET", "https://example.com/feed?ts=2").unwrap(),
        drop_query,
    );
    let response = ReplayEngine::from_config(&config)
        .replay(&mut issued)
        .unwrap()
        .unwrap();
    assert_eq!(response.body.as_deref(), Some(&b"feed"[..]));
}

#[test]
fn test_streamed_request_body_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let config = FixtureConfig::new(Mode::Record, temp_dir.path().to_path_buf());

    let stream = config.body_stream(Cursor::new(br#"{"z":1,"a":2}"#.to_vec()));
    let mut recorded = ExchangeRecord::new(
        RequestRecord::parse("PUT", "https://example.com/doc")
            .unwrap()
            .with_body_stream(stream),
    );
    RecordingEngine::from_config(&config)
        .record(&mut recorded, ResponseRecord::new(204))
        .unwrap();

    let mut issued = ExchangeRecord::new(
        RequestRecord::parse("PUT", "https://example.com/doc")
            .unwrap()
            .with_body_stream(BodyStream::new(Cursor::new(br#"{"a":2,"z":1}"#.to_vec()))),
    );
    let response = ReplayEngine::from_config(&config)
        .replay(&mut issued)
        .unwrap()
        .unwrap();
    assert_eq!(response.status, 204);
    assert!(response.body.is_none());
}

#[test]
fn test_inline_config_embeds_all_bodies() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = FixtureConfig::new(Mode::Record, temp_dir.path().to_path_buf());
    config.inline_bodies = true;

    let mut exchange = ExchangeRecord::new(json_request("https://example.com/a", "{}"));
    exchange.set_response(
        ResponseRecord::new(200)
            .with_header("Content-Type", "application/json")
            .with_body("[]"),
    );

    let encoded = config.codec().encode(&mut exchange).unwrap();
    assert!(encoded.assets.is_empty());
    assert!(encoded.document.request.body.body.is_some());
    assert!(encoded.document.response.unwrap().body.body.is_some());
}

#[test]
fn test_decode_contract() {
    const NO_ASSETS: &[FixtureAsset] = &[];
    let codec = ExchangeCodec::default();

    let missing_request = br#"{"response":{"status":200}}"#;
    assert!(matches!(
        codec.decode_slice(missing_request, NO_ASSETS),
        Err(FixtureError::InvalidFormat(_))
    ));

    let request_only = br#"{"request":{"method":"GET","url":"https://example.com/a"}}"#;
    let decoded = codec.decode_slice(request_only, NO_ASSETS).unwrap();
    assert!(decoded.response().is_none());
}

#[test]
fn test_unidentifiable_request_is_not_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let engine =
        RecordingEngine::from_config(&FixtureConfig::new(Mode::Record, temp_dir.path().into()));

    let mut exchange = ExchangeRecord::new(RequestRecord::new("GET", None));
    assert_eq!(exchange.fingerprint().unwrap(), "");
    assert!(matches!(
        engine.record(&mut exchange, ResponseRecord::new(200)),
        Err(FixtureError::Unidentifiable(_))
    ));
}
