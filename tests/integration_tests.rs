//! Integration tests for recommender-proxy
//!
//! The router is driven through axum-test with in-memory lookups standing in
//! for tabix and the recommender script.

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use recommender_proxy::{
    Error, Result,
    handlers::{AppState, create_router},
    lookup::{Recommender, RecommenderRequest, RegionLookup, TabixRequest},
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeLookup {
    output: String,
    requests: Mutex<Vec<TabixRequest>>,
}

#[async_trait]
impl RegionLookup for FakeLookup {
    async fn query(&self, request: &TabixRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.output.clone())
    }
}

enum FakeRecommender {
    Output(String),
    Fails,
}

#[async_trait]
impl Recommender for FakeRecommender {
    async fn recommend(&self, _request: &RecommenderRequest) -> Result<String> {
        match self {
            FakeRecommender::Output(out) => Ok(out.clone()),
            FakeRecommender::Fails => Err(Error::Upstream("recommender exited with 1".to_string())),
        }
    }
}

fn create_test_server(lookup: Arc<FakeLookup>, recommender: FakeRecommender) -> TestServer {
    let state = AppState {
        lookup,
        recommender: Arc::new(recommender),
        work_dir: PathBuf::from("/tmp/recommender-proxy-tests"),
        cors: true,
    };

    TestServer::new(create_router(state)).unwrap()
}

fn lookup_with(output: &str) -> Arc<FakeLookup> {
    Arc::new(FakeLookup {
        output: output.to_string(),
        ..Default::default()
    })
}

fn v2_url(format: &str) -> String {
    format!(
        "/v2?datasetAltname=vC&assembly=hg19&stateModel=18&groupEncoded=All_833_biosamples\
         &saliencyLevel=S1&chromosome=chr1&start=1000&end=2000\
         &tabixUrlEncoded=https%3A%2F%2Fexample.org%2Ftabix&scaleLevel=5&windowSize=1\
         &outputFormat={}",
        format
    )
}

const V1_URL: &str = "/v1?datasetEncoded=ADSERA&datasetAltname=vC&assembly=hg19&stateModel=18\
    &groupEncoded=All_833_biosamples&saliencyLevel=S1&chromosome=chr1&start=1000&end=2000\
    &outputDestination=stdout&outputFormat=BED";

const SCENARIO: &str = "chr1\t1400\t1600\t[\"chr1:1400:1600\",\"chr1:1450:1550\"]\n\n";

#[tokio::test]
async fn test_v2_json_envelope() {
    let lookup = lookup_with(SCENARIO);
    let server = create_test_server(lookup.clone(), FakeRecommender::Output(String::new()));

    let response = server.get(&v2_url("JSON")).await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let body: Value = response.json();
    assert_eq!(body["query"]["hitCount"], 1);
    assert_eq!(body["query"]["hitFirstStartDiff"], 400);
    assert_eq!(body["query"]["hitFirstEndDiff"], 400);
    assert_eq!(
        body["query"]["hitFirstInterval"],
        serde_json::json!(["chr1", "1400", "1600"])
    );
    assert_eq!(
        body["query"]["tabixPath"],
        "https://example.org/tabix/recommender/v2/vC/hg19/18/All_833_biosamples/S1/5/1/recommendations.bed.gz"
    );
    assert_eq!(body["hits"], serde_json::json!(["chr1\t1050\t1950"]));

    let requests = lookup.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].region, "chr1:1000-2000");
    assert_eq!(
        requests[0].work_dir,
        PathBuf::from("/tmp/recommender-proxy-tests/recommender/v2/vC/hg19/18/All_833_biosamples/S1/5/1")
    );
}

#[tokio::test]
async fn test_v2_bed_passthrough() {
    let server = create_test_server(lookup_with(SCENARIO), FakeRecommender::Output(String::new()));

    let response = server.get(&v2_url("BED")).await;
    response.assert_status_ok();
    assert_eq!(response.headers().get("content-type").unwrap(), "text/plain");
    assert_eq!(response.text(), SCENARIO);
}

#[tokio::test]
async fn test_v2_no_hits() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Output(String::new()));

    let response = server.get(&v2_url("JSON")).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["query"]["hitCount"], 0);
    assert_eq!(body["query"]["hitDistance"], -1);
    assert_eq!(body["hits"], serde_json::json!([]));
}

#[tokio::test]
async fn test_v2_unsupported_format() {
    let lookup = lookup_with(SCENARIO);
    let server = create_test_server(lookup.clone(), FakeRecommender::Output(String::new()));

    let response = server.get(&v2_url("XML")).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "UnsupportedFormat");
    assert_eq!(body["error"]["message"], "invalid output format specified (XML)");

    // rejected before tabix ever runs
    assert!(lookup.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_v2_malformed_packed_field() {
    let server = create_test_server(
        lookup_with("chr1\t1400\t1600\t{not json\n"),
        FakeRecommender::Output(String::new()),
    );

    let response = server.get(&v2_url("JSON")).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "UpstreamParseError");
}

#[tokio::test]
async fn test_v2_bad_coordinates() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Output(String::new()));

    let url = v2_url("JSON").replace("start=1000", "start=abc");
    let response = server.get(&url).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "InvalidInput");
}

#[tokio::test]
async fn test_v2_inverted_window() {
    let lookup = lookup_with(SCENARIO);
    let server = create_test_server(lookup.clone(), FakeRecommender::Output(String::new()));

    let url = v2_url("JSON")
        .replace("start=1000", "start=9223372036854775807")
        .replace("end=2000", "end=0");
    let response = server.get(&url).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "InvalidInput");
    assert!(lookup.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_v2_inverted_window_with_huge_window_size() {
    let lookup = lookup_with(SCENARIO);
    let server = create_test_server(lookup.clone(), FakeRecommender::Output(String::new()));

    let url = v2_url("JSON")
        .replace("start=1000", "start=10")
        .replace("end=2000", "end=0")
        .replace("windowSize=1", "windowSize=9223372036854775807");
    let response = server.get(&url).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "InvalidInput");
    assert!(lookup.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_v2_window_size_overflow() {
    let lookup = lookup_with(SCENARIO);
    let server = create_test_server(lookup.clone(), FakeRecommender::Output(String::new()));

    for format in ["JSON", "BED"] {
        let url = v2_url(format).replace("windowSize=1", "windowSize=9223372036854775807");
        let response = server.get(&url).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["error"]["type"], "InvalidInput");
    }
    assert!(lookup.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_v2_out_of_range_record() {
    let server = create_test_server(
        lookup_with("chr1\t-9223372036854775808\t1600\t[\"a:1:2\",\"b:3:4\"]\n"),
        FakeRecommender::Output(String::new()),
    );

    let response = server.get(&v2_url("JSON")).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "UpstreamParseError");
}

#[tokio::test]
async fn test_v2_missing_state_model() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Output(String::new()));

    let url = v2_url("JSON").replace("stateModel=18&", "");
    let response = server.get(&url).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_v2_dhs_index_without_state_model() {
    let lookup = lookup_with("");
    let server = create_test_server(lookup.clone(), FakeRecommender::Output(String::new()));

    let url = "/v2?datasetAltname=dhsIndex&assembly=hg38&groupEncoded=All&chromosome=chr2\
               &start=5&end=10&tabixUrlEncoded=%2Fsrv%2Ftabix&scaleLevel=1&windowSize=5\
               &outputFormat=BED";
    server.get(url).await.assert_status_ok();

    let requests = lookup.requests.lock().unwrap();
    assert_eq!(
        requests[0].path,
        "/srv/tabix/dhsIndex/hg38/All/1/5/recommendations.bed.gz"
    );
}

#[tokio::test]
async fn test_v1_bed() {
    let server = create_test_server(
        lookup_with(""),
        FakeRecommender::Output("chr5\t100\t200\n".to_string()),
    );

    let response = server.get(V1_URL).await;
    response.assert_status_ok();
    assert_eq!(response.headers().get("content-type").unwrap(), "text/plain");
    assert_eq!(response.text(), "chr5\t100\t200\n");
}

#[tokio::test]
async fn test_v1_json_content_type() {
    let server = create_test_server(
        lookup_with(""),
        FakeRecommender::Output("[]".to_string()),
    );

    let url = V1_URL.replace("outputFormat=BED", "outputFormat=JSON");
    let response = server.get(&url).await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_v1_invalid_format() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Output(String::new()));

    let url = V1_URL.replace("outputFormat=BED", "outputFormat=CSV");
    let response = server.get(&url).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_v1_script_failure() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Fails);

    let response = server.get(V1_URL).await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "UpstreamError");
}

#[tokio::test]
async fn test_favicon_not_found() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Output(String::new()));

    server.get("/favicon.ico").await.assert_status_not_found();
}

#[tokio::test]
async fn test_no_cache_headers() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Output(String::new()));

    let response = server.get(&v2_url("JSON")).await;
    let cache_control = response.headers().get("cache-control").unwrap();
    assert!(cache_control.to_str().unwrap().contains("no-store"));
    assert_eq!(response.headers().get("pragma").unwrap(), "no-cache");
    assert_eq!(response.headers().get("expires").unwrap(), "0");
}

#[tokio::test]
async fn test_cors_mirrors_origin() {
    let server = create_test_server(lookup_with(""), FakeRecommender::Output(String::new()));

    let response = server
        .get(&v2_url("JSON"))
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://epilogos.example.org"),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://epilogos.example.org"
    );
    assert_eq!(
        response.headers().get("access-control-allow-credentials").unwrap(),
        "true"
    );
}
