use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use clap::Parser;
use serde_json::json;
use tower::ServiceExt;

use outfit_advisor::{
    build_app,
    collaborators::{ImageGenerator, ProductSearch, Vision},
    config::Config,
    data_url,
    error::ServiceError,
    models::{AppState, FashionAttributes, ProductCandidate},
    outfit_text::OutfitTextComposer,
    pipeline::Pipeline,
};

#[derive(Default)]
struct Counts {
    extract: AtomicUsize,
    recommend: AtomicUsize,
    generate: AtomicUsize,
    search: AtomicUsize,
}

impl Counts {
    fn total(&self) -> usize {
        self.extract.load(Ordering::SeqCst)
            + self.recommend.load(Ordering::SeqCst)
            + self.generate.load(Ordering::SeqCst)
            + self.search.load(Ordering::SeqCst)
    }
}

struct FakeVision {
    counts: Arc<Counts>,
    fail: bool,
}

#[async_trait]
impl Vision for FakeVision {
    async fn extract_attributes(&self, _image: &[u8]) -> Result<FashionAttributes, ServiceError> {
        self.counts.extract.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::external("vision", "HTTP 503"));
        }
        Ok(FashionAttributes {
            style: Some("casual".into()),
            colors: vec!["black".into(), "white".into()],
            clothing_type: Some("jacket".into()),
            pattern: Some("플레인".into()),
            ..FashionAttributes::default()
        })
    }

    async fn recommend_product_name(
        &self,
        _image: &[u8],
        _attrs: Option<&FashionAttributes>,
    ) -> Result<String, ServiceError> {
        self.counts.recommend.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::external("vision", "HTTP 503"));
        }
        Ok("베이지 니트 가디건".into())
    }
}

struct FakeImages {
    counts: Arc<Counts>,
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate(&self, _reference: Option<&[u8]>, _prompt: &str) -> Result<String, ServiceError> {
        self.counts.generate.fetch_add(1, Ordering::SeqCst);
        Ok(data_url::encode(data_url::PNG_MIME, b"\x89PNG fake"))
    }
}

struct FakeSearch {
    counts: Arc<Counts>,
}

#[async_trait]
impl ProductSearch for FakeSearch {
    async fn search(&self, query: &str, _max_results: usize) -> Vec<ProductCandidate> {
        self.counts.search.fetch_add(1, Ordering::SeqCst);
        vec![ProductCandidate {
            title: "니트 가디건".into(),
            image_url: "https://img.example/1.jpg".into(),
            link: "https://shop.example/1".into(),
            snippet: "베이지".into(),
            search_query: query.into(),
        }]
    }
}

struct TestCtx {
    app: Router,
    counts: Arc<Counts>,
}

fn make_ctx(vision_fails: bool) -> TestCtx {
    let counts = Arc::new(Counts::default());
    let pipeline = Pipeline::new(
        Arc::new(FakeVision {
            counts: counts.clone(),
            fail: vision_fails,
        }),
        Arc::new(FakeImages {
            counts: counts.clone(),
        }),
        Arc::new(FakeSearch {
            counts: counts.clone(),
        }),
        OutfitTextComposer::default(),
    );
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: Config::parse_from(["outfit-advisor"]),
    };
    TestCtx {
        app: build_app(state),
        counts,
    }
}

const BOUNDARY: &str = "outfit-test-boundary";

fn multipart_body(field: &str, bytes: &[u8]) -> Body {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"look.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn upload(path: &str, field: &str, bytes: &[u8]) -> Request<Body> {
    Request::post(path)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(multipart_body(field, bytes))
        .unwrap()
}

async fn json_req(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| json!({"_raw": String::from_utf8_lossy(&bytes)}))
    };
    (status, body)
}

#[tokio::test]
async fn health_ok() {
    let ctx = make_ctx(false);
    let (st, body) = json_req(
        &ctx.app,
        Request::get("/api/outfit/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(body, json!({"_raw": "OK"}));
}

#[tokio::test]
async fn recommend_returns_camel_case_suggestion() {
    let ctx = make_ctx(false);
    let (st, body) = json_req(
        &ctx.app,
        upload("/api/outfit/recommend", "image", b"\xFF\xD8photo"),
    )
    .await;

    assert_eq!(st, StatusCode::OK, "{body}");
    assert_eq!(
        body["description"],
        "캐주얼 스타일, 블랙와 화이트 컬러 조합, 재킷 중심 코디 + 베이지 니트 가디건"
    );
    assert_eq!(body["searchQuery"], "베이지 니트 가디건");
    assert!(
        body["outfitImageUrl"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert!(body["prompt"].as_str().unwrap().contains("casual 스타일"));
    assert_eq!(body["products"][0]["imageUrl"], "https://img.example/1.jpg");
    assert_eq!(body["products"][0]["searchQuery"], "베이지 니트 가디건");

    assert_eq!(ctx.counts.recommend.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.counts.extract.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.counts.generate.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.counts.search.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn products_accepts_file_field() {
    let ctx = make_ctx(false);
    let (st, body) = json_req(
        &ctx.app,
        upload("/api/outfit/products", "file", b"\xFF\xD8photo"),
    )
    .await;

    assert_eq!(st, StatusCode::OK, "{body}");
    assert_eq!(body["description"], "캐주얼 스타일, 블랙와 화이트 컬러 조합, 재킷 중심 코디");
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(ctx.counts.total(), 4);
}

#[tokio::test]
async fn empty_upload_is_rejected_without_external_calls() {
    for path in ["/api/outfit/recommend", "/api/outfit/products"] {
        let ctx = make_ctx(false);
        let (st, _) = json_req(&ctx.app, upload(path, "image", b"")).await;
        assert_eq!(st, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(ctx.counts.total(), 0, "{path}");
    }
}

#[tokio::test]
async fn missing_image_field_is_rejected() {
    let ctx = make_ctx(false);
    let (st, _) = json_req(
        &ctx.app,
        upload("/api/outfit/recommend", "avatar", b"photo"),
    )
    .await;
    assert_eq!(st, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.counts.total(), 0);
}

#[tokio::test]
async fn vision_failure_aborts_before_image_generation() {
    let ctx = make_ctx(true);
    let (st, body) = json_req(
        &ctx.app,
        upload("/api/outfit/products", "image", b"photo"),
    )
    .await;

    assert_eq!(st, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("vision"));
    assert_eq!(ctx.counts.extract.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.counts.generate.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.counts.search.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn request_id_is_propagated() {
    let ctx = make_ctx(false);
    let res = ctx
        .app
        .clone()
        .oneshot(Request::get("/api/outfit/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));
}
