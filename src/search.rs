use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::collaborators::ProductSearch;
use crate::error::ServiceError;
use crate::gemini::preview;
use crate::models::ProductCandidate;

const SERVICE: &str = "product search";

/// Custom Search rejects `num` above this.
pub const MAX_RESULTS_PER_QUERY: usize = 10;

const BROADENING_SUFFIX: &str = " 옷 의류 패션";

const FASHION_KEYWORDS: &[&str] = &[
    "옷", "의류", "패션", "상의", "하의", "아우터", "원피스", "드레스", "재킷", "코트", "블레이저",
    "가디건", "스웨터", "후드", "셔츠", "티셔츠", "팬츠", "청바지", "바지", "스커트", "반바지",
    "신발", "운동화", "스니커즈", "가방", "액세서리", "fashion", "clothing", "apparel", "outfit",
    "wear",
];

#[must_use]
pub fn contains_fashion_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    FASHION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Appends generic fashion words to queries that would otherwise match
/// unrelated products.
#[must_use]
pub fn broaden_query(query: &str) -> String {
    if contains_fashion_keyword(query) {
        query.to_string()
    } else {
        format!("{query}{BROADENING_SUFFIX}")
    }
}

#[must_use]
pub fn clamp_results(requested: usize) -> usize {
    if requested > MAX_RESULTS_PER_QUERY {
        tracing::warn!(
            requested,
            max = MAX_RESULTS_PER_QUERY,
            "requested result count exceeds search limit, clamping"
        );
    }
    requested.clamp(1, MAX_RESULTS_PER_QUERY)
}

/// Field text the way the search API is read leniently: strings as-is,
/// numbers and booleans printed, anything else empty.
fn field_text(item: &JsonValue, key: &str) -> String {
    match item.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(v @ (JsonValue::Number(_) | JsonValue::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}

/// One hit, or `None` when the item is not an object.
fn candidate_from_item(item: &JsonValue, query: &str) -> Option<ProductCandidate> {
    if !item.is_object() {
        return None;
    }
    let image_url = field_text(item, "link");
    let link = item
        .pointer("/image/contextLink")
        .and_then(JsonValue::as_str)
        .filter(|l| !l.is_empty())
        .map_or_else(|| image_url.clone(), ToString::to_string);

    Some(ProductCandidate {
        title: field_text(item, "title"),
        image_url,
        link,
        snippet: field_text(item, "snippet"),
        search_query: query.to_string(),
    })
}

/// Candidates from a Custom Search image response body.
///
/// # Errors
///
/// `External` for HTML error pages and `error` payloads, `MalformedResponse`
/// for anything else that is not the expected JSON.
pub fn parse_search_results(
    body: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<ProductCandidate>, ServiceError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") {
        return Err(ServiceError::external(
            SERVICE,
            format!("HTML error page: {}", preview(body, 200)),
        ));
    }

    let value: JsonValue =
        serde_json::from_str(body).map_err(|e| ServiceError::malformed(SERVICE, e.to_string()))?;
    if let Some(err) = value.get("error") {
        return Err(ServiceError::external(SERVICE, err.to_string()));
    }

    let items = match value.get("items") {
        None | Some(JsonValue::Null) => return Ok(Vec::new()),
        Some(JsonValue::Array(items)) => items,
        Some(other) => {
            return Err(ServiceError::malformed(
                SERVICE,
                format!("items is not a list: {}", preview(&other.to_string(), 200)),
            ));
        }
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let candidate = candidate_from_item(item, query);
            if candidate.is_none() {
                tracing::warn!(item = %preview(&item.to_string(), 200), "skipping unreadable search item");
            }
            candidate
        })
        .take(limit)
        .collect())
}

/// [`ProductSearch`] backed by Google Custom Search (image mode).
#[derive(Debug, Clone)]
pub struct GoogleImageSearch {
    http: reqwest::Client,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub engine_id: Option<String>,
    /// Restricts hits to one shop; empty disables the restriction.
    pub site: String,
    pub timeout: Duration,
}

impl GoogleImageSearch {
    #[must_use]
    pub const fn new(
        http: reqwest::Client,
        endpoint: String,
        api_key: Option<String>,
        engine_id: Option<String>,
        site: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key,
            engine_id,
            site,
            timeout,
        }
    }

    async fn try_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ProductCandidate>, ServiceError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ServiceError::MissingCredential("product search api key"))?;
        let cx = self
            .engine_id
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ServiceError::MissingCredential("product search engine id"))?;

        let num = clamp_results(max_results);
        let q = broaden_query(query);
        tracing::info!(query = %q, num, "searching products");

        let num_param = num.to_string();
        let mut params = vec![
            ("key", key),
            ("cx", cx),
            ("q", q.as_str()),
            ("searchType", "image"),
            ("num", num_param.as_str()),
        ];
        if !self.site.is_empty() {
            params.push(("siteSearch", self.site.as_str()));
        }

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::external(SERVICE, e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ServiceError::external(
                SERVICE,
                format!("HTTP {status}: {}", preview(&body, 500)),
            ));
        }

        parse_search_results(&body, query, num)
    }
}

#[async_trait]
impl ProductSearch for GoogleImageSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<ProductCandidate> {
        match self.try_search(query, max_results).await {
            Ok(products) => {
                if products.is_empty() {
                    tracing::warn!(query, "product search returned no results");
                } else {
                    tracing::info!(query, count = products.len(), "product search done");
                }
                products
            }
            Err(e) => {
                tracing::error!(query, error = %e, "product search failed, returning no products");
                Vec::new()
            }
        }
    }
}
