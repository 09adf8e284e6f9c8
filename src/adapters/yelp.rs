use crate::domain::model::Business;
use crate::domain::ports::{SearchApi, SearchArea, SearchPage, SearchQuery};
use crate::utils::error::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

const DEFAULT_BASE_URL: &str = "https://api.yelp.com/v3";
const RESTAURANT_CATEGORY: &str = "restaurants";

/// Thin client for the Yelp Fusion business endpoints. Classification of
/// failures happens here: HTTP 429 becomes `HarvestError::RateLimited`, any
/// other non-success status becomes `HarvestError::Api`, transport failures
/// pass through as `HarvestError::Http`.
pub struct YelpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YelpClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Points the client at a different host, e.g. a mock server in tests
    /// or a proxy in front of the provider.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn query_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("categories", RESTAURANT_CATEGORY.to_string()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
            ("sort_by", query.sort.as_str().to_string()),
        ];
        match &query.area {
            SearchArea::Point {
                latitude,
                longitude,
                radius_m,
            } => {
                params.push(("term", "restaurant".to_string()));
                params.push(("latitude", latitude.to_string()));
                params.push(("longitude", longitude.to_string()));
                params.push(("radius", radius_m.to_string()));
            }
            SearchArea::Named(location) => {
                params.push(("location", location.clone()));
            }
        }
        params
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS {
            Err(HarvestError::RateLimited { detail })
        } else {
            Err(HarvestError::Api {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

#[async_trait]
impl SearchApi for YelpClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let url = format!("{}/businesses/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&Self::query_params(query))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn details(&self, business_id: &str) -> Result<Business> {
        let url = format!("{}/businesses/{}", self.base_url, business_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
