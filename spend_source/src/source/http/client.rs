use async_trait::async_trait;
use reqwest::{Client, Response, Url, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared_utils::env::get_env_var;
use snafu::ResultExt;

use crate::{
    models::{FilterSelection, SpendRecord},
    source::{
        ApiSnafu, ClientBuildSnafu, DecodeSnafu, InvalidBaseUrlSnafu, MissingEnvVarSnafu,
        ReqwestSnafu, SourceError, SourceInitError, SpendSource,
        http::{
            params::{
                CATEGORIES_PATH, DASHBOARD_PATH, MONTH_YEAR_HEADER, MONTH_YEARS_PATH,
                START_YEAR_HEADER, categories_query, dashboard_query, endpoint_url, latin1_header,
                month_years_query,
            },
            response::{MonthYearsResponse, decode_records},
        },
    },
};

/// Production finance API.
pub const DEFAULT_BASE_URL: &str = "http://api.financeiro.arielgiacomini.com.br";

/// Environment variable that selects the API base URL for [`HttpSpendSource::from_env`].
pub const BASE_URL_ENV: &str = "SPEND_API_BASE_URL";

pub struct HttpSpendSource {
    client: Client,
    base_url: String,
}

impl HttpSpendSource {
    /// Creates a source talking to `base_url` (scheme + host, optional path prefix).
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceInitError> {
        let base_url = base_url.into();
        if let Err(e) = Url::parse(&base_url) {
            return InvalidBaseUrlSnafu {
                base_url,
                reason: e.to_string(),
            }
            .fail();
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self { client, base_url })
    }

    /// Creates a source from the `SPEND_API_BASE_URL` environment variable.
    pub fn from_env() -> Result<Self, SourceInitError> {
        let base_url = get_env_var(BASE_URL_ENV).context(MissingEnvVarSnafu)?;
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json<T: DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> Result<T, SourceError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| "Unknown API error".to_string());
            return ApiSnafu {
                endpoint,
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response.bytes().await.context(ReqwestSnafu { endpoint })?;
        serde_json::from_slice(&body).context(DecodeSnafu { endpoint })
    }
}

#[async_trait]
impl SpendSource for HttpSpendSource {
    async fn list_categories(&self) -> Result<Vec<String>, SourceError> {
        let endpoint = CATEGORIES_PATH;
        tracing::debug!(endpoint, "listing categories");

        let response = self
            .client
            .get(endpoint_url(&self.base_url, endpoint))
            .query(&categories_query())
            .send()
            .await
            .context(ReqwestSnafu { endpoint })?;

        Self::read_json(endpoint, response).await
    }

    async fn list_month_years(
        &self,
        from_year: i32,
        to_year: i32,
    ) -> Result<Vec<String>, SourceError> {
        let endpoint = MONTH_YEARS_PATH;
        tracing::debug!(endpoint, from_year, to_year, "listing month/years");

        let response = self
            .client
            .get(endpoint_url(&self.base_url, endpoint))
            .query(&month_years_query(to_year))
            .header(START_YEAR_HEADER, from_year.to_string())
            .send()
            .await
            .context(ReqwestSnafu { endpoint })?;

        let body: MonthYearsResponse = Self::read_json(endpoint, response).await?;
        Ok(body.month_years)
    }

    async fn fetch_dashboard(
        &self,
        filters: &FilterSelection,
    ) -> Result<Vec<SpendRecord>, SourceError> {
        let endpoint = DASHBOARD_PATH;
        tracing::debug!(endpoint, %filters, "fetching dashboard records");

        let month_year = latin1_header(MONTH_YEAR_HEADER, &filters.month_year)?;
        let response = self
            .client
            .get(endpoint_url(&self.base_url, endpoint))
            .query(&dashboard_query(&filters.category))
            .header(MONTH_YEAR_HEADER, month_year)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .context(ReqwestSnafu { endpoint })?;

        let rows: Vec<Value> = Self::read_json(endpoint, response).await?;
        Ok(decode_records(rows))
    }
}
