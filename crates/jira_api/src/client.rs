//! HTTP client for the Jira REST API: saved filters, paginated search and worklogs.

use crate::auth::basic_auth_header;
use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{Filter, Issue, SearchPage, Worklog, WorklogPage};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Authenticated client sharing one rate limiter across all of its requests.
#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    limiter: RateLimiter,
}

impl JiraClient {
    /// Builds the HTTP client with basic auth and JSON headers from `config`.
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.cooldown);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    /// Limiter pacing this client; its counter tells how many requests went out.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// GET a path relative to the API root.
    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url_for(path)?;
        self.get_url(url).await
    }

    /// GET an absolute URL, such as the `searchUrl` of a filter.
    pub async fn get_url<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        debug!(url = %redact_query(&url), "jira request");
        let response = self.http.get(url).send().await?;
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        Url::parse(&base).map_err(|err| JiraError::Other(err.to_string()))
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            // Jira answers some empty result sets with no body at all.
            let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
            serde_json::from_str(body).map_err(JiraError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(JiraError::http(status, body))
        }
    }

    /// Fetches a saved filter, including its `searchUrl`.
    pub async fn get_filter(&self, filter_id: &str) -> Result<Filter> {
        let path = format!("filter/{}", filter_id);
        self.get(&path).await
    }

    /// Fetches one page of an absolute search URL.
    pub async fn search_page(&self, search_url: &str, start_at: u64, max_results: u32) -> Result<SearchPage> {
        let mut url = Url::parse(search_url).map_err(|err| JiraError::Other(err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("startAt", &start_at.to_string())
            .append_pair("maxResults", &max_results.to_string());
        self.get_url(url).await
    }

    /// Resolves a saved filter and downloads every issue it matches.
    ///
    /// Pages are requested until the reported total is reached. The run is
    /// rejected with [`JiraError::IncompleteDownload`] when the number of
    /// downloaded issues differs from the final reported total.
    pub async fn search_filter(&self, filter_id: &str) -> Result<Vec<Issue>> {
        let filter = self.get_filter(filter_id).await?;
        let search_url = filter
            .search_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| JiraError::MissingSearchUrl(filter_id.to_string()))?;

        let page_size = self.config.page_size;
        let mut issues: Vec<Issue> = Vec::new();
        let mut start_at = 0u64;
        // One request is always made so the real total becomes known.
        let mut total = 1u64;

        while start_at < total {
            let page = self.search_page(&search_url, start_at, page_size).await?;
            total = page.total;
            issues.extend(page.issues);
            start_at += u64::from(page_size);
            info!(
                "downloading issues in progress: {} of {}",
                start_at.min(total),
                total
            );
        }

        let downloaded = issues.len() as u64;
        if downloaded != total {
            return Err(JiraError::IncompleteDownload {
                expected: total,
                downloaded,
            });
        }

        info!("downloaded {} issues from filter {}", downloaded, filter_id);
        Ok(issues)
    }

    /// Lists the worklogs of one issue.
    pub async fn get_issue_worklogs(&self, issue_id: &str) -> Result<Vec<Worklog>> {
        let path = format!("issue/{}/worklog", issue_id);
        let page: WorklogPage = self.get(&path).await?;
        if page.total > page.worklogs.len() as u64 {
            warn!(
                "issue {} reports {} worklogs but only {} were returned",
                issue_id,
                page.total,
                page.worklogs.len()
            );
        }
        Ok(page.worklogs)
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let mut auth_value = header_value(basic_auth_header(&config.user_name, &config.password))?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}

fn redact_query(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}
