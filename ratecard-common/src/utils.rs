use std::time::Duration;

use isahc::{
    config::{Configurable as _, RedirectPolicy},
    AsyncReadResponseExt as _, HttpClient, Request,
};

use crate::{StatusCode, Uri};

// IMDb answers non-browser agents with a block page.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";
pub const ACCEPT_JSON: &str = "application/json";

/// Upper bound on a single upstream fetch, connect through body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unable to build request for `{url}`")]
    Request {
        url: String,
        #[source]
        source: http::Error,
    },

    #[error("request to `{url}` failed")]
    Transport {
        url: String,
        #[source]
        source: isahc::Error,
    },

    #[error("`{url}` responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("unable to read response body from `{url}`")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// GETs `url` as a browser would and returns the body of a 2xx response.
#[tracing::instrument(err, skip(url), fields(url = %url.to_string()))]
pub async fn req(url: &Uri, accept: &str) -> Result<String, FetchError> {
    tracing::info!("fetching");

    let client = HttpClient::builder()
        .default_header("User-Agent", USER_AGENT)
        .redirect_policy(RedirectPolicy::Follow)
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let req = Request::builder()
        .uri(url)
        .header("Accept", accept)
        .body(())
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let mut res = client
        .send_async(req)
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = res.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;

    tracing::debug!(status = %status, bytes = body.len(), "fetched");

    Ok(body)
}

/// Joins a configured base URL and a path, tolerating a trailing slash on
/// the base.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(
            join_url("https://www.imdb.com/", "/title/tt0111161/"),
            "https://www.imdb.com/title/tt0111161/"
        );
        assert_eq!(
            join_url("https://www.imdb.com", "title/tt0111161/"),
            "https://www.imdb.com/title/tt0111161/"
        );
    }

    #[test]
    fn status_is_exposed_only_for_status_errors() {
        let err = FetchError::Status {
            url: "https://www.imdb.com".into(),
            status: StatusCode::NOT_FOUND,
        };

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn fetch_timeout_leaves_room_for_the_server_limit() {
        assert!(FETCH_TIMEOUT < Duration::from_secs(10));
    }

    #[test]
    fn user_agent_looks_like_a_browser() {
        assert!(USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(USER_AGENT.contains("Chrome/"));
    }
}
