use ratecard_common::{
    bail, is_title_id,
    models::{Rating, RatingSource},
    utils::{self, ACCEPT_JSON},
    Context as _, Report, StatusCode, Uri,
};

/// Source of per-title ratings.
///
/// An empty vector means the title has no ratings; an error means the
/// source could not be asked at all.
#[async_trait::async_trait]
pub trait RatingFetcher: Send + Sync {
    async fn fetch_ratings(&self, kind: &str, id: &str) -> Result<Vec<Rating>, Report>;
}

#[derive(Debug, serde::Deserialize)]
struct WireRating {
    source: String,
    #[serde(default)]
    value: serde_json::Value,
}

impl WireRating {
    fn into_rating(self) -> Option<Rating> {
        let source = match self.source.parse::<RatingSource>() {
            Ok(source) => source,
            Err(err) => {
                tracing::debug!("skipping rating: {}", err);

                return None;
            }
        };

        let value = match self.value {
            serde_json::Value::String(value) => value,
            serde_json::Value::Number(value) => value.to_string(),
            _ => return None,
        };

        if value.trim().is_empty() {
            return None;
        }

        Some(Rating { source, value })
    }
}

/// Decodes the aggregation service's `[{"source": .., "value": ..}]` body.
///
/// `null` reads as no ratings; unknown sources and blank values are dropped.
pub fn parse_ratings(body: &str) -> Result<Vec<Rating>, Report> {
    let wire: Option<Vec<WireRating>> =
        serde_json::from_str(body).context("rating service returned malformed json")?;

    Ok(wire
        .unwrap_or_default()
        .into_iter()
        .filter_map(WireRating::into_rating)
        .collect())
}

/// [`RatingFetcher`] backed by the rating aggregation service's HTTP API.
#[derive(Clone, Debug)]
pub struct HttpRatingFetcher {
    base_url: String,
}

impl HttpRatingFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn ratings_url(&self, kind: &str, id: &str) -> Result<String, Report> {
        if kind.is_empty() || !kind.bytes().all(|b| b.is_ascii_alphanumeric()) {
            bail!("`{}` is not a content type", kind);
        }

        if !is_title_id(id) {
            bail!("`{}` is not an imdb title id", id);
        }

        Ok(utils::join_url(
            &self.base_url,
            &format!("ratings/{}/{}", kind, id),
        ))
    }
}

#[async_trait::async_trait]
impl RatingFetcher for HttpRatingFetcher {
    #[tracing::instrument(skip(self), err)]
    async fn fetch_ratings(&self, kind: &str, id: &str) -> Result<Vec<Rating>, Report> {
        let url = self.ratings_url(kind, id)?;
        let uri = Uri::try_from(url.as_str())
            .with_context(|| format!("invalid rating service url `{}`", url))?;

        let body = match utils::req(&uri, ACCEPT_JSON).await {
            Ok(body) => body,
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => {
                tracing::debug!("title is unknown to the rating service");

                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let ratings = parse_ratings(&body)?;

        tracing::debug!(count = ratings.len(), "fetched ratings");

        Ok(ratings)
    }
}
