mod labels;
mod query;

use ratecard_common::{
    base_title_id, is_title_id,
    models::GuideEntry,
    utils::{self, FetchError, ACCEPT_HTML},
    StatusCode, Uri,
};

pub use labels::{normalize_label, LabelRule, LABEL_RULES, LABEL_RULES_VERSION};

use query::{Document, Element};

pub const DEFAULT_BASE_URL: &str = "https://www.imdb.com";

/// Severity IMDb shows for categories the title does not contain.
const NO_SEVERITY: &str = "None";

#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error("`{0}` is not an imdb title id")]
    Id(String),

    #[error("invalid parental guide url `{url}`")]
    Url {
        url: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    #[error("unable to fetch parental guide")]
    Fetch(#[source] FetchError),

    #[error("parental guide page responded with {0}")]
    Status(StatusCode),

    #[error("unable to parse parental guide page")]
    Parse(#[source] std::io::Error),
}

impl From<FetchError> for GuideError {
    fn from(err: FetchError) -> Self {
        match err.status() {
            Some(status) => GuideError::Status(status),
            None => GuideError::Fetch(err),
        }
    }
}

/// One `rating-item` row as it appears on the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuideItem {
    pub label: String,
    pub severity: String,
}

/// The parsed parental guide, before filtering and normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParentsGuide {
    pub items: Vec<GuideItem>,
}

impl ParentsGuide {
    #[tracing::instrument(skip(html), err)]
    pub fn parse(html: &str) -> Result<Self, GuideError> {
        static ITEM_SELECTOR: &str = "li[data-testid=rating-item]";
        static LABEL_SELECTOR: &str = "a.ipc-metadata-list-item__label";
        static SEVERITY_SELECTOR: &str = "div.ipc-html-content-inner-div";

        let doc = Document::try_from(html).map_err(GuideError::Parse)?;

        let items = doc
            .select(ITEM_SELECTOR)
            .into_iter()
            .map(|item| {
                let label = joined_text(&item, LABEL_SELECTOR);
                let severity = joined_text(&item, SEVERITY_SELECTOR);

                GuideItem {
                    label: clean_label(&label),
                    severity: severity.trim().to_string(),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(items = items.len(), "parsed parental guide");

        Ok(Self { items })
    }

    /// Reported categories keyed by normalized label.
    ///
    /// A label seen twice keeps its first position and its last severity.
    pub fn entries(&self) -> Vec<GuideEntry> {
        let mut entries: Vec<GuideEntry> = Vec::with_capacity(self.items.len());

        for item in &self.items {
            if item.label.is_empty() || item.severity.is_empty() || item.severity == NO_SEVERITY {
                continue;
            }

            let category = normalize_label(&item.label);

            match entries.iter_mut().find(|entry| entry.category == category) {
                Some(existing) => existing.severity = item.severity.clone(),
                None => entries.push(GuideEntry {
                    category,
                    severity: item.severity.clone(),
                }),
            }
        }

        entries
    }

    pub fn summary(&self) -> Option<String> {
        summarize(&self.entries())
    }
}

/// `category: severity` pairs joined with ` | `, `None` if nothing is left.
pub fn summarize(entries: &[GuideEntry]) -> Option<String> {
    let text = entries
        .iter()
        .map(|entry| format!("{}: {}", entry.category, entry.severity))
        .collect::<Vec<_>>()
        .join(" | ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn joined_text(item: &Element, selector: &str) -> String {
    item.select(selector).iter().map(Element::text).collect()
}

fn clean_label(label: &str) -> String {
    label.trim().trim_end_matches(':').trim_end().to_string()
}

#[async_trait::async_trait]
pub trait GuideSource: Send + Sync {
    /// Never fails; anything that goes wrong reads as "no guide".
    async fn guide_summary(&self, id: &str) -> Option<String>;
}

#[derive(Clone, Debug)]
pub struct ImdbGuideScraper {
    base_url: String,
}

impl Default for ImdbGuideScraper {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ImdbGuideScraper {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn guide_url(&self, id: &str) -> Result<String, GuideError> {
        if !is_title_id(id) {
            return Err(GuideError::Id(id.to_string()));
        }

        Ok(utils::join_url(
            &self.base_url,
            &format!("title/{}/parentalguide", base_title_id(id)),
        ))
    }

    #[tracing::instrument(skip(self))]
    pub async fn scrape(&self, id: &str) -> Result<ParentsGuide, GuideError> {
        let url = self.guide_url(id)?;
        let uri = Uri::try_from(url.as_str()).map_err(|source| GuideError::Url {
            url: url.clone(),
            source,
        })?;

        let html = utils::req(&uri, ACCEPT_HTML).await?;

        ParentsGuide::parse(&html)
    }
}

#[async_trait::async_trait]
impl GuideSource for ImdbGuideScraper {
    async fn guide_summary(&self, id: &str) -> Option<String> {
        match self.scrape(id).await {
            Ok(guide) => guide.summary(),
            Err(err) => {
                tracing::error!(id = %id, error = ?err, "failed to scrape parental guide: {}", err);

                None
            }
        }
    }
}
