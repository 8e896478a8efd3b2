use std::time::Duration;

use ratecard_common::{
    base_title_id, err, is_title_id,
    models::{BehaviorHints, StreamRequest, StreamResponse, StreamResult},
    utils,
};
use ratecard_guide::GuideSource;
use ratecard_ratings::RatingFetcher;

use crate::format::format_ratings_card;

pub const STREAM_NAME: &str = "🎯 Ratings Aggregator";

/// How long either source may take before the handler stops waiting on it.
/// Stays under the server's request timeout so a card can still be sent.
pub const FETCH_DEADLINE: Duration = Duration::from_secs(8);

/// Answers stream requests with at most one ratings card.
///
/// Every failure is logged and absorbed here; callers always get a valid,
/// possibly empty, response.
pub struct StreamHandler<R, G> {
    ratings: R,
    guide: G,
    imdb_base_url: String,
    deadline: Duration,
}

impl<R, G> StreamHandler<R, G>
where
    R: RatingFetcher,
    G: GuideSource,
{
    pub fn new(ratings: R, guide: G, imdb_base_url: impl Into<String>) -> Self {
        Self {
            ratings,
            guide,
            imdb_base_url: imdb_base_url.into(),
            deadline: FETCH_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    #[tracing::instrument(skip(self, request), fields(kind = %request.kind, id = %request.id))]
    pub async fn handle(&self, request: &StreamRequest) -> StreamResponse {
        tracing::info!("received stream request");

        let id = request.id.as_str();

        if !is_title_id(id) {
            tracing::warn!("invalid or unsupported id format");

            return StreamResponse::empty();
        }

        let (ratings, guide) = tokio::join!(
            tokio::time::timeout(self.deadline, self.ratings.fetch_ratings(&request.kind, id)),
            tokio::time::timeout(self.deadline, self.guide.guide_summary(id))
        );

        let guide = guide.unwrap_or_else(|_| {
            tracing::warn!(deadline = ?self.deadline, "parental guide timed out");

            None
        });

        let ratings = ratings
            .map_err(|_| err!("rating service did not answer within {:?}", self.deadline))
            .and_then(|ratings| ratings);

        let ratings = match ratings {
            Ok(ratings) => ratings,
            Err(err) => {
                tracing::error!(error = ?err, "failed to fetch ratings: {}", err);

                return StreamResponse::empty();
            }
        };

        if ratings.is_empty() && guide.is_none() {
            tracing::info!("no ratings or guide found");

            return StreamResponse::empty();
        }

        let stream = StreamResult {
            name: STREAM_NAME.to_string(),
            description: format_ratings_card(&ratings, guide.as_deref()),
            external_url: self.external_url(id),
            behavior_hints: BehaviorHints {
                not_web_ready: true,
            },
        };

        tracing::info!(
            ratings = ratings.len(),
            guide = guide.is_some(),
            "returning ratings stream"
        );

        StreamResponse::single(stream)
    }

    pub fn external_url(&self, id: &str) -> String {
        utils::join_url(
            &self.imdb_base_url,
            &format!("title/{}/", base_title_id(id)),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ratecard_common::{
        err,
        models::{Rating, RatingSource},
        Report,
    };

    use super::*;
    use crate::format::GUIDE_HEADER;

    #[derive(Default)]
    struct StubRatings {
        ratings: Vec<Rating>,
        fail: bool,
        stall: Option<Duration>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RatingFetcher for StubRatings {
        async fn fetch_ratings(&self, _kind: &str, _id: &str) -> Result<Vec<Rating>, Report> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(stall) = self.stall {
                tokio::time::sleep(stall).await;
            }

            if self.fail {
                Err(err!("rating service unavailable"))
            } else {
                Ok(self.ratings.clone())
            }
        }
    }

    #[derive(Default)]
    struct StubGuide {
        summary: Option<String>,
        stall: Option<Duration>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl GuideSource for StubGuide {
        async fn guide_summary(&self, _id: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(stall) = self.stall {
                tokio::time::sleep(stall).await;
            }

            self.summary.clone()
        }
    }

    fn request(kind: &str, id: &str) -> StreamRequest {
        StreamRequest {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    fn handler(ratings: StubRatings, guide: StubGuide) -> StreamHandler<StubRatings, StubGuide> {
        StreamHandler::new(ratings, guide, "https://www.imdb.com")
    }

    #[tokio::test]
    async fn ratings_without_guide() {
        let handler = handler(
            StubRatings {
                ratings: vec![Rating::new(RatingSource::Imdb, "9.3/10")],
                ..Default::default()
            },
            StubGuide::default(),
        );

        let response = handler.handle(&request("movie", "tt0111161")).await;

        assert_eq!(response.streams.len(), 1);

        let stream = &response.streams[0];
        assert_eq!(stream.name, STREAM_NAME);
        assert!(stream.description.contains("⭐ IMDb     : 9.3/10"));
        assert!(!stream.description.contains("Parents Guide"));
        assert_eq!(stream.external_url, "https://www.imdb.com/title/tt0111161/");
        assert!(stream.behavior_hints.not_web_ready);
    }

    #[tokio::test]
    async fn guide_without_ratings() {
        let handler = handler(
            StubRatings::default(),
            StubGuide {
                summary: Some("Violence: Severe".into()),
                ..Default::default()
            },
        );

        let response = handler.handle(&request("movie", "tt0111161")).await;

        assert_eq!(response.streams.len(), 1);

        let description = &response.streams[0].description;
        assert!(description.contains(&format!("{}\nViolence: Severe", GUIDE_HEADER)));
    }

    #[tokio::test]
    async fn wrong_prefix_is_rejected_without_fetching() {
        let handler = handler(
            StubRatings {
                ratings: vec![Rating::new(RatingSource::Imdb, "9.3/10")],
                ..Default::default()
            },
            StubGuide {
                summary: Some("Violence: Severe".into()),
                ..Default::default()
            },
        );

        for id in [
            "nm0000001",
            "",
            "kitsu:1",
            "TT0111161",
            "tt",
            "tt0111161?ref_=x",
            "tt0111161/../../x",
        ] {
            let response = handler.handle(&request("movie", id)).await;

            assert_eq!(response, StreamResponse::empty());
        }

        assert_eq!(handler.ratings.calls.load(Ordering::SeqCst), 0);
        assert_eq!(handler.guide.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn nothing_found_is_empty() {
        let handler = handler(StubRatings::default(), StubGuide::default());

        let response = handler.handle(&request("series", "tt0903747")).await;

        assert_eq!(response, StreamResponse::empty());
    }

    #[tokio::test]
    async fn rating_failure_is_empty_even_with_guide() {
        let handler = handler(
            StubRatings {
                fail: true,
                ..Default::default()
            },
            StubGuide {
                summary: Some("Violence: Severe".into()),
                ..Default::default()
            },
        );

        let response = handler.handle(&request("movie", "tt0111161")).await;

        assert_eq!(response, StreamResponse::empty());
    }

    #[tokio::test]
    async fn external_url_drops_episode_suffix() {
        let handler = handler(
            StubRatings {
                ratings: vec![Rating::new(RatingSource::Tmdb, "8.9/10")],
                ..Default::default()
            },
            StubGuide::default(),
        );

        let response = handler.handle(&request("series", "tt0903747:2:5")).await;

        assert_eq!(
            response.streams[0].external_url,
            "https://www.imdb.com/title/tt0903747/"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_guide_still_gets_a_ratings_card() {
        let handler = handler(
            StubRatings {
                ratings: vec![Rating::new(RatingSource::Imdb, "9.3/10")],
                ..Default::default()
            },
            StubGuide {
                summary: Some("Violence: Severe".into()),
                stall: Some(Duration::from_secs(60)),
                ..Default::default()
            },
        );

        let started = tokio::time::Instant::now();
        let response = handler.handle(&request("movie", "tt0111161")).await;

        assert!(started.elapsed() >= FETCH_DEADLINE);
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(response.streams.len(), 1);

        let description = &response.streams[0].description;
        assert!(description.contains("⭐ IMDb     : 9.3/10"));
        assert!(!description.contains(GUIDE_HEADER));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_ratings_are_a_failure() {
        let handler = handler(
            StubRatings {
                ratings: vec![Rating::new(RatingSource::Imdb, "9.3/10")],
                stall: Some(Duration::from_secs(60)),
                ..Default::default()
            },
            StubGuide {
                summary: Some("Violence: Severe".into()),
                ..Default::default()
            },
        )
        .with_deadline(Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        let response = handler.handle(&request("movie", "tt0111161")).await;

        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(response, StreamResponse::empty());
    }

    #[test]
    fn deadline_is_under_the_server_timeout() {
        assert!(FETCH_DEADLINE < Duration::from_secs(10));
        assert!(FETCH_DEADLINE > ratecard_common::utils::FETCH_TIMEOUT);
    }
}
