mod format;
mod handler;

pub use format::{format_ratings_card, GUIDE_HEADER, SEPARATOR};
pub use handler::{StreamHandler, FETCH_DEADLINE, STREAM_NAME};

use ratecard_common::Conf;
use ratecard_guide::ImdbGuideScraper;
use ratecard_ratings::HttpRatingFetcher;

/// The handler wired to the real rating service and IMDb.
pub type DefaultStreamHandler = StreamHandler<HttpRatingFetcher, ImdbGuideScraper>;

pub fn handler_from_conf(conf: &Conf) -> DefaultStreamHandler {
    StreamHandler::new(
        HttpRatingFetcher::new(conf.ratings_url.as_str()),
        ImdbGuideScraper::new(conf.guide_base_url.as_str()),
        conf.imdb_base_url.as_str(),
    )
}
