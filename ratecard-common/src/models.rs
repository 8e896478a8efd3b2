use std::{fmt, str::FromStr};

/// Every rating provider the aggregation service may report.
///
/// Variant order is the declaration order only; display order for the
/// standard scores comes from [`RatingSource::rank`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum RatingSource {
    CommonSense,
    Imdb,
    Tmdb,
    Mc,
    McUsers,
    Rt,
    RtUsers,
    CringeMdb,
    Certification,
}

impl RatingSource {
    /// Scores listed in the aligned block of a ratings card, in display order.
    pub const STANDARD: [RatingSource; 6] = [
        RatingSource::Imdb,
        RatingSource::Tmdb,
        RatingSource::Mc,
        RatingSource::McUsers,
        RatingSource::Rt,
        RatingSource::RtUsers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RatingSource::CommonSense => "Common Sense",
            RatingSource::Imdb => "IMDb",
            RatingSource::Tmdb => "TMDb",
            RatingSource::Mc => "MC",
            RatingSource::McUsers => "MC Users",
            RatingSource::Rt => "RT",
            RatingSource::RtUsers => "RT Users",
            RatingSource::CringeMdb => "CringeMDB",
            RatingSource::Certification => "Certification",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            RatingSource::CommonSense => "👶",
            RatingSource::Imdb => "⭐",
            RatingSource::Tmdb => "🎥",
            RatingSource::Mc => "Ⓜ️",
            RatingSource::McUsers => "👤",
            RatingSource::Rt => "🍅",
            RatingSource::RtUsers => "🍿",
            RatingSource::CringeMdb => "⚠️",
            RatingSource::Certification => "🔞",
        }
    }

    /// Position within [`RatingSource::STANDARD`], `None` for sources shown
    /// outside the aligned block.
    pub fn rank(self) -> Option<usize> {
        Self::STANDARD.iter().position(|source| *source == self)
    }
}

impl fmt::Display for RatingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown rating source `{0}`")]
pub struct UnknownSource(pub String);

impl FromStr for RatingSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        let source = match key.as_str() {
            "commonsense" | "commonsensemedia" => RatingSource::CommonSense,
            "imdb" => RatingSource::Imdb,
            "tmdb" => RatingSource::Tmdb,
            "mc" | "metacritic" => RatingSource::Mc,
            "mcusers" | "metacriticusers" => RatingSource::McUsers,
            "rt" | "rottentomatoes" => RatingSource::Rt,
            "rtusers" | "rottentomatoesusers" => RatingSource::RtUsers,
            "cringemdb" => RatingSource::CringeMdb,
            "certification" => RatingSource::Certification,
            _ => return Err(UnknownSource(s.to_string())),
        };

        Ok(source)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rating {
    pub source: RatingSource,
    pub value: String,
}

impl Rating {
    pub fn new(source: RatingSource, value: impl Into<String>) -> Self {
        Self {
            source,
            value: value.into(),
        }
    }
}

/// A single parental guide category with its normalized label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuideEntry {
    pub category: String,
    pub severity: String,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct StreamRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResult {
    pub name: String,
    pub description: String,
    pub external_url: String,
    pub behavior_hints: BehaviorHints,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub not_web_ready: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StreamResponse {
    pub streams: Vec<StreamResult>,
}

impl StreamResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(stream: StreamResult) -> Self {
        Self {
            streams: vec![stream],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_aliases() {
        assert_eq!("IMDb".parse::<RatingSource>().unwrap(), RatingSource::Imdb);
        assert_eq!("MC Users".parse::<RatingSource>().unwrap(), RatingSource::McUsers);
        assert_eq!("MCUsers".parse::<RatingSource>().unwrap(), RatingSource::McUsers);
        assert_eq!("RT Users".parse::<RatingSource>().unwrap(), RatingSource::RtUsers);
        assert_eq!(
            "Common Sense".parse::<RatingSource>().unwrap(),
            RatingSource::CommonSense
        );
        assert_eq!("metacritic".parse::<RatingSource>().unwrap(), RatingSource::Mc);
        assert!("Letterboxd".parse::<RatingSource>().is_err());
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for source in [
            RatingSource::CommonSense,
            RatingSource::Imdb,
            RatingSource::Tmdb,
            RatingSource::Mc,
            RatingSource::McUsers,
            RatingSource::Rt,
            RatingSource::RtUsers,
            RatingSource::CringeMdb,
            RatingSource::Certification,
        ] {
            assert_eq!(source.label().parse::<RatingSource>().unwrap(), source);
        }
    }

    #[test]
    fn rank_follows_standard_order() {
        for (index, source) in RatingSource::STANDARD.iter().enumerate() {
            assert_eq!(source.rank(), Some(index));
        }

        assert_eq!(RatingSource::Imdb.rank(), Some(0));
        assert_eq!(RatingSource::Mc.rank(), Some(2));
        assert_eq!(RatingSource::RtUsers.rank(), Some(5));

        assert_eq!(RatingSource::CommonSense.rank(), None);
        assert_eq!(RatingSource::CringeMdb.rank(), None);
        assert_eq!(RatingSource::Certification.rank(), None);
    }

    #[test]
    fn stream_result_serializes_camel_case() {
        let response = StreamResponse::single(StreamResult {
            name: "name".into(),
            description: "description".into(),
            external_url: "https://www.imdb.com/title/tt0111161/".into(),
            behavior_hints: BehaviorHints { not_web_ready: true },
        });

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json["streams"][0]["externalUrl"],
            "https://www.imdb.com/title/tt0111161/"
        );
        assert_eq!(json["streams"][0]["behaviorHints"]["notWebReady"], true);
    }

    #[test]
    fn empty_response_has_no_streams() {
        let json = serde_json::to_string(&StreamResponse::empty()).unwrap();

        assert_eq!(json, r#"{"streams":[]}"#);
    }
}
