use ratecard_common::models::{Rating, RatingSource};

pub const SEPARATOR: &str = "───────────────";
pub const GUIDE_HEADER: &str = "ℹ️  Parents Guide";

const LABEL_WIDTH: usize = 9;

/// Renders the text block shown as a stream description.
///
/// Layout, top to bottom: Common Sense age, the aligned standard scores in
/// [`RatingSource::rank`] order, CringeMDB/Certification notes one per line,
/// and the parents guide section when there is one.
pub fn format_ratings_card(ratings: &[Rating], guide: Option<&str>) -> String {
    let mut lines = vec![SEPARATOR.to_string()];

    if let Some(common_sense) = ratings
        .iter()
        .find(|rating| rating.source == RatingSource::CommonSense)
    {
        lines.push(format!(
            "{} {}",
            common_sense.source.emoji(),
            common_sense.value
        ));
    }

    let mut standard = ratings
        .iter()
        .filter_map(|rating| rating.source.rank().map(|rank| (rank, rating)))
        .collect::<Vec<_>>();
    standard.sort_by_key(|(rank, _)| *rank);

    for (_, rating) in standard {
        lines.push(format!(
            "{} {:<width$}: {}",
            rating.source.emoji(),
            rating.source.label(),
            rating.value,
            width = LABEL_WIDTH
        ));
    }

    if let Some(notes) = ratings.iter().find(|rating| {
        matches!(
            rating.source,
            RatingSource::CringeMdb | RatingSource::Certification
        )
    }) {
        lines.extend(
            notes
                .value
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    if let Some(guide) = guide.filter(|guide| !guide.is_empty()) {
        lines.push(SEPARATOR.to_string());
        lines.push(GUIDE_HEADER.to_string());
        lines.push(guide.to_string());
    }

    lines.push(SEPARATOR.to_string());

    lines.join("\n")
}
