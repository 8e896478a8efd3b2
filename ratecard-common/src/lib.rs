pub mod models;
pub mod utils;

pub use color_eyre::{
    eyre::{bail, eyre as err, Context, Report},
    install,
};
pub use http::{StatusCode, Uri};

#[twelf::config]
#[derive(Clone, Debug)]
pub struct Conf {
    /// Address the add-on server listens on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Base URL used for the stream's external link
    #[serde(default = "default_imdb_base_url")]
    pub imdb_base_url: String,

    /// Base URL of the site serving parental guide pages
    #[serde(default = "default_imdb_base_url")]
    pub guide_base_url: String,

    /// Base URL of the rating aggregation service
    #[serde(default = "default_ratings_url")]
    pub ratings_url: String,
}

fn default_bind() -> String {
    String::from("0.0.0.0:7000")
}

fn default_imdb_base_url() -> String {
    String::from("https://www.imdb.com")
}

fn default_ratings_url() -> String {
    String::from("http://127.0.0.1:3001")
}

impl Default for Conf {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            imdb_base_url: default_imdb_base_url(),
            guide_base_url: default_imdb_base_url(),
            ratings_url: default_ratings_url(),
        }
    }
}

/// Strips any `:<extra>` suffix (season/episode) from a title id.
pub fn base_title_id(id: &str) -> &str {
    id.split(':').next().unwrap_or(id)
}

/// Whether `id` is an IMDb title id: `tt` and digits, then an optional
/// `:<extra>` suffix of digits and colons.
pub fn is_title_id(id: &str) -> bool {
    let (base, extra) = id.split_once(':').unwrap_or((id, ""));

    let digits = match base.strip_prefix("tt") {
        Some(digits) => digits,
        None => return false,
    };

    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && extra.bytes().all(|b| b.is_ascii_digit() || b == b':')
}
