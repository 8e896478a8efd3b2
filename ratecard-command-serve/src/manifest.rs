/// The add-on manifest served at `/manifest.json`.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resources: Vec<&'static str>,
    pub types: Vec<&'static str>,
    pub id_prefixes: Vec<&'static str>,
    pub catalogs: Vec<Catalog>,
}

#[derive(Debug, serde::Serialize)]
pub struct Catalog {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'static str,
}

pub const NAME: &str = "Ratings Aggregator";
pub const DESCRIPTION: &str =
    "IMDb, TMDb, Metacritic, Rotten Tomatoes, Common Sense Media and CringeMDB ratings plus the IMDb Parents Guide, shown as a stream card.";

impl Default for Manifest {
    fn default() -> Self {
        Self {
            id: "community.ratecard",
            version: env!("CARGO_PKG_VERSION"),
            name: NAME,
            description: DESCRIPTION,
            resources: vec!["stream"],
            types: vec!["movie", "series"],
            id_prefixes: vec!["tt"],
            catalogs: Vec::new(),
        }
    }
}
