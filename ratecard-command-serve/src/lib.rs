mod manifest;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use askama::Template;
use axum::{
    error_handling::HandleErrorLayer,
    extract::{Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    BoxError, Json, Router, Server,
};
use ratecard_common::{
    models::{Rating, RatingSource, StreamRequest, StreamResponse},
    Conf, Context as _,
};
use ratecard_guide::GuideSource;
use ratecard_ratings::RatingFetcher;
use ratecard_stream::{format_ratings_card, StreamHandler};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use manifest::Manifest;

#[tracing::instrument(skip(conf), err)]
pub async fn run(conf: &Conf) -> Result<(), ratecard_common::Report> {
    let addr: SocketAddr = conf
        .bind
        .parse()
        .with_context(|| format!("invalid bind address `{}`", conf.bind))?;

    let app = app(ratecard_stream::handler_from_conf(conf));

    tracing::info!("starting on `{}`", addr);

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

pub fn app<R, G>(handler: StreamHandler<R, G>) -> Router
where
    R: RatingFetcher + 'static,
    G: GuideSource + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/manifest.json", get(manifest))
        .route("/stream/:kind/:id", get(stream::<R, G>))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    if error.is::<tower::timeout::error::Elapsed>() {
                        (StatusCode::REQUEST_TIMEOUT, String::new())
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                    }
                }))
                .load_shed()
                .concurrency_limit(1024)
                .timeout(Duration::from_secs(10))
                .layer(Extension(Arc::new(handler)))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
}

static STYLE: &str = include_str!("../assets/style.css");

#[derive(askama::Template)]
#[template(path = "index.html")]
struct IndexPage {
    css: &'static str,
    name: &'static str,
    description: &'static str,
    sample: String,
    manifest_path: &'static str,
}

fn sample_card() -> String {
    let ratings = [
        Rating::new(RatingSource::CommonSense, "14+"),
        Rating::new(RatingSource::Imdb, "6.8/10"),
        Rating::new(RatingSource::Tmdb, "6.8/10"),
        Rating::new(RatingSource::Mc, "70/100"),
        Rating::new(RatingSource::McUsers, "6.4/10"),
        Rating::new(
            RatingSource::CringeMdb,
            "⚠️ Not Parent Safe\n🔞 Sex Scene\n👁️‍🗨️ Nudity",
        ),
    ];

    format_ratings_card(&ratings, Some("Sex: Moderate | Violence: Mild"))
}

async fn index() -> Result<impl IntoResponse, Error> {
    Ok(Html(
        IndexPage {
            css: STYLE,
            name: manifest::NAME,
            description: manifest::DESCRIPTION,
            sample: sample_card(),
            manifest_path: "/manifest.json",
        }
        .render()
        .map_err(Error::from_any)?,
    ))
}

async fn manifest() -> Json<Manifest> {
    Json(Manifest::default())
}

async fn stream<R, G>(
    Extension(handler): Extension<Arc<StreamHandler<R, G>>>,
    Path((kind, id)): Path<(String, String)>,
) -> Json<StreamResponse>
where
    R: RatingFetcher + 'static,
    G: GuideSource + 'static,
{
    let id = id.strip_suffix(".json").unwrap_or(&id).to_string();

    Json(handler.handle(&StreamRequest { kind, id }).await)
}

#[derive(Debug)]
pub struct Error(ratecard_common::Report);

impl Error {
    pub fn from_any<A>(err: A) -> Self
    where
        A: Into<ratecard_common::Report>,
    {
        Self(err.into())
    }
}

impl From<ratecard_common::Report> for Error {
    fn from(err: ratecard_common::Report) -> Self {
        Self(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        #[derive(serde::Serialize)]
        struct Res {
            error: ResErr,
        }

        #[derive(serde::Serialize)]
        struct ResErr {
            code: u16,
            status: &'static str,
        }

        let err = self.0;

        tracing::error!(error = ?err, "error handling request");

        let (status, message) = (StatusCode::INTERNAL_SERVER_ERROR, "internal server error");

        let body = Res {
            error: ResErr {
                code: status.as_u16(),
                status: message,
            },
        };

        (status, Json(body)).into_response()
    }
}
