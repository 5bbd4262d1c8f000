//! The `serve` subcommand: the HTTP front end.

use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{ConnectInfo, Query, State},
    http::{
        HeaderName, HeaderValue, StatusCode,
        header::{CONTENT_TYPE, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    },
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::{
    net::TcpListener,
    signal::{
        ctrl_c,
        unix::{SignalKind, signal},
    },
    time::interval,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::{
    args::ServeArgs,
    listing::Listing,
    model::Suggestion,
    render,
    sanitize::Params,
    site::{DESCRIPTION, SITE_NAME, Site},
    sitemap,
    store::{Backend, Store},
    suggest::{self, SuggestLimiter},
};

const APP_JS: &str = include_str!("../assets/app.js");
const STYLE_CSS: &str = include_str!("../assets/style.css");
const FAVICON_SVG: &str = include_str!("../assets/favicon.svg");

/// How often clients with a replenished suggestion quota are forgotten.
const PRUNE_PERIOD: Duration = Duration::from_secs(60);

/// Shared by every request.
pub struct AppState<B = Store> {
    pub store: B,
    pub site: Site,
    pub suggest_limiter: SuggestLimiter,
}

pub async fn command(site: Site, store: Store, args: ServeArgs) -> Result<()> {
    if !store.is_configured() {
        log::warn!("Serving without data store: every page will be empty");
    }
    let suggest_limiter = suggest::limiter(args.suggest_period)
        .with_context(|| format!("Invalid suggestion period {}", args.suggest_period))?;
    let state = Arc::new(AppState {
        store,
        site,
        suggest_limiter,
    });
    spawn_limiter_pruning(Arc::clone(&state));
    let app = router(state);

    let address = SocketAddr::new(args.bind, args.port);
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Can not listen on {address}"))?;
    log::info!("Listening on http://{address}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    log::info!("Server stopped");
    Ok(())
}

/// Keep the memory of the suggestion limiter bounded by the number of recent clients.
fn spawn_limiter_pruning<B: Send + Sync + 'static>(state: Arc<AppState<B>>) {
    tokio::spawn(async move {
        let mut ticks = interval(PRUNE_PERIOD);
        loop {
            ticks.tick().await;
            suggest::prune(&state.suggest_limiter);
            log::trace!("{} clients in the suggestion limiter", state.suggest_limiter.len());
        }
    });
}

pub fn router<B>(state: Arc<AppState<B>>) -> Router
where
    B: Backend + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(home::<B>))
        .route("/sitemap.xml", get(sitemap_xml::<B>))
        .route("/robots.txt", get(robots_txt::<B>))
        .route("/manifest.json", get(manifest))
        .route("/api/suggest", get(suggestions::<B>))
        .route("/static/app.js", get(app_js))
        .route("/static/style.css", get(style_css))
        .route("/static/favicon.svg", get(favicon))
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ))
        .with_state(state)
}

async fn home<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    Query(raw): Query<HashMap<String, String>>,
) -> Html<String> {
    let params = Params::from_query(&raw);
    log::debug!("Rendering {}", params.href());
    let listing = Listing::load(&state.store, params, Utc::now()).await;
    Html(render::page(&listing, &state.site))
}

async fn sitemap_xml<B>(State(state): State<Arc<AppState<B>>>) -> Response {
    let entries = sitemap::entries(&state.site, Utc::now());
    match sitemap::to_xml(&entries) {
        Ok(xml) => ([(CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response(),
        Err(err) => {
            log::error!("Error rendering the sitemap: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn robots_txt<B>(State(state): State<Arc<AppState<B>>>) -> String {
    robots(&state.site)
}

fn robots(site: &Site) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        site.url
    )
}

async fn manifest() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/manifest+json")],
        Json(json!({
            "name": SITE_NAME,
            "short_name": SITE_NAME,
            "description": DESCRIPTION,
            "start_url": "/",
            "display": "standalone",
            "background_color": "#ffffff",
            "theme_color": "#18181b",
            "icons": [{"src": "/static/favicon.svg", "sizes": "any", "type": "image/svg+xml"}],
        })),
    )
}

#[derive(Debug, Default, Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
}

/// Throttled clients get no suggestion rather than an error, so the widget just stays quiet.
async fn suggestions<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    Query(query): Query<SuggestQuery>,
) -> Json<Vec<Suggestion>> {
    Json(throttled_suggestions(&state, client.ip(), &query.q).await)
}

async fn throttled_suggestions<B: Backend>(
    state: &AppState<B>,
    client: IpAddr,
    q: &str,
) -> Vec<Suggestion> {
    if state.suggest_limiter.check_key(&client).is_err() {
        log::debug!("Throttling suggestions for {client}");
        return vec![];
    }
    suggest::suggestions(&state.store, q).await
}

async fn app_js() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

async fn style_css() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

async fn favicon() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/svg+xml")], FAVICON_SVG)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                log::error!("Can not listen to Ctrl+C: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                log::error!("Can not listen to SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{args::FinitePositiveF64, listing::test::FakeBackend};
    use axum::{
        body::{Body, to_bytes},
        extract::connect_info::MockConnectInfo,
        http::Request,
    };
    use scraper::Selector;
    use serde_json::Value;
    use test_case::test_case;
    use tower::ServiceExt;

    fn state_with<B>(store: B) -> AppState<B> {
        AppState {
            store,
            site: Site::new("https://example.org", None),
            suggest_limiter: suggest::limiter(FinitePositiveF64::new_unchecked(60.0)).unwrap(),
        }
    }

    fn state() -> AppState {
        state_with(Store::new(None, None).unwrap())
    }

    fn suggesting_backend() -> FakeBackend {
        FakeBackend {
            suggestions: vec![
                json!({"kind": "language", "label": "Rust", "value": "Rust"}),
                json!({"kind": "repo", "label": "tokio-rs/tokio", "value": "tokio"}),
            ],
            ..FakeBackend::default()
        }
    }

    async fn get_from(app: Router, uri: &str) -> Response {
        app.layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn robots_points_to_sitemap() {
        let txt = robots(&state().site);
        assert!(txt.starts_with("User-agent: *\nAllow: /\n"));
        assert!(txt.ends_with("Sitemap: https://example.org/sitemap.xml\n"));
    }

    #[tokio::test]
    async fn home_without_store_renders_empty_state() {
        let raw = HashMap::from([("view".to_string(), "orgs".to_string())]);
        let Html(body) = home(State(Arc::new(state())), Query(raw)).await;
        let html = scraper::Html::parse_document(&body);
        assert_eq!(
            html.select(&Selector::parse(".empty-state").unwrap()).count(),
            1
        );
        assert_eq!(
            html.select(&Selector::parse("title").unwrap())
                .next()
                .unwrap()
                .text()
                .collect::<String>(),
            "Start Open Source | Discover Good First Issues"
        );
    }

    #[tokio::test]
    async fn suggestions_are_throttled_per_client() {
        let state = state();
        let client: IpAddr = "192.0.2.1".parse().unwrap();
        assert!(throttled_suggestions(&state, client, "tokio").await.is_empty());
        assert!(state.suggest_limiter.check_key(&client).is_err());
        let other: IpAddr = "192.0.2.2".parse().unwrap();
        assert!(state.suggest_limiter.check_key(&other).is_ok());
    }

    #[test_case("/", "text/html; charset=utf-8")]
    #[test_case("/?view=repos&language=C%2B%2B&page=0", "text/html; charset=utf-8")]
    #[test_case("/sitemap.xml", "application/xml; charset=utf-8")]
    #[test_case("/robots.txt", "text/plain; charset=utf-8")]
    #[test_case("/manifest.json", "application/manifest+json")]
    #[test_case("/api/suggest?q=x", "application/json")]
    #[test_case("/static/app.js", "text/javascript; charset=utf-8")]
    #[test_case("/static/style.css", "text/css; charset=utf-8")]
    #[test_case("/static/favicon.svg", "image/svg+xml")]
    #[tokio::test]
    async fn routes_are_served_with_security_headers(uri: &str, content_type: &str) {
        let app = router(Arc::new(state_with(suggesting_backend())));
        let response = get_from(app, uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], content_type);
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[REFERRER_POLICY], "strict-origin-when-cross-origin");
        assert_eq!(
            headers["permissions-policy"],
            "camera=(), microphone=(), geolocation=()"
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_with_security_headers() {
        let app = router(Arc::new(state()));
        let response = get_from(app, "/admin").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[X_FRAME_OPTIONS], "DENY");
    }

    #[tokio::test]
    async fn short_suggestion_query_is_an_empty_array() {
        let app = router(Arc::new(state_with(suggesting_backend())));
        let response = get_from(app, "/api/suggest?q=x").await;
        assert_eq!(body_text(response).await, "[]");
    }

    #[tokio::test]
    async fn suggestions_are_kind_label_value_objects() {
        let app = router(Arc::new(state_with(suggesting_backend())));
        let response = get_from(app, "/api/suggest?q=ru").await;
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body,
            json!([
                {"kind": "language", "label": "Rust", "value": "Rust"},
                {"kind": "repo", "label": "tokio-rs/tokio", "value": "tokio"},
            ])
        );
    }

    #[tokio::test]
    async fn missing_suggestion_query_is_an_empty_array() {
        let app = router(Arc::new(state_with(suggesting_backend())));
        let response = get_from(app, "/api/suggest").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "[]");
    }

    #[tokio::test]
    async fn sitemap_route_lists_every_entry() {
        let app = router(Arc::new(state()));
        let xml = body_text(get_from(app, "/sitemap.xml").await).await;
        assert!(xml.contains("<loc>https://example.org</loc>"));
        assert_eq!(xml.matches("<url>").count(), 52);
    }

    #[tokio::test]
    async fn home_route_renders_the_page() {
        let app = router(Arc::new(state()));
        let body = body_text(get_from(app, "/?q=%3Cscript%3E").await).await;
        let html = scraper::Html::parse_document(&body);
        assert_eq!(
            html.select(&Selector::parse("script[src='/static/app.js']").unwrap())
                .count(),
            1
        );
        assert!(!body.contains("<script>"));
    }
}
