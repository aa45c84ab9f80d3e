use crate::config::Config;
use crate::dashboard::DashboardController;
use crate::models::LeadForm;
use crate::page::SharedPage;
use crate::render::render_page;
use crate::scoring_client::ScoringApiClient;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use uuid::Uuid;

/// Cookie carrying the dashboard session id.
pub const SESSION_COOKIE: &str = "dashboard_session";

/// Controller wired to one browser's dashboard page.
pub type Dashboard = Arc<DashboardController<SharedPage>>;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Client shared by every session's controller.
    pub client: ScoringApiClient,
    /// One dashboard page per browser session.
    /// Key: session id from [`SESSION_COOKIE`]. Entries expire after the configured idle time.
    pub sessions: Cache<String, Dashboard>,
}

impl AppState {
    pub fn new(config: &Config, client: ScoringApiClient) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(config.session_idle())
            .max_capacity(10_000)
            .build();
        tracing::info!(
            "Session cache initialized ({}s idle timeout, 10k capacity)",
            config.session_idle_secs
        );
        Self { client, sessions }
    }

    /// The requesting browser's dashboard, and the session id when a new one was issued.
    async fn session(&self, headers: &HeaderMap) -> (Dashboard, Option<String>) {
        let (id, issued) = match session_cookie(headers) {
            Some(id) => (id, false),
            None => (Uuid::new_v4().to_string(), true),
        };
        let client = self.client.clone();
        let dashboard = self
            .sessions
            .get_with(id.clone(), async move {
                Arc::new(DashboardController::new(client, SharedPage::new()))
            })
            .await;
        (dashboard, issued.then_some(id))
    }
}

/// Reads the session id from the `Cookie` header. Only well-formed UUIDs are accepted.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, id)| Uuid::parse_str(id.trim()).ok())
        .map(|id| id.to_string())
}

/// Renders the session's page, draining its pending alerts into it.
fn respond(dashboard: &Dashboard, issued: Option<String>) -> Response {
    let page = dashboard.view();
    let alerts = page.take_alerts();
    let mut response = Html(render_page(&page.snapshot(), &alerts)).into_response();

    if let Some(id) = issued {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Builds the dashboard router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(dashboard))
        .route("/leads", post(submit_lead))
        .route("/refresh", post(refresh_leads))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Form posts are small; 64KB is generous.
                .layer(RequestBodyLimitLayer::new(64 * 1024)),
        )
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-scoring-dashboard",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /
///
/// Page load: fetch and render the leads, then serve the page.
pub async fn dashboard(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (dashboard, issued) = state.session(&headers).await;
    tracing::info!("GET / - loading dashboard");
    // Failures are already on the page as alerts.
    let _ = dashboard.fetch_and_render_leads().await;
    respond(&dashboard, issued)
}

/// POST /leads
///
/// Form submission. Entered values stay in the form until a submission succeeds.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LeadForm>,
) -> Response {
    let (dashboard, issued) = state.session(&headers).await;
    tracing::info!("POST /leads - {} fields", form.fields.len());
    dashboard.view().set_form_values(form.fields.clone());
    let _ = dashboard.submit_lead(&form).await;
    respond(&dashboard, issued)
}

/// POST /refresh
pub async fn refresh_leads(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (dashboard, issued) = state.session(&headers).await;
    tracing::info!("POST /refresh");
    let _ = dashboard.fetch_and_render_leads().await;
    respond(&dashboard, issued)
}
