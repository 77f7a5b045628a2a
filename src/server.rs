use crate::dispatcher::QueryDispatcher;
use crate::models::QueryForm;
use crate::render::{RenderState, SharedRegion};
use anyhow::Result;
use axum::{
    extract::State,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument};

const INDEX_PAGE: &str = include_str!("../web/index.html");

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: QueryDispatcher,
    pub region: SharedRegion,
}

impl AppState {
    pub fn new(dispatcher: QueryDispatcher) -> Self {
        Self {
            dispatcher,
            region: SharedRegion::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/query", post(query))
        .route("/result", get(result))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("News radar UI running on http://127.0.0.1:{}", port);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health() -> &'static str {
    "OK"
}

/// The dispatch runs on its own task so a dropped request cannot leave the
/// shared region stuck on the loading fragment.
#[instrument(skip(state))]
async fn query(State(state): State<AppState>, Json(form): Json<QueryForm>) -> Html<String> {
    let AppState { dispatcher, region } = state;
    let handle = tokio::spawn(async move {
        dispatcher
            .dispatch(form.time_value.as_deref(), form.time_unit.as_deref(), &region)
            .await
    });

    match handle.await {
        Ok(outcome) => Html(outcome.state.fragment()),
        Err(e) => {
            error!("Dispatch task failed: {}", e);
            Html(RenderState::Errored.fragment())
        }
    }
}

async fn result(State(state): State<AppState>) -> Html<String> {
    Html(state.region.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisResult;
    use crate::render::{ERROR_FRAGMENT, FALLBACK_ARTICLE, LOADING_FRAGMENT};
    use crate::tools::{AnalysisBackend, AnalyzeError};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Echoes the query back as the article and remembers what it saw.
    #[derive(Default)]
    struct EchoBackend {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AnalysisBackend for EchoBackend {
        async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalyzeError> {
            self.seen.lock().unwrap().push(query.to_string());
            if query.contains("offline") {
                return Err(AnalyzeError::Transport("connection refused".to_string()));
            }
            if query.contains("slow") {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            if query.contains("silent") {
                return Ok(AnalysisResult::default());
            }
            Ok(AnalysisResult {
                article: Some(query.to_string()),
            })
        }
    }

    fn app() -> (Router, Arc<EchoBackend>) {
        let (app, backend, _) = app_with_region();
        (app, backend)
    }

    fn app_with_region() -> (Router, Arc<EchoBackend>, SharedRegion) {
        let backend = Arc::new(EchoBackend::default());
        let state = AppState::new(QueryDispatcher::new(backend.clone()));
        let region = state.region.clone();
        (router(state), backend, region)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_query(body: &str) -> Request<Body> {
        Request::post("/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn index_serves_query_page() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let page = body_text(response).await;
        assert!(page.contains(r#"id="timeValue""#));
        assert!(page.contains(r#"id="timeUnit""#));
        assert!(page.contains(r#"id="result""#));
    }

    #[tokio::test]
    async fn query_renders_article_and_updates_result() {
        let (app, backend) = app();

        let response = app
            .clone()
            .oneshot(post_query(r#"{"timeValue": "3", "timeUnit": "hours"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = body_text(response).await;
        assert!(fragment.contains("<p>Выдай новости за 3 hours</p>"));
        assert_eq!(
            backend.seen.lock().unwrap().as_slice(),
            ["Выдай новости за 3 hours".to_string()]
        );

        let response = app
            .oneshot(Request::get("/result").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_text(response).await, fragment);
    }

    #[tokio::test]
    async fn query_defaults_missing_time_value() {
        let (app, backend) = app();

        app.oneshot(post_query(r#"{"timeUnit": "days"}"#)).await.unwrap();

        assert_eq!(
            backend.seen.lock().unwrap().as_slice(),
            ["Выдай новости за 1 days".to_string()]
        );
    }

    #[tokio::test]
    async fn query_renders_fallback_and_error_fragments() {
        let (app, _) = app();

        let response = app
            .clone()
            .oneshot(post_query(r#"{"timeUnit": "silent"}"#))
            .await
            .unwrap();
        assert!(body_text(response).await.contains(FALLBACK_ARTICLE));

        let response = app
            .oneshot(post_query(r#"{"timeUnit": "offline"}"#))
            .await
            .unwrap();
        assert_eq!(body_text(response).await, ERROR_FRAGMENT);
    }

    #[tokio::test]
    async fn dropped_request_still_finishes_rendering() {
        let (app, _, region) = app_with_region();

        let dropped = tokio::time::timeout(
            Duration::from_millis(50),
            app.oneshot(post_query(r#"{"timeUnit": "slow"}"#)),
        )
        .await;
        assert!(dropped.is_err());
        assert_eq!(region.snapshot(), LOADING_FRAGMENT);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(region.snapshot().contains("<p>Выдай новости за 1 slow</p>"));
    }
}
