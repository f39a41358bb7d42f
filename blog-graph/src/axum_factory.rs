//! Axum http server factory.
//!
//! Builds the [`axum::Router`] serving the GraphQL endpoint, the GraphiQL
//! explorer and the health check.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::GraphQLRequest;
use async_graphql_axum::GraphQLResponse;
use axum::Json;
use axum::Router;
use axum::extract::FromRequest;
use axum::extract::Request;
use axum::extract::State;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use http::HeaderMap;
use mediatype::MediaType;
use mediatype::MediaTypeList;
use mediatype::names::HTML;
use mediatype::names::TEXT;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::configuration::Configuration;
use crate::configuration::ConfigurationError;
use crate::schema::BlogSchema;

#[derive(Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum HealthStatus {
    Up,
}

#[derive(Debug, Serialize)]
struct Health {
    status: HealthStatus,
}

#[derive(Clone)]
struct GraphQLState {
    schema: BlogSchema,
    /// Rendered GraphiQL page, absent when the explorer is disabled.
    explorer: Option<String>,
}

/// Build the router for the given configuration.
pub fn main_router(
    configuration: &Configuration,
    schema: BlogSchema,
) -> Result<Router, ConfigurationError> {
    configuration.validate()?;

    let graphql_path = configuration.graphql().path();
    let explorer = configuration.explorer().enabled().then(|| {
        GraphiQLSource::build()
            .endpoint(graphql_path)
            .title("blog-graph")
            .finish()
    });

    let mut router = Router::new().route(graphql_path, get(handle_get).post(handle_post));

    if configuration.health_check().enabled() {
        router = router.route(configuration.health_check().path(), get(health));
    }

    let cors = configuration
        .cors()
        .clone()
        .into_layer()
        .map_err(|error| ConfigurationError::InvalidConfiguration {
            message: "invalid 'cors' configuration",
            error,
        })?;

    Ok(router
        .with_state(GraphQLState { schema, explorer })
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn handle_get(State(state): State<GraphQLState>, request: Request) -> Response {
    if let Some(page) = &state.explorer {
        if prefers_html(request.headers()) {
            return Html(page.clone()).into_response();
        }
    }

    match <GraphQLRequest as FromRequest<GraphQLState>>::from_request(request, &state).await {
        Ok(request) => execute(&state.schema, request).await.into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn handle_post(State(state): State<GraphQLState>, request: GraphQLRequest) -> GraphQLResponse {
    execute(&state.schema, request).await
}

async fn execute(schema: &BlogSchema, request: GraphQLRequest) -> GraphQLResponse {
    let request = request.into_inner();
    tracing::debug!(operation_name = ?request.operation_name, "executing graphql request");
    let response = schema.execute(request).await;
    if response.is_err() {
        tracing::debug!(errors = response.errors.len(), "graphql request completed with errors");
    }
    response.into()
}

async fn health() -> Json<Health> {
    Json(Health {
        status: HealthStatus::Up,
    })
}

fn prefers_html(headers: &HeaderMap) -> bool {
    let text_html = MediaType::new(TEXT, HTML);

    headers.get_all(&http::header::ACCEPT).iter().any(|value| {
        value
            .to_str()
            .map(|accept_str| {
                let mut list = MediaTypeList::new(accept_str);

                list.any(|mime| mime.as_ref() == Ok(&text_html))
            })
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use http::header::ACCEPT;

    use super::*;

    #[test]
    fn html_is_preferred_by_browsers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,*/*;q=0.8"),
        );
        assert!(prefers_html(&headers));
    }

    #[test]
    fn json_clients_do_not_get_html() {
        let mut headers = HeaderMap::new();
        assert!(!prefers_html(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert!(!prefers_html(&headers));
    }
}
