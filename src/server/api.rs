use crate::cli::ServeArgs;
use crate::models::chat::{ ChatReply, ChatRequest, ErrorReply };
use crate::relay::{ ChatRelay, RelayError, GENERIC_FAILURE };
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    routing::post,
    Router,
    Json,
    extract::{ State, rejection::JsonRejection },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };
use uuid::Uuid;

#[derive(Clone)]
struct AppState {
    relay: ChatRelay,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorReply {
                error: GENERIC_FAILURE.to_string(),
            }),
        ).into_response()
    }
}

pub fn router(relay: ChatRelay) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

pub async fn start_http_server(
    relay: ChatRelay,
    args: &ServeArgs
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", args.port).parse::<SocketAddr>()?;
    let app = router(relay);

    match (args.enable_tls, &args.tls_cert_path, &args.tls_key_path) {
        (true, Some(cert_path), Some(key_path)) => {
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                cert_path,
                key_path
            );
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;
            info!("Server is running on https://localhost:{}", args.port);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service()).await?;
        }
        (true, _, _) => {
            error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
            return Err("TLS enabled without cert/key".into());
        }
        (false, _, _) => {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("Server is running on http://localhost:{}", args.port);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let result = match payload {
        Ok(Json(request)) => state.relay.relay(&request).await,
        Err(rejection) => Err(RelayError::MalformedRequest(rejection.body_text())),
    };

    match result {
        Ok(text) => {
            info!("[{}] reply relayed ({} bytes)", request_id, text.len());
            (StatusCode::OK, Json(ChatReply { message: text })).into_response()
        }
        Err(e) => {
            error!("[{}] chat request failed: {}", request_id, e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::test_support::StubChatClient;
    use crate::models::chat::Turn;
    use axum::body::{ to_bytes, Body };
    use axum::http::{ header, Request };
    use serde_json::{ json, Value };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn relays_reply_as_message() {
        let stub = Arc::new(StubChatClient::replying("Hello! How can I help?"));
        let app = router(ChatRelay::new(stub.clone()));

        let (status, body) = send(app, chat_request(r#"{"history":[],"message":"Hi"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Hello! How can I help?" }));
        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0], (vec![], "Hi".to_string()));
    }

    #[tokio::test]
    async fn passes_history_through_unvalidated() {
        let stub = Arc::new(StubChatClient::replying("ok"));
        let app = router(ChatRelay::new(stub.clone()));
        let body = json!({
            "history": [
                { "role": "model", "parts": [{ "text": "Welcome" }] },
                { "role": "model", "parts": [{ "text": "Still here" }] }
            ],
            "message": "Hi"
        });

        let (status, _) = send(app, chat_request(&body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0].0, vec![Turn::model("Welcome"), Turn::model("Still here")]);
    }

    #[tokio::test]
    async fn provider_failure_is_generic_500() {
        let app = router(ChatRelay::new(Arc::new(StubChatClient::failing())));

        let (status, body) = send(app, chat_request(r#"{"history":[],"message":"Hi"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Something went wrong" }));
    }

    #[tokio::test]
    async fn missing_message_is_generic_500() {
        let stub = Arc::new(StubChatClient::replying("unused"));
        let app = router(ChatRelay::new(stub.clone()));

        let (status, body) = send(app, chat_request(r#"{"history":[]}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Something went wrong" }));
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_json_body_is_generic_500() {
        let app = router(ChatRelay::new(Arc::new(StubChatClient::replying("unused"))));
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("Hi"))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Something went wrong" }));
    }

    #[tokio::test]
    async fn allows_any_origin() {
        let app = router(ChatRelay::new(Arc::new(StubChatClient::replying("ok"))));
        let mut request = chat_request(r#"{"message":"Hi"}"#);
        request.headers_mut().insert(header::ORIGIN, "http://localhost:5173".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
