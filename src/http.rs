//! HTTP API for learning paths
//!
//! ## Endpoints
//!
//! - `GET  /health` - Health check with table counts
//! - `POST /paths` - Create a path
//! - `POST /paths/enroll` - Enroll a user (idempotent)
//! - `GET  /paths/enrolled?user_id=` - Paths the user is enrolled in
//! - `GET  /paths/recommended?user_id=` - Up to N paths the user has not joined
//! - `GET  /paths/{id}?user_id=` - Path detail (mock data for unknown ids)
//! - `POST /paths/{id}/progress?user_id=` - Record content progress
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST -H "Content-Type: application/json" \
//!      -d '{"title": "Rust Basics", "subject": "programming"}' \
//!      http://localhost:8092/paths
//!
//! curl -X POST -d '{"user_id": 1, "path_id": 3}' http://localhost:8092/paths/enroll
//!
//! curl -X POST -d '{"content_id": 12, "progress": 40}' \
//!      "http://localhost:8092/paths/3/progress?user_id=1"
//! ```

use crate::error::StorageError;
use crate::services::{response, Services};
use crate::views::UserQuery;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// HTTP server state
pub struct HttpServer {
    services: Arc<Services>,
    bind_addr: SocketAddr,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(services: Arc<Services>, bind_addr: SocketAddr) -> Self {
        Self {
            services,
            bind_addr,
        }
    }

    /// Run the HTTP server
    pub async fn run(self: Arc<Self>) -> Result<(), StorageError> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        info!(addr = %self.bind_addr, "HTTP server listening");

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let server = server.clone();
                    async move { server.handle_request(req).await }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    warn!(addr = %remote_addr, error = %err, "Connection error");
                }
            });
        }
    }

    /// Route requests to handlers
    pub async fn handle_request<B>(
        &self,
        req: Request<B>,
    ) -> Result<Response<Full<Bytes>>, hyper::Error>
    where
        B: Body,
        B::Error: Display,
    {
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);
        let method = req.method().clone();

        debug!(method = %method, path = %path, "Incoming request");

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let query = query.as_deref();

        let response = match (method, segments.as_slice()) {
            (Method::GET, ["health"]) => self.handle_health(),

            (Method::POST, ["paths"]) => self.handle_create_path(req).await,
            (Method::POST, ["paths", "enroll"]) => self.handle_enroll(req).await,
            (Method::GET, ["paths", "enrolled"]) => self.handle_enrolled(query),
            (Method::GET, ["paths", "recommended"]) => self.handle_recommended(query),
            (Method::GET, ["paths", id]) => self.handle_get_path(id, query),
            (Method::POST, ["paths", id, "progress"]) => {
                self.handle_progress(req, id, query).await
            }

            (_, ["health"]) | (_, ["paths"]) | (_, ["paths", _]) | (_, ["paths", _, "progress"]) => {
                response::method_not_allowed()
            }

            _ => response::not_found("Not found"),
        };

        Ok(response)
    }

    /// GET /health
    fn handle_health(&self) -> Response<Full<Bytes>> {
        response::from_result(self.services.db.stats().map(|stats| {
            serde_json::json!({
                "status": "ok",
                "users": stats.user_count,
                "paths": stats.path_count,
                "contents": stats.content_count,
                "enrollments": stats.enrollment_count,
            })
        }))
    }

    /// POST /paths
    async fn handle_create_path<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        let result = match read_json(req).await {
            Ok(input) => self.services.paths.create(input),
            Err(e) => Err(e),
        };
        response::from_create_result(result)
    }

    /// POST /paths/enroll
    async fn handle_enroll<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        let result = match read_json(req).await {
            Ok(input) => self.services.enrollments.enroll(input),
            Err(e) => Err(e),
        };
        response::from_result(result)
    }

    /// GET /paths/{id}?user_id=
    fn handle_get_path(&self, id: &str, query: Option<&str>) -> Response<Full<Bytes>> {
        let result = parse_path_id(id)
            .and_then(|path_id| Ok((path_id, parse_query(query)?.user_id)))
            .and_then(|(path_id, user_id)| self.services.paths.get(path_id, user_id));
        response::from_result(result)
    }

    /// POST /paths/{id}/progress?user_id=
    async fn handle_progress<B>(
        &self,
        req: Request<B>,
        id: &str,
        query: Option<&str>,
    ) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        let path_id = match parse_path_id(id) {
            Ok(path_id) => path_id,
            Err(e) => return response::error_response(e),
        };
        let user_id = match require_user_id(query) {
            Ok(user_id) => user_id,
            Err(e) => return response::error_response(e),
        };

        let result = match read_json(req).await {
            Ok(input) => self.services.progress.update(path_id, user_id, input),
            Err(e) => Err(e),
        };
        response::from_result(result)
    }

    /// GET /paths/enrolled?user_id=
    fn handle_enrolled(&self, query: Option<&str>) -> Response<Full<Bytes>> {
        let result = require_user_id(query)
            .and_then(|user_id| self.services.recommendations.list_enrolled(user_id));
        response::from_result(result)
    }

    /// GET /paths/recommended?user_id=
    fn handle_recommended(&self, query: Option<&str>) -> Response<Full<Bytes>> {
        let result = require_user_id(query)
            .and_then(|user_id| self.services.recommendations.recommend(user_id));
        response::from_result(result)
    }
}

/// Read and parse a JSON body; an empty body parses as `T::default()`
async fn read_json<B, T>(req: Request<B>) -> Result<T, StorageError>
where
    B: Body,
    B::Error: Display,
    T: DeserializeOwned + Default,
{
    let body = req
        .into_body()
        .collect()
        .await
        .map_err(|e| StorageError::Internal(format!("Failed to read body: {}", e)))?
        .to_bytes();

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    Ok(serde_json::from_slice(&body)?)
}

fn parse_path_id(raw: &str) -> Result<i64, StorageError> {
    raw.parse()
        .map_err(|_| StorageError::InvalidInput(format!("Invalid path id: {}", raw)))
}

fn parse_query(query: Option<&str>) -> Result<UserQuery, StorageError> {
    serde_urlencoded::from_str(query.unwrap_or(""))
        .map_err(|e| StorageError::InvalidInput(format!("Invalid query string: {}", e)))
}

fn require_user_id(query: Option<&str>) -> Result<i64, StorageError> {
    parse_query(query)?
        .user_id
        .ok_or_else(|| StorageError::InvalidInput("user_id query parameter is required".into()))
}
