//! Request handling and server lifecycle using rouille.
//!
//! # Key types
//!
//! - [`FrameService`] - stateless request handler (config + frame index)
//! - [`FrameServer`] - bound listening socket, runs the service
//!
//! # Thread safety
//!
//! rouille dispatches requests on a thread pool. `FrameService` is shared
//! through an `Arc` and holds only immutable configuration; every request
//! rescans the filesystem, so there is nothing to synchronize.

use log::{debug, info, warn};
use rouille::{Request, Response};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

use super::files::{self, ServeError};
use super::page::{self, PageOptions};
use crate::config::ViewerConfig;
use crate::index::{FrameIndex, IndexError};

/// Generic API response
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok_msg(msg: &str) -> Self {
        Self { success: true, message: Some(msg.to_string()), error: None }
    }

    fn err(msg: &str) -> Self {
        Self { success: false, message: None, error: Some(msg.to_string()) }
    }
}

/// Serves the frame index, frame files and the static fallback
pub struct FrameService {
    index: FrameIndex,
    root: PathBuf,
    page: PageOptions,
}

impl FrameService {
    pub fn new(config: &ViewerConfig) -> Result<Self, IndexError> {
        Ok(Self {
            index: FrameIndex::from_config(config)?,
            root: config.root.clone(),
            page: PageOptions::from_config(config),
        })
    }

    pub fn index(&self) -> &FrameIndex {
        &self.index
    }

    /// HEAD is answered by the GET handler; the transport drops the body and
    /// keeps the headers.
    pub fn handle_request(&self, request: &Request) -> Response {
        let response = match request.method() {
            "GET" | "HEAD" => self.route(request),
            _ => Response::json(&ApiResponse::err("Method not allowed"))
                .with_status_code(405)
                .with_additional_header("Allow", "GET, HEAD"),
        };

        debug!("{} {} -> {}", request.method(), request.raw_url(), response.status_code);
        response
    }

    fn route(&self, request: &Request) -> Response {
        match request.url().as_str() {
            "/" => self.index_page(),
            "/api/files" => {
                self.file_list().with_additional_header("Access-Control-Allow-Origin", "*")
            }
            "/api/health" => Response::json(&ApiResponse::ok_msg("seqview"))
                .with_additional_header("Access-Control-Allow-Origin", "*"),
            _ => self.serve_path(request).unwrap_or_else(ServeError::into_response),
        }
    }

    fn index_page(&self) -> Response {
        let frames = self.index.scan();
        Response::html(page::render_page(&frames, &self.page))
    }

    fn file_list(&self) -> Response {
        let paths: Vec<String> = self
            .index
            .scan()
            .into_iter()
            .map(|frame| frame.request_path)
            .collect();
        Response::json(&paths)
    }

    fn serve_path(&self, request: &Request) -> Result<Response, ServeError> {
        let url = request.url();
        let segments = files::url_segments(&url)?;

        if segments.first() == Some(&self.index.frames_dir()) {
            files::serve_frame(&self.index, &url, &segments)
        } else {
            files::serve_static(request, &self.root)
        }
    }
}

type Handler = Box<dyn Fn(&Request) -> Response + Send + Sync + 'static>;

/// Listening socket bound to a [`FrameService`]
pub struct FrameServer {
    inner: rouille::Server<Handler>,
}

impl FrameServer {
    /// Bind `addr`. Failing to bind (port in use, bad address) is an error,
    /// not a panic, so the binary can exit with a diagnostic.
    pub fn bind(addr: &str, service: FrameService) -> anyhow::Result<Self> {
        let service = Arc::new(service);
        let handler: Handler = Box::new(move |request: &Request| service.handle_request(request));
        let inner = rouille::Server::new(addr, handler)
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
        Ok(Self { inner })
    }

    pub fn addr(&self) -> SocketAddr {
        self.inner.server_addr()
    }

    /// Serve forever on the current thread.
    pub fn run(self) {
        info!("Frame viewer serving on http://{}", self.addr());
        self.inner.run();
        warn!("Server loop exited");
    }

    /// Serve on a background thread; send `()` to stop.
    pub fn spawn(self) -> (JoinHandle<()>, mpsc::Sender<()>) {
        info!("Frame viewer serving on http://{} (background)", self.addr());
        self.inner.stoppable()
    }
}
