//! Serves rendered fractals as PNG images over HTTP.
//!
//! Every request starts from a copy of the base config, applies the query
//! string on top of it and, unless `random=false` is given or the query
//! names a center or radius, picks a random center and radius. Nothing a
//! request does is visible to another.

use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use image::{ImageOutputFormat, RgbaImage};
use rand::Rng;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::render_with_threads;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("could not listen on {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("request worker {0} panicked")]
    WorkerPanicked(usize),
}

#[derive(Clone, Debug)]
pub struct ServeOptions {
    pub addr: String,
    pub base: RenderConfig,
    /// Requests handled at the same time.
    pub workers: usize,
    /// Threads used by each render.
    pub render_threads: usize,
}

impl ServeOptions {
    pub fn new(port: &str, base: RenderConfig) -> Self {
        let cores = num_cpus::get_physical();
        Self {
            addr: format!("0.0.0.0:{}", port),
            base,
            workers: cores,
            render_threads: threads_per_worker(cores, cores),
        }
    }
}

/// Splits `cores` between `workers` concurrent renders, at least one each.
pub fn threads_per_worker(cores: usize, workers: usize) -> usize {
    (cores / workers.max(1)).max(1)
}

#[derive(Debug, PartialEq)]
pub enum Reply {
    Png(Vec<u8>),
    BadRequest(String),
    Internal(String),
}

impl Reply {
    pub fn status(&self) -> u16 {
        match self {
            Self::Png(_) => 200,
            Self::BadRequest(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let status = StatusCode(self.status());
        match self {
            Self::Png(bytes) => Response::from_data(bytes)
                .with_status_code(status)
                .with_header(header("Content-Type", "image/png")),
            Self::BadRequest(msg) | Self::Internal(msg) => Response::from_string(msg + "\n")
                .with_status_code(status)
                .with_header(header("Content-Type", "text/plain; charset=utf-8")),
        }
    }
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header is valid")
}

pub fn encode_png(img: &RgbaImage) -> image::ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

fn query_of(url: &str) -> &str {
    url.split_once('?').map(|(_, q)| q).unwrap_or("")
}

/// Builds the reply for one request URL. Kept free of I/O so it can be
/// exercised without a socket.
pub fn handle<R: Rng>(
    base: &RenderConfig,
    url: &str,
    rng: &mut R,
    threads: usize,
) -> Reply {
    let params = form_urlencoded::parse(query_of(url).as_bytes());
    let parsed = match base.apply_params(params) {
        Ok(parsed) => parsed,
        Err(e) => return Reply::BadRequest(e.to_string()),
    };

    let mut config = parsed.config;
    if parsed.randomize {
        config.randomize_viewport(rng);
    }
    debug!(?config, "rendering");

    let img = match render_with_threads(config, threads) {
        Ok(img) => img,
        Err(e) => return Reply::BadRequest(e.to_string()),
    };
    match encode_png(&img) {
        Ok(bytes) => Reply::Png(bytes),
        Err(e) => Reply::Internal(format!("png encoding failed: {}", e)),
    }
}

fn respond(request: Request, base: &RenderConfig, threads: usize) {
    let start = Instant::now();
    let url = request.url().to_string();
    let reply = handle(base, &url, &mut rand::thread_rng(), threads);
    let status = reply.status();
    match &reply {
        Reply::Png(bytes) => info!(
            %url,
            status,
            bytes = bytes.len(),
            elapsed = ?start.elapsed(),
            "served"
        ),
        Reply::BadRequest(msg) | Reply::Internal(msg) => warn!(%url, status, %msg, "rejected"),
    }
    if let Err(e) = request.respond(reply.into_response()) {
        warn!(%url, error = %e, "failed to write response");
    }
}

/// Listens on `options.addr` until the listener fails. Each worker thread
/// takes requests off the shared listener and renders them one at a time.
pub fn serve(options: ServeOptions) -> Result<(), ServeError> {
    let server = Server::http(&options.addr).map_err(|e| ServeError::Bind {
        addr: options.addr.clone(),
        reason: e.to_string(),
    })?;
    let server = Arc::new(server);
    info!(addr = %options.addr, workers = options.workers, "serving fractals");

    let handles: Vec<_> = (0..options.workers.max(1))
        .map(|id| {
            let server = server.clone();
            let base = options.base.clone();
            let threads = options.render_threads;
            thread::spawn(move || loop {
                match server.recv() {
                    Ok(request) => respond(request, &base, threads),
                    Err(e) => {
                        warn!(worker = id, error = %e, "listener closed");
                        return;
                    }
                }
            })
        })
        .collect();

    for (id, handle) in handles.into_iter().enumerate() {
        handle.join().map_err(|_| ServeError::WorkerPanicked(id))?;
    }
    Ok(())
}
