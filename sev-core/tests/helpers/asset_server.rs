//! Local HTTP origin for fetcher tests
//!
//! Serves a fixed set of paths with generated bodies; everything else is a
//! 404 (axum's default fallback).

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;

pub struct AssetServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl AssetServer {
    /// Serve each `(path, size)` with a body of `size` bytes
    pub async fn start(assets: &[(&str, usize)]) -> Self {
        let mut app = Router::new();
        for (path, size) in assets {
            let size = *size;
            app = app.route(path, get(move || async move { vec![0u8; size] }));
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind local asset server");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

impl Drop for AssetServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
