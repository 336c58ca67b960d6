//! Scripted asset fetcher
//!
//! Each path can be given a delay and an outcome. Every call is logged with
//! its start and end instants (tokio time, so paused-clock tests see exact
//! values) and the peak number of overlapping requests is tracked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sev_core::error::FetchError;
use sev_core::preload::AssetFetcher;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Script {
    delay: Duration,
    result: Result<u64, FetchError>,
}

/// One recorded fetch
#[derive(Debug, Clone)]
pub struct FetchCall {
    pub path: String,
    pub started: Instant,
    pub finished: Option<Instant>,
}

#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<FetchCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path succeeds with `bytes` after `delay`
    pub fn ok(self, path: &str, delay: Duration, bytes: u64) -> Self {
        self.script(path, delay, Ok(bytes))
    }

    /// Path fails with `error` after `delay`
    pub fn fail(self, path: &str, delay: Duration, error: FetchError) -> Self {
        self.script(path, delay, Err(error))
    }

    fn script(self, path: &str, delay: Duration, result: Result<u64, FetchError>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_string(), Script { delay, result });
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requested_paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for ScriptedFetcher {
    async fn fetch(&self, path: &str) -> Result<u64, FetchError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(Script {
                delay: Duration::ZERO,
                result: Ok(1024),
            });

        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(FetchCall {
                path: path.to_string(),
                started: Instant::now(),
                finished: None,
            });
            calls.len() - 1
        };
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.lock().unwrap()[index].finished = Some(Instant::now());
        script.result
    }
}
