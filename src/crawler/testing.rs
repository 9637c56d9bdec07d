//! In-memory fakes for the transport and sleeper seams

use crate::crawler::fetcher::{JsonTransport, TransportError};
use crate::crawler::limiter::Sleeper;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Records requested pauses instead of waiting
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Serves scripted responses per URL
///
/// Each URL has a queue; the last response repeats once the queue has a
/// single entry left. Unknown URLs answer with HTTP 404.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn respond(&self, url: &str, response: Result<Value, TransportError>) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl JsonTransport for FakeTransport {
    async fn get_json(&self, url: &str, _timeout: Duration) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub fn timeout(url: &str) -> TransportError {
    TransportError::Timeout {
        url: url.to_string(),
    }
}
