//! Scripted transport for tests.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::RpcTransport;
use crate::error::{OverlayError, Result};

/// Answers calls from per-method queues, falling back to a sticky response.
///
/// Unscripted methods fail with `OverlayError::Rpc`.
#[derive(Default)]
pub struct MockTransport {
    queued: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
    sticky: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `method` with `value` once its queue is drained.
    pub fn respond(&self, method: &str, value: Value) {
        self.sticky.lock().unwrap().insert(method.to_string(), value);
    }

    /// Answer the next call to `method` with `result`.
    pub fn push(&self, method: &str, result: Result<Value>) {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn fail_next(&self, method: &str, message: &str) {
        self.push(method, Err(OverlayError::Rpc(message.to_string())));
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

impl RpcTransport for MockTransport {
    fn call<'a>(&'a self, method: &'a str, args: Vec<Value>) -> BoxFuture<'a, Result<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), args));

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|q| q.pop_front());
        let result = match queued {
            Some(result) => result,
            None => self
                .sticky
                .lock()
                .unwrap()
                .get(method)
                .cloned()
                .ok_or_else(|| OverlayError::Rpc(format!("no scripted response for {}", method))),
        };

        async move { result }.boxed()
    }
}
