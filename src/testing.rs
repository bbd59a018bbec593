use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::client::{JsonRequest, Params, RequestMode};
use crate::error::{ConsoleError, Result};

pub struct PendingCall {
    pub endpoint: String,
    pub params: Params,
    pub mode: RequestMode,
    reply: oneshot::Sender<Result<Value>>,
}

impl PendingCall {
    pub fn respond(self, result: Result<Value>) {
        self.reply.send(result).ok();
    }
}

/// In-memory `JsonRequest` whose responses are released by the test.
#[derive(Default)]
pub struct ScriptedRequester {
    pending: Mutex<Vec<PendingCall>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedRequester {
    /// Wait until a call to `endpoint` is in flight and take the oldest one.
    pub async fn take(&self, endpoint: &str) -> PendingCall {
        loop {
            {
                let mut pending = self.pending.lock().unwrap();
                if let Some(idx) = pending.iter().position(|c| c.endpoint == endpoint) {
                    return pending.remove(idx);
                }
            }
            tokio::task::yield_now().await;
        }
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == endpoint)
            .count()
    }
}

#[async_trait]
impl JsonRequest for ScriptedRequester {
    async fn request(&self, endpoint: &str, params: Params, mode: RequestMode) -> Result<Value> {
        let (tx, rx) = oneshot::channel();
        self.seen.lock().unwrap().push(endpoint.to_string());
        self.pending.lock().unwrap().push(PendingCall {
            endpoint: endpoint.to_string(),
            params,
            mode,
            reply: tx,
        });
        rx.await
            .unwrap_or_else(|_| Err(ConsoleError::Transport("request abandoned".to_string())))
    }
}
