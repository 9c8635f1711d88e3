//! In-memory record of the last submitted batch

use serde_json::Value;
use tokio::sync::RwLock;

/// Last raw batch received on `/take`, kept for inspection only
///
/// Replaced wholesale on every submission and lost on restart.
pub struct ProcessState {
    last_batch: RwLock<Value>,
}

impl ProcessState {
    pub fn new() -> Self {
        Self {
            last_batch: RwLock::new(Value::Object(Default::default())),
        }
    }

    pub async fn replace(&self, batch: Value) {
        *self.last_batch.write().await = batch;
    }

    pub async fn snapshot(&self) -> Value {
        self.last_batch.read().await.clone()
    }
}

impl Default for ProcessState {
    fn default() -> Self {
        Self::new()
    }
}
