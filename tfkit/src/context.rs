//! Request-scoped context: cancellation, deadlines, ambient values
//!
//! Every trait method takes a [`Context`] as its first parameter so remote
//! calls inherit the caller's deadline and cancellation signal unchanged.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    values: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                values: RwLock::new(HashMap::new()),
                done: done_rx,
                done_tx,
            }),
        }
    }

    /// Derive a context that cancels itself once `timeout` elapses.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let (done_tx, done_rx) = watch::channel(false);

        let timer_tx = done_tx.clone();
        tokio::spawn(async move {
            time::sleep_until(deadline.into()).await;
            let _ = timer_tx.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                values: RwLock::new(HashMap::new()),
                done: done_rx,
                done_tx,
            }),
        }
    }

    pub fn with_value<T: Send + Sync + 'static>(self, key: &str, value: T) -> Self {
        {
            let mut values = self
                .inner
                .values
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            values.insert(key.to_string(), Arc::new(value));
        }
        self
    }

    pub fn get_value<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let values = self
            .inner
            .values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        values
            .get(key)
            .cloned()
            .and_then(|v| v.downcast::<T>().ok())
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Receiver that flips to `true` when the context is cancelled.
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn context_stores_and_retrieves_values() {
        let ctx = Context::new().with_value("api_key", "secret123".to_string());

        let value = ctx.get_value::<String>("api_key");
        assert_eq!(value.as_deref(), Some(&"secret123".to_string()));
        assert!(ctx.get_value::<String>("missing").is_none());
    }

    #[tokio::test]
    async fn context_timeout_cancels() {
        let ctx = Context::new().with_timeout(Duration::from_millis(50));

        assert!(!ctx.is_cancelled());
        sleep(Duration::from_millis(100)).await;
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn context_manual_cancel() {
        let ctx = Context::new();

        assert!(!ctx.is_cancelled());
        ctx.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn context_deadline() {
        let ctx = Context::new();
        assert!(ctx.deadline().is_none());

        let ctx = ctx.with_timeout(Duration::from_secs(1));
        assert!(ctx.deadline().is_some());
    }
}
