//! Short fun facts shown on the lesson screen.

use crate::connectivity::Connectivity;
use crate::model::SignModel;
use crate::verify::DEFAULT_REMOTE_TIMEOUT;
use signbuddy_types::SignLabel;
use std::time::Duration;
use tokio::time::timeout;

pub const OFFLINE_FUN_FACT: &str = "You are a superstar!";
/// The model answered, but with nothing.
pub const EMPTY_FUN_FACT: &str = "You are doing great!";
pub const FAILED_FUN_FACT: &str = "Keep up the good work!";

pub struct EncouragementFetcher<M, C> {
    model: M,
    connectivity: C,
    remote_timeout: Duration,
}

impl<M: SignModel, C: Connectivity> EncouragementFetcher<M, C> {
    #[must_use]
    pub fn new(model: M, connectivity: C) -> Self {
        Self {
            model,
            connectivity,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub async fn fun_fact(&self, label: &SignLabel) -> String {
        if !self.connectivity.is_online() {
            return OFFLINE_FUN_FACT.to_string();
        }

        match timeout(self.remote_timeout, self.model.fun_fact(label)).await {
            Ok(Ok(fact)) if fact.trim().is_empty() => EMPTY_FUN_FACT.to_string(),
            Ok(Ok(fact)) => fact.trim().to_string(),
            Ok(Err(err)) => {
                tracing::warn!(%err, label = label.as_str(), "Fun fact request failed");
                FAILED_FUN_FACT.to_string()
            }
            Err(_) => {
                tracing::warn!(label = label.as_str(), "Fun fact request timed out");
                FAILED_FUN_FACT.to_string()
            }
        }
    }
}
