//! Sign verification workflow.
//!
//! Every path yields a [`VerificationResult`]. The only way a learner sees
//! `correct: false` is the remote judge saying so explicitly; being offline,
//! a failed call, an unreadable answer or a timeout all resolve to praise.

use crate::connectivity::Connectivity;
use crate::model::SignModel;
use crate::praise::PraisePicker;
use signbuddy_types::{ImagePayload, SignLabel, VerificationRequest, VerificationResult};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Appended to offline praise so the shell can tell the learner why.
pub const OFFLINE_MARKER: &str = "(Offline Mode)";

/// Shown when the judge was reachable but could not produce a verdict.
pub const FALLBACK_FEEDBACK: &str = "I think that looked amazing! Good try!";

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_OFFLINE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationSettings {
    /// Upper bound on one remote judge call.
    pub remote_timeout: Duration,
    /// Simulated "thinking" pause before offline praise.
    pub offline_delay: Duration,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            offline_delay: DEFAULT_OFFLINE_DELAY,
        }
    }
}

pub struct SignVerificationService<M, C> {
    model: M,
    connectivity: C,
    praise: PraisePicker,
    settings: VerificationSettings,
}

impl<M: SignModel, C: Connectivity> SignVerificationService<M, C> {
    #[must_use]
    pub fn new(model: M, connectivity: C) -> Self {
        Self {
            model,
            connectivity,
            praise: PraisePicker::from_entropy(),
            settings: VerificationSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: VerificationSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_praise(mut self, praise: PraisePicker) -> Self {
        self.praise = praise;
        self
    }

    #[must_use]
    pub fn settings(&self) -> VerificationSettings {
        self.settings
    }

    /// Judge one attempt.
    pub async fn verify(&self, request: VerificationRequest) -> VerificationResult {
        if !self.connectivity.is_online() {
            return self.offline_verdict().await;
        }
        self.remote_verdict(&request).await
    }

    /// Judge an attempt straight from shell-supplied strings.
    ///
    /// `image` may carry a data-URL prefix. Input that cannot form a request
    /// is treated like any other failed judge call.
    pub async fn verify_encoded(&self, image: &str, target_label: &str) -> VerificationResult {
        if !self.connectivity.is_online() {
            return self.offline_verdict().await;
        }

        let image = match ImagePayload::from_encoded(image) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(%err, label = target_label, "Unusable image payload; using fallback");
                return fallback_verdict();
            }
        };
        let label = match SignLabel::new(target_label) {
            Ok(label) => label,
            Err(err) => {
                tracing::warn!(%err, "Unusable sign label; using fallback");
                return fallback_verdict();
            }
        };

        self.remote_verdict(&VerificationRequest::new(image, label))
            .await
    }

    async fn offline_verdict(&self) -> VerificationResult {
        tracing::debug!("Offline; simulating judge");
        sleep(self.settings.offline_delay).await;
        VerificationResult::correct(format!("{} {OFFLINE_MARKER}", self.praise.pick()))
    }

    async fn remote_verdict(&self, request: &VerificationRequest) -> VerificationResult {
        let label = request.target_label.as_str();
        let judged = timeout(self.settings.remote_timeout, self.model.judge_sign(request)).await;

        match judged {
            Ok(Ok(verdict)) => {
                tracing::debug!(label, correct = verdict.correct, "Judge returned verdict");
                verdict
            }
            Ok(Err(err)) => {
                tracing::warn!(%err, label, "Error verifying sign; using fallback");
                fallback_verdict()
            }
            Err(_) => {
                tracing::warn!(
                    label,
                    timeout_ms = self.settings.remote_timeout.as_millis() as u64,
                    "Sign verification timed out; using fallback"
                );
                fallback_verdict()
            }
        }
    }
}

fn fallback_verdict() -> VerificationResult {
    VerificationResult::correct(FALLBACK_FEEDBACK)
}
