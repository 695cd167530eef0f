//! Seam between the workflows and the remote model.

use signbuddy_providers::{GeminiClient, GeminiError};
use signbuddy_types::{SignLabel, VerificationRequest, VerificationResult};
use std::error::Error;
use std::future::Future;

/// A remote judge able to grade sign photos and tell fun facts.
pub trait SignModel: Send + Sync {
    type Error: Error + Send + Sync + 'static;

    fn judge_sign(
        &self,
        request: &VerificationRequest,
    ) -> impl Future<Output = Result<VerificationResult, Self::Error>> + Send;

    /// Trimmed fun-fact text; may be empty.
    fn fun_fact(&self, label: &SignLabel) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

impl SignModel for GeminiClient {
    type Error = GeminiError;

    async fn judge_sign(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, GeminiError> {
        GeminiClient::judge_sign(self, request).await
    }

    async fn fun_fact(&self, label: &SignLabel) -> Result<String, GeminiError> {
        GeminiClient::fun_fact(self, label).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptionalModelError<E> {
    #[error("no Gemini API key configured")]
    NotConfigured,
    #[error(transparent)]
    Model(E),
}

/// An unconfigured model fails every call, which the workflows turn into
/// their usual fallbacks.
impl<M: SignModel> SignModel for Option<M> {
    type Error = OptionalModelError<M::Error>;

    async fn judge_sign(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, Self::Error> {
        match self {
            Some(model) => model
                .judge_sign(request)
                .await
                .map_err(OptionalModelError::Model),
            None => Err(OptionalModelError::NotConfigured),
        }
    }

    async fn fun_fact(&self, label: &SignLabel) -> Result<String, Self::Error> {
        match self {
            Some(model) => model.fun_fact(label).await.map_err(OptionalModelError::Model),
            None => Err(OptionalModelError::NotConfigured),
        }
    }
}
