use async_trait::async_trait;

use super::{CompletionBackend, CompletionRequest, LlmError};

/// Offline provider. Answers with a stable, non-JSON string derived from the prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockClient;

#[async_trait]
impl CompletionBackend for MockClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        // Sums UTF-16 code units, so astral characters count as two.
        let hash = request.prompt.encode_utf16().map(u64::from).sum::<u64>() % 1000;
        Ok(format!("Mock response {hash}"))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
