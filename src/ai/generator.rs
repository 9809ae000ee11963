use crate::error::GenerationError;
use async_trait::async_trait;

/// Text-in, text-out generative model
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run `prompt` against the named model
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

#[cfg(test)]
pub use scripted::ScriptedGenerator;

#[cfg(test)]
mod scripted {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Generator that replays queued responses in order.
    ///
    /// Records every model and prompt it receives so tests can assert on them.
    /// Once the queue is drained every call fails with `EmptyResponse`.
    #[derive(Debug, Default)]
    pub struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, GenerationError>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, text: impl Into<String>) -> Self {
            self.responses.lock().unwrap().push_back(Ok(text.into()));
            self
        }

        pub fn with_error(self, error: GenerationError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        /// Prompts received so far
        pub fn prompts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
        }

        /// Model names received so far
        pub fn models(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));

            let next = self.responses.lock().unwrap().pop_front();
            next.unwrap_or(Err(GenerationError::EmptyResponse))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_runs_dry() {
        let generator = ScriptedGenerator::new()
            .with_response("first")
            .with_error(GenerationError::Provider("quota exceeded".into()));

        assert_eq!(generator.generate("m1", "a").await.unwrap(), "first");
        assert_eq!(
            generator.generate("m1", "b").await.unwrap_err().to_string(),
            "quota exceeded"
        );
        assert!(matches!(
            generator.generate("m2", "c").await,
            Err(GenerationError::EmptyResponse)
        ));
        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
        assert_eq!(generator.models(), vec!["m1", "m1", "m2"]);
    }
}
