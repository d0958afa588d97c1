//! The external text-producer contract: an opaque prompt in, a text blob
//! out. No streaming, no structured output. Emptiness is a hard failure
//! handled by the orchestrator, never silently retried here.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Transport/integrity failures from the generator layer. These are fatal
/// to a run; only the orchestrator's explicit repair loop issues second
/// calls, and only for contract failures.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator request failed: {0}")]
    Request(String),

    #[error("missing generator credential: {0}")]
    MissingCredential(String),

    #[error("scripted generator ran out of replies")]
    Exhausted,
}

/// Named generation options passed through to the producer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub provider: String,
    pub model: String,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            max_output_tokens: 8192,
        }
    }
}

/// Text in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GeneratorError>;
}

/// A generator replaying a fixed sequence of replies in order. Backs the
/// deterministic sequential execution mode and the orchestrator tests.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedGenerator {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    pub fn push(&self, reply: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply.into());
    }

    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, GeneratorError> {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or(GeneratorError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let generator = ScriptedGenerator::new(["one", "two"]);
        let options = GenerationOptions::default();
        assert_eq!(generator.generate("p", &options).await.unwrap(), "one");
        assert_eq!(generator.generate("p", &options).await.unwrap(), "two");
        assert!(matches!(
            generator.generate("p", &options).await,
            Err(GeneratorError::Exhausted)
        ));
    }
}
