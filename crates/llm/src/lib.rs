//! AI content layer for Strengths Manager.
//!
//! A [`CompletionClient`] sends prompts to a hosted messages API. The
//! generators in this crate wrap it with prompt construction, JSON parsing,
//! field validation and a typed fallback, so callers always get content back
//! as a [`Generated<T>`].

pub mod client;
pub mod coach;
pub mod content;
pub mod error;
pub mod helpers;
pub mod usage;
pub mod weekly;
pub mod welcome;

pub use client::{AnthropicClient, Completion, CompletionClient, CompletionRequest, PromptMessage};
pub use coach::{coach_system_prompt, CoachProfile, MemberProfile};
pub use content::Generated;
pub use error::LlmError;
pub use helpers::{generate_followup_questions, generate_starter_questions, generate_title};
pub use usage::{estimate_cost, TokenUsage};
pub use weekly::{generate_weekly_email_content, FeaturedMember, WeeklyContext, WeeklyEmailContent};
pub use welcome::{generate_welcome_email_content, WelcomeContext, WelcomeEmailContent};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::{Completion, CompletionClient, CompletionRequest, LlmError, TokenUsage};

    /// Replays canned replies and records every request it receives.
    pub struct ScriptedClient {
        replies: Mutex<Vec<Result<String, LlmError>>>,
        pub requests: Mutex<Vec<CompletionRequest>>,
        configured: bool,
    }

    impl ScriptedClient {
        pub fn replying(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
                configured: true,
            }
        }

        pub fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::replying(Vec::new())
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        fn model(&self) -> &str {
            "scripted"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
            self.requests.lock().unwrap().push(request);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(LlmError::EmptyResponse);
            }
            replies.remove(0).map(|text| Completion {
                text,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            })
        }
    }
}
