//! Welcome email content, generated once a user saves their top five.

use serde_json::Value;

use crate::client::{CompletionClient, CompletionRequest};
use crate::coach::describe_strengths;
use crate::content::{self, Generated};
use crate::error::LlmError;

const SYSTEM: &str = "You write warm, insightful onboarding emails for a CliftonStrengths \
coaching product aimed at managers. Respond with a single JSON object and nothing else.";

#[derive(Debug, Clone)]
pub struct WelcomeContext {
    pub first_name: String,
    pub strengths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeEmailContent {
    pub subject: String,
    pub greeting: String,
    pub dna_insight: String,
    pub challenge: String,
    pub what_to_expect: String,
}

pub async fn generate_welcome_email_content(
    client: &dyn CompletionClient,
    ctx: &WelcomeContext,
) -> Generated<WelcomeEmailContent> {
    let request = CompletionRequest::single(SYSTEM, prompt(ctx), 1024);
    content::generate(client, "welcome email", request, parse, || fallback(ctx)).await
}

fn prompt(ctx: &WelcomeContext) -> String {
    format!(
        "Write a welcome email for {name}, whose top 5 CliftonStrengths are: {strengths}.\n\n\
         Return JSON with these string fields:\n\
         - \"subject\": email subject, at most 80 characters\n\
         - \"greeting\": one friendly opening line addressing {name}, at most 120 characters\n\
         - \"dna_insight\": what makes this combination of strengths distinctive, especially \
         how the top two interact, at most 600 characters\n\
         - \"challenge\": one small, concrete challenge to try this week, at most 400 characters\n\
         - \"what_to_expect\": explain they will receive a short coaching email each week \
         for 12 weeks, at most 400 characters",
        name = ctx.first_name,
        strengths = describe_strengths(&ctx.strengths),
    )
}

fn parse(raw: &str) -> Result<WelcomeEmailContent, LlmError> {
    let v: Value = content::extract_json(raw)?;
    Ok(WelcomeEmailContent {
        subject: content::required_str(&v, "subject", 80)?,
        greeting: content::required_str(&v, "greeting", 120)?,
        dna_insight: content::required_str(&v, "dna_insight", 600)?,
        challenge: content::required_str(&v, "challenge", 400)?,
        what_to_expect: content::required_str(&v, "what_to_expect", 400)?,
    })
}

fn fallback(ctx: &WelcomeContext) -> WelcomeEmailContent {
    let first = ctx.strengths.first().map_or("your top strength", String::as_str);
    let second = ctx.strengths.get(1).map_or("your second strength", String::as_str);
    let name = &ctx.first_name;
    WelcomeEmailContent {
        subject: content::truncate_chars(
            &format!("Welcome, {name}! Your strengths journey starts now"),
            80,
        ),
        greeting: content::truncate_chars(
            &format!("Hi {name}, welcome to Strengths Manager!"),
            120,
        ),
        dna_insight: format!(
            "Your top two strengths, {first} and {second}, shape how you lead every day. \
             When you pair {first} with {second}, you bring a combination that few people \
             share, and your team feels it."
        ),
        challenge: format!(
            "This week, notice one moment where {first} helped you succeed and share it \
             with someone on your team."
        ),
        what_to_expect: "Every week for the next 12 weeks you'll receive a short coaching \
             email with one insight about your strengths, one action to try, and a tip \
             for working with your team."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;

    fn ctx() -> WelcomeContext {
        WelcomeContext {
            first_name: "Ann".into(),
            strengths: vec![
                "Achiever".into(),
                "Learner".into(),
                "Focus".into(),
                "Relator".into(),
                "Input".into(),
            ],
        }
    }

    #[tokio::test]
    async fn model_reply_is_parsed_and_truncated() {
        let long_subject = "S".repeat(100);
        let reply = serde_json::json!({
            "subject": long_subject,
            "greeting": "Hi Ann",
            "dna_insight": "Insight",
            "challenge": "Challenge",
            "what_to_expect": "Weekly emails",
        })
        .to_string();
        let client = ScriptedClient::replying(vec![Ok(format!("```json\n{reply}\n```"))]);

        let generated = generate_welcome_email_content(&client, &ctx()).await;
        assert!(!generated.is_fallback());
        assert_eq!(generated.usage().unwrap().input_tokens, 10);
        let content = generated.into_content();
        assert_eq!(content.subject.chars().count(), 80);
        assert!(content.subject.ends_with('…'));
        assert_eq!(content.greeting, "Hi Ann");
    }

    #[tokio::test]
    async fn missing_field_falls_back_to_template() {
        let client = ScriptedClient::replying(vec![Ok(r#"{"subject":"Hi"}"#.into())]);
        let generated = generate_welcome_email_content(&client, &ctx()).await;
        assert!(generated.is_fallback());
        let content = generated.content();
        assert!(content.greeting.contains("Ann"));
        assert!(content.dna_insight.contains("Achiever"));
        assert!(content.dna_insight.contains("Learner"));
    }

    #[tokio::test]
    async fn unconfigured_client_is_never_called() {
        let client = ScriptedClient::unconfigured();
        let generated = generate_welcome_email_content(&client, &ctx()).await;
        assert!(generated.is_fallback());
        assert_eq!(client.request_count(), 0);
    }
}
