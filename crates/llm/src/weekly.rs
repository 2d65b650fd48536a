//! Weekly coaching email content.

use serde_json::Value;

use crate::client::{CompletionClient, CompletionRequest};
use crate::coach::describe_strengths;
use crate::content::{self, Generated};
use crate::error::LlmError;

const SYSTEM: &str = "You are a CliftonStrengths coach writing a short weekly coaching \
email for a busy manager. Be specific and practical. Respond with a single JSON object \
and nothing else.";

/// The team member featured in this week's email.
#[derive(Debug, Clone)]
pub struct FeaturedMember {
    pub name: String,
    pub strength: String,
}

#[derive(Debug, Clone)]
pub struct WeeklyContext {
    pub first_name: String,
    pub week_number: u32,
    pub featured_strength: String,
    pub strengths: Vec<String>,
    pub team_member: Option<FeaturedMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyEmailContent {
    pub subject: String,
    pub preheader: String,
    pub strength_insight: String,
    pub action_item: String,
    pub team_tip: Option<String>,
    pub quote: Option<String>,
}

pub async fn generate_weekly_email_content(
    client: &dyn CompletionClient,
    ctx: &WeeklyContext,
) -> Generated<WeeklyEmailContent> {
    let request = CompletionRequest::single(SYSTEM, prompt(ctx), 1024);
    let has_member = ctx.team_member.is_some();
    content::generate(
        client,
        "weekly email",
        request,
        |raw| parse(raw, has_member),
        || fallback(ctx),
    )
    .await
}

fn prompt(ctx: &WeeklyContext) -> String {
    let team = match &ctx.team_member {
        Some(member) => format!(
            "This week's featured team member is {} whose highlighted strength is {}.\n\
             - \"team_tip\": one tip for working with {} through their {}, \
             at most 400 characters\n",
            member.name, member.strength, member.name, member.strength
        ),
        None => "There is no featured team member this week; omit \"team_tip\".\n".to_string(),
    };
    format!(
        "Write week {week} of 12 of a coaching email series for {name}.\n\
         Their top 5 strengths: {strengths}.\n\
         This week's featured strength: {featured}.\n\n\
         Return JSON with these string fields:\n\
         - \"subject\": at most 80 characters, mention {featured}\n\
         - \"preheader\": inbox preview text, at most 120 characters\n\
         - \"strength_insight\": a fresh insight about {featured} at work, at most 600 characters\n\
         - \"action_item\": one concrete action for this week, at most 400 characters\n\
         {team}\
         - \"quote\": optional short inspiring quote with attribution, at most 200 characters",
        week = ctx.week_number,
        name = ctx.first_name,
        strengths = describe_strengths(&ctx.strengths),
        featured = ctx.featured_strength,
    )
}

fn parse(raw: &str, has_member: bool) -> Result<WeeklyEmailContent, LlmError> {
    let v: Value = content::extract_json(raw)?;
    let team_tip = if has_member {
        Some(content::required_str(&v, "team_tip", 400)?)
    } else {
        None
    };
    Ok(WeeklyEmailContent {
        subject: content::required_str(&v, "subject", 80)?,
        preheader: content::required_str(&v, "preheader", 120)?,
        strength_insight: content::required_str(&v, "strength_insight", 600)?,
        action_item: content::required_str(&v, "action_item", 400)?,
        team_tip,
        quote: content::optional_str(&v, "quote", 200),
    })
}

fn fallback(ctx: &WeeklyContext) -> WeeklyEmailContent {
    let name = &ctx.first_name;
    let strength = &ctx.featured_strength;
    let week = ctx.week_number;
    WeeklyEmailContent {
        subject: content::truncate_chars(&format!("Week {week}: Put your {strength} to work"), 80),
        preheader: content::truncate_chars(
            &format!("{name}, here's how to lean into {strength} this week."),
            120,
        ),
        strength_insight: format!(
            "{name}, {strength} is one of the ways you naturally add value. This week, pay \
             attention to the moments when it shows up and the results it creates."
        ),
        action_item: format!(
            "Pick one task on your calendar this week and plan how {strength} can help \
             you do it better. Afterwards, note what worked."
        ),
        team_tip: ctx.team_member.as_ref().map(|member| {
            format!(
                "Ask {} how their {} shows up in their work, and look for one way to put \
                 it to use on the team this week.",
                member.name, member.strength
            )
        }),
        quote: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;

    fn ctx(member: bool) -> WeeklyContext {
        WeeklyContext {
            first_name: "Ann".into(),
            week_number: 3,
            featured_strength: "Focus".into(),
            strengths: vec!["Achiever".into(), "Learner".into(), "Focus".into()],
            team_member: member.then(|| FeaturedMember {
                name: "Dana".into(),
                strength: "Woo".into(),
            }),
        }
    }

    #[tokio::test]
    async fn team_tip_required_only_with_member() {
        let reply = r#"{"subject":"S","preheader":"P","strength_insight":"I","action_item":"A"}"#;

        let client = ScriptedClient::replying(vec![Ok(reply.into())]);
        let without = generate_weekly_email_content(&client, &ctx(false)).await;
        assert!(!without.is_fallback());
        assert_eq!(without.content().team_tip, None);
        assert_eq!(without.content().quote, None);

        let client = ScriptedClient::replying(vec![Ok(reply.into())]);
        let with = generate_weekly_email_content(&client, &ctx(true)).await;
        assert!(with.is_fallback());
    }

    #[tokio::test]
    async fn fallback_mentions_week_strength_and_member() {
        let client = ScriptedClient::replying(vec![Err(LlmError::Api {
            status: 529,
            message: "Overloaded".into(),
        })]);
        let generated = generate_weekly_email_content(&client, &ctx(true)).await;
        match &generated {
            Generated::Fallback { reason, .. } => assert!(reason.contains("Overloaded")),
            Generated::Ai { .. } => panic!("expected fallback"),
        }
        let content = generated.content();
        assert!(content.subject.contains("Week 3"));
        assert!(content.subject.contains("Focus"));
        assert!(content.preheader.contains("Ann"));
        assert!(content.team_tip.as_deref().unwrap().contains("Dana"));
    }

    #[tokio::test]
    async fn prompt_carries_rotation_context() {
        let client = ScriptedClient::replying(vec![]);
        let _ = generate_weekly_email_content(&client, &ctx(true)).await;
        let requests = client.requests.lock().unwrap();
        let prompt = &requests[0].messages[0].content;
        assert!(prompt.contains("week 3 of 12"));
        assert!(prompt.contains("Dana"));
    }
}
