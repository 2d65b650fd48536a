//! Small chat helpers: conversation titles, follow-up and starter questions.

use strengths_api::ChatMode;

use crate::client::{CompletionClient, CompletionRequest};
use crate::coach::describe_strengths;
use crate::content::{self, Generated};
use crate::error::LlmError;

pub const MAX_TITLE_LEN: usize = 60;
const FALLBACK_TITLE_LEN: usize = 50;
const FOLLOWUP_COUNT: usize = 3;
const MAX_QUESTION_LEN: usize = 150;
const STARTER_COUNT: usize = 4;

// ─── Titles ──────────────────────────────────────────────────────────────────

/// A short conversation title for the first message of a chat.
pub async fn generate_title(client: &dyn CompletionClient, message: &str) -> Generated<String> {
    let request = CompletionRequest::single(
        "You name chat conversations. Reply with a title of at most 6 words and \
         nothing else: no quotes, no trailing punctuation.",
        format!("Conversation opener:\n{message}"),
        30,
    );
    content::generate(client, "title", request, parse_title, || fallback_title(message)).await
}

fn parse_title(raw: &str) -> Result<String, LlmError> {
    let title = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '#')
        .trim();
    if title.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content::truncate_chars(title, MAX_TITLE_LEN))
}

fn fallback_title(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return "New conversation".to_string();
    }
    content::truncate_chars(trimmed, FALLBACK_TITLE_LEN)
}

// ─── Follow-up questions ─────────────────────────────────────────────────────

const FALLBACK_FOLLOWUPS: [&str; FOLLOWUP_COUNT] = [
    "How can I apply this with my team this week?",
    "What blind spots should I watch out for?",
    "Can you give me a concrete example?",
];

/// Three questions the user might ask next, given the last exchange.
pub async fn generate_followup_questions(
    client: &dyn CompletionClient,
    question: &str,
    answer: &str,
) -> Generated<Vec<String>> {
    let request = CompletionRequest::single(
        "You suggest follow-up questions a manager might ask their CliftonStrengths \
         coach. Respond with a JSON array of strings and nothing else.",
        format!(
            "The manager asked:\n{question}\n\nThe coach answered:\n{answer}\n\n\
             Suggest exactly {FOLLOWUP_COUNT} short follow-up questions (each under \
             {MAX_QUESTION_LEN} characters), written from the manager's point of view."
        ),
        300,
    );
    content::generate(
        client,
        "follow-up questions",
        request,
        |raw| content::string_list(&content::extract_json(raw)?, FOLLOWUP_COUNT, MAX_QUESTION_LEN),
        || FALLBACK_FOLLOWUPS.iter().map(|q| q.to_string()).collect(),
    )
    .await
}

// ─── Starter questions ───────────────────────────────────────────────────────

const MY_STARTERS: [&str; STARTER_COUNT] = [
    "How can I use my top strength more effectively as a manager?",
    "What are the blind spots of my strengths combination?",
    "How do my strengths shape the way I make decisions?",
    "Which of my strengths should I lean on during a stressful week?",
];

const TEAM_STARTERS: [&str; STARTER_COUNT] = [
    "How can I delegate work based on my team's strengths?",
    "Where might my team's strengths cause friction?",
    "Which strengths are missing from my team?",
    "How should I run meetings to suit my team's strengths?",
];

/// Four conversation starters for an empty chat in `mode`.
pub async fn generate_starter_questions(
    client: &dyn CompletionClient,
    mode: ChatMode,
    strengths: &[String],
    member_names: &[String],
) -> Generated<Vec<String>> {
    let focus = match mode {
        ChatMode::MyStrengths => "the manager's own strengths and leadership".to_string(),
        ChatMode::TeamStrengths if member_names.is_empty() => {
            "building and leading a team".to_string()
        }
        ChatMode::TeamStrengths => format!("their team: {}", member_names.join(", ")),
    };
    let request = CompletionRequest::single(
        "You suggest conversation starters for a CliftonStrengths coaching chat. \
         Respond with a JSON array of strings and nothing else.",
        format!(
            "The manager's top strengths: {}.\nSuggest exactly {STARTER_COUNT} questions \
             (each under {MAX_QUESTION_LEN} characters) they could ask about {focus}.",
            describe_strengths(strengths)
        ),
        300,
    );
    let fallback = match mode {
        ChatMode::MyStrengths => MY_STARTERS,
        ChatMode::TeamStrengths => TEAM_STARTERS,
    };
    content::generate(
        client,
        "starter questions",
        request,
        |raw| content::string_list(&content::extract_json(raw)?, STARTER_COUNT, MAX_QUESTION_LEN),
        || fallback.iter().map(|q| q.to_string()).collect(),
    )
    .await
}
