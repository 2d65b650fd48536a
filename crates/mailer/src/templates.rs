//! HTML rendering for outgoing emails and the unsubscribe result page.
//!
//! All dynamic text goes through [`escape_html`].

use std::fmt::Write;

const BRAND: &str = "Strengths Manager";
const ACCENT: &str = "#4f46e5";

/// Escape text for inclusion in HTML bodies and attribute values.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped paragraph; blank lines split paragraphs, single newlines become `<br>`.
fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            format!(
                "<p style=\"margin:0 0 16px;line-height:1.6;\">{}</p>",
                escape_html(p).replace('\n', "<br>")
            )
        })
        .collect()
}

fn section(heading: &str, body: &str) -> String {
    format!(
        "<h2 style=\"margin:24px 0 8px;font-size:18px;color:{ACCENT};\">{}</h2>{}",
        escape_html(heading),
        paragraphs(body)
    )
}

fn layout(preheader: &str, body: &str, footer: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{BRAND}</title></head>\
         <body style=\"margin:0;padding:0;background:#f4f4f7;\
         font-family:-apple-system,Segoe UI,Helvetica,Arial,sans-serif;color:#1f2937;\">\
         <span style=\"display:none;max-height:0;overflow:hidden;\">{preheader}</span>\
         <table role=\"presentation\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\">\
         <tr><td align=\"center\" style=\"padding:32px 16px;\">\
         <table role=\"presentation\" width=\"600\" cellpadding=\"0\" cellspacing=\"0\" \
         style=\"max-width:600px;background:#ffffff;border-radius:12px;\">\
         <tr><td style=\"padding:24px 32px;background:{ACCENT};border-radius:12px 12px 0 0;\
         color:#ffffff;font-size:20px;font-weight:600;\">{BRAND}</td></tr>\
         <tr><td style=\"padding:32px;\">{body}</td></tr>\
         <tr><td style=\"padding:16px 32px 32px;font-size:12px;color:#6b7280;\">{footer}</td></tr>\
         </table></td></tr></table></body></html>\n",
        preheader = escape_html(preheader),
    )
}

fn button(label: &str, url: &str) -> String {
    format!(
        "<p style=\"margin:24px 0;\"><a href=\"{}\" style=\"display:inline-block;padding:12px 20px;\
         background:{ACCENT};color:#ffffff;border-radius:8px;text-decoration:none;\
         font-weight:600;\">{}</a></p>",
        escape_html(url),
        escape_html(label)
    )
}

fn unsubscribe_footer(unsubscribe_url: &str, reason: &str) -> String {
    format!(
        "{} <a href=\"{}\" style=\"color:#6b7280;\">Unsubscribe</a>",
        escape_html(reason),
        escape_html(unsubscribe_url)
    )
}

// ─── Welcome ─────────────────────────────────────────────────────────────────

pub struct WelcomeView<'a> {
    pub first_name: &'a str,
    pub strengths: &'a [String],
    pub greeting: &'a str,
    pub dna_insight: &'a str,
    pub challenge: &'a str,
    pub what_to_expect: &'a str,
    pub dashboard_url: &'a str,
    pub unsubscribe_url: &'a str,
}

pub fn render_welcome_email(view: &WelcomeView<'_>) -> String {
    let mut body = String::new();
    body.push_str(&paragraphs(view.greeting));

    if !view.strengths.is_empty() {
        body.push_str("<ol style=\"margin:0 0 16px;padding-left:20px;line-height:1.8;\">");
        for strength in view.strengths {
            let _ = write!(body, "<li><strong>{}</strong></li>", escape_html(strength));
        }
        body.push_str("</ol>");
    }

    body.push_str(&section("Your Strengths DNA", view.dna_insight));
    body.push_str(&section("Your First Challenge", view.challenge));
    body.push_str(&section("What to Expect", view.what_to_expect));
    body.push_str(&button("Open your dashboard", view.dashboard_url));

    let footer = unsubscribe_footer(
        view.unsubscribe_url,
        &format!("You're receiving this because {} signed up for {BRAND}.", view.first_name),
    );
    layout(view.greeting, &body, &footer)
}

// ─── Weekly ──────────────────────────────────────────────────────────────────

pub struct WeeklyView<'a> {
    pub first_name: &'a str,
    pub week_number: u32,
    pub total_weeks: u32,
    pub featured_strength: &'a str,
    pub preheader: &'a str,
    pub strength_insight: &'a str,
    pub action_item: &'a str,
    pub team_member_name: Option<&'a str>,
    pub team_tip: Option<&'a str>,
    pub quote: Option<&'a str>,
    pub dashboard_url: &'a str,
    pub unsubscribe_url: &'a str,
}

pub fn render_weekly_email(view: &WeeklyView<'_>) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<p style=\"margin:0 0 8px;font-size:12px;letter-spacing:0.08em;\
         text-transform:uppercase;color:#6b7280;\">Week {} of {}</p>\
         <h1 style=\"margin:0 0 16px;font-size:24px;\">Hi {}, this week is about {}</h1>",
        view.week_number,
        view.total_weeks,
        escape_html(view.first_name),
        escape_html(view.featured_strength)
    );

    let insight_title = format!("{} in Action", view.featured_strength);
    body.push_str(&section(&insight_title, view.strength_insight));
    body.push_str(&section("This Week's Action", view.action_item));

    if let Some(tip) = view.team_tip {
        let heading = match view.team_member_name {
            Some(name) => format!("Working with {name}"),
            None => "Team Tip".to_string(),
        };
        body.push_str(&section(&heading, tip));
    }

    if let Some(quote) = view.quote {
        let _ = write!(
            body,
            "<blockquote style=\"margin:24px 0;padding:12px 16px;\
             border-left:4px solid {ACCENT};color:#4b5563;font-style:italic;\">{}</blockquote>",
            escape_html(quote)
        );
    }

    body.push_str(&button("Chat with your coach", view.dashboard_url));

    let footer = unsubscribe_footer(
        view.unsubscribe_url,
        "You're receiving weekly coaching emails from Strengths Manager.",
    );
    layout(view.preheader, &body, &footer)
}

// ─── Unsubscribe page ────────────────────────────────────────────────────────

/// Result of following an unsubscribe link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Unsubscribed,
    LinkExpired,
    Error,
}

impl UnsubscribeOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unsubscribed => 200,
            Self::LinkExpired => 400,
            Self::Error => 500,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Unsubscribed => "Unsubscribed Successfully",
            Self::LinkExpired => "Link Expired",
            Self::Error => "Something Went Wrong",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Unsubscribed => {
                "You will no longer receive these emails. \
                 You can turn them back on at any time from your account settings."
            }
            Self::LinkExpired => {
                "This unsubscribe link is invalid, has expired, or has already been used. \
                 You can manage email preferences from your account settings."
            }
            Self::Error => "We couldn't process your request. Please try again later.",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Self::Unsubscribed => "#16a34a",
            Self::LinkExpired => "#d97706",
            Self::Error => "#dc2626",
        }
    }
}

/// Standalone page shown after following an unsubscribe link.
pub fn render_unsubscribe_page(outcome: UnsubscribeOutcome, home_url: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} | {BRAND}</title>\
         <style>body{{margin:0;min-height:100vh;display:flex;align-items:center;\
         justify-content:center;background:#f4f4f7;\
         font-family:-apple-system,Segoe UI,Helvetica,Arial,sans-serif;color:#1f2937;}}\
         .card{{max-width:480px;margin:16px;padding:40px 32px;background:#fff;\
         border-radius:12px;\
         box-shadow:0 4px 24px rgba(0,0,0,0.08);text-align:center;}}\
         h1{{margin:0 0 12px;font-size:24px;color:{color};}}p{{line-height:1.6;color:#4b5563;}}\
         a{{color:{ACCENT};font-weight:600;text-decoration:none;}}</style></head>\
         <body><div class=\"card\"><h1>{title}</h1><p>{message}</p>\
         <p><a href=\"{home}\">Go to {BRAND}</a></p></div></body></html>\n",
        title = outcome.title(),
        color = outcome.color(),
        message = outcome.message(),
        home = escape_html(home_url),
    )
}
