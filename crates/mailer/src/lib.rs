//! Email delivery and rendering for Strengths Manager.

pub mod client;
pub mod error;
pub mod templates;

pub use client::{EmailSender, OutgoingEmail, ResendClient, SentEmail};
pub use error::MailError;
pub use templates::{
    escape_html, render_unsubscribe_page, render_weekly_email, render_welcome_email,
    UnsubscribeOutcome, WeeklyView, WelcomeView,
};
