//! Shared API types, validation, crypto, and SQL builders for Strengths Manager.
//!
//! This crate is the **single source of truth** for all API request/response types.
//! TypeScript types for the dashboard are generated via `ts-rs`.
//!
//! To regenerate TypeScript types:
//!   cargo test -p strengths-api --features ts -- export_typescript --nocapture

use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
pub mod crypto;
#[cfg(feature = "backend")]
pub mod db;
pub mod rotation;
#[cfg(feature = "backend")]
pub mod service;
pub mod strengths;

pub use strengths::StrengthDomain;

// ─── Shared Enums ────────────────────────────────────────────────────────────

/// Account role stored in `users.role`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which profile set the coach focuses on in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum ChatMode {
    #[default]
    MyStrengths,
    TeamStrengths,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MyStrengths => "my_strengths",
            Self::TeamStrengths => "team_strengths",
        }
    }

    /// Accepts both `my_strengths` and the dashboard's `my-strengths` spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().replace('-', "_").as_str() {
            "my_strengths" => Some(Self::MyStrengths),
            "team_strengths" => Some(Self::TeamStrengths),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// Mail category a subscription, log row or unsubscribe token refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum EmailType {
    Welcome,
    WeeklyCoaching,
}

impl EmailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::WeeklyCoaching => "weekly_coaching",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "welcome" => Some(Self::Welcome),
            "weekly_coaching" => Some(Self::WeeklyCoaching),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery outcome recorded in `email_logs.status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum EmailStatus {
    Sent,
    Failed,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Email + password registration.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthRegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Email + password login.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned on successful login / register / refresh.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user_id: String,
    pub first_name: String,
}

/// Refresh an expired access token.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout (invalidate refresh token).
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Generic success response for operations that don't return data.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct OkResponse {
    pub ok: bool,
}

/// Returned by `GET /api/auth/me` and `PATCH /api/user/strengths`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub top_strengths: Vec<String>,
    pub created_at: String,
}

// ─── Team Members ────────────────────────────────────────────────────────────

/// A person on the manager's team and their top five strengths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub strengths: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /api/team-members` and `PUT /api/team-members/:id`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TeamMemberRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub strengths: Vec<String>,
}

/// Returned by `GET /api/team-members`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ListTeamMembersResponse {
    pub team_members: Vec<TeamMember>,
}

// ─── User ────────────────────────────────────────────────────────────────────

/// Body of `PATCH /api/user/strengths`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpdateStrengthsRequest {
    #[serde(default)]
    pub strengths: Vec<String>,
}

/// Returned by `GET /api/user/email-preferences`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EmailPreferencesResponse {
    pub weekly_coaching: bool,
    pub weekly_email_count: u32,
    pub last_sent_at: Option<String>,
}

/// Body of `PATCH /api/user/email-preferences`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpdateEmailPreferencesRequest {
    pub weekly_coaching: bool,
}

// ─── AI helpers ──────────────────────────────────────────────────────────────

/// Body of `POST /api/generate-title`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateTitleRequest {
    #[serde(default)]
    pub message: String,
}

/// Returned by `POST /api/generate-title`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct GenerateTitleResponse {
    pub title: String,
}

/// Body of `POST /api/followup-questions` — the exchange to follow up on.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct FollowupQuestionsRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Body of `POST /api/starter-questions`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct StarterQuestionsRequest {
    #[serde(default)]
    pub mode: Option<String>,
}

/// Returned by the follow-up and starter question endpoints.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
}

// ─── Chat ────────────────────────────────────────────────────────────────────

/// Body of `POST /api/chat`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// A stored chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

/// Returned by `POST /api/chat` — the assistant's reply.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ChatResponse {
    pub conversation_id: String,
    pub title: String,
    pub message: ChatMessage,
}

/// Conversation row without messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub mode: ChatMode,
    pub created_at: String,
    pub updated_at: String,
}

/// Returned by `GET /api/conversations`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ListConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

/// Returned by `GET /api/conversations/:id`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ConversationDetail {
    pub conversation: ConversationSummary,
    pub messages: Vec<ChatMessage>,
}

// ─── Admin ───────────────────────────────────────────────────────────────────

/// Row of `GET /api/admin/users`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AdminUserSummary {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub top_strengths: Vec<String>,
    pub team_member_count: i64,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// Returned by `GET /api/admin/users`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AdminUsersResponse {
    pub users: Vec<AdminUserSummary>,
}

/// Body of `PATCH /api/admin/users/:id`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UpdateUserRoleRequest {
    #[serde(default)]
    pub role: String,
}

/// Query parameters of the admin statistics endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub days: Option<u32>,
}

impl StatsQuery {
    /// Lookback window in days: default 30, clamped to 1..=365.
    pub fn window_days(&self) -> u32 {
        self.days.unwrap_or(30).clamp(1, 365)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct RequestTypeUsage {
    pub request_type: String,
    pub requests: i64,
    pub total_tokens: i64,
    pub estimated_cost: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DailyAiUsage {
    pub date: String,
    pub requests: i64,
    pub total_tokens: i64,
    pub estimated_cost: f64,
}

/// Returned by `GET /api/admin/ai-stats`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AiStatsResponse {
    pub days: u32,
    pub total_requests: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_tokens: i64,
    pub total_cost: f64,
    pub by_request_type: Vec<RequestTypeUsage>,
    pub daily: Vec<DailyAiUsage>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct SubscriptionCount {
    pub email_type: String,
    pub active: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DailyEmailCount {
    pub date: String,
    pub sent: i64,
    pub failed: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EmailFailure {
    pub email: String,
    pub email_type: String,
    pub error_message: Option<String>,
    pub sent_at: String,
}

/// Returned by `GET /api/admin/email-stats`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EmailStatsResponse {
    pub days: u32,
    pub total_sent: i64,
    pub total_failed: i64,
    pub subscriptions: Vec<SubscriptionCount>,
    pub daily: Vec<DailyEmailCount>,
    pub recent_failures: Vec<EmailFailure>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct StrengthCount {
    pub strength: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DomainCount {
    pub domain: StrengthDomain,
    pub count: i64,
}

/// Returned by `GET /api/admin/team-stats`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TeamStatsResponse {
    pub total_users: i64,
    pub users_with_strengths: i64,
    pub total_team_members: i64,
    pub average_team_size: f64,
    pub top_strengths: Vec<StrengthCount>,
    pub domain_distribution: Vec<DomainCount>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EventTypeCount {
    pub event_type: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DailyActiveUsers {
    pub date: String,
    pub users: i64,
}

/// Returned by `GET /api/admin/usage-stats`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct UsageStatsResponse {
    pub days: u32,
    pub events_by_type: Vec<EventTypeCount>,
    pub daily_active_users: Vec<DailyActiveUsers>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct DatabaseHealth {
    pub ok: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ServiceHealth {
    pub llm_configured: bool,
    pub email_configured: bool,
    pub scheduler_enabled: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TableCounts {
    pub users: i64,
    pub team_members: i64,
    pub active_subscriptions: i64,
}

/// Returned by `GET /api/admin/health`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct AdminHealthResponse {
    pub status: String,
    pub database: DatabaseHealth,
    pub services: ServiceHealth,
    pub counts: TableCounts,
    pub timestamp: String,
}

// ─── Weekly emails ───────────────────────────────────────────────────────────

/// Outcome of one pass of the weekly coaching email job.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct WeeklyRunSummary {
    pub processed: u32,
    pub sent: u32,
    pub failed: u32,
    pub skipped_cap: u32,
    pub skipped_today: u32,
    pub skipped_no_strengths: u32,
}

// ─── Health ──────────────────────────────────────────────────────────────────

/// Returned by `GET /api/health` — server liveness check.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ─── Service Error ───────────────────────────────────────────────────────────

/// Framework-agnostic service error.
///
/// Each variant maps to an HTTP status code; the server converts this into
/// its `{"error": "..."}` response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ServiceError {
    /// HTTP status code as a `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Internal(m) => m,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

/// JSON error shape `{ "error": "..." }` returned by all error responses.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ApiError {
    pub error: String,
}

impl From<&ServiceError> for ApiError {
    fn from(e: &ServiceError) -> Self {
        Self {
            error: e.message().to_string(),
        }
    }
}

// ─── TypeScript generation ───────────────────────────────────────────────────

#[cfg(all(test, feature = "ts"))]
mod ts_export {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use ts_rs::TS;

    /// Run with: cargo test -p strengths-api --features ts -- export_typescript --nocapture
    #[test]
    fn export_typescript() {
        let out_dir =
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../web/src/api-types.generated.ts");

        let cfg = ts_rs::Config::new().with_large_int("number");
        let mut parts: Vec<String> = Vec::new();
        parts.push("// AUTO-GENERATED by strengths-api — DO NOT EDIT".to_string());
        parts.push(
            "// Regenerate with: cargo test -p strengths-api --features ts -- export_typescript"
                .to_string(),
        );
        parts.push(String::new());

        // Structs: `type X = {...}` → `export interface X {...}`
        // Enums/unions: `type X = "a" | "b"` → `export type X = "a" | "b"`
        macro_rules! collect_ts {
            ($($t:ty),+ $(,)?) => {
                $(
                    let decl = <$t>::decl(&cfg);
                    let decl = if decl.contains(" = {") {
                        decl
                            .replacen("type ", "export interface ", 1)
                            .replace(" = {", " {")
                            .trim_end_matches(';')
                            .to_string()
                    } else {
                        decl
                            .replacen("type ", "export type ", 1)
                            .trim_end_matches(';')
                            .to_string()
                    };
                    parts.push(decl);
                    parts.push(String::new());
                )+
            };
        }

        collect_ts!(
            // Shared enums
            UserRole,
            ChatMode,
            ChatRole,
            EmailType,
            EmailStatus,
            StrengthDomain,
            // Auth
            AuthRegisterRequest,
            LoginRequest,
            AuthTokenResponse,
            RefreshRequest,
            LogoutRequest,
            OkResponse,
            UserProfile,
            // Team members
            TeamMember,
            TeamMemberRequest,
            ListTeamMembersResponse,
            // User
            UpdateStrengthsRequest,
            EmailPreferencesResponse,
            UpdateEmailPreferencesRequest,
            // AI helpers
            GenerateTitleRequest,
            GenerateTitleResponse,
            FollowupQuestionsRequest,
            StarterQuestionsRequest,
            QuestionsResponse,
            // Chat
            ChatRequest,
            ChatMessage,
            ChatResponse,
            ConversationSummary,
            ListConversationsResponse,
            ConversationDetail,
            // Admin
            AdminUserSummary,
            AdminUsersResponse,
            UpdateUserRoleRequest,
            RequestTypeUsage,
            DailyAiUsage,
            AiStatsResponse,
            SubscriptionCount,
            DailyEmailCount,
            EmailFailure,
            EmailStatsResponse,
            StrengthCount,
            DomainCount,
            TeamStatsResponse,
            EventTypeCount,
            DailyActiveUsers,
            UsageStatsResponse,
            DatabaseHealth,
            ServiceHealth,
            TableCounts,
            AdminHealthResponse,
            WeeklyRunSummary,
            // Health
            HealthResponse,
            ApiError,
        );

        let content = parts.join("\n");

        if let Some(parent) = out_dir.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let mut file = std::fs::File::create(&out_dir)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", out_dir.display(), e));
        file.write_all(content.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to write {}: {}", out_dir.display(), e));

        println!("Generated TypeScript types at: {}", out_dir.display());
    }
}
