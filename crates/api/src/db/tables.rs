//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    PasswordSalt,
    FirstName,
    LastName,
    Role,
    TopStrengths,
    CreatedAt,
    UpdatedAt,
    LastLoginAt,
}

#[derive(Iden)]
pub enum RefreshTokens {
    Table,
    Id,
    UserId,
    TokenHash,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum TeamMembers {
    Table,
    Id,
    UserId,
    Name,
    TopStrengths,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum ChatConversations {
    Table,
    Id,
    UserId,
    Title,
    Mode,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum ChatMessages {
    Table,
    Id,
    ConversationId,
    Role,
    Content,
    CreatedAt,
}

#[derive(Iden)]
pub enum EmailSubscriptions {
    Table,
    Id,
    UserId,
    EmailType,
    IsActive,
    WeeklyEmailCount,
    LastSentAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub enum EmailLogs {
    Table,
    Id,
    UserId,
    EmailType,
    Subject,
    WeekNumber,
    ProviderId,
    Status,
    ErrorMessage,
    SentAt,
}

#[derive(Iden)]
pub enum UnsubscribeTokens {
    Table,
    Id,
    UserId,
    Token,
    EmailType,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum AiUsageLogs {
    Table,
    Id,
    UserId,
    RequestType,
    Model,
    InputTokens,
    OutputTokens,
    TotalTokens,
    EstimatedCost,
    CreatedAt,
}

#[derive(Iden)]
pub enum AnalyticsEvents {
    Table,
    Id,
    UserId,
    EventType,
    Metadata,
    CreatedAt,
}

#[derive(Iden)]
pub enum JobRuns {
    Table,
    Name,
    LastRunAt,
}
