//! User / auth query builders.

use sea_query::{Asterisk, Expr, Func, Query, SqliteQueryBuilder};

use super::tables::{RefreshTokens, Users};
use super::Built;

// ── User lookups ───────────────────────────────────────────────────────────

/// Profile columns in the order expected by the server's `profile_from_row`:
/// id, email, first_name, last_name, role, top_strengths, created_at.
pub fn profile_by_id(user_id: &str) -> Built {
    Query::select()
        .columns([
            Users::Id,
            Users::Email,
            Users::FirstName,
            Users::LastName,
            Users::Role,
            Users::TopStrengths,
            Users::CreatedAt,
        ])
        .from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Find user by email for login (returns id, first_name, password_hash, password_salt).
pub fn get_by_email_for_login(email: &str) -> Built {
    Query::select()
        .columns([
            Users::Id,
            Users::FirstName,
            Users::PasswordHash,
            Users::PasswordSalt,
        ])
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

/// Check email existence.
pub fn email_exists(email: &str) -> Built {
    Query::select()
        .expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

/// Role of a user (returns role).
pub fn role_by_id(user_id: &str) -> Built {
    Query::select()
        .column(Users::Role)
        .from(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Total number of accounts.
pub fn count() -> Built {
    Query::select()
        .expr(Func::count(Expr::col(Asterisk)))
        .from(Users::Table)
        .build(SqliteQueryBuilder)
}

/// All users with their team size, newest first. Column order matches the
/// server's `admin_user_from_row`.
pub fn list_for_admin() -> Built {
    // Correlated subquery — keep as raw SQL with sea-query values
    let sql = concat!(
        "SELECT u.\"id\", u.\"email\", u.\"first_name\", u.\"last_name\", u.\"role\", ",
        "u.\"top_strengths\", ",
        "(SELECT COUNT(*) FROM \"team_members\" tm WHERE tm.\"user_id\" = u.\"id\"), ",
        "u.\"created_at\", u.\"last_login_at\" ",
        "FROM \"users\" u ORDER BY u.\"created_at\" DESC, u.\"email\" ASC"
    )
    .to_string();
    (sql, sea_query::Values(Vec::new()))
}

// ── User writes ────────────────────────────────────────────────────────────

/// Insert a user with email/password.
pub fn insert(
    id: &str,
    email: &str,
    password_hash: &str,
    password_salt: &str,
    first_name: &str,
    last_name: Option<&str>,
) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Email,
            Users::PasswordHash,
            Users::PasswordSalt,
            Users::FirstName,
            Users::LastName,
        ])
        .values_panic([
            id.into(),
            email.into(),
            password_hash.into(),
            password_salt.into(),
            first_name.into(),
            last_name.map(|s| s.to_string()).into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Replace the user's top-five strengths (JSON array text).
pub fn update_strengths(user_id: &str, strengths_json: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::TopStrengths, strengths_json)
        .value(Users::UpdatedAt, Expr::cust("datetime('now')"))
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Record a successful login.
pub fn touch_last_login(user_id: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::LastLoginAt, Expr::cust("datetime('now')"))
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Change a user's role.
pub fn update_role(user_id: &str, role: &str) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::Role, role)
        .value(Users::UpdatedAt, Expr::cust("datetime('now')"))
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Delete a user; owned rows cascade.
pub fn delete(user_id: &str) -> Built {
    Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

// ── Refresh tokens ─────────────────────────────────────────────────────────

/// Insert refresh token.
pub fn insert_refresh_token(id: &str, user_id: &str, token_hash: &str, expires_at: &str) -> Built {
    Query::insert()
        .into_table(RefreshTokens::Table)
        .columns([
            RefreshTokens::Id,
            RefreshTokens::UserId,
            RefreshTokens::TokenHash,
            RefreshTokens::ExpiresAt,
        ])
        .values_panic([
            id.into(),
            user_id.into(),
            token_hash.into(),
            expires_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Lookup refresh token with user join (returns id, user_id, expires_at, first_name).
pub fn lookup_refresh_token(token_hash: &str) -> Built {
    Query::select()
        .column((RefreshTokens::Table, RefreshTokens::Id))
        .column((RefreshTokens::Table, RefreshTokens::UserId))
        .column((RefreshTokens::Table, RefreshTokens::ExpiresAt))
        .column((Users::Table, Users::FirstName))
        .from(RefreshTokens::Table)
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id))
                .equals((RefreshTokens::Table, RefreshTokens::UserId)),
        )
        .and_where(Expr::col((RefreshTokens::Table, RefreshTokens::TokenHash)).eq(token_hash))
        .build(SqliteQueryBuilder)
}

/// Delete refresh token by hash.
pub fn delete_refresh_token(token_hash: &str) -> Built {
    Query::delete()
        .from_table(RefreshTokens::Table)
        .and_where(Expr::col(RefreshTokens::TokenHash).eq(token_hash))
        .build(SqliteQueryBuilder)
}

/// Delete refresh token by id.
pub fn delete_refresh_token_by_id(id: &str) -> Built {
    Query::delete()
        .from_table(RefreshTokens::Table)
        .and_where(Expr::col(RefreshTokens::Id).eq(id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_query_binds_user_id() {
        let (sql, values) = profile_by_id("u1");
        assert!(sql.starts_with("SELECT \"id\", \"email\", \"first_name\""));
        assert!(sql.contains("WHERE \"id\" = ?"));
        assert_eq!(values.0.len(), 1);
    }

    #[test]
    fn strengths_update_stamps_updated_at() {
        let (sql, values) = update_strengths("u1", "[]");
        assert!(sql.contains("\"updated_at\" = datetime('now')"));
        assert_eq!(values.0.len(), 2);
    }
}
