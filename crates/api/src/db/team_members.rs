//! Team member query builders. Every statement is scoped to the owning user.

use sea_query::{Asterisk, Expr, Func, Order, Query, SqliteQueryBuilder};

use super::tables::TeamMembers;
use super::Built;

const MEMBER_COLUMNS: [TeamMembers; 5] = [
    TeamMembers::Id,
    TeamMembers::Name,
    TeamMembers::TopStrengths,
    TeamMembers::CreatedAt,
    TeamMembers::UpdatedAt,
];

/// The user's members, oldest first (id, name, top_strengths, created_at, updated_at).
pub fn list_by_user(user_id: &str) -> Built {
    Query::select()
        .columns(MEMBER_COLUMNS)
        .from(TeamMembers::Table)
        .and_where(Expr::col(TeamMembers::UserId).eq(user_id))
        .order_by(TeamMembers::CreatedAt, Order::Asc)
        .order_by_expr(Expr::cust("rowid"), Order::Asc)
        .build(SqliteQueryBuilder)
}

/// A single member owned by `user_id`.
pub fn get(id: &str, user_id: &str) -> Built {
    Query::select()
        .columns(MEMBER_COLUMNS)
        .from(TeamMembers::Table)
        .and_where(Expr::col(TeamMembers::Id).eq(id))
        .and_where(Expr::col(TeamMembers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn insert(id: &str, user_id: &str, name: &str, strengths_json: &str) -> Built {
    Query::insert()
        .into_table(TeamMembers::Table)
        .columns([
            TeamMembers::Id,
            TeamMembers::UserId,
            TeamMembers::Name,
            TeamMembers::TopStrengths,
        ])
        .values_panic([
            id.into(),
            user_id.into(),
            name.into(),
            strengths_json.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Replace name and strengths. Affects 0 rows when the member is not the user's.
pub fn update(id: &str, user_id: &str, name: &str, strengths_json: &str) -> Built {
    Query::update()
        .table(TeamMembers::Table)
        .value(TeamMembers::Name, name)
        .value(TeamMembers::TopStrengths, strengths_json)
        .value(TeamMembers::UpdatedAt, Expr::cust("datetime('now')"))
        .and_where(Expr::col(TeamMembers::Id).eq(id))
        .and_where(Expr::col(TeamMembers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

pub fn delete(id: &str, user_id: &str) -> Built {
    Query::delete()
        .from_table(TeamMembers::Table)
        .and_where(Expr::col(TeamMembers::Id).eq(id))
        .and_where(Expr::col(TeamMembers::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Total number of team members across all users.
pub fn count() -> Built {
    Query::select()
        .expr(Func::count(Expr::col(Asterisk)))
        .from(TeamMembers::Table)
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_scoped_to_owner() {
        for (sql, values) in [
            update("m1", "u1", "Dana", "[]"),
            delete("m1", "u1"),
            get("m1", "u1"),
        ] {
            assert!(sql.contains("\"user_id\" = ?"), "{sql}");
            assert!(values.0.len() >= 2);
        }
    }

    #[test]
    fn list_is_ordered_by_creation() {
        let (sql, _) = list_by_user("u1");
        assert!(sql.contains("ORDER BY \"created_at\" ASC"));
    }
}
