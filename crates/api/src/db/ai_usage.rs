//! AI usage log query builders.

use sea_query::{Query, SqliteQueryBuilder};

use super::tables::AiUsageLogs;
use super::Built;

/// A row for `ai_usage_logs`.
pub struct NewAiUsage<'a> {
    pub id: &'a str,
    pub user_id: Option<&'a str>,
    pub request_type: &'a str,
    pub model: &'a str,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub estimated_cost: f64,
}

/// Insert one usage row; `total_tokens` is always `input + output`.
pub fn insert(row: &NewAiUsage<'_>) -> Built {
    let total = i64::from(row.input_tokens) + i64::from(row.output_tokens);
    Query::insert()
        .into_table(AiUsageLogs::Table)
        .columns([
            AiUsageLogs::Id,
            AiUsageLogs::UserId,
            AiUsageLogs::RequestType,
            AiUsageLogs::Model,
            AiUsageLogs::InputTokens,
            AiUsageLogs::OutputTokens,
            AiUsageLogs::TotalTokens,
            AiUsageLogs::EstimatedCost,
        ])
        .values_panic([
            row.id.into(),
            row.user_id.map(str::to_string).into(),
            row.request_type.into(),
            row.model.into(),
            i64::from(row.input_tokens).into(),
            i64::from(row.output_tokens).into(),
            total.into(),
            row.estimated_cost.into(),
        ])
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_tokens_is_sum() {
        let (_, values) = insert(&NewAiUsage {
            id: "a1",
            user_id: None,
            request_type: "chat",
            model: "m",
            input_tokens: 100,
            output_tokens: 25,
            estimated_cost: 0.0,
        });
        assert_eq!(values.0[6], sea_query::Value::BigInt(Some(125)));
    }
}
