use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use strengths_api::{
    db, service, ListTeamMembersResponse, OkResponse, TeamMember, TeamMemberRequest,
};

use super::auth::AuthUser;
use crate::analytics::{self, Event};
use crate::error::ApiErr;
use crate::storage::{member_from_row, sq_execute, sq_query_map, sq_query_row, Db};

const NOT_FOUND: &str = "team member not found";

/// Validated `(name, strengths_json)` for a create or update.
fn validate(req: &TeamMemberRequest) -> Result<(String, String), ApiErr> {
    let name = service::validate_member_name(&req.name)?;
    let strengths = service::validate_strengths(&req.strengths)?;
    Ok((name, service::encode_strengths(&strengths)))
}

/// GET /api/team-members — the caller's team, oldest first.
pub async fn list(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<ListTeamMembersResponse>, ApiErr> {
    let conn = db.conn();
    let team_members = sq_query_map(
        &conn,
        db::team_members::list_by_user(&user.user_id),
        member_from_row,
    )
    .map_err(ApiErr::from_db("list team members"))?;
    Ok(Json(ListTeamMembersResponse { team_members }))
}

/// POST /api/team-members — add a person and their top five.
pub async fn create(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<TeamMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>), ApiErr> {
    let (name, strengths_json) = validate(&req)?;
    let id = Uuid::new_v4().to_string();

    let member = {
        let conn = db.conn();
        sq_execute(
            &conn,
            db::team_members::insert(&id, &user.user_id, &name, &strengths_json),
        )
        .map_err(ApiErr::from_db("insert team member"))?;
        sq_query_row(
            &conn,
            db::team_members::get(&id, &user.user_id),
            member_from_row,
        )
        .map_err(ApiErr::from_db("load team member"))?
    };

    analytics::track_event(
        &db,
        Some(&user.user_id),
        Event::TeamMemberCreated,
        Some(serde_json::json!({ "team_member_id": id })),
    );
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/team-members/:id — replace name and strengths.
pub async fn update(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<TeamMemberRequest>,
) -> Result<Json<TeamMember>, ApiErr> {
    let (name, strengths_json) = validate(&req)?;

    let conn = db.conn();
    let updated = sq_execute(
        &conn,
        db::team_members::update(&id, &user.user_id, &name, &strengths_json),
    )
    .map_err(ApiErr::from_db("update team member"))?;
    if updated == 0 {
        return Err(ApiErr::not_found(NOT_FOUND));
    }

    sq_query_row(
        &conn,
        db::team_members::get(&id, &user.user_id),
        member_from_row,
    )
    .optional()
    .map_err(ApiErr::from_db("load team member"))?
    .map(Json)
    .ok_or_else(|| ApiErr::not_found(NOT_FOUND))
}

/// DELETE /api/team-members/:id
pub async fn delete(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let deleted = {
        let conn = db.conn();
        sq_execute(&conn, db::team_members::delete(&id, &user.user_id))
            .map_err(ApiErr::from_db("delete team member"))?
    };
    if deleted == 0 {
        return Err(ApiErr::not_found(NOT_FOUND));
    }

    analytics::track_event(
        &db,
        Some(&user.user_id),
        Event::TeamMemberDeleted,
        Some(serde_json::json!({ "team_member_id": id })),
    );
    Ok(Json(OkResponse { ok: true }))
}
