use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use strengths_api::{
    crypto, db, service, AuthRegisterRequest, AuthTokenResponse, EmailType, LoginRequest,
    LogoutRequest, OkResponse, RefreshRequest, UserProfile, UserRole,
};

use crate::analytics::{self, Event};
use crate::config::AppConfig;
use crate::error::ApiErr;
use crate::storage::{
    is_unique_violation, profile_from_row, sq_execute, sq_query_row, sqlite_now, Db,
};

const UNAUTHORIZED: &str = "unauthorized";
const FORBIDDEN_ADMIN: &str = "forbidden: admin access required";
const INVALID_CREDENTIALS: &str = "invalid email or password";

fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Auth extractors
// ---------------------------------------------------------------------------

/// Authenticated user extracted from the `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub role: UserRole,
}

/// Resolve the bearer token in `headers` to a user. `None` for a missing,
/// malformed or expired token, or a user that no longer exists.
pub fn authenticate(db: &Db, config: &AppConfig, headers: &HeaderMap) -> Option<AuthUser> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    if config.jwt_secret.is_empty() {
        return None;
    }
    let user_id = crypto::verify_jwt(token, &config.jwt_secret, now_unix()).ok()?;

    let conn = db.conn();
    match sq_query_row(&conn, db::users::profile_by_id(&user_id), profile_from_row).optional() {
        Ok(profile) => profile.map(|p| AuthUser {
            user_id: p.id,
            email: p.email,
            first_name: p.first_name,
            role: p.role,
        }),
        Err(e) => {
            tracing::error!("auth user lookup: {e}");
            None
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Db: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let db = Db::from_ref(state);
        let config = Arc::<AppConfig>::from_ref(state);
        authenticate(&db, &config, &parts.headers).ok_or_else(|| ApiErr::unauthorized(UNAUTHORIZED))
    }
}

/// Outcome of an admin authorization check.
#[derive(Debug)]
pub enum AdminCheck {
    Authorized(AuthUser),
    Unauthenticated,
    Forbidden,
}

/// Check that the caller is signed in and has the `admin` role.
pub fn verify_admin(db: &Db, config: &AppConfig, headers: &HeaderMap) -> AdminCheck {
    match authenticate(db, config, headers) {
        None => AdminCheck::Unauthenticated,
        Some(user) if user.role == UserRole::Admin => AdminCheck::Authorized(user),
        Some(user) => {
            tracing::warn!(user_id = %user.user_id, "non-admin attempted admin access");
            AdminCheck::Forbidden
        }
    }
}

/// Extractor for admin-only endpoints.
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Db: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = ApiErr;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let db = Db::from_ref(state);
        let config = Arc::<AppConfig>::from_ref(state);
        match verify_admin(&db, &config, &parts.headers) {
            AdminCheck::Authorized(user) => Ok(AdminUser(user)),
            AdminCheck::Unauthenticated => Err(ApiErr::unauthorized(UNAUTHORIZED)),
            AdminCheck::Forbidden => Err(ApiErr::forbidden(FORBIDDEN_ADMIN)),
        }
    }
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// POST /api/auth/register — create an account and sign in.
///
/// New accounts are subscribed to the welcome and weekly coaching emails.
pub async fn register(
    State(db): State<Db>,
    State(config): State<Arc<AppConfig>>,
    Json(req): Json<AuthRegisterRequest>,
) -> Result<(StatusCode, Json<AuthTokenResponse>), ApiErr> {
    let email = service::validate_email(&req.email)?;
    service::validate_password(&req.password)?;
    let first_name = service::validate_first_name(&req.first_name)?;
    let last_name = service::validate_last_name(req.last_name.as_deref())?;

    let password = req.password;
    let (password_hash, password_salt) =
        tokio::task::spawn_blocking(move || crypto::hash_password(&password))
            .await
            .map_err(ApiErr::from_db("hash password"))??;

    let user_id = Uuid::new_v4().to_string();
    let bundle =
        service::prepare_token_bundle(&config.jwt_secret, &user_id, &first_name, now_unix())?;

    {
        let conn = db.conn();
        let exists: bool = sq_query_row(&conn, db::users::email_exists(&email), |row| row.get(0))
            .map_err(ApiErr::from_db("check email"))?;
        if exists {
            return Err(ApiErr::conflict("email already registered"));
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(ApiErr::from_db("begin register"))?;
        sq_execute(
            &tx,
            db::users::insert(
                &user_id,
                &email,
                &password_hash,
                &password_salt,
                &first_name,
                last_name.as_deref(),
            ),
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiErr::conflict("email already registered")
            } else {
                ApiErr::from_db("insert user")(e)
            }
        })?;
        for email_type in [EmailType::Welcome, EmailType::WeeklyCoaching] {
            sq_execute(
                &tx,
                db::email::insert_subscription(
                    &Uuid::new_v4().to_string(),
                    &user_id,
                    email_type.as_str(),
                ),
            )
            .map_err(ApiErr::from_db("insert subscription"))?;
        }
        sq_execute(
            &tx,
            db::users::insert_refresh_token(
                &bundle.token_id,
                &user_id,
                &bundle.token_hash,
                &bundle.expires_at,
            ),
        )
        .map_err(ApiErr::from_db("insert refresh token"))?;
        tx.commit().map_err(ApiErr::from_db("commit register"))?;
    }

    tracing::info!(user_id = %user_id, "user registered");
    analytics::track_event(&db, Some(&user_id), Event::UserRegistered, None);
    Ok((StatusCode::CREATED, Json(bundle.response)))
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// POST /api/auth/login — exchange email + password for tokens.
pub async fn login(
    State(db): State<Db>,
    State(config): State<Arc<AppConfig>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, ApiErr> {
    let email = req.email.trim().to_lowercase();

    let row = {
        let conn = db.conn();
        sq_query_row(&conn, db::users::get_by_email_for_login(&email), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .optional()
        .map_err(ApiErr::from_db("login lookup"))?
    };
    let Some((user_id, first_name, password_hash, password_salt)) = row else {
        return Err(ApiErr::unauthorized(INVALID_CREDENTIALS));
    };

    let password = req.password;
    let valid = tokio::task::spawn_blocking(move || {
        crypto::verify_password(&password, &password_hash, &password_salt)
    })
    .await
    .map_err(ApiErr::from_db("verify password"))?;
    if !valid {
        return Err(ApiErr::unauthorized(INVALID_CREDENTIALS));
    }

    let bundle =
        service::prepare_token_bundle(&config.jwt_secret, &user_id, &first_name, now_unix())?;
    {
        let conn = db.conn();
        sq_execute(
            &conn,
            db::users::insert_refresh_token(
                &bundle.token_id,
                &user_id,
                &bundle.token_hash,
                &bundle.expires_at,
            ),
        )
        .map_err(ApiErr::from_db("insert refresh token"))?;
        sq_execute(&conn, db::users::touch_last_login(&user_id))
            .map_err(ApiErr::from_db("touch last login"))?;
    }

    analytics::track_event(&db, Some(&user_id), Event::UserLogin, None);
    Ok(Json(bundle.response))
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

/// POST /api/auth/refresh — rotate a refresh token into a new token pair.
pub async fn refresh(
    State(db): State<Db>,
    State(config): State<Arc<AppConfig>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthTokenResponse>, ApiErr> {
    let token_hash = crypto::hash_token(&req.refresh_token);
    let conn = db.conn();

    let row = sq_query_row(&conn, db::users::lookup_refresh_token(&token_hash), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })
    .optional()
    .map_err(ApiErr::from_db("refresh lookup"))?;
    let Some((token_id, user_id, expires_at, first_name)) = row else {
        return Err(ApiErr::unauthorized("invalid refresh token"));
    };

    // Single use: the presented token is gone whether or not it is still valid,
    // but a rotation that fails halfway leaves it in place.
    let tx = conn
        .unchecked_transaction()
        .map_err(ApiErr::from_db("begin refresh"))?;
    sq_execute(&tx, db::users::delete_refresh_token_by_id(&token_id))
        .map_err(ApiErr::from_db("delete refresh token"))?;
    if expires_at < sqlite_now() {
        tx.commit().map_err(ApiErr::from_db("commit refresh"))?;
        return Err(ApiErr::unauthorized("refresh token expired"));
    }

    let bundle =
        service::prepare_token_bundle(&config.jwt_secret, &user_id, &first_name, now_unix())?;
    sq_execute(
        &tx,
        db::users::insert_refresh_token(
            &bundle.token_id,
            &user_id,
            &bundle.token_hash,
            &bundle.expires_at,
        ),
    )
    .map_err(ApiErr::from_db("insert refresh token"))?;
    tx.commit().map_err(ApiErr::from_db("commit refresh"))?;

    Ok(Json(bundle.response))
}

/// POST /api/auth/logout — revoke a refresh token.
pub async fn logout(
    State(db): State<Db>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<OkResponse>, ApiErr> {
    let token_hash = crypto::hash_token(&req.refresh_token);
    let conn = db.conn();
    sq_execute(&conn, db::users::delete_refresh_token(&token_hash))
        .map_err(ApiErr::from_db("logout"))?;
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// Current user
// ---------------------------------------------------------------------------

/// GET /api/auth/me — the caller's profile, strengths and role.
pub async fn me(State(db): State<Db>, user: AuthUser) -> Result<Json<UserProfile>, ApiErr> {
    let conn = db.conn();
    sq_query_row(&conn, db::users::profile_by_id(&user.user_id), profile_from_row)
        .optional()
        .map_err(ApiErr::from_db("load profile"))?
        .map(Json)
        .ok_or_else(|| ApiErr::not_found("user not found"))
}
