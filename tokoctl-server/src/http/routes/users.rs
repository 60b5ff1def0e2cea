//! User endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use tokoctl_core::models::{NewUser, User, UserPatch};

use crate::db::repos::{SortField, UserField, UserQuery, UserRepo, UserSort, UserSummary};
use crate::http::error::ApiError;
use crate::http::extractors::ValidId;
use crate::http::server::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserView {
    #[default]
    Full,
    /// Name and email only
    Summary,
}

/// Query parameters for GET /users
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersParams {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Matches when either name or email equals this value
    pub search: Option<String>,
    pub name_not: Option<String>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub view: UserView,
}

impl From<ListUsersParams> for UserQuery {
    fn from(params: ListUsersParams) -> Self {
        let any_of = params
            .search
            .map(|s| vec![UserField::Name(s.clone()), UserField::Email(s)])
            .unwrap_or_default();
        let field = params.sort.unwrap_or_default();
        let sort = match params.order.unwrap_or_default() {
            SortOrder::Asc => UserSort::asc(field),
            SortOrder::Desc => UserSort::desc(field),
        };

        UserQuery {
            name: params.name,
            email: params.email,
            any_of,
            name_not: params.name_not,
            sort: Some(sort),
            limit: Some(params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)),
            offset: params.offset.filter(|o| *o > 0),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum UserList {
    Full(Vec<User>),
    Summary(Vec<UserSummary>),
}

/// GET /users - filtered listing
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<UserList>, ApiError> {
    let view = params.view;
    let query = UserQuery::from(params);
    let repo = UserRepo::new(&state.pool);

    let list = match view {
        UserView::Full => UserList::Full(repo.find(&query).await?),
        UserView::Summary => UserList::Summary(repo.find_summaries(&query).await?),
    };
    Ok(Json(list))
}

/// POST /users - create; a taken email is 409
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = UserRepo::new(&state.pool).create(&req).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /users - insert or update by email
async fn upsert_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    let user = UserRepo::new(&state.pool).upsert_by_email(&req).await?;
    Ok(Json(user))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<User>, ApiError> {
    let user = UserRepo::new(&state.pool).get(id).await?;
    Ok(Json(user))
}

/// PUT /users/{id} - overwrite every field
async fn replace_user(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    Json(req): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    req.validate()?;

    let repo = UserRepo::new(&state.pool);
    let mut user = repo.get(id).await?;
    user.name = req.name;
    user.email = req.email;
    user.password = req.password;
    user.address = req.address;
    user.phone_number = req.phone_number;

    Ok(Json(repo.save(&user).await?))
}

/// PATCH /users/{id} - update only the given fields
async fn patch_user(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    let user = UserRepo::new(&state.pool).update_fields(id, &patch).await?;
    Ok(Json(user))
}

/// DELETE /users/{id} - soft delete
async fn delete_user(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    UserRepo::new(&state.pool).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user).put(upsert_user))
        .route(
            "/users/{id}",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}
