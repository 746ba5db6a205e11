//! Handlers for the `/projects` resource.
//!
//! Create and update read the current rows, ask `workboard_core::projects`
//! for a plan, and execute it as a single guarded write. A guarded write
//! that matches no row means another request changed the row in between.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;
use workboard_core::error::CoreError;
use workboard_core::projects::{self, CreatePlan, ProjectPatch, UpdatePlan, ENTITY};
use workboard_core::types::{parse_id, DbId};
use workboard_db::models::project::{CreateProject, Project, UpdateProject};
use workboard_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::response::{DeletedResponse, ListResponse};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

fn lost_race(name: &str) -> AppError {
    AppError::Core(CoreError::DuplicateName(format!(
        "Project '{name}' was reactivated by another request"
    )))
}

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ListResponse<Project>>> {
    let projects = ProjectRepo::list_active(&state.pool).await?;
    Ok(Json(ListResponse::new(projects)))
}

/// POST /api/projects
///
/// Returns 201 for a fresh row, 200 when an inactive row with the same name
/// was revived instead.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateProject>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let Json(input) = payload?;
    input.validate()?;

    let existing = ProjectRepo::find_by_name(&state.pool, &input.name)
        .await?
        .map(|p| p.snapshot());

    match projects::plan_create(&input.request(), existing.as_ref())? {
        CreatePlan::Insert => {
            let project = ProjectRepo::insert(&state.pool, &input).await?;
            tracing::info!(project_id = %project.id, name = %project.name, "Project created");
            Ok((StatusCode::CREATED, Json(project)))
        }
        CreatePlan::Reactivate(write) => {
            let project = ProjectRepo::apply(&state.pool, &write)
                .await?
                .ok_or_else(|| lost_race(&input.name))?;
            tracing::info!(project_id = %project.id, name = %project.name, "Project reactivated on create");
            Ok((StatusCode::OK, Json(project)))
        }
    }
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Project>> {
    let id = parse_id(&id)?;
    let project = ProjectRepo::find_active_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// PATCH /api/projects/{id}
///
/// Addresses inactive rows too: updating one revives it. An unknown id is
/// reported before the body is checked.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProject>, JsonRejection>,
) -> AppResult<Json<Project>> {
    let id = parse_id(&id)?;
    let target = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?
        .snapshot();

    let Json(input) = payload?;
    input.validate()?;

    let patch = ProjectPatch::from(input);
    let name_holder = match patch.rename_target(&target) {
        Some(name) => ProjectRepo::find_by_name(&state.pool, name)
            .await?
            .map(|p| p.snapshot()),
        None => None,
    };

    let plan = projects::plan_update(&target, name_holder.as_ref(), patch)?;
    let updated = ProjectRepo::apply(&state.pool, plan.write()).await?;

    match (plan, updated) {
        (UpdatePlan::ReactivateNameHolder(write), Some(project)) => {
            tracing::info!(
                project_id = %id,
                reactivated_id = %write.id,
                name = %project.name,
                "Rename target was inactive, reactivated it instead",
            );
            Ok(Json(project))
        }
        (UpdatePlan::ReactivateInPlace(_), Some(project)) => {
            tracing::info!(project_id = %id, "Project reactivated on update");
            Ok(Json(project))
        }
        (UpdatePlan::Merge(_), Some(project)) => Ok(Json(project)),
        (UpdatePlan::ReactivateNameHolder(_), None) => {
            let name = name_holder.map(|h| h.name).unwrap_or_default();
            Err(lost_race(&name))
        }
        (UpdatePlan::ReactivateInPlace(_), None) => Err(lost_race(&target.name)),
        (UpdatePlan::Merge(_), None) => {
            if ProjectRepo::find_by_id(&state.pool, id).await?.is_some() {
                Err(AppError::Core(CoreError::Conflict(format!(
                    "Project {id} was modified by another request"
                ))))
            } else {
                Err(not_found(id))
            }
        }
    }
}

/// DELETE /api/projects/{id}
///
/// Soft delete. Echoes the project as it was before deactivation.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse<Project>>> {
    let id = parse_id(&id)?;
    let project = ProjectRepo::find_active_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !ProjectRepo::deactivate(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(project_id = %id, name = %project.name, "Project deactivated");

    Ok(Json(DeletedResponse {
        message: "Project deleted successfully",
        project,
    }))
}
