//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};
use workboard_core::analysis::ProjectDigest;
use workboard_core::projects::{CreateRequest, ProjectPatch, ProjectSnapshot};
use workboard_core::types::{deserialize_date, deserialize_opt_date, Date, DbId, Timestamp};

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub state: String,
    pub active: bool,
    pub start_date: Date,
    pub end_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            id: self.id,
            name: self.name.clone(),
            active: self.active,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn digest(&self) -> ProjectDigest {
        ProjectDigest {
            name: self.name.clone(),
            description: self.description.clone(),
            state: self.state.clone(),
            active: self.active,
        }
    }
}

/// DTO for creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProject {
    #[validate(
        custom(function = "not_blank", message = "name is required"),
        length(max = 255, message = "name must be at most 255 characters")
    )]
    pub name: String,
    #[validate(custom(function = "not_blank", message = "description is required"))]
    pub description: String,
    /// Defaults to "In progress" if omitted.
    #[validate(custom(function = "not_blank", message = "state must not be blank"))]
    pub state: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: Date,
    #[serde(deserialize_with = "deserialize_date")]
    pub end_date: Date,
}

impl CreateProject {
    pub fn request(&self) -> CreateRequest<'_> {
        CreateRequest {
            name: &self.name,
            state: self.state.as_deref(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// DTO for updating a project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProject {
    #[validate(
        custom(function = "not_blank", message = "name must not be blank"),
        length(max = 255, message = "name must be at most 255 characters")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank", message = "description must not be blank"))]
    pub description: Option<String>,
    #[validate(custom(function = "not_blank", message = "state must not be blank"))]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "deserialize_opt_date")]
    pub end_date: Option<Date>,
}

impl From<UpdateProject> for ProjectPatch {
    fn from(input: UpdateProject) -> Self {
        ProjectPatch {
            name: input.name,
            description: input.description,
            state: input.state,
            start_date: input.start_date,
            end_date: input.end_date,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Number of active projects carrying one state label.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StateCount {
    pub state: String,
    pub count: i64,
}

/// Active/inactive split over every row.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct StatusCounts {
    pub active: i64,
    pub inactive: i64,
    pub total: i64,
}
