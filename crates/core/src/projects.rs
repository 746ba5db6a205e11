//! Project lifecycle rules: date-range validation and the reactivation
//! decisions taken on create and update.
//!
//! A project name is unique across *all* rows, active or not, so a
//! soft-deleted project keeps its name reserved. Instead of failing, a create
//! or rename that lands on an inactive name revives that row. Landing on an
//! active name is always a [`CoreError::DuplicateName`].
//!
//! The functions here only decide *what* to write. Callers look the rows up,
//! ask for a plan, then execute the [`PlannedWrite`] against the store with
//! the `expect_active` guard so a concurrent flip is caught at write time.

use crate::error::CoreError;
use crate::types::{Date, DbId};

/// Entity name used in [`CoreError::NotFound`].
pub const ENTITY: &str = "Project";

/// State label given to new projects when the caller omits one.
pub const DEFAULT_STATE: &str = "In progress";

/// Validate that `end` is not before `start`.
pub fn validate_date_range(start: Date, end: Date) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::InvalidDateRange { start, end });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The stored fields the decisions need to look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSnapshot {
    pub id: DbId,
    pub name: String,
    pub active: bool,
    pub start_date: Date,
    pub end_date: Date,
}

/// Fields a create request supplies that matter when reviving a row.
#[derive(Debug, Clone, Copy)]
pub struct CreateRequest<'a> {
    pub name: &'a str,
    pub state: Option<&'a str>,
    pub start_date: Date,
    pub end_date: Date,
}

/// A partial update. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl ProjectPatch {
    /// The target name when this patch renames `current`, i.e. the name the
    /// caller must look up before calling [`plan_update`].
    pub fn rename_target(&self, current: &ProjectSnapshot) -> Option<&str> {
        self.name.as_deref().filter(|name| *name != current.name)
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Column changes to apply to one row. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub active: Option<bool>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// A single-row write: apply `changes` to `id`, but only while the row's
/// `active` flag still equals `expect_active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub id: DbId,
    pub expect_active: bool,
    pub changes: ProjectChanges,
}

/// Outcome of [`plan_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePlan {
    /// No row holds the name: insert a fresh active project.
    Insert,
    /// An inactive row holds the name: revive it.
    Reactivate(PlannedWrite),
}

/// Outcome of [`plan_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    /// The rename target belongs to another, inactive row. That row is
    /// revived and the addressed row is left untouched.
    ReactivateNameHolder(PlannedWrite),
    /// The addressed row is inactive. It is revived with a restricted set of
    /// fields (name, state, dates); other supplied fields are dropped.
    ReactivateInPlace(PlannedWrite),
    /// The addressed row is active. Every supplied field is applied.
    Merge(PlannedWrite),
}

impl UpdatePlan {
    pub fn write(&self) -> &PlannedWrite {
        match self {
            UpdatePlan::ReactivateNameHolder(w)
            | UpdatePlan::ReactivateInPlace(w)
            | UpdatePlan::Merge(w) => w,
        }
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Decide how to honour a create request.
///
/// `existing` is whatever row currently holds `request.name`, regardless of
/// its active flag.
pub fn plan_create(
    request: &CreateRequest<'_>,
    existing: Option<&ProjectSnapshot>,
) -> Result<CreatePlan, CoreError> {
    validate_date_range(request.start_date, request.end_date)?;

    match existing {
        None => Ok(CreatePlan::Insert),
        Some(row) if row.active => Err(duplicate(request.name)),
        Some(row) => Ok(CreatePlan::Reactivate(PlannedWrite {
            id: row.id,
            expect_active: false,
            changes: ProjectChanges {
                active: Some(true),
                state: request.state.map(str::to_owned),
                start_date: Some(request.start_date),
                end_date: Some(request.end_date),
                ..Default::default()
            },
        })),
    }
}

/// Decide how to honour an update of `target`.
///
/// `name_holder` is the row found under [`ProjectPatch::rename_target`], if
/// the patch renames `target` and such a row exists. A holder that is
/// `target` itself is ignored.
pub fn plan_update(
    target: &ProjectSnapshot,
    name_holder: Option<&ProjectSnapshot>,
    patch: ProjectPatch,
) -> Result<UpdatePlan, CoreError> {
    let holder = name_holder.filter(|h| h.id != target.id);

    if let (Some(holder), Some(name)) = (holder, patch.rename_target(target)) {
        if holder.active {
            return Err(duplicate(name));
        }

        let start = patch.start_date.unwrap_or(holder.start_date);
        let end = patch.end_date.unwrap_or(holder.end_date);
        validate_date_range(start, end)?;

        return Ok(UpdatePlan::ReactivateNameHolder(PlannedWrite {
            id: holder.id,
            expect_active: false,
            changes: ProjectChanges {
                active: Some(true),
                state: patch.state,
                start_date: Some(start),
                end_date: Some(end),
                ..Default::default()
            },
        }));
    }

    let start = patch.start_date.unwrap_or(target.start_date);
    let end = patch.end_date.unwrap_or(target.end_date);
    validate_date_range(start, end)?;

    if !target.active {
        return Ok(UpdatePlan::ReactivateInPlace(PlannedWrite {
            id: target.id,
            expect_active: false,
            changes: ProjectChanges {
                name: patch.name,
                state: patch.state,
                active: Some(true),
                start_date: patch.start_date,
                end_date: patch.end_date,
                description: None,
            },
        }));
    }

    Ok(UpdatePlan::Merge(PlannedWrite {
        id: target.id,
        expect_active: true,
        changes: ProjectChanges {
            name: patch.name,
            description: patch.description,
            state: patch.state,
            active: None,
            start_date: patch.start_date,
            end_date: patch.end_date,
        },
    }))
}

fn duplicate(name: &str) -> CoreError {
    CoreError::DuplicateName(format!("An active project named '{name}' already exists"))
}
