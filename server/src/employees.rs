//! Handlers for the `/employees` resource. Each one performs a single storage
//! call and maps failures to fixed client-facing messages.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use entity::Employee;
use platform_api::{ApiError, ApiResult, MessageBody};
use platform_db::NewEmployee;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::AppState;

const MISSING_FIELDS: &str = "Missing fields";
const NOT_FOUND: &str = "Employee not found";
const DELETE_FAILED: &str = "Failed to delete employee";

#[derive(Debug, Default, Deserialize)]
pub struct CreateEmployee {
    name: Option<String>,
    role: Option<String>,
}

impl CreateEmployee {
    /// Absent and empty values are both treated as missing.
    fn validate(self) -> ApiResult<NewEmployee> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        match (present(self.name), present(self.role)) {
            (Some(name), Some(role)) => Ok(NewEmployee { name, role }),
            _ => Err(ApiError::BadRequest(MISSING_FIELDS)),
        }
    }
}

#[instrument(name = "employees.list", skip_all)]
pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    let employees = state
        .store
        .list()
        .await
        .map_err(|err| ApiError::internal("Database error", err))?;
    Ok(Json(employees))
}

#[instrument(name = "employees.create", skip_all)]
pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployee>, JsonRejection>,
) -> ApiResult<Json<Employee>> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!(%rejection, "unusable employee payload");
            CreateEmployee::default()
        }
    };
    let new_employee = payload.validate()?;
    let employee = state
        .store
        .create(new_employee)
        .await
        .map_err(|err| ApiError::internal("Failed to add employee", err))?;
    Ok(Json(employee))
}

#[instrument(name = "employees.delete", skip_all)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let id = id
        .trim()
        .parse::<i32>()
        .map_err(|err| ApiError::internal(DELETE_FAILED, err))?;
    let deleted = state
        .store
        .delete(id)
        .await
        .map_err(|err| ApiError::internal(DELETE_FAILED, err))?;
    if !deleted {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    Ok(MessageBody::new("Employee deleted successfully"))
}
