use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::FormError;
use crate::forms::{
    DeveloperProjectForm, FormKind, FormLayout, OtherDetailsForm, OwnerForm, PermissionForm,
    ProjectForm, PropertyBasicDetailsForm, PropertyForm,
};
use crate::logic::validate::{RawInput, ValidationErrors};
use crate::model::{
    Bank, Developer, DeveloperProject, Id, Owner, Permission, Project, ProjectPermission, Property,
    SavedProject,
};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<T, ApiError>;
type Created<T> = (StatusCode, Json<T>);

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Per-field messages when the submission failed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
            errors: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DefinePermissionRequest {
    pub name: String,
}

fn not_found(entity: &str, id: Id) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(&format!("{} not found: {}", entity, id))),
    )
}

fn internal(e: anyhow::Error) -> ApiError {
    log::error!("Store failure: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&e.to_string())),
    )
}

fn form_error(e: FormError) -> ApiError {
    match e {
        FormError::Invalid(errors) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Validation failed".to_string(),
                errors: Some(errors),
            }),
        ),
        FormError::NotFound { entity, id } => not_found(entity, id),
        FormError::Store(e) => internal(e),
        other => {
            log::error!("Form submission failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(&other.to_string())),
            )
        }
    }
}

fn created<T>(result: Result<T, FormError>) -> ApiResult<Created<T>> {
    result
        .map(|record| (StatusCode::CREATED, Json(record)))
        .map_err(form_error)
}

fn found<T>(entity: &str, id: Id, result: anyhow::Result<Option<T>>) -> ApiResult<Json<T>> {
    match result {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(not_found(entity, id)),
        Err(e) => Err(internal(e)),
    }
}

// Layouts

pub async fn get_form_layout<S: Store>(
    State(store): State<AppState<S>>,
    Path(form): Path<String>,
) -> ApiResult<Json<FormLayout>> {
    let kind: FormKind = form
        .parse()
        .map_err(|e: String| (StatusCode::NOT_FOUND, Json(ErrorResponse::new(&e))))?;

    let catalog = match kind {
        FormKind::Permissions => store.list_permissions().await.map_err(internal)?,
        _ => Vec::new(),
    };

    Ok(Json(kind.layout(&catalog)))
}

// Form submissions

pub async fn submit_property_form<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(input): RequestJson<RawInput>,
) -> ApiResult<Created<Property>> {
    created(PropertyForm::submit(&*store, &input).await)
}

pub async fn submit_property_basic_form<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(input): RequestJson<RawInput>,
) -> ApiResult<Created<Property>> {
    created(PropertyBasicDetailsForm::submit(&*store, &input).await)
}

pub async fn submit_other_details_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(property_id): Path<Id>,
    RequestJson(input): RequestJson<RawInput>,
) -> ApiResult<Json<Property>> {
    OtherDetailsForm::submit(&*store, property_id, &input)
        .await
        .map(Json)
        .map_err(form_error)
}

pub async fn submit_owner_form<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(input): RequestJson<RawInput>,
) -> ApiResult<Created<Owner>> {
    created(OwnerForm::submit(&*store, &input).await)
}

pub async fn submit_developer_project_form<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(input): RequestJson<RawInput>,
) -> ApiResult<Created<DeveloperProject>> {
    created(DeveloperProjectForm::submit(&*store, &input).await)
}

pub async fn submit_project_form<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(input): RequestJson<RawInput>,
) -> ApiResult<Created<SavedProject>> {
    created(ProjectForm::submit(&*store, &input).await)
}

pub async fn submit_permission_form<S: Store>(
    State(store): State<AppState<S>>,
    Path(project_id): Path<Id>,
    RequestJson(input): RequestJson<RawInput>,
) -> ApiResult<Created<ListResponse<ProjectPermission>>> {
    created(
        PermissionForm::submit(&*store, project_id, &input)
            .await
            .map(ListResponse::from),
    )
}

// Read back

pub async fn get_property<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Property>> {
    found("Property", id, store.get_property(id).await)
}

pub async fn get_owner<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Owner>> {
    found("Owner", id, store.get_owner(id).await)
}

pub async fn get_project<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<Project>> {
    found("Project", id, store.get_project(id).await)
}

pub async fn get_developer_project<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<DeveloperProject>> {
    found("Developer project", id, store.get_developer_project(id).await)
}

pub async fn list_project_permissions<S: Store>(
    State(store): State<AppState<S>>,
    Path(project_id): Path<Id>,
) -> ApiResult<Json<ListResponse<ProjectPermission>>> {
    if store.get_project(project_id).await.map_err(internal)?.is_none() {
        return Err(not_found("Project", project_id));
    }
    let rows = store
        .list_project_permissions(project_id)
        .await
        .map_err(internal)?;
    Ok(Json(rows.into()))
}

pub async fn list_developers<S: Store>(
    State(store): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<Developer>>> {
    let developers = store.list_developers().await.map_err(internal)?;
    Ok(Json(developers.into()))
}

pub async fn list_banks<S: Store>(
    State(store): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<Bank>>> {
    let banks = store.list_banks().await.map_err(internal)?;
    Ok(Json(banks.into()))
}

// Permission catalog

pub async fn list_permissions<S: Store>(
    State(store): State<AppState<S>>,
) -> ApiResult<Json<ListResponse<Permission>>> {
    let permissions = store.list_permissions().await.map_err(internal)?;
    Ok(Json(permissions.into()))
}

pub async fn define_permission<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(request): RequestJson<DefinePermissionRequest>,
) -> ApiResult<Created<Permission>> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(form_error(FormError::Invalid(ValidationErrors::single(
            "name",
            crate::logic::validate::REQUIRED,
        ))));
    }

    let resolved = store.define_permission(name).await.map_err(internal)?;
    let status = if resolved.created {
        log::info!("Defined permission {} ({})", resolved.record.id, name);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(resolved.record)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_map_to_bad_request_with_field_errors() {
        let (status, Json(body)) = form_error(FormError::Invalid(ValidationErrors::single(
            "city",
            "This field is required.",
        )));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["errors"]["city"][0], "This field is required.");
    }

    #[test]
    fn missing_records_map_to_not_found() {
        let (status, Json(body)) = form_error(FormError::NotFound {
            entity: "Property",
            id: 5,
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Property not found: 5");
        assert!(body.errors.is_none());
    }

    #[test]
    fn resolution_failures_are_internal_errors() {
        let (status, _) = form_error(FormError::Resolution {
            kind: "developer",
            detail: "empty natural key".to_string(),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
