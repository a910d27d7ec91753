use crate::error::FormError;
use crate::forms::layout::{FormLayout, Widget};
use crate::forms::validated;
use crate::logic::validate::{FieldKind, FieldSpec, FormSchema, RawInput};
use crate::model::{Id, NewProjectPermission, Permission, ProjectPermission};
use crate::store::traits::Store;

/// One value per catalog permission for a project. The fields are the catalog
/// entries at the time of submission.
pub struct PermissionForm;

impl PermissionForm {
    pub const ID: &'static str = "permission-form";

    pub fn schema(catalog: &[Permission]) -> FormSchema {
        catalog.iter().fold(FormSchema::new(), |schema, permission| {
            schema.field(FieldSpec::required(
                permission.name.clone(),
                FieldKind::Text { max_length: None },
            ))
        })
    }

    pub fn layout(catalog: &[Permission]) -> FormLayout {
        catalog
            .iter()
            .fold(FormLayout::new(Some(Self::ID)).without_form_tag(), |layout, p| {
                layout.field(p.name.clone(), Widget::Text)
            })
    }

    /// Persist one row per catalog permission, all or nothing.
    pub async fn submit<S: Store + ?Sized>(
        store: &S,
        project_id: Id,
        input: &RawInput,
    ) -> Result<Vec<ProjectPermission>, FormError> {
        if store.get_project(project_id).await?.is_none() {
            return Err(FormError::NotFound {
                entity: "Project",
                id: project_id,
            });
        }

        let catalog = store.list_permissions().await?;
        let data = validated(Self::ID, &Self::schema(&catalog), input)?;

        let rows = catalog
            .iter()
            .map(|permission| {
                Ok(NewProjectPermission {
                    permission_id: permission.id,
                    value: data.require_text(&permission.name)?,
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        let saved = store.insert_project_permissions(project_id, rows).await?;
        log::info!(
            "Saved {} permission values for project {}",
            saved.len(),
            project_id
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewProject;
    use crate::store::{MemoryStore, PermissionStore, ProjectStore};
    use chrono::NaiveDate;
    use serde_json::json;

    async fn project(store: &MemoryStore) -> Id {
        store
            .create_project(NewProject {
                name: "Lakeview".to_string(),
                launch_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                possession_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
                bank_ids: Vec::new(),
                new_bank: None,
            })
            .await
            .unwrap()
            .project
            .id
    }

    #[tokio::test]
    async fn one_row_per_catalog_permission() {
        let store = MemoryStore::new();
        for name in ["RERA Approved", "Fire NOC", "Environment Clearance"] {
            store.define_permission(name).await.unwrap();
        }
        let project_id = project(&store).await;

        let raw = json!({
            "RERA Approved": "Yes",
            "Fire NOC": "Pending",
            "Environment Clearance": "No",
            "Not A Permission": "ignored"
        });
        let saved = PermissionForm::submit(&store, project_id, raw.as_object().unwrap())
            .await
            .unwrap();

        assert_eq!(saved.len(), 3);
        assert!(saved.iter().all(|row| row.project_id == project_id));
        let values: Vec<_> = saved.iter().map(|row| row.value.as_str()).collect();
        assert_eq!(values, vec!["Yes", "Pending", "No"]);
        assert_eq!(store.list_project_permissions(project_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn every_permission_value_is_required() {
        let store = MemoryStore::new();
        store.define_permission("RERA Approved").await.unwrap();
        store.define_permission("Fire NOC").await.unwrap();
        let project_id = project(&store).await;

        let raw = json!({ "RERA Approved": "Yes" });
        let err = PermissionForm::submit(&store, project_id, raw.as_object().unwrap())
            .await
            .unwrap_err();

        assert!(err.validation_errors().unwrap().get("Fire NOC").is_some());
        assert!(store.list_project_permissions(project_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let store = MemoryStore::new();
        let err = PermissionForm::submit(&store, 77, &RawInput::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::NotFound { entity: "Project", id: 77 }));
    }

    #[tokio::test]
    async fn permission_values_have_no_length_cap() {
        let store = MemoryStore::new();
        store.define_permission("Remarks").await.unwrap();
        let project_id = project(&store).await;

        let long = "x".repeat(1000);
        let raw = json!({ "Remarks": long });
        let saved = PermissionForm::submit(&store, project_id, raw.as_object().unwrap())
            .await
            .unwrap();

        assert_eq!(saved[0].value.len(), 1000);
    }
}
