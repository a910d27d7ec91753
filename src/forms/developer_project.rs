use crate::error::FormError;
use crate::forms::layout::{select, FormLayout, Widget};
use crate::forms::{small_int, validated};
use crate::logic::resolve::Resolver;
use crate::logic::validate::{FieldKind, FieldSpec, FormSchema, RawInput};
use crate::model::{DeveloperProject, Month, NewDeveloperProject};
use crate::store::traits::Store;

pub struct DeveloperProjectForm;

impl DeveloperProjectForm {
    pub const ID: &'static str = "developer-project-form";

    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::required("project_name", FieldKind::text(255)))
            .field(FieldSpec::required(
                "launch_date_month",
                FieldKind::Choice(Month::LABELS),
            ))
            .field(FieldSpec::required("launch_date_year", FieldKind::Integer))
            .field(FieldSpec::required(
                "possession_date_month",
                FieldKind::Choice(Month::LABELS),
            ))
            .field(FieldSpec::required("possession_date_year", FieldKind::Integer))
            .field(FieldSpec::required("developer", FieldKind::text(255)))
    }

    pub fn layout() -> FormLayout {
        FormLayout::new(Some(Self::ID))
            .without_form_tag()
            .field("project_name", Widget::Text)
            .field("launch_date_month", select(Month::LABELS))
            .field("launch_date_year", Widget::Number)
            .field("possession_date_month", select(Month::LABELS))
            .field("possession_date_year", Widget::Number)
            .field("developer", Widget::Text)
            .submit("Submit", None)
    }

    pub async fn submit<S: Store + ?Sized>(
        store: &S,
        input: &RawInput,
    ) -> Result<DeveloperProject, FormError> {
        let data = validated(Self::ID, &Self::schema(), input)?;

        let developer = Resolver::new(store)
            .developer(&data.require_text("developer")?)
            .await?;

        let project = NewDeveloperProject {
            developer_id: developer.id,
            project_name: data.require_text("project_name")?,
            launch_date_month: data.require_choice("launch_date_month")?,
            launch_date_year: small_int(&data, "launch_date_year")?,
            possession_date_month: data.require_choice("possession_date_month")?,
            possession_date_year: small_int(&data, "possession_date_year")?,
        };

        let project = store.insert_developer_project(project).await?;
        log::info!(
            "Saved developer project {} for developer {}",
            project.id,
            developer.id
        );
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DeveloperStore, MemoryStore};
    use serde_json::json;

    #[tokio::test]
    async fn saves_with_resolved_developer() {
        let store = MemoryStore::new();
        let existing = store.get_or_create_developer("Skyline").await.unwrap().record;

        let raw = json!({
            "project_name": "Skyline Towers",
            "launch_date_month": "March",
            "launch_date_year": "2023",
            "possession_date_month": "December",
            "possession_date_year": 2026,
            "developer": "Skyline"
        });
        let project = DeveloperProjectForm::submit(&store, raw.as_object().unwrap())
            .await
            .unwrap();

        assert_eq!(project.developer_id, existing.id);
        assert_eq!(project.launch_date_month, Month::March);
        assert_eq!(project.possession_date_year, 2026);
    }

    #[tokio::test]
    async fn month_must_be_a_full_month_name() {
        let store = MemoryStore::new();
        let raw = json!({
            "project_name": "Skyline Towers",
            "launch_date_month": "Mar",
            "launch_date_year": "2023",
            "possession_date_month": "December",
            "possession_date_year": "next year",
            "developer": "Skyline"
        });

        let err = DeveloperProjectForm::submit(&store, raw.as_object().unwrap())
            .await
            .unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["launch_date_month", "possession_date_year"]
        );
        assert!(store.list_developers().await.unwrap().is_empty());
    }
}
