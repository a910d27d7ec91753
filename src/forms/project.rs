use itertools::Itertools;

use crate::error::FormError;
use crate::forms::layout::{FormLayout, Widget};
use crate::forms::{rejected, validated};
use crate::logic::validate::{
    invalid_choice, FieldKind, FieldSpec, FormSchema, RawInput, ValidationErrors,
};
use crate::model::{NewProject, SavedProject};
use crate::store::traits::Store;

/// Project with its financing banks.
///
/// `bank` selects existing banks. With `add_bank` checked, `new_bank` names a
/// bank to add as well; the name is then mandatory. With `add_bank` unchecked
/// `new_bank` is ignored. The project, its associations and the new bank are
/// written together or not at all.
pub struct ProjectForm;

impl ProjectForm {
    pub const ID: &'static str = "project-form";

    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::required("name", FieldKind::text(255)))
            .field(FieldSpec::required("launch_date", FieldKind::Date))
            .field(FieldSpec::required("possession_date", FieldKind::Date))
            .field(FieldSpec::optional("bank", FieldKind::IdList))
            .field(FieldSpec::optional("add_bank", FieldKind::Boolean))
            .field(FieldSpec::optional("new_bank", FieldKind::text(255)))
    }

    pub fn layout() -> FormLayout {
        FormLayout::new(Some(Self::ID))
            .without_form_tag()
            .field("name", Widget::Text)
            .field("launch_date", Widget::Date)
            .field("possession_date", Widget::Date)
            .field("bank", Widget::MultiSelect)
            .labelled("add_bank", Some("Add a bank"), Widget::Checkbox)
            .labelled("new_bank", Some("Bank Name"), Widget::Text)
    }

    pub async fn submit<S: Store + ?Sized>(
        store: &S,
        input: &RawInput,
    ) -> Result<SavedProject, FormError> {
        let data = validated(Self::ID, &Self::schema(), input)?;

        let mut errors = ValidationErrors::default();

        let bank_ids: Vec<_> = data.ids("bank").into_iter().unique().sorted().collect();
        for id in &bank_ids {
            if store.get_bank(*id).await?.is_none() {
                errors.add("bank", invalid_choice(&id.to_string()));
            }
        }

        let new_bank = if data.boolean("add_bank") {
            let name = data.text("new_bank");
            if name.is_none() {
                errors.add("new_bank", "Enter a bank name to add a bank.");
            }
            name
        } else {
            None
        };

        if !errors.is_empty() {
            return Err(rejected(Self::ID, errors));
        }

        let project = NewProject {
            name: data.require_text("name")?,
            launch_date: data.require_date("launch_date")?,
            possession_date: data.require_date("possession_date")?,
            bank_ids,
            new_bank,
        };

        let saved = store.create_project(project).await?;
        match &saved.added_bank {
            Some(bank) => log::info!(
                "Saved project {} with added bank {} ({})",
                saved.project.id,
                bank.id,
                bank.name
            ),
            None => log::info!("Saved project {}", saved.project.id),
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BankStore, MemoryStore, ProjectStore};
    use serde_json::{json, Value};

    fn project_input(extra: Value) -> RawInput {
        let mut raw = json!({
            "name": "Lakeview",
            "launch_date": "2024-01-15",
            "possession_date": "2027-06-30"
        })
        .as_object()
        .cloned()
        .unwrap();
        if let Value::Object(extra) = extra {
            raw.extend(extra);
        }
        raw
    }

    #[tokio::test]
    async fn add_bank_creates_and_associates_one_bank() {
        let store = MemoryStore::new();
        let saved = ProjectForm::submit(
            &store,
            &project_input(json!({ "add_bank": true, "new_bank": "HDFC" })),
        )
        .await
        .unwrap();

        let bank = saved.added_bank.unwrap();
        assert_eq!(bank.name, "HDFC");
        assert_eq!(saved.project.bank_ids, vec![bank.id]);
        assert_eq!(store.list_banks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unchecked_add_bank_ignores_new_bank_name() {
        let store = MemoryStore::new();
        let saved = ProjectForm::submit(
            &store,
            &project_input(json!({ "add_bank": false, "new_bank": "HDFC" })),
        )
        .await
        .unwrap();

        assert!(saved.added_bank.is_none());
        assert!(saved.project.bank_ids.is_empty());
        assert!(store.list_banks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_bank_with_blank_name_is_rejected() {
        let store = MemoryStore::new();
        let err = ProjectForm::submit(
            &store,
            &project_input(json!({ "add_bank": "on", "new_bank": "" })),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.validation_errors().unwrap().get("new_bank").unwrap(),
            ["Enter a bank name to add a bank."]
        );
        assert!(store.list_projects().await.unwrap().is_empty());
        assert!(store.list_banks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bank_association_is_additive_and_names_are_reused() {
        let store = MemoryStore::new();
        let sbi = store.get_or_create_bank("SBI").await.unwrap().record;

        let first = ProjectForm::submit(
            &store,
            &project_input(json!({ "bank": [sbi.id, sbi.id], "add_bank": true, "new_bank": "HDFC" })),
        )
        .await
        .unwrap();
        let second = ProjectForm::submit(
            &store,
            &project_input(json!({ "name": "Hillside", "add_bank": true, "new_bank": "HDFC" })),
        )
        .await
        .unwrap();

        let hdfc = first.added_bank.unwrap();
        assert_eq!(first.project.bank_ids, vec![sbi.id, hdfc.id]);
        assert_eq!(second.added_bank.unwrap().id, hdfc.id);
        assert_eq!(store.list_banks().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_bank_id_is_a_field_error() {
        let store = MemoryStore::new();
        let err = ProjectForm::submit(&store, &project_input(json!({ "bank": [404] })))
            .await
            .unwrap_err();

        assert_eq!(
            err.validation_errors().unwrap().get("bank").unwrap(),
            ["Select a valid choice. 404 is not one of the available choices."]
        );
        assert!(store.list_projects().await.unwrap().is_empty());
    }
}
