use crate::error::FormError;
use crate::forms::layout::{FormLayout, Widget};
use crate::forms::validated;
use crate::logic::resolve::Resolver;
use crate::logic::validate::{FieldKind, FieldSpec, FormSchema, RawInput};
use crate::model::{NewOwner, Owner, ResaleChoice};
use crate::store::traits::Store;

/// Purchase record of an owner, linked to a co-owner looked up by name and
/// occupation.
///
/// Seller details are optional even for a resale purchase; the form accepts a
/// resale with no seller on record.
pub struct OwnerForm;

impl OwnerForm {
    pub const ID: &'static str = "owner-form";

    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::required("name", FieldKind::text(100)))
            .field(FieldSpec::required("occupation", FieldKind::text(100)))
            .field(FieldSpec::required("co_owner_name", FieldKind::text(100)))
            .field(FieldSpec::required("co_owner_occupation", FieldKind::text(100)))
            .field(FieldSpec::required("pan_number", FieldKind::text(10)))
            .field(FieldSpec::required("date_of_purchase", FieldKind::Date))
            .field(FieldSpec::required("loan_from", FieldKind::text(100)))
            .field(FieldSpec::required("cost_of_purchase", FieldKind::Decimal))
            .field(FieldSpec::optional("is_resale", FieldKind::ResaleChoice))
            .field(FieldSpec::optional("name_of_seller", FieldKind::text(100)))
            .field(FieldSpec::optional("contact_number_seller", FieldKind::text(15)))
            .field(FieldSpec::optional("email_seller", FieldKind::Email))
    }

    pub fn layout() -> FormLayout {
        FormLayout::new(Some(Self::ID))
            .without_form_tag()
            .field("name", Widget::Text)
            .field("occupation", Widget::Text)
            .field("co_owner_name", Widget::Text)
            .field("co_owner_occupation", Widget::Text)
            .field("pan_number", Widget::Text)
            .field("date_of_purchase", Widget::Date)
            .field("loan_from", Widget::Text)
            .field("cost_of_purchase", Widget::Number)
            .field(
                "is_resale",
                Widget::InlineRadios {
                    choices: vec![
                        (true, ResaleChoice::RESALE_LABEL),
                        (false, ResaleChoice::DIRECT_LABEL),
                    ],
                },
            )
            .field("name_of_seller", Widget::Text)
            .field("contact_number_seller", Widget::Text)
            .field("email_seller", Widget::Email)
            .submit("owner-details", Some("submit-owner-details"))
    }

    pub async fn submit<S: Store + ?Sized>(store: &S, input: &RawInput) -> Result<Owner, FormError> {
        let data = validated(Self::ID, &Self::schema(), input)?;

        let co_owner = Resolver::new(store)
            .owner(
                &data.require_text("co_owner_name")?,
                &data.require_text("co_owner_occupation")?,
            )
            .await?;

        let owner = NewOwner {
            name: data.require_text("name")?,
            occupation: data.require_text("occupation")?,
            pan_number: data.text("pan_number"),
            date_of_purchase: data.date("date_of_purchase"),
            loan_from: data.text("loan_from"),
            cost_of_purchase: data.decimal("cost_of_purchase"),
            is_resale: data.boolean("is_resale"),
            name_of_seller: data.text("name_of_seller"),
            contact_number_seller: data.text("contact_number_seller"),
            email_seller: data.text("email_seller"),
            co_owner_id: Some(co_owner.id),
        };

        let owner = store.insert_owner(owner).await?;
        log::info!("Saved owner {} with co-owner {}", owner.id, co_owner.id);
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, OwnerStore};
    use serde_json::{json, Value};

    fn owner_input(extra: Value) -> RawInput {
        let mut raw = json!({
            "name": "Jane",
            "occupation": "Engineer",
            "co_owner_name": "John",
            "co_owner_occupation": "Doctor",
            "pan_number": "ABCDE1234F",
            "date_of_purchase": "2022-08-01",
            "loan_from": "HDFC",
            "cost_of_purchase": "7500000"
        });
        if let (Some(base), Value::Object(extra)) = (raw.as_object_mut(), extra) {
            base.extend(extra);
        }
        raw.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn co_owner_is_created_and_attached() {
        let store = MemoryStore::new();
        let jane = OwnerForm::submit(&store, &owner_input(json!({}))).await.unwrap();

        let john = store.get_owner(jane.co_owner_id.unwrap()).await.unwrap().unwrap();
        assert_eq!((john.name.as_str(), john.occupation.as_str()), ("John", "Doctor"));
        assert_eq!((jane.name.as_str(), jane.occupation.as_str()), ("Jane", "Engineer"));
        assert_eq!(jane.purchase_kind(), ResaleChoice::DirectBuilder);
    }

    #[tokio::test]
    async fn existing_co_owner_is_reused() {
        let store = MemoryStore::new();
        let first = OwnerForm::submit(&store, &owner_input(json!({}))).await.unwrap();
        let second = OwnerForm::submit(
            &store,
            &owner_input(json!({ "name": "Asha", "occupation": "Architect" })),
        )
        .await
        .unwrap();

        assert_eq!(first.co_owner_id, second.co_owner_id);
        // Jane, Asha and a single John.
        assert_eq!(store.list_owners().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn resale_without_seller_details_is_accepted() {
        let store = MemoryStore::new();
        let owner = OwnerForm::submit(&store, &owner_input(json!({ "is_resale": "Re-Sale" })))
            .await
            .unwrap();

        assert!(owner.is_resale);
        assert_eq!(owner.name_of_seller, None);
    }

    #[tokio::test]
    async fn missing_co_owner_rejects_before_any_write() {
        let store = MemoryStore::new();
        let mut raw = owner_input(json!({ "email_seller": "seller-at-example" }));
        raw.remove("co_owner_occupation");

        let err = OwnerForm::submit(&store, &raw).await.unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.get("co_owner_occupation").is_some());
        assert!(errors.get("email_seller").is_some());
        assert!(store.list_owners().await.unwrap().is_empty());
    }
}
