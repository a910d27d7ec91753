use crate::error::FormError;
use crate::forms::layout::{select, FormLayout, Widget};
use crate::forms::validated;
use crate::logic::resolve::Resolver;
use crate::logic::validate::{CleanedData, FieldKind, FieldSpec, FormSchema, RawInput};
use crate::model::{
    Id, NewProperty, ParkingSpaces, Property, PropertyDetails, PropertyType, Specification,
    ROOM_COUNT_LABELS,
};
use crate::store::traits::Store;

fn with_address(schema: FormSchema) -> FormSchema {
    schema
        .field(FieldSpec::required("address_line_one", FieldKind::text(255)))
        .field(FieldSpec::optional("address_line_two", FieldKind::text(255)))
        .field(FieldSpec::required("city", FieldKind::text(100)))
        .field(FieldSpec::required("state", FieldKind::text(100)))
        .field(FieldSpec::required("pin_code", FieldKind::text(10)))
}

fn address_layout(layout: FormLayout) -> FormLayout {
    layout
        .field("address_line_one", Widget::Text)
        .field("address_line_two", Widget::Text)
        .field("city", Widget::Text)
        .field("state", Widget::Text)
        .field("pin_code", Widget::Text)
}

fn address_property(developer_id: Id, data: &CleanedData) -> Result<NewProperty, FormError> {
    Ok(NewProperty::at_address(
        developer_id,
        data.require_text("address_line_one")?,
        data.text("address_line_two"),
        data.require_text("city")?,
        data.require_text("state")?,
        data.require_text("pin_code")?,
    ))
}

/// Full property entry: type, size, rooms and the builder.
pub struct PropertyForm;

impl PropertyForm {
    pub const ID: &'static str = "property-details";

    pub fn schema() -> FormSchema {
        let schema = FormSchema::new()
            .field(FieldSpec::required(
                "property_type",
                FieldKind::Choice(PropertyType::LABELS),
            ))
            .field(FieldSpec::required(
                "specifications",
                FieldKind::Choice(Specification::LABELS),
            ))
            .field(FieldSpec::required("built_up_area", FieldKind::Decimal))
            .field(FieldSpec::required("total_area", FieldKind::Decimal))
            .field(FieldSpec::required(
                "number_of_bedrooms",
                FieldKind::Choice(ROOM_COUNT_LABELS),
            ))
            .field(FieldSpec::required(
                "number_of_bathrooms",
                FieldKind::Choice(ROOM_COUNT_LABELS),
            ))
            .field(FieldSpec::required(
                "number_of_parking_spaces",
                FieldKind::Choice(ParkingSpaces::LABELS),
            ));
        with_address(schema).field(FieldSpec::required("developer", FieldKind::text(255)))
    }

    pub fn layout() -> FormLayout {
        let layout = FormLayout::new(Some(Self::ID))
            .without_csrf()
            .field("property_type", select(PropertyType::LABELS))
            .labelled("developer", Some("Builder Name"), Widget::Text);
        address_layout(layout)
            .field("number_of_bedrooms", select(ROOM_COUNT_LABELS))
            .field("number_of_bathrooms", select(ROOM_COUNT_LABELS))
            .field("number_of_parking_spaces", select(ParkingSpaces::LABELS))
            .field("specifications", select(Specification::LABELS))
            .field("built_up_area", Widget::AppendedText { suffix: "sq ft" })
            .field("total_area", Widget::AppendedText { suffix: "sq ft" })
            .submit("property-details", Some("submit-property-details"))
    }

    pub async fn submit<S: Store + ?Sized>(
        store: &S,
        input: &RawInput,
    ) -> Result<Property, FormError> {
        let data = validated(Self::ID, &Self::schema(), input)?;

        let developer = Resolver::new(store)
            .developer(&data.require_text("developer")?)
            .await?;

        let mut property = address_property(developer.id, &data)?;
        property.property_type = data.choice("property_type")?;
        property.specifications = data.choice("specifications")?;
        property.built_up_area = data.decimal("built_up_area");
        property.total_area = data.decimal("total_area");
        property.number_of_bedrooms = data.choice("number_of_bedrooms")?;
        property.number_of_bathrooms = data.choice("number_of_bathrooms")?;
        property.number_of_parking_spaces = data.choice("number_of_parking_spaces")?;

        let property = store.insert_property(property).await?;
        log::info!(
            "Saved property {} for developer {}",
            property.id,
            property.developer_id
        );
        Ok(property)
    }
}

/// Address-only entry that starts a property record.
pub struct PropertyBasicDetailsForm;

impl PropertyBasicDetailsForm {
    pub const ID: &'static str = "project-basic-details-form";

    pub fn schema() -> FormSchema {
        with_address(
            FormSchema::new().field(FieldSpec::required("developer_name", FieldKind::text(255))),
        )
    }

    pub fn layout() -> FormLayout {
        address_layout(FormLayout::new(Some(Self::ID)).field("developer_name", Widget::Text))
            .submit("Submit", None)
    }

    pub async fn submit<S: Store + ?Sized>(
        store: &S,
        input: &RawInput,
    ) -> Result<Property, FormError> {
        let data = validated(Self::ID, &Self::schema(), input)?;

        let developer = Resolver::new(store)
            .developer(&data.require_text("developer_name")?)
            .await?;
        let property = store
            .insert_property(address_property(developer.id, &data)?)
            .await?;

        log::info!(
            "Saved basic details for property {} (developer {})",
            property.id,
            developer.id
        );
        Ok(property)
    }
}

/// Neighbourhood notes on an existing property.
pub struct OtherDetailsForm;

impl OtherDetailsForm {
    pub const ID: &'static str = "other-details";

    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::optional("connectivity", FieldKind::text(255)))
            .field(FieldSpec::optional("neighborhood_quality", FieldKind::text(255)))
            .field(FieldSpec::optional(
                "comments",
                FieldKind::Text { max_length: None },
            ))
    }

    pub fn layout() -> FormLayout {
        FormLayout::new(None)
            .without_form_tag()
            .field("connectivity", Widget::Text)
            .field("neighborhood_quality", Widget::Text)
            .field("comments", Widget::Textarea)
            .submit("other-details", Some("submit-other-details"))
    }

    pub async fn submit<S: Store + ?Sized>(
        store: &S,
        property_id: Id,
        input: &RawInput,
    ) -> Result<Property, FormError> {
        let data = validated(Self::ID, &Self::schema(), input)?;
        let details = PropertyDetails {
            connectivity: data.text("connectivity"),
            neighborhood_quality: data.text("neighborhood_quality"),
            comments: data.text("comments"),
        };

        let property = store
            .update_property_details(property_id, details)
            .await?
            .ok_or(FormError::NotFound {
                entity: "Property",
                id: property_id,
            })?;

        log::info!("Updated other details of property {}", property.id);
        Ok(property)
    }
}
