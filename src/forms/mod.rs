//! Data-entry forms. Each form is a unit struct exposing its field schema, its
//! presentation layout and a `submit` that validates raw input, resolves the
//! records it refers to by name and persists the result.

pub mod developer_project;
pub mod layout;
pub mod owner;
pub mod permission;
pub mod project;
pub mod property;

pub use developer_project::*;
pub use layout::*;
pub use owner::*;
pub use permission::*;
pub use project::*;
pub use property::*;

use std::str::FromStr;

use crate::error::FormError;
use crate::logic::validate::{CleanedData, FormSchema, RawInput, ValidationErrors};
use crate::model::Permission;

/// Every form the service can render, addressed by URL slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Property,
    PropertyBasic,
    OtherDetails,
    Owner,
    DeveloperProject,
    Project,
    Permissions,
}

impl FormKind {
    pub const ALL: [FormKind; 7] = [
        FormKind::Property,
        FormKind::PropertyBasic,
        FormKind::OtherDetails,
        FormKind::Owner,
        FormKind::DeveloperProject,
        FormKind::Project,
        FormKind::Permissions,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            FormKind::Property => "property",
            FormKind::PropertyBasic => "property-basic",
            FormKind::OtherDetails => "other-details",
            FormKind::Owner => "owner",
            FormKind::DeveloperProject => "developer-project",
            FormKind::Project => "project",
            FormKind::Permissions => "permissions",
        }
    }

    /// The permission form is shaped by the catalog, so it is passed in.
    pub fn schema(&self, catalog: &[Permission]) -> FormSchema {
        match self {
            FormKind::Property => PropertyForm::schema(),
            FormKind::PropertyBasic => PropertyBasicDetailsForm::schema(),
            FormKind::OtherDetails => OtherDetailsForm::schema(),
            FormKind::Owner => OwnerForm::schema(),
            FormKind::DeveloperProject => DeveloperProjectForm::schema(),
            FormKind::Project => ProjectForm::schema(),
            FormKind::Permissions => PermissionForm::schema(catalog),
        }
    }

    pub fn layout(&self, catalog: &[Permission]) -> FormLayout {
        match self {
            FormKind::Property => PropertyForm::layout(),
            FormKind::PropertyBasic => PropertyBasicDetailsForm::layout(),
            FormKind::OtherDetails => OtherDetailsForm::layout(),
            FormKind::Owner => OwnerForm::layout(),
            FormKind::DeveloperProject => DeveloperProjectForm::layout(),
            FormKind::Project => ProjectForm::layout(),
            FormKind::Permissions => PermissionForm::layout(catalog),
        }
    }
}

impl FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("Unknown form '{}'", s))
    }
}

/// Run schema validation, logging rejections.
pub(crate) fn validated(
    form: &str,
    schema: &FormSchema,
    input: &RawInput,
) -> Result<CleanedData, FormError> {
    schema.validate(input).map_err(|errors| rejected(form, errors))
}

pub(crate) fn rejected(form: &str, errors: ValidationErrors) -> FormError {
    log::debug!("{} rejected: {}", form, errors);
    FormError::Invalid(errors)
}

/// Narrow a cleaned integer, reporting overflow against the field.
pub(crate) fn small_int(data: &CleanedData, field: &str) -> Result<i32, FormError> {
    let value = data.require_integer(field)?;
    i32::try_from(value).map_err(|_| {
        FormError::Invalid(ValidationErrors::single(
            field,
            format!("Ensure this value is less than or equal to {}.", i32::MAX),
        ))
    })
}
