use crate::model::{
    Bank, Developer, DeveloperProject, Id, NewDeveloperProject, NewOwner, NewProject,
    NewProjectPermission, NewProperty, Owner, Permission, Project, ProjectPermission, Property,
    PropertyDetails, Resolved, SavedProject,
};
use anyhow::Result;

// Get-or-create methods must be safe under concurrent calls with the same key:
// implementations enforce natural-key uniqueness themselves instead of relying
// on a read followed by a write.

#[async_trait::async_trait]
pub trait DeveloperStore: Send + Sync {
    async fn get_developer(&self, id: Id) -> Result<Option<Developer>>;
    async fn list_developers(&self) -> Result<Vec<Developer>>;
    /// Find the developer with this exact name, creating it if absent.
    async fn get_or_create_developer(&self, name: &str) -> Result<Resolved<Developer>>;
}

#[async_trait::async_trait]
pub trait BankStore: Send + Sync {
    async fn get_bank(&self, id: Id) -> Result<Option<Bank>>;
    async fn list_banks(&self) -> Result<Vec<Bank>>;
    async fn get_or_create_bank(&self, name: &str) -> Result<Resolved<Bank>>;
}

#[async_trait::async_trait]
pub trait OwnerStore: Send + Sync {
    async fn get_owner(&self, id: Id) -> Result<Option<Owner>>;
    async fn list_owners(&self) -> Result<Vec<Owner>>;
    async fn insert_owner(&self, owner: NewOwner) -> Result<Owner>;
    /// Match on (name, occupation). Historical duplicates resolve to the lowest id.
    async fn get_or_create_owner(&self, name: &str, occupation: &str) -> Result<Resolved<Owner>>;
}

#[async_trait::async_trait]
pub trait PropertyStore: Send + Sync {
    async fn get_property(&self, id: Id) -> Result<Option<Property>>;
    async fn list_properties(&self) -> Result<Vec<Property>>;
    async fn insert_property(&self, property: NewProperty) -> Result<Property>;
    /// Replace the neighbourhood notes. Returns `None` for an unknown property.
    async fn update_property_details(
        &self,
        id: Id,
        details: PropertyDetails,
    ) -> Result<Option<Property>>;
}

#[async_trait::async_trait]
pub trait DeveloperProjectStore: Send + Sync {
    async fn get_developer_project(&self, id: Id) -> Result<Option<DeveloperProject>>;
    async fn insert_developer_project(
        &self,
        project: NewDeveloperProject,
    ) -> Result<DeveloperProject>;
}

#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_project(&self, id: Id) -> Result<Option<Project>>;
    async fn list_projects(&self) -> Result<Vec<Project>>;
    /// Insert the project, its bank associations and the optional new bank as one
    /// atomic write.
    async fn create_project(&self, project: NewProject) -> Result<SavedProject>;
}

#[async_trait::async_trait]
pub trait PermissionStore: Send + Sync {
    async fn list_permissions(&self) -> Result<Vec<Permission>>;
    async fn define_permission(&self, name: &str) -> Result<Resolved<Permission>>;
    /// Insert every row for one project atomically, in the given order.
    async fn insert_project_permissions(
        &self,
        project_id: Id,
        rows: Vec<NewProjectPermission>,
    ) -> Result<Vec<ProjectPermission>>;
    async fn list_project_permissions(&self, project_id: Id) -> Result<Vec<ProjectPermission>>;
}

pub trait Store:
    DeveloperStore
    + BankStore
    + OwnerStore
    + PropertyStore
    + DeveloperProjectStore
    + ProjectStore
    + PermissionStore
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: DeveloperStore
        + BankStore
        + OwnerStore
        + PropertyStore
        + DeveloperProjectStore
        + ProjectStore
        + PermissionStore
        + Send
        + Sync
{
}
