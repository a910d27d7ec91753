use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{
    Bank, Developer, DeveloperProject, Id, NewDeveloperProject, NewOwner, NewProject,
    NewProjectPermission, NewProperty, Owner, Permission, Project, ProjectPermission, Property,
    PropertyDetails, Resolved, SavedProject,
};
use crate::store::traits::{
    BankStore, DeveloperProjectStore, DeveloperStore, OwnerStore, PermissionStore, ProjectStore,
    PropertyStore,
};

/// Process-local store. Every operation takes the single table lock once, so
/// get-or-create and multi-row writes are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: Id,
    developers: BTreeMap<Id, Developer>,
    banks: BTreeMap<Id, Bank>,
    owners: BTreeMap<Id, Owner>,
    properties: BTreeMap<Id, Property>,
    developer_projects: BTreeMap<Id, DeveloperProject>,
    projects: BTreeMap<Id, ProjectRow>,
    permissions: BTreeMap<Id, Permission>,
    project_permissions: BTreeMap<Id, ProjectPermission>,
}

#[derive(Debug, Clone)]
struct ProjectRow {
    name: String,
    launch_date: chrono::NaiveDate,
    possession_date: chrono::NaiveDate,
    banks: BTreeSet<Id>,
}

impl Tables {
    // One sequence for all tables keeps ids unique and increasing.
    fn allocate_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn bank_by_name(&mut self, name: &str) -> Resolved<Bank> {
        if let Some(bank) = self.banks.values().find(|b| b.name == name) {
            return Resolved::existing(bank.clone());
        }
        let bank = Bank {
            id: self.allocate_id(),
            name: name.to_string(),
        };
        self.banks.insert(bank.id, bank.clone());
        Resolved::created(bank)
    }

    fn project(&self, id: Id) -> Option<Project> {
        self.projects.get(&id).map(|row| Project {
            id,
            name: row.name.clone(),
            launch_date: row.launch_date,
            possession_date: row.possession_date,
            bank_ids: row.banks.iter().copied().collect(),
        })
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DeveloperStore for MemoryStore {
    async fn get_developer(&self, id: Id) -> Result<Option<Developer>> {
        Ok(self.tables.read().developers.get(&id).cloned())
    }

    async fn list_developers(&self) -> Result<Vec<Developer>> {
        Ok(self.tables.read().developers.values().cloned().collect())
    }

    async fn get_or_create_developer(&self, name: &str) -> Result<Resolved<Developer>> {
        let mut tables = self.tables.write();
        if let Some(dev) = tables.developers.values().find(|d| d.name == name) {
            return Ok(Resolved::existing(dev.clone()));
        }
        let developer = Developer {
            id: tables.allocate_id(),
            name: name.to_string(),
        };
        tables.developers.insert(developer.id, developer.clone());
        Ok(Resolved::created(developer))
    }
}

#[async_trait::async_trait]
impl BankStore for MemoryStore {
    async fn get_bank(&self, id: Id) -> Result<Option<Bank>> {
        Ok(self.tables.read().banks.get(&id).cloned())
    }

    async fn list_banks(&self) -> Result<Vec<Bank>> {
        Ok(self.tables.read().banks.values().cloned().collect())
    }

    async fn get_or_create_bank(&self, name: &str) -> Result<Resolved<Bank>> {
        Ok(self.tables.write().bank_by_name(name))
    }
}

#[async_trait::async_trait]
impl OwnerStore for MemoryStore {
    async fn get_owner(&self, id: Id) -> Result<Option<Owner>> {
        Ok(self.tables.read().owners.get(&id).cloned())
    }

    async fn list_owners(&self) -> Result<Vec<Owner>> {
        Ok(self.tables.read().owners.values().cloned().collect())
    }

    async fn insert_owner(&self, owner: NewOwner) -> Result<Owner> {
        let mut tables = self.tables.write();
        if let Some(co_owner_id) = owner.co_owner_id {
            if !tables.owners.contains_key(&co_owner_id) {
                return Err(anyhow!("Co-owner {} does not exist", co_owner_id));
            }
        }
        let owner = owner.into_record(tables.allocate_id());
        tables.owners.insert(owner.id, owner.clone());
        Ok(owner)
    }

    async fn get_or_create_owner(&self, name: &str, occupation: &str) -> Result<Resolved<Owner>> {
        let mut tables = self.tables.write();
        // BTreeMap iteration is ascending by id, so the first match is the oldest.
        if let Some(owner) = tables
            .owners
            .values()
            .find(|o| o.name == name && o.occupation == occupation)
        {
            return Ok(Resolved::existing(owner.clone()));
        }
        let owner = NewOwner::named(name, occupation).into_record(tables.allocate_id());
        tables.owners.insert(owner.id, owner.clone());
        Ok(Resolved::created(owner))
    }
}

#[async_trait::async_trait]
impl PropertyStore for MemoryStore {
    async fn get_property(&self, id: Id) -> Result<Option<Property>> {
        Ok(self.tables.read().properties.get(&id).cloned())
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        Ok(self.tables.read().properties.values().cloned().collect())
    }

    async fn insert_property(&self, property: NewProperty) -> Result<Property> {
        let mut tables = self.tables.write();
        if !tables.developers.contains_key(&property.developer_id) {
            return Err(anyhow!("Developer {} does not exist", property.developer_id));
        }
        let property = property.into_record(tables.allocate_id());
        tables.properties.insert(property.id, property.clone());
        Ok(property)
    }

    async fn update_property_details(
        &self,
        id: Id,
        details: PropertyDetails,
    ) -> Result<Option<Property>> {
        let mut tables = self.tables.write();
        let Some(property) = tables.properties.get_mut(&id) else {
            return Ok(None);
        };
        property.details = details;
        Ok(Some(property.clone()))
    }
}

#[async_trait::async_trait]
impl DeveloperProjectStore for MemoryStore {
    async fn get_developer_project(&self, id: Id) -> Result<Option<DeveloperProject>> {
        Ok(self.tables.read().developer_projects.get(&id).cloned())
    }

    async fn insert_developer_project(
        &self,
        project: NewDeveloperProject,
    ) -> Result<DeveloperProject> {
        let mut tables = self.tables.write();
        if !tables.developers.contains_key(&project.developer_id) {
            return Err(anyhow!("Developer {} does not exist", project.developer_id));
        }
        let project = project.into_record(tables.allocate_id());
        tables.developer_projects.insert(project.id, project.clone());
        Ok(project)
    }
}

#[async_trait::async_trait]
impl ProjectStore for MemoryStore {
    async fn get_project(&self, id: Id) -> Result<Option<Project>> {
        Ok(self.tables.read().project(id))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let tables = self.tables.read();
        Ok(tables
            .projects
            .keys()
            .filter_map(|id| tables.project(*id))
            .collect())
    }

    async fn create_project(&self, project: NewProject) -> Result<SavedProject> {
        let mut tables = self.tables.write();

        // Check everything before the first mutation so a failure leaves no trace.
        if let Some(missing) = project
            .bank_ids
            .iter()
            .find(|id| !tables.banks.contains_key(*id))
        {
            return Err(anyhow!("Bank {} does not exist", missing));
        }

        let id = tables.allocate_id();
        let mut banks: BTreeSet<Id> = project.bank_ids.iter().copied().collect();
        let added_bank = project
            .new_bank
            .as_deref()
            .map(|name| tables.bank_by_name(name).into_record());
        if let Some(bank) = &added_bank {
            banks.insert(bank.id);
        }

        tables.projects.insert(
            id,
            ProjectRow {
                name: project.name,
                launch_date: project.launch_date,
                possession_date: project.possession_date,
                banks,
            },
        );

        let project = tables
            .project(id)
            .ok_or_else(|| anyhow!("Project {} vanished after insert", id))?;
        Ok(SavedProject {
            project,
            added_bank,
        })
    }
}

#[async_trait::async_trait]
impl PermissionStore for MemoryStore {
    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        Ok(self.tables.read().permissions.values().cloned().collect())
    }

    async fn define_permission(&self, name: &str) -> Result<Resolved<Permission>> {
        let mut tables = self.tables.write();
        if let Some(permission) = tables.permissions.values().find(|p| p.name == name) {
            return Ok(Resolved::existing(permission.clone()));
        }
        let permission = Permission {
            id: tables.allocate_id(),
            name: name.to_string(),
        };
        tables.permissions.insert(permission.id, permission.clone());
        Ok(Resolved::created(permission))
    }

    async fn insert_project_permissions(
        &self,
        project_id: Id,
        rows: Vec<NewProjectPermission>,
    ) -> Result<Vec<ProjectPermission>> {
        let mut tables = self.tables.write();
        if !tables.projects.contains_key(&project_id) {
            return Err(anyhow!("Project {} does not exist", project_id));
        }
        if let Some(row) = rows
            .iter()
            .find(|r| !tables.permissions.contains_key(&r.permission_id))
        {
            return Err(anyhow!("Permission {} does not exist", row.permission_id));
        }

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let record = ProjectPermission {
                id: tables.allocate_id(),
                project_id,
                permission_id: row.permission_id,
                value: row.value,
            };
            tables.project_permissions.insert(record.id, record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn list_project_permissions(&self, project_id: Id) -> Result<Vec<ProjectPermission>> {
        Ok(self
            .tables
            .read()
            .project_permissions
            .values()
            .filter(|p| p.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_project(bank_ids: Vec<Id>, new_bank: Option<&str>) -> NewProject {
        NewProject {
            name: "Lakeview".to_string(),
            launch_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            possession_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            bank_ids,
            new_bank: new_bank.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn developer_get_or_create_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.get_or_create_developer("Acme").await.unwrap();
        let second = store.get_or_create_developer("Acme").await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.record.id, second.record.id);
        assert_eq!(store.list_developers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn owner_lookup_prefers_lowest_id_among_duplicates() {
        let store = MemoryStore::new();
        let older = store.insert_owner(NewOwner::named("John", "Doctor")).await.unwrap();
        store.insert_owner(NewOwner::named("John", "Doctor")).await.unwrap();

        let resolved = store.get_or_create_owner("John", "Doctor").await.unwrap();
        assert!(!resolved.created);
        assert_eq!(resolved.record.id, older.id);
    }

    #[tokio::test]
    async fn create_project_with_unknown_bank_writes_nothing() {
        let store = MemoryStore::new();
        let result = store.create_project(new_project(vec![999], Some("HDFC"))).await;

        assert!(result.is_err());
        assert!(store.list_projects().await.unwrap().is_empty());
        assert!(store.list_banks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_project_associates_existing_and_new_banks() {
        let store = MemoryStore::new();
        let existing = store.get_or_create_bank("SBI").await.unwrap().record;

        let saved = store
            .create_project(new_project(vec![existing.id], Some("HDFC")))
            .await
            .unwrap();

        let added = saved.added_bank.unwrap();
        assert_eq!(added.name, "HDFC");
        assert_eq!(saved.project.bank_ids, vec![existing.id, added.id]);
    }

    #[tokio::test]
    async fn project_permissions_require_known_project() {
        let store = MemoryStore::new();
        let permission = store.define_permission("RERA").await.unwrap().record;
        let rows = vec![NewProjectPermission {
            permission_id: permission.id,
            value: "yes".to_string(),
        }];

        assert!(store.insert_project_permissions(42, rows).await.is_err());
    }
}
