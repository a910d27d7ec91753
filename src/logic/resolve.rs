use crate::error::FormError;
use crate::model::{Bank, Developer, Owner, Resolved};
use crate::store::traits::Store;

/// Natural-key lookup for the records forms attach implicitly.
///
/// Each call returns the one canonical record for its key, creating it on first
/// use. Keys are matched exactly after trimming; a blank key cannot name a
/// record and is reported as a resolution failure.
pub struct Resolver<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn developer(&self, name: &str) -> Result<Developer, FormError> {
        let name = natural_key("developer", name)?;
        let resolved = self.store.get_or_create_developer(name).await?;
        Ok(logged("developer", resolved, |d| d.id))
    }

    /// Standalone bank lookup. A bank added through the project form is
    /// resolved inside `ProjectStore::create_project` instead, so that it
    /// shares the project's transaction.
    pub async fn bank(&self, name: &str) -> Result<Bank, FormError> {
        let name = natural_key("bank", name)?;
        let resolved = self.store.get_or_create_bank(name).await?;
        Ok(logged("bank", resolved, |b| b.id))
    }

    pub async fn owner(&self, name: &str, occupation: &str) -> Result<Owner, FormError> {
        let name = natural_key("owner", name)?;
        let occupation = natural_key("owner", occupation)?;
        let resolved = self.store.get_or_create_owner(name, occupation).await?;
        Ok(logged("owner", resolved, |o| o.id))
    }
}

fn natural_key<'k>(kind: &'static str, key: &'k str) -> Result<&'k str, FormError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(FormError::Resolution {
            kind,
            detail: "empty natural key".to_string(),
        });
    }
    Ok(key)
}

fn logged<T>(kind: &str, resolved: Resolved<T>, id: impl Fn(&T) -> i64) -> T {
    if resolved.created {
        log::info!("Created {} {}", kind, id(&resolved.record));
    } else {
        log::debug!("Resolved existing {} {}", kind, id(&resolved.record));
    }
    resolved.into_record()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BankStore, DeveloperStore, MemoryStore, OwnerStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn repeated_names_resolve_to_one_developer() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(&store);

        let first = resolver.developer("Acme Builders").await.unwrap();
        let second = resolver.developer(" Acme Builders ").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_developers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn owner_key_is_name_and_occupation() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(&store);

        let doctor = resolver.owner("John", "Doctor").await.unwrap();
        let engineer = resolver.owner("John", "Engineer").await.unwrap();
        let again = resolver.owner("John", "Doctor").await.unwrap();

        assert_ne!(doctor.id, engineer.id);
        assert_eq!(doctor.id, again.id);
        assert_eq!(store.list_owners().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_key_is_a_resolution_error() {
        let store = MemoryStore::new();
        let err = Resolver::new(&store).bank("   ").await.unwrap_err();
        assert!(matches!(err, FormError::Resolution { kind: "bank", .. }));
    }

    #[tokio::test]
    async fn bank_names_resolve_to_one_bank() {
        let store = MemoryStore::new();
        let resolver = Resolver::new(&store);

        let first = resolver.bank("HDFC").await.unwrap();
        let second = resolver.bank("HDFC ").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list_banks().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_converge_on_one_record_per_key() {
        let store = Arc::new(MemoryStore::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let resolver = Resolver::new(&*store);
                    let developer = resolver.developer("Acme").await.unwrap();
                    let bank = store.get_or_create_bank("HDFC").await.unwrap().record;
                    let owner = store
                        .get_or_create_owner("John", "Doctor")
                        .await
                        .unwrap()
                        .record;
                    (developer.id, bank.id, owner.id)
                })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }

        assert!(ids.iter().all(|found| *found == ids[0]));
        assert_eq!(store.list_developers().await.unwrap().len(), 1);
        assert_eq!(store.list_banks().await.unwrap().len(), 1);
        assert_eq!(store.list_owners().await.unwrap().len(), 1);
    }
}
