use crate::store::traits::Store;
use anyhow::{Context, Result};

/// Define every catalog permission that does not exist yet. Returns how many
/// were created.
pub async fn load_permission_catalog<S: Store + ?Sized>(store: &S, catalog: &[String]) -> Result<usize> {
    let mut created = 0;
    for name in catalog.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let resolved = store
            .define_permission(name)
            .await
            .with_context(|| format!("Failed to define permission '{}'", name))?;
        if resolved.created {
            log::info!("Defined permission '{}'", name);
            created += 1;
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PermissionStore};

    #[tokio::test]
    async fn catalog_loading_is_repeatable() {
        let store = MemoryStore::new();
        let catalog = vec!["RERA Approved".to_string(), " ".to_string(), "Fire NOC".to_string()];

        assert_eq!(load_permission_catalog(&store, &catalog).await.unwrap(), 2);
        assert_eq!(load_permission_catalog(&store, &catalog).await.unwrap(), 0);
        assert_eq!(store.list_permissions().await.unwrap().len(), 2);
    }
}
