use crate::model::Id;
use serde::{Deserialize, Serialize};

/// A named permission flag from the process-wide catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPermission {
    pub id: Id,
    pub project_id: Id,
    pub permission_id: Id,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProjectPermission {
    pub permission_id: Id,
    pub value: String,
}
