use crate::model::Id;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    pub launch_date: NaiveDate,
    pub possession_date: NaiveDate,
    /// Associated banks, ascending by id.
    pub bank_ids: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub launch_date: NaiveDate,
    pub possession_date: NaiveDate,
    /// Existing banks to associate.
    pub bank_ids: Vec<Id>,
    /// Name of a bank to get-or-create and associate in the same write.
    pub new_bank: Option<String>,
}

/// Outcome of persisting a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProject {
    pub project: Project,
    /// The bank requested through `new_bank`, if any.
    pub added_bank: Option<Bank>,
}
