use crate::model::{Id, Month};
use serde::{Deserialize, Serialize};

/// A builder, identified by its unique name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Developer {
    pub id: Id,
    pub name: String,
}

/// A project announced by a developer, dated by month and year only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperProject {
    pub id: Id,
    pub developer_id: Id,
    pub project_name: String,
    pub launch_date_month: Month,
    pub launch_date_year: i32,
    pub possession_date_month: Month,
    pub possession_date_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeveloperProject {
    pub developer_id: Id,
    pub project_name: String,
    pub launch_date_month: Month,
    pub launch_date_year: i32,
    pub possession_date_month: Month,
    pub possession_date_year: i32,
}

impl NewDeveloperProject {
    pub fn into_record(self, id: Id) -> DeveloperProject {
        DeveloperProject {
            id,
            developer_id: self.developer_id,
            project_name: self.project_name,
            launch_date_month: self.launch_date_month,
            launch_date_year: self.launch_date_year,
            possession_date_month: self.possession_date_month,
            possession_date_year: self.possession_date_year,
        }
    }
}
