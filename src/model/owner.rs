use crate::model::{Id, ResaleChoice};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Id,
    pub name: String,
    pub occupation: String,
    pub pan_number: Option<String>,
    pub date_of_purchase: Option<NaiveDate>,
    pub loan_from: Option<String>,
    pub cost_of_purchase: Option<f64>,
    pub is_resale: bool,
    pub name_of_seller: Option<String>,
    pub contact_number_seller: Option<String>,
    pub email_seller: Option<String>,
    pub co_owner_id: Option<Id>,
}

impl Owner {
    pub fn purchase_kind(&self) -> ResaleChoice {
        ResaleChoice::from_flag(self.is_resale)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOwner {
    pub name: String,
    pub occupation: String,
    pub pan_number: Option<String>,
    pub date_of_purchase: Option<NaiveDate>,
    pub loan_from: Option<String>,
    pub cost_of_purchase: Option<f64>,
    pub is_resale: bool,
    pub name_of_seller: Option<String>,
    pub contact_number_seller: Option<String>,
    pub email_seller: Option<String>,
    pub co_owner_id: Option<Id>,
}

impl NewOwner {
    /// Owner known only by name and occupation, as created for a co-owner.
    pub fn named(name: impl Into<String>, occupation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            occupation: occupation.into(),
            pan_number: None,
            date_of_purchase: None,
            loan_from: None,
            cost_of_purchase: None,
            is_resale: false,
            name_of_seller: None,
            contact_number_seller: None,
            email_seller: None,
            co_owner_id: None,
        }
    }

    pub fn into_record(self, id: Id) -> Owner {
        Owner {
            id,
            name: self.name,
            occupation: self.occupation,
            pan_number: self.pan_number,
            date_of_purchase: self.date_of_purchase,
            loan_from: self.loan_from,
            cost_of_purchase: self.cost_of_purchase,
            is_resale: self.is_resale,
            name_of_seller: self.name_of_seller,
            contact_number_seller: self.contact_number_seller,
            email_seller: self.email_seller,
            co_owner_id: self.co_owner_id,
        }
    }
}
