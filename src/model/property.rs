use crate::model::{Id, ParkingSpaces, PropertyType, Specification};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: Id,
    pub developer_id: Id,
    pub address_line_one: String,
    pub address_line_two: Option<String>,
    pub city: String,
    pub state: String,
    pub pin_code: String,
    // Filled by the full property form; the basic-details form leaves them empty.
    pub property_type: Option<PropertyType>,
    pub specifications: Option<Specification>,
    pub built_up_area: Option<f64>,
    pub total_area: Option<f64>,
    pub number_of_bedrooms: Option<i32>,
    pub number_of_bathrooms: Option<i32>,
    pub number_of_parking_spaces: Option<ParkingSpaces>,
    #[serde(flatten)]
    pub details: PropertyDetails,
}

/// Free-form neighbourhood notes, edited separately from the main record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub connectivity: Option<String>,
    pub neighborhood_quality: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub developer_id: Id,
    pub address_line_one: String,
    pub address_line_two: Option<String>,
    pub city: String,
    pub state: String,
    pub pin_code: String,
    pub property_type: Option<PropertyType>,
    pub specifications: Option<Specification>,
    pub built_up_area: Option<f64>,
    pub total_area: Option<f64>,
    pub number_of_bedrooms: Option<i32>,
    pub number_of_bathrooms: Option<i32>,
    pub number_of_parking_spaces: Option<ParkingSpaces>,
}

impl NewProperty {
    /// Property with an address only, as captured by the basic-details form.
    pub fn at_address(
        developer_id: Id,
        address_line_one: String,
        address_line_two: Option<String>,
        city: String,
        state: String,
        pin_code: String,
    ) -> Self {
        Self {
            developer_id,
            address_line_one,
            address_line_two,
            city,
            state,
            pin_code,
            property_type: None,
            specifications: None,
            built_up_area: None,
            total_area: None,
            number_of_bedrooms: None,
            number_of_bathrooms: None,
            number_of_parking_spaces: None,
        }
    }

    pub fn into_record(self, id: Id) -> Property {
        Property {
            id,
            developer_id: self.developer_id,
            address_line_one: self.address_line_one,
            address_line_two: self.address_line_two,
            city: self.city,
            state: self.state,
            pin_code: self.pin_code,
            property_type: self.property_type,
            specifications: self.specifications,
            built_up_area: self.built_up_area,
            total_area: self.total_area,
            number_of_bedrooms: self.number_of_bedrooms,
            number_of_bathrooms: self.number_of_bathrooms,
            number_of_parking_spaces: self.number_of_parking_spaces,
            details: PropertyDetails::default(),
        }
    }
}
