//! Enumerated field values. Each enum serializes as its display label, which is
//! also the exact string a form accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice(pub String);

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not one of the available choices", self.0)
    }
}

impl std::error::Error for UnknownChoice {}

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(UnknownChoice(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum!(
    /// Calendar month used by developer project launch and possession dates.
    Month {
        January => "January",
        February => "February",
        March => "March",
        April => "April",
        May => "May",
        June => "June",
        July => "July",
        August => "August",
        September => "September",
        October => "October",
        November => "November",
        December => "December",
    }
);

choice_enum!(
    PropertyType {
        Apartment => "Apartment",
        TownHome => "Town Home",
        SingleFamilyHouse => "Single Family House",
        Land => "Land",
    }
);

choice_enum!(
    /// Finish tier of a property.
    Specification {
        Basic => "Basic",
        Premium => "Premium",
        Luxury => "Luxury",
    }
);

choice_enum!(
    ParkingSpaces {
        One => "1",
        Two => "2",
        ThreeOrMore => "3+",
    }
);

/// Accepted bedroom and bathroom counts.
pub const ROOM_COUNT_LABELS: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"];

/// How an owner acquired the property. Stored as the `is_resale` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResaleChoice {
    #[serde(rename = "Re-Sale")]
    ReSale,
    #[serde(rename = "Direct Builder")]
    DirectBuilder,
}

impl ResaleChoice {
    pub const RESALE_LABEL: &'static str = "Re-Sale";
    pub const DIRECT_LABEL: &'static str = "Direct Builder";

    pub fn from_flag(is_resale: bool) -> Self {
        if is_resale {
            Self::ReSale
        } else {
            Self::DirectBuilder
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ReSale => Self::RESALE_LABEL,
            Self::DirectBuilder => Self::DIRECT_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for label in PropertyType::LABELS {
            let parsed: PropertyType = label.parse().unwrap();
            assert_eq!(parsed.label(), *label);
        }
        assert_eq!("3+".parse::<ParkingSpaces>(), Ok(ParkingSpaces::ThreeOrMore));
        assert!("4".parse::<ParkingSpaces>().is_err());
        assert!("Townhome".parse::<PropertyType>().is_err());
    }

    #[test]
    fn month_labels_cover_the_year() {
        assert_eq!(Month::LABELS.len(), 12);
        assert_eq!("December".parse::<Month>(), Ok(Month::December));
    }

    #[test]
    fn choices_serialize_as_labels() {
        let json = serde_json::to_string(&PropertyType::SingleFamilyHouse).unwrap();
        assert_eq!(json, "\"Single Family House\"");
        let json = serde_json::to_string(&ResaleChoice::from_flag(true)).unwrap();
        assert_eq!(json, "\"Re-Sale\"");
    }
}
