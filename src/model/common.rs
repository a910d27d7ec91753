use serde::{Deserialize, Serialize};

/// Store-assigned record identifier. Ids grow monotonically, so the lowest id
/// is also the oldest record.
pub type Id = i64;

/// A record paired with whether this call created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolved<T> {
    pub record: T,
    pub created: bool,
}

impl<T> Resolved<T> {
    pub fn existing(record: T) -> Self {
        Self {
            record,
            created: false,
        }
    }

    pub fn created(record: T) -> Self {
        Self {
            record,
            created: true,
        }
    }

    pub fn into_record(self) -> T {
        self.record
    }
}
