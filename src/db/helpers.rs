use chrono::{DateTime, Utc};
use ulid::Ulid;

/// Fresh primary key for any table.
pub fn new_id() -> String {
    Ulid::new().to_string()
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
