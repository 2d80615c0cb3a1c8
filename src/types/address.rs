use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Shipping address owned by one user. Orders never reference an address row;
/// they store the `snapshot()` string captured at placement time.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub recipient_name: String,
    pub phone: String,
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// One-line textual form stored into orders, immune to later edits.
    pub fn snapshot(&self) -> String {
        let mut out = format!(
            "{}, {}, {}",
            self.recipient_name, self.phone, self.street1
        );
        if let Some(street2) = &self.street2 {
            if !street2.trim().is_empty() {
                out.push_str(", ");
                out.push_str(street2);
            }
        }
        out.push_str(", ");
        out.push_str(&self.city);
        out.push_str(", ");
        out.push_str(&self.state);
        if let Some(zip) = &self.postal_code {
            if !zip.trim().is_empty() {
                out.push(' ');
                out.push_str(zip);
            }
        }
        out.push_str(", ");
        out.push_str(&self.country);
        out
    }
}
