pub mod integrations;
pub mod sites;

pub use integrations::{Integration, NotifyOn};
pub use sites::Site;

/// Parse a caller-supplied site identifier as the UUID it's stored as.
/// Identifiers which aren't UUIDs cannot match any row, and map to None.
pub fn parse_site_id(site_id: &str) -> Option<uuid::Uuid> {
    match uuid::Uuid::parse_str(site_id.trim()) {
        Ok(id) => Some(id),
        Err(error) => {
            tracing::debug!(site_id, %error, "site id is not a UUID");
            None
        }
    }
}
