use serde::{Deserialize, Serialize};

/// Organization profile attached to a user, used for prompt context and
/// domain-scoped graph lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub organization_name: String,
    pub location: String,
    /// Business domain, e.g. "Healthcare".
    pub domain: String,
}
