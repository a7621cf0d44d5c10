//! Cached user profile.

use serde::{Deserialize, Serialize};

/// The authenticated identity as last reported by the provider.
///
/// This is a cache: it may be stale, and losing it never ends a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserProfile {
    /// Fill in `name` from the first and last name when the provider omitted it.
    pub fn with_derived_name(mut self) -> Self {
        if self.name.is_empty() {
            self.name = format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_when_missing() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "emily.johnson@x.dummyjson.com",
            "username": "emilys",
            "firstName": "Emily",
            "lastName": "Johnson"
        }))
        .unwrap();

        let profile = profile.with_derived_name();
        assert_eq!(profile.name, "Emily Johnson");
        assert_eq!(profile.image, None);
    }

    #[test]
    fn keeps_existing_name() {
        let profile = UserProfile {
            id: 2,
            email: "a@b.c".into(),
            name: "Preferred".into(),
            username: "ab".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            image: None,
        };
        assert_eq!(profile.with_derived_name().name, "Preferred");
    }
}
