use serde::{Deserialize, Serialize};

use super::role::Role;

pub const PLACEHOLDER_PHOTO_URL: &str = "https://via.placeholder.com/40x40/10B981/FFFFFF?text=U";

/// User profile. `email` and `role` belong to IAM and are overlaid from the
/// session when the profile is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub email: String,
    pub username: String,
    pub address: String,
    pub age: u32,
    pub phone_number: String,
    pub second_email: String,
    pub photo_url: String,
    pub role: Option<Role>,
}

impl Profile {
    /// The photo to show, or a generic avatar when none is set.
    pub fn display_photo_url(&self) -> &str {
        if self.photo_url.trim().is_empty() {
            PLACEHOLDER_PHOTO_URL
        } else {
            &self.photo_url
        }
    }

    /// Which dashboard flavour to show for this profile.
    pub fn view_type(&self) -> Role {
        self.role.unwrap_or(Role::Builder)
    }
}
