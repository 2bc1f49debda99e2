use iobuilt_api::models::{ProfileResource, UserDetailResource};

use crate::model::{Profile, Role};

/// Some records carry the literal string "undefined" for a missing photo.
fn clean_photo(raw: Option<String>) -> String {
    raw.filter(|url| url != "undefined").unwrap_or_default()
}

impl From<ProfileResource> for Profile {
    fn from(r: ProfileResource) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            user_id: r.user_id.unwrap_or_default(),
            name: r.name.unwrap_or_default(),
            email: r.email.unwrap_or_default(),
            username: r.username.unwrap_or_default(),
            address: r.address.unwrap_or_default(),
            age: r.age.unwrap_or_default(),
            phone_number: r.phone_number.unwrap_or_default(),
            second_email: r.second_email.unwrap_or_default(),
            photo_url: clean_photo(r.photo_url),
            role: r.role.as_deref().and_then(Role::parse),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

/// Only the `user_details` columns; identity fields stay with IAM.
impl From<&Profile> for UserDetailResource {
    fn from(p: &Profile) -> Self {
        Self {
            id: (p.id != 0).then_some(p.id),
            user_id: (p.user_id != 0).then_some(p.user_id),
            name: non_empty(&p.name),
            username: non_empty(&p.username),
            address: non_empty(&p.address),
            age: (p.age != 0).then_some(p.age),
            phone_number: non_empty(&p.phone_number),
            second_email: non_empty(&p.second_email),
            photo_url: non_empty(&p.photo_url),
        }
    }
}

/// A bare detail row, as echoed back by create/update. Identity fields
/// (email, role) are left empty for the caller to overlay.
impl From<UserDetailResource> for Profile {
    fn from(d: UserDetailResource) -> Self {
        Self {
            id: d.id.unwrap_or_default(),
            user_id: d.user_id.unwrap_or_default(),
            name: d.name.unwrap_or_default(),
            username: d.username.unwrap_or_default(),
            address: d.address.unwrap_or_default(),
            age: d.age.unwrap_or_default(),
            phone_number: d.phone_number.unwrap_or_default(),
            second_email: d.second_email.unwrap_or_default(),
            photo_url: clean_photo(d.photo_url),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_photo_is_dropped() {
        let profile = Profile::from(ProfileResource {
            photo_url: Some("undefined".into()),
            ..ProfileResource::default()
        });
        assert!(profile.photo_url.is_empty());
    }

    #[test]
    fn detail_round_trip_keeps_personal_fields() {
        let profile = Profile {
            id: 2,
            user_id: 7,
            name: "Ana Ruiz".into(),
            username: "ana".into(),
            address: "Av. Siempre Viva 742".into(),
            age: 34,
            phone_number: "555-0101".into(),
            second_email: "ana@alt.com".into(),
            photo_url: "https://cdn.test/ana.png".into(),
            ..Profile::default()
        };
        let detail = UserDetailResource::from(&profile);
        let back = Profile::from(ProfileResource::merge(Default::default(), Some(detail)));
        assert_eq!(back.id, profile.id);
        assert_eq!(back.name, profile.name);
        assert_eq!(back.age, profile.age);
        assert_eq!(back.second_email, profile.second_email);
        assert_eq!(back.photo_url, profile.photo_url);
    }
}
