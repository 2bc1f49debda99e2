use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Platform role. Builders manage projects and devices; owners view their
/// own units.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Builder,
    #[default]
    Owner,
}

impl Role {
    /// Parse a backend role string. Unknown or empty values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    pub fn is_builder(self) -> bool {
        self == Self::Builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("Builder"), Some(Role::Builder));
        assert_eq!(Role::parse("OWNER"), Some(Role::Owner));
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("admin"), None);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Role::Builder.to_string(), "builder");
        assert_eq!(Role::default(), Role::Owner);
    }
}
