//! Core identifier and role types for the Gravy marketplace.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn from_uuid(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Brand profile identifier
    BrandId
}

uuid_id! {
    /// Creator profile identifier
    CreatorId
}

uuid_id! {
    /// Campaign identifier
    CampaignId
}

uuid_id! {
    /// Proposal identifier
    ProposalId
}

uuid_id! {
    /// Payment identifier
    PaymentId
}

/// Role carried by an authenticated principal.
///
/// The identity provider is external; this service only consumes `{email, role}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Brand,
    Creator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Brand => write!(f, "BRAND"),
            Role::Creator => write!(f, "CREATOR"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BRAND" => Ok(Role::Brand),
            "CREATOR" => Ok(Role::Creator),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_roundtrip() {
        let id = CampaignId::new();
        let parsed = uuid::Uuid::parse_str(&id.to_string()).unwrap();
        assert_eq!(id, CampaignId::from_uuid(parsed));
    }

    #[test]
    fn role_parse() {
        assert_eq!("brand".parse::<Role>().unwrap(), Role::Brand);
        assert_eq!("CREATOR".parse::<Role>().unwrap(), Role::Creator);
        assert!("admin".parse::<Role>().is_err());
    }
}
