//! Strongly-typed identifier value objects.
//!
//! Every entity the divergence engine touches is keyed by a UUID wrapped in
//! its own newtype, so a `QuestionId` can never be passed where a
//! `CampaignId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
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

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a campaign (a company-scoped questionnaire distribution).
    CampaignId
);

uuid_id!(
    /// Identifier of a question in the question bank.
    QuestionId
);

uuid_id!(
    /// Identifier of an end-user answering assigned questions.
    RespondentId
);

uuid_id!(
    /// Identifier of a (campaign, question, respondent) assignment.
    AssignmentId
);

uuid_id!(
    /// Identifier of a divergence alert.
    AlertId
);

uuid_id!(
    /// Identifier of a back-office administrator.
    AdminId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(CampaignId::new(), CampaignId::new());
        assert_ne!(AlertId::new(), AlertId::new());
    }

    #[test]
    fn id_parses_from_its_display_form() {
        let id = QuestionId::new();
        let parsed: QuestionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_rejects_malformed_input() {
        assert!("not-a-uuid".parse::<RespondentId>().is_err());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = AdminId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
