//! Scoreable record fields.
//!
//! [`FieldName`] is a closed set: the administrative community-leader
//! fields carried on [`crate::Record`] have no variant here, so they cannot
//! be weighted or scored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Keys of the administrative community-leader name fields.
///
/// These are part of a record but never take part in matching.
pub const EXCLUDED_FIELD_KEYS: [&str; 3] = [
    "communityLeaderFirstName",
    "communityLeaderMiddleName",
    "communityLeaderLastName",
];

/// How a field is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Equality after normalization.
    Exact,
    /// Edit-distance similarity when fuzzy matching is enabled.
    Fuzzy,
    /// Multi-format date comparison with partial agreement.
    Date,
}

/// A field that can carry a weight and a similarity score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FirstName,
    MiddleName,
    LastName,
    Sex,
    BirthDate,
    Village,
    SubVillage,
    District,
    #[serde(rename = "householdHeadName")]
    HouseholdHead,
    MotherName,
    OldestHouseholdMember,
    PhoneNumber,
    Identifiers,
}

impl FieldName {
    /// Every scoreable field, in canonical order.
    pub const ALL: [FieldName; 13] = [
        Self::FirstName,
        Self::MiddleName,
        Self::LastName,
        Self::Sex,
        Self::BirthDate,
        Self::Village,
        Self::SubVillage,
        Self::District,
        Self::HouseholdHead,
        Self::MotherName,
        Self::OldestHouseholdMember,
        Self::PhoneNumber,
        Self::Identifiers,
    ];

    /// The camelCase key used in configs and serialized results.
    pub fn key(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::MiddleName => "middleName",
            Self::LastName => "lastName",
            Self::Sex => "sex",
            Self::BirthDate => "birthDate",
            Self::Village => "village",
            Self::SubVillage => "subVillage",
            Self::District => "district",
            Self::HouseholdHead => "householdHeadName",
            Self::MotherName => "motherName",
            Self::OldestHouseholdMember => "oldestHouseholdMember",
            Self::PhoneNumber => "phoneNumber",
            Self::Identifiers => "identifiers",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Sex | Self::PhoneNumber | Self::Identifiers => FieldKind::Exact,
            Self::BirthDate => FieldKind::Date,
            Self::FirstName
            | Self::MiddleName
            | Self::LastName
            | Self::Village
            | Self::SubVillage
            | Self::District
            | Self::HouseholdHead
            | Self::MotherName
            | Self::OldestHouseholdMember => FieldKind::Fuzzy,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if EXCLUDED_FIELD_KEYS
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(key))
        {
            return Err(ConfigError::ExcludedField(key.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| ConfigError::UnknownField(key.to_string()))
    }
}
