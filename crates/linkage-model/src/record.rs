//! The canonical demographic record.
//!
//! Import layers are expected to map their column variants onto this shape
//! before handing records to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::FieldName;

/// A typed external identifier, e.g. a national id or clinic number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentifier {
    #[serde(rename = "type")]
    pub id_type: String,
    pub value: String,
}

impl ExternalIdentifier {
    pub fn new(id_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id_type: id_type.into(),
            value: value.into(),
        }
    }
}

/// Provenance and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Source tag, e.g. "clinic" or "registry".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Administrative community-leader name triple. Never scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityLeader {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A demographic entity from either the source or the candidate pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    /// Free-form; parsed by the normalizer at comparison time.
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub sub_village: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub household_head_name: Option<String>,
    #[serde(default)]
    pub mother_name: Option<String>,
    #[serde(default)]
    pub oldest_household_member: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub identifiers: Vec<ExternalIdentifier>,
    #[serde(default)]
    pub community_leader: CommunityLeader,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set a text field. `Identifiers` is ignored; use [`Self::with_identifier`].
    #[must_use]
    pub fn with(mut self, field: FieldName, value: impl Into<String>) -> Self {
        if let Some(slot) = self.text_slot(field) {
            *slot = Some(value.into());
        }
        self
    }

    #[must_use]
    pub fn with_identifier(mut self, id_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.identifiers.push(ExternalIdentifier::new(id_type, value));
        self
    }

    #[must_use]
    pub fn with_community_leader(mut self, leader: CommunityLeader) -> Self {
        self.community_leader = leader;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    /// Raw value of a text field, `None` for `Identifiers`.
    pub fn text(&self, field: FieldName) -> Option<&str> {
        let value = match field {
            FieldName::FirstName => &self.first_name,
            FieldName::MiddleName => &self.middle_name,
            FieldName::LastName => &self.last_name,
            FieldName::Sex => &self.sex,
            FieldName::BirthDate => &self.birth_date,
            FieldName::Village => &self.village,
            FieldName::SubVillage => &self.sub_village,
            FieldName::District => &self.district,
            FieldName::HouseholdHead => &self.household_head_name,
            FieldName::MotherName => &self.mother_name,
            FieldName::OldestHouseholdMember => &self.oldest_household_member,
            FieldName::PhoneNumber => &self.phone_number,
            FieldName::Identifiers => return None,
        };
        value.as_deref()
    }

    /// Whether the field carries a non-blank value.
    pub fn has_value(&self, field: FieldName) -> bool {
        match field {
            FieldName::Identifiers => self
                .identifiers
                .iter()
                .any(|id| !id.value.trim().is_empty()),
            _ => self.text(field).is_some_and(|v| !v.trim().is_empty()),
        }
    }

    fn text_slot(&mut self, field: FieldName) -> Option<&mut Option<String>> {
        let slot = match field {
            FieldName::FirstName => &mut self.first_name,
            FieldName::MiddleName => &mut self.middle_name,
            FieldName::LastName => &mut self.last_name,
            FieldName::Sex => &mut self.sex,
            FieldName::BirthDate => &mut self.birth_date,
            FieldName::Village => &mut self.village,
            FieldName::SubVillage => &mut self.sub_village,
            FieldName::District => &mut self.district,
            FieldName::HouseholdHead => &mut self.household_head_name,
            FieldName::MotherName => &mut self.mother_name,
            FieldName::OldestHouseholdMember => &mut self.oldest_household_member,
            FieldName::PhoneNumber => &mut self.phone_number,
            FieldName::Identifiers => return None,
        };
        Some(slot)
    }
}
