//! The declarative document form of a design.
//!
//! Factors, relationships and metadata are stored by name so the document
//! can be written to and read from text formats. With the `interchange`
//! feature the document types derive `serde` traits; the layout matches
//!
//! ```json
//! {
//!   "schema_version": "1.0",
//!   "factors": [{ "name": "Site", "n": 3, "type": "factor" }],
//!   "relationships": [{ "from": "Site", "to": "Patient", "type": "nests" }],
//!   "metadata": { "confound_groups": [], "notes": "pilot" }
//! }
//! ```
//!
//! Sizes are written as a number (exact), a list of numbers (unbalanced),
//! or a `"~N"` string (approximate).

use super::{Design, DesignError, FactorKind, FactorSize, RelationKind};

pub const SCHEMA_VERSION: &str = "1.0";

#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct DesignDocument {
    pub schema_version: String,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub study: Option<String>,
    pub factors: Vec<FactorRecord>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub relationships: Vec<RelationshipRecord>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub metadata: MetadataRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct FactorRecord {
    pub name: String,
    pub n: SizeRecord,
    #[cfg_attr(feature = "interchange", serde(rename = "type", default))]
    pub kind: FactorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "interchange", serde(untagged))]
pub enum SizeRecord {
    Count(u64),
    Branches(Vec<u64>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct RelationshipRecord {
    pub from: String,
    pub to: String,
    #[cfg_attr(feature = "interchange", serde(rename = "type"))]
    pub kind: RelationKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct MetadataRecord {
    #[cfg_attr(feature = "interchange", serde(default))]
    pub confound_groups: Vec<Vec<String>>,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub notes: Option<String>,
}

impl From<&FactorSize> for SizeRecord {
    fn from(size: &FactorSize) -> Self {
        match size {
            FactorSize::Exact(n) => Self::Count(*n),
            FactorSize::Unbalanced(branches) => Self::Branches(branches.clone()),
            FactorSize::Approximate(_) => Self::Text(size.to_string()),
        }
    }
}

impl TryFrom<&SizeRecord> for FactorSize {
    type Error = String;

    fn try_from(record: &SizeRecord) -> Result<Self, Self::Error> {
        match record {
            SizeRecord::Count(n) => Ok(Self::Exact(*n)),
            SizeRecord::Branches(branches) => Ok(Self::Unbalanced(branches.clone())),
            SizeRecord::Text(text) => text.parse(),
        }
    }
}

impl Design {
    /// Export to the declarative document form. Orphaned relationships
    /// are not exported.
    pub fn to_document(&self) -> DesignDocument {
        DesignDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            study: self.metadata().study.clone(),
            factors: self
                .factors()
                .map(|(_, f)| FactorRecord {
                    name: f.name.to_string(),
                    n: SizeRecord::from(&f.size),
                    kind: f.kind,
                })
                .collect(),
            relationships: self
                .live_relationships()
                .map(|rel| RelationshipRecord {
                    from: self.name_of(rel.from).to_string(),
                    to: self.name_of(rel.to).to_string(),
                    kind: rel.kind,
                })
                .collect(),
            metadata: MetadataRecord {
                confound_groups: self
                    .metadata()
                    .confound_groups
                    .iter()
                    .map(|group| {
                        group
                            .iter()
                            .filter(|id| self.is_live(**id))
                            .map(|id| self.name_of(*id).to_string())
                            .collect::<Vec<_>>()
                    })
                    .filter(|group| group.len() >= 2)
                    .collect(),
                notes: self.metadata().notes.clone(),
            },
        }
    }

    /// Rebuild a design from its document form. Any `1.x` schema version
    /// is accepted.
    pub fn from_document(doc: &DesignDocument) -> Result<Design, DesignError> {
        if doc.schema_version.split('.').next() != Some("1") {
            return Err(DesignError::UnsupportedVersion(doc.schema_version.clone()));
        }

        let mut design = Design::new();
        for record in &doc.factors {
            let size = FactorSize::try_from(&record.n).map_err(|e| {
                DesignError::invalid_document(format!("factor '{}': {e}", record.name))
            })?;
            design.add_factor(&record.name, size, record.kind)?;
        }
        for rel in &doc.relationships {
            design.add_relationship(&rel.from, &rel.to, rel.kind)?;
        }
        for group in &doc.metadata.confound_groups {
            let ids = group
                .iter()
                .map(|name| {
                    design.factor_id(name).ok_or_else(|| {
                        DesignError::invalid_document(format!(
                            "confound group references unknown factor '{name}'"
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            design.record_confound_group(ids);
        }
        let metadata = design.metadata_mut();
        metadata.study = doc.study.clone();
        metadata.notes = doc.metadata.notes.clone();
        Ok(design)
    }
}
