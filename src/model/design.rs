//! The `Design` aggregate: a factor arena, the relationship list, and
//! design metadata.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::{DesignError, Factor, FactorId, FactorKind, FactorSize, RelationKind, Relationship};

// ============================================================================
// Metadata
// ============================================================================

/// Design-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignMetadata {
    /// Optional study title.
    pub study: Option<String>,
    /// Groups of pairwise-confounded factors, in declaration order.
    pub confound_groups: Vec<Vec<FactorId>>,
    /// Free-form notes.
    pub notes: Option<String>,
}

// ============================================================================
// Design
// ============================================================================

#[derive(Debug, Clone)]
struct FactorSlot {
    factor: Factor,
    live: bool,
}

/// An experimental design: factors, typed relationships between them, and
/// metadata.
///
/// Factors live in an arena addressed by [`FactorId`]. Relationships hold
/// handles, so renaming a factor never touches them. Removing a factor
/// tombstones its slot; relationships that still reference it become
/// orphans until [`Design::prune_orphaned_relationships`] is called.
///
/// A `Design` is not synchronised. Wrap it in a
/// [`SharedDesign`](super::SharedDesign) to share it across threads.
#[derive(Debug, Clone, Default)]
pub struct Design {
    slots: Vec<FactorSlot>,
    by_name: FxHashMap<SmolStr, FactorId>,
    relationships: Vec<Relationship>,
    metadata: DesignMetadata,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Factors
    // ------------------------------------------------------------------------

    /// Register a new factor.
    pub fn add_factor(
        &mut self,
        name: &str,
        size: impl Into<FactorSize>,
        kind: FactorKind,
    ) -> Result<FactorId, DesignError> {
        let size = size.into();
        if name.trim().is_empty() {
            return Err(DesignError::InvalidName(SmolStr::new(name)));
        }
        if let Err(reason) = size.check() {
            return Err(DesignError::InvalidSize {
                name: SmolStr::new(name),
                reason,
            });
        }
        if self.by_name.contains_key(name) {
            return Err(DesignError::DuplicateFactor(SmolStr::new(name)));
        }

        let id = FactorId::new(self.slots.len());
        let factor = Factor::new(name, size, kind);
        trace!(factor = %factor.notation(), kind = %kind, "add factor");
        self.by_name.insert(factor.name.clone(), id);
        self.slots.push(FactorSlot { factor, live: true });
        Ok(id)
    }

    /// Remove a factor by name.
    ///
    /// Relationships touching it are kept and reported by
    /// [`validate`](Design::validate) as orphaned.
    pub fn remove_factor(&mut self, name: &str) -> Result<Factor, DesignError> {
        let id = self.require(name)?;
        self.by_name.remove(name);
        let slot = &mut self.slots[id.index()];
        slot.live = false;
        debug!(factor = name, "removed factor");
        Ok(slot.factor.clone())
    }

    /// Rename a live factor. Relationships and confound groups follow the
    /// handle, so nothing else changes.
    pub fn rename_factor(&mut self, old: &str, new: &str) -> Result<(), DesignError> {
        let id = self.require(old)?;
        if old == new {
            return Ok(());
        }
        if new.trim().is_empty() {
            return Err(DesignError::InvalidName(SmolStr::new(new)));
        }
        if self.by_name.contains_key(new) {
            return Err(DesignError::DuplicateFactor(SmolStr::new(new)));
        }
        self.by_name.remove(old);
        let name = SmolStr::new(new);
        self.by_name.insert(name.clone(), id);
        self.slots[id.index()].factor.name = name;
        Ok(())
    }

    /// Mark an existing factor as a batch (technical variation) factor.
    pub fn mark_batch(&mut self, id: FactorId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            slot.factor.kind = FactorKind::Batch;
        }
    }

    // ------------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------------

    /// Add a relationship between two named factors.
    pub fn add_relationship(
        &mut self,
        from: &str,
        to: &str,
        kind: RelationKind,
    ) -> Result<(), DesignError> {
        let from = self.require(from)?;
        let to = self.require(to)?;
        self.relate(from, to, kind)
    }

    /// Add a relationship between two factor handles.
    pub fn relate(
        &mut self,
        from: FactorId,
        to: FactorId,
        kind: RelationKind,
    ) -> Result<(), DesignError> {
        for id in [from, to] {
            if !self.is_live(id) {
                return Err(DesignError::UnknownFactor(SmolStr::new(self.name_of(id))));
            }
        }
        if from == to {
            return Err(DesignError::SelfLoop(SmolStr::new(self.name_of(from))));
        }
        trace!(
            from = self.name_of(from),
            to = self.name_of(to),
            kind = %kind,
            "add relationship"
        );
        self.relationships.push(Relationship::new(from, to, kind));
        Ok(())
    }

    /// `parent` contains `child`.
    pub fn add_nesting(&mut self, parent: &str, child: &str) -> Result<(), DesignError> {
        self.add_relationship(parent, child, RelationKind::Nests)
    }

    pub fn add_crossing(&mut self, a: &str, b: &str) -> Result<(), DesignError> {
        self.add_relationship(a, b, RelationKind::Crosses)
    }

    pub fn add_partial_crossing(&mut self, a: &str, b: &str) -> Result<(), DesignError> {
        self.add_relationship(a, b, RelationKind::PartialCrosses)
    }

    /// `classifier` labels the levels of `subject`.
    pub fn add_classification(&mut self, subject: &str, classifier: &str) -> Result<(), DesignError> {
        self.add_relationship(subject, classifier, RelationKind::Classifies)
    }

    /// Confound two factors and record them as a confound group.
    pub fn add_confound(&mut self, a: &str, b: &str) -> Result<(), DesignError> {
        self.add_relationship(a, b, RelationKind::Confounded)?;
        let ids = vec![self.require(a)?, self.require(b)?];
        self.record_confound_group(ids);
        Ok(())
    }

    /// Mark `batch` as a batch factor affecting each factor in `affected`.
    ///
    /// All names are checked before anything is modified.
    pub fn add_batch_effect(&mut self, batch: &str, affected: &[&str]) -> Result<(), DesignError> {
        let batch_id = self.require(batch)?;
        let targets = affected
            .iter()
            .map(|name| self.require(name))
            .collect::<Result<Vec<_>, _>>()?;
        if targets.contains(&batch_id) {
            return Err(DesignError::SelfLoop(SmolStr::new(batch)));
        }
        self.mark_batch(batch_id);
        for target in targets {
            self.relate(batch_id, target, RelationKind::BatchEffect)?;
        }
        Ok(())
    }

    /// Record a confound group. Groups of fewer than two distinct members
    /// are ignored.
    pub fn record_confound_group(&mut self, members: Vec<FactorId>) {
        let mut group: Vec<FactorId> = Vec::with_capacity(members.len());
        for id in members {
            if !group.contains(&id) {
                group.push(id);
            }
        }
        if group.len() >= 2 && !self.metadata.confound_groups.contains(&group) {
            self.metadata.confound_groups.push(group);
        }
    }

    /// Drop relationships whose endpoints no longer exist, along with dead
    /// members of confound groups. Returns the number of relationships
    /// removed.
    pub fn prune_orphaned_relationships(&mut self) -> usize {
        let before = self.relationships.len();
        let slots = &self.slots;
        let live = |id: FactorId| slots.get(id.index()).is_some_and(|s| s.live);
        self.relationships.retain(|rel| live(rel.from) && live(rel.to));
        for group in &mut self.metadata.confound_groups {
            group.retain(|id| live(*id));
        }
        self.metadata.confound_groups.retain(|g| g.len() >= 2);
        let removed = before - self.relationships.len();
        debug!(removed, "pruned orphaned relationships");
        removed
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Look up a live factor by name.
    pub fn factor(&self, name: &str) -> Option<&Factor> {
        self.factor_id(name).and_then(|id| self.get(id))
    }

    pub fn factor_id(&self, name: &str) -> Option<FactorId> {
        self.by_name.get(name).copied()
    }

    /// Get a live factor by handle.
    pub fn get(&self, id: FactorId) -> Option<&Factor> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.live)
            .map(|slot| &slot.factor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn is_live(&self, id: FactorId) -> bool {
        self.slots.get(id.index()).is_some_and(|slot| slot.live)
    }

    /// Name for a handle, including removed factors.
    pub fn name_of(&self, id: FactorId) -> &str {
        self.slots
            .get(id.index())
            .map(|slot| slot.factor.name.as_str())
            .unwrap_or("<unknown>")
    }

    /// Live factors in declaration order.
    pub fn factors(&self) -> impl Iterator<Item = (FactorId, &Factor)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.live)
            .map(|(i, slot)| (FactorId::new(i), &slot.factor))
    }

    pub fn factor_count(&self) -> usize {
        self.by_name.len()
    }

    /// Number of arena slots, including removed factors.
    pub fn arena_len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// All relationships in declaration order, orphans included.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationships_of(&self, kind: RelationKind) -> impl Iterator<Item = &Relationship> + '_ {
        self.relationships.iter().filter(move |rel| rel.kind == kind)
    }

    /// Relationships whose endpoints are both live.
    pub fn live_relationships(&self) -> impl Iterator<Item = &Relationship> + '_ {
        self.relationships
            .iter()
            .filter(|rel| self.is_live(rel.from) && self.is_live(rel.to))
    }

    pub fn metadata(&self) -> &DesignMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut DesignMetadata {
        &mut self.metadata
    }

    /// Confound groups resolved to factor names.
    pub fn confound_group_names(&self) -> Vec<Vec<&str>> {
        self.metadata
            .confound_groups
            .iter()
            .map(|group| group.iter().map(|id| self.name_of(*id)).collect())
            .collect()
    }

    fn require(&self, name: &str) -> Result<FactorId, DesignError> {
        self.factor_id(name)
            .ok_or_else(|| DesignError::UnknownFactor(SmolStr::new(name)))
    }
}

/// Two designs are equal when their live factors, relationships and
/// metadata match by name, in order.
impl PartialEq for Design {
    fn eq(&self, other: &Self) -> bool {
        let names = |d: &Design, rel: &Relationship| {
            (
                SmolStr::new(d.name_of(rel.from)),
                SmolStr::new(d.name_of(rel.to)),
                rel.kind,
            )
        };
        self.factors().map(|(_, f)| f).eq(other.factors().map(|(_, f)| f))
            && self.relationships.len() == other.relationships.len()
            && self
                .relationships
                .iter()
                .zip(&other.relationships)
                .all(|(a, b)| names(self, a) == names(other, b))
            && self.confound_group_names() == other.confound_group_names()
            && self.metadata.study == other.metadata.study
            && self.metadata.notes == other.metadata.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_patient() -> Design {
        let mut design = Design::new();
        design.add_factor("Site", 3u64, FactorKind::Factor).unwrap();
        design.add_factor("Patient", 20u64, FactorKind::Factor).unwrap();
        design.add_nesting("Site", "Patient").unwrap();
        design
    }

    #[test]
    fn test_add_factor_rejects_duplicates() {
        let mut design = site_patient();
        assert_eq!(
            design.add_factor("Site", 4u64, FactorKind::Factor),
            Err(DesignError::DuplicateFactor("Site".into()))
        );
    }

    #[test]
    fn test_add_factor_rejects_non_positive_sizes() {
        let mut design = Design::new();
        assert!(matches!(
            design.add_factor("Site", 0u64, FactorKind::Factor),
            Err(DesignError::InvalidSize { .. })
        ));
        assert!(matches!(
            design.add_factor("Clinic", Vec::<u64>::new(), FactorKind::Factor),
            Err(DesignError::InvalidSize { .. })
        ));
        assert!(design.is_empty());
    }

    #[test]
    fn test_relationship_errors() {
        let mut design = site_patient();
        assert_eq!(
            design.add_nesting("Site", "Visit"),
            Err(DesignError::UnknownFactor("Visit".into()))
        );
        assert_eq!(
            design.add_crossing("Site", "Site"),
            Err(DesignError::SelfLoop("Site".into()))
        );
        assert_eq!(design.relationships().len(), 1);
    }

    #[test]
    fn test_rename_keeps_relationships() {
        let mut design = site_patient();
        design.rename_factor("Patient", "Subject").unwrap();
        let rel = design.relationships()[0];
        assert_eq!(design.name_of(rel.to), "Subject");
        assert!(design.factor("Patient").is_none());
        assert!(design.factor("Subject").is_some());
    }

    #[test]
    fn test_remove_leaves_orphans_until_pruned() {
        let mut design = site_patient();
        let removed = design.remove_factor("Patient").unwrap();
        assert_eq!(removed.name, "Patient");
        assert_eq!(design.factor_count(), 1);
        assert_eq!(design.relationships().len(), 1);
        assert_eq!(design.live_relationships().count(), 0);
        assert_eq!(design.prune_orphaned_relationships(), 1);
        assert!(design.relationships().is_empty());
    }

    #[test]
    fn test_readding_removed_name_gets_new_handle() {
        let mut design = site_patient();
        let old = design.factor_id("Patient").unwrap();
        design.remove_factor("Patient").unwrap();
        let new = design.add_factor("Patient", 5u64, FactorKind::Factor).unwrap();
        assert_ne!(old, new);
        assert_eq!(design.live_relationships().count(), 0);
    }

    #[test]
    fn test_batch_effect_marks_kind() {
        let mut design = site_patient();
        design.add_factor("Lane", 8u64, FactorKind::Factor).unwrap();
        design.add_batch_effect("Lane", &["Site", "Patient"]).unwrap();
        assert!(design.factor("Lane").unwrap().is_batch());
        assert_eq!(design.relationships_of(RelationKind::BatchEffect).count(), 2);
    }

    #[test]
    fn test_batch_effect_is_all_or_nothing() {
        let mut design = site_patient();
        design.add_factor("Lane", 8u64, FactorKind::Factor).unwrap();
        assert!(design.add_batch_effect("Lane", &["Site", "Nope"]).is_err());
        assert!(!design.factor("Lane").unwrap().is_batch());
        assert_eq!(design.relationships().len(), 1);
    }

    #[test]
    fn test_confound_records_group() {
        let mut design = site_patient();
        design.add_factor("Protocol", 2u64, FactorKind::Factor).unwrap();
        design.add_confound("Site", "Protocol").unwrap();
        assert_eq!(design.confound_group_names(), vec![vec!["Site", "Protocol"]]);
    }
}
