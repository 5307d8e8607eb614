//! Entity Joiner: merge three snapshot lists into per-entity records.

use rustc_hash::FxHashMap;

use crate::models::{EntityRecord, JoinedEntity, SnapshotSet};

/// Joined entities keyed by their stable id.
pub type EntityMap = FxHashMap<String, JoinedEntity>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Now,
    Yesterday,
    WeekAgo,
}

fn observation(record: EntityRecord, slot: Slot) -> JoinedEntity {
    let mut entity = JoinedEntity {
        rate: record.rate,
        denomination: Some(record.denomination),
        ..JoinedEntity::default()
    };
    match slot {
        Slot::Now => entity.now = Some(record.value),
        Slot::Yesterday => entity.yesterday = Some(record.value),
        Slot::WeekAgo => entity.week_ago = Some(record.value),
    }
    entity
}

fn merge_pass(map: &mut EntityMap, records: Vec<EntityRecord>, slot: Slot) {
    for record in records {
        let id = record.id.clone();
        map.entry(id).or_default().overlay(observation(record, slot));
    }
}

/// Merge `now`, then `yesterday`, then `weekAgo`.
///
/// Static attributes are seeded by the first pass that sees an entity; later passes
/// only fill fields that are still empty. Entities missing from a snapshot keep that
/// observation as `None`.
pub fn join(snapshots: SnapshotSet<EntityRecord>) -> EntityMap {
    let mut map = EntityMap::default();
    map.reserve(snapshots.now.len());

    merge_pass(&mut map, snapshots.now, Slot::Now);
    merge_pass(&mut map, snapshots.yesterday, Slot::Yesterday);
    merge_pass(&mut map, snapshots.week_ago, Slot::WeekAgo);

    map
}

/// Overlay `other` onto `base` entity by entity; `base` wins on conflicts.
pub fn merge_maps(mut base: EntityMap, other: EntityMap) -> EntityMap {
    for (id, entity) in other {
        base.entry(id).or_default().overlay(entity);
    }
    base
}
