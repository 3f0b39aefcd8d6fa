// SocGen - SoC Integration Generator
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{ResourceKind, SocError, SocResult};
use std::collections::{BTreeMap, BTreeSet};

/// First-fit allocator over the id space `[0, capacity)`.
///
/// Used for both interrupt lines and CSR bank ids. Allocation is deterministic: the same
/// sequence of `register` calls always yields the same ids.
#[derive(Debug, Clone)]
pub struct IdentifierAllocator {
    kind: ResourceKind,
    capacity: u64,
    by_name: BTreeMap<String, u32>,
    by_id: BTreeMap<u32, String>,
}

impl IdentifierAllocator {
    pub fn new(kind: ResourceKind, capacity: u64) -> Self {
        Self {
            kind,
            capacity,
            by_name: BTreeMap::new(),
            by_id: BTreeMap::new(),
        }
    }

    /// Allocator for a space addressed by `bits` bits.
    pub fn with_address_width(kind: ResourceKind, bits: u32) -> Self {
        Self::new(kind, 1u64 << bits.min(32))
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Register `name`, either at `id` or at the lowest free id.
    ///
    /// When `name` is already present the call is a no-op if `allow_existing` is set and the
    /// existing id is returned; otherwise it is a conflict, even if `id` matches.
    pub fn register(&mut self, name: &str, id: Option<u32>, allow_existing: bool) -> SocResult<u32> {
        if let Some(&existing) = self.by_name.get(name) {
            if allow_existing {
                return Ok(existing);
            }
            return Err(SocError::Conflict {
                kind: self.kind,
                existing: name.to_string(),
                requested: name.to_string(),
                detail: Some("name already used".to_string()),
            });
        }

        let id = match id {
            Some(id) => {
                if u64::from(id) >= self.capacity {
                    return Err(SocError::OutOfRange {
                        kind: self.kind,
                        name: name.to_string(),
                        value: u64::from(id),
                        max: self.capacity - 1,
                        hint: None,
                    });
                }
                if let Some(owner) = self.by_id.get(&id) {
                    return Err(SocError::Conflict {
                        kind: self.kind,
                        existing: owner.clone(),
                        requested: name.to_string(),
                        detail: Some(format!("id {} already used", id)),
                    });
                }
                id
            }
            None => self.first_free().ok_or_else(|| SocError::Exhausted {
                kind: self.kind,
                name: name.to_string(),
                capacity: self.capacity,
            })?,
        };

        tracing::debug!("{} '{}' -> {}", self.kind, name, id);
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
        Ok(id)
    }

    // Ids are kept ordered, so the first gap in the used set is the first free id.
    fn first_free(&self) -> Option<u32> {
        let mut candidate: u64 = 0;
        for &used in self.by_id.keys() {
            if u64::from(used) != candidate {
                break;
            }
            candidate += 1;
        }
        if candidate < self.capacity {
            u32::try_from(candidate).ok()
        } else {
            None
        }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.by_name.iter().map(|(n, &id)| (n.as_str(), id))
    }

    /// Used ids in increasing order.
    pub fn ids(&self) -> BTreeSet<u32> {
        self.by_id.keys().copied().collect()
    }

    pub fn to_map(&self) -> BTreeMap<String, u32> {
        self.by_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interrupts() -> IdentifierAllocator {
        IdentifierAllocator::new(ResourceKind::Interrupt, 32)
    }

    #[test]
    fn test_auto_allocation_is_first_fit_in_call_order() {
        let mut alloc = interrupts();
        assert_eq!(alloc.register("a", None, false).unwrap(), 0);
        assert_eq!(alloc.register("b", None, false).unwrap(), 1);
        assert_eq!(alloc.register("c", None, false).unwrap(), 2);
        assert_eq!(alloc.register("d", None, false).unwrap(), 3);
    }

    #[test]
    fn test_auto_allocation_fills_gaps() {
        let mut alloc = interrupts();
        alloc.register("nmi", Some(0), false).unwrap();
        alloc.register("ethmac", Some(2), false).unwrap();
        assert_eq!(alloc.register("uart", None, false).unwrap(), 1);
        assert_eq!(alloc.register("timer0", None, false).unwrap(), 3);
    }

    #[test]
    fn test_allow_existing_is_a_noop() {
        let mut alloc = interrupts();
        alloc.register("uart", Some(4), false).unwrap();
        let before = alloc.to_map();
        assert_eq!(alloc.register("uart", None, true).unwrap(), 4);
        assert_eq!(alloc.register("uart", Some(9), true).unwrap(), 4);
        assert_eq!(alloc.to_map(), before);
    }

    #[test]
    fn test_duplicate_name_conflicts_even_with_same_id() {
        let mut alloc = interrupts();
        alloc.register("uart", Some(4), false).unwrap();
        let err = alloc.register("uart", Some(4), false).unwrap_err();
        assert!(matches!(err, SocError::Conflict { .. }));
        let err = alloc.register("uart", None, false).unwrap_err();
        assert!(matches!(err, SocError::Conflict { .. }));
    }

    #[test]
    fn test_duplicate_id_reports_owner() {
        let mut alloc = interrupts();
        alloc.register("uart", Some(4), false).unwrap();
        let err = alloc.register("timer0", Some(4), false).unwrap_err();
        match &err {
            SocError::Conflict {
                existing,
                requested,
                ..
            } => {
                assert_eq!(existing, "uart");
                assert_eq!(requested, "timer0");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.to_string().contains("id 4"));
    }

    #[test]
    fn test_explicit_id_out_of_range() {
        let mut alloc = interrupts();
        let err = alloc.register("spurious", Some(32), false).unwrap_err();
        assert!(matches!(
            err,
            SocError::OutOfRange {
                value: 32,
                max: 31,
                ..
            }
        ));
        assert!(alloc.is_empty());
    }

    #[test]
    fn test_exhaustion() {
        let mut alloc = IdentifierAllocator::with_address_width(ResourceKind::Csr, 2);
        for name in ["a", "b", "c", "d"] {
            alloc.register(name, None, false).unwrap();
        }
        let err = alloc.register("e", None, false).unwrap_err();
        assert!(matches!(err, SocError::Exhausted { capacity: 4, .. }));
    }

    #[test]
    fn test_explicit_ids_stay_injective() {
        let mut alloc = IdentifierAllocator::with_address_width(ResourceKind::Csr, 5);
        let requests = [3u32, 7, 3, 0, 7, 31, 12, 0, 5];
        for (i, id) in requests.iter().enumerate() {
            let _ = alloc.register(&format!("csr{}", i), Some(*id), false);
        }
        let _ = alloc.register("auto0", None, false);
        let _ = alloc.register("auto1", None, false);

        let ids: Vec<u32> = alloc.iter().map(|(_, id)| id).collect();
        let unique = alloc.ids();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(alloc.len(), 8);
    }
}
