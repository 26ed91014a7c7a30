//! Contact detection
//!
//! A per-tick sweep over axis-aligned bounding boxes. Rotation never affects
//! the boxes. Only category pairs allowed by [`Category::can_contact`] are
//! tested, and every reported pair is ordered by category rank so the
//! resolver never has to check both orders.

use std::collections::BTreeSet;

use super::entity::{Aabb, Category, Entity, EntityId};

/// Two overlapping entities, `first` having the lower category rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Contact {
    pub first: EntityId,
    pub first_category: Category,
    pub second: EntityId,
    pub second_category: Category,
}

impl Contact {
    /// Build a contact from two entities in either order
    pub fn canonical(a: &Entity, b: &Entity) -> Self {
        let (lo, hi) = if (a.category.rank(), a.id) <= (b.category.rank(), b.id) {
            (a, b)
        } else {
            (b, a)
        };
        Self {
            first: lo.id,
            first_category: lo.category,
            second: hi.id,
            second_category: hi.category,
        }
    }

    /// Categories as (first, second)
    pub fn kinds(&self) -> (Category, Category) {
        (self.first_category, self.second_category)
    }
}

/// Find all contact pairs among `entities`.
///
/// Dead entities and categories that never collide are skipped. Candidates
/// are sorted by their left edge and swept along x; only boxes whose x
/// ranges overlap get the full test. The result is sorted and free of
/// duplicates.
pub fn find_contacts<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Vec<Contact> {
    let mut candidates: Vec<(Aabb, &Entity)> = entities
        .into_iter()
        .filter(|e| e.alive && !e.category.contact_mask().is_empty())
        .map(|e| (e.aabb(), e))
        .collect();

    candidates.sort_by(|(a, ea), (b, eb)| {
        a.min
            .x
            .total_cmp(&b.min.x)
            .then_with(|| ea.id.cmp(&eb.id))
    });

    let mut contacts = BTreeSet::new();
    for (i, (box_a, a)) in candidates.iter().enumerate() {
        for (box_b, b) in &candidates[i + 1..] {
            // Sorted by min.x: nothing further right can overlap
            if box_b.min.x >= box_a.max.x {
                break;
            }
            if a.category.can_contact(b.category) && box_a.overlaps(box_b) {
                contacts.insert(Contact::canonical(a, b));
            }
        }
    }

    contacts.into_iter().collect()
}
