//! Sequential collision resolution.
//!
//! Labels are placed in element order. Each label only checks against the
//! visible labels placed before it in the same pass, and moves right by its
//! `offset_step` after every collision until it fits or runs out of attempts.
//! Slots of labels that cannot be placed are cleared so later labels and the
//! fit loop no longer see them.

use super::geometry::{collides, overlaps_circle, Rect};
use super::label::OutLabel;
use super::positioner;
use super::types::ArcElement;

pub const MAX_PLACEMENT_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Placed without overlap; `attempts` counts the tries used (1..=5).
    Visible { attempts: usize },
    /// The label box reaches into the pie; the slot was cleared.
    OverlapsPie,
    /// Every attempt collided; the slot was cleared.
    Unplaceable,
    /// The slot held no label.
    Absent,
}

impl Placement {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }

    /// Whether the resolver emptied the slot.
    pub fn cleared(&self) -> bool {
        matches!(self, Self::OverlapsPie | Self::Unplaceable)
    }
}

/// Place every label against its predecessors, in order.
///
/// `arcs` and `slots` are parallel; a missing arc leaves the label absent.
pub fn resolve_labels<F>(
    slots: &mut [Option<OutLabel>],
    arcs: &[ArcElement],
    is_data_visible: F,
) -> Vec<Placement>
where
    F: Fn(usize) -> bool,
{
    (0..slots.len())
        .map(|index| match arcs.get(index) {
            Some(arc) => place_label(slots, index, arc, &is_data_visible),
            None => Placement::Absent,
        })
        .collect()
}

/// Place the label at `index` against the labels in `slots[..index]`.
pub fn place_label<F>(
    slots: &mut [Option<OutLabel>],
    index: usize,
    arc: &ArcElement,
    is_data_visible: &F,
) -> Placement
where
    F: Fn(usize) -> bool,
{
    let Some((placed, rest)) = split_slot(slots, index) else {
        return Placement::Absent;
    };
    let Some(label) = rest.as_mut() else {
        return Placement::Absent;
    };

    let placement = attempt_placement(label, placed, arc, is_data_visible);
    match placement {
        Placement::Visible { .. } => label.hidden = false,
        _ => {
            label.hidden = true;
            tracing::debug!(index, ?placement, "outlabel removed from pass");
            *rest = None;
        }
    }
    placement
}

fn split_slot(
    slots: &mut [Option<OutLabel>],
    index: usize,
) -> Option<(&[Option<OutLabel>], &mut Option<OutLabel>)> {
    if index >= slots.len() {
        return None;
    }
    let (placed, rest) = slots.split_at_mut(index);
    Some((placed, &mut rest[0]))
}

fn attempt_placement<F>(
    label: &mut OutLabel,
    placed: &[Option<OutLabel>],
    arc: &ArcElement,
    is_data_visible: &F,
) -> Placement
where
    F: Fn(usize) -> bool,
{
    let mut center = positioner::center(arc, label.stretch);
    center.x += label.offset.x;

    for attempt in 1..=MAX_PLACEMENT_ATTEMPTS {
        let geometry = label.compute_geometry(center);
        label.geometry = Some(geometry);

        if overlaps_circle(&geometry.label_rect, arc.center(), arc.outer_radius) {
            return Placement::OverlapsPie;
        }

        if !collides_with_any(&geometry.label_rect, placed, is_data_visible) {
            return Placement::Visible { attempts: attempt };
        }

        label.offset.x += label.offset_step;
        center.x += label.offset_step;
    }
    Placement::Unplaceable
}

fn collides_with_any<F>(rect: &Rect, placed: &[Option<OutLabel>], is_data_visible: &F) -> bool
where
    F: Fn(usize) -> bool,
{
    placed.iter().enumerate().any(|(index, slot)| {
        let Some(other) = slot else {
            return false;
        };
        if other.hidden || !is_data_visible(index) {
            return false;
        }
        other
            .label_rect()
            .is_some_and(|other_rect| collides(rect, &other_rect))
    })
}
