use geo::Point;
use log::warn;

use crate::geo::{Frame, TransformContext};

/// Number of optional via slots between start and end.
pub const MIDDLE_SLOTS: usize = 3;

/// A named position in the waypoint sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Start,
    Middle(usize),
    End,
}

/// The ordered waypoints of one calculation.
///
/// Start and end are mandatory before composition; the middle slots are
/// optional and independently removable without disturbing either end.
/// Points live in the ambient frame the host placed them in and are
/// re-projected in place when that frame changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaypointSequence {
    start: Option<Point<f64>>,
    middles: [Option<Point<f64>>; MIDDLE_SLOTS],
    end: Option<Point<f64>>,
}

impl WaypointSequence {
    pub fn new() -> Self {
        WaypointSequence::default()
    }

    /// Sets a slot. Returns `false` for a middle index out of range.
    pub fn set(&mut self, slot: Slot, point: Point<f64>) -> bool {
        match slot {
            Slot::Start => self.start = Some(point),
            Slot::End => self.end = Some(point),
            Slot::Middle(index) => {
                let Some(entry) = self.middles.get_mut(index) else {
                    return false;
                };
                *entry = Some(point);
            }
        }
        true
    }

    pub fn set_start(&mut self, point: Point<f64>) {
        self.start = Some(point);
    }

    pub fn set_end(&mut self, point: Point<f64>) {
        self.end = Some(point);
    }

    pub fn set_middle(&mut self, index: usize, point: Point<f64>) -> bool {
        self.set(Slot::Middle(index), point)
    }

    pub fn get(&self, slot: Slot) -> Option<Point<f64>> {
        match slot {
            Slot::Start => self.start,
            Slot::End => self.end,
            Slot::Middle(index) => self.middles.get(index).copied().flatten(),
        }
    }

    pub fn clear(&mut self, slot: Slot) {
        match slot {
            Slot::Start => self.start = None,
            Slot::End => self.end = None,
            Slot::Middle(index) => {
                if let Some(entry) = self.middles.get_mut(index) {
                    *entry = None;
                }
            }
        }
    }

    pub fn clear_all(&mut self) {
        *self = WaypointSequence::default();
    }

    /// Both mandatory slots are present.
    pub fn is_ready(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Set points in traversal order: start, middles ascending, end.
    pub fn ordered(&self) -> Vec<Point<f64>> {
        self.start
            .iter()
            .chain(self.middles.iter().flatten())
            .chain(self.end.iter())
            .copied()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.ordered().len()
    }

    /// Re-expresses every set point in `to` after an ambient frame change.
    /// A point that cannot be transformed keeps its coordinates, with a
    /// warning, rather than being dropped.
    pub fn reproject(&mut self, ctx: &TransformContext, from: &Frame, to: &Frame) {
        for entry in std::iter::once(&mut self.start)
            .chain(self.middles.iter_mut())
            .chain(std::iter::once(&mut self.end))
        {
            let Some(point) = entry else { continue };
            match ctx.transform(*point, from, to) {
                Ok(moved) => *point = moved,
                Err(error) => warn!("waypoint not transformable ({error}), keeping coordinates"),
            }
        }
    }
}
