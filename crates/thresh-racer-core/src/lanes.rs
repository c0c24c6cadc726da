//! The two editable lane quadrilaterals and corner dragging.

use std::fmt;
use std::ops::{Index, IndexMut};

use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;

/// Every lane is a quadrilateral.
pub const CORNERS_PER_LANE: usize = 4;

/// Lane identity. `Left` is lane 0, `Right` is lane 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneId {
    Left,
    Right,
}

impl LaneId {
    /// Both lanes in index order.
    pub const ALL: [LaneId; 2] = [LaneId::Left, LaneId::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            LaneId::Left => 0,
            LaneId::Right => 1,
        }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneId::Left => write!(f, "Left"),
            LaneId::Right => write!(f, "Right"),
        }
    }
}

/// A value for each lane, indexable by [`LaneId`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerLane<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerLane<T> {
    pub const fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PerLane<U> {
        PerLane {
            left: f(self.left),
            right: f(self.right),
        }
    }

    pub fn zip<U>(self, other: PerLane<U>) -> PerLane<(T, U)> {
        PerLane {
            left: (self.left, other.left),
            right: (self.right, other.right),
        }
    }
}

impl<T: Copy> PerLane<T> {
    pub const fn splat(value: T) -> Self {
        Self {
            left: value,
            right: value,
        }
    }
}

impl<T> Index<LaneId> for PerLane<T> {
    type Output = T;

    fn index(&self, lane: LaneId) -> &T {
        match lane {
            LaneId::Left => &self.left,
            LaneId::Right => &self.right,
        }
    }
}

impl<T> IndexMut<LaneId> for PerLane<T> {
    fn index_mut(&mut self, lane: LaneId) -> &mut T {
        match lane {
            LaneId::Left => &mut self.left,
            LaneId::Right => &mut self.right,
        }
    }
}

/// Address of one of the eight lane corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerRef {
    lane: LaneId,
    index: usize,
}

impl CornerRef {
    /// `None` unless `index < CORNERS_PER_LANE`.
    pub fn new(lane: LaneId, index: usize) -> Option<Self> {
        (index < CORNERS_PER_LANE).then_some(Self { lane, index })
    }

    pub fn lane(&self) -> LaneId {
        self.lane
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// One lane: four corners plus the derived polygon and area.
#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    id: LaneId,
    corners: [Point2<f32>; CORNERS_PER_LANE],
    polygon: Polygon,
    area: f32,
}

impl Lane {
    fn new(id: LaneId, corners: [Point2<f32>; CORNERS_PER_LANE]) -> Self {
        let polygon = Polygon::new(&corners);
        let area = polygon.area();
        Self {
            id,
            corners,
            polygon,
            area,
        }
    }

    fn set_corner(&mut self, index: usize, p: Point2<f32>) {
        self.corners[index] = p;
        self.polygon.rebuild(&self.corners);
        self.area = self.polygon.area();
    }

    pub fn id(&self) -> LaneId {
        self.id
    }

    pub fn corners(&self) -> &[Point2<f32>; CORNERS_PER_LANE] {
        &self.corners
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Shoelace area of the current quad, in square pixels.
    pub fn area(&self) -> f32 {
        self.area
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.polygon.contains(x, y)
    }
}

/// Both lanes and the frame extent their corners are clamped to.
///
/// Corners live in `[0, width] × [0, height]`, so a lane can cover the last
/// pixel row and column of the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneSet {
    lanes: PerLane<Lane>,
    width: f32,
    height: f32,
}

impl LaneSet {
    /// Left lane covers the left half of the frame, right lane the right half.
    pub fn split_halves(width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height as f32);
        let half = w * 0.5;
        let left = [
            Point2::new(0.0, 0.0),
            Point2::new(half, 0.0),
            Point2::new(half, h),
            Point2::new(0.0, h),
        ];
        let right = [
            Point2::new(half, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(half, h),
        ];
        Self::from_corners(width, height, PerLane::new(left, right))
    }

    /// Build from explicit corners; out-of-frame corners are clamped.
    pub fn from_corners(
        width: usize,
        height: usize,
        corners: PerLane<[Point2<f32>; CORNERS_PER_LANE]>,
    ) -> Self {
        let (w, h) = (width as f32, height as f32);
        let clamp = |p: Point2<f32>| Point2::new(clamp_coord(p.x, w), clamp_coord(p.y, h));
        Self {
            lanes: PerLane::new(
                Lane::new(LaneId::Left, corners.left.map(clamp)),
                Lane::new(LaneId::Right, corners.right.map(clamp)),
            ),
            width: w,
            height: h,
        }
    }

    pub fn lane(&self, id: LaneId) -> &Lane {
        &self.lanes[id]
    }

    pub fn lanes(&self) -> &PerLane<Lane> {
        &self.lanes
    }

    pub fn areas(&self) -> PerLane<f32> {
        PerLane::new(self.lanes.left.area, self.lanes.right.area)
    }

    /// Frame extent `(width, height)` the corners are clamped to.
    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn corner(&self, corner: CornerRef) -> Point2<f32> {
        self.lanes[corner.lane].corners[corner.index]
    }

    /// Move one corner, clamped into the frame, and refresh that lane.
    ///
    /// A NaN coordinate leaves the corner where it is.
    pub fn set_corner(&mut self, corner: CornerRef, x: f32, y: f32) {
        if x.is_nan() || y.is_nan() {
            debug!("ignoring NaN position for {:?}", corner);
            return;
        }
        let p = Point2::new(x.clamp(0.0, self.width), y.clamp(0.0, self.height));
        let lane = &mut self.lanes[corner.lane];
        lane.set_corner(corner.index, p);
        if lane.area <= 0.0 {
            warn!("{} lane collapsed to zero area; it will not score", lane.id);
        }
    }

    /// Closest corner within `pick_radius` of `(x, y)`.
    ///
    /// Corners are examined lane by lane, then by index; on equal distance the
    /// first one examined wins.
    pub fn find_nearest_corner(&self, x: f32, y: f32, pick_radius: f32) -> Option<CornerRef> {
        let max_d2 = pick_radius * pick_radius;
        let mut best: Option<(CornerRef, f32)> = None;

        for lane in LaneId::ALL {
            for (index, p) in self.lanes[lane].corners.iter().enumerate() {
                let (dx, dy) = (x - p.x, y - p.y);
                let d2 = dx * dx + dy * dy;
                if d2 > max_d2 {
                    continue;
                }
                if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                    best = Some((CornerRef { lane, index }, d2));
                }
            }
        }

        best.map(|(corner, _)| corner)
    }
}

/// `v` clamped to `[0, max]`; NaN maps to 0.
fn clamp_coord(v: f32, max: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, max)
    }
}

/// Press / drag / release state for editing lane corners with a pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CornerDrag {
    active: Option<CornerRef>,
}

impl CornerDrag {
    /// Start a drag on the nearest corner within `pick_radius`.
    ///
    /// Presses outside the frame are ignored. Any previous drag is dropped.
    pub fn press(&mut self, lanes: &LaneSet, x: f32, y: f32, pick_radius: f32) -> Option<CornerRef> {
        self.active = None;
        let (w, h) = lanes.bounds();
        if x < 0.0 || x >= w || y < 0.0 || y >= h {
            return None;
        }
        self.active = lanes.find_nearest_corner(x, y, pick_radius);
        self.active
    }

    /// Move the picked corner; `false` when nothing is being dragged.
    pub fn drag_to(&self, lanes: &mut LaneSet, x: f32, y: f32) -> bool {
        match self.active {
            Some(corner) => {
                lanes.set_corner(corner, x, y);
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<CornerRef> {
        self.active
    }
}
