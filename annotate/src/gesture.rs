use arrayvec::ArrayVec;
use cozy_chess::{Color, File, Rank, Square};

use crate::error::Ignored;

// A queen reaches at most 27 squares; castling adds two king targets.
const MAX_TARGETS: usize = 32;

/// Where the board sits on the pointer surface and which side is at the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    pub origin_x: f32,
    pub origin_y: f32,
    pub square_size: f32,
    pub orientation: Color,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            square_size: 1.0,
            orientation: Color::White,
        }
    }
}

impl BoardGeometry {
    pub fn flipped(self) -> Self {
        Self {
            orientation: !self.orientation,
            ..self
        }
    }

    /// The grid cell under a pointer position, or `None` outside the board.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Square> {
        if !(self.square_size > 0.0) || !x.is_finite() || !y.is_finite() {
            return None;
        }

        let col = ((x - self.origin_x) / self.square_size).floor();
        let row = ((y - self.origin_y) / self.square_size).floor();
        if !(0.0..8.0).contains(&col) || !(0.0..8.0).contains(&row) {
            return None;
        }

        let (col, row) = (col as usize, row as usize);
        let (file, rank) = match self.orientation {
            Color::White => (col, 7 - row),
            Color::Black => (7 - col, row),
        };
        Some(Square::new(File::index(file), Rank::index(rank)))
    }
}

/// The single move under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targeting {
    pub source: Square,
    pub target: Option<Square>,
    /// True while a drag is in progress; false for a hover-style preview.
    pub gesture_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracked {
    /// The targeted cell changed to a legal destination.
    Target(Square),
    /// Same cell as before, or a cell that is not a legal destination.
    Unchanged,
    Ignored(Ignored),
}

/// Turns a pointer stream into discrete target-changed events for one dragged piece.
#[derive(Debug, Default)]
pub struct GestureTracker {
    geometry: BoardGeometry,
    targeting: Option<Targeting>,
    legal_targets: ArrayVec<Square, MAX_TARGETS>,
    subscribed: bool,
}

impl GestureTracker {
    pub fn new(geometry: BoardGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    pub fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    /// Changing geometry mid-gesture would remap the pointer, so any targeting is cleared.
    pub fn set_geometry(&mut self, geometry: BoardGeometry) {
        self.reset();
        self.geometry = geometry;
    }

    pub fn targeting(&self) -> Option<Targeting> {
        self.targeting
    }

    pub fn is_active(&self) -> bool {
        self.subscribed
    }

    /// The (source, target) pair currently targeted, if a target is set.
    pub fn current_move(&self) -> Option<(Square, Square)> {
        self.targeting
            .and_then(|targeting| targeting.target.map(|target| (targeting.source, target)))
    }

    /// The cell a drag would start from, without starting one.
    pub fn source_at(&self, x: f32, y: f32) -> Result<Square, Ignored> {
        self.geometry.cell_at(x, y).ok_or(Ignored::InvalidGesture)
    }

    /// Starts a drag from `source`, replacing any previous targeting outright.
    pub fn begin(&mut self, source: Square, legal_targets: impl IntoIterator<Item = Square>) {
        self.reset();

        for target in legal_targets {
            if !self.legal_targets.contains(&target) && self.legal_targets.try_push(target).is_err() {
                break;
            }
        }

        self.targeting = Some(Targeting {
            source,
            target: None,
            gesture_active: true,
        });
        self.subscribed = true;
    }

    /// Feeds one pointer position of an active drag.
    pub fn track(&mut self, x: f32, y: f32) -> Tracked {
        if !self.subscribed {
            return Tracked::Ignored(Ignored::InvalidGesture);
        }
        let Some(cell) = self.geometry.cell_at(x, y) else {
            return Tracked::Ignored(Ignored::InvalidGesture);
        };
        let Some(targeting) = self.targeting.as_mut() else {
            return Tracked::Ignored(Ignored::InvalidGesture);
        };

        if targeting.target == Some(cell) || !self.legal_targets.contains(&cell) {
            return Tracked::Unchanged;
        }

        targeting.target = Some(cell);
        Tracked::Target(cell)
    }

    /// Ends the drag. Returns the dropped move when the drop cell is a legal destination.
    /// Targeting is cleared either way.
    pub fn end(&mut self, x: f32, y: f32) -> Option<(Square, Square)> {
        let dropped = match (self.subscribed, self.targeting, self.geometry.cell_at(x, y)) {
            (true, Some(targeting), Some(cell)) if self.legal_targets.contains(&cell) => {
                Some((targeting.source, cell))
            }
            _ => None,
        };

        self.reset();
        dropped
    }

    /// Hover-equivalent targeting outside a drag, e.g. from a move list.
    pub fn preview(&mut self, source: Square, target: Square) {
        self.reset();
        self.targeting = Some(Targeting {
            source,
            target: Some(target),
            gesture_active: false,
        });
    }

    /// Tears down the pointer subscription and clears all targeting.
    pub fn reset(&mut self) {
        self.subscribed = false;
        self.targeting = None;
        self.legal_targets.clear();
    }
}
