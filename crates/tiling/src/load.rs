use crate::tile::TileHandle;

/// Identifies one load request for one tile.
///
/// A tile only accepts the completion of its most recent request; anything
/// else arriving later is dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    pub tile: TileHandle,
    pub request: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The tile was disposed before the load finished.
    Disposed,
    /// The request was cancelled or replaced by a newer one.
    Stale,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Dropped(DropReason),
}

/// Per-frame budget for applying loads, counted in generated grid vertices
/// rather than wall-clock time so frames replay identically.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadBudget {
    remaining_units: u32,
}

impl LoadBudget {
    pub fn new(units: u32) -> Self {
        Self {
            remaining_units: units,
        }
    }

    pub fn unlimited() -> Self {
        Self {
            remaining_units: u32::MAX,
        }
    }

    /// Enough units for `tiles` loads of `tile_size`² vertices each.
    pub fn for_tiles(tiles: u32, tile_size: usize) -> Self {
        Self::new(tiles.saturating_mul(Self::load_cost(tile_size)))
    }

    /// Units one tile load consumes.
    pub fn load_cost(tile_size: usize) -> u32 {
        u32::try_from(tile_size * tile_size).unwrap_or(u32::MAX)
    }

    pub fn remaining_units(&self) -> u32 {
        self.remaining_units
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_units == 0
    }

    /// Returns `true` if the budget had enough remaining units.
    pub fn try_consume(&mut self, units: u32) -> bool {
        if self.remaining_units < units {
            return false;
        }
        self.remaining_units -= units;
        true
    }
}
