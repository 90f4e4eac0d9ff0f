use std::collections::VecDeque;

use crs::Crs;
use formats::Geometry;
use foundation::arena::Arena;
use tracing::{debug, trace};

use crate::config::TilingConfig;
use crate::error::TileError;
use crate::load::{DropReason, LoadBudget, LoadOutcome, LoadTicket};
use crate::scheme::TilingScheme;
use crate::tile::{Tile, TileHandle, TileState, TileView};

/// Quad-tree of tiles over one scheme and one CRS.
///
/// Tiles live in a generational arena, so handles to disposed tiles simply
/// stop resolving instead of dangling.
pub struct TileTree<S: TilingScheme> {
    scheme: S,
    crs: Crs,
    config: TilingConfig,
    tiles: Arena<Tile<S::Index>>,
    roots: Vec<TileHandle>,
    queue: VecDeque<LoadTicket>,
    next_request: u64,
}

impl<S: TilingScheme> TileTree<S> {
    pub fn new(scheme: S, crs: Crs, config: TilingConfig) -> Result<Self, TileError> {
        config.validate()?;
        let mut tiles = Arena::new();
        let roots = scheme
            .level_zero_indices()
            .into_iter()
            .map(|index| tiles.alloc(Tile::new(&scheme, index, None)))
            .collect();
        Ok(Self {
            scheme,
            crs,
            config,
            tiles,
            roots,
            queue: VecDeque::new(),
            next_request: 0,
        })
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    pub fn roots(&self) -> &[TileHandle] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, handle: TileHandle) -> Option<&Tile<S::Index>> {
        self.tiles.get(handle)
    }

    fn tile(&self, handle: TileHandle) -> Result<&Tile<S::Index>, TileError> {
        self.tiles.get(handle).ok_or(TileError::UnknownTile)
    }

    fn tile_mut(&mut self, handle: TileHandle) -> Result<&mut Tile<S::Index>, TileError> {
        self.tiles.get_mut(handle).ok_or(TileError::UnknownTile)
    }

    /// Children of `handle`, created on first use.
    pub fn refine(&mut self, handle: TileHandle) -> Result<[TileHandle; 4], TileError> {
        let tile = self.tile(handle)?;
        if let Some(children) = tile.children {
            return Ok(children);
        }
        if tile.level() >= self.config.max_level {
            return Err(TileError::MaxLevelReached(self.config.max_level));
        }
        let indices = self.scheme.children(tile.index());
        let children = indices.map(|index| {
            self.tiles
                .alloc(Tile::new(&self.scheme, index, Some(handle)))
        });
        self.tile_mut(handle)?.children = Some(children);
        trace!(level = self.tile(handle)?.level(), "refined tile");
        Ok(children)
    }

    /// Destroy every descendant of `handle`. Returns the number removed.
    ///
    /// Outstanding load tickets for the removed tiles are dropped when they
    /// complete.
    pub fn dispose_children(&mut self, handle: TileHandle) -> Result<usize, TileError> {
        let Some(children) = self.tile_mut(handle)?.children.take() else {
            return Ok(0);
        };
        let mut stack: Vec<TileHandle> = children.to_vec();
        let mut removed = 0;
        while let Some(h) = stack.pop() {
            if let Some(tile) = self.tiles.remove(h) {
                removed += 1;
                if let Some(grandchildren) = tile.children {
                    stack.extend(grandchildren);
                }
            }
        }
        Ok(removed)
    }

    /// First candidate whose region contains `(lon, lat)`.
    pub fn find_inside_tile(&self, lon: f64, lat: f64, candidates: &[TileHandle]) -> Option<TileHandle> {
        candidates.iter().copied().find(|&h| {
            self.tiles
                .get(h)
                .is_some_and(|t| self.scheme.contains(t.index(), lon, lat))
        })
    }

    /// Deepest existing tile containing `(lon, lat)`, descending at most to
    /// `max_level`.
    pub fn locate(&self, lon: f64, lat: f64, max_level: u32) -> Option<TileHandle> {
        let mut current = self.find_inside_tile(lon, lat, &self.roots)?;
        loop {
            let tile = self.tiles.get(current)?;
            if tile.level() >= max_level {
                return Some(current);
            }
            match tile.children.and_then(|c| self.find_inside_tile(lon, lat, &c)) {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Root tiles touched by any vertex of `geometry`.
    pub fn overlapped_roots(&self, geometry: &Geometry) -> Vec<TileHandle> {
        self.scheme
            .overlapped_level_zero_indices(geometry)
            .into_iter()
            .filter_map(|index| {
                self.roots
                    .iter()
                    .copied()
                    .find(|&h| self.tiles.get(h).is_some_and(|t| t.index() == index))
            })
            .collect()
    }

    /// Start a load. Any earlier ticket for the same tile becomes stale.
    pub fn begin_load(&mut self, handle: TileHandle) -> Result<LoadTicket, TileError> {
        let request = self.next_request;
        let tile = self.tile_mut(handle)?;
        tile.state = TileState::Loading;
        tile.pending = Some(request);
        self.next_request += 1;
        Ok(LoadTicket {
            tile: handle,
            request,
        })
    }

    /// Start a load and queue its completion for [`TileTree::process_loads`].
    pub fn request_load(&mut self, handle: TileHandle) -> Result<LoadTicket, TileError> {
        let ticket = self.begin_load(handle)?;
        self.queue.push_back(ticket);
        Ok(ticket)
    }

    /// Abandon an in-flight load. Returns `false` if nothing was loading.
    pub fn cancel_load(&mut self, handle: TileHandle) -> Result<bool, TileError> {
        let tile = self.tile_mut(handle)?;
        if tile.state != TileState::Loading {
            return Ok(false);
        }
        tile.state = if tile.has_vertices() {
            TileState::Loaded
        } else {
            TileState::NotLoaded
        };
        tile.pending = None;
        Ok(true)
    }

    /// Apply a finished load, generating the tile's vertex grid.
    ///
    /// Results for disposed tiles, cancelled requests and superseded
    /// tickets are dropped.
    pub fn complete_load(&mut self, ticket: LoadTicket) -> Result<LoadOutcome, TileError> {
        let size = self.config.tile_size;
        let Some(tile) = self.tiles.get_mut(ticket.tile) else {
            debug!(request = ticket.request, "dropping load for disposed tile");
            return Ok(LoadOutcome::Dropped(DropReason::Disposed));
        };
        if tile.pending != Some(ticket.request) {
            debug!(
                request = ticket.request,
                pending = ?tile.pending,
                "dropping stale tile load"
            );
            return Ok(LoadOutcome::Dropped(DropReason::Stale));
        }
        tile.generate_vertices(&self.scheme, &self.crs, size)?;
        tile.pending = None;
        tile.state = TileState::Loaded;
        Ok(LoadOutcome::Applied)
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        self.tiles
            .get(ticket.tile)
            .is_some_and(|tile| tile.pending == Some(ticket.request))
    }

    /// Complete queued loads while `budget` allows. Only applied loads are
    /// charged; dropped tickets are drained for free.
    pub fn process_loads(&mut self, budget: &mut LoadBudget) -> Result<Vec<(LoadTicket, LoadOutcome)>, TileError> {
        let cost = LoadBudget::load_cost(self.config.tile_size);
        let mut done = Vec::new();
        while let Some(&ticket) = self.queue.front() {
            if self.is_current(ticket) && !budget.try_consume(cost) {
                break;
            }
            self.queue.pop_front();
            let outcome = self.complete_load(ticket)?;
            done.push((ticket, outcome));
        }
        Ok(done)
    }

    pub fn pending_loads(&self) -> usize {
        self.queue.len()
    }

    /// The tile, once its load has been applied.
    pub fn loaded_tile(&self, handle: TileHandle) -> Result<&Tile<S::Index>, TileError> {
        let tile = self.tile(handle)?;
        match tile.state() {
            TileState::Loaded => Ok(tile),
            state => Err(TileError::NotLoaded(state)),
        }
    }

    pub fn loaded_surface(&self, handle: TileHandle) -> Result<TileView<'_, S>, TileError> {
        self.loaded_tile(handle)?.surface(&self.scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::TileTree;
    use crate::config::TilingConfig;
    use crate::error::TileError;
    use crate::healpix::HealpixTiling;
    use crate::load::{DropReason, LoadBudget, LoadOutcome};
    use crate::quad::{GeoTiling, QuadIndex};
    use crate::tile::{TileState, TileSurface};
    use crs::CrsRegistry;
    use formats::Geometry;

    fn quad_tree() -> TileTree<GeoTiling> {
        let crs = CrsRegistry::with_defaults().get("EPSG:4326").expect("crs").clone();
        TileTree::new(GeoTiling::world(), crs, TilingConfig::default()).expect("tree")
    }

    #[test]
    fn roots_follow_scheme() {
        let tree = quad_tree();
        assert_eq!(tree.roots().len(), 8);
        let crs = CrsRegistry::with_defaults().get("Equatorial").expect("crs").clone();
        let sky = TileTree::new(HealpixTiling::new(), crs, TilingConfig::default()).expect("tree");
        assert_eq!(sky.roots().len(), 12);
    }

    #[test]
    fn refine_is_lazy_and_idempotent() {
        let mut tree = quad_tree();
        let root = tree.roots()[0];
        let a = tree.refine(root).expect("refine");
        let b = tree.refine(root).expect("refine");
        assert_eq!(a, b);
        assert_eq!(tree.len(), 12);
        let child = tree.get(a[3]).expect("child");
        assert_eq!(child.index(), QuadIndex::new(1, 1, 1));
        assert_eq!(child.parent(), Some(root));
    }

    #[test]
    fn dispose_children_is_recursive() {
        let mut tree = quad_tree();
        let root = tree.roots()[0];
        let kids = tree.refine(root).expect("refine");
        tree.refine(kids[2]).expect("refine");
        assert_eq!(tree.dispose_children(root), Ok(8));
        assert_eq!(tree.len(), 8);
        assert!(tree.get(kids[2]).is_none());
        assert_eq!(tree.refine(kids[0]), Err(TileError::UnknownTile));
        assert_eq!(tree.dispose_children(root), Ok(0));
    }

    #[test]
    fn locate_descends_existing_tiles() {
        let mut tree = quad_tree();
        let root = tree.locate(10.0, 10.0, 5).expect("root");
        assert_eq!(tree.get(root).expect("tile").level(), 0);
        let kids = tree.refine(root).expect("refine");
        let hit = tree.locate(10.0, 10.0, 5).expect("child");
        assert_eq!(hit, kids[0]);
        assert_eq!(tree.locate(10.0, 10.0, 0), Some(root));
    }

    #[test]
    fn load_lifecycle() {
        let mut tree = quad_tree();
        let root = tree.roots()[3];
        assert_eq!(tree.loaded_tile(root).err(), Some(TileError::NotLoaded(TileState::NotLoaded)));

        let ticket = tree.begin_load(root).expect("begin");
        assert_eq!(tree.get(root).expect("tile").state(), TileState::Loading);
        assert_eq!(tree.complete_load(ticket), Ok(LoadOutcome::Applied));

        let tile = tree.loaded_tile(root).expect("loaded");
        assert_eq!(tile.grid().expect("grid").size(), 9);
        let surface = tree.loaded_surface(root).expect("surface");
        assert_eq!(surface.grid_size(), 9);
    }

    #[test]
    fn late_results_are_dropped() {
        let mut tree = quad_tree();
        let root = tree.roots()[1];
        let kids = tree.refine(root).expect("refine");

        let orphan = tree.begin_load(kids[0]).expect("begin");
        tree.dispose_children(root).expect("dispose");
        assert_eq!(
            tree.complete_load(orphan),
            Ok(LoadOutcome::Dropped(DropReason::Disposed))
        );

        let old = tree.begin_load(root).expect("begin");
        let new = tree.begin_load(root).expect("begin");
        assert_eq!(tree.complete_load(old), Ok(LoadOutcome::Dropped(DropReason::Stale)));
        assert_eq!(tree.complete_load(new), Ok(LoadOutcome::Applied));

        let cancelled = tree.begin_load(tree.roots()[2]).expect("begin");
        assert_eq!(tree.cancel_load(cancelled.tile), Ok(true));
        assert_eq!(
            tree.complete_load(cancelled),
            Ok(LoadOutcome::Dropped(DropReason::Stale))
        );
        assert_eq!(
            tree.get(cancelled.tile).expect("tile").state(),
            TileState::NotLoaded
        );
    }

    #[test]
    fn dropped_loads_cost_nothing() {
        let mut tree = quad_tree();
        let roots = tree.roots().to_vec();
        tree.request_load(roots[0]).expect("request");
        tree.request_load(roots[1]).expect("request");
        tree.cancel_load(roots[0]).expect("cancel");
        let child = tree.refine(roots[2]).expect("refine")[0];
        tree.request_load(child).expect("request");
        tree.dispose_children(roots[2]).expect("dispose");
        tree.request_load(roots[3]).expect("request");

        let mut budget = LoadBudget::for_tiles(2, tree.config().tile_size);
        let done = tree.process_loads(&mut budget).expect("process");
        let outcomes: Vec<LoadOutcome> = done.iter().map(|(_, o)| *o).collect();
        assert_eq!(
            outcomes,
            vec![
                LoadOutcome::Dropped(DropReason::Stale),
                LoadOutcome::Applied,
                LoadOutcome::Dropped(DropReason::Disposed),
                LoadOutcome::Applied,
            ]
        );
        assert!(budget.is_exhausted());
        assert_eq!(tree.pending_loads(), 0);
    }

    #[test]
    fn process_loads_respects_budget() {
        let mut tree = quad_tree();
        let roots = tree.roots().to_vec();
        for &h in &roots {
            tree.request_load(h).expect("request");
        }
        let mut budget = LoadBudget::new(LoadBudget::load_cost(9) * 3 + 10);
        let done = tree.process_loads(&mut budget).expect("process");
        assert_eq!(done.len(), 3);
        assert_eq!(tree.pending_loads(), 5);

        let done = tree.process_loads(&mut LoadBudget::unlimited()).expect("process");
        assert_eq!(done.len(), 5);
        assert!(done.iter().all(|(_, o)| *o == LoadOutcome::Applied));
    }

    #[test]
    fn overlapped_roots_map_to_handles() {
        let tree = quad_tree();
        let line = Geometry::line_string(&[(-170.0, 10.0), (170.0, 10.0)]);
        let roots = tree.overlapped_roots(&line);
        assert_eq!(roots, vec![tree.roots()[4], tree.roots()[7]]);
    }
}
