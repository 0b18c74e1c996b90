//! Multi-source priority field over the whole board
//!
//! Numeric convention: a cell's priority is its step distance from the nearest
//! target origin plus one. Zero means "not reached". Consumers translate zero
//! to whatever "unreachable" means for them; the map itself stays agnostic.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::{neighbors, Board};
use crate::core::types::{CellIndex, Point};
use crate::priority::target::Target;

/// Handle of a target registered in a [`PriorityMap`]
///
/// Ids follow registration order, which is also the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub usize);

/// Problem reported by the last `compute_map` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapDiagnostic {
    /// The target still held seeds from an earlier compute; they were reused
    AlreadySeeded { target: TargetId, name: String },
}

/// Dense priority field plus the targets that seed it
#[derive(Default)]
pub struct PriorityMap {
    width: usize,
    height: usize,
    field: Vec<u32>,
    attribution: Vec<Option<TargetId>>,
    targets: Vec<Box<dyn Target>>,
    diagnostics: Vec<MapDiagnostic>,
    computed: bool,
}

impl std::fmt::Debug for PriorityMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityMap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("targets", &self.targets.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("computed", &self.computed)
            .finish()
    }
}

impl PriorityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target. Nothing is computed until `compute_map`.
    pub fn add_target(&mut self, target: impl Target + 'static) -> TargetId {
        let id = TargetId(self.targets.len());
        self.targets.push(Box::new(target));
        id
    }

    pub fn target(&self, id: TargetId) -> Option<&dyn Target> {
        self.targets.get(id.0).map(|target| target.as_ref())
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut (dyn Target + 'static)> {
        self.targets.get_mut(id.0).map(|target| target.as_mut())
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Clear every target so the next compute re-seeds them all
    pub fn clear_targets(&mut self) {
        for target in &mut self.targets {
            target.clear();
        }
    }

    /// Recompute the whole field from the registered targets
    ///
    /// Breadth-first from every seed at once, so each reachable cell ends up
    /// with `1 + steps to the nearest origin`. A cell two targets reach at the
    /// same distance belongs to the one registered first. Cells that are not
    /// traversable are never entered, but a seed may sit on one.
    pub fn compute_map(&mut self, board: &dyn Board) {
        let cell_count = board.cell_count();
        self.width = board.width();
        self.height = board.height();

        if self.field.len() != cell_count {
            self.field = vec![0; cell_count];
            self.attribution = vec![None; cell_count];
        } else {
            self.field.fill(0);
            self.attribution.fill(None);
        }
        self.diagnostics.clear();

        let mut initial: Vec<(CellIndex, u32)> = Vec::new();

        for (position, target) in self.targets.iter_mut().enumerate() {
            let id = TargetId(position);
            target.reset_claims();

            let seeds = match target.seed(board) {
                Ok(seeds) => seeds,
                Err(err) => {
                    tracing::warn!("Reusing existing seeds: {}", err);
                    self.diagnostics.push(MapDiagnostic::AlreadySeeded {
                        target: id,
                        name: target.name(),
                    });
                    target.seeds().to_vec()
                }
            };

            for (cell, priority) in seeds {
                if cell >= cell_count || priority == 0 || self.field[cell] != 0 {
                    continue;
                }
                self.field[cell] = priority;
                self.attribution[cell] = Some(id);
                target.record(cell, priority);
                initial.push((cell, priority));
            }
        }

        // Stable: equal seeds keep registration order
        initial.sort_by_key(|&(_, priority)| priority);
        let mut frontier: VecDeque<CellIndex> = initial.into_iter().map(|(cell, _)| cell).collect();

        while let Some(cell) = frontier.pop_front() {
            let current = self.field[cell];
            if current == u32::MAX {
                continue;
            }
            let Some(owner) = self.attribution[cell] else {
                continue;
            };
            let next = current + 1;

            for neighbor in neighbors(board, board.to_point(cell)) {
                let Some(neighbor_index) = board.to_index(neighbor) else {
                    continue;
                };
                if self.field[neighbor_index] != 0 || !board.is_traversable(neighbor) {
                    continue;
                }

                self.field[neighbor_index] = next;
                self.attribution[neighbor_index] = Some(owner);
                self.targets[owner.0].record(neighbor_index, next);
                frontier.push_back(neighbor_index);
            }
        }

        self.computed = true;
        tracing::debug!(
            "Computed priority map over {} cells from {} targets ({} reached)",
            cell_count,
            self.targets.len(),
            self.field.iter().filter(|&&value| value != 0).count()
        );
    }

    /// Raw stored priority at a point (0 when unreached or off the field)
    pub fn priority_in(&self, point: Point) -> u32 {
        self.index(point).map(|index| self.field[index]).unwrap_or(0)
    }

    /// Target that claimed the point in the last compute
    pub fn attribution(&self, point: Point) -> Option<TargetId> {
        self.index(point).and_then(|index| self.attribution[index])
    }

    /// Neighbor one step closer to the nearest origin
    ///
    /// Picks the reached neighbor with the lowest priority strictly below the
    /// priority of `from`; the first such neighbor wins ties.
    pub fn descend(&self, board: &dyn Board, from: Point) -> Option<Point> {
        let current = self.priority_in(from);
        if current <= 1 {
            return None;
        }

        let mut best: Option<(u32, Point)> = None;
        for neighbor in neighbors(board, from) {
            let priority = self.priority_in(neighbor);
            if priority == 0 || priority >= current {
                continue;
            }
            if best.map_or(true, |(lowest, _)| priority < lowest) {
                best = Some((priority, neighbor));
            }
        }
        best.map(|(_, point)| point)
    }

    /// Raw field in row-major order, for overlays
    pub fn values(&self) -> &[u32] {
        &self.field
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn diagnostics(&self) -> &[MapDiagnostic] {
        &self.diagnostics
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    fn index(&self, point: Point) -> Option<usize> {
        if point.row < self.height && point.col < self.width {
            Some(point.row * self.width + point.col)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GridBoard;
    use crate::core::types::PlayerId;
    use crate::priority::target::{DistanceTarget, MultiDistanceTarget};

    fn open_board(width: usize, height: usize) -> GridBoard {
        GridBoard::new(width, height, PlayerId(0))
    }

    #[test]
    fn test_center_target_on_three_by_three() {
        let board = open_board(3, 3);
        let mut map = PriorityMap::new();
        map.add_target(DistanceTarget::new(Point::new(1, 1)));
        map.compute_map(&board);

        assert_eq!(map.priority_in(Point::new(1, 1)), 1);
        assert_eq!(map.priority_in(Point::new(0, 1)), 2);
        assert_eq!(map.priority_in(Point::new(0, 0)), 3);
        assert!(map.values().iter().all(|&value| value != 0));
    }

    #[test]
    fn test_unreached_before_compute() {
        let map = PriorityMap::new();
        assert!(!map.is_computed());
        assert_eq!(map.priority_in(Point::new(0, 0)), 0);
    }

    #[test]
    fn test_walls_are_not_entered() {
        let board = GridBoard::from_ascii(
            "
            ...
            .#.
            .#.
            ",
            PlayerId(0),
        )
        .unwrap();
        let mut map = PriorityMap::new();
        map.add_target(DistanceTarget::new(Point::new(2, 0)));
        map.compute_map(&board);

        assert_eq!(map.priority_in(Point::new(1, 1)), 0);
        assert_eq!(map.priority_in(Point::new(2, 1)), 0);
        // Around the wall: up two, right two, down two
        assert_eq!(map.priority_in(Point::new(2, 2)), 7);
    }

    #[test]
    fn test_enclosed_region_unreached() {
        let board = GridBoard::from_ascii(
            "
            .#.
            ##.
            ...
            ",
            PlayerId(0),
        )
        .unwrap();
        let mut map = PriorityMap::new();
        map.add_target(DistanceTarget::new(Point::new(2, 2)));
        map.compute_map(&board);

        assert_eq!(map.priority_in(Point::new(0, 0)), 0);
        assert_eq!(map.attribution(Point::new(0, 0)), None);
        assert_eq!(map.priority_in(Point::new(0, 2)), 3);
    }

    #[test]
    fn test_first_registered_target_wins_ties() {
        let board = open_board(5, 1);
        let mut map = PriorityMap::new();
        let left = map.add_target(DistanceTarget::new(Point::new(0, 0)));
        let right = map.add_target(DistanceTarget::new(Point::new(0, 4)));
        map.compute_map(&board);

        // (0, 2) is two steps from both origins
        assert_eq!(map.priority_in(Point::new(0, 2)), 3);
        assert_eq!(map.attribution(Point::new(0, 2)), Some(left));
        assert_eq!(map.attribution(Point::new(0, 3)), Some(right));
        assert!(map.target(left).unwrap().claimed().contains_key(&2));
        assert!(!map.target(right).unwrap().claimed().contains_key(&2));
    }

    #[test]
    fn test_shared_seed_cell_belongs_to_first_target() {
        let board = open_board(3, 1);
        let mut map = PriorityMap::new();
        let first = map.add_target(DistanceTarget::new(Point::new(0, 1)));
        let second = map.add_target(MultiDistanceTarget::new("also center", [Point::new(0, 1)]));
        map.compute_map(&board);

        assert_eq!(map.attribution(Point::new(0, 1)), Some(first));
        assert!(map.target(second).unwrap().claimed().is_empty());
    }

    #[test]
    fn test_recompute_without_clear_reports_and_keeps_field() {
        let board = open_board(4, 4);
        let mut map = PriorityMap::new();
        let id = map.add_target(DistanceTarget::new(Point::new(0, 0)));
        map.compute_map(&board);
        let first = map.values().to_vec();
        assert!(map.diagnostics().is_empty());

        map.compute_map(&board);
        assert_eq!(map.values(), first.as_slice());
        assert_eq!(
            map.diagnostics(),
            &[MapDiagnostic::AlreadySeeded {
                target: id,
                name: "distance from (0, 0)".to_string(),
            }]
        );

        map.clear_targets();
        map.compute_map(&board);
        assert!(map.diagnostics().is_empty());
        assert_eq!(map.values(), first.as_slice());
    }

    #[test]
    fn test_descend_walks_toward_origin() {
        let board = open_board(3, 3);
        let mut map = PriorityMap::new();
        map.add_target(DistanceTarget::new(Point::new(0, 0)));
        map.compute_map(&board);

        assert_eq!(map.descend(&board, Point::new(2, 2)), Some(Point::new(1, 2)));
        assert_eq!(map.descend(&board, Point::new(0, 1)), Some(Point::new(0, 0)));
        assert_eq!(map.descend(&board, Point::new(0, 0)), None);
    }

    #[test]
    fn test_no_targets_leaves_field_empty() {
        let board = open_board(2, 2);
        let mut map = PriorityMap::new();
        map.compute_map(&board);
        assert!(map.is_computed());
        assert_eq!(map.values(), &[0, 0, 0, 0]);
    }
}
