//! In-memory board
//!
//! Tracks which cells changed since the last notification so it can hand out
//! [`BoardChanges`] the way a live game client would. Move resolution is the
//! bare minimum needed to exercise the agent.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::core::error::{AgentError, Result};
use crate::core::types::{BoardChanges, CellIndex, PlayerId, Point, TileProperties, Terrain, Turn};

/// Dense row-major board
#[derive(Debug, Clone)]
pub struct GridBoard {
    width: usize,
    height: usize,
    tiles: Vec<TileProperties>,
    me: PlayerId,
    turn: Turn,
    pending: BTreeSet<CellIndex>,
}

impl GridBoard {
    /// Empty neutral board
    pub fn new(width: usize, height: usize, me: PlayerId) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileProperties::empty(); width * height],
            me,
            turn: 0,
            pending: BTreeSet::new(),
        }
    }

    /// Parse a board from rows of characters
    ///
    /// `.` empty, `#` mountain, `?` fog, `%` fogged obstacle, `C` neutral city,
    /// `G`/`A`/`M` our general/tile/city, `g`/`E`/`m` enemy (player 1)
    /// general/tile/city. Every owned tile starts with one army; cities with
    /// ten. Rows are trimmed and blank lines skipped.
    pub fn from_ascii(rows: &str, me: PlayerId) -> Result<Self> {
        let enemy = PlayerId(me.0.wrapping_add(1));
        let lines: Vec<&str> = rows
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let height = lines.len();
        let width = lines.first().map(|line| line.chars().count()).unwrap_or(0);
        let mut board = Self::new(width, height, me);

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(AgentError::InvalidBoard(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    width
                )));
            }
            for (col, ch) in line.chars().enumerate() {
                let tile = match ch {
                    '.' => TileProperties::empty(),
                    '#' => TileProperties::mountain(),
                    '?' => TileProperties {
                        terrain: Terrain::Fog,
                        ..TileProperties::empty()
                    },
                    '%' => TileProperties {
                        terrain: Terrain::FogObstacle,
                        ..TileProperties::empty()
                    },
                    'C' => TileProperties::city(None, 10),
                    'G' => TileProperties::general(me, 1),
                    'A' => TileProperties::owned(me, 1),
                    'M' => TileProperties::city(Some(me), 10),
                    'g' => TileProperties::general(enemy, 1),
                    'E' => TileProperties::owned(enemy, 1),
                    'm' => TileProperties::city(Some(enemy), 10),
                    other => {
                        return Err(AgentError::InvalidBoard(format!(
                            "unknown tile '{}' at ({}, {})",
                            other, row, col
                        )))
                    }
                };
                board.tiles[row * width + col] = tile;
            }
        }

        Ok(board)
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn tile(&self, point: Point) -> Option<&TileProperties> {
        self.to_index(point).map(|index| &self.tiles[index])
    }

    /// Replace a tile, recording the cell as changed if anything differs
    pub fn set_tile(&mut self, point: Point, tile: TileProperties) -> Result<()> {
        let index = self.to_index(point).ok_or(AgentError::OutOfBounds(point))?;
        if self.tiles[index] != tile {
            self.tiles[index] = tile;
            self.pending.insert(index);
        }
        Ok(())
    }

    pub fn set_army(&mut self, point: Point, army: u32) -> Result<()> {
        let mut tile = *self.tile(point).ok_or(AgentError::OutOfBounds(point))?;
        tile.army = army;
        self.set_tile(point, tile)
    }

    /// Flag every cell as changed, as on the first turn of a game
    pub fn mark_all_changed(&mut self) {
        self.pending.extend(0..self.tiles.len());
    }

    /// Hand out the changes accumulated since the last call and advance the turn
    pub fn take_changes(&mut self) -> BoardChanges {
        self.turn += 1;
        let changed = std::mem::take(&mut self.pending);
        BoardChanges::new(self.turn, changed)
    }

    /// Grow armies: generals and owned cities every turn, all owned land every
    /// `land_interval` turns
    pub fn grow_armies(&mut self, land_interval: Turn) {
        let land_turn = land_interval > 0 && self.turn > 0 && self.turn % land_interval == 0;
        for (index, tile) in self.tiles.iter_mut().enumerate() {
            if tile.owner.is_none() {
                continue;
            }
            if tile.is_general || tile.is_city || land_turn {
                tile.army += 1;
                self.pending.insert(index);
            }
        }
    }

    /// Resolve an attack on behalf of `player`
    pub fn attack_as(&mut self, player: PlayerId, from: Point, to: Point) -> bool {
        if !from.is_adjacent(&to) {
            return false;
        }
        let (Some(from_index), Some(to_index)) = (self.to_index(from), self.to_index(to)) else {
            return false;
        };

        let source = self.tiles[from_index];
        let target = self.tiles[to_index];
        if !source.is_owned_by(player) || source.army < 2 || target.terrain.is_obstacle() {
            return false;
        }

        let moving = source.army - 1;
        self.tiles[from_index].army = 1;

        let destination = &mut self.tiles[to_index];
        if destination.is_owned_by(player) {
            destination.army += moving;
        } else if moving > destination.army {
            destination.army = moving - destination.army;
            destination.owner = Some(player);
            // A captured general becomes an ordinary city
            if destination.is_general {
                destination.is_general = false;
                destination.is_city = true;
            }
        } else {
            destination.army -= moving;
        }

        self.pending.insert(from_index);
        self.pending.insert(to_index);
        true
    }
}

impl Board for GridBoard {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn tile_properties(&self, point: Point) -> Option<TileProperties> {
        self.tile(point).copied()
    }

    fn me(&self) -> PlayerId {
        self.me
    }

    fn my_general_location(&self) -> Option<Point> {
        self.tiles
            .iter()
            .position(|tile| tile.is_general && tile.is_owned_by(self.me))
            .map(|index| self.to_point(index))
    }

    fn attack(&mut self, from: Point, to: Point) -> bool {
        self.attack_as(self.me, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: PlayerId = PlayerId(0);

    #[test]
    fn test_from_ascii_layout() {
        let board = GridBoard::from_ascii(
            "
            G.#
            .Cg
            ",
            ME,
        )
        .unwrap();

        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 2);
        assert_eq!(board.my_general_location(), Some(Point::new(0, 0)));
        assert!(board.tile(Point::new(1, 1)).unwrap().is_city);
        assert_eq!(board.tile(Point::new(1, 2)).unwrap().owner, Some(PlayerId(1)));
    }

    #[test]
    fn test_from_ascii_rejects_ragged_rows() {
        let result = GridBoard::from_ascii("G..\n..", ME);
        assert!(matches!(result, Err(AgentError::InvalidBoard(_))));
    }

    #[test]
    fn test_general_unknown_until_revealed() {
        let mut board = GridBoard::new(2, 2, ME);
        assert_eq!(board.my_general_location(), None);

        board.set_tile(Point::new(1, 1), TileProperties::general(ME, 1)).unwrap();
        assert_eq!(board.my_general_location(), Some(Point::new(1, 1)));
    }

    #[test]
    fn test_set_tile_records_only_real_changes() {
        let mut board = GridBoard::new(3, 1, ME);
        board.set_tile(Point::new(0, 1), TileProperties::empty()).unwrap();
        board.set_army(Point::new(0, 2), 4).unwrap();

        let changes = board.take_changes();
        assert_eq!(changes.turn, 1);
        assert_eq!(changes.iter().collect::<Vec<_>>(), vec![2]);
        assert!(board.take_changes().is_empty());
    }

    #[test]
    fn test_attack_captures_neutral_tile() {
        let mut board = GridBoard::from_ascii("G.", ME).unwrap();
        board.set_army(Point::new(0, 0), 5).unwrap();
        let _ = board.take_changes();

        assert!(board.attack(Point::new(0, 0), Point::new(0, 1)));
        let captured = board.tile(Point::new(0, 1)).unwrap();
        assert_eq!(captured.owner, Some(ME));
        assert_eq!(captured.army, 4);
        assert_eq!(board.tile(Point::new(0, 0)).unwrap().army, 1);
        assert_eq!(board.take_changes().len(), 2);
    }

    #[test]
    fn test_attack_rejects_invalid_moves() {
        let mut board = GridBoard::from_ascii("G#.\n..E", ME).unwrap();
        // Single army cannot move
        assert!(!board.attack(Point::new(0, 0), Point::new(1, 0)));

        board.set_army(Point::new(0, 0), 5).unwrap();
        // Not adjacent
        assert!(!board.attack(Point::new(0, 0), Point::new(1, 1)));
        // Into a mountain
        assert!(!board.attack(Point::new(0, 0), Point::new(0, 1)));
        // From a tile we do not own
        assert!(!board.attack(Point::new(1, 2), Point::new(1, 1)));
    }

    #[test]
    fn test_attack_against_stronger_city_only_weakens_it() {
        let mut board = GridBoard::from_ascii("AC", ME).unwrap();
        board.set_army(Point::new(0, 0), 6).unwrap();

        assert!(board.attack(Point::new(0, 0), Point::new(0, 1)));
        let city = board.tile(Point::new(0, 1)).unwrap();
        assert_eq!(city.owner, None);
        assert_eq!(city.army, 5);
    }

    #[test]
    fn test_grow_armies() {
        let mut board = GridBoard::from_ascii("GAM", ME).unwrap();
        let _ = board.take_changes();
        board.grow_armies(25);
        assert_eq!(board.tile(Point::new(0, 0)).unwrap().army, 2);
        assert_eq!(board.tile(Point::new(0, 1)).unwrap().army, 1);
        assert_eq!(board.tile(Point::new(0, 2)).unwrap().army, 11);
    }
}
