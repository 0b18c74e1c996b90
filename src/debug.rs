//! Read-only debug surface
//!
//! Text overlays of priority maps and moves plus named parameter sections.
//! Everything here reads public state; nothing feeds back into decisions.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::board::Board;
use crate::core::types::{Direction, Move, Point};
use crate::priority::PriorityMap;

/// Named group of key/value pairs shown by a presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DebugSection {
    pub name: String,
    pub parameters: BTreeMap<String, String>,
}

impl DebugSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }
}

/// Arrow glyph for a move direction
pub fn arrow(direction: Direction) -> Option<char> {
    match direction {
        Direction::Up => Some('⇧'),
        Direction::Down => Some('⇩'),
        Direction::Left => Some('⇦'),
        Direction::Right => Some('⇨'),
        Direction::None => None,
    }
}

/// Grid of raw priority values; unreached cells print as `.`
pub fn render_priority_map(board: &dyn Board, map: &PriorityMap) -> String {
    let cell_width = map
        .values()
        .iter()
        .max()
        .map(|max| max.to_string().len())
        .unwrap_or(1);

    let mut out = String::new();
    for row in 0..board.height() {
        let cells: Vec<String> = (0..board.width())
            .map(|col| match map.priority_in(Point::new(row, col)) {
                0 => format!("{:>width$}", ".", width = cell_width),
                value => format!("{:>width$}", value, width = cell_width),
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join(" "));
    }
    out
}

/// Board sketch with the move's arrow at its source and `x` at its destination
pub fn render_move(board: &dyn Board, chosen: &Move) -> String {
    let glyph = arrow(chosen.direction()).unwrap_or('*');
    let mut out = String::new();
    for row in 0..board.height() {
        for col in 0..board.width() {
            let point = Point::new(row, col);
            let ch = if point == chosen.from {
                glyph
            } else if point == chosen.to {
                'x'
            } else {
                tile_glyph(board, point)
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

/// Multi-line dump of parameter sections
pub fn format_sections(sections: &[DebugSection]) -> String {
    let mut out = String::new();
    for section in sections {
        let _ = writeln!(out, "[{}]", section.name);
        for (key, value) in &section.parameters {
            let _ = writeln!(out, "  {}: {}", key, value);
        }
    }
    out
}

fn tile_glyph(board: &dyn Board, point: Point) -> char {
    let Some(tile) = board.tile_properties(point) else {
        return ' ';
    };
    if tile.terrain.is_obstacle() {
        return '#';
    }
    let mine = tile.is_owned_by(board.me());
    match (tile.is_general, tile.is_city, tile.owner) {
        (true, _, _) if mine => 'G',
        (true, _, _) => 'g',
        (_, true, None) => 'C',
        (_, true, _) if mine => 'M',
        (_, true, _) => 'm',
        (_, _, None) => '.',
        _ if mine => 'A',
        _ => 'E',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GridBoard;
    use crate::core::types::PlayerId;
    use crate::priority::DistanceTarget;

    #[test]
    fn test_render_priority_map() {
        let board = GridBoard::from_ascii("...\n.#.", PlayerId(0)).unwrap();
        let mut map = PriorityMap::new();
        map.add_target(DistanceTarget::new(Point::new(0, 0)));
        map.compute_map(&board);

        assert_eq!(render_priority_map(&board, &map), "1 2 3\n2 . 4\n");
    }

    #[test]
    fn test_render_move_marks_endpoints() {
        let board = GridBoard::from_ascii("GA.\n.#C", PlayerId(0)).unwrap();
        let chosen = Move::new(Point::new(0, 1), Point::new(0, 2));
        assert_eq!(render_move(&board, &chosen), "G⇨x\n.#C\n");
    }

    #[test]
    fn test_format_sections() {
        let sections = vec![DebugSection::new("General distance").with("general", "(1, 1)")];
        assert_eq!(format_sections(&sections), "[General distance]\n  general: (1, 1)\n");
    }
}
