//! Brick layouts and per-level tuning
//!
//! Five hand-authored levels on a 9x6 grid. Row 0 is the bottom row and
//! column 0 is the rightmost column.

use glam::Vec2;

use super::collision::Aabb;
use super::state::Brick;
use crate::consts::*;

/// Which bricks are present on the grid, indexed `[row][col]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrickLayout {
    pub cells: [[bool; BRICK_COLS]; BRICK_ROWS],
}

impl BrickLayout {
    pub fn full() -> Self {
        Self {
            cells: [[true; BRICK_COLS]; BRICK_ROWS],
        }
    }

    /// Bricks where `(col + row)` is even
    pub fn checkerboard() -> Self {
        let mut cells = [[false; BRICK_COLS]; BRICK_ROWS];
        for (row, line) in cells.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                *cell = (col + row) % 2 == 0;
            }
        }
        Self { cells }
    }

    /// Build from a row-major bit pattern, bottom row first
    pub fn from_pattern(pattern: &[u8; BRICK_COLS * BRICK_ROWS]) -> Self {
        let mut cells = [[false; BRICK_COLS]; BRICK_ROWS];
        for (row, line) in cells.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                *cell = pattern[row * BRICK_COLS + col] == 1;
            }
        }
        Self { cells }
    }

    pub fn count(&self) -> u32 {
        self.cells.iter().flatten().filter(|c| **c).count() as u32
    }

    pub fn is_set(&self, col: usize, row: usize) -> bool {
        self.cells[row][col]
    }

    /// Instantiate bricks for a field centered on `origin_x`
    pub fn spawn(&self, origin_x: f32, first_id: u32) -> Vec<Brick> {
        let mut bricks = Vec::with_capacity(self.count() as usize);
        let mut id = first_id;
        for (row, line) in self.cells.iter().enumerate() {
            for (col, present) in line.iter().enumerate() {
                if !present {
                    continue;
                }
                bricks.push(Brick {
                    id,
                    col: col as u8,
                    row: row as u8,
                    rect: Aabb::new(
                        brick_center(origin_x, col, row),
                        Vec2::new(BRICK_WIDTH, BRICK_HEIGHT),
                    ),
                });
                id += 1;
            }
        }
        bricks
    }
}

/// World-space center of a grid cell
pub fn brick_center(origin_x: f32, col: usize, row: usize) -> Vec2 {
    Vec2::new(
        origin_x + ((BRICK_COLS - 1) as f32 * 0.5 - col as f32) * BRICK_SPACING_X,
        BRICK_ORIGIN_Y + row as f32 * BRICK_SPACING_Y,
    )
}

#[rustfmt::skip]
const DIAMOND: [u8; BRICK_COLS * BRICK_ROWS] = [
    0, 0, 1, 0, 0, 0, 1, 0, 0,
    1, 0, 0, 0, 1, 0, 0, 0, 1,
    0, 1, 0, 1, 0, 1, 0, 1, 0,
    0, 0, 1, 0, 0, 0, 1, 0, 0,
    0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 0, 0, 1, 0, 0, 0, 1,
];

#[rustfmt::skip]
const SCATTER: [u8; BRICK_COLS * BRICK_ROWS] = [
    1, 0, 0, 0, 0, 0, 1, 0, 0,
    0, 0, 1, 0, 1, 0, 1, 0, 1,
    0, 0, 0, 1, 0, 0, 0, 0, 0,
    0, 0, 0, 1, 0, 0, 0, 1, 0,
    0, 1, 0, 0, 0, 1, 0, 1, 0,
    0, 0, 0, 0, 1, 0, 0, 0, 0,
];

/// What happens to the brick field when a level starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSetup {
    /// Clear the field and lay out fresh bricks
    Fresh(BrickLayout),
    /// Keep the surviving bricks; only the tuning changes
    Carry,
}

/// Brick setup for a level (1-based). None past the final level.
pub fn level_setup(level: u32) -> Option<LevelSetup> {
    match level {
        1 => Some(LevelSetup::Fresh(BrickLayout::full())),
        2 => Some(LevelSetup::Carry),
        3 => Some(LevelSetup::Fresh(BrickLayout::checkerboard())),
        4 => Some(LevelSetup::Fresh(BrickLayout::from_pattern(&DIAMOND))),
        5 => Some(LevelSetup::Fresh(BrickLayout::from_pattern(&SCATTER))),
        _ => None,
    }
}

/// Difficulty knobs applied on entering a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTuning {
    /// Brick value = BASE_BRICK_VALUE * point_multiplier
    pub point_multiplier: u32,
    /// Bonus awarded for clearing the previous level in BONUS_REFERENCE_SECS or less
    pub max_bonus_points: u32,
    /// Fraction of paddle width removed
    pub paddle_shrink: f32,
    /// Fraction added to the ball speed cap
    pub ball_speedup: f32,
}

pub fn level_tuning(level: u32) -> LevelTuning {
    match level {
        0 | 1 => LevelTuning {
            point_multiplier: 1,
            max_bonus_points: 0,
            paddle_shrink: 0.0,
            ball_speedup: 0.0,
        },
        level => LevelTuning {
            point_multiplier: level,
            max_bonus_points: 500 * (level - 1),
            paddle_shrink: 0.1,
            ball_speedup: 0.1,
        },
    }
}

impl LevelTuning {
    pub fn brick_value(&self) -> u32 {
        BASE_BRICK_VALUE * self.point_multiplier
    }

    /// Bonus for a level cleared in `elapsed_secs`, inversely proportional to the time taken
    pub fn time_bonus(&self, elapsed_secs: f32) -> u32 {
        let elapsed = elapsed_secs.max(SIM_DT);
        let bonus = self.max_bonus_points as f32 * BONUS_REFERENCE_SECS / elapsed;
        (bonus.round() as u32).min(self.max_bonus_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(level: u32) -> BrickLayout {
        match level_setup(level) {
            Some(LevelSetup::Fresh(layout)) => layout,
            other => panic!("level {level} is not fresh: {other:?}"),
        }
    }

    #[test]
    fn test_brick_counts() {
        assert_eq!(fresh(1).count(), 54);
        assert_eq!(level_setup(2), Some(LevelSetup::Carry));
        assert_eq!(fresh(3).count(), 27);
        assert_eq!(fresh(4).count(), 18);
        assert_eq!(fresh(5).count(), 13);
        assert_eq!(level_setup(6), None);
        assert_eq!(level_setup(0), None);
    }

    #[test]
    fn test_carryover_matches_checkerboard_size() {
        assert_eq!(LEVEL_ONE_CARRYOVER_BRICKS, fresh(3).count());
    }

    #[test]
    fn test_pattern_rows_bottom_first() {
        let diamond = fresh(4);
        assert!(diamond.is_set(2, 0));
        assert!(!diamond.is_set(0, 0));
        assert!(diamond.is_set(0, 1));
    }

    #[test]
    fn test_spawn_positions() {
        let bricks = BrickLayout::full().spawn(0.0, 10);
        assert_eq!(bricks.len(), 54);
        assert_eq!(bricks[0].id, 10);
        // Column 0 sits on the right
        assert!((bricks[0].rect.center - Vec2::new(2.8, 1.5)).length() < 1e-5);
        let top = bricks.iter().map(|b| b.rect.center.y).fold(f32::MIN, f32::max);
        assert!((top - 2.75).abs() < 1e-5);
        assert!(top + BRICK_HEIGHT / 2.0 < CEILING_Y);
    }

    #[test]
    fn test_spawn_respects_origin() {
        let left = BrickLayout::checkerboard().spawn(-4.0, 1);
        let center = BrickLayout::checkerboard().spawn(0.0, 1);
        for (l, c) in left.iter().zip(&center) {
            assert!((l.rect.center.x + 4.0 - c.rect.center.x).abs() < 1e-5);
        }
    }

    #[test]
    fn test_tuning_scales_with_level() {
        assert_eq!(level_tuning(1).brick_value(), 10);
        assert_eq!(level_tuning(3).brick_value(), 30);
        assert_eq!(level_tuning(1).time_bonus(1.0), 0);
    }

    #[test]
    fn test_time_bonus_inverse_to_elapsed() {
        let tuning = level_tuning(2);
        assert_eq!(tuning.time_bonus(10.0), 500); // capped
        assert_eq!(tuning.time_bonus(30.0), 500);
        assert_eq!(tuning.time_bonus(60.0), 250);
        assert_eq!(tuning.time_bonus(120.0), 125);
        assert_eq!(tuning.time_bonus(0.0), 500);
    }
}
