//! Tile grid collision.
//!
//! [`TileCollision`] owns the current level as a [`TileGrid`] of tile codes and
//! answers point lookups, ground/pit probes, per-axis body resolution, ray
//! casts and area queries. Lookups never fail: anything outside the grid (or
//! any query before a level is set) reads as [`TileKind::OutOfBounds`].

use bevy_ecs::prelude::Resource;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::body::Body;
use crate::components::tilecontacts::CollisionResult;

pub const DEFAULT_TILE_SIZE: f32 = 16.0;

/// Code returned for coordinates outside the grid.
pub const OUT_OF_BOUNDS: i32 = -1;

/// What a tile code means to the physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    OutOfBounds,
    Pit,
    Solid,
    Collectible,
    MovingPlatform,
    Climbable,
    Checkpoint,
    Goal,
    Unknown(i32),
}

impl TileKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            OUT_OF_BOUNDS => TileKind::OutOfBounds,
            0 => TileKind::Pit,
            1 => TileKind::Solid,
            2 => TileKind::Collectible,
            3 => TileKind::MovingPlatform,
            4 => TileKind::Climbable,
            5 => TileKind::Checkpoint,
            6 => TileKind::Goal,
            other => TileKind::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            TileKind::OutOfBounds => OUT_OF_BOUNDS,
            TileKind::Pit => 0,
            TileKind::Solid => 1,
            TileKind::Collectible => 2,
            TileKind::MovingPlatform => 3,
            TileKind::Climbable => 4,
            TileKind::Checkpoint => 5,
            TileKind::Goal => 6,
            TileKind::Unknown(code) => code,
        }
    }

    /// Blocks movement. Moving platforms count as solid.
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Solid | TileKind::MovingPlatform)
    }

    pub fn is_pit(self) -> bool {
        self == TileKind::Pit
    }

    pub fn is_climbable(self) -> bool {
        self == TileKind::Climbable
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("level parse error: {0}")]
    Parse(String),
}

/// Rectangular row-major grid of tile codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i32>>", into = "Vec<Vec<i32>>")]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<i32>,
}

impl TileGrid {
    /// Build a grid from rows; every row must be as long as the first.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut tiles = Vec::with_capacity(width * height);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(LevelError::Ragged {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
            tiles.extend(cells);
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Parse a JSON array of integer rows.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let rows: Vec<Vec<i32>> =
            serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))?;
        Self::from_rows(rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile code at grid coordinates, `-1` outside.
    pub fn get(&self, tx: i64, ty: i64) -> i32 {
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return OUT_OF_BOUNDS;
        }
        self.tiles[ty as usize * self.width + tx as usize]
    }

    pub fn rows(&self) -> Vec<Vec<i32>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.tiles.chunks(self.width).map(<[i32]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<i32>>> for TileGrid {
    type Error = LevelError;

    fn try_from(rows: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        TileGrid::from_rows(rows)
    }
}

impl From<TileGrid> for Vec<Vec<i32>> {
    fn from(grid: TileGrid) -> Self {
        grid.rows()
    }
}

/// First solid tile hit by [`TileCollision::ray_cast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayHit {
    /// Pixel where the ray entered the tile.
    pub point: IVec2,
    pub tile: i32,
}

/// World-space rectangle of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(rename = "type")]
    pub tile: i32,
}

/// The level's tile grid and the tile size used to map world pixels to it.
#[derive(Resource, Debug, Clone)]
pub struct TileCollision {
    pub tile_size: f32,
    level: Option<TileGrid>,
}

impl Default for TileCollision {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl TileCollision {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            level: None,
        }
    }

    /// Replace the level wholesale.
    pub fn set_level(&mut self, grid: TileGrid) {
        self.level = Some(grid);
    }

    pub fn level(&self) -> Option<&TileGrid> {
        self.level.as_ref()
    }

    fn to_tile(&self, v: f32) -> i64 {
        (v / self.tile_size).floor() as i64
    }

    /// Tile code under world point `(x, y)`, `-1` outside the level.
    pub fn get_tile_at(&self, x: f32, y: f32) -> i32 {
        match &self.level {
            Some(grid) => grid.get(self.to_tile(x), self.to_tile(y)),
            None => OUT_OF_BOUNDS,
        }
    }

    pub fn kind_at(&self, x: f32, y: f32) -> TileKind {
        TileKind::from_code(self.get_tile_at(x, y))
    }

    pub fn is_solid(&self, tile: i32) -> bool {
        TileKind::from_code(tile).is_solid()
    }

    pub fn is_pit(&self, tile: i32) -> bool {
        TileKind::from_code(tile).is_pit()
    }

    pub fn is_climbable(&self, tile: i32) -> bool {
        TileKind::from_code(tile).is_climbable()
    }

    /// Any of the left, centre or right foot probes one pixel below the box
    /// lands on a solid tile.
    pub fn is_on_ground(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let foot_y = y + height + 1.0;
        [x, x + width / 2.0, x + width - 1.0]
            .into_iter()
            .any(|fx| self.kind_at(fx, foot_y).is_solid())
    }

    /// The centre foot probe lands on a pit tile.
    pub fn is_over_pit(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        self.kind_at(x + width / 2.0, y + height + 1.0).is_pit()
    }

    /// Resolve `body` against the grid for a step of `dt` seconds.
    ///
    /// Each axis is probed at the position the body would reach this step.
    /// A blocked axis snaps the body flush to the tile face and zeroes that
    /// velocity component. `body.is_grounded` ends equal to `ground`.
    pub fn check_collisions(&self, body: &mut Body, dt: f32) -> CollisionResult {
        let left = body.x;
        let right = body.x + body.width;
        let top = body.y;
        let bottom = body.y + body.height;
        let center_x = body.x + body.width / 2.0;
        let center_y = body.y + body.height / 2.0;
        let ts = self.tile_size;

        let mut result = CollisionResult::default();

        if body.vy >= 0.0 {
            let foot_y = bottom + body.vy * dt;
            let tile_y = self.to_tile(foot_y) as f32;
            let center = self.kind_at(center_x, foot_y);

            result.pit = center.is_pit();

            if self.kind_at(left, foot_y).is_solid()
                || center.is_solid()
                || self.kind_at(right - 1.0, foot_y).is_solid()
            {
                result.ground = true;
                body.y = tile_y * ts - body.height;
                body.vy = 0.0;
            }
        }

        if body.vy < 0.0 {
            let head_y = top + body.vy * dt;
            if self.kind_at(center_x, head_y).is_solid() {
                result.ceiling = true;
                body.y = (self.to_tile(head_y) + 1) as f32 * ts;
                body.vy = 0.0;
            }
        }

        if body.vx < 0.0 {
            let left_x = left + body.vx * dt;
            if self.kind_at(left_x, center_y).is_solid() {
                result.left_wall = true;
                body.x = (self.to_tile(left_x) + 1) as f32 * ts;
                body.vx = 0.0;
            }
        }

        if body.vx > 0.0 {
            let right_x = right + body.vx * dt;
            if self.kind_at(right_x, center_y).is_solid() {
                result.right_wall = true;
                body.x = self.to_tile(right_x) as f32 * ts - body.width;
                body.vx = 0.0;
            }
        }

        result.climbable = self.kind_at(center_x, center_y).is_climbable();
        body.is_grounded = result.ground;
        result
    }

    /// Walk the pixel line from `start` to `end` and report the first solid
    /// tile crossed, including the start pixel itself.
    /// Error terms are `i64` so endpoints anywhere in `i32` range are safe.
    pub fn ray_cast(&self, start: IVec2, end: IVec2) -> Option<RayHit> {
        self.level.as_ref()?;
        let dx = (i64::from(end.x) - i64::from(start.x)).abs();
        let dy = (i64::from(end.y) - i64::from(start.y)).abs();
        let sx = if start.x < end.x { 1 } else { -1 };
        let sy = if start.y < end.y { 1 } else { -1 };
        let mut err = dx - dy;
        let mut p = start;

        loop {
            let tile = self.get_tile_at(p.x as f32, p.y as f32);
            if self.is_solid(tile) {
                return Some(RayHit { point: p, tile });
            }
            if p == end {
                return None;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                p.x += sx;
            }
            if e2 < dx {
                err += dx;
                p.y += sy;
            }
        }
    }

    /// Solid tiles overlapping the rectangle, edges inclusive, row by row.
    /// Only tiles inside the level are visited.
    pub fn get_solid_tiles_in_area(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<TileRect> {
        let Some(grid) = &self.level else {
            return Vec::new();
        };
        let ts = self.tile_size;
        let x0 = self.to_tile(x).max(0);
        let y0 = self.to_tile(y).max(0);
        let x1 = self.to_tile(x + width).min(grid.width() as i64 - 1);
        let y1 = self.to_tile(y + height).min(grid.height() as i64 - 1);
        let mut tiles = Vec::new();
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                let wx = tx as f32 * ts;
                let wy = ty as f32 * ts;
                let tile = grid.get(tx, ty);
                if self.is_solid(tile) {
                    tiles.push(TileRect {
                        x: wx,
                        y: wy,
                        width: ts,
                        height: ts,
                        tile,
                    });
                }
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 4 rows of 6 tiles, floor on the bottom row with a pit at column 2.
    fn level() -> TileCollision {
        let mut tc = TileCollision::default();
        tc.set_level(
            TileGrid::from_rows(vec![
                vec![1, 1, 1, 1, 1, 1],
                vec![0, 0, 4, 0, 0, 1],
                vec![0, 0, 0, 0, 0, 1],
                vec![1, 1, 0, 3, 1, 1],
            ])
            .unwrap(),
        );
        tc
    }

    #[test]
    fn test_tile_kind_codes() {
        for code in -1..=6 {
            assert_eq!(TileKind::from_code(code).code(), code);
        }
        assert_eq!(TileKind::from_code(42), TileKind::Unknown(42));
        assert!(TileKind::MovingPlatform.is_solid());
        assert!(!TileKind::OutOfBounds.is_solid());
        assert!(!TileKind::OutOfBounds.is_pit());
        assert!(!TileKind::Unknown(9).is_climbable());
    }

    #[test]
    fn test_ragged_level_rejected() {
        let err = TileGrid::from_rows(vec![vec![1, 1], vec![1]]).unwrap_err();
        assert_eq!(
            err,
            LevelError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert!(matches!(TileGrid::from_json("[[1,"), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_grid_json_roundtrip_shape() {
        let grid = TileGrid::from_json("[[1,0],[4,6]]").unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 2));
        assert_eq!(grid.rows(), vec![vec![1, 0], vec![4, 6]]);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, "[[1,0],[4,6]]");
    }

    #[test]
    fn test_get_tile_at_floors_and_bounds() {
        let tc = level();
        assert_eq!(tc.get_tile_at(0.0, 0.0), 1);
        assert_eq!(tc.get_tile_at(15.9, 16.0), 0);
        assert_eq!(tc.get_tile_at(32.0, 16.0), 4);
        assert_eq!(tc.get_tile_at(-0.1, 0.0), -1);
        assert_eq!(tc.get_tile_at(96.0, 0.0), -1);
        assert_eq!(tc.get_tile_at(0.0, 64.0), -1);
        assert_eq!(TileCollision::default().get_tile_at(0.0, 0.0), -1);
    }

    #[test]
    fn test_left_foot_on_solid_and_centre_over_pit() {
        let tc = level();
        // Left foot on column 1 (solid), centre over the pit at column 2.
        let (x, y, w, h) = (20.0, 31.0, 24.0, 16.0);
        assert_eq!(tc.get_tile_at(x, y + h + 1.0), 1);
        assert_eq!(tc.get_tile_at(x + w / 2.0, y + h + 1.0), 0);
        assert!(tc.is_on_ground(x, y, w, h));
        assert!(tc.is_over_pit(x, y, w, h));
    }

    #[test]
    fn test_not_on_ground_over_pit() {
        let tc = level();
        assert!(!tc.is_on_ground(34.0, 31.0, 10.0, 16.0));
        assert!(tc.is_over_pit(34.0, 31.0, 10.0, 16.0));
    }

    #[test]
    fn test_falling_body_lands_on_floor() {
        let tc = level();
        let mut body = Body::new(64.0, 30.0, 12.0, 16.0).with_velocity(0.0, 200.0);
        let result = tc.check_collisions(&mut body, 1.0 / 60.0);
        assert!(result.ground);
        assert!(!result.pit);
        assert_eq!(body.y, 48.0 - 16.0);
        assert_eq!(body.vy, 0.0);
        assert!(body.is_grounded);
    }

    #[test]
    fn test_airborne_body_clears_grounded() {
        let tc = level();
        let mut body = Body::new(64.0, 17.0, 12.0, 8.0);
        body.is_grounded = true;
        let result = tc.check_collisions(&mut body, 1.0 / 60.0);
        assert!(!result.ground);
        assert!(!body.is_grounded);
    }

    #[test]
    fn test_rising_body_hits_ceiling() {
        let tc = level();
        let mut body = Body::new(64.0, 17.0, 12.0, 12.0).with_velocity(0.0, -120.0);
        let result = tc.check_collisions(&mut body, 1.0 / 60.0);
        assert!(result.ceiling);
        assert_eq!(body.y, 16.0);
        assert_eq!(body.vy, 0.0);
    }

    #[test]
    fn test_walls_snap_flush() {
        let tc = level();
        let mut right = Body::new(66.0, 20.0, 12.0, 12.0).with_velocity(300.0, -1.0);
        let result = tc.check_collisions(&mut right, 1.0 / 60.0);
        assert!(result.right_wall);
        assert_eq!(right.x, 80.0 - 12.0);
        assert_eq!(right.vx, 0.0);

        let mut tc = TileCollision::default();
        tc.set_level(TileGrid::from_rows(vec![vec![1, 0, 0], vec![1, 0, 0]]).unwrap());
        let mut left = Body::new(18.0, 2.0, 8.0, 8.0).with_velocity(-300.0, -1.0);
        let result = tc.check_collisions(&mut left, 1.0 / 60.0);
        assert!(result.left_wall);
        assert_eq!(left.x, 16.0);
        assert_eq!(left.vx, 0.0);
    }

    #[test]
    fn test_climbable_from_centre() {
        let tc = level();
        let mut body = Body::new(34.0, 18.0, 12.0, 12.0).with_velocity(0.0, -1.0);
        let result = tc.check_collisions(&mut body, 0.0);
        assert!(result.climbable);
    }

    #[test]
    fn test_ray_cast_hits_first_solid() {
        let tc = level();
        let hit = tc.ray_cast(IVec2::new(8, 24), IVec2::new(90, 24)).unwrap();
        assert_eq!(hit.point, IVec2::new(80, 24));
        assert_eq!(hit.tile, 1);
        assert!(tc.ray_cast(IVec2::new(8, 20), IVec2::new(70, 40)).is_none());
        // Starting inside a solid tile reports it immediately.
        let hit = tc.ray_cast(IVec2::new(4, 4), IVec2::new(40, 4)).unwrap();
        assert_eq!(hit.point, IVec2::new(4, 4));
    }

    #[test]
    fn test_ray_cast_without_level_misses() {
        let tc = TileCollision::default();
        assert_eq!(tc.ray_cast(IVec2::ZERO, IVec2::new(50, 50)), None);
    }

    #[test]
    fn test_ray_cast_extreme_endpoints() {
        let tc = level();
        let hit = tc
            .ray_cast(IVec2::new(4, 4), IVec2::new(i32::MAX, i32::MIN))
            .unwrap();
        assert_eq!(hit.point, IVec2::new(4, 4));
        let hit = tc
            .ray_cast(IVec2::new(90, 4), IVec2::new(i32::MIN, i32::MAX))
            .unwrap();
        assert_eq!(hit.point, IVec2::new(90, 4));
        assert_eq!(
            TileCollision::default().ray_cast(IVec2::new(i32::MIN, 0), IVec2::new(i32::MAX, 0)),
            None
        );
    }

    #[test]
    fn test_ground_and_pit_in_one_landing() {
        let tc = level();
        // Left edge lands on column 1, centre and right edge over the pit.
        let mut body = Body::new(20.0, 30.0, 24.0, 16.0).with_velocity(0.0, 200.0);
        let result = tc.check_collisions(&mut body, 1.0 / 60.0);
        assert!(result.ground);
        assert!(result.pit);
        assert!(!result.left_wall && !result.right_wall);
        assert_eq!(body.y, 48.0 - 16.0);
        assert_eq!(body.vy, 0.0);
        assert!(body.is_grounded);
    }

    #[test]
    fn test_solid_tiles_in_area_clamps_to_level() {
        let mut tc = TileCollision::default();
        tc.set_level(TileGrid::from_rows(vec![vec![1, 1], vec![1, 1]]).unwrap());
        let tiles = tc.get_solid_tiles_in_area(-80_000.0, -80_000.0, 160_000.0, 160_000.0);
        assert_eq!(tiles.len(), 4);
        assert_eq!((tiles[3].x, tiles[3].y), (16.0, 16.0));

        assert!(tc.get_solid_tiles_in_area(100.0, 100.0, 50.0, 50.0).is_empty());
        assert_eq!(
            tc.get_solid_tiles_in_area(f32::MIN, f32::MIN, f32::MAX, f32::MAX)
                .len(),
            1
        );
        assert!(TileCollision::default()
            .get_solid_tiles_in_area(0.0, 0.0, 1e9, 1e9)
            .is_empty());
    }

    #[test]
    fn test_solid_tiles_in_area() {
        let tc = level();
        let tiles = tc.get_solid_tiles_in_area(16.0, 40.0, 40.0, 8.0);
        let xs: Vec<(f32, i32)> = tiles.iter().map(|t| (t.x, t.tile)).collect();
        assert_eq!(xs, vec![(16.0, 1), (48.0, 3)]);
        assert!(tiles.iter().all(|t| t.y == 48.0 && t.width == 16.0));
    }
}
