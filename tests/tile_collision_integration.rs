//! Tile collision integration tests: bodies stepped through a small walled
//! room with a one-tile pit in the floor.

use glam::IVec2;

use petplatformer::components::body::Body;
use petplatformer::components::tilecontacts::CollisionResult;
use petplatformer::resources::gameconfig::DEFAULT_GRAVITY;
use petplatformer::resources::tilecollision::{
    LevelError, RayHit, TileCollision, TileGrid, TileKind,
};

const DT: f32 = 1.0 / 60.0;

// 8x5 tiles of 16px. Floor top at y = 64, pit at column 3 (x 48..64),
// walls on columns 0 and 7, ceiling on row 0.
const ROOM: &str = r#"[
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 0, 1, 1, 1, 1]
]"#;

fn room() -> TileCollision {
    let mut tiles = TileCollision::new(16.0);
    tiles.set_level(TileGrid::from_json(ROOM).unwrap());
    tiles
}

/// One physics step the way the tick schedule orders it.
fn step(tiles: &TileCollision, body: &mut Body, gravity: f32) -> CollisionResult {
    if !body.is_grounded {
        body.vy += gravity * DT;
    }
    let result = tiles.check_collisions(body, DT);
    body.x += body.vx * DT;
    body.y += body.vy * DT;
    result
}

#[test]
fn falling_body_lands_and_stays_on_floor() {
    let tiles = room();
    let mut body = Body::new(20.0, 20.0, 12.0, 12.0);

    let mut landed_at = None;
    for i in 0..120 {
        let result = step(&tiles, &mut body, DEFAULT_GRAVITY);
        if result.ground && landed_at.is_none() {
            landed_at = Some(i);
        }
    }

    assert!(landed_at.is_some());
    assert_eq!(body.y, 64.0 - 12.0);
    assert_eq!(body.vy, 0.0);
    assert!(body.is_grounded);
    assert!(tiles.is_on_ground(body.x, body.y, body.width, body.height));
    assert!(!tiles.is_over_pit(body.x, body.y, body.width, body.height));
}

#[test]
fn body_over_pit_falls_out_of_level() {
    let tiles = room();
    let mut body = Body::new(50.0, 40.0, 12.0, 12.0);

    let mut saw_pit = false;
    for _ in 0..120 {
        saw_pit |= step(&tiles, &mut body, DEFAULT_GRAVITY).pit;
    }

    assert!(saw_pit);
    assert!(!body.is_grounded);
    assert!(body.y > 80.0);
    assert_eq!(tiles.kind_at(body.x, body.y), TileKind::OutOfBounds);
}

#[test]
fn running_into_wall_stops_flush() {
    let tiles = room();
    let mut body = Body::new(90.0, 52.0, 12.0, 12.0).with_velocity(300.0, 0.0);
    body.is_grounded = true;

    let mut hit = false;
    for _ in 0..10 {
        let result = step(&tiles, &mut body, DEFAULT_GRAVITY);
        assert!(result.ground);
        hit |= result.right_wall;
    }

    assert!(hit);
    assert_eq!(body.x, 7.0 * 16.0 - 12.0);
    assert_eq!(body.vx, 0.0);
}

#[test]
fn running_left_into_wall_stops_flush() {
    let tiles = room();
    let mut body = Body::new(26.0, 52.0, 12.0, 12.0).with_velocity(-300.0, 0.0);
    body.is_grounded = true;

    let mut hit = false;
    for _ in 0..10 {
        hit |= step(&tiles, &mut body, DEFAULT_GRAVITY).left_wall;
    }

    assert!(hit);
    assert_eq!(body.x, 16.0);
}

#[test]
fn jump_into_ceiling_stops_below_it() {
    let tiles = room();
    let mut body = Body::new(40.0, 30.0, 12.0, 12.0).with_velocity(0.0, -400.0);

    let mut result = CollisionResult::default();
    for _ in 0..10 {
        result = tiles.check_collisions(&mut body, DT);
        if result.ceiling {
            break;
        }
        body.y += body.vy * DT;
    }

    assert!(result.ceiling);
    assert_eq!(body.y, 16.0);
    assert_eq!(body.vy, 0.0);
}

#[test]
fn ray_cast_across_room() {
    let tiles = room();

    assert_eq!(
        tiles.ray_cast(IVec2::new(20, 40), IVec2::new(127, 40)),
        Some(RayHit {
            point: IVec2::new(112, 40),
            tile: 1
        })
    );
    assert_eq!(tiles.ray_cast(IVec2::new(20, 40), IVec2::new(100, 40)), None);
    // Straight down through the pit column leaves the level.
    assert_eq!(tiles.ray_cast(IVec2::new(56, 20), IVec2::new(56, 100)), None);
    // Starting inside a wall hits immediately.
    let hit = tiles.ray_cast(IVec2::new(5, 40), IVec2::new(60, 40)).unwrap();
    assert_eq!(hit.point, IVec2::new(5, 40));
}

#[test]
fn solid_tiles_around_pit_edge() {
    let tiles = room();
    let found = tiles.get_solid_tiles_in_area(40.0, 60.0, 20.0, 10.0);
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].x, found[0].y), (32.0, 64.0));

    let json = serde_json::to_value(&found[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"x": 32.0, "y": 64.0, "width": 16.0, "height": 16.0, "type": 1})
    );
}

#[test]
fn malformed_levels_are_rejected() {
    assert!(matches!(
        TileGrid::from_json("[[1, 1], [1]]"),
        Err(LevelError::Ragged { row: 1, .. })
    ));
    assert!(matches!(
        TileGrid::from_json("{\"tiles\": []}"),
        Err(LevelError::Parse(_))
    ));

    let empty = TileCollision::new(16.0);
    assert_eq!(empty.get_tile_at(0.0, 0.0), -1);
    assert!(!empty.is_on_ground(0.0, 0.0, 10.0, 10.0));
}
