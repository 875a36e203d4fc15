//! Pointer State - the last position we believe the pointer occupies
//!
//! The value is advisory. An out-of-band move (a real user, another client)
//! makes it stale until the next successful cursor query resynchronizes it.
//! Concurrent writers race last-writer-wins.

use serde::Serialize;
use tokio::sync::RwLock;

/// Screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Tracked pointer position, starting at (0, 0)
#[derive(Debug, Default)]
pub struct PointerState {
    position: RwLock<Point>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Point {
        *self.position.read().await
    }

    pub async fn set(&self, point: Point) {
        *self.position.write().await = point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_at_origin() {
        let state = PointerState::new();
        assert_eq!(state.get().await, Point::new(0, 0));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let state = PointerState::new();
        state.set(Point::new(5, 6)).await;
        state.set(Point::new(-3, 1200)).await;
        assert_eq!(state.get().await, Point::new(-3, 1200));
    }

    #[test]
    fn serializes_as_xy_object() {
        let json = serde_json::to_value(Point::new(42, 17)).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 42, "y": 17 }));
    }
}
