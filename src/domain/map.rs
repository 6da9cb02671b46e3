// Static arena bounds and position validity.

use crate::domain::tuning::MapTuning;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(self, angle: f32, distance: f32) -> Position {
        Position {
            x: self.x + angle.cos() * distance,
            y: self.y + angle.sin() * distance,
        }
    }
}

/// A circular footprint, used for obstacles and collision checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Position,
    pub radius: f32,
}

/// Minimum-translation push of a circle of `radius` at `position`, once per obstacle,
/// in the order given.
pub fn push_out_of<I>(mut position: Position, radius: f32, obstacles: I) -> Position
where
    I: IntoIterator<Item = Circle>,
{
    for obstacle in obstacles {
        let dx = position.x - obstacle.center.x;
        let dy = position.y - obstacle.center.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let min_distance = radius + obstacle.radius;
        if distance >= min_distance {
            continue;
        }

        let overlap = min_distance - distance;
        let (nx, ny) = if distance > 0.0 {
            (dx / distance, dy / distance)
        } else {
            (1.0, 0.0)
        };
        position.x += nx * overlap;
        position.y += ny * overlap;
    }
    position
}

#[derive(Debug, Clone, Copy)]
pub struct SpatialMap {
    size: f32,
    padding: f32,
}

impl SpatialMap {
    pub fn new(tuning: MapTuning) -> Self {
        Self {
            size: tuning.size,
            padding: tuning.padding,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn center(&self) -> Position {
        Position::new(self.size / 2.0, self.size / 2.0)
    }

    pub fn is_valid(&self, pos: Position) -> bool {
        let (min, max) = (self.padding, self.size - self.padding);
        (min..=max).contains(&pos.x) && (min..=max).contains(&pos.y)
    }

    /// Uniform sample inside the padded bounds.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        self.random_position_with_margin(rng, 0.0)
    }

    /// Uniform sample inside the padded bounds shrunk by `margin` on every side.
    pub fn random_position_with_margin<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        margin: f32,
    ) -> Position {
        let min = self.padding + margin;
        let max = (self.size - self.padding - margin).max(min);
        Position::new(
            min + rng.r#gen::<f32>() * (max - min),
            min + rng.r#gen::<f32>() * (max - min),
        )
    }

    /// Clamps so a circle of `radius` centered at the result stays inside the padded bounds.
    pub fn clamp(&self, pos: Position, radius: f32) -> Position {
        let min = self.padding + radius;
        let max = (self.size - self.padding - radius).max(min);
        Position::new(pos.x.clamp(min, max), pos.y.clamp(min, max))
    }
}
