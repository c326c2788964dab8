//! World-space position type.
//!
//! Positions are single-precision game-world coordinates.  Distances are
//! plain Euclidean distances in the same units ("yards" in most hosts).

/// A point in world space.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance.  Cheaper than [`distance`][Self::distance]
    /// for threshold comparisons.
    #[inline]
    pub fn distance_sq(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Position) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// `true` if `other` lies within `radius` of `self` (inclusive).
    #[inline]
    pub fn within(self, other: Position, radius: f32) -> bool {
        self.distance_sq(other) <= radius * radius
    }

    /// Coordinates as an array, the layout used by the spatial index.
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Position {
    fn from(a: [f32; 3]) -> Self {
        Position::new(a[0], a[1], a[2])
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}
