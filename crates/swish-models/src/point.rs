use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point in pixel coordinates of a specific frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PixelPoint {
    /// X coordinate in pixels (0 = left edge)
    pub x: f32,
    /// Y coordinate in pixels (0 = top edge)
    pub y: f32,
}

impl PixelPoint {
    /// Create a new pixel point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &PixelPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A normalized point (0.0 to 1.0) as produced by landmark estimators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedPoint {
    /// X coordinate (0.0 = left, 1.0 = right)
    pub x: f32,
    /// Y coordinate (0.0 = top, 1.0 = bottom)
    pub y: f32,
}

impl NormalizedPoint {
    /// Create a new normalized point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Check if the point lies within the normalized range.
    pub fn is_valid(&self) -> bool {
        // Allow small epsilon for float precision
        self.x >= -0.001 && self.x <= 1.001 && self.y >= -0.001 && self.y <= 1.001
    }

    /// Convert to pixel coordinates for a frame of the given dimensions.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelPoint {
        PixelPoint::new(self.x * width as f32, self.y * height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_point_scales_by_frame_dimensions() {
        let p = NormalizedPoint::new(0.5, 0.25);
        let px = p.to_pixels(1920, 1080);
        assert_eq!(px.x, 960.0);
        assert_eq!(px.y, 270.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = PixelPoint::new(0.0, 0.0);
        let b = PixelPoint::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }
}
