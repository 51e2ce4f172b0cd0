use crate::error::LandmarkError;
use serde::{Deserialize, Serialize};

/// Number of landmarks in one hand frame
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
/// Middle finger MCP joint, used as the palm reference point
pub const PALM: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Fingertips used for the open-hand test (thumb excluded)
pub const OPEN_HAND_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// A normalized 2D image point, x and y nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A 3D world-space position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// One sampled set of hand keypoints for a single tick.
///
/// Always holds exactly [`LANDMARK_COUNT`] finite points; the constructors
/// reject anything else so downstream code can index freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point2>", into = "Vec<Point2>")]
pub struct LandmarkFrame {
    points: [Point2; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Build a frame from an arbitrary list of points
    pub fn from_points(points: &[Point2]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                actual: points.len(),
            });
        }

        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }

        let mut frame = [Point2::default(); LANDMARK_COUNT];
        frame.copy_from_slice(points);
        Ok(Self { points: frame })
    }

    /// Build a frame from `[x, y]` pairs as emitted by landmark models
    pub fn from_pairs(pairs: &[[f32; 2]]) -> Result<Self, LandmarkError> {
        let points: Vec<Point2> = pairs.iter().map(|[x, y]| Point2::new(*x, *y)).collect();
        Self::from_points(&points)
    }

    /// Landmark at `index`, or `None` past [`LANDMARK_COUNT`]
    pub fn point(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Point2; LANDMARK_COUNT] {
        &self.points
    }

    pub fn wrist(&self) -> Point2 {
        self.points[WRIST]
    }

    pub fn thumb_tip(&self) -> Point2 {
        self.points[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Point2 {
        self.points[INDEX_TIP]
    }

    pub fn palm(&self) -> Point2 {
        self.points[PALM]
    }

    /// Palm position mirrored horizontally for a user-facing camera
    pub fn mirrored_palm(&self) -> Point2 {
        let palm = self.palm();
        Point2::new(1.0 - palm.x, palm.y)
    }

    /// Distance between thumb tip and index tip
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip().distance(&self.index_tip())
    }

    /// Mean distance from the four non-thumb fingertips to the wrist
    pub fn mean_fingertip_spread(&self) -> f32 {
        let wrist = self.wrist();
        let total: f32 = OPEN_HAND_TIPS
            .iter()
            .map(|&tip| self.points[tip].distance(&wrist))
            .sum();
        total / OPEN_HAND_TIPS.len() as f32
    }
}

impl TryFrom<Vec<Point2>> for LandmarkFrame {
    type Error = LandmarkError;

    fn try_from(points: Vec<Point2>) -> Result<Self, Self::Error> {
        Self::from_points(&points)
    }
}

impl From<LandmarkFrame> for Vec<Point2> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.points.to_vec()
    }
}

/// Builder for synthetic hands in unit tests.
///
/// Starts from a relaxed half-open hand centred in the image and lets
/// callers move the palm or shape the fingers.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct HandPoseBuilder {
    points: [Point2; LANDMARK_COUNT],
}

#[cfg(test)]
impl Default for HandPoseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl HandPoseBuilder {
    pub fn new() -> Self {
        let mut points = [Point2::new(0.5, 0.6); LANDMARK_COUNT];
        points[WRIST] = Point2::new(0.5, 0.8);
        points[PALM] = Point2::new(0.5, 0.6);
        // Curled fingers close to the wrist
        points[THUMB_TIP] = Point2::new(0.40, 0.65);
        points[INDEX_TIP] = Point2::new(0.47, 0.70);
        points[MIDDLE_TIP] = Point2::new(0.50, 0.70);
        points[RING_TIP] = Point2::new(0.53, 0.70);
        points[PINKY_TIP] = Point2::new(0.56, 0.72);
        Self { points }
    }

    /// Spread all fingers well away from the wrist
    pub fn open(mut self) -> Self {
        let wrist = self.points[WRIST];
        self.points[THUMB_TIP] = Point2::new(wrist.x - 0.20, wrist.y - 0.20);
        self.points[INDEX_TIP] = Point2::new(wrist.x - 0.10, wrist.y - 0.35);
        self.points[MIDDLE_TIP] = Point2::new(wrist.x, wrist.y - 0.38);
        self.points[RING_TIP] = Point2::new(wrist.x + 0.08, wrist.y - 0.35);
        self.points[PINKY_TIP] = Point2::new(wrist.x + 0.15, wrist.y - 0.30);
        self
    }

    /// Place thumb and index tips `distance` apart, centred on the index tip
    pub fn thumb_index_gap(mut self, distance: f32) -> Self {
        let index = self.points[INDEX_TIP];
        self.points[THUMB_TIP] = Point2::new(index.x - distance, index.y);
        self
    }

    /// Translate the whole hand so the palm reference lands at (x, y)
    /// in raw (unmirrored) image coordinates
    pub fn palm_at(mut self, x: f32, y: f32) -> Self {
        let palm = self.points[PALM];
        let (dx, dy) = (x - palm.x, y - palm.y);
        for point in self.points.iter_mut() {
            point.x += dx;
            point.y += dy;
        }
        self
    }

    pub fn with_point(mut self, index: usize, point: Point2) -> Self {
        self.points[index] = point;
        self
    }

    pub fn build(self) -> LandmarkFrame {
        LandmarkFrame {
            points: self.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_count_rejected() {
        let points = vec![Point2::new(0.5, 0.5); 20];
        assert_eq!(
            LandmarkFrame::from_points(&points),
            Err(LandmarkError::WrongCount {
                expected: 21,
                actual: 20
            })
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut points = vec![Point2::new(0.5, 0.5); LANDMARK_COUNT];
        points[7].y = f32::NAN;
        assert_eq!(
            LandmarkFrame::from_points(&points),
            Err(LandmarkError::NonFinite { index: 7 })
        );
    }

    #[test]
    fn test_mirrored_palm() {
        let frame = HandPoseBuilder::new().palm_at(0.2, 0.3).build();
        let palm = frame.mirrored_palm();
        assert!((palm.x - 0.8).abs() < 1e-6);
        assert!((palm.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_serde_uses_point_list() {
        let frame = HandPoseBuilder::new().build();
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.starts_with("[{\"x\":"));

        let parsed: LandmarkFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);

        let short = "[{\"x\":0.1,\"y\":0.2}]";
        assert!(serde_json::from_str::<LandmarkFrame>(short).is_err());
    }

    #[test]
    fn test_point_lookup_is_bounded() {
        let frame = HandPoseBuilder::new().build();
        assert_eq!(frame.point(WRIST), Some(frame.wrist()));
        assert_eq!(frame.point(LANDMARK_COUNT - 1), Some(frame.points()[20]));
        assert_eq!(frame.point(LANDMARK_COUNT), None);
    }

    #[test]
    fn test_builder_shapes() {
        let open = HandPoseBuilder::new().open().build();
        assert!(open.mean_fingertip_spread() > 0.2);

        let curled = HandPoseBuilder::new().build();
        assert!(curled.mean_fingertip_spread() < 0.2);

        let pinch = HandPoseBuilder::new().thumb_index_gap(0.03).build();
        assert!((pinch.pinch_distance() - 0.03).abs() < 1e-5);
    }
}
