//! Image sources for reflective membrane edges
//!
//! Reflections are emulated with the method of images: each source is
//! mirrored across the membrane edges and the mirrored (virtual) sources
//! radiate the same wavepacket. The plane is split into nine regions
//! around the rectangle `[-Dx, Dx] × [-Dy, Dy]`:
//!
//! ```text
//!  1 | 2 | 3
//! ___|_a_|___
//!    |   |
//!  8 d 0 b 4
//! ___|_c_|___
//!    |   |
//!  7 | 6 | 5
//! ```
//!
//! A position is mirrored across every edge it does not already lie
//! beyond, so an image is never reflected straight back onto its parent.

use crate::error::{Result, WaveError};
use crate::grid::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edge of the membrane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `a`: y = Dy
    Top,
    /// `b`: x = Dx
    Right,
    /// `c`: y = -Dy
    Bottom,
    /// `d`: x = -Dx
    Left,
}

impl Edge {
    /// Mirror `p` across this edge
    pub fn mirror(self, p: Point2, (dx, dy): (f64, f64)) -> Point2 {
        match self {
            Edge::Top => Point2::new(p.x, 2.0 * dy - p.y),
            Edge::Right => Point2::new(2.0 * dx - p.x, p.y),
            Edge::Bottom => Point2::new(p.x, -2.0 * dy - p.y),
            Edge::Left => Point2::new(-2.0 * dx - p.x, p.y),
        }
    }
}

/// Region of the plane relative to the membrane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// 0: strictly inside
    Inside,
    /// 1
    NorthWest,
    /// 2
    North,
    /// 3
    NorthEast,
    /// 4
    East,
    /// 5
    SouthEast,
    /// 6
    South,
    /// 7
    SouthWest,
    /// 8
    West,
}

impl Region {
    /// Classify `p` for half extents `(dx, dy)`.
    ///
    /// Conditions are tested in region order; the first match wins. Points
    /// lying exactly on the top, bottom or left edge match none of them.
    pub fn classify(p: Point2, (dx, dy): (f64, f64)) -> Option<Region> {
        let (x, y) = (p.x, p.y);
        if -dx < x && x < dx && -dy < y && y < dy {
            Some(Region::Inside)
        } else if y > dy && x < -dx {
            Some(Region::NorthWest)
        } else if y > dy && -dx <= x && x < dx {
            Some(Region::North)
        } else if y > dy && x >= dx {
            Some(Region::NorthEast)
        } else if x > dx && -dy <= y && y <= dy {
            Some(Region::East)
        } else if x >= dx && y <= dy {
            Some(Region::SouthEast)
        } else if y < -dy && -dx <= x && x < dx {
            Some(Region::South)
        } else if y < -dy && x < -dx {
            Some(Region::SouthWest)
        } else if x < -dx && -dy <= y && y <= dy {
            Some(Region::West)
        } else {
            None
        }
    }

    /// Region number, 0 to 8
    pub fn index(self) -> u8 {
        match self {
            Region::Inside => 0,
            Region::NorthWest => 1,
            Region::North => 2,
            Region::NorthEast => 3,
            Region::East => 4,
            Region::SouthEast => 5,
            Region::South => 6,
            Region::SouthWest => 7,
            Region::West => 8,
        }
    }

    /// Edges a position in this region is mirrored across
    pub fn mirrors(self) -> &'static [Edge] {
        use Edge::*;
        match self {
            Region::Inside => &[Top, Right, Bottom, Left],
            Region::NorthWest => &[Right, Bottom],
            Region::North => &[Right, Bottom, Left],
            Region::NorthEast => &[Bottom, Left],
            Region::East => &[Top, Bottom, Left],
            Region::SouthEast => &[Top, Left],
            Region::South => &[Top, Right, Left],
            Region::SouthWest => &[Top, Right],
            Region::West => &[Top, Right, Bottom],
        }
    }
}

/// First-order images of `p`
pub fn reflect_position(p: Point2, half_extents: (f64, f64)) -> Result<Vec<Point2>> {
    let region =
        Region::classify(p, half_extents).ok_or(WaveError::UnclassifiedPosition {
            x: p.x,
            y: p.y,
            dx: half_extents.0,
            dy: half_extents.1,
        })?;
    Ok(region
        .mirrors()
        .iter()
        .map(|edge| edge.mirror(p, half_extents))
        .collect())
}

/// Images of `p` up to `order` reflections.
///
/// Round one mirrors `p`; every later round mirrors each image produced by
/// the previous round. Images of all rounds are returned, first round
/// first. Coincident images are kept.
pub fn image_sources(p: Point2, half_extents: (f64, f64), order: usize) -> Result<Vec<Point2>> {
    if order == 0 {
        return Ok(Vec::new());
    }

    let mut images = reflect_position(p, half_extents)?;
    let mut frontier = images.clone();
    for round in 1..order {
        let mut next = Vec::with_capacity(frontier.len() * 3);
        for &q in &frontier {
            next.extend(reflect_position(q, half_extents)?);
        }
        log::debug!("reflection round {}: {} new images", round + 1, next.len());
        images.extend_from_slice(&next);
        frontier = next;
    }
    Ok(images)
}

/// Boundary condition of a membrane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BoundarySpec", into = "BoundarySpec")]
pub enum Boundary {
    /// No reflections
    #[default]
    Transparent,
    /// First-order reflections without phase change
    Free,
    /// Reflections up to the given order (>= 1)
    Order(usize),
}

impl Boundary {
    /// Number of reflection rounds
    pub fn image_order(self) -> usize {
        match self {
            Boundary::Transparent => 0,
            Boundary::Free => 1,
            Boundary::Order(n) => n,
        }
    }

    /// Validated integer order
    pub fn order(n: i64) -> Result<Self> {
        if n >= 1 {
            Ok(Boundary::Order(n as usize))
        } else {
            Err(WaveError::InvalidBoundary(n.to_string()))
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Transparent => write!(f, "transparent"),
            Boundary::Free => write!(f, "free"),
            Boundary::Order(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for Boundary {
    type Err = WaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "transparent" => Ok(Boundary::Transparent),
            "free" => Ok(Boundary::Free),
            other => match other.parse::<i64>() {
                Ok(n) => Boundary::order(n),
                Err(_) => Err(WaveError::InvalidBoundary(other.to_string())),
            },
        }
    }
}

/// Serialized form: `"transparent"`, `"free"` or an integer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum BoundarySpec {
    Order(i64),
    Name(String),
}

impl TryFrom<BoundarySpec> for Boundary {
    type Error = WaveError;

    fn try_from(spec: BoundarySpec) -> Result<Self> {
        match spec {
            BoundarySpec::Order(n) => Boundary::order(n),
            BoundarySpec::Name(name) => name.parse(),
        }
    }
}

impl From<Boundary> for BoundarySpec {
    fn from(boundary: Boundary) -> Self {
        match boundary {
            Boundary::Order(n) => BoundarySpec::Order(i64::try_from(n).unwrap_or(i64::MAX)),
            named => BoundarySpec::Name(named.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const HALF: (f64, f64) = (1.0, 1.0);

    fn assert_points(actual: &[Point2], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (p, &(x, y)) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(p.x, x, epsilon = 1e-12);
            assert_abs_diff_eq!(p.y, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_interior_reflection() {
        let images = reflect_position(Point2::new(0.2, 0.3), HALF).unwrap();
        assert_points(
            &images,
            &[(0.2, 1.7), (1.8, 0.3), (0.2, -2.3), (-2.2, 0.3)],
        );
    }

    #[test]
    fn test_region_classification() {
        let cases = [
            ((0.0, 0.0), 0),
            ((-2.0, 2.0), 1),
            ((0.0, 2.0), 2),
            ((2.0, 2.0), 3),
            ((2.0, 0.0), 4),
            ((2.0, -2.0), 5),
            ((0.0, -2.0), 6),
            ((-2.0, -2.0), 7),
            ((-2.0, 0.0), 8),
            // right edge falls in region 5
            ((1.0, 0.0), 5),
        ];
        for ((x, y), expected) in cases {
            let region = Region::classify(Point2::new(x, y), HALF).unwrap();
            assert_eq!(region.index(), expected, "({x}, {y})");
        }
    }

    #[test]
    fn test_edge_gaps_are_reported() {
        for (x, y) in [(-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            assert!(Region::classify(Point2::new(x, y), HALF).is_none());
            let err = reflect_position(Point2::new(x, y), HALF).unwrap_err();
            assert!(err.is_internal());
        }
    }

    #[test]
    fn test_outside_reflection_skips_own_edge() {
        // Region 2 (north): mirrored across b, c, d only
        let images = reflect_position(Point2::new(0.2, 1.7), HALF).unwrap();
        assert_points(&images, &[(1.8, 1.7), (0.2, -3.7), (-2.2, 1.7)]);
    }

    #[test]
    fn test_image_counts() {
        let p = Point2::new(0.2, 0.3);
        assert!(image_sources(p, HALF, 0).unwrap().is_empty());
        assert_eq!(image_sources(p, HALF, 1).unwrap().len(), 4);
        // Each first-order image sits in an edge region: 3 mirrors each
        assert_eq!(image_sources(p, HALF, 2).unwrap().len(), 16);

        let mut previous = 0;
        for order in 1..5 {
            let count = image_sources(p, HALF, order).unwrap().len();
            assert!(count > previous);
            previous = count;
        }
    }

    #[test]
    fn test_image_rounds_are_cumulative() {
        let p = Point2::new(0.2, 0.3);
        let first = image_sources(p, HALF, 1).unwrap();
        let second = image_sources(p, HALF, 2).unwrap();
        assert_eq!(&second[..first.len()], first.as_slice());
    }

    #[test]
    fn test_boundary_parsing() {
        assert_eq!("transparent".parse::<Boundary>().unwrap(), Boundary::Transparent);
        assert_eq!("free".parse::<Boundary>().unwrap(), Boundary::Free);
        assert_eq!("3".parse::<Boundary>().unwrap(), Boundary::Order(3));
        assert!("0".parse::<Boundary>().is_err());
        assert!("rigid".parse::<Boundary>().is_err());
        assert_eq!(Boundary::Order(2).image_order(), 2);
        assert_eq!(Boundary::default(), Boundary::Transparent);
    }

    #[test]
    fn test_boundary_serde() {
        let b: Boundary = serde_json::from_str("\"free\"").unwrap();
        assert_eq!(b, Boundary::Free);
        let b: Boundary = serde_json::from_str("4").unwrap();
        assert_eq!(b, Boundary::Order(4));
        assert!(serde_json::from_str::<Boundary>("-1").is_err());
        assert_eq!(serde_json::to_string(&Boundary::Order(4)).unwrap(), "4");
        assert_eq!(
            serde_json::to_string(&Boundary::Transparent).unwrap(),
            "\"transparent\""
        );
    }

    #[test]
    fn test_boundary_serde_saturates_huge_order() {
        let json = serde_json::to_string(&Boundary::Order(usize::MAX)).unwrap();
        assert_eq!(json, i64::MAX.to_string());
        let b: Boundary = serde_json::from_str(&json).unwrap();
        assert_eq!(b, Boundary::Order(i64::MAX as usize));
    }
}
