use crate::utils::error::{Result, TriangulatorError};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // version nibble 1-8, RFC 4122 variant (10xx)
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-8][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
            .expect("UUID pattern is a valid regex")
    })
}

/// Identifier of a point set in the point set manager, always a hyphenated
/// RFC 4122 UUID. Strings with the right shape but an unknown version or the
/// wrong variant are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PointSetId(String);

impl PointSetId {
    pub fn parse(raw: &str) -> Result<Self> {
        if uuid_pattern().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(TriangulatorError::InvalidIdentifier {
                id: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// `None` when either coordinate is NaN or infinite.
    pub fn new(x: f64, y: f64) -> Option<Self> {
        if x.is_finite() && y.is_finite() {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// An identified, ordered sequence of points read as polygon boundary order.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    pub id: PointSetId,
    pub points: Vec<Point>,
}

impl PointSet {
    pub fn new(id: PointSetId, points: Vec<Point>) -> Self {
        Self { id, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Three vertices stored by value, in generation order. Zero-area triangles are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Triangle {
    pub vertices: [Point; 3],
}

impl Triangle {
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Positive for counter-clockwise winding, negative for clockwise, zero when degenerate.
    pub fn signed_area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) / 2.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriangulationResult {
    pub triangles: Vec<Triangle>,
}

impl TriangulationResult {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter()
    }
}
