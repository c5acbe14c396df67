//! Binary wire format for point sets and triangulation results.
//!
//! All numbers are little-endian with fixed widths:
//!
//! - point set: `[count: u32][count × (x: f64, y: f64)]`
//! - triangulation result: `[count: u32][count × (p0.x, p0.y, p1.x, p1.y, p2.x, p2.y: f64)]`
//!
//! Decoding is all-or-nothing. The declared count is checked against the
//! configured ceiling and against the bytes actually present before any
//! storage is allocated.

use crate::domain::model::{Point, PointSet, PointSetId, Triangle, TriangulationResult};
use crate::utils::error::{Result, TriangulatorError};
use serde::{Deserialize, Serialize};

pub const HEADER_SIZE: usize = 4;
pub const POINT_RECORD_SIZE: usize = 16;
pub const TRIANGLE_RECORD_SIZE: usize = 3 * POINT_RECORD_SIZE;

pub const DEFAULT_MAX_POINTS: u32 = 1_000_000;
pub const DEFAULT_MAX_TRIANGLES: u32 = 1_000_000;

/// Upper bounds on the counts a buffer may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecLimits {
    pub max_points: u32,
    pub max_triangles: u32,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            max_triangles: DEFAULT_MAX_TRIANGLES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    limits: CodecLimits,
}

impl Codec {
    pub fn new(limits: CodecLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> CodecLimits {
        self.limits
    }

    pub fn encode_point_set(&self, point_set: &PointSet) -> Result<Vec<u8>> {
        self.encode_points(&point_set.points)
    }

    pub fn encode_points(&self, points: &[Point]) -> Result<Vec<u8>> {
        let count = checked_count(points.len(), self.limits.max_points)?;

        let mut buffer = Vec::with_capacity(HEADER_SIZE + points.len() * POINT_RECORD_SIZE);
        buffer.extend_from_slice(&count.to_le_bytes());
        for point in points {
            write_point(&mut buffer, point);
        }
        Ok(buffer)
    }

    /// The identifier is not carried on the wire, so the caller supplies it.
    pub fn decode_point_set(&self, id: PointSetId, bytes: &[u8]) -> Result<PointSet> {
        let (count, payload) = split_payload(bytes, POINT_RECORD_SIZE, self.limits.max_points)?;

        let mut points = Vec::with_capacity(count);
        for (index, record) in payload.chunks_exact(POINT_RECORD_SIZE).enumerate() {
            points.push(read_point(record, index)?);
        }
        Ok(PointSet::new(id, points))
    }

    pub fn encode_result(&self, result: &TriangulationResult) -> Result<Vec<u8>> {
        let count = checked_count(result.len(), self.limits.max_triangles)?;

        let mut buffer = Vec::with_capacity(HEADER_SIZE + result.len() * TRIANGLE_RECORD_SIZE);
        buffer.extend_from_slice(&count.to_le_bytes());
        for triangle in result.iter() {
            for vertex in &triangle.vertices {
                write_point(&mut buffer, vertex);
            }
        }
        Ok(buffer)
    }

    pub fn decode_result(&self, bytes: &[u8]) -> Result<TriangulationResult> {
        let (count, payload) =
            split_payload(bytes, TRIANGLE_RECORD_SIZE, self.limits.max_triangles)?;

        let mut triangles = Vec::with_capacity(count);
        for (index, record) in payload.chunks_exact(TRIANGLE_RECORD_SIZE).enumerate() {
            let base = index * 3;
            let a = read_point(&record[..POINT_RECORD_SIZE], base)?;
            let b = read_point(&record[POINT_RECORD_SIZE..2 * POINT_RECORD_SIZE], base + 1)?;
            let c = read_point(&record[2 * POINT_RECORD_SIZE..], base + 2)?;
            triangles.push(Triangle::new(a, b, c));
        }
        Ok(TriangulationResult::new(triangles))
    }
}

fn checked_count(len: usize, max: u32) -> Result<u32> {
    match u32::try_from(len) {
        Ok(count) if count <= max => Ok(count),
        _ => Err(TriangulatorError::OversizedDeclaration {
            count: len as u64,
            max: u64::from(max),
        }),
    }
}

/// Validates the header against `max` and the payload length, returning the declared count.
fn split_payload(bytes: &[u8], record_size: usize, max: u32) -> Result<(usize, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(TriangulatorError::MalformedHeader { len: bytes.len() });
    }

    let (header, payload) = bytes.split_at(HEADER_SIZE);
    let mut raw = [0u8; HEADER_SIZE];
    raw.copy_from_slice(header);
    let count = u32::from_le_bytes(raw);

    if count > max {
        return Err(TriangulatorError::OversizedDeclaration {
            count: u64::from(count),
            max: u64::from(max),
        });
    }

    let expected = u64::from(count) * record_size as u64;
    let actual = payload.len() as u64;
    if expected != actual {
        return Err(TriangulatorError::TruncatedPayload { expected, actual });
    }

    Ok((count as usize, payload))
}

fn write_point(buffer: &mut Vec<u8>, point: &Point) {
    buffer.extend_from_slice(&point.x().to_le_bytes());
    buffer.extend_from_slice(&point.y().to_le_bytes());
}

fn read_point(record: &[u8], index: usize) -> Result<Point> {
    let x = read_f64(&record[..8]);
    let y = read_f64(&record[8..POINT_RECORD_SIZE]);
    Point::new(x, y).ok_or(TriangulatorError::NonFiniteCoordinate { index })
}

fn read_f64(bytes: &[u8]) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    f64::from_le_bytes(raw)
}
