//! Binary geometry codec
//!
//! Well-known-binary encoding for the two geometry shapes the route network
//! uses: points and linestrings. Encoding always emits little-endian;
//! decoding accepts either byte order. Truncated buffers, unknown geometry
//! types and non-finite coordinates are codec errors, never panics.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use geo_types::{Coord, LineString, Point};
use routenet_core::{Result, RouteNetError};

const BYTE_ORDER_BIG: u8 = 0;
const BYTE_ORDER_LITTLE: u8 = 1;

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;

/// Encode a point as little-endian WKB.
pub fn encode_point(point: &Point<f64>) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + 4 + 16);
    buf.put_u8(BYTE_ORDER_LITTLE);
    buf.put_u32_le(WKB_POINT);
    buf.put_f64_le(point.x());
    buf.put_f64_le(point.y());
    buf.freeze()
}

/// Encode a linestring as little-endian WKB.
pub fn encode_line(line: &LineString<f64>) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + 4 + 4 + line.0.len() * 16);
    buf.put_u8(BYTE_ORDER_LITTLE);
    buf.put_u32_le(WKB_LINESTRING);
    buf.put_u32_le(line.0.len() as u32);
    for c in &line.0 {
        buf.put_f64_le(c.x);
        buf.put_f64_le(c.y);
    }
    buf.freeze()
}

/// Geometry shapes the codec understands.
#[derive(Debug, Clone, PartialEq)]
pub enum WkbGeometry {
    Point(Point<f64>),
    LineString(LineString<f64>),
}

impl WkbGeometry {
    /// True when the payload encodes a point.
    pub fn is_point(&self) -> bool {
        matches!(self, WkbGeometry::Point(_))
    }
}

/// Decode a WKB payload into a point or linestring.
pub fn decode(data: &[u8]) -> Result<WkbGeometry> {
    let mut buf = data;
    if buf.remaining() < 5 {
        return Err(RouteNetError::codec(format!(
            "WKB payload truncated: {} bytes",
            data.len()
        )));
    }

    let little_endian = match buf.get_u8() {
        BYTE_ORDER_LITTLE => true,
        BYTE_ORDER_BIG => false,
        other => {
            return Err(RouteNetError::codec(format!(
                "unknown WKB byte order marker {other:#04x}"
            )))
        }
    };

    let geometry_type = get_u32(&mut buf, little_endian);
    match geometry_type {
        WKB_POINT => {
            if buf.remaining() < 16 {
                return Err(RouteNetError::codec("WKB point truncated"));
            }
            let x = get_f64(&mut buf, little_endian);
            let y = get_f64(&mut buf, little_endian);
            check_finite(x, y)?;
            Ok(WkbGeometry::Point(Point::new(x, y)))
        }
        WKB_LINESTRING => {
            if buf.remaining() < 4 {
                return Err(RouteNetError::codec("WKB linestring header truncated"));
            }
            let count = get_u32(&mut buf, little_endian) as usize;
            if count < 2 {
                return Err(RouteNetError::codec(format!(
                    "WKB linestring has {count} coordinates, need at least 2"
                )));
            }
            if buf.remaining() < count * 16 {
                return Err(RouteNetError::codec(format!(
                    "WKB linestring truncated: {count} coordinates declared, {} bytes left",
                    buf.remaining()
                )));
            }
            let mut coords = Vec::with_capacity(count);
            for _ in 0..count {
                let x = get_f64(&mut buf, little_endian);
                let y = get_f64(&mut buf, little_endian);
                check_finite(x, y)?;
                coords.push(Coord { x, y });
            }
            Ok(WkbGeometry::LineString(LineString::from(coords)))
        }
        other => Err(RouteNetError::codec(format!(
            "unsupported WKB geometry type {other}"
        ))),
    }
}

/// Decode a WKB payload that must be a point.
pub fn decode_point(data: &[u8]) -> Result<Point<f64>> {
    match decode(data)? {
        WkbGeometry::Point(p) => Ok(p),
        WkbGeometry::LineString(_) => {
            Err(RouteNetError::codec("expected point geometry, got linestring"))
        }
    }
}

/// Decode a WKB payload that must be a linestring.
pub fn decode_line(data: &[u8]) -> Result<LineString<f64>> {
    match decode(data)? {
        WkbGeometry::LineString(l) => Ok(l),
        WkbGeometry::Point(_) => {
            Err(RouteNetError::codec("expected linestring geometry, got point"))
        }
    }
}

fn get_u32(buf: &mut &[u8], little_endian: bool) -> u32 {
    if little_endian {
        buf.get_u32_le()
    } else {
        buf.get_u32()
    }
}

fn get_f64(buf: &mut &[u8], little_endian: bool) -> f64 {
    if little_endian {
        buf.get_f64_le()
    } else {
        buf.get_f64()
    }
}

fn check_finite(x: f64, y: f64) -> Result<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(RouteNetError::codec(format!(
            "non-finite coordinate ({x}, {y}) in WKB payload"
        )));
    }
    Ok(())
}
