//! Geometrie-Kernel: zustandslose Funktionen für Abstand, Winkel und Segment-Schnitte.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Nenner-Schwelle, unterhalb der zwei Segmente als parallel gelten.
const EPS_DENOM: f64 = 1e-9;
/// Parameter-Slack an den Segment-Enden (gegen Rundungsrauschen bei Berührungen).
const EPS_PARAM: f64 = 1e-6;
/// Mindestlänge eines Segments.
const EPS_LEN: f32 = 1e-6;

/// Schnittpunkt zweier Segmente inkl. der Parameter auf beiden Segmenten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Schnittpunkt in Weltkoordinaten
    pub point: Vec2,
    /// Parameter auf dem ersten Segment (0 = Start, 1 = Ende)
    pub t: f32,
    /// Parameter auf dem zweiten Segment
    pub u: f32,
}

/// Euklidischer Abstand zweier Punkte.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Richtungswinkel von `from` nach `to` (Radiant, `(-π, π]`).
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Normalisiert einen Winkel auf `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid kann bei -0.0-nahen Werten exakt TAU liefern
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Gegenrichtung eines Winkels, wieder im Bereich `(-π, π]`.
pub fn opposite_angle(angle: f32) -> f32 {
    let flipped = angle + PI;
    if flipped > PI {
        flipped - TAU
    } else {
        flipped
    }
}

/// Prüft ob zwei Winkel modulo 2π innerhalb `tolerance` übereinstimmen.
pub fn angles_equivalent(a: f32, b: f32, tolerance: f32) -> bool {
    let diff = normalize_angle(a - b);
    diff <= tolerance || TAU - diff <= tolerance
}

/// Quantisiert einen Winkel auf einen ganzzahligen Bucket (`factor` = 10^Nachkommastellen).
///
/// Winkel knapp unter 2π landen im selben Bucket wie 0.
pub fn angle_bucket(angle: f32, factor: f32) -> i64 {
    let full_turn = (TAU * factor).round() as i64;
    let bucket = (normalize_angle(angle) * factor).round() as i64;
    if bucket >= full_turn {
        bucket - full_turn
    } else {
        bucket
    }
}

/// Parametrischer Schnitt der Segmente `a1→a2` und `b1→b2`.
///
/// Parallele, kollineare oder degenerierte (Länge 0) Segmente liefern `None`,
/// ebenso Schnitte außerhalb von `[0, 1]` auf einem der beiden Segmente.
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<SegmentHit> {
    if a1.distance(a2) < EPS_LEN || b1.distance(b2) < EPS_LEN {
        return None;
    }

    let (ax, ay) = (a1.x as f64, a1.y as f64);
    let (rx, ry) = ((a2.x - a1.x) as f64, (a2.y - a1.y) as f64);
    let (sx, sy) = ((b2.x - b1.x) as f64, (b2.y - b1.y) as f64);
    let (qx, qy) = (b1.x as f64 - ax, b1.y as f64 - ay);

    let denom = rx * sy - ry * sx;
    if denom.abs() <= EPS_DENOM * (rx.hypot(ry) * sx.hypot(sy)) {
        return None;
    }

    let t = (qx * sy - qy * sx) / denom;
    let u = (qx * ry - qy * rx) / denom;
    if !(-EPS_PARAM..=1.0 + EPS_PARAM).contains(&t) || !(-EPS_PARAM..=1.0 + EPS_PARAM).contains(&u)
    {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    let u = u.clamp(0.0, 1.0);
    Some(SegmentHit {
        point: Vec2::new((ax + t * rx) as f32, (ay + t * ry) as f32),
        t: t as f32,
        u: u as f32,
    })
}

/// Abstand eines Punkts zum Segment `a→b` und der Parameter des Lotfußpunkts (geklemmt).
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> (f32, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let projected = a + ab * t;
    (point.distance(projected), t)
}

/// Prüft ob `point` innerhalb `tolerance` (Lotabstand) zwischen den Endpunkten von `a→b` liegt.
pub fn point_on_segment(point: Vec2, a: Vec2, b: Vec2, tolerance: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPS_LEN * EPS_LEN {
        return point.distance(a) <= tolerance;
    }
    let raw_t = (point - a).dot(ab) / len_sq;
    if !(0.0..=1.0).contains(&raw_t) {
        return false;
    }
    let (dist, _) = point_segment_distance(point, a, b);
    dist <= tolerance
}
