//! # Polygon Extrusion
//!
//! Turns a plan outline into a prism. The outline lies in the local XY
//! plane and is extruded along +Z, so callers rotate the result -90 degrees
//! about X to stand it on the Y-up ground.

use cgmath::{InnerSpace, Vector2};

use super::GeometryData;
use crate::error::{Result, WarehouseError};

const EPSILON: f32 = 1e-6;

/// Outline without repeated points, wound counter-clockwise, with a map back
/// to the caller's indices.
struct CleanOutline {
    points: Vec<Vector2<f32>>,
    source: Vec<u32>,
}

fn clean_outline(outline: &[Vector2<f32>]) -> Result<CleanOutline> {
    let mut points: Vec<Vector2<f32>> = Vec::with_capacity(outline.len());
    let mut source = Vec::with_capacity(outline.len());

    for (i, point) in outline.iter().enumerate() {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(WarehouseError::InvalidPolygon(format!(
                "point {i} is not finite"
            )));
        }
        if points.last().is_some_and(|last| (*last - *point).magnitude2() < EPSILON) {
            continue;
        }
        points.push(*point);
        source.push(i as u32);
    }

    // Closing point that repeats the first one
    while points.len() > 1 && (points[0] - points[points.len() - 1]).magnitude2() < EPSILON {
        points.pop();
        source.pop();
    }

    if points.len() < 3 {
        return Err(WarehouseError::InvalidPolygon(format!(
            "needs at least 3 distinct points, got {}",
            points.len()
        )));
    }

    if signed_area(&points) < 0.0 {
        points.reverse();
        source.reverse();
    }

    Ok(CleanOutline { points, source })
}

/// Twice the signed area; positive for counter-clockwise outlines.
fn signed_area(points: &[Vector2<f32>]) -> f32 {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum()
}

fn cross(o: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn point_in_triangle(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Ear clipping over a counter-clockwise outline. Triangles index `points`.
fn ear_clip(points: &[Vector2<f32>]) -> Result<Vec<[usize; 3]>> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));

    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            let (a, b, c) = (
                remaining[(i + n - 1) % n],
                remaining[i],
                remaining[(i + 1) % n],
            );
            if cross(points[a], points[b], points[c]) <= EPSILON {
                return false;
            }
            remaining.iter().all(|&p| {
                p == a
                    || p == b
                    || p == c
                    || points[p] == points[a]
                    || points[p] == points[b]
                    || points[p] == points[c]
                    || !point_in_triangle(points[p], points[a], points[b], points[c])
            })
        });

        match ear {
            Some(i) => {
                triangles.push([remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]]);
                remaining.remove(i);
            }
            None => {
                // Collinear vertices never form an ear; drop one and retry.
                let flat = (0..n).find(|&i| {
                    let (a, b, c) = (
                        remaining[(i + n - 1) % n],
                        remaining[i],
                        remaining[(i + 1) % n],
                    );
                    cross(points[a], points[b], points[c]).abs() <= EPSILON
                });
                match flat {
                    Some(i) => {
                        remaining.remove(i);
                    }
                    None => {
                        return Err(WarehouseError::InvalidPolygon(
                            "outline intersects itself".to_string(),
                        ))
                    }
                }
            }
        }
    }

    if remaining.len() == 3 {
        let [a, b, c] = [remaining[0], remaining[1], remaining[2]];
        if cross(points[a], points[b], points[c]).abs() > EPSILON {
            triangles.push([a, b, c]);
        }
    }

    if triangles.is_empty() {
        return Err(WarehouseError::InvalidPolygon(
            "outline has no area".to_string(),
        ));
    }
    Ok(triangles)
}

/// Triangulates a simple polygon of either winding.
///
/// Returned indices point into `outline` and wind counter-clockwise in the
/// XY plane. A duplicated closing point is ignored.
pub fn triangulate(outline: &[Vector2<f32>]) -> Result<Vec<u32>> {
    let clean = clean_outline(outline)?;
    Ok(ear_clip(&clean.points)?
        .into_iter()
        .flatten()
        .map(|i| clean.source[i])
        .collect())
}

/// Extrudes a plan outline into a prism
///
/// # Arguments
/// * `outline` - Polygon in the XY plane, either winding
/// * `depth` - Extrusion length along +Z
///
/// The bottom cap sits at `z = 0` facing -Z, the top cap at `z = depth`
/// facing +Z. Side walls are flat shaded. Texture coordinates map the
/// outline's bounding box onto `0..1` for every face.
pub fn extrude_polygon(outline: &[Vector2<f32>], depth: f32) -> Result<GeometryData> {
    if !(depth > 0.0) {
        return Err(WarehouseError::InvalidPolygon(format!(
            "extrusion depth must be positive, got {depth}"
        )));
    }

    let clean = clean_outline(outline)?;
    let points = &clean.points;
    let caps = ear_clip(points)?;

    let (min, max) = points.iter().fold(
        (points[0], points[0]),
        |(min, max), p| {
            (
                Vector2::new(min.x.min(p.x), min.y.min(p.y)),
                Vector2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    );
    let range = Vector2::new(
        if max.x - min.x > EPSILON { max.x - min.x } else { 1.0 },
        if max.y - min.y > EPSILON { max.y - min.y } else { 1.0 },
    );
    let uv = |p: Vector2<f32>| [(p.x - min.x) / range.x, (p.y - min.y) / range.y];

    let mut data = GeometryData::new();
    let n = points.len() as u32;

    // Bottom cap (reverse winding so it faces -Z)
    for p in points {
        data.vertices.push([p.x, p.y, 0.0]);
        data.normals.push([0.0, 0.0, -1.0]);
        data.tex_coords.push(uv(*p));
    }
    for [a, b, c] in &caps {
        data.indices.extend([*a as u32, *c as u32, *b as u32]);
    }

    // Top cap
    for p in points {
        data.vertices.push([p.x, p.y, depth]);
        data.normals.push([0.0, 0.0, 1.0]);
        data.tex_coords.push(uv(*p));
    }
    for [a, b, c] in &caps {
        data.indices.extend([n + *a as u32, n + *b as u32, n + *c as u32]);
    }

    // Side walls
    for i in 0..points.len() {
        let p0 = points[i];
        let p1 = points[(i + 1) % points.len()];
        let edge = p1 - p0;
        if edge.magnitude2() < EPSILON {
            continue;
        }
        let outward = Vector2::new(edge.y, -edge.x).normalize();
        let normal = [outward.x, outward.y, 0.0];

        let base = data.vertices.len() as u32;
        data.vertices.extend([
            [p0.x, p0.y, 0.0],
            [p1.x, p1.y, 0.0],
            [p1.x, p1.y, depth],
            [p0.x, p0.y, depth],
        ]);
        data.normals.extend([normal; 4]);
        data.tex_coords.extend([uv(p0), uv(p1), uv(p1), uv(p0)]);
        data.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    Ok(data)
}
