//! # Primitive Shape Generation
//!
//! Y-up primitives centred on the origin, each with normals and texture
//! coordinates. Planes and rings lie in the XY plane facing +Z; callers rotate
//! them onto the ground.

use super::GeometryData;
use std::f32::consts::{PI, TAU};

/// Generate an axis-aligned box centred at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

    // (normal, u axis, v axis) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    for (normal, u_axis, v_axis) in faces {
        let base = data.vertices.len() as u32;
        for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = [
                normal[0] + u * u_axis[0] + v * v_axis[0],
                normal[1] + u * u_axis[1] + v * v_axis[1],
                normal[2] + u * u_axis[2] + v * v_axis[2],
            ];
            data.vertices.push([p[0] * hx, p[1] * hy, p[2] * hz]);
            data.normals.push(normal);
            data.tex_coords.push([(u + 1.0) * 0.5, (v + 1.0) * 0.5]);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a UV sphere
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Segments around the equator (min 3)
/// * `height_segments` - Segments from pole to pole (min 2)
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = width_segments.max(3);
    let lat_segs = height_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * TAU / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            data.vertices.push([x * radius, y * radius, z * radius]);
            data.normals.push([x, y, z]);
            data.tex_coords
                .push([long as f32 / long_segs as f32, lat as f32 / lat_segs as f32]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

/// Generate a capped cylinder (or frustum) along Y
///
/// A zero radius drops that cap, which is how cones are built.
///
/// # Arguments
/// * `radius_top` - Radius at +height/2
/// * `radius_bottom` - Radius at -height/2
/// * `height` - Extent along Y
/// * `segments` - Radial segments (min 3)
pub fn generate_cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;
    let slope = if height > 0.0 {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };

    for i in 0..=segs {
        let angle = i as f32 * TAU / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let normal = normalize([cos_a, slope, sin_a]);
        let u = i as f32 / segs as f32;

        data.vertices
            .push([radius_bottom * cos_a, -half_height, radius_bottom * sin_a]);
        data.normals.push(normal);
        data.tex_coords.push([u, 0.0]);

        data.vertices
            .push([radius_top * cos_a, half_height, radius_top * sin_a]);
        data.normals.push(normal);
        data.tex_coords.push([u, 1.0]);
    }

    for i in 0..segs {
        let bottom = i * 2;
        let top = bottom + 1;
        let bottom_next = bottom + 2;
        let top_next = bottom + 3;

        data.indices.extend_from_slice(&[bottom, top, bottom_next]);
        data.indices.extend_from_slice(&[top, top_next, bottom_next]);
    }

    if radius_bottom > 0.0 {
        add_cap(&mut data, radius_bottom, -half_height, segs, false);
    }
    if radius_top > 0.0 {
        add_cap(&mut data, radius_top, half_height, segs, true);
    }

    data
}

/// Generate a cone with its apex at +height/2
pub fn generate_cone(radius: f32, height: f32, segments: u32) -> GeometryData {
    generate_cylinder(0.0, radius, height, segments)
}

fn add_cap(data: &mut GeometryData, radius: f32, y: f32, segs: u32, top: bool) {
    let normal = if top { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };

    let center = data.vertices.len() as u32;
    data.vertices.push([0.0, y, 0.0]);
    data.normals.push(normal);
    data.tex_coords.push([0.5, 0.5]);

    for i in 0..=segs {
        let angle = i as f32 * TAU / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        data.vertices.push([radius * cos_a, y, radius * sin_a]);
        data.normals.push(normal);
        data.tex_coords.push([cos_a * 0.5 + 0.5, sin_a * 0.5 + 0.5]);
    }

    for i in 0..segs {
        let current = center + 1 + i;
        let next = current + 1;
        if top {
            data.indices.extend_from_slice(&[center, next, current]);
        } else {
            data.indices.extend_from_slice(&[center, current, next]);
        }
    }
}

/// Generate a plane in the XY plane facing +Z
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `width_segments` - Subdivisions along X
/// * `height_segments` - Subdivisions along Y
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        let pos_y = (v - 0.5) * height;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([u, v]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, i + 1, next_row]);
            data.indices.extend_from_slice(&[next_row, i + 1, next_row + 1]);
        }
    }

    data
}

/// Generate a flat annulus in the XY plane facing +Z
///
/// # Arguments
/// * `inner_radius` - Radius of the hole
/// * `outer_radius` - Outer edge radius
/// * `segments` - Segments around the ring (min 3)
pub fn generate_ring(inner_radius: f32, outer_radius: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    for i in 0..=segs {
        let angle = i as f32 * TAU / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        for radius in [inner_radius, outer_radius] {
            let x = radius * cos_a;
            let y = radius * sin_a;
            data.vertices.push([x, y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([
                (x / outer_radius + 1.0) * 0.5,
                (y / outer_radius + 1.0) * 0.5,
            ]);
        }
    }

    for i in 0..segs {
        let inner = i * 2;
        let outer = inner + 1;
        let inner_next = inner + 2;
        let outer_next = inner + 3;

        data.indices.extend_from_slice(&[inner, outer, outer_next]);
        data.indices.extend_from_slice(&[inner, outer_next, inner_next]);
    }

    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}
