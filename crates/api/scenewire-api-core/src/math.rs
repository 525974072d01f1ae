//! Small fixed-size math helpers on plain arrays.
//!
//! Quaternions are (x, y, z, w). Matrices are 3x3 row-major and act on 2D
//! homogeneous texture coordinates.

pub const QUAT_IDENTITY: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const MAT3_IDENTITY: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

const AXIS_EPS: f32 = 1e-6;

#[inline]
pub fn add3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale3(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot3(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn length3(a: [f32; 3]) -> f32 {
    dot3(a, a).sqrt()
}

/// Normalize, returning None for (near) zero-length input.
#[inline]
pub fn normalize3(a: [f32; 3]) -> Option<[f32; 3]> {
    let len = length3(a);
    if len > AXIS_EPS && len.is_finite() {
        Some(scale3(a, len.recip()))
    } else {
        None
    }
}

#[inline]
pub fn quat_normalize(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3];
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
        q
    } else {
        QUAT_IDENTITY
    }
}

/// Quaternion for a rotation of `angle` radians about `axis`.
/// A zero axis yields identity.
pub fn quat_from_axis_angle(axis: [f32; 3], angle: f32) -> [f32; 4] {
    let Some(n) = normalize3(axis) else {
        return QUAT_IDENTITY;
    };
    let half = angle * 0.5;
    let s = half.sin();
    [n[0] * s, n[1] * s, n[2] * s, half.cos()]
}

/// Axis-angle for a quaternion. The angle is in [0, 2π); a rotation with no
/// meaningful axis reports +Z.
pub fn axis_angle_from_quat(q: [f32; 4]) -> ([f32; 3], f32) {
    let q = quat_normalize(q);
    let w = q[3].clamp(-1.0, 1.0);
    let angle = 2.0 * w.acos();
    let s = (1.0 - w * w).max(0.0).sqrt();
    if s < AXIS_EPS {
        return ([0.0, 0.0, 1.0], 0.0);
    }
    ([q[0] / s, q[1] / s, q[2] / s], angle)
}

/// Hamilton product `a * b` (applies `b` first, then `a`).
pub fn quat_mul(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// Twist angle of `q` about `axis` (swing-twist decomposition).
pub fn twist_angle(q: [f32; 4], axis: [f32; 3]) -> f32 {
    let Some(n) = normalize3(axis) else {
        return 0.0;
    };
    let proj = dot3([q[0], q[1], q[2]], n);
    2.0 * proj.atan2(q[3])
}

/// Signed angle from `from` to `to` about `axis`, measured after projecting
/// both directions onto the plane normal to the axis.
pub fn signed_angle_about(axis: [f32; 3], from: [f32; 3], to: [f32; 3]) -> f32 {
    let Some(n) = normalize3(axis) else {
        return 0.0;
    };
    let a = sub3(from, scale3(n, dot3(from, n)));
    let b = sub3(to, scale3(n, dot3(to, n)));
    if length3(a) < AXIS_EPS || length3(b) < AXIS_EPS {
        return 0.0;
    }
    dot3(n, cross3(a, b)).atan2(dot3(a, b))
}

pub fn mat3_mul(a: [f32; 9], b: [f32; 9]) -> [f32; 9] {
    let mut out = [0.0f32; 9];
    for row in 0..3 {
        for col in 0..3 {
            out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
        }
    }
    out
}

pub fn mat3_translation(t: [f32; 2]) -> [f32; 9] {
    [1.0, 0.0, t[0], 0.0, 1.0, t[1], 0.0, 0.0, 1.0]
}

pub fn mat3_scale(s: [f32; 2]) -> [f32; 9] {
    [s[0], 0.0, 0.0, 0.0, s[1], 0.0, 0.0, 0.0, 1.0]
}

pub fn mat3_rotation(angle: f32) -> [f32; 9] {
    let (s, c) = angle.sin_cos();
    [c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0]
}
