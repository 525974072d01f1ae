//! Linear interpolation over `Value`: component-wise for vectors, NLERP for
//! quaternions, axis-angle through quaternions.

use scenewire_api_core::math::{axis_angle_from_quat, quat_normalize};
use scenewire_api_core::{AxisAngle, Value};

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_n<const N: usize>(a: [f32; N], b: [f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0; N];
    for i in 0..N {
        out[i] = lerp_f32(a[i], b[i], t);
    }
    out
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Quaternion NLERP with shortest-arc correction. Returns a normalized (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    if dot4(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    quat_normalize(lerp_n(a, b, t))
}

/// Linear interpolation across Value kinds. Mismatched or non-numeric pairs
/// hold the left value until the segment ends.
pub fn linear_value(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Float(va), Value::Float(vb)) => Value::Float(lerp_f32(*va, *vb, t)),
        (Value::Double(va), Value::Double(vb)) => Value::Double(va + (vb - va) * t as f64),
        (Value::Vec2(va), Value::Vec2(vb)) => Value::Vec2(lerp_n(*va, *vb, t)),
        (Value::Vec3(va), Value::Vec3(vb)) => Value::Vec3(lerp_n(*va, *vb, t)),
        (Value::Color(va), Value::Color(vb)) => Value::Color(lerp_n(*va, *vb, t)),
        (Value::Quat(qa), Value::Quat(qb)) => Value::Quat(nlerp_quat(*qa, *qb, t)),
        (Value::AxisAngle(ra), Value::AxisAngle(rb)) => {
            let q = nlerp_quat(ra.to_quat(), rb.to_quat(), t);
            let (axis, angle) = axis_angle_from_quat(q);
            Value::AxisAngle(AxisAngle::new(axis, angle))
        }
        (Value::Vector(va), Value::Vector(vb)) if va.len() == vb.len() => Value::Vector(
            va.iter()
                .zip(vb.iter())
                .map(|(x, y)| lerp_f32(*x, *y, t))
                .collect(),
        ),
        _ => {
            if t < 1.0 {
                a.clone()
            } else {
                b.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_midpoint_vec3() {
        let v = linear_value(&Value::vec3(0.0, 0.0, 0.0), &Value::vec3(2.0, 4.0, 6.0), 0.5);
        assert_eq!(v, Value::vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn nlerp_takes_shortest_arc() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let b = [0.0, 0.0, 0.0, -1.0];
        let q = nlerp_quat(a, b, 0.5);
        assert!((q[3].abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn text_holds_left_until_end() {
        let a = Value::Text("a".into());
        let b = Value::Text("b".into());
        assert_eq!(linear_value(&a, &b, 0.99), a);
        assert_eq!(linear_value(&a, &b, 1.0), b);
    }
}
