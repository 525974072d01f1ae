//! Coercion helpers between Value shapes.
//! Used wherever the core reads a host property into a fixed-shape slot
//! (script arguments, drag baselines) and must degrade instead of failing.

use crate::{math, Value};

/// Attempt to coerce a Value into a scalar f32.
/// Rules:
/// - Float/Double/Int -> its value
/// - Bool -> 1.0 / 0.0
/// - vectors/colors -> first component
/// - AxisAngle -> the angle
/// - Text -> parsed number or 0.0
pub fn to_float(v: &Value) -> f32 {
    match v {
        Value::Float(f) => *f,
        Value::Double(d) => *d as f32,
        Value::Int(i) => *i as f32,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Vec2(a) => a[0],
        Value::Vec3(a) => a[0],
        Value::Quat(a) => a[0],
        Value::Color(a) => a[0],
        Value::AxisAngle(r) => r.angle,
        Value::Vector(vec) => vec.first().copied().unwrap_or(0.0),
        Value::Text(s) => s.trim().parse().unwrap_or(0.0),
    }
}

/// Truthiness: non-zero numbers and non-empty text are true.
pub fn to_bool(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Text(s) => {
            let t = s.trim();
            !(t.is_empty() || t.eq_ignore_ascii_case("false") || t == "0")
        }
        other => to_float(other) != 0.0,
    }
}

/// Convert a Value into a Vec<f32> (generic vector).
/// Rotations flatten in `(angle, x, y, z)` order.
pub fn to_vector(v: &Value) -> Vec<f32> {
    match v {
        Value::Float(f) => vec![*f],
        Value::Double(d) => vec![*d as f32],
        Value::Int(i) => vec![*i as f32],
        Value::Bool(b) => vec![if *b { 1.0 } else { 0.0 }],
        Value::Vec2(a) => a.to_vec(),
        Value::Vec3(a) => a.to_vec(),
        Value::Quat(a) => a.to_vec(),
        Value::Color(a) => a.to_vec(),
        Value::AxisAngle(r) => r.to_axyz().to_vec(),
        Value::Vector(vec) => vec.clone(),
        Value::Text(_) => vec![],
    }
}

/// Try to coerce a Value into a Vec3. Scalars broadcast; missing components are 0.
pub fn to_vec3(v: &Value) -> [f32; 3] {
    match v {
        Value::Vec3(a) | Value::Color(a) => *a,
        Value::Vec2(a) => [a[0], a[1], 0.0],
        Value::Float(_) | Value::Double(_) | Value::Int(_) | Value::Bool(_) => {
            let s = to_float(v);
            [s, s, s]
        }
        Value::Vector(vec) => {
            let mut out = [0.0f32; 3];
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = *vec.get(i).unwrap_or(&0.0);
            }
            out
        }
        Value::Quat(q) => [q[0], q[1], q[2]],
        Value::AxisAngle(r) => r.axis,
        Value::Text(_) => [0.0, 0.0, 0.0],
    }
}

/// Coerce into a quaternion (x, y, z, w). Axis-angle is converted; anything
/// else that is not a quaternion yields identity.
pub fn to_quat(v: &Value) -> [f32; 4] {
    match v {
        Value::Quat(q) => *q,
        Value::AxisAngle(r) => r.to_quat(),
        Value::Vector(vec) if vec.len() == 4 => [vec[0], vec[1], vec[2], vec[3]],
        _ => math::QUAT_IDENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AxisAngle;

    #[test]
    fn text_truthiness() {
        assert!(to_bool(&Value::Text("TRUE".into())));
        assert!(!to_bool(&Value::Text("false".into())));
        assert!(!to_bool(&Value::Text(" 0 ".into())));
        assert!(to_bool(&Value::Int(-1)));
    }

    #[test]
    fn rotation_flattens_angle_first() {
        let v = Value::AxisAngle(AxisAngle::new([1.0, 0.0, 0.0], 0.5));
        assert_eq!(to_vector(&v), vec![0.5, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn scalars_broadcast_to_vec3() {
        assert_eq!(to_vec3(&Value::Float(2.0)), [2.0, 2.0, 2.0]);
        assert_eq!(to_vec3(&Value::Vector(vec![1.0])), [1.0, 0.0, 0.0]);
    }
}
