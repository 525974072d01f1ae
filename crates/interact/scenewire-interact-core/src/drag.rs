//! Drag-sensor runtime: a single process-wide manipulation session.
//!
//! Arming captures the camera look direction and the target's pose as a
//! baseline; every frame the change in look direction is mapped to a new
//! translation or rotation. Arming while a session is live replaces it.

use log::{debug, warn};

use scenewire_api_core::math::{
    add3, axis_angle_from_quat, length3, quat_from_axis_angle, quat_mul, scale3,
    signed_angle_about, sub3, twist_angle,
};
use scenewire_api_core::AxisAngle;

use crate::decl::TriggerKind;
use crate::fields::DragField;
use crate::object::ObjectId;
use crate::registry::{ItemId, TriggerId};

/// Constraint set for the active manipulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragKind {
    Plane { min: [f32; 2], max: [f32; 2] },
    Cylinder { min_angle: f32, max_angle: f32, axis: [f32; 3] },
    Sphere,
}

impl DragKind {
    pub fn from_trigger(kind: &TriggerKind) -> Option<DragKind> {
        match kind {
            TriggerKind::Plane {
                min_position,
                max_position,
            } => Some(DragKind::Plane {
                min: *min_position,
                max: *max_position,
            }),
            TriggerKind::Cylinder {
                min_angle,
                max_angle,
                axis,
            } => Some(DragKind::Cylinder {
                min_angle: *min_angle,
                max_angle: *max_angle,
                axis: *axis,
            }),
            TriggerKind::Sphere => Some(DragKind::Sphere),
            _ => None,
        }
    }
}

/// Where drag output goes.
#[derive(Clone, Debug, PartialEq)]
pub enum DragSink {
    Item { item: ItemId, field: String },
    Script { object: ObjectId },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragOutput {
    Translation([f32; 3]),
    Rotation(AxisAngle),
}

impl DragOutput {
    /// Positional event arguments: 3 for translations, `(angle, x, y, z)`
    /// for rotations.
    pub fn payload(&self) -> Vec<f32> {
        match self {
            DragOutput::Translation(v) => v.to_vec(),
            DragOutput::Rotation(r) => r.to_axyz().to_vec(),
        }
    }
}

/// Baseline captured at arm time.
#[derive(Clone, Debug, PartialEq)]
pub struct DragBaseline {
    pub look_direction: [f32; 3],
    pub camera_position: [f32; 3],
    pub translation: [f32; 3],
    /// Quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    pub hit_point: Option<[f32; 3]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub trigger: TriggerId,
    pub kind: DragKind,
    pub from: DragField,
    pub sink: DragSink,
    pub base: DragBaseline,
    hit_distance: f32,
    base_angle: f32,
}

#[inline]
fn clamp_if_ordered(v: f32, min: f32, max: f32) -> f32 {
    if min <= max {
        v.clamp(min, max)
    } else {
        v
    }
}

impl DragSession {
    pub fn new(
        trigger: TriggerId,
        kind: DragKind,
        from: DragField,
        sink: DragSink,
        base: DragBaseline,
    ) -> Self {
        let hit_distance = base
            .hit_point
            .map(|h| length3(sub3(h, base.camera_position)))
            .filter(|d| d.is_finite() && *d > f32::EPSILON)
            .unwrap_or(1.0);
        let base_angle = match kind {
            DragKind::Cylinder { axis, .. } => twist_angle(base.rotation, axis),
            _ => 0.0,
        };
        Self {
            trigger,
            kind,
            from,
            sink,
            base,
            hit_distance,
            base_angle,
        }
    }

    pub fn hit_distance(&self) -> f32 {
        self.hit_distance
    }

    /// Output for the current look direction.
    pub fn step(&self, look_direction: [f32; 3]) -> DragOutput {
        let delta = sub3(look_direction, self.base.look_direction);
        match self.kind {
            DragKind::Plane { min, max } => {
                let offset = scale3(delta, self.hit_distance);
                let moved = add3(self.base.translation, [offset[0], offset[1], 0.0]);
                let z = match (self.from, self.base.hit_point) {
                    (DragField::TrackPoint, Some(hit)) => hit[2],
                    _ => moved[2],
                };
                DragOutput::Translation([
                    clamp_if_ordered(moved[0], min[0], max[0]),
                    clamp_if_ordered(moved[1], min[1], max[1]),
                    z,
                ])
            }
            DragKind::Cylinder {
                min_angle,
                max_angle,
                axis,
            } => {
                let turned = signed_angle_about(axis, self.base.look_direction, look_direction);
                let angle = clamp_if_ordered(self.base_angle + turned, min_angle, max_angle);
                DragOutput::Rotation(AxisAngle::new(axis, angle))
            }
            DragKind::Sphere => {
                if self.from == DragField::TrackPoint {
                    let (x, y) = (delta[0], delta[1]);
                    return DragOutput::Translation([x, y, 1.0 - (x * x + y * y)]);
                }
                let about_y = quat_from_axis_angle([0.0, 1.0, 0.0], delta[0]);
                let about_x = quat_from_axis_angle([1.0, 0.0, 0.0], -delta[1]);
                let q = quat_mul(quat_mul(about_x, about_y), self.base.rotation);
                let (axis, angle) = axis_angle_from_quat(q);
                DragOutput::Rotation(AxisAngle::new(axis, angle))
            }
        }
    }
}

/// Single-slot owner of the drag session.
#[derive(Debug, Default)]
pub struct DragRuntime {
    session: Option<DragSession>,
}

impl DragRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session, replacing any live one.
    pub fn arm(&mut self, session: DragSession) {
        if let Some(old) = &self.session {
            warn!(
                "drag session for trigger {:?} replaced by {:?}",
                old.trigger, session.trigger
            );
        }
        debug!("drag armed by trigger {:?}", session.trigger);
        self.session = Some(session);
    }

    pub fn disarm(&mut self) -> Option<DragSession> {
        let s = self.session.take();
        if let Some(s) = &s {
            debug!("drag released by trigger {:?}", s.trigger);
        }
        s
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.session.is_some()
    }

    pub fn armed_by(&self, trigger: TriggerId) -> bool {
        self.session.as_ref().is_some_and(|s| s.trigger == trigger)
    }

    /// Disarm unless both active and over hold.
    pub fn should_release(active: bool, over: bool) -> bool {
        !active || !over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "left={a} right={b}");
    }

    fn base(hit: Option<[f32; 3]>) -> DragBaseline {
        DragBaseline {
            look_direction: [0.0, 0.0, -1.0],
            camera_position: [0.0, 0.0, 5.0],
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            hit_point: hit,
        }
    }

    fn sink() -> DragSink {
        DragSink::Item {
            item: ItemId(0),
            field: "translation".into(),
        }
    }

    #[test]
    fn plane_scales_by_hit_distance_and_clamps() {
        let s = DragSession::new(
            TriggerId(0),
            DragKind::Plane {
                min: [-1.0, -1.0],
                max: [1.0, 1.0],
            },
            DragField::Translation,
            sink(),
            base(Some([0.0, 0.0, 1.0])),
        );
        approx(s.hit_distance(), 4.0);
        let DragOutput::Translation(p) = s.step([0.1, 0.05, -1.0]) else {
            panic!("expected translation");
        };
        approx(p[0], 0.4);
        approx(p[1], 0.2);
        for huge in [10.0, -10.0, 1e6] {
            let DragOutput::Translation(p) = s.step([huge, huge, -1.0]) else {
                panic!("expected translation");
            };
            assert!((-1.0..=1.0).contains(&p[0]));
            assert!((-1.0..=1.0).contains(&p[1]));
        }
        assert_eq!(s.step([0.3, 0.2, -1.0]), s.step([0.3, 0.2, -1.0]));
    }

    #[test]
    fn plane_without_ordered_bounds_is_free_and_trackpoint_pins_z() {
        let s = DragSession::new(
            TriggerId(0),
            DragKind::Plane {
                min: [1.0, 0.0],
                max: [-1.0, -1.0],
            },
            DragField::TrackPoint,
            sink(),
            base(Some([0.0, 0.0, 2.5])),
        );
        let DragOutput::Translation(p) = s.step([5.0, 5.0, -1.0]) else {
            panic!("expected translation");
        };
        approx(p[0], 12.5);
        approx(p[1], 12.5);
        approx(p[2], 2.5);
    }

    #[test]
    fn missing_hit_point_uses_unit_distance() {
        let s = DragSession::new(
            TriggerId(0),
            DragKind::Plane {
                min: [1.0, 1.0],
                max: [0.0, 0.0],
            },
            DragField::Translation,
            sink(),
            base(None),
        );
        approx(s.hit_distance(), 1.0);
    }

    #[test]
    fn cylinder_turns_about_its_axis_with_clamp() {
        let s = DragSession::new(
            TriggerId(0),
            DragKind::Cylinder {
                min_angle: 0.0,
                max_angle: 1.0,
                axis: [0.0, 1.0, 0.0],
            },
            DragField::Rotation,
            sink(),
            base(None),
        );
        // Looking from -Z to +X is a -90° turn about +Y; clamped to 0.
        let DragOutput::Rotation(r) = s.step([1.0, 0.0, 0.0]) else {
            panic!("expected rotation");
        };
        approx(r.angle, 0.0);
        let DragOutput::Rotation(r) = s.step([-1.0, 0.0, 0.0]) else {
            panic!("expected rotation");
        };
        approx(r.angle, 1.0);
        assert_eq!(r.axis, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn sphere_rotates_and_trackpoint_stays_near_the_unit_sphere() {
        let s = DragSession::new(
            TriggerId(0),
            DragKind::Sphere,
            DragField::Rotation,
            sink(),
            base(None),
        );
        let DragOutput::Rotation(r) = s.step([FRAC_PI_2, 0.0, -1.0]) else {
            panic!("expected rotation");
        };
        approx(r.angle, FRAC_PI_2);
        approx(r.axis[1], 1.0);

        let t = DragSession::new(
            TriggerId(0),
            DragKind::Sphere,
            DragField::TrackPoint,
            sink(),
            base(None),
        );
        let DragOutput::Translation(p) = t.step([0.3, 0.4, -1.0]) else {
            panic!("expected translation");
        };
        approx(p[2], 1.0 - (0.09 + 0.16));
    }

    #[test]
    fn rearming_replaces_the_session() {
        let mut rt = DragRuntime::new();
        let mk = |t| {
            DragSession::new(
                TriggerId(t),
                DragKind::Sphere,
                DragField::Rotation,
                sink(),
                base(None),
            )
        };
        rt.arm(mk(0));
        rt.arm(mk(1));
        assert!(rt.armed_by(TriggerId(1)));
        assert!(!rt.armed_by(TriggerId(0)));
        assert!(rt.disarm().is_some());
        assert!(!rt.is_armed());
        assert!(DragRuntime::should_release(true, false));
        assert!(DragRuntime::should_release(false, true));
        assert!(!DragRuntime::should_release(true, true));
    }
}
