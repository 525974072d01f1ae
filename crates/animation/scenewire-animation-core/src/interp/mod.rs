//! Interpolation helpers. Quaternions use NLERP with shortest-arc sign
//! correction.

pub mod functions;
