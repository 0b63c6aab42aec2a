// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Foundational value types for the broad-phase (integer AABB).

/// Axis-aligned bounding boxes (integer logical units).
pub mod aabb;
