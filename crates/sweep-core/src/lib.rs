// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! sweep-core: persistent 2D sweep-and-prune broad-phase.
//!
//! Maintains, for a dynamic population of axis-aligned boxes, the exact set
//! of overlapping pairs. Each tick a client moves boxes, calls
//! [`SweepPrune::update`] per box, and reads the pair set back out; the
//! structure rewires itself in time proportional to how much the spatial
//! order actually changed, not to the population size.
//!
//! Design notes:
//! - Deterministic: integer coordinates end to end, canonical pair identity,
//!   no ambient RNG, no time dependence.
//! - Allocation-free after construction: every store is sized once; `add`,
//!   `update`, and `remove` never touch the heap.
//! - Rustdoc is treated as part of the contract; public items are documented.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::cognitive_complexity,
    clippy::option_if_let_else,
    clippy::doc_markdown,
    clippy::too_many_lines,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::similar_names,
    clippy::trivially_copy_pass_by_ref,
    clippy::manual_let_else,
    clippy::multiple_crate_versions
)]

/// Foundational value types (integer AABB).
pub mod types;

/// The sweep-and-prune broad-phase.
pub mod broad;

/// Pair-word codec: canonical encoding and participant decoding.
pub use broad::pair::{pair_hi, pair_lo, pair_word};
/// Proxy handles, records, and collision filtering.
pub use broad::proxy::{CollisionFilter, Proxy, ProxyId, INVALID_PAIR_ID, MAX_OVERLAPS_PER_ENTITY};
/// The broad-phase structure and its reporting types.
pub use broad::sweep::{
    ProxyRename, SweepPrune, SweepStats, DEFAULT_MAX_ENTITIES, DEFAULT_MAX_PAIRS,
};
/// Error taxonomy of the closed capacity regime.
pub use broad::SweepError;
/// Integer axis-aligned bounding box.
pub use types::aabb::{Aabb, NUM_AXES};
