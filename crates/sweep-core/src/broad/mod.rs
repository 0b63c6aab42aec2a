// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Sweep-and-prune broad-phase: endpoint codec, proxies, pairs, and the
//! persistent structure itself.
//!
//! Determinism contract:
//! - Pair identity is canonicalized as `(min_id, max_id)` in one 32-bit word.
//! - After updating every proxy within a tick, the live pair set depends
//!   only on the final AABBs, not on the order of `update` calls.
//! - Overlap is inclusive on edges (touching AABBs are considered
//!   overlapping).
//!
//! The structure is incrementally sorted: mutations cost time proportional
//! to how far endpoints move in sort order, so a temporally coherent
//! population pays near-linear per tick regardless of its size.

use thiserror::Error;

use proxy::ProxyId;

/// Endpoint word codec (flag, owner id, coordinate in one u64).
pub mod endpoint;
/// Pair words and the dense pair table.
pub mod pair;
/// Proxy records and collision filtering.
pub mod proxy;
/// The sweep-and-prune facade and its sort kernels.
pub mod sweep;

/// Errors emitted by the broad-phase.
///
/// The structure operates in a closed capacity regime: every store is sized
/// at construction, and overflowing one is a configuration error the caller
/// fixes by sizing for the worst case, not a condition to recover from at
/// runtime.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SweepError {
    /// A fixed-capacity store (proxy table, pair table, or one proxy's
    /// overlap slots) is full. The failing operation rolls itself back, so
    /// the structure is left exactly as it was before the call.
    #[error("fixed capacity exhausted: {resource}")]
    OverCapacity {
        /// Which store overflowed.
        resource: &'static str,
    },
    /// The operation requires a registered proxy.
    #[error("proxy {0:?} is not registered")]
    NotRegistered(ProxyId),
}
