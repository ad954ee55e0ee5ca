//! Concurrent fan-out annotation

use std::collections::BTreeSet;

use super::context::Frame;
use crate::symbol::{FanOut, SymbolModel, SymbolTrait};

/// Attach `ConcurrentFanout` to every callable that launches work.
///
/// Runs after capture analysis; the fan-out's captured set is the union of
/// the captures of closures handed to spawns.
pub(super) fn annotate(model: &mut SymbolModel, frames: &[Frame]) {
    for frame in frames {
        let Some(owner) = frame.symbol else {
            continue;
        };
        if frame.spawn_sites == 0 {
            continue;
        }

        let captured: BTreeSet<String> = frame
            .spawned_closures
            .iter()
            .filter_map(|id| model.symbol(*id))
            .flat_map(|closure| closure.captures.iter().cloned())
            .collect();

        let fan_out = FanOut {
            barrier: frame.barrier,
            spawn_sites: frame.spawn_sites,
            in_loop: frame.spawn_in_loop,
            captured: captured.into_iter().collect(),
        };
        if let Some(symbol) = model.symbol_mut(owner) {
            symbol.add_trait(SymbolTrait::ConcurrentFanout(fan_out));
        }
    }
}
