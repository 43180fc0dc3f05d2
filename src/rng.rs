// rng.rs
// The single shared PRNG that every probabilistic automaton draws from.
// Grounded on mason/logical_map.rs's and artisan/mod.rs's use of
// `bevy_turborand::GlobalRng`/`DelegatedRng` (`rng.usize(range)`,
// `rng.sample(&slice)`); tests need a seedable instance to pin, which
// engine/mod.rs's own commented-out `RngPlugin::new().with_rng_seed(69420)`
// line shows is the intended escape hatch (this crate uses it instead of the
// default `RngPlugin::default()`, which reseeds non-deterministically every
// run).

use bevy_turborand::{DelegatedRng, GlobalRng};

/// Returns true with probability `1/denominator` (`denominator <= 1` always
/// returns true), drawing one bounded integer from the shared RNG. Every
/// probabilistic decision in the terrain automata is expressed this way
/// rather than as a raw float comparison, since every probability involved
/// reduces to an exact integer reciprocal.
pub fn roll(rng: &mut GlobalRng, denominator: u32) -> bool {
	if denominator <= 1 {
		return true;
	}
	rng.u32(0..denominator) == 0
}

/// Uniformly shuffles `items` in place using the shared RNG (Fisher-Yates),
/// used by every terrain automaton's apply phase to remove scan-order bias.
pub fn shuffle<T>(rng: &mut GlobalRng, items: &mut [T]) {
	for i in (1..items.len()).rev() {
		let j = rng.usize(0..=i);
		items.swap(i, j);
	}
}

/// Picks one of two options uniformly, used by face-player's |x|=|y| tie-break.
pub fn coin_flip(rng: &mut GlobalRng) -> bool {
	rng.usize(0..2) == 0
}


// EOF
