//! Names of temporary introspection objects.

use std::sync::OnceLock;

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Alphabet of the random suffix.
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random suffix.
pub const ID_LEN: usize = 8;

// seeded once per process; reseeding per call repeats ids under rapid calls
static ID_RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();

/// Returns `prefix` followed by [`ID_LEN`] random lowercase alphanumerics.
pub fn temporary_object_id(prefix: &str) -> String {
    let mut rng = ID_RNG
        .get_or_init(|| Mutex::new(StdRng::from_entropy()))
        .lock();
    let mut id = String::with_capacity(prefix.len() + ID_LEN);
    id.push_str(prefix);
    id.extend((0..ID_LEN).map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char));
    id
}
