//! Record identifier generation.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Field that holds a record's identifier.
pub const ID_FIELD: &str = "_id";

/// Length of a generated identifier.
pub const ID_LENGTH: usize = 32;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

/// Draws a new identifier from `rng`.
///
/// Every position first picks a class, letter or digit, with equal
/// probability and then a uniform member of that class. Uniqueness is
/// not checked; it rests on the 32-character length.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| {
            let class = if rng.gen_bool(0.5) { LETTERS } else { DIGITS };
            char::from(class[rng.gen_range(0..class.len())])
        })
        .collect()
}

/// Returns true if `id` has the shape of a generated identifier.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Thread-safe identifier source shared by every collection of a database.
///
/// # Example
///
/// ```rust
/// use moonlight_core::IdGenerator;
///
/// let a = IdGenerator::seeded(42);
/// let b = IdGenerator::seeded(42);
/// assert_eq!(a.next_id(), b.next_id());
/// ```
#[derive(Debug)]
pub struct IdGenerator {
    rng: Mutex<StdRng>,
}

impl IdGenerator {
    /// Creates a generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a deterministic generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Creates a generator from an optional seed.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Returns the next identifier.
    pub fn next_id(&self) -> String {
        generate_id(&mut *self.rng.lock())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}
