//! Identity synthesis for elements that arrive without one

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 9;

/// Produces short random tokens of the form `el_xxxxxxxxx`
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic generator, for reproducible runs and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A token not present in `taken`
    pub fn fresh(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let token: String = (0..TOKEN_LEN)
                .map(|_| ALPHABET[self.rng.random_range(0..ALPHABET.len())] as char)
                .collect();
            let id = format!("el_{token}");
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Next `{prefix}{n}` identity not present in `taken`, advancing `counter`
pub fn next_sequential(prefix: &str, counter: &mut usize, taken: &HashSet<String>) -> String {
    loop {
        *counter += 1;
        let id = format!("{prefix}{counter}");
        if !taken.contains(&id) {
            return id;
        }
    }
}
