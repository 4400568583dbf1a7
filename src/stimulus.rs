use crate::error::ConfigError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Display sizes, largest first.
pub const DEFAULT_SIZES: [u16; 20] = [
    46, 44, 42, 40, 38, 36, 34, 32, 30, 28, 26, 24, 22, 20, 18, 16, 12, 10, 8, 6,
];

/// Fixed pool of distinct sizes that a round's letters are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizePalette {
    sizes: Vec<u16>,
}

impl SizePalette {
    /// Builds a palette from `sizes`, sorted descending with duplicates dropped.
    pub fn new(mut sizes: Vec<u16>) -> Self {
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();
        Self { sizes }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn sizes(&self) -> &[u16] {
        &self.sizes
    }

    pub fn largest(&self) -> Option<u16> {
        self.sizes.first().copied()
    }
}

impl Default for SizePalette {
    fn default() -> Self {
        Self::new(DEFAULT_SIZES.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.gen(),
            g: rng.gen(),
            b: rng.gen(),
        }
    }
}

/// One letter shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stimulus {
    pub symbol: char,
    pub size: u16,
    pub color: Rgb,
}

impl Stimulus {
    pub fn new(symbol: char, size: u16, color: Rgb) -> Self {
        Self {
            symbol,
            size,
            color,
        }
    }
}

pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(b'A' + rng.gen_range(0..26u8))
}

/// Draws `n` letters whose sizes are sampled from `palette` without replacement.
///
/// Symbols and colors are independent per letter, so symbols may repeat.
pub fn generate_stimuli<R: Rng + ?Sized>(
    n: usize,
    palette: &SizePalette,
    rng: &mut R,
) -> Result<Vec<Stimulus>, ConfigError> {
    if n > palette.len() {
        return Err(ConfigError::TooManyLetters {
            requested: n,
            available: palette.len(),
        });
    }

    Ok(sample_stimuli(n, palette, rng))
}

/// Like [`generate_stimuli`], but draws at most `palette.len()` letters.
pub fn sample_stimuli<R: Rng + ?Sized>(
    n: usize,
    palette: &SizePalette,
    rng: &mut R,
) -> Vec<Stimulus> {
    let mut sizes: Vec<u16> = palette.sizes().choose_multiple(rng, n).copied().collect();
    sizes.shuffle(rng);

    let mut stimuli = Vec::with_capacity(sizes.len());
    for size in sizes {
        let symbol = random_letter(rng);
        stimuli.push(Stimulus::new(symbol, size, Rgb::random(rng)));
    }
    stimuli
}
