use std::{fmt::Write as _, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Piece supply using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. The bag is filled with all 7 piece kinds
/// 2. The bag is shuffled (Fisher–Yates, uniform)
/// 3. Pieces are drawn from the end of the bag one at a time
/// 4. A fresh shuffled bag is made only once the previous one is empty
///
/// Every window of 7 draws aligned to a refill therefore contains each kind
/// exactly once. Across the seam between two bags the same kind may appear
/// with as little as one piece in between.
///
/// # Example
///
/// ```
/// use blockfall_engine::PieceBag;
///
/// let mut bag = PieceBag::new();
/// let mut drawn: Vec<_> = (0..7).map(|_| bag.pop()).collect();
/// drawn.sort_by_key(|kind| *kind as u8);
/// drawn.dedup();
/// assert_eq!(drawn.len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceBag {
    rng: Pcg32,
    bag: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator of a [`PieceBag`]. The same seed produces the same piece
/// sequence, which makes sessions reproducible for debugging and scripted
/// replays.
///
/// Seeds are written as 32 hexadecimal characters, both by serde and by
/// [`Display`](std::fmt::Display) / [`FromStr`].
///
/// # Example
///
/// ```
/// use blockfall_engine::{Game, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let game1 = Game::with_seed(seed);
/// let game2 = Game::with_seed(seed);
/// assert!(game1.next_pieces().eq(game2.next_pieces()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

/// Error returned when a [`PieceSeed`] cannot be parsed from hex.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParsePieceSeedError {
    #[display("invalid hex: expected 32 characters, got {_0}")]
    InvalidLength(#[error(not(source))] usize),
    #[display("invalid hex: {_0}")]
    InvalidDigit(#[error(not(source))] String),
}

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl std::fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParsePieceSeedError::InvalidLength(hex_str.len()));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|_| ParsePieceSeedError::InvalidDigit(hex_str.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
///
/// This implementation enables idiomatic seed generation with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBag {
    /// Creates a new bag with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: ArrayVec::new(),
        }
    }

    /// Refills the bag with one shuffled copy of every kind.
    fn refill(&mut self) {
        debug_assert!(self.bag.is_empty());
        self.bag.extend(PieceKind::ALL);
        self.bag.shuffle(&mut self.rng);
    }

    /// Draws the next piece, refilling the bag first when it is empty.
    pub fn pop(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            self.refill();
        }
        self.bag
            .pop()
            .expect("bag holds 7 pieces right after a refill")
    }

    /// Number of pieces left before the next refill.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }

    /// Derives a seed for a follow-up session from this bag's generator.
    pub fn next_seed(&mut self) -> PieceSeed {
        self.rng.random()
    }
}
