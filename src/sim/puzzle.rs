//! Bitwise puzzle behind the target pattern
//!
//! Two random bit vectors combined with AND or OR; the player has to collect
//! the result bits in order.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bitwise operator of a puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BitOp {
    And,
    Or,
}

impl BitOp {
    pub fn apply(&self, a: u8, b: u8) -> u8 {
        match self {
            BitOp::And => a & b,
            BitOp::Or => a | b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BitOp::And => "AND",
            BitOp::Or => "OR",
        }
    }
}

/// A generated puzzle. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    a_bits: Vec<u8>,
    b_bits: Vec<u8>,
    op: BitOp,
    result_bits: Vec<u8>,
}

impl Puzzle {
    /// Build a puzzle from explicit operands.
    ///
    /// Returns `None` if the vectors differ in length or hold anything but 0/1.
    pub fn new(a_bits: Vec<u8>, b_bits: Vec<u8>, op: BitOp) -> Option<Self> {
        if a_bits.len() != b_bits.len() || a_bits.iter().chain(&b_bits).any(|&b| b > 1) {
            return None;
        }
        Some(Self::combine(a_bits, b_bits, op))
    }

    /// Random puzzle of `bits_len` bits
    pub fn generate<R: Rng + ?Sized>(bits_len: usize, rng: &mut R) -> Self {
        let op = if rng.random_bool(0.5) { BitOp::And } else { BitOp::Or };
        let a_bits: Vec<u8> = (0..bits_len).map(|_| rng.random_range(0..=1)).collect();
        let b_bits: Vec<u8> = (0..bits_len).map(|_| rng.random_range(0..=1)).collect();
        Self::combine(a_bits, b_bits, op)
    }

    /// Operands must already be validated (same length, 0/1 only)
    fn combine(a_bits: Vec<u8>, b_bits: Vec<u8>, op: BitOp) -> Self {
        let result_bits = a_bits
            .iter()
            .zip(&b_bits)
            .map(|(&a, &b)| op.apply(a, b))
            .collect();
        Self {
            a_bits,
            b_bits,
            op,
            result_bits,
        }
    }

    pub fn a_bits(&self) -> &[u8] {
        &self.a_bits
    }

    pub fn b_bits(&self) -> &[u8] {
        &self.b_bits
    }

    pub fn op(&self) -> BitOp {
        self.op
    }

    /// The target pattern
    pub fn result_bits(&self) -> &[u8] {
        &self.result_bits
    }

    pub fn len(&self) -> usize {
        self.result_bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result_bits.is_empty()
    }
}

/// Render bits as a string ("101")
pub fn bits_to_string(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_and_example() {
        let p = Puzzle::new(vec![1, 0, 1], vec![0, 1, 1], BitOp::And).unwrap();
        assert_eq!(p.result_bits(), &[0, 0, 1]);
        assert_eq!(bits_to_string(p.result_bits()), "001");
    }

    #[test]
    fn test_or_example() {
        let p = Puzzle::new(vec![1, 0, 0], vec![0, 1, 0], BitOp::Or).unwrap();
        assert_eq!(p.result_bits(), &[1, 1, 0]);
    }

    #[test]
    fn test_rejects_bad_operands() {
        assert!(Puzzle::new(vec![1, 0], vec![1], BitOp::And).is_none());
        assert!(Puzzle::new(vec![2], vec![1], BitOp::Or).is_none());
    }

    proptest! {
        #[test]
        fn generated_puzzle_is_consistent(seed in any::<u64>(), diff in 0usize..3) {
            let difficulty = Difficulty::ALL[diff];
            let bits_len = difficulty.tuning().bits_len;
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = Puzzle::generate(bits_len, &mut rng);

            prop_assert_eq!(p.result_bits().len(), bits_len);
            for i in 0..bits_len {
                prop_assert_eq!(p.result_bits()[i], p.op().apply(p.a_bits()[i], p.b_bits()[i]));
            }

            // Rebuilding from the operands gives the same puzzle
            let rebuilt = Puzzle::new(p.a_bits().to_vec(), p.b_bits().to_vec(), p.op());
            prop_assert_eq!(rebuilt.as_ref(), Some(&p));

            // Same seed regenerates the same puzzle
            let mut again = Pcg32::seed_from_u64(seed);
            prop_assert_eq!(Puzzle::generate(bits_len, &mut again), p);
        }
    }
}
