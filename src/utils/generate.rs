use super::encoding::SYMBOLS;
use rand::Rng;

/// A uniformly random read of `length` symbols.
pub fn random_read<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| SYMBOLS[rng.gen_range(0..SYMBOLS.len())].as_char())
        .collect()
}

/// `count` random reads of `length` symbols each.
pub fn random_reads<R: Rng + ?Sized>(rng: &mut R, length: usize, count: usize) -> Vec<String> {
    (0..count).map(|_| random_read(rng, length)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::encoding::parse_symbols;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reads_are_valid_and_sized() {
        let mut rng = StdRng::seed_from_u64(7);
        let reads = random_reads(&mut rng, 50, 20);
        assert_eq!(reads.len(), 20);
        for read in &reads {
            assert_eq!(parse_symbols(read).unwrap().len(), 50);
        }
    }

    #[test]
    fn test_same_seed_same_reads() {
        let a = random_reads(&mut StdRng::seed_from_u64(42), 30, 5);
        let b = random_reads(&mut StdRng::seed_from_u64(42), 30, 5);
        assert_eq!(a, b);
        assert!(random_read(&mut StdRng::seed_from_u64(1), 0).is_empty());
    }
}
