//! Next-track selection
//!
//! Shuffle is history-free: each pick is uniform over every index except the
//! current one.

use rand::Rng;

/// Index that follows `current` in a playlist of `len` tracks
///
/// Returns `None` for an empty playlist.
pub fn next_index<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    shuffle: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }

    if shuffle {
        Some(shuffled_index(current, len, rng))
    } else {
        Some((current + 1) % len)
    }
}

/// Index that precedes `current`, wrapping to the end
pub fn previous_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((current + len - 1) % len)
}

/// Uniform pick among `0..len` excluding `current`
///
/// Draws from `0..len-1` and steps over `current`, so no retry loop is
/// needed. A single-track playlist can only return 0.
fn shuffled_index<R: Rng + ?Sized>(current: usize, len: usize, rng: &mut R) -> usize {
    if len <= 1 {
        return 0;
    }

    let draw = rng.gen_range(0..len - 1);
    if draw >= current {
        draw + 1
    } else {
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sequential_wraps() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(next_index(0, 3, false, &mut rng), Some(1));
        assert_eq!(next_index(2, 3, false, &mut rng), Some(0));
        assert_eq!(next_index(0, 0, false, &mut rng), None);
    }

    #[test]
    fn previous_wraps() {
        assert_eq!(previous_index(0, 4), Some(3));
        assert_eq!(previous_index(2, 4), Some(1));
        assert_eq!(previous_index(0, 0), None);
    }

    #[test]
    fn shuffle_never_repeats_current() {
        let mut rng = StdRng::seed_from_u64(42);
        for current in 0..5 {
            for _ in 0..200 {
                let next = next_index(current, 5, true, &mut rng).unwrap();
                assert_ne!(next, current);
                assert!(next < 5);
            }
        }
    }

    #[test]
    fn shuffle_reaches_every_other_index() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 4];
        for _ in 0..500 {
            seen[next_index(1, 4, true, &mut rng).unwrap()] = true;
        }
        assert_eq!(seen, [true, false, true, true]);
    }

    #[test]
    fn shuffle_single_track_stays() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(next_index(0, 1, true, &mut rng), Some(0));
    }
}
