//! Seed-clustering "stained glass" effect.
//!
//! `seeds` distinct pixel positions are drawn at random. Every pixel joins
//! the cluster of its nearest seed (Euclidean distance, ties go to the
//! earlier seed) and takes the cluster's mean color.
//!
//! # Complexity
//! O(pixels × seeds) for the assignment pass, parallel over rows.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use rayon::prelude::*;

use crate::error::EditError;
use crate::grid::PixelGrid;
use crate::pixel::Pixel;
use crate::transform::Operator;

/// Mosaic operator. `seeds == 0` leaves the image unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mosaic {
    seeds: usize,
    rng_seed: Option<u64>,
}

impl Mosaic {
    /// `rng_seed` makes placement reproducible; `None` draws from OS entropy.
    pub fn new(seeds: i64, rng_seed: Option<u64>) -> Result<Self, EditError> {
        let seeds = usize::try_from(seeds).map_err(|_| {
            EditError::invalid_argument(format!("seed count must not be negative, got {seeds}"))
        })?;
        Ok(Self { seeds, rng_seed })
    }

    pub fn seeds(&self) -> usize {
        self.seeds
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Operator for Mosaic {
    fn name(&self) -> &str {
        "mosaic"
    }

    fn apply(&self, grid: &PixelGrid) -> Result<PixelGrid, EditError> {
        if self.seeds == 0 {
            return Ok(grid.clone());
        }
        let total = grid.len();
        let count = self.seeds.min(total);
        let width = grid.width() as usize;
        tracing::debug!(
            "mosaic with {count} seeds on {}x{}",
            grid.width(),
            grid.height()
        );

        let mut rng = self.rng();
        let centers: Vec<(i64, i64)> = index::sample(&mut rng, total, count)
            .into_iter()
            .map(|i| ((i / width) as i64, (i % width) as i64))
            .collect();

        let labels: Vec<usize> = (0..total)
            .into_par_iter()
            .map(|i| nearest(&centers, (i / width) as i64, (i % width) as i64))
            .collect();

        let mut sums = vec![[0_u64; 4]; count];
        for (px, &label) in grid.pixels().iter().zip(&labels) {
            let acc = &mut sums[label];
            acc[0] += u64::from(px.r);
            acc[1] += u64::from(px.g);
            acc[2] += u64::from(px.b);
            acc[3] += 1;
        }
        let means: Vec<Pixel> = sums.iter().map(mean).collect();

        Ok(grid.derive(labels.into_iter().map(|l| means[l]).collect()))
    }
}

fn nearest(centers: &[(i64, i64)], row: i64, col: i64) -> usize {
    let mut best = 0;
    let mut best_dist = i64::MAX;
    for (i, &(cr, cc)) in centers.iter().enumerate() {
        let d = (cr - row).pow(2) + (cc - col).pow(2);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// Rounded mean of an accumulated cluster. Every cluster holds at least its seed.
fn mean(acc: &[u64; 4]) -> Pixel {
    let n = acc[3].max(1);
    let avg = |sum: u64| ((sum + n / 2) / n) as u8;
    Pixel::new(avg(acc[0]), avg(acc[1]), avg(acc[2]))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::ErrorKind;

    fn noisy(width: u32, height: u32) -> PixelGrid {
        let mut pixels = Vec::new();
        for i in 0..width * height {
            pixels.push(Pixel::new(
                (i * 97 % 256) as u8,
                (i * 31 % 256) as u8,
                (i * 13 % 256) as u8,
            ));
        }
        PixelGrid::from_raw("noisy", width, height, pixels).unwrap()
    }

    #[test]
    fn test_negative_seed_count_rejected() {
        let err = Mosaic::new(-1, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_zero_seeds_is_noop() {
        let grid = noisy(6, 4);
        let out = Mosaic::new(0, Some(1)).unwrap().apply(&grid).unwrap();
        assert_eq!(out, grid);
    }

    #[test]
    fn test_single_seed_gives_global_mean() {
        let grid = PixelGrid::from_rows(
            "two",
            vec![vec![Pixel::new(0, 10, 255), Pixel::new(100, 20, 0)]],
        )
        .unwrap();
        let out = Mosaic::new(1, Some(3)).unwrap().apply(&grid).unwrap();
        assert!(out.pixels().iter().all(|p| *p == Pixel::new(50, 15, 128)));
    }

    #[test]
    fn test_seed_count_bounds_distinct_colors() {
        let grid = noisy(12, 9);
        let out = Mosaic::new(5, Some(42)).unwrap().apply(&grid).unwrap();
        let distinct: HashSet<Pixel> = out.pixels().iter().copied().collect();
        assert!(distinct.len() <= 5);
        assert_eq!(out.dimensions(), grid.dimensions());
    }

    #[test]
    fn test_seeds_beyond_pixel_count_is_identity() {
        let grid = noisy(3, 3);
        let out = Mosaic::new(1000, Some(9)).unwrap().apply(&grid).unwrap();
        assert_eq!(out, grid);
    }

    #[test]
    fn test_fixed_rng_seed_is_deterministic() {
        let grid = noisy(16, 16);
        let op = Mosaic::new(7, Some(1234)).unwrap();
        assert_eq!(op.apply(&grid).unwrap(), op.apply(&grid).unwrap());
    }

    #[test]
    fn test_pixels_take_mean_of_nearest_seed_cluster() {
        let (width, height, seeds, rng_seed) = (7_usize, 5_usize, 4_usize, 2024_u64);
        let grid = noisy(width as u32, height as u32);
        let out = Mosaic::new(seeds as i64, Some(rng_seed))
            .unwrap()
            .apply(&grid)
            .unwrap();

        let mut rng = StdRng::seed_from_u64(rng_seed);
        let centers: Vec<(usize, usize)> = index::sample(&mut rng, width * height, seeds)
            .into_iter()
            .map(|i| (i / width, i % width))
            .collect();

        let dist = |(r0, c0): (usize, usize), (r1, c1): (usize, usize)| {
            r0.abs_diff(r1).pow(2) + c0.abs_diff(c1).pow(2)
        };
        let mut labels = Vec::new();
        for row in 0..height {
            for col in 0..width {
                let mut best = 0;
                for k in 1..seeds {
                    if dist(centers[k], (row, col)) < dist(centers[best], (row, col)) {
                        best = k;
                    }
                }
                labels.push(best);
            }
        }

        for k in 0..seeds {
            let members: Vec<Pixel> = grid
                .pixels()
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == k)
                .map(|(p, _)| *p)
                .collect();
            let n = members.len() as f64;
            assert!(n >= 1.0, "cluster {k} lost its seed");
            let avg = |f: fn(&Pixel) -> u8| {
                (members.iter().map(|p| f64::from(f(p))).sum::<f64>() / n).round() as u8
            };
            let expected = Pixel::new(avg(|p| p.r), avg(|p| p.g), avg(|p| p.b));

            for (i, _) in labels.iter().enumerate().filter(|(_, l)| **l == k) {
                assert_eq!(out.pixels()[i], expected, "pixel {i} in cluster {k}");
            }
        }
    }

    #[test]
    fn test_nearest_prefers_earlier_seed_on_tie() {
        let centers = [(0, 0), (0, 2)];
        assert_eq!(nearest(&centers, 0, 1), 0);
        assert_eq!(nearest(&centers, 0, 2), 1);
    }
}
