//! Population bound eviction policy
//!
//! Victim selection, in priority order:
//! 1. any falling particle (oldest first)
//! 2. the oldest settled particle in an edge bin (first, then last)
//! 3. the oldest settled particle in the bin furthest from center
//!
//! "Oldest" within a bin is the bottom of the stack (lowest y, ties broken by
//! creation order).

use std::cmp::Ordering;

use super::state::{Bin, Particle};

/// Index of the oldest falling particle
pub fn first_falling(particles: &[Particle]) -> Option<usize> {
    particles.iter().position(|p| !p.is_settled())
}

/// Bin indices ordered furthest-from-center first
pub fn bin_search_order(bin_count: usize) -> Vec<usize> {
    if bin_count == 0 {
        return Vec::new();
    }
    let middle = bin_count / 2;
    let mut order = Vec::with_capacity(bin_count);
    for distance in (0..=middle).rev() {
        if let Some(left) = middle.checked_sub(distance) {
            order.push(left);
        }
        let right = middle + distance;
        if right < bin_count && distance != 0 {
            order.push(right);
        }
    }
    order
}

/// Edge bins, first then last (deduplicated for single-bin boards)
pub fn edge_bins(bin_count: usize) -> Vec<usize> {
    match bin_count {
        0 => Vec::new(),
        1 => vec![0],
        n => vec![0, n - 1],
    }
}

fn stack_order(a: &Particle, b: &Particle) -> Ordering {
    a.pos
        .y
        .partial_cmp(&b.pos.y)
        .unwrap_or(Ordering::Equal)
        .then(a.id.cmp(&b.id))
}

/// Index of the bottom (oldest) particle settled in `bin`
pub fn oldest_in_bin(particles: &[Particle], bin: usize) -> Option<usize> {
    particles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.bin() == Some(bin))
        .min_by(|(_, a), (_, b)| stack_order(a, b))
        .map(|(i, _)| i)
}

/// Pick the settled particle to evict: edge bins first, then outside-in
///
/// Returns `(particle index, bin index)`.
pub fn settled_victim(particles: &[Particle], bin_count: usize) -> Option<(usize, usize)> {
    edge_bins(bin_count)
        .into_iter()
        .chain(bin_search_order(bin_count))
        .find_map(|bin| oldest_in_bin(particles, bin).map(|idx| (idx, bin)))
}

/// Re-stack every particle in `bin` contiguously from its floor
pub fn repack_bin(
    particles: &mut [Particle],
    bin: &Bin,
    ball_radius: f64,
    stack_offset: f64,
    top_y: f64,
) {
    let mut members: Vec<&mut Particle> = particles
        .iter_mut()
        .filter(|p| p.bin() == Some(bin.index))
        .collect();
    members.sort_by(|a, b| stack_order(a, b));

    for (slot, particle) in members.into_iter().enumerate() {
        particle.pos.x = bin.center_x;
        particle.pos.y = bin
            .stack_height(slot, ball_radius, stack_offset)
            .min(top_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ParticleId;
    use glam::DVec2;

    fn settled(id: u64, bin: usize, y: f64) -> Particle {
        let mut p = Particle::new(ParticleId(id), DVec2::ZERO);
        p.settle(bin, DVec2::new(bin as f64, y));
        p
    }

    fn falling(id: u64) -> Particle {
        Particle::new(ParticleId(id), DVec2::new(0.0, 3.0))
    }

    #[test]
    fn test_search_order_odd() {
        assert_eq!(bin_search_order(9), vec![0, 8, 1, 7, 2, 6, 3, 5, 4]);
    }

    #[test]
    fn test_search_order_even_covers_all() {
        let mut order = bin_search_order(4);
        assert_eq!(order[0], 0);
        assert_eq!(*order.last().unwrap(), 2);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_search_order_tiny() {
        assert!(bin_search_order(0).is_empty());
        assert_eq!(bin_search_order(1), vec![0]);
        assert_eq!(bin_search_order(2), vec![0, 1]);
    }

    #[test]
    fn test_first_falling() {
        let particles = vec![settled(1, 0, -5.0), falling(2), falling(3)];
        assert_eq!(first_falling(&particles), Some(1));
        assert_eq!(first_falling(&particles[..1]), None);
    }

    #[test]
    fn test_oldest_is_lowest_then_earliest() {
        let particles = vec![
            settled(5, 2, -4.0),
            settled(7, 2, -5.0),
            settled(6, 2, -5.0),
            settled(1, 3, -6.0),
        ];
        assert_eq!(oldest_in_bin(&particles, 2), Some(2));
        assert_eq!(oldest_in_bin(&particles, 4), None);
    }

    #[test]
    fn test_edge_bins_before_center() {
        let particles = vec![
            settled(1, 4, -5.0),
            settled(2, 8, -5.0),
            settled(3, 8, -4.9),
        ];
        assert_eq!(settled_victim(&particles, 9), Some((1, 8)));
    }

    #[test]
    fn test_furthest_from_center_when_edges_empty() {
        let particles = vec![
            settled(1, 4, -5.0),
            settled(2, 6, -5.0),
            settled(3, 2, -5.0),
        ];
        // Bins 2 and 6 are equally far; left side is searched first
        assert_eq!(settled_victim(&particles, 9), Some((2, 2)));
    }

    #[test]
    fn test_no_settled_victim() {
        assert_eq!(settled_victim(&[falling(1)], 9), None);
    }

    #[test]
    fn test_repack_bin() {
        let bin = Bin {
            index: 1,
            center_x: 1.0,
            floor_y: -5.0,
            width: 1.0,
            count: 2,
        };
        let mut particles = vec![settled(4, 1, -4.0), falling(5), settled(2, 1, -4.5)];
        repack_bin(&mut particles, &bin, 0.2, 0.5, 10.0);
        assert!((particles[2].pos.y - (-5.0)).abs() < 1e-12);
        assert!((particles[0].pos.y - (-4.9)).abs() < 1e-12);
        assert_eq!(particles[1].pos, DVec2::new(0.0, 3.0));
    }
}
