//! Gradient (Perlin) noise over 3-D space.

use rand::seq::SliceRandom;
use rand::Rng;
use umbra_math::Vec3;

const POINT_COUNT: usize = 256;

/// Lattice of random unit gradients with three permutation tables.
#[derive(Clone, Debug)]
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let gradients = (0..POINT_COUNT)
            .map(|_| random_unit_vector(rng))
            .collect();

        Self {
            gradients,
            perm_x: permutation(rng),
            perm_y: permutation(rng),
            perm_z: permutation(rng),
        }
    }

    /// Smoothly interpolated noise in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let floor = p.floor();
        let frac = p - floor;
        let (i, j, k) = (floor.x as i32, floor.y as i32, floor.z as i32);

        let mut corners = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in corners.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, corner) in row.iter_mut().enumerate() {
                    let index = self.perm_x[((i + di as i32) & 255) as usize]
                        ^ self.perm_y[((j + dj as i32) & 255) as usize]
                        ^ self.perm_z[((k + dk as i32) & 255) as usize];
                    *corner = self.gradients[index];
                }
            }
        }

        trilinear(&corners, frac)
    }

    /// Sum of `depth` octaves of noise with halving weights, absolute value.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut point = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(point);
            weight *= 0.5;
            point *= 2.0;
        }

        accum.abs()
    }
}

fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-12 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

fn permutation<R: Rng + ?Sized>(rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
    perm.shuffle(rng);
    perm
}

/// Hermite-smoothed trilinear blend of the corner gradients' contributions.
fn trilinear(corners: &[[[Vec3; 2]; 2]; 2], frac: Vec3) -> f32 {
    let smooth = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);
    let mut accum = 0.0;

    for (i, plane) in corners.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let offset = frac - Vec3::new(fi, fj, fk);
                accum += (fi * smooth.x + (1.0 - fi) * (1.0 - smooth.x))
                    * (fj * smooth.y + (1.0 - fj) * (1.0 - smooth.y))
                    * (fk * smooth.z + (1.0 - fk) * (1.0 - smooth.z))
                    * gradient.dot(offset);
            }
        }
    }

    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_vanishes_on_lattice() {
        let mut rng = StdRng::seed_from_u64(42);
        let perlin = Perlin::new(&mut rng);

        // Gradient noise is zero at integer points.
        for p in [Vec3::ZERO, Vec3::new(3.0, -2.0, 7.0), Vec3::splat(100.0)] {
            assert!(perlin.noise(p).abs() < 1e-6);
        }
    }

    #[test]
    fn test_noise_bounded_and_deterministic() {
        let perlin_a = Perlin::new(&mut StdRng::seed_from_u64(7));
        let perlin_b = Perlin::new(&mut StdRng::seed_from_u64(7));
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..500 {
            let p = Vec3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
            );
            let n = perlin_a.noise(p);
            assert!(n.abs() <= 1.5, "noise {} out of range at {:?}", n, p);
            assert_eq!(n, perlin_b.noise(p));
            assert!(perlin_a.turbulence(p, 7) >= 0.0);
        }
    }

    #[test]
    fn test_permutation_is_complete() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut perm = permutation(&mut rng);
        perm.sort_unstable();
        assert_eq!(perm, (0..POINT_COUNT).collect::<Vec<_>>());
    }
}
