use super::EnergySurface;
use crate::geometry::Lattice;

/// Pair-interaction energy model over coordination shells.
///
/// Interactions are stored in a flat array of length
/// `n_shells * n_species * n_species`, where element
/// `shell * n_species^2 + a * n_species + b` is the energy of an `(a, b)`
/// pair at that shell distance. The matrix is expected to be symmetric in
/// `(a, b)`.
pub struct AlloyModel {
    pub lattice: Lattice,
    pub n_species: usize,
    interactions: Vec<f64>,
}

impl AlloyModel {
    pub fn new(lattice: Lattice, n_species: usize, interactions: Vec<f64>) -> Self {
        assert_eq!(
            interactions.len(),
            lattice.n_shells * n_species * n_species,
            "interaction table must have n_shells * n_species^2 entries"
        );
        Self {
            lattice,
            n_species,
            interactions,
        }
    }

    /// Build the interaction table from one coupling per shell, with
    /// like pairs at `-j` and unlike pairs at `+j` (ordering alloy for
    /// `j > 0`).
    pub fn from_shell_couplings(lattice: Lattice, n_species: usize, couplings: &[f64]) -> Self {
        assert_eq!(couplings.len(), lattice.n_shells);
        let mut interactions = Vec::with_capacity(lattice.n_shells * n_species * n_species);
        for &j in couplings {
            for a in 0..n_species {
                for b in 0..n_species {
                    interactions.push(if a == b { -j } else { j });
                }
            }
        }
        Self::new(lattice, n_species, interactions)
    }

    #[inline]
    fn pair(&self, shell: usize, a: usize, b: usize) -> f64 {
        self.interactions[shell * self.n_species * self.n_species + a * self.n_species + b]
    }
}

impl EnergySurface for AlloyModel {
    /// Total configuration energy: every (site, neighbor) bond counted once.
    fn full_energy(&self, species: &[u8]) -> f64 {
        let mut total = 0.0f64;
        for site in 0..self.lattice.n_sites {
            let a = species[site] as usize;
            for shell in 0..self.lattice.n_shells {
                for &j in self.lattice.shell_neighbors(site, shell) {
                    total += self.pair(shell, a, species[j as usize] as usize);
                }
            }
        }
        0.5 * total
    }
}
