use super::shells::shell_offsets;

/// Periodic 4-D lattice with a precomputed shell-neighbor table.
///
/// Sites are indexed in row-major (C) order. The neighbor table stores, for
/// every site, the flat indices of its neighbors in each coordination shell;
/// `shell_ptr` delimits the shells within each site's block.
pub struct Lattice {
    /// Extent along each dimension (e.g. `[8, 8, 8, 1]`).
    pub shape: [usize; 4],
    /// Row-major strides: `strides[d] = product of shape[d+1..]`.
    pub strides: [usize; 4],
    /// Total number of sites (`shape.iter().product()`).
    pub n_sites: usize,
    /// Number of coordination shells in the table.
    pub n_shells: usize,
    /// Shell boundaries within one site's neighbor block, length `n_shells + 1`.
    shell_ptr: Vec<usize>,
    /// Flat neighbor table, length `n_sites * shell_ptr[n_shells]`.
    neighbors: Vec<u32>,
}

impl Lattice {
    /// Build the lattice and its neighbor table for the first `n_shells`
    /// coordination shells.
    ///
    /// Shell offsets are canonicalized modulo the extents: vectors that wrap
    /// onto the origin or onto another vector of the same shell are dropped,
    /// uniformly for every site.
    pub fn new(shape: [usize; 4], n_shells: usize) -> Self {
        let n_sites: usize = shape.iter().product();
        assert!(n_sites > 0, "every lattice extent must be >= 1");

        let mut strides = [1usize; 4];
        for d in (0..3).rev() {
            strides[d] = strides[d + 1] * shape[d + 1];
        }

        // canonical (wrapped) offsets per shell, deduplicated
        let mut shells: Vec<Vec<[usize; 4]>> = Vec::with_capacity(n_shells);
        for raw in shell_offsets(n_shells) {
            let mut seen: Vec<[usize; 4]> = Vec::with_capacity(raw.len());
            for off in raw {
                let wrapped = [
                    off[0].rem_euclid(shape[0] as isize) as usize,
                    off[1].rem_euclid(shape[1] as isize) as usize,
                    off[2].rem_euclid(shape[2] as isize) as usize,
                    off[3].rem_euclid(shape[3] as isize) as usize,
                ];
                if wrapped == [0, 0, 0, 0] || seen.contains(&wrapped) {
                    continue;
                }
                seen.push(wrapped);
            }
            shells.push(seen);
        }

        let mut shell_ptr = Vec::with_capacity(n_shells + 1);
        shell_ptr.push(0);
        for shell in &shells {
            shell_ptr.push(shell_ptr.last().unwrap() + shell.len());
        }
        let per_site = *shell_ptr.last().unwrap();

        let mut neighbors = vec![0u32; n_sites * per_site];
        for site in 0..n_sites {
            let coords = [
                (site / strides[0]) % shape[0],
                (site / strides[1]) % shape[1],
                (site / strides[2]) % shape[2],
                (site / strides[3]) % shape[3],
            ];
            let mut k = site * per_site;
            for shell in &shells {
                for off in shell {
                    let mut flat = 0usize;
                    for dim in 0..4 {
                        flat += (coords[dim] + off[dim]) % shape[dim] * strides[dim];
                    }
                    neighbors[k] = flat as u32;
                    k += 1;
                }
            }
        }

        Self {
            shape,
            strides,
            n_sites,
            n_shells,
            shell_ptr,
            neighbors,
        }
    }

    /// Neighbor indices of `site` in coordination shell `shell`.
    #[inline]
    pub fn shell_neighbors(&self, site: usize, shell: usize) -> &[u32] {
        let per_site = self.shell_ptr[self.n_shells];
        let base = site * per_site;
        &self.neighbors[base + self.shell_ptr[shell]..base + self.shell_ptr[shell + 1]]
    }

    /// Flat index of the site at `coords`.
    #[inline]
    pub fn site_of(&self, coords: [usize; 4]) -> usize {
        coords
            .iter()
            .zip(self.strides.iter())
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Lattice coordinates of the site at `flat` index.
    #[inline]
    pub fn coords_of(&self, flat: usize) -> [usize; 4] {
        [
            (flat / self.strides[0]) % self.shape[0],
            (flat / self.strides[1]) % self.shape[1],
            (flat / self.strides[2]) % self.shape[2],
            (flat / self.strides[3]) % self.shape[3],
        ]
    }
}
