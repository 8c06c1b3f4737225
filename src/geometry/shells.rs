use std::collections::BTreeMap;

/// Displacement vectors of the first `n_shells` coordination shells of a
/// 4-D hypercubic lattice, grouped by squared distance (ascending).
///
/// Shell 0 is the nearest-neighbor shell (|d|^2 = 1, 8 vectors), shell 1 the
/// next (|d|^2 = 2), and so on.
pub fn shell_offsets(n_shells: usize) -> Vec<Vec<[isize; 4]>> {
    let mut radius = 1isize;
    loop {
        let mut classes: BTreeMap<isize, Vec<[isize; 4]>> = BTreeMap::new();
        for a in -radius..=radius {
            for b in -radius..=radius {
                for c in -radius..=radius {
                    for d in -radius..=radius {
                        let d2 = a * a + b * b + c * c + d * d;
                        if d2 == 0 || d2 > radius * radius {
                            continue;
                        }
                        classes.entry(d2).or_default().push([a, b, c, d]);
                    }
                }
            }
        }
        // every class with |d|^2 <= radius^2 is complete within the cube
        if classes.len() >= n_shells {
            return classes.into_values().take(n_shells).collect();
        }
        radius += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_shell_is_unit_steps() {
        let shells = shell_offsets(1);
        assert_eq!(shells.len(), 1);
        // +-1 along each of the 4 axes
        assert_eq!(shells[0].len(), 8);
        for off in &shells[0] {
            assert_eq!(off.iter().map(|x| x * x).sum::<isize>(), 1);
        }
    }

    #[test]
    fn test_shells_ordered_by_distance() {
        let shells = shell_offsets(4);
        let d2 = |s: &Vec<[isize; 4]>| s[0].iter().map(|x| x * x).sum::<isize>();
        for pair in shells.windows(2) {
            assert!(d2(&pair[0]) < d2(&pair[1]));
        }
        for shell in &shells {
            let first = d2(shell);
            for off in shell {
                assert_eq!(off.iter().map(|x| x * x).sum::<isize>(), first);
            }
        }
    }
}
