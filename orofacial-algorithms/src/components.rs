//! Connected-component cleanup for segmentation masks.
//!
//! Uses a union-find over foreground pixels with 4-connectivity, so
//! diagonally touching blobs count as separate components.

use orofacial_core::{Mask, PointSet};

/// Union-Find data structure for connected component detection.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let px = self.find(x);
        let py = self.find(y);

        if px == py {
            return;
        }

        match self.rank[px].cmp(&self.rank[py]) {
            std::cmp::Ordering::Less => self.parent[px] = py,
            std::cmp::Ordering::Greater => self.parent[py] = px,
            std::cmp::Ordering::Equal => {
                self.parent[py] = px;
                self.rank[px] += 1;
            }
        }
    }
}

/// Splits the foreground into 4-connected components.
///
/// Components are ordered by their first pixel in row-major scan order, and
/// each component lists its pixels in scan order.
#[must_use]
pub fn connected_components(mask: &Mask) -> Vec<PointSet> {
    let pixels = mask.pixels();
    if pixels.is_empty() {
        return Vec::new();
    }

    let width = mask.width() as usize;
    let mut slot: Vec<Option<usize>> = vec![None; mask.as_slice().len()];
    let mut uf = UnionFind::new(pixels.len());

    for (i, pixel) in pixels.iter().enumerate() {
        let cell = pixel.y as usize * width + pixel.x as usize;
        slot[cell] = Some(i);
        // Left and upper neighbours were visited earlier in the scan.
        if pixel.x > 0 {
            if let Some(left) = slot[cell - 1] {
                uf.union(i, left);
            }
        }
        if pixel.y > 0 {
            if let Some(up) = slot[cell - width] {
                uf.union(i, up);
            }
        }
    }

    let mut component_of_root: Vec<Option<usize>> = vec![None; pixels.len()];
    let mut components: Vec<PointSet> = Vec::new();
    for (i, pixel) in pixels.iter().enumerate() {
        let root = uf.find(i);
        let index = *component_of_root[root].get_or_insert_with(|| {
            components.push(PointSet::default());
            components.len() - 1
        });
        components[index].push(pixel);
    }
    components
}

/// Number of 4-connected foreground components.
#[must_use]
pub fn component_count(mask: &Mask) -> usize {
    connected_components(mask).len()
}

/// Keeps only the largest 4-connected foreground component.
///
/// Ties go to the component that appears first in scan order. A blank mask
/// is returned unchanged.
#[must_use]
pub fn keep_largest_component(mask: &Mask) -> Mask {
    let components = connected_components(mask);
    let Some(largest) = components
        .iter()
        .reduce(|best, candidate| if candidate.len() > best.len() { candidate } else { best })
    else {
        return mask.clone();
    };

    log::debug!(
        "keeping largest of {} components ({} of {} pixels)",
        components.len(),
        largest.len(),
        mask.foreground_count()
    );

    let width = mask.width() as usize;
    let mut keep = vec![false; mask.as_slice().len()];
    for pixel in largest.iter() {
        keep[pixel.y as usize * width + pixel.x as usize] = true;
    }
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        keep[y as usize * width + x as usize]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orofacial_core::Pixel;

    fn parse(rows: &[&str]) -> Mask {
        let rows: Vec<Vec<bool>> = rows
            .iter()
            .map(|row| row.chars().map(|c| c == '#').collect())
            .collect();
        Mask::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_union_find() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(1, 2);

        assert_eq!(uf.find(0), uf.find(3));
        assert_ne!(uf.find(0), uf.find(4));
    }

    #[test]
    fn test_components_four_connectivity() {
        let mask = parse(&[
            "##..#", //
            "#...#",
            ".#..#",
            ".....",
        ]);
        let components = connected_components(&mask);
        // The diagonal pixel at (1, 2) is its own component.
        assert_eq!(components.len(), 3);
        assert_eq!(components[0].len(), 3);
        assert_eq!(components[1].len(), 3);
        assert_eq!(components[2].iter().collect::<Vec<_>>(), vec![Pixel::new(1, 2)]);
    }

    #[test]
    fn test_u_shape_merges() {
        // The two arms only meet at the bottom row, after both were seen.
        let mask = parse(&[
            "#..#", //
            "#..#",
            "####",
        ]);
        assert_eq!(component_count(&mask), 1);
    }

    #[test]
    fn test_keep_largest_component() {
        let mask = parse(&[
            "##....", //
            "##..##",
            "....##",
            "....##",
        ]);
        let cleaned = keep_largest_component(&mask);
        assert_eq!(cleaned.foreground_count(), 6);
        assert!(!cleaned.is_foreground(0, 0));
        assert!(cleaned.is_foreground(5, 3));
    }

    #[test]
    fn test_keep_largest_matches_component_pixels() {
        let mask = parse(&[
            "#..###", //
            "...#.#",
            "##.###",
        ]);
        let cleaned = keep_largest_component(&mask);
        assert_eq!(cleaned.width(), mask.width());
        assert_eq!(cleaned.height(), mask.height());
        assert_eq!(cleaned.pixels(), connected_components(&mask)[1]);
        assert_eq!(cleaned.foreground_count(), 8);
    }

    #[test]
    fn test_keep_largest_tie_prefers_first() {
        let mask = parse(&[
            "#.#", //
        ]);
        let cleaned = keep_largest_component(&mask);
        assert!(cleaned.is_foreground(0, 0));
        assert!(!cleaned.is_foreground(2, 0));
    }

    #[test]
    fn test_blank_mask_unchanged() {
        let mask = Mask::new(4, 3);
        assert_eq!(keep_largest_component(&mask), mask);
        assert_eq!(component_count(&mask), 0);
    }
}
