//! Same-type patch counting on a toroidal grid.
//!
//! Each type is labelled with a planar 8-connected raster pass, after which labels
//! touching opposite seams are merged in a disjoint-set forest. Merging through the
//! forest is order-independent, so corner cells that sit on both seams resolve to a
//! single representative whichever seam is processed first.

use crate::config::SeamStitching;
use crate::metrics::PatchCounts;
use crate::snapshot::GridSnapshot;

const BACKGROUND: u32 = 0;

/// Union-find over component labels. Label 0 is the background and never merged.
#[derive(Clone, Debug)]
struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn with_background() -> Self {
        Self {
            parent: vec![BACKGROUND],
            rank: vec![0],
        }
    }

    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        self.rank.push(0);
        label
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        debug_assert!(a != BACKGROUND && b != BACKGROUND);
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra as usize].cmp(&self.rank[rb as usize]) {
            std::cmp::Ordering::Less => self.parent[ra as usize] = rb,
            std::cmp::Ordering::Greater => self.parent[rb as usize] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb as usize] = ra;
                self.rank[ra as usize] += 1;
            }
        }
    }

    fn labels(&self) -> usize {
        self.parent.len() - 1
    }
}

/// Component id per cell, `0` for background. Ids are compact: `1..=components`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    pub height: usize,
    pub width: usize,
    pub labels: Vec<u32>,
    pub components: usize,
}

impl LabelMap {
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.labels[row * self.width + col]
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PatchAnalyzer {
    stitching: SeamStitching,
}

impl PatchAnalyzer {
    pub fn new(stitching: SeamStitching) -> Self {
        Self { stitching }
    }

    /// Count connected same-type patches for every type code `1..=max_code`.
    ///
    /// A grid without agents yields no patches.
    pub fn count(&self, snapshot: &GridSnapshot) -> PatchCounts {
        let types = snapshot.max_code();
        let mut mask = vec![false; snapshot.cells().len()];
        let per_type = (1..=types)
            .map(|code| {
                for (m, &c) in mask.iter_mut().zip(snapshot.cells()) {
                    *m = c == code;
                }
                let (_, mut forest) =
                    self.label_provisional(&mask, snapshot.height(), snapshot.width());
                count_roots(&mut forest)
            })
            .collect();
        PatchCounts { per_type }
    }

    /// Total patch count across all types.
    pub fn count_total(&self, snapshot: &GridSnapshot) -> usize {
        self.count(snapshot).total()
    }

    /// Label the connected components of a binary mask on the torus.
    pub fn label_mask(&self, mask: &[bool], height: usize, width: usize) -> LabelMap {
        assert_eq!(mask.len(), height * width, "mask size must match dimensions");
        let (provisional, mut forest) = self.label_provisional(mask, height, width);
        let mut compact = vec![BACKGROUND; forest.labels() + 1];
        let mut components = 0usize;
        let labels = provisional
            .iter()
            .map(|&label| {
                if label == BACKGROUND {
                    return BACKGROUND;
                }
                let root = forest.find(label) as usize;
                if compact[root] == BACKGROUND {
                    components += 1;
                    compact[root] = components as u32;
                }
                compact[root]
            })
            .collect();
        LabelMap {
            height,
            width,
            labels,
            components,
        }
    }

    fn label_provisional(
        &self,
        mask: &[bool],
        height: usize,
        width: usize,
    ) -> (Vec<u32>, DisjointSet) {
        let (labels, mut forest) = label_planar(mask, height, width);
        match self.stitching {
            SeamStitching::RowAligned => stitch_aligned(&labels, &mut forest, height, width),
            SeamStitching::Moore => stitch_moore(&labels, &mut forest, height, width),
        }
        (labels, forest)
    }
}

/// Total patch count with the default seam handling.
pub fn count_patches(snapshot: &GridSnapshot) -> usize {
    PatchAnalyzer::default().count_total(snapshot)
}

/// Raster-scan 8-connected labelling that ignores wraparound.
fn label_planar(mask: &[bool], height: usize, width: usize) -> (Vec<u32>, DisjointSet) {
    let mut labels = vec![BACKGROUND; mask.len()];
    let mut forest = DisjointSet::with_background();
    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            if !mask[idx] {
                continue;
            }
            let mut assigned = BACKGROUND;
            for prior in preceding_neighbours(row, col, width) {
                let label = labels[prior];
                if label == BACKGROUND {
                    continue;
                }
                if assigned == BACKGROUND {
                    assigned = label;
                } else {
                    forest.union(assigned, label);
                }
            }
            if assigned == BACKGROUND {
                assigned = forest.make_set();
            }
            labels[idx] = assigned;
        }
    }
    (labels, forest)
}

/// Already-scanned neighbours of a cell: west, north-west, north and north-east.
fn preceding_neighbours(row: usize, col: usize, width: usize) -> impl Iterator<Item = usize> {
    let idx = row * width + col;
    let west = (col > 0).then(|| idx - 1);
    let north_west = (row > 0 && col > 0).then(|| idx - width - 1);
    let north = (row > 0).then(|| idx - width);
    let north_east = (row > 0 && col + 1 < width).then(|| idx - width + 1);
    [west, north_west, north, north_east].into_iter().flatten()
}

fn merge_if_labelled(labels: &[u32], forest: &mut DisjointSet, a: usize, b: usize) {
    let (la, lb) = (labels[a], labels[b]);
    if la != BACKGROUND && lb != BACKGROUND {
        forest.union(la, lb);
    }
}

/// Merge the first and last cell of every row, then of every column.
fn stitch_aligned(labels: &[u32], forest: &mut DisjointSet, height: usize, width: usize) {
    for row in 0..height {
        merge_if_labelled(labels, forest, row * width, row * width + width - 1);
    }
    let last_row = (height - 1) * width;
    for col in 0..width {
        merge_if_labelled(labels, forest, col, last_row + col);
    }
}

/// Merge every pair of cells that touch across a seam, diagonals included.
fn stitch_moore(labels: &[u32], forest: &mut DisjointSet, height: usize, width: usize) {
    for row in 0..height {
        let last = row * width + width - 1;
        for d_row in -1..=1isize {
            let other = (row as isize + d_row).rem_euclid(height as isize) as usize;
            merge_if_labelled(labels, forest, last, other * width);
        }
    }
    let last_row = (height - 1) * width;
    for col in 0..width {
        for d_col in -1..=1isize {
            let other = (col as isize + d_col).rem_euclid(width as isize) as usize;
            merge_if_labelled(labels, forest, last_row + col, other);
        }
    }
}

fn count_roots(forest: &mut DisjointSet) -> usize {
    (1..=forest.labels() as u32)
        .filter(|&label| forest.find(label) == label)
        .count()
}
