//! Block partitioning and nearest-color matching shared by the mosaic and morph engines.

use crate::foundation::{
    core::{Bgr, PixelBuffer, Rect},
    math::{average_color, block_grid},
};

/// A rectangular region of an image together with its mean color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub rect: Rect,
    pub color: Bgr,
}

/// Split `image` into `block_size` squares in raster order, clamping the last column and row.
pub fn partition_blocks(image: &PixelBuffer, block_size: u32) -> Vec<Block> {
    block_grid(image.width(), image.height(), block_size)
        .map(|rect| Block {
            rect,
            color: average_color(image, rect),
        })
        .collect()
}

/// Index of the candidate closest to `query` by squared B,G,R distance.
///
/// Only a strictly smaller distance replaces the current best, so ties go to the earliest
/// candidate. `None` for an empty iterator.
pub fn closest_index<I>(query: Bgr, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = Bgr>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.into_iter().enumerate() {
        let d = query.distance_sq(c);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Greedily pair every source block with the nearest still-unclaimed target block.
///
/// Sources are visited in the given order and each claim removes its target from the pool
/// (order-preserving), so the result depends on source order and is not a globally optimal
/// assignment. Pairs stop when either side runs out.
pub fn greedy_pairs(sources: &[Block], targets: &[Block]) -> Vec<(Block, Block)> {
    let mut available: Vec<Block> = targets.to_vec();
    let mut pairs = Vec::with_capacity(sources.len().min(targets.len()));
    for src in sources {
        let Some(i) = closest_index(src.color, available.iter().map(|b| b.color)) else {
            break;
        };
        pairs.push((*src, available.remove(i)));
    }
    pairs
}

#[cfg(test)]
#[path = "../tests/unit/blocks.rs"]
mod tests;
