use super::*;

fn block(x: u32, y: u32, color: Bgr) -> Block {
    Block {
        rect: Rect::new(x, y, 2, 2),
        color,
    }
}

#[test]
fn four_by_four_with_size_two_gives_four_blocks() {
    let img = PixelBuffer::filled(4, 4, [0, 0, 255]).unwrap();
    let blocks = partition_blocks(&img, 2);
    assert_eq!(blocks.len(), 4);
    let origins: Vec<(u32, u32)> = blocks.iter().map(|b| (b.rect.x, b.rect.y)).collect();
    assert_eq!(origins, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
    assert!(blocks.iter().all(|b| b.color == Bgr::new(0.0, 0.0, 255.0)));
}

#[test]
fn edge_blocks_are_clamped_and_averaged() {
    let mut img = PixelBuffer::new(3, 1).unwrap();
    img.set_pixel(2, 0, [90, 60, 30]);
    let blocks = partition_blocks(&img, 2);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].rect, Rect::new(2, 0, 1, 1));
    assert_eq!(blocks[1].color, Bgr::new(90.0, 60.0, 30.0));
}

#[test]
fn closest_index_prefers_first_on_ties() {
    let q = Bgr::new(10.0, 10.0, 10.0);
    let cands = [
        Bgr::new(0.0, 10.0, 10.0),
        Bgr::new(20.0, 10.0, 10.0),
        Bgr::new(12.0, 10.0, 10.0),
        Bgr::new(8.0, 10.0, 10.0),
    ];
    assert_eq!(closest_index(q, cands), Some(2));
    assert_eq!(closest_index(q, cands[..2].iter().copied()), Some(0));
    assert_eq!(closest_index(q, std::iter::empty()), None);
}

#[test]
fn equal_distances_pair_in_raster_claim_order() {
    let red = Bgr::new(0.0, 0.0, 255.0);
    let blue = Bgr::new(255.0, 0.0, 0.0);
    let src = partition_blocks(&PixelBuffer::filled(4, 4, [0, 0, 255]).unwrap(), 2);
    let dst = partition_blocks(&PixelBuffer::filled(4, 4, [255, 0, 0]).unwrap(), 2);
    assert!(src.iter().all(|b| b.color == red));
    assert!(dst.iter().all(|b| b.color == blue));

    let pairs = greedy_pairs(&src, &dst);
    assert_eq!(pairs.len(), 4);
    for (s, t) in &pairs {
        assert_eq!(s.rect, t.rect, "each source claims the first remaining target");
    }
}

#[test]
fn greedy_pairing_is_order_dependent_not_optimal() {
    let a = Bgr::new(0.0, 0.0, 0.0);
    let b = Bgr::new(10.0, 0.0, 0.0);
    let c = Bgr::new(11.0, 0.0, 0.0);
    // Source 0 grabs the 10-block although source 1 needs it more.
    let sources = [block(0, 0, b), block(2, 0, c)];
    let targets = [block(0, 2, b), block(2, 2, a)];
    let pairs = greedy_pairs(&sources, &targets);
    assert_eq!(pairs[0].1.rect, targets[0].rect);
    assert_eq!(pairs[1].1.rect, targets[1].rect);

    let reversed = [sources[1], sources[0]];
    let pairs = greedy_pairs(&reversed, &targets);
    assert_eq!(pairs[0].0.color, c);
    assert_eq!(pairs[0].1.rect, targets[0].rect);
}

#[test]
fn pairs_stop_when_targets_run_out() {
    let x = Bgr::new(1.0, 2.0, 3.0);
    let pairs = greedy_pairs(&[block(0, 0, x), block(2, 0, x)], &[block(0, 0, x)]);
    assert_eq!(pairs.len(), 1);
}
