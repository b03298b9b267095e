use super::*;
use crate::background::segmap::SegmapMode;

fn cfg() -> VibeConfig {
    VibeConfig::default()
}

fn noisy(w: u32, h: u32, seed: u64) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut f = PixelBuffer::new(w, h).unwrap();
    for y in 0..h {
        for x in 0..w {
            let base = if (w / 3..2 * w / 3).contains(&x) { 200 } else { 40 };
            let jitter: u8 = rng.random_range(0..12);
            f.set_pixel(x, y, [base + jitter, base, base - jitter]);
        }
    }
    f
}

fn bank(model: &BackgroundModel) -> &SampleBank {
    &model.state.as_ref().unwrap().bank
}

#[test]
fn initialize_fills_every_slot_with_seed_frame() {
    let frame = noisy(7, 5, 1);
    let mut model = BackgroundModel::with_seed(
        VibeConfig {
            sample_count: 5,
            ..cfg()
        },
        3,
    )
    .unwrap();
    model.initialize(&frame).unwrap();

    let b = bank(&model);
    for y in 0..5 {
        for x in 0..7 {
            for slot in 0..5 {
                assert_eq!(b.sample(x, y, slot), frame.pixel(x, y));
            }
        }
    }
}

#[test]
fn classify_before_initialize_is_a_precondition_error() {
    let mut model = BackgroundModel::with_seed(cfg(), 0).unwrap();
    let err = model.classify(&noisy(4, 4, 0), 0).unwrap_err();
    assert!(matches!(err, FxError::Precondition(_)));
}

#[test]
fn classify_rejects_other_resolutions() {
    let mut model = BackgroundModel::with_seed(cfg(), 0).unwrap();
    model.initialize(&noisy(4, 4, 0)).unwrap();
    let err = model.classify(&noisy(5, 4, 0), 1).unwrap_err();
    assert!(matches!(
        err,
        FxError::DimensionMismatch {
            expected: (4, 4),
            actual: (5, 4)
        }
    ));
}

#[test]
fn reinitialize_at_new_resolution_reallocates() {
    let mut model = BackgroundModel::with_seed(cfg(), 0).unwrap();
    model.initialize(&noisy(4, 4, 0)).unwrap();
    model.initialize(&noisy(6, 2, 0)).unwrap();
    assert_eq!(model.dimensions(), Some((6, 2)));
    model.classify(&noisy(6, 2, 1), 1).unwrap();
}

#[test]
fn single_sample_threshold_scenario() {
    let config = VibeConfig {
        sample_count: 1,
        required_matches: 1,
        color_distance_threshold: 10,
        ..cfg()
    };
    let seed = PixelBuffer::filled(1, 1, [10, 10, 10]).unwrap();

    let mut model = BackgroundModel::with_seed(config.clone(), 9).unwrap();
    model.initialize(&seed).unwrap();
    let out = model
        .classify(&PixelBuffer::filled(1, 1, [15, 15, 15]).unwrap(), 1)
        .unwrap();
    assert_eq!(out.pixel(0, 0), [0, 0, 0], "within R is background");

    let mut model = BackgroundModel::with_seed(config, 9).unwrap();
    model.initialize(&seed).unwrap();
    let out = model
        .classify(&PixelBuffer::filled(1, 1, [25, 25, 25]).unwrap(), 1)
        .unwrap();
    assert_eq!(out.pixel(0, 0), [255, 255, 255], "beyond R is foreground");
}

#[test]
fn match_count_decides_class_exhaustively() {
    let config = VibeConfig {
        sample_count: 4,
        required_matches: 2,
        color_distance_threshold: 20,
        ..cfg()
    };
    let probe = PixelBuffer::filled(1, 1, [100, 100, 100]).unwrap();
    for matching in 0..=4usize {
        let mut model = BackgroundModel::with_seed(config.clone(), 1).unwrap();
        model
            .initialize(&PixelBuffer::filled(1, 1, [0, 0, 0]).unwrap())
            .unwrap();
        let state = model.state.as_mut().unwrap();
        for slot in 0..matching {
            state.bank.set_sample(0, 0, slot, [110, 95, 100]);
        }

        let out = model.classify(&probe, 1).unwrap();
        let stats = model.last_stats().unwrap();
        if matching >= 2 {
            assert_eq!(out.pixel(0, 0), [0, 0, 0], "{matching} matches");
            assert_eq!(stats.background_pixels, 1);
        } else {
            assert_eq!(out.pixel(0, 0), [255, 255, 255], "{matching} matches");
            assert_eq!(stats.foreground_pixels, 1);
        }
    }
}

#[test]
fn seeded_runs_are_reproducible_across_pool_sizes() {
    let config = VibeConfig {
        decay_rate: 2,
        ..cfg()
    };
    let frames: Vec<PixelBuffer> = (0..6).map(|i| noisy(16, 9, i)).collect();

    let run = |threads: usize| {
        let mut model = BackgroundModel::with_seed(config.clone(), 42)
            .unwrap()
            .with_pool(WorkerPool::new(Some(threads)).unwrap());
        model.initialize(&frames[0]).unwrap();
        let maps: Vec<PixelBuffer> = frames[1..]
            .iter()
            .enumerate()
            .map(|(i, f)| model.classify(f, i as u64).unwrap())
            .collect();
        (maps, bank(&model).clone())
    };

    let (maps_a, bank_a) = run(1);
    let (maps_b, bank_b) = run(4);
    assert_eq!(maps_a, maps_b);
    assert_eq!(bank_a, bank_b);
}

#[test]
fn decay_rate_one_always_updates() {
    let config = VibeConfig {
        sample_count: 3,
        decay_rate: 1,
        ..cfg()
    };
    let mut model = BackgroundModel::with_seed(config, 5).unwrap();
    model
        .initialize(&PixelBuffer::filled(4, 3, [50, 50, 50]).unwrap())
        .unwrap();
    model
        .classify(&PixelBuffer::filled(4, 3, [55, 55, 55]).unwrap(), 1)
        .unwrap();

    let stats = model.last_stats().unwrap();
    assert_eq!(stats.background_pixels, 12);
    assert_eq!(stats.diffusion_writes, 12);
    let b = bank(&model);
    for y in 0..3 {
        for x in 0..4 {
            assert!((0..3).any(|s| b.sample(x, y, s) == [55, 55, 55]));
        }
    }
}

#[test]
fn diffusion_writes_one_eight_connected_neighbour() {
    let centre = [100, 100, 100];
    let mut seed = PixelBuffer::filled(3, 3, [0, 0, 0]).unwrap();
    seed.set_pixel(1, 1, centre);
    // Only the centre still matches its bank; the ring is foreground and never updates.
    let mut frame = PixelBuffer::filled(3, 3, [200, 200, 200]).unwrap();
    frame.set_pixel(1, 1, centre);

    for rng_seed in 0..32 {
        let mut model = BackgroundModel::with_seed(
            VibeConfig {
                decay_rate: 1,
                ..cfg()
            },
            rng_seed,
        )
        .unwrap();
        model.initialize(&seed).unwrap();
        model.classify(&frame, 1).unwrap();

        let stats = model.last_stats().unwrap();
        assert_eq!(stats.background_pixels, 1);
        assert_eq!(stats.diffusion_writes, 1);

        let b = bank(&model);
        let mut written = 0;
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) == (1, 1) {
                    continue;
                }
                written += (0..20).filter(|&s| b.sample(x, y, s) == centre).count();
            }
        }
        assert_eq!(written, 1, "seed {rng_seed}");
    }
}

#[test]
fn foreground_never_updates_the_bank() {
    let mut model = BackgroundModel::with_seed(
        VibeConfig {
            decay_rate: 1,
            ..cfg()
        },
        5,
    )
    .unwrap();
    let seed = PixelBuffer::filled(3, 3, [0, 0, 0]).unwrap();
    model.initialize(&seed).unwrap();
    let before = bank(&model).clone();
    model
        .classify(&PixelBuffer::filled(3, 3, [200, 200, 200]).unwrap(), 1)
        .unwrap();
    assert_eq!(model.last_stats().unwrap().foreground_pixels, 9);
    assert_eq!(bank(&model), &before);
}

#[test]
fn segmap_modes_paint_as_documented() {
    let seed = PixelBuffer::filled(2, 1, [10, 10, 10]).unwrap();
    let mut frame = PixelBuffer::filled(2, 1, [10, 10, 10]).unwrap();
    frame.set_pixel(1, 0, [200, 100, 50]);

    let paint = |mode: SegmapMode| {
        let mut m = BackgroundModel::with_seed(
            VibeConfig {
                segmap_mode: mode,
                ..cfg()
            },
            0,
        )
        .unwrap();
        m.initialize(&seed).unwrap();
        let out = m.classify(&frame, 1).unwrap();
        (out.pixel(0, 0), out.pixel(1, 0))
    };

    assert_eq!(paint(SegmapMode::OnlySegmap), ([0, 0, 0], [255, 255, 255]));
    assert_eq!(paint(SegmapMode::Foreground), ([0, 0, 0], [200, 100, 50]));
    // (1 + 0) is odd, so the foreground pixel lands on a black checker square.
    assert_eq!(paint(SegmapMode::Background), ([10, 10, 10], [0, 0, 0]));
}

#[test]
fn shaky_camera_reinitializes_on_global_change() {
    let config = VibeConfig {
        shaky_camera: true,
        frame_difference_threshold: 0.5,
        ..cfg()
    };
    let a = PixelBuffer::filled(4, 4, [10, 10, 10]).unwrap();
    let b = PixelBuffer::filled(4, 4, [200, 200, 200]).unwrap();

    let mut model = BackgroundModel::with_seed(config, 11).unwrap();
    model.initialize(&a).unwrap();

    model.classify(&a, 1).unwrap();
    let stats = model.last_stats().unwrap();
    assert_eq!(stats.motion_matches, Some(16));
    assert!(!stats.reinitialized);

    let out = model.classify(&b, 2).unwrap();
    let stats = model.last_stats().unwrap();
    assert_eq!(stats.motion_matches, Some(0));
    assert!(stats.reinitialized);
    assert_eq!(stats.foreground_pixels, 16, "classified before the rebuild");
    assert!(out.data().iter().all(|&v| v == 255));
    assert!((0..20).all(|s| bank(&model).sample(2, 2, s) == [200, 200, 200]));

    let out = model.classify(&b, 3).unwrap();
    assert!(!model.last_stats().unwrap().reinitialized);
    assert!(out.data().iter().all(|&v| v == 0));
}

#[test]
fn frame_zero_with_shaky_camera_rebuilds_from_current_frame() {
    let mut model = BackgroundModel::with_seed(
        VibeConfig {
            shaky_camera: true,
            ..cfg()
        },
        0,
    )
    .unwrap();
    model.initialize(&noisy(4, 4, 0)).unwrap();
    model.classify(&noisy(4, 4, 1), 0).unwrap();
    let stats = model.last_stats().unwrap();
    assert_eq!(stats.motion_matches, Some(0));
    assert!(stats.reinitialized);
}

#[test]
fn reset_requires_initialize_again() {
    let mut model = BackgroundModel::with_seed(cfg(), 0).unwrap();
    model.initialize(&noisy(2, 2, 0)).unwrap();
    model.reset();
    assert!(!model.is_initialized());
    assert!(model.classify(&noisy(2, 2, 0), 1).is_err());
}

#[test]
fn step_stays_inside_bounds() {
    assert_eq!(step(0, -1, 5), 0);
    assert_eq!(step(4, 1, 5), 4);
    assert_eq!(step(2, 1, 5), 3);
    assert_eq!(step(2, -1, 5), 1);
    assert_eq!(step(0, 0, 1), 0);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let err = BackgroundModel::with_seed(
        VibeConfig {
            sample_count: 0,
            ..cfg()
        },
        0,
    )
    .unwrap_err();
    assert!(matches!(err, FxError::Validation(_)));
}
