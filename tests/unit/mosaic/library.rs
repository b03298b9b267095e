use super::*;
use crate::assets::decode::save_png;

fn solid(bgr: [u8; 3]) -> PixelBuffer {
    PixelBuffer::filled(8, 8, bgr).unwrap()
}

#[test]
fn zero_tile_size_is_rejected() {
    assert!(TileLibrary::new("tiles", 0).is_err());
}

#[test]
fn missing_directory_falls_back_to_palette() {
    let lib = TileLibrary::new("target/unit_tiles_definitely_missing", 4).unwrap();
    assert!(lib.is_fallback().unwrap());
    assert_eq!(lib.len().unwrap(), FALLBACK_PALETTE.len());
    for tile in lib.tiles().unwrap() {
        assert_eq!(tile.image.dimensions(), (4, 4));
    }

    let red = lib.find_closest(Bgr::new(10.0, 5.0, 240.0)).unwrap();
    assert_eq!(red.name, "fallback-red");
    assert_eq!(red.image.pixel(0, 0), [0, 0, 255]);

    let gray = lib.find_closest(Bgr::new(120.0, 130.0, 125.0)).unwrap();
    assert_eq!(gray.name, "fallback-gray");
}

#[test]
fn images_are_resized_and_indexed_by_mean_color() {
    let mut half = PixelBuffer::filled(8, 8, [0, 0, 0]).unwrap();
    for y in 0..8 {
        for x in 4..8 {
            half.set_pixel(x, y, [200, 100, 50]);
        }
    }
    let lib = TileLibrary::from_tiles(vec![("half".into(), half)], 2).unwrap();
    let tiles = lib.tiles().unwrap();
    assert!(!lib.is_fallback().unwrap());
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].image.dimensions(), (2, 2));
    assert_eq!(tiles[0].average_color, Bgr::new(100.0, 50.0, 25.0));
}

#[test]
fn find_closest_breaks_ties_by_load_order() {
    let lib = TileLibrary::from_tiles(
        vec![
            ("first".into(), solid([100, 100, 100])),
            ("second".into(), solid([100, 100, 100])),
            ("dark".into(), solid([0, 0, 0])),
        ],
        4,
    )
    .unwrap();
    assert_eq!(lib.find_closest(Bgr::new(90.0, 90.0, 90.0)).unwrap().name, "first");
    assert_eq!(lib.find_closest(Bgr::new(5.0, 0.0, 0.0)).unwrap().name, "dark");
}

#[test]
fn directory_tiles_load_in_file_name_order_and_skip_garbage() {
    let dir = std::path::PathBuf::from("target").join("unit_tile_library");
    let _ = std::fs::remove_dir_all(&dir);
    save_png(&solid([0, 0, 200]), &dir.join("b_red.png")).unwrap();
    save_png(&solid([200, 0, 0]), &dir.join("a_blue.png")).unwrap();
    std::fs::write(dir.join("c_broken.png"), b"not a png").unwrap();
    std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

    let lib = TileLibrary::new(&dir, 4).unwrap();
    let names: Vec<&str> = lib.tiles().unwrap().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a_blue.png", "b_red.png"]);
    assert!(!lib.is_fallback().unwrap());
}

#[test]
fn load_happens_once_across_threads() {
    let lib = std::sync::Arc::new(
        TileLibrary::from_tiles(vec![("only".into(), solid([1, 2, 3]))], 4).unwrap(),
    );
    let ptrs: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lib = lib.clone();
                s.spawn(move || lib.tiles().unwrap().as_ptr() as usize)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(ptrs.windows(2).all(|w| w[0] == w[1]));
}
