use std::io::Cursor;

use super::*;

#[test]
fn decode_frame_png_swaps_to_bgr() {
    let img = image::RgbImage::from_raw(1, 1, vec![100u8, 50u8, 200u8]).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let frame = decode_frame(&buf).unwrap();
    assert_eq!(frame.dimensions(), (1, 1));
    assert_eq!(frame.pixel(0, 0), [200, 50, 100]);
}

#[test]
fn decode_garbage_is_an_error() {
    assert!(decode_frame(b"not an image").is_err());
}

#[test]
fn extension_filter_is_case_insensitive() {
    assert!(has_image_extension(Path::new("a/b.PNG")));
    assert!(has_image_extension(Path::new("tile.tiff")));
    assert!(!has_image_extension(Path::new("notes.txt")));
    assert!(!has_image_extension(Path::new("noext")));
}

#[test]
fn save_then_list_and_load() {
    let dir = PathBuf::from("target").join("unit_decode_roundtrip");
    let _ = std::fs::remove_dir_all(&dir);

    let frame = PixelBuffer::filled(3, 2, [1, 2, 3]).unwrap();
    save_png(&frame, &dir.join("b.png")).unwrap();
    save_png(&frame, &dir.join("a.png")).unwrap();
    std::fs::write(dir.join("readme.txt"), "x").unwrap();

    let files = list_image_files(&dir).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png"]);

    assert_eq!(load_frame(&files[0]).unwrap(), frame);
}
