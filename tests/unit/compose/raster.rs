use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let data: Vec<u8> = (0..w * h).flat_map(|_| rgba).collect();
    encode_png(data, w, h).unwrap()
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let bytes = png_bytes(1, 1, [100, 50, 200, 128]);
    let decoded = decode_image(&bytes).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.pixmap.data(),
        &[PremulRgba8 {
            r: ((100u16 * 128 + 127) / 255) as u8,
            g: ((50u16 * 128 + 127) / 255) as u8,
            b: ((200u16 * 128 + 127) / 255) as u8,
            a: 128,
        }]
    );
    assert!(decoded.pixmap.may_have_opacities());
}

#[test]
fn opaque_source_is_flagged_opaque() {
    let decoded = decode_image(&png_bytes(3, 2, [9, 8, 7, 255])).unwrap();
    assert_eq!((decoded.pixmap.width(), decoded.pixmap.height()), (3, 2));
    assert!(!decoded.pixmap.may_have_opacities());
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn pixmap_png_writes_straight_alpha() {
    let pixels = vec![
        PremulRgba8 {
            r: 10,
            g: 20,
            b: 30,
            a: 255,
        },
        PremulRgba8 {
            r: 50,
            g: 0,
            b: 0,
            a: 128,
        },
    ];
    let png = pixmap_png(Pixmap::from_parts(pixels, 2, 1)).unwrap();

    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    let [r, g, b, a] = img.get_pixel(1, 0).0;
    assert!(r.abs_diff(100) <= 1, "r = {r}");
    assert_eq!((g, b, a), (0, 0, 128));
}

#[test]
fn encode_png_rejects_short_buffer() {
    assert!(encode_png(vec![0u8; 3], 1, 1).is_err());
}
