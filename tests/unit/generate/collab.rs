use super::*;

#[test]
fn image_size_round_trips_through_its_wire_name() {
    for size in [
        ImageSize::Square256,
        ImageSize::Square512,
        ImageSize::Square1024,
        ImageSize::Landscape1792,
        ImageSize::Portrait1792,
    ] {
        assert_eq!(size.as_str().parse::<ImageSize>().unwrap(), size);
        let json = serde_json::to_string(&size).unwrap();
        assert_eq!(json, format!("\"{}\"", size.as_str()));
    }
    assert_eq!(ImageSize::default(), ImageSize::Square1024);
}

#[test]
fn unknown_image_size_is_rejected() {
    assert_eq!("800x600".parse::<ImageSize>().unwrap_err().kind(), "malformed_input");
    assert!(serde_json::from_str::<ImageSize>("\"800x600\"").is_err());
}

#[test]
fn inline_reference_decodes_base64() {
    let r = ImageReference::Base64("aGVsbG8=".to_owned());
    assert_eq!(r.decode_inline().unwrap().unwrap(), b"hello");

    let bad = ImageReference::Base64("%%%".to_owned());
    assert_eq!(bad.decode_inline().unwrap().unwrap_err().kind(), "generation");

    assert!(ImageReference::Url("https://x/y.png".to_owned()).decode_inline().is_none());
}
