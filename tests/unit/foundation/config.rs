use super::*;

#[test]
fn defaults_match_reference_layout() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.frame.canvas, Canvas::HD_720);
    assert_eq!(cfg.frame.font_size_px, 45.0);
    assert!((cfg.frame.line_height_px() - 54.0).abs() < 1e-4);
    assert!((cfg.frame.max_text_width_px() - 1024.0).abs() < 1e-3);
    assert_eq!(cfg.encode.fade_sec, 0.5);
    assert_eq!(cfg.retry.max_attempts, 1);
    assert_eq!(cfg.workspace_root, PathBuf::from(DEFAULT_WORKSPACE_ROOT));
    cfg.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let json = r#"{ "workspace_root": "gen", "openai": { "voice": "nova" } }"#;
    let cfg = PipelineConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.workspace_root, PathBuf::from("gen"));
    assert_eq!(cfg.openai.voice, "nova");
    assert_eq!(cfg.openai.speech_model, "tts-1");
    assert_eq!(cfg.frame.canvas.width, 1280);
}

#[test]
fn unknown_fields_are_rejected() {
    let json = r#"{ "frame": { "font_sise_px": 30 } }"#;
    let err = PipelineConfig::from_reader(json.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), "malformed_input");
}

#[test]
fn odd_canvas_is_rejected() {
    let mut cfg = PipelineConfig::default();
    cfg.frame.canvas.width = 1279;
    assert!(cfg.validate().is_err());
}

#[test]
fn zero_attempts_is_rejected() {
    let mut cfg = PipelineConfig::default();
    cfg.retry.max_attempts = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn text_width_ratio_bounds() {
    let mut cfg = PipelineConfig::default();
    cfg.frame.max_text_width_ratio = 0.0;
    assert!(cfg.validate().is_err());
    cfg.frame.max_text_width_ratio = 1.0;
    cfg.validate().unwrap();
}

#[test]
fn translucent_background_is_rejected() {
    let mut cfg = PipelineConfig::default();
    cfg.frame.background = Rgba8([0, 0, 0, 200]);
    let err = cfg.validate().unwrap_err();
    assert_eq!(err.kind(), "malformed_input");
}
