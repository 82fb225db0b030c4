use super::*;
use crate::encode::engine::FadeSpec;

#[test]
fn probe_duration_parses_format_section() {
    let json = br#"{"format":{"filename":"1.mp3","duration":"4.224000"}}"#;
    assert_eq!(parse_probe_duration(json).unwrap(), 4.224);
}

#[test]
fn probe_duration_rejects_missing_and_invalid_values() {
    for json in [
        br#"{}"#.as_slice(),
        br#"{"format":{}}"#.as_slice(),
        br#"{"format":{"duration":"N/A"}}"#.as_slice(),
        br#"{"format":{"duration":"0.000000"}}"#.as_slice(),
        br#"{"format":{"duration":"-1.5"}}"#.as_slice(),
        br#"{"format":{"duration":"inf"}}"#.as_slice(),
        b"not json".as_slice(),
    ] {
        let err = parse_probe_duration(json).unwrap_err();
        assert_eq!(err.kind(), "probe", "{}", String::from_utf8_lossy(json));
    }
}

#[test]
fn still_clip_args_follow_encoding_contract() {
    let engine = FfmpegEngine::new(EncodeConfig::default());
    let req = StillClipRequest {
        image: "frames/2.png".into(),
        audio: "audio/2.mp3".into(),
        output: "output/segment_2.mp4".into(),
        fade: FadeSpec::for_clip(3.0, 0.5),
        duration_sec: 3.0,
    };
    let args = engine.still_clip_args(&req);

    let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
    assert_eq!(args[pos("-loop") + 1], "1");
    assert_eq!(args[pos("-tune") + 1], "stillimage");
    assert_eq!(args[pos("-c:v") + 1], "libx264");
    assert_eq!(args[pos("-c:a") + 1], "aac");
    assert_eq!(args[pos("-b:a") + 1], "192k");
    assert_eq!(args[pos("-pix_fmt") + 1], "yuv420p");
    assert_eq!(args[pos("-t") + 1], "3.000000");
    assert_eq!(args[pos("-filter_complex") + 1], req.fade.filter_graph());
    assert_eq!(args.last().unwrap(), "output/segment_2.mp4");

    let inputs: Vec<&String> = args
        .iter()
        .enumerate()
        .filter(|(i, _)| *i > 0 && args[i - 1] == "-i")
        .map(|(_, a)| a)
        .collect();
    assert_eq!(inputs, ["frames/2.png", "audio/2.mp3"]);
}

#[test]
fn missing_binary_maps_to_stage_errors() {
    let engine = FfmpegEngine::new(EncodeConfig {
        ffmpeg_bin: "storyreel-no-such-ffmpeg".into(),
        ffprobe_bin: "storyreel-no-such-ffprobe".into(),
        ..EncodeConfig::default()
    });
    assert!(!engine.is_available());

    let err = engine.probe_duration(Path::new("a.mp3")).unwrap_err();
    assert_eq!(err.kind(), "probe");

    let req = StillClipRequest {
        image: "a.png".into(),
        audio: "a.mp3".into(),
        output: "a.mp4".into(),
        fade: FadeSpec::for_clip(1.0, 0.5),
        duration_sec: 1.0,
    };
    assert_eq!(engine.render_still_clip(&req).unwrap_err().kind(), "encode");

    let err = engine
        .concat(Path::new("input.txt"), Path::new("output.mp4"))
        .unwrap_err();
    assert_eq!(err.kind(), "assembly");
}

#[cfg(unix)]
#[test]
fn watchdog_kills_overrunning_tool() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let started = Instant::now();
    let err = match run_tool(cmd, Some(Duration::from_millis(100))) {
        Ok(_) => panic!("expected timeout"),
        Err(e) => e,
    };
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[cfg(unix)]
#[test]
fn run_tool_captures_both_streams() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "printf out; printf err >&2; exit 3"]);
    let out = run_tool(cmd, Some(Duration::from_secs(10))).unwrap();
    assert_eq!(out.stdout, b"out");
    assert_eq!(out.stderr_text(), "err");
    assert_eq!(out.status.code(), Some(3));
}
