#![allow(dead_code)]

use std::{
    io::Cursor,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::{Arc, Mutex},
};

use storyreel::{
    Collaborators, FrameComposer, ImageFetcher, ImageGenerator, ImageReference, ImageSize,
    MediaEngine, SpeechSynthesizer, StoryError, StoryResult,
    encode::engine::StillClipRequest,
};

pub fn ffmpeg_tools_available() -> bool {
    storyreel::encode::ffmpeg::is_ffmpeg_on_path()
}

/// Ordered record of every collaborator call.
#[derive(Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    pub fn push(&self, s: impl Into<String>) {
        self.0.lock().unwrap().push(s.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// Returns no image for prompts mentioning `FAIL`.
pub struct FakeImages(pub Arc<CallLog>);

impl ImageGenerator for FakeImages {
    fn generate(&self, prompt: &str, _size: ImageSize) -> StoryResult<Option<ImageReference>> {
        self.0.push(format!("image {prompt}"));
        if prompt.contains("FAIL") {
            return Ok(None);
        }
        Ok(Some(ImageReference::Url("https://images.test/1.png".to_owned())))
    }
}

pub struct FakeFetcher(pub Arc<CallLog>);

impl ImageFetcher for FakeFetcher {
    fn fetch(&self, _reference: &ImageReference) -> StoryResult<Vec<u8>> {
        self.0.push("fetch");
        Ok(b"image-bytes".to_vec())
    }
}

/// Serves pre-built audio in call order, or a placeholder when none was queued.
pub struct FakeSpeech {
    pub log: Arc<CallLog>,
    pub queued: Mutex<Vec<Vec<u8>>>,
}

impl FakeSpeech {
    pub fn new(log: Arc<CallLog>, queued: Vec<Vec<u8>>) -> Self {
        Self {
            log,
            queued: Mutex::new(queued),
        }
    }
}

impl SpeechSynthesizer for FakeSpeech {
    fn synthesize(&self, text: &str, _voice: &str) -> StoryResult<Vec<u8>> {
        self.log.push(format!("speech {text}"));
        let mut queued = self.queued.lock().unwrap();
        if queued.is_empty() {
            Ok(b"mp3".to_vec())
        } else {
            Ok(queued.remove(0))
        }
    }
}

pub fn fake_collaborators(log: &Arc<CallLog>, audio: Vec<Vec<u8>>) -> Collaborators {
    Collaborators {
        images: Arc::new(FakeImages(log.clone())),
        fetcher: Arc::new(FakeFetcher(log.clone())),
        speech: Arc::new(FakeSpeech::new(log.clone(), audio)),
    }
}

/// Writes a solid canvas-sized PNG regardless of input, so no font is needed.
pub struct SolidComposer {
    pub width: u32,
    pub height: u32,
    pub log: Option<Arc<CallLog>>,
}

impl SolidComposer {
    /// Records `compose <caption>` for every frame.
    pub fn logging(log: Arc<CallLog>) -> Self {
        Self {
            log: Some(log),
            ..Self::default()
        }
    }
}

impl Default for SolidComposer {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            log: None,
        }
    }
}

impl FrameComposer for SolidComposer {
    fn compose_frame(&mut self, _image_bytes: &[u8], caption: &str) -> StoryResult<Vec<u8>> {
        if let Some(log) = &self.log {
            log.push(format!("compose {caption}"));
        }
        solid_png(self.width, self.height)
    }
}

pub fn solid_png(width: u32, height: u32) -> StoryResult<Vec<u8>> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([40, 90, 160, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| StoryError::Other(e.into()))?;
    Ok(out.into_inner())
}

/// Media engine that never spawns a process.
pub struct FakeEngine {
    pub log: Arc<CallLog>,
    pub duration_sec: f64,
    pub fail_concat: bool,
}

impl FakeEngine {
    pub fn new(log: Arc<CallLog>, duration_sec: f64) -> Self {
        Self {
            log,
            duration_sec,
            fail_concat: false,
        }
    }
}

impl MediaEngine for FakeEngine {
    fn probe_duration(&self, audio: &Path) -> StoryResult<f64> {
        self.log.push(format!("probe {}", file_name(audio)));
        Ok(self.duration_sec)
    }

    fn render_still_clip(&self, req: &StillClipRequest) -> StoryResult<()> {
        self.log.push(format!("clip {}", file_name(&req.output)));
        std::fs::write(&req.output, b"clip").map_err(|e| StoryError::encode(e.to_string()))
    }

    fn concat(&self, manifest: &Path, output: &Path) -> StoryResult<()> {
        self.log.push("concat");
        if self.fail_concat {
            return Err(StoryError::assembly("simulated concat failure"));
        }
        let listing = std::fs::read(manifest).map_err(|e| StoryError::assembly(e.to_string()))?;
        std::fs::write(output, listing).map_err(|e| StoryError::assembly(e.to_string()))
    }
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sine tone of `seconds`, encoded as mp3 by ffmpeg.
pub fn synth_mp3(dir: &Path, name: &str, seconds: f64) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:sample_rate=44100",
            "-t",
            &format!("{seconds}"),
            "-c:a",
            "libmp3lame",
            "-b:a",
            "128k",
        ])
        .arg(&path)
        .stdout(Stdio::null())
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating {name}");
    Ok(path)
}

/// Container duration as reported by ffprobe.
pub fn probe_seconds(path: &Path) -> anyhow::Result<f64> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()?;
    anyhow::ensure!(out.status.success(), "ffprobe failed for {}", path.display());
    Ok(String::from_utf8_lossy(&out.stdout).trim().parse()?)
}
