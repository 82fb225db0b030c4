use std::{
    ffi::OsStr,
    io::Read,
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::{
    encode::engine::{MediaEngine, StillClipRequest, fmt_secs},
    foundation::{
        config::EncodeConfig,
        error::{StoryError, StoryResult},
    },
};

const WATCHDOG_POLL: Duration = Duration::from_millis(20);

/// Returns `true` when `bin -version` runs and exits successfully.
pub fn is_tool_on_path(bin: impl AsRef<OsStr>) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Shorthand for the default `ffmpeg` and `ffprobe` binaries both being usable.
pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path("ffmpeg") && is_tool_on_path("ffprobe")
}

/// [`MediaEngine`] backed by the system `ffmpeg`/`ffprobe` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegEngine {
    cfg: EncodeConfig,
}

impl FfmpegEngine {
    pub fn new(cfg: EncodeConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EncodeConfig {
        &self.cfg
    }

    /// Both configured binaries respond to `-version`.
    pub fn is_available(&self) -> bool {
        is_tool_on_path(&self.cfg.ffmpeg_bin) && is_tool_on_path(&self.cfg.ffprobe_bin)
    }

    fn timeout(&self) -> Option<Duration> {
        self.cfg.timeout_sec.map(Duration::from_secs)
    }

    /// Arguments for one still-image clip, output path last.
    pub fn still_clip_args(&self, req: &StillClipRequest) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-loglevel", "error", "-loop", "1", "-i"]
            .into_iter()
            .map(String::from)
            .collect();
        args.push(req.image.display().to_string());
        args.push("-i".to_owned());
        args.push(req.audio.display().to_string());
        args.extend([
            "-filter_complex".to_owned(),
            req.fade.filter_graph(),
            "-map".to_owned(),
            "[v]".to_owned(),
            "-map".to_owned(),
            "[a]".to_owned(),
            "-c:v".to_owned(),
            self.cfg.video_codec.clone(),
            "-tune".to_owned(),
            "stillimage".to_owned(),
            "-c:a".to_owned(),
            self.cfg.audio_codec.clone(),
            "-b:a".to_owned(),
            self.cfg.audio_bitrate.clone(),
            "-pix_fmt".to_owned(),
            "yuv420p".to_owned(),
            "-t".to_owned(),
            fmt_secs(req.duration_sec),
        ]);
        args.push(req.output.display().to_string());
        args
    }
}

impl MediaEngine for FfmpegEngine {
    #[tracing::instrument(level = "debug", skip(self, audio), fields(audio = %audio.display()))]
    fn probe_duration(&self, audio: &Path) -> StoryResult<f64> {
        let mut cmd = Command::new(&self.cfg.ffprobe_bin);
        cmd.args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(audio);

        let out = run_tool(cmd, self.timeout()).map_err(|e| {
            StoryError::probe(format!(
                "failed to run {} on '{}': {e}",
                self.cfg.ffprobe_bin.display(),
                audio.display()
            ))
        })?;
        if !out.status.success() {
            return Err(StoryError::probe(format!(
                "{} failed for '{}': {}",
                self.cfg.ffprobe_bin.display(),
                audio.display(),
                out.stderr_text()
            )));
        }

        let duration = parse_probe_duration(&out.stdout)?;
        tracing::debug!(duration_sec = duration, "probed audio");
        Ok(duration)
    }

    #[tracing::instrument(level = "debug", skip(self, req), fields(output = %req.output.display()))]
    fn render_still_clip(&self, req: &StillClipRequest) -> StoryResult<()> {
        let mut cmd = Command::new(&self.cfg.ffmpeg_bin);
        cmd.args(self.still_clip_args(req));

        let out = run_tool(cmd, self.timeout()).map_err(|e| {
            StoryError::encode(format!("failed to run {}: {e}", self.cfg.ffmpeg_bin.display()))
        })?;
        if !out.status.success() {
            return Err(StoryError::encode(format!(
                "{} exited with status {}: {}",
                self.cfg.ffmpeg_bin.display(),
                out.status,
                out.stderr_text()
            )));
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, manifest, output), fields(manifest = %manifest.display()))]
    fn concat(&self, manifest: &Path, output: &Path) -> StoryResult<()> {
        let mut cmd = Command::new(&self.cfg.ffmpeg_bin);
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ])
        .arg(manifest)
        .args(["-c", "copy"])
        .arg(output);

        let out = run_tool(cmd, self.timeout()).map_err(|e| {
            StoryError::assembly(format!("failed to run {}: {e}", self.cfg.ffmpeg_bin.display()))
        })?;
        if !out.status.success() {
            return Err(StoryError::assembly(format!(
                "{} concat exited with status {}: {}",
                self.cfg.ffmpeg_bin.display(),
                out.status,
                out.stderr_text()
            )));
        }
        Ok(())
    }
}

/// Extracts `format.duration` from `ffprobe -print_format json -show_format` output.
///
/// Missing, unparsable, non-finite and non-positive durations are probe errors.
pub fn parse_probe_duration(stdout: &[u8]) -> StoryResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(stdout)
        .map_err(|e| StoryError::probe(format!("ffprobe json parse failed: {e}")))?;
    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| StoryError::probe("ffprobe reported no duration"))?;
    let duration: f64 = raw
        .trim()
        .parse()
        .map_err(|_| StoryError::probe(format!("invalid duration '{raw}'")))?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(StoryError::probe(format!(
            "duration must be positive and finite, got {duration}"
        )));
    }
    Ok(duration)
}

struct ToolOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ToolOutput {
    fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_owned()
    }
}

fn run_tool(mut cmd: Command, timeout: Option<Duration>) -> std::io::Result<ToolOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    tracing::debug!(command = ?cmd, "running external tool");
    let mut child = cmd.spawn()?;

    // Pipes are drained on their own threads so a chatty child never blocks on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        Some(limit) => wait_with_deadline(&mut child, limit)?,
        None => child.wait()?,
    };

    Ok(ToolOutput {
        status,
        stdout: join_drain(stdout)?,
        stderr: join_drain(stderr)?,
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut r) = pipe {
            r.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_drain(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> std::io::Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| std::io::Error::other("pipe reader thread panicked"))?
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= limit {
            child.kill()?;
            child.wait()?;
            return Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("timed out after {}s", limit.as_secs()),
            ));
        }
        std::thread::sleep(WATCHDOG_POLL);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
