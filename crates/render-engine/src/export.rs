//! Export jobs and the ffmpeg encoder backend.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, ChildStdout, Command, Stdio};
use std::time::Instant;

use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use kenburns_geometry::Size;
use kenburns_interpolator::{CropTrajectory, FilterParameters, FramePlan, FrameSequence};

use crate::filter::{video_filter_chain, ZoomPanFilter};
use crate::settings::{EncodeSettings, ExportFormat};
use crate::source::probe_size;

/// Frames rendered per parallel batch when piping.
const FRAME_BATCH: u64 = 16;

/// Seconds without encoder progress before a stall warning.
const STALL_WARN_SECS: u64 = 10;

/// Where the encoder's frames come from.
#[derive(Debug, Clone)]
pub enum ExportInput {
    /// ffmpeg animates the still image itself with a `zoompan` filter.
    ZoomPan {
        image_path: PathBuf,
        source_size: Size,
        params: FilterParameters,
    },
    /// Frames are rendered in-process and piped as raw RGB24.
    Frames(FrameSequence),
}

/// An export job ready to be encoded.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub input: ExportInput,

    /// Output file path.
    pub output_path: PathBuf,

    pub settings: EncodeSettings,
}

impl ExportJob {
    /// Encode `params` from the still image at `image_path`.
    pub fn zoompan(
        image_path: impl Into<PathBuf>,
        params: FilterParameters,
        output_path: impl Into<PathBuf>,
        settings: EncodeSettings,
    ) -> KenBurnsResult<Self> {
        let image_path = image_path.into();
        let source_size = probe_size(&image_path)?;
        Ok(Self {
            input: ExportInput::ZoomPan {
                image_path,
                source_size,
                params,
            },
            output_path: output_path.into(),
            settings,
        })
    }

    /// Encode a rendered sequence. The sequence's frame rate wins over
    /// `settings.fps`, and frames are resampled to the encodable size.
    pub fn frames(
        sequence: FrameSequence,
        output_path: impl Into<PathBuf>,
        mut settings: EncodeSettings,
    ) -> KenBurnsResult<Self> {
        settings.fps = sequence.fps();
        settings.output = sequence.output_size();
        let encoded = settings.encoded_size();
        let sequence = if encoded == sequence.output_size() {
            sequence
        } else {
            tracing::debug!(
                from = %sequence.output_size(),
                to = %encoded,
                "Resampling frames to an encodable size"
            );
            sequence.with_output_size(encoded)?
        };
        settings.output = encoded;
        Ok(Self {
            input: ExportInput::Frames(sequence),
            output_path: output_path.into(),
            settings,
        })
    }

    pub fn mode_name(&self) -> &'static str {
        match self.input {
            ExportInput::ZoomPan { .. } => "zoompan",
            ExportInput::Frames(_) => "frames",
        }
    }

    pub fn source_size(&self) -> Size {
        match &self.input {
            ExportInput::ZoomPan { source_size, .. } => *source_size,
            ExportInput::Frames(sequence) => sequence.source_size(),
        }
    }

    pub fn total_frames(&self) -> KenBurnsResult<u64> {
        match &self.input {
            ExportInput::ZoomPan { params, .. } => params.frame_count(self.settings.fps),
            ExportInput::Frames(sequence) => Ok(sequence.len()),
        }
    }

    /// Crop path the job follows, if it follows one.
    pub fn trajectory(&self) -> KenBurnsResult<Option<CropTrajectory>> {
        match &self.input {
            ExportInput::ZoomPan { params, .. } => params.trajectory(self.settings.fps).map(Some),
            ExportInput::Frames(sequence) => match sequence.plan() {
                FramePlan::Path(trajectory) => Ok(Some(*trajectory)),
                FramePlan::CenteredZoom { .. } => Ok(None),
            },
        }
    }

    /// Report files are written next to the output.
    pub fn debug_report_path(&self) -> PathBuf {
        self.output_path.with_extension("ffmpeg-debug.txt")
    }

    pub fn verification_report_path(&self) -> PathBuf {
        self.output_path.with_extension("verification.json")
    }
}

/// Progress callback for export encoding.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    pub frames_rendered: u64,

    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: ExportStage,
}

impl ExportProgress {
    fn at_stage(stage: ExportStage, progress: f64, frames_rendered: u64, total_frames: u64) -> Self {
        Self {
            progress,
            frames_rendered,
            total_frames,
            eta_secs: 0.0,
            stage,
        }
    }
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Encoding,
    Finalizing,
    Complete,
    Failed,
}

/// An external video encoder.
pub trait EncoderBackend: Send {
    /// Encode the job to `job.output_path`.
    fn encode(&mut self, job: &ExportJob, progress: Option<ProgressCallback>)
        -> KenBurnsResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// Encode a job with the system ffmpeg.
pub async fn export_video(
    job: ExportJob,
    progress: Option<ProgressCallback>,
) -> KenBurnsResult<PathBuf> {
    export_video_with(Box::new(FfmpegBackend::new()), job, progress).await
}

/// Encode a job with a specific backend.
///
/// The encode itself blocks on the child process, so it runs on tokio's
/// blocking pool.
pub async fn export_video_with(
    mut backend: Box<dyn EncoderBackend>,
    job: ExportJob,
    progress: Option<ProgressCallback>,
) -> KenBurnsResult<PathBuf> {
    tracing::info!(
        output = %job.output_path.display(),
        format = %job.settings.format,
        mode = job.mode_name(),
        "Starting export"
    );

    if let ExportInput::ZoomPan { image_path, .. } = &job.input {
        if !image_path.exists() {
            return Err(KenBurnsError::FileNotFound {
                path: image_path.clone(),
            });
        }
    }

    if let Some(parent) = job.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if let Some(cb) = &progress {
        cb(ExportProgress::at_stage(
            ExportStage::Preparing,
            0.0,
            0,
            job.total_frames()?,
        ));
    }

    if !backend.is_available() {
        return Err(KenBurnsError::unsupported(format!(
            "encoder backend {} not found (expected ffmpeg in PATH)",
            backend.name()
        )));
    }
    tracing::info!(backend = backend.name(), "Using encoder backend");

    tokio::task::spawn_blocking(move || -> KenBurnsResult<PathBuf> {
        backend.encode(&job, progress)?;
        Ok(job.output_path)
    })
    .await
    .map_err(|e| KenBurnsError::encoder(format!("encoder task failed: {e}")))?
}

#[derive(Debug, Clone)]
struct EncodePlan {
    args: Vec<String>,
    total_frames: u64,
    expected_duration_secs: f64,
    pipe_frames: bool,
    debug_report: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VerificationSummary {
    checked_frames: u64,
    out_of_bounds: usize,
    first_out_of_bounds: Option<u64>,
}

/// Runs the `ffmpeg` binary as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    binary: String,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn build_plan(&self, job: &ExportJob) -> KenBurnsResult<EncodePlan> {
        let plan_started = Instant::now();
        let settings = &job.settings;

        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
        ];

        let (total_frames, fps, stages, source, pipe_frames) = match &job.input {
            ExportInput::ZoomPan {
                image_path,
                source_size,
                params,
            } => {
                let filter = ZoomPanFilter::new(
                    params,
                    *source_size,
                    settings.fps,
                    settings.encoded_size(),
                )?;
                args.extend([
                    "-progress".to_string(),
                    "pipe:1".to_string(),
                    "-i".to_string(),
                    image_path.display().to_string(),
                ]);
                (
                    filter.frames(),
                    settings.fps,
                    filter.stages(),
                    image_path.display().to_string(),
                    false,
                )
            }
            ExportInput::Frames(sequence) => {
                let size = sequence.output_size();
                args.extend([
                    "-f".to_string(),
                    "rawvideo".to_string(),
                    "-pix_fmt".to_string(),
                    "rgb24".to_string(),
                    "-video_size".to_string(),
                    size.to_string(),
                    "-framerate".to_string(),
                    sequence.fps().to_string(),
                    "-i".to_string(),
                    "pipe:0".to_string(),
                ]);
                (
                    sequence.len(),
                    sequence.fps(),
                    Vec::new(),
                    "pipe:0".to_string(),
                    true,
                )
            }
        };

        let filter = video_filter_chain(&stages, settings.format);
        if let Some(graph) = &filter {
            args.push("-vf".to_string());
            args.push(graph.clone());
        }
        args.extend([
            "-frames:v".to_string(),
            total_frames.to_string(),
            "-r".to_string(),
            fps.to_string(),
        ]);
        args.append(&mut codec_args_for_settings(settings));
        args.push(job.output_path.display().to_string());

        let expected_duration_secs = total_frames as f64 / fps.max(1) as f64;
        let debug_report = format!(
            "generated_at={}\nmode={}\nformat={}\nsource={}\nsource_size={}\noutput_size={}\nfps={}\nframes={}\nduration_secs={:.3}\nfilter={}\nffmpeg_args={}\nplan_build_ms={}\n",
            chrono::Utc::now().to_rfc3339(),
            job.mode_name(),
            settings.format,
            source,
            job.source_size(),
            settings.encoded_size(),
            fps,
            total_frames,
            expected_duration_secs,
            filter.as_deref().unwrap_or("-"),
            args.join(" "),
            plan_started.elapsed().as_millis(),
        );

        tracing::info!(
            mode = job.mode_name(),
            frames = total_frames,
            fps,
            output_size = %settings.encoded_size(),
            "Export plan built"
        );

        Ok(EncodePlan {
            args,
            total_frames,
            expected_duration_secs,
            pipe_frames,
            debug_report,
        })
    }

    fn run_ffmpeg(
        &self,
        job: &ExportJob,
        plan: &EncodePlan,
        progress: Option<&ProgressCallback>,
    ) -> KenBurnsResult<()> {
        tracing::debug!(args = ?plan.args, "Running ffmpeg");
        let mut cmd = Command::new(&self.binary);
        cmd.args(&plan.args).stderr(Stdio::piped());
        if plan.pipe_frames {
            cmd.stdin(Stdio::piped()).stdout(Stdio::null());
        } else {
            cmd.stdin(Stdio::null()).stdout(Stdio::piped());
        }

        let start = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| KenBurnsError::encoder(format!("failed to start {}: {e}", self.binary)))?;

        tracing::info!(
            pid = child.id(),
            args_len = plan.args.len(),
            total_frames = plan.total_frames,
            "ffmpeg process started"
        );

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| KenBurnsError::encoder("failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once its stderr pipe fills up.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let fed = match &job.input {
            ExportInput::Frames(sequence) => {
                let stdin = child
                    .stdin
                    .take()
                    .ok_or_else(|| KenBurnsError::encoder("failed to open ffmpeg stdin"))?;
                let piped = pipe_frames(stdin, sequence, progress, start);
                if piped.is_ok() {
                    if let Some(cb) = progress {
                        cb(ExportProgress::at_stage(
                            ExportStage::Encoding,
                            1.0,
                            plan.total_frames,
                            plan.total_frames,
                        ));
                    }
                }
                piped
            }
            ExportInput::ZoomPan { .. } => {
                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| KenBurnsError::encoder("failed to capture ffmpeg stdout"))?;
                follow_progress(stdout, plan, progress, start)
            }
        };

        let status = child
            .wait()
            .map_err(|e| KenBurnsError::encoder(format!("failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            tracing::error!(%status, "ffmpeg export failed");
            if let Some(cb) = progress {
                cb(ExportProgress::at_stage(
                    ExportStage::Failed,
                    0.0,
                    0,
                    plan.total_frames,
                ));
            }
            return Err(KenBurnsError::encoder(format!(
                "ffmpeg exited with {status}: {}",
                stderr_output.trim()
            )));
        }
        fed?;

        Ok(())
    }

    fn run_verification(&self, job: &ExportJob) -> KenBurnsResult<VerificationSummary> {
        let summary = verify_crop_windows(job)?;
        let report = serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "output": job.output_path,
            "mode": job.mode_name(),
            "source_size": job.source_size().to_string(),
            "checked_frames": summary.checked_frames,
            "out_of_bounds_frames": summary.out_of_bounds,
            "first_out_of_bounds": summary.first_out_of_bounds,
            "status": if summary.out_of_bounds == 0 { "ok" } else { "warn" }
        });
        let report_path = job.verification_report_path();
        std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(report = %report_path.display(), "Wrote crop verification report");
        Ok(summary)
    }
}

impl EncoderBackend for FfmpegBackend {
    fn encode(
        &mut self,
        job: &ExportJob,
        progress: Option<ProgressCallback>,
    ) -> KenBurnsResult<()> {
        let started = Instant::now();
        let plan = self.build_plan(job)?;
        let debug_path = job.debug_report_path();
        if let Err(err) = std::fs::write(&debug_path, &plan.debug_report) {
            tracing::warn!(error = %err, path = %debug_path.display(), "Failed to write ffmpeg debug report");
        } else {
            tracing::info!(path = %debug_path.display(), "Wrote ffmpeg debug report");
        }

        if let Some(cb) = &progress {
            cb(ExportProgress::at_stage(
                ExportStage::Preparing,
                0.0,
                0,
                plan.total_frames,
            ));
        }

        let total_frames = plan.total_frames;
        self.run_ffmpeg(job, &plan, progress.as_ref())?;

        if let Some(cb) = &progress {
            cb(ExportProgress::at_stage(
                ExportStage::Finalizing,
                1.0,
                total_frames,
                total_frames,
            ));
        }

        let summary = self.run_verification(job)?;
        if summary.out_of_bounds > 0 {
            tracing::warn!(
                out_of_bounds = summary.out_of_bounds,
                first = summary.first_out_of_bounds,
                "Crop windows leave the image bounds; edge pixels were clamped"
            );
        }

        if let Some(cb) = &progress {
            cb(ExportProgress::at_stage(
                ExportStage::Complete,
                1.0,
                total_frames,
                total_frames,
            ));
        }
        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            output = %job.output_path.display(),
            "Export finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists(&self.binary)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

fn pipe_frames(
    stdin: ChildStdin,
    sequence: &FrameSequence,
    progress: Option<&ProgressCallback>,
    start: Instant,
) -> KenBurnsResult<()> {
    let total = sequence.len();
    let mut writer = BufWriter::new(stdin);
    let mut written = 0u64;
    while written < total {
        let batch_end = (written + FRAME_BATCH).min(total);
        for frame in sequence.render_range(written..batch_end) {
            writer.write_all(frame.as_raw()).map_err(|e| {
                KenBurnsError::encoder(format!("ffmpeg stopped accepting frames: {e}"))
            })?;
        }
        written = batch_end;
        tracing::trace!(written, total, "Piped frame batch");
        if let Some(cb) = progress {
            cb(frames_report(written, total, start.elapsed().as_secs_f64()));
        }
    }
    writer
        .flush()
        .map_err(|e| KenBurnsError::encoder(format!("ffmpeg stopped accepting frames: {e}")))?;
    // Dropping the writer closes stdin so ffmpeg can finish the file.
    Ok(())
}

fn follow_progress(
    stdout: ChildStdout,
    plan: &EncodePlan,
    progress: Option<&ProgressCallback>,
    start: Instant,
) -> KenBurnsResult<()> {
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();

    let mut latest = ProgressState::default();
    let mut last_frame = 0u64;
    let mut last_advance = Instant::now();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|e| KenBurnsError::encoder(format!("failed reading ffmpeg progress: {e}")))?;
        if bytes == 0 {
            break;
        }

        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        latest.update(key, value);
        if key != "progress" {
            continue;
        }

        if latest.frame > last_frame {
            last_frame = latest.frame;
            last_advance = Instant::now();
        }
        if let Some(cb) = progress {
            cb(progress_report(
                &latest,
                plan.total_frames,
                plan.expected_duration_secs,
                start.elapsed().as_secs_f64(),
            ));
        }
        if last_advance.elapsed().as_secs() >= STALL_WARN_SECS {
            tracing::warn!(
                frame = latest.frame,
                elapsed_secs = start.elapsed().as_secs_f64(),
                "No ffmpeg progress advancement for {STALL_WARN_SECS}s"
            );
            last_advance = Instant::now();
        }
    }
    Ok(())
}

/// Check every crop window against the source image.
///
/// Trajectory windows are checked before clamping, so a path drawn
/// partly off the image is reported even though frames still render.
fn verify_crop_windows(job: &ExportJob) -> KenBurnsResult<VerificationSummary> {
    let source = job.source_size();
    let (checked_frames, outside) = match job.trajectory()? {
        Some(trajectory) => (
            trajectory.frames() + 1,
            trajectory.out_of_bounds_frames(source),
        ),
        None => match &job.input {
            ExportInput::Frames(sequence) => (
                sequence.len(),
                (0..sequence.len())
                    .filter(|&i| !sequence.crop_rect(i).fits_within(source))
                    .collect(),
            ),
            ExportInput::ZoomPan { .. } => (0, Vec::new()),
        },
    };
    Ok(VerificationSummary {
        checked_frames,
        out_of_bounds: outside.len(),
        first_out_of_bounds: outside.first().copied(),
    })
}

fn codec_args_for_settings(settings: &EncodeSettings) -> Vec<String> {
    let video_bitrate = format!("{}k", settings.video_bitrate_kbps.max(500));

    let mut args: Vec<String> = match settings.format {
        ExportFormat::Mp4H264 => vec![
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "medium".into(),
            "-profile:v".into(),
            "high".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-b:v".into(),
            video_bitrate,
            "-movflags".into(),
            "+faststart".into(),
        ],
        ExportFormat::Mp4H265 => vec![
            "-c:v".into(),
            "libx265".into(),
            "-preset".into(),
            "medium".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-b:v".into(),
            video_bitrate,
            "-tag:v".into(),
            "hvc1".into(),
            "-movflags".into(),
            "+faststart".into(),
        ],
        ExportFormat::Gif => vec!["-loop".into(), "0".into()],
        ExportFormat::Webm => vec![
            "-c:v".into(),
            "libvpx-vp9".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-b:v".into(),
            video_bitrate,
        ],
    };
    // A still image has no audio to carry.
    args.push("-an".into());
    args
}

fn command_exists(binary: &str) -> bool {
    if binary.contains('/') {
        return Path::new(binary).is_file();
    }
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct ProgressState {
    frame: u64,
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "frame" => {
                if let Ok(frame) = value.trim().parse::<u64>() {
                    self.frame = frame;
                }
            }
            // ffmpeg reports microseconds under both names.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.trim().parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value.trim() == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ExportProgress {
    let progress = if total_frames > 0 && state.frame > 0 {
        (state.frame as f64 / total_frames as f64).clamp(0.0, 1.0)
    } else if expected_duration_secs > 0.0 {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let frames_rendered = if state.frame > 0 {
        state.frame.min(total_frames)
    } else {
        (progress * total_frames as f64).round() as u64
    };

    ExportProgress {
        progress: if state.complete { 1.0 } else { progress },
        frames_rendered,
        total_frames,
        eta_secs: eta(progress, elapsed_secs),
        stage: if state.complete {
            ExportStage::Finalizing
        } else {
            ExportStage::Rendering
        },
    }
}

fn frames_report(written: u64, total: u64, elapsed_secs: f64) -> ExportProgress {
    let progress = if total == 0 {
        1.0
    } else {
        (written as f64 / total as f64).clamp(0.0, 1.0)
    };
    ExportProgress {
        progress,
        frames_rendered: written.min(total),
        total_frames: total,
        eta_secs: eta(progress, elapsed_secs),
        stage: ExportStage::Rendering,
    }
}

fn eta(progress: f64, elapsed_secs: f64) -> f64 {
    if progress > 0.0 {
        ((elapsed_secs / progress) - elapsed_secs).max(0.0)
    } else {
        0.0
    }
}
