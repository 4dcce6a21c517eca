//! Probe command - query video geometry through ffprobe

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Deserialize;

use crate::ffmpeg;

/// Arguments for the probe command
#[derive(Args)]
pub struct ProbeArgs {
    /// Video file to inspect
    #[arg(short, long)]
    pub infile: PathBuf,

    /// Print the raw ffprobe stream as JSON
    #[arg(long)]
    pub json: bool,
}

/// Raw ffprobe output (`-show_streams`)
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<Stream>,
}

/// A single video stream as reported by ffprobe.
///
/// ffprobe reports most numeric values as strings, so they are kept verbatim and
/// parsed on access.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub struct Stream {
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub pix_fmt: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub r_frame_rate: Option<String>,
    #[serde(default)]
    pub avg_frame_rate: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub nb_frames: Option<String>,
    #[serde(default)]
    pub nb_read_frames: Option<String>,
}

/// The single video stream of an input file.
#[derive(Debug, Clone)]
pub struct ProbeInfo {
    pub stream: Stream,
}

impl ProbeInfo {
    /// Parse ffprobe JSON, requiring exactly one video stream.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let output: ProbeOutput =
            serde_json::from_slice(bytes).context("Failed to parse ffprobe output")?;

        let mut streams = output.streams.into_iter();
        let Some(stream) = streams.next() else {
            bail!("no video streams found");
        };
        if streams.next().is_some() {
            bail!("more than one video stream found");
        }
        Ok(Self { stream })
    }

    pub fn width(&self) -> u32 {
        self.stream.width
    }

    pub fn height(&self) -> u32 {
        self.stream.height
    }

    /// Frames per second, from `r_frame_rate` (decimal or `num/den`)
    pub fn frame_rate(&self) -> Result<f32> {
        let raw = self
            .stream
            .r_frame_rate
            .as_deref()
            .or(self.stream.avg_frame_rate.as_deref())
            .unwrap_or_default();
        parse_frame_rate(raw)
    }

    pub fn duration(&self) -> Result<Duration> {
        let raw = self.stream.duration.as_deref().unwrap_or_default();
        let seconds: f64 = raw
            .trim()
            .parse()
            .with_context(|| format!("can't parse duration {:?}", raw))?;
        if !seconds.is_finite() || seconds < 0.0 {
            bail!("can't parse duration {:?}", raw);
        }
        Ok(Duration::from_secs_f64(seconds))
    }

    /// Frame count if ffprobe knows it. `None` is distinct from a reported 0.
    pub fn num_frames(&self) -> Option<u64> {
        [&self.stream.nb_read_frames, &self.stream.nb_frames]
            .into_iter()
            .flatten()
            .find_map(|raw| raw.trim().parse().ok())
    }
}

/// Parse a frame rate as a plain decimal, falling back to a `num/den` rational.
pub fn parse_frame_rate(raw: &str) -> Result<f32> {
    let raw = raw.trim();
    if let Ok(rate) = raw.parse::<f32>() {
        if rate.is_finite() && rate > 0.0 {
            return Ok(rate);
        }
    } else if let Some((num, den)) = raw.split_once('/') {
        if let (Ok(num), Ok(den)) = (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
            if den != 0.0 && num > 0.0 {
                return Ok((num / den) as f32);
            }
        }
    }
    bail!("can't parse frame rate {:?}", raw)
}

/// Run ffprobe on a file.
pub fn probe(path: &Path) -> Result<ProbeInfo> {
    let path_str = path.to_string_lossy();
    let stdout = ffmpeg::exec(
        "ffprobe",
        &[
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v",
            &path_str,
        ],
    )
    .with_context(|| format!("Failed to probe {}", path.display()))?;

    ProbeInfo::from_json(&stdout).with_context(|| format!("Failed to probe {}", path.display()))
}

/// Execute the probe command
pub fn execute(args: ProbeArgs) -> Result<()> {
    let info = probe(&args.infile)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info.stream)?);
        return Ok(());
    }

    println!("{}", args.infile.display());
    if let Some(codec) = &info.stream.codec_name {
        println!("  Codec:       {}", codec);
    }
    println!("  Resolution:  {}x{}", info.width(), info.height());
    match info.frame_rate() {
        Ok(rate) => println!("  Frame rate:  {:.3} fps", rate),
        Err(e) => println!("  Frame rate:  unknown ({})", e),
    }
    match info.duration() {
        Ok(duration) => println!("  Duration:    {:.3} s", duration.as_secs_f64()),
        Err(_) => println!("  Duration:    unknown"),
    }
    match info.num_frames() {
        Some(n) => println!("  Frames:      {}", n),
        None => println!("  Frames:      unknown"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "width": 400,
                "height": 240,
                "pix_fmt": "yuv420p",
                "r_frame_rate": "30000/1001",
                "avg_frame_rate": "30000/1001",
                "duration": "4.004000",
                "nb_frames": "120",
                "nb_read_frames": "120"
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let info = ProbeInfo::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(info.width(), 400);
        assert_eq!(info.height(), 240);
        assert!((info.frame_rate().unwrap() - 29.97).abs() < 0.01);
        let duration = info.duration().unwrap().as_secs_f64();
        assert!((duration - 4.004).abs() < 1e-6);
        assert_eq!(info.num_frames(), Some(120));
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30").unwrap(), 30.0);
        assert_eq!(parse_frame_rate("29.5").unwrap(), 29.5);
        assert_eq!(parse_frame_rate("25/1").unwrap(), 25.0);
        assert!(parse_frame_rate("0/0").is_err());
        assert!(parse_frame_rate("fast").is_err());
        assert!(parse_frame_rate("").is_err());
    }

    #[test]
    fn test_missing_frame_count() {
        let json = r#"{"streams": [{"width": 16, "height": 8, "r_frame_rate": "15/1"}]}"#;
        let info = ProbeInfo::from_json(json.as_bytes()).unwrap();
        assert_eq!(info.num_frames(), None);
        assert!(info.duration().is_err());
    }

    #[test]
    fn test_zero_frame_count_is_not_missing() {
        let json = r#"{"streams": [{"width": 16, "height": 8, "nb_read_frames": "0"}]}"#;
        let info = ProbeInfo::from_json(json.as_bytes()).unwrap();
        assert_eq!(info.num_frames(), Some(0));
    }

    #[test]
    fn test_nb_frames_fallback() {
        let json = r#"{"streams": [{"width": 16, "height": 8, "nb_read_frames": "N/A", "nb_frames": "42"}]}"#;
        let info = ProbeInfo::from_json(json.as_bytes()).unwrap();
        assert_eq!(info.num_frames(), Some(42));
    }

    #[test]
    fn test_stream_count() {
        let err = ProbeInfo::from_json(br#"{"streams": []}"#).unwrap_err();
        assert_eq!(err.to_string(), "no video streams found");

        let err = ProbeInfo::from_json(br#"{}"#).unwrap_err();
        assert_eq!(err.to_string(), "no video streams found");

        let two = br#"{"streams": [{"width": 1}, {"width": 2}]}"#;
        let err = ProbeInfo::from_json(two).unwrap_err();
        assert_eq!(err.to_string(), "more than one video stream found");
    }

    #[test]
    fn test_invalid_json() {
        assert!(ProbeInfo::from_json(b"not json").is_err());
    }
}
