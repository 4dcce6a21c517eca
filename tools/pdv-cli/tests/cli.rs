//! Integration tests for the pdv binary
//!
//! Tests the full pipeline: build a PDV file -> run `pdv` -> verify output files

use std::path::Path;
use std::process::{Command, Output};

use pdv_common::{PdvDecoder, PdvEncoder, PngCodec, Raster, StillImageCodec};
use tempfile::tempdir;

/// Frame `i` has a single white pixel at column `i`
fn generate_pdv(path: &Path, frames: u16, width: u16, height: u16) {
    let mut encoder = PdvEncoder::new(30.0, width, height).expect("Failed to create encoder");
    for i in 0..frames {
        let mut raster = Raster::new(width, height).unwrap();
        raster.set(i % width, 0, 1);
        encoder.push_raster(&raster).expect("Failed to add frame");
    }
    encoder.write_file(path).expect("Failed to write PDV");
}

fn pdv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pdv"))
        .args(args)
        .output()
        .expect("Failed to run pdv")
}

/// Test PDV -> numbered PNG frames
#[test]
fn test_decode_writes_numbered_pngs() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pdv_path = dir.path().join("clip.pdv");
    let out_dir = dir.path().join("frames");
    generate_pdv(&pdv_path, 12, 32, 8);

    let output = pdv(&[
        "decode",
        "-i",
        pdv_path.to_str().unwrap(),
        out_dir.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "pdv decode failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let mut names: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    let expected: Vec<_> = (1..=12).map(|i| format!("{:02}.png", i)).collect();
    assert_eq!(names, expected);

    let codec = PngCodec::new();
    for i in 1..=12u16 {
        let bytes = std::fs::read(out_dir.join(format!("{:02}.png", i))).unwrap();
        let raster = codec.decode(&bytes).expect("Failed to decode PNG");
        assert_eq!((raster.width(), raster.height()), (32, 8));
        assert_eq!(raster.get(i - 1, 0), Some(1), "frame {}", i);
    }
}

/// Test that a bad file fails with a non-zero exit
#[test]
fn test_decode_rejects_bad_magic() {
    let dir = tempdir().expect("Failed to create temp dir");
    let bogus = dir.path().join("bogus.pdv");
    std::fs::write(&bogus, b"Not a video file, just bytes.").unwrap();

    let output = pdv(&[
        "decode",
        "-i",
        bogus.to_str().unwrap(),
        dir.path().join("out").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid magic"));
}

/// Test the info report
#[test]
fn test_info() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pdv_path = dir.path().join("clip.pdv");
    generate_pdv(&pdv_path, 5, 16, 16);

    let output = pdv(&["info", "-i", pdv_path.to_str().unwrap(), "--frames"]);
    assert!(output.status.success(), "pdv info failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Resolution:  16x16"), "{}", stdout);
    assert!(stdout.contains("Present:     5"), "{}", stdout);
    assert!(stdout.contains("IFrame"), "{}", stdout);
}

/// Test image directory -> PDV -> PNG frames
#[test]
fn test_encode_image_dir_then_decode() {
    let dir = tempdir().expect("Failed to create temp dir");
    let frames_in = dir.path().join("in");
    let frames_out = dir.path().join("out");
    let pdv_path = dir.path().join("clip.pdv");
    std::fs::create_dir(&frames_in).unwrap();

    let codec = PngCodec::new();
    for i in 0..4u16 {
        let mut raster = Raster::new(8, 8).unwrap();
        raster.set(i, i, 1);
        std::fs::write(
            frames_in.join(format!("frame{}.png", i)),
            codec.encode(&raster).unwrap(),
        )
        .unwrap();
    }

    let output = pdv(&[
        "encode",
        "-i",
        frames_in.to_str().unwrap(),
        pdv_path.to_str().unwrap(),
        "--frame-rate",
        "8",
    ]);
    assert!(
        output.status.success(),
        "pdv encode failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let decoder = PdvDecoder::open(&pdv_path).expect("Failed to open encoded PDV");
    assert_eq!(decoder.header().num_frames, 4);
    assert_eq!(decoder.header().frame_rate, 8.0);

    let output = pdv(&[
        "decode",
        "-i",
        pdv_path.to_str().unwrap(),
        frames_out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "pdv decode failed");

    for i in 0..4u16 {
        let bytes = std::fs::read(frames_out.join(format!("{}.png", i + 1))).unwrap();
        let raster = codec.decode(&bytes).unwrap();
        assert_eq!(raster.get(i, i), Some(1));
    }
}
