//! Integration tests for pdv-common
//!
//! Full pipeline: rasters -> PdvEncoder -> file on disk -> PdvDecoder -> PNG codec

use pdv_common::{
    FrameNamer, FrameType, PdvDecoder, PdvEncoder, PdvError, PdvHeader, PngCodec, Raster,
    StillImageCodec,
};
use tempfile::tempdir;

/// A vertical bar that moves one column per frame
fn moving_bar(width: u16, height: u16, frame: u16) -> Raster {
    let mut raster = Raster::new(width, height).unwrap();
    for y in 0..height {
        raster.set(frame % width, y, 1);
    }
    raster
}

#[test]
fn test_file_roundtrip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("bar.pdv");

    let (width, height) = (40u16, 24u16);
    let rasters: Vec<_> = (0..12).map(|i| moving_bar(width, height, i)).collect();

    let mut encoder = PdvEncoder::new(30.0, width, height).unwrap();
    for raster in &rasters {
        encoder.push_raster(raster).unwrap();
    }
    assert_eq!(encoder.write_file(&path).unwrap(), 12);

    let mut decoder = PdvDecoder::open(&path).unwrap();
    let header = *decoder.header();
    assert_eq!(header.num_frames, 12);
    assert_eq!(header.frame_rate, 30.0);
    assert_eq!(decoder.frame_count(), 12);

    for (frame, expected) in decoder.frames().zip(&rasters) {
        let frame = frame.unwrap();
        assert_eq!(frame.frame_type, FrameType::IFrame);
        assert_eq!(&frame.to_raster(&header).unwrap(), expected);
    }
}

#[test]
fn test_decode_to_png_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("clip.pdv");

    let mut encoder = PdvEncoder::new(15.0, 16, 16).unwrap();
    for i in 0..10 {
        encoder.push_raster(&moving_bar(16, 16, i)).unwrap();
    }
    encoder.write_file(&path).unwrap();

    let codec = PngCodec::new();
    let mut decoder = PdvDecoder::open(&path).unwrap();
    let header = *decoder.header();
    let namer = FrameNamer::new(header.num_frames, codec.extension());

    for frame in decoder.frames() {
        let frame = frame.unwrap();
        let raster = frame.to_raster(&header).unwrap();
        let out = namer.path_in(dir.path(), frame.number);
        std::fs::write(&out, codec.encode(&raster).unwrap()).unwrap();
    }

    assert!(dir.path().join("01.png").exists());
    assert!(dir.path().join("10.png").exists());
    assert!(!dir.path().join("11.png").exists());

    let bytes = std::fs::read(dir.path().join("04.png")).unwrap();
    assert_eq!(codec.decode(&bytes).unwrap(), moving_bar(16, 16, 3));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let err = PdvDecoder::open(dir.path().join("nope.pdv")).err().unwrap();
    assert!(matches!(err, PdvError::Io { .. }));
}

#[test]
fn test_truncated_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("short.pdv");
    let header = PdvHeader::with_num_frames(30.0, 16, 16, 4);
    std::fs::write(&path, header.to_bytes()).unwrap();

    let err = PdvDecoder::open(&path).err().unwrap();
    assert!(matches!(err, PdvError::Io { .. }), "{:?}", err);
}
