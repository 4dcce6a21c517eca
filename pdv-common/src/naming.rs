//! Output file naming for extracted frames
//!
//! Frames are named by their 1-based index, zero-padded to the digit count of the
//! header's declared frame count, so `num_frames = 120` gives `001.png` .. `120.png`.

use std::path::{Path, PathBuf};

/// Builds per-frame file names.
#[derive(Debug, Clone)]
pub struct FrameNamer {
    width: usize,
    extension: String,
}

impl FrameNamer {
    pub fn new(num_frames: u16, extension: impl Into<String>) -> Self {
        Self {
            width: digit_count(num_frames as u64),
            extension: extension.into(),
        }
    }

    /// Zero-pad width in digits
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn file_name(&self, number: usize) -> String {
        format!("{:0width$}.{}", number, self.extension, width = self.width)
    }

    pub fn path_in(&self, dir: &Path, number: usize) -> PathBuf {
        dir.join(self.file_name(number))
    }
}

/// Decimal digits needed for `value` (at least 1).
pub fn digit_count(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |d| d as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(120), 3);
        assert_eq!(digit_count(65535), 5);
    }

    #[test]
    fn test_file_names() {
        let namer = FrameNamer::new(120, "png");
        assert_eq!(namer.width(), 3);
        assert_eq!(namer.file_name(1), "001.png");
        assert_eq!(namer.file_name(120), "120.png");

        let namer = FrameNamer::new(5, "png");
        assert_eq!(namer.file_name(2), "2.png");
    }

    #[test]
    fn test_path_in() {
        let namer = FrameNamer::new(1000, "gif");
        assert_eq!(
            namer.path_in(Path::new("out"), 7),
            Path::new("out").join("0007.gif")
        );
    }
}
