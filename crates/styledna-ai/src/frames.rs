//! Frame selection and normalization for multimodal prompts.
//!
//! Request cost is bounded by sending a small, fixed number of frames
//! spread across the video instead of every sampled image, each capped to
//! a modest resolution and a single output format.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::imageops::FilterType;
use image::ImageOutputFormat;
use tracing::debug;

use crate::backend::InlineImage;
use crate::error::{AiError, AiResult};

/// Number of frames embedded per analysis request.
pub const MAX_FRAMES: usize = 3;

/// Maximum width of a normalized frame in pixels.
pub const MAX_FRAME_WIDTH: u32 = 512;

/// JPEG quality for normalized frames.
const JPEG_QUALITY: u8 = 85;

/// List frame images in a directory in deterministic (sorted) order.
pub fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
                .unwrap_or(false)
        })
        .collect();
    frames.sort();
    Ok(frames)
}

/// Pick `count` representative indices spread across `len` items.
///
/// Always includes the first and last item; intermediate picks are evenly
/// spaced (10 frames, 3 picks -> indices 0, 5, 9). Not random: identical
/// input yields identical selection.
pub fn select_indices(len: usize, count: usize) -> Vec<usize> {
    if len == 0 || count == 0 {
        return Vec::new();
    }
    if len <= count {
        return (0..len).collect();
    }

    let mut indices: Vec<usize> = (0..count)
        .map(|i| {
            let pos = (i as f64) * ((len - 1) as f64) / ((count - 1) as f64);
            pos.round() as usize
        })
        .collect();
    indices.dedup();
    indices
}

/// Select the bounded representative subset of frame paths.
pub fn select_frames(frames: &[PathBuf], count: usize) -> Vec<PathBuf> {
    select_indices(frames.len(), count)
        .into_iter()
        .map(|i| frames[i].clone())
        .collect()
}

/// Load a frame, cap its width, and re-encode as base64 JPEG.
pub fn normalize_frame(path: &Path) -> AiResult<InlineImage> {
    let img = image::open(path)
        .map_err(|e| AiError::Image(format!("{}: {}", path.display(), e)))?;

    let img = if img.width() > MAX_FRAME_WIDTH {
        img.resize(MAX_FRAME_WIDTH, u32::MAX, FilterType::Triangle)
    } else {
        img
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(|e| AiError::Image(format!("{}: {}", path.display(), e)))?;

    debug!(
        path = %path.display(),
        width = img.width(),
        bytes = buf.get_ref().len(),
        "Normalized frame"
    );

    Ok(InlineImage {
        mime_type: "image/jpeg".to_string(),
        data_base64: base64::engine::general_purpose::STANDARD.encode(buf.get_ref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    #[test]
    fn test_select_indices_ten_frames_three_picks() {
        assert_eq!(select_indices(10, 3), vec![0, 5, 9]);
    }

    #[test]
    fn test_select_indices_edge_cases() {
        assert_eq!(select_indices(0, 3), Vec::<usize>::new());
        assert_eq!(select_indices(1, 3), vec![0]);
        assert_eq!(select_indices(2, 3), vec![0, 1]);
        assert_eq!(select_indices(3, 3), vec![0, 1, 2]);
        assert_eq!(select_indices(4, 3), vec![0, 2, 3]);
        assert_eq!(select_indices(100, 3), vec![0, 50, 99]);
    }

    #[test]
    fn test_list_frames_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("frame_0002.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("frame_0001.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let frames = list_frames(dir.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].ends_with("frame_0001.jpg"));
        assert!(frames[1].ends_with("frame_0002.jpg"));
    }

    #[test]
    fn test_normalize_frame_caps_width() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(1024, 256, Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let inline = normalize_frame(&path).unwrap();
        assert_eq!(inline.mime_type, "image/jpeg");

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data_base64)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.width() <= MAX_FRAME_WIDTH);
        // Aspect ratio preserved: 1024x256 -> 512x128
        assert_eq!(decoded.height(), 128);
    }

    #[test]
    fn test_normalize_frame_small_image_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.png");
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(64, 48, Rgb([1, 2, 3]));
        img.save(&path).unwrap();

        let inline = normalize_frame(&path).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data_base64)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 64);
    }
}
