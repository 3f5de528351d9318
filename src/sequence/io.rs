use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use tracing::{debug, info};

use crate::error::{Result, SequenceError, VaceError};
use crate::sequence::types::{Frame, FrameSequence, Mask, MaskSequence};

/// File extensions picked up when loading a frame directory
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Check if a path looks like a loadable still image
pub fn is_frame_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the frame files of a directory in file-name order
pub fn list_frame_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && is_frame_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).map_err(|e| {
        SequenceError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Load a single image file as a float RGB frame
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<Frame> {
    let path = path.as_ref();
    let rgb = open_image(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let data = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
    let buffer =
        ImageBuffer::from_raw(width, height, data).ok_or_else(|| SequenceError::LoadFailed {
            path: path.display().to_string(),
            reason: "pixel buffer size mismatch".to_string(),
        })?;
    Ok(Frame::new(buffer))
}

/// Load a single image file as a mask (luma channel)
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<Mask> {
    let path = path.as_ref();
    let luma = open_image(path)?.to_luma8();
    let (width, height) = luma.dimensions();
    let data = luma.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
    let buffer =
        ImageBuffer::from_raw(width, height, data).ok_or_else(|| SequenceError::LoadFailed {
            path: path.display().to_string(),
            reason: "pixel buffer size mismatch".to_string(),
        })?;
    Ok(Mask::new(buffer))
}

/// Load every frame file of a directory as an image sequence
pub fn load_frames<P: AsRef<Path>>(dir: P) -> Result<FrameSequence> {
    let dir = dir.as_ref();
    let files = list_frame_files(dir)?;
    info!("Loading {} image frames from {:?}", files.len(), dir);

    let frames = files
        .iter()
        .map(|path| {
            debug!("Loading frame {:?}", path);
            load_frame(path)
        })
        .collect::<Result<Vec<_>>>()?;
    FrameSequence::new(frames)
}

/// Load every frame file of a directory as a mask sequence
pub fn load_masks<P: AsRef<Path>>(dir: P) -> Result<MaskSequence> {
    let dir = dir.as_ref();
    let files = list_frame_files(dir)?;
    info!("Loading {} mask frames from {:?}", files.len(), dir);

    let masks = files
        .iter()
        .map(|path| {
            debug!("Loading mask {:?}", path);
            load_mask(path)
        })
        .collect::<Result<Vec<_>>>()?;
    MaskSequence::new(masks)
}

fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Write a frame sequence as `frame_00000.png`, `frame_00001.png`, ...
pub fn save_frames<P: AsRef<Path>>(images: &FrameSequence, dir: P) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    info!("Writing {} image frames to {:?}", images.len(), dir);

    for (index, frame) in images.iter().enumerate() {
        let data = frame.as_image().as_raw().iter().map(|&v| quantize(v)).collect();
        let rgb = RgbImage::from_raw(frame.width(), frame.height(), data)
            .ok_or_else(|| VaceError::generic("frame buffer size mismatch"))?;
        rgb.save(dir.join(format!("frame_{:05}.png", index)))?;
    }
    Ok(())
}

/// Write a mask sequence as `mask_00000.png`, `mask_00001.png`, ...
pub fn save_masks<P: AsRef<Path>>(masks: &MaskSequence, dir: P) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    info!("Writing {} mask frames to {:?}", masks.len(), dir);

    for (index, mask) in masks.iter().enumerate() {
        let gray = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
            Luma([quantize(mask.value_at(x, y))])
        });
        gray.save(dir.join(format!("mask_{:05}.png", index)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Resolution;
    use tempfile::tempdir;

    #[test]
    fn test_frame_directory_roundtrip() {
        let dir = tempdir().unwrap();
        let res = Resolution::new(4, 3);
        let grey = 127.0 / 255.0;
        let images = FrameSequence::new(vec![
            Frame::uniform(res, 0.0),
            Frame::uniform(res, grey),
            Frame::uniform(res, 1.0),
        ])
        .unwrap();

        save_frames(&images, dir.path()).unwrap();
        let loaded = load_frames(dir.path()).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.resolution(), res);
        assert!(loaded[1].is_uniform(grey));
        assert!(loaded[2].is_uniform(1.0));
    }

    #[test]
    fn test_mask_directory_roundtrip() {
        let dir = tempdir().unwrap();
        let res = Resolution::new(2, 2);
        let masks = MaskSequence::new(vec![Mask::opaque(res), Mask::transparent(res)]).unwrap();

        save_masks(&masks, dir.path()).unwrap();
        let loaded = load_masks(dir.path()).unwrap();

        assert_eq!(loaded, masks);
    }

    #[test]
    fn test_non_image_files_are_ignored() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        assert!(list_frame_files(dir.path()).unwrap().is_empty());
        assert!(load_frames(dir.path()).is_err());
    }

    #[test]
    fn test_is_frame_file() {
        assert!(is_frame_file("a/frame_0001.PNG"));
        assert!(is_frame_file("b.jpeg"));
        assert!(!is_frame_file("clip.mp4"));
    }
}
