//! Frame sources

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{CameraError, VideoFrame};

/// Producer of captured frames.
///
/// `Ok(None)` means the stream has ended. `Err(_)` is a transient failure:
/// callers skip the cycle and call `read` again.
pub trait FrameSource {
    fn read(&mut self) -> Result<Option<VideoFrame>, CameraError>;
}

/// Replays image files from a directory in file-name order
pub struct ImageDirSource {
    paths: VecDeque<PathBuf>,
    sequence: u32,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

impl ImageDirSource {
    /// Index every image file in `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CameraError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| CameraError::Open(format!("{}: {}", dir.display(), e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        info!("Replaying {} frames from {}", paths.len(), dir.display());
        Ok(Self {
            paths: paths.into(),
            sequence: 0,
        })
    }

    /// Frames not yet read
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageDirSource {
    fn read(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };

        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        let img = image::open(&path).map_err(|e| CameraError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!("Decoded frame {} from {}", sequence, path.display());

        let timestamp_ns = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        Ok(Some(VideoFrame::from_rgb(img.to_rgb8(), timestamp_ns, sequence)))
    }
}

/// In-memory source, mostly for tests and demos
#[derive(Default)]
pub struct VecSource {
    frames: VecDeque<Result<VideoFrame, CameraError>>,
}

impl VecSource {
    pub fn new(frames: Vec<VideoFrame>) -> Self {
        Self {
            frames: frames.into_iter().map(Ok).collect(),
        }
    }

    /// Queue a transient failure
    pub fn push_failure(&mut self, err: CameraError) {
        self.frames.push_back(Err(err));
    }

    pub fn push(&mut self, frame: VideoFrame) {
        self.frames.push_back(Ok(frame));
    }
}

impl FrameSource for VecSource {
    fn read(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        match self.frames.pop_front() {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}
