use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::cv::{CameraConfig, CameraSource, ScoredFrame};
use crate::error::Error;
use crate::geometry::Size;

/// Plays back detections recorded as JSON lines, one frame per line:
///
/// ```text
/// [{"class_id": 1, "score": 0.9, "bounding_box": [700, 500, 240, 232]}]
/// []
/// ```
///
/// Blank lines are skipped and do not count as frames.
pub struct ReplaySource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: usize,
    resolution: Size,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>, camera: CameraConfig) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line: 0,
            resolution: camera.resolution,
        })
    }
}

impl CameraSource for ReplaySource {
    type Raw = ScoredFrame;

    fn resolution(&self) -> Size {
        self.resolution
    }

    fn start_preview(&mut self) -> crate::Result<()> {
        log::info!("replaying detections from {}", self.path.display());
        Ok(())
    }

    fn stop_preview(&mut self) -> crate::Result<()> {
        log::info!("replay stopped at line {}", self.line);
        Ok(())
    }

    fn next_result(&mut self) -> crate::Result<Option<ScoredFrame>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }

            return serde_json::from_str(&line)
                .map(Some)
                .map_err(|source| Error::Replay {
                    path: self.path.clone(),
                    line: self.line,
                    source,
                });
        }

        Ok(None)
    }
}
