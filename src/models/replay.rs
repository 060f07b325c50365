// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 回放预测器: 从 JSON 文件逐帧回放检测结果
//!
//! 文件格式: 帧数组, 每帧是检测数组. 类别可写索引 `class_index` 或名称 `class`
//! ```json
//! [
//!   [{"class_index": 11, "score": 0.92, "rect": {"x": 40, "y": 60, "width": 120, "height": 90}},
//!    {"class": "person", "score": 0.81, "rect": {"x": 200, "y": 30, "width": 80, "height": 200}}],
//!   []
//! ]
//! ```

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use super::{debug_image, Prediction, Predictor};
use crate::detection::labels;
use crate::detection::types::{Detection, Rect};
use crate::device::Device;
use crate::input::VideoTexture;

#[derive(Debug, Deserialize)]
struct ReplayEntry {
    class_index: Option<usize>,
    class: Option<String>,
    score: f32,
    rect: Rect,
}

impl ReplayEntry {
    fn into_detection(self) -> Result<Detection> {
        let class_index = match (self.class_index, self.class.as_deref()) {
            (Some(index), _) => index,
            (None, Some(name)) => labels::class_index(name)
                .ok_or_else(|| anyhow!("unknown class name `{}`", name))?,
            (None, None) => bail!("detection has neither `class_index` nor `class`"),
        };
        Ok(Detection::new(class_index, self.score, self.rect))
    }
}

pub struct ReplayPredictor {
    frames: Vec<Vec<Detection>>,
    cursor: usize,
    source: String,
    device_name: String,
    inflight_buffers: usize,
    debug_images: bool,
}

impl ReplayPredictor {
    pub fn load(device: &Device, inflight_buffers: usize, path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        let entries: Vec<Vec<ReplayEntry>> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse replay file {}", path.display()))?;
        let frames = entries
            .into_iter()
            .map(|frame| {
                frame
                    .into_iter()
                    .map(ReplayEntry::into_detection)
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Invalid detection in replay file {}", path.display()))?;
        Self::from_frames(device, inflight_buffers, frames, path.display().to_string())
    }

    pub fn from_frames(
        device: &Device,
        inflight_buffers: usize,
        frames: Vec<Vec<Detection>>,
        source: String,
    ) -> Result<Self> {
        if frames.is_empty() {
            bail!("replay source {} contains no frames", source);
        }
        Ok(Self {
            frames,
            cursor: 0,
            source,
            device_name: device.name().to_string(),
            inflight_buffers,
            debug_images: false,
        })
    }

    pub fn with_debug_images(mut self, enabled: bool) -> Self {
        self.debug_images = enabled;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Predictor for ReplayPredictor {
    fn predict(&mut self, texture: &VideoTexture) -> Result<Prediction> {
        let detections = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(Prediction {
            detections,
            debug_image: self.debug_images.then(|| debug_image(texture)),
        })
    }

    fn summary(&self) {
        tracing::info!(
            "📼 回放预测器 | 来源: {} | {} 帧 | 设备: {} | 在途缓冲: {}",
            self.source,
            self.frames.len(),
            self.device_name,
            self.inflight_buffers
        );
    }

    fn name(&self) -> &str {
        "replay"
    }
}
