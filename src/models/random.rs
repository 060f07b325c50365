// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 随机预测器: 无模型文件时用于演示完整流水线

use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{debug_image, Prediction, Predictor};
use crate::detection::labels::NUM_CLASSES;
use crate::detection::types::{Detection, Rect, INF_SIZE};
use crate::device::Device;
use crate::input::VideoTexture;

pub struct RandomPredictor {
    rng: StdRng,
    device_name: String,
    inflight_buffers: usize,
    max_detections: usize,
    latency: Duration,
    debug_images: bool,
}

impl RandomPredictor {
    pub fn new(device: &Device, inflight_buffers: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            device_name: device.name().to_string(),
            inflight_buffers,
            max_detections: 6,
            latency: Duration::ZERO,
            debug_images: false,
        }
    }

    /// 每帧最多生成的检测数
    pub fn with_max_detections(mut self, max_detections: usize) -> Self {
        self.max_detections = max_detections;
        self
    }

    /// 模拟推理耗时
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// 输出网络输入尺寸的调试图像
    pub fn with_debug_images(mut self, enabled: bool) -> Self {
        self.debug_images = enabled;
        self
    }

    fn random_detection(&mut self) -> Detection {
        let size = INF_SIZE as f32;
        let width = self.rng.gen_range(24.0..size / 2.0);
        let height = self.rng.gen_range(24.0..size / 2.0);
        let x = self.rng.gen_range(0.0..size - width);
        let y = self.rng.gen_range(0.0..size - height);
        Detection::new(
            self.rng.gen_range(0..NUM_CLASSES),
            self.rng.gen_range(0.3..1.0),
            Rect::new(x, y, width, height),
        )
    }
}

impl Predictor for RandomPredictor {
    fn predict(&mut self, texture: &VideoTexture) -> Result<Prediction> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let count = self.rng.gen_range(0..=self.max_detections);
        let mut detections: Vec<Detection> = (0..count).map(|_| self.random_detection()).collect();
        // 与网络输出一致: 按置信度从高到低
        detections.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(Prediction {
            detections,
            debug_image: self.debug_images.then(|| debug_image(texture)),
        })
    }

    fn summary(&self) {
        tracing::info!(
            "🎲 随机预测器 | 设备: {} | 在途缓冲: {} | 每帧最多 {} 个 | 模拟耗时 {:?}",
            self.device_name,
            self.inflight_buffers,
            self.max_detections,
            self.latency
        );
    }

    fn name(&self) -> &str {
        "random"
    }
}
