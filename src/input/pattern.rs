//! 测试图案采集 (无摄像头时使用)
//!
//! 渐变背景 + 一个水平移动的色块, 便于肉眼确认画面在刷新

use std::sync::Arc;

use anyhow::{bail, Result};
use image::{Rgba, RgbaImage};

use super::capture_loop::CaptureLoop;
use super::{PreviewLayer, SessionPreset, VideoCapture, VideoCaptureDelegate};

pub struct PatternCapture {
    preset: Option<SessionPreset>,
    fps: u32,
    max_frames: Option<u64>,
    delegate: Option<Arc<dyn VideoCaptureDelegate>>,
    preview: Option<PreviewLayer>,
    worker: CaptureLoop,
}

impl PatternCapture {
    pub fn new() -> Self {
        Self {
            preset: None,
            fps: 30,
            max_frames: None,
            delegate: None,
            preview: None,
            worker: CaptureLoop::new("pattern"),
        }
    }

    /// 只产生指定数量的帧后结束
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// 等待有限帧数的输入结束
    pub fn wait(&mut self) {
        self.worker.wait();
    }

    pub fn render(preset: SessionPreset, frame_index: u64) -> RgbaImage {
        let (w, h) = (preset.width, preset.height);
        let block = (w / 8).max(1);
        let block_x = ((frame_index * 8) % u64::from(w)) as u32;
        let block_y = h / 2 - (block / 2).min(h / 2);

        RgbaImage::from_fn(w, h, |x, y| {
            if x >= block_x && x < block_x + block && y >= block_y && y < block_y + block {
                return Rgba([230, 60, 60, 255]);
            }
            let r = (x * 255 / w.max(1)) as u8;
            let g = (y * 255 / h.max(1)) as u8;
            Rgba([r / 2, g / 2, 96, 255])
        })
    }
}

impl Default for PatternCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoCapture for PatternCapture {
    fn set_up(&mut self, preset: SessionPreset) -> Result<()> {
        self.preset = Some(preset);
        self.preview = Some(PreviewLayer::new());
        tracing::info!("✅ 测试图案采集就绪: {}", preset);
        Ok(())
    }

    fn set_delegate(&mut self, delegate: Arc<dyn VideoCaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    fn fps(&self) -> u32 {
        self.fps
    }

    fn preview_layer(&self) -> Option<PreviewLayer> {
        self.preview.clone()
    }

    fn start(&mut self) -> Result<()> {
        let (Some(preset), Some(preview)) = (self.preset, self.preview.clone()) else {
            bail!("pattern capture started before set_up");
        };
        let max_frames = self.max_frames;
        self.worker.start(
            self.fps,
            preview,
            self.delegate.clone(),
            Box::new(move |i: u64| {
                if max_frames.is_some_and(|max| i >= max) {
                    return Ok(None);
                }
                Ok(Some(PatternCapture::render(preset, i)))
            }),
        )
    }

    fn stop(&mut self) {
        self.worker.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_size() {
        let img = PatternCapture::render(SessionPreset::VGA_640X480, 3);
        assert_eq!(img.dimensions(), (640, 480));
    }

    #[test]
    fn test_block_moves() {
        let preset = SessionPreset {
            width: 64,
            height: 32,
        };
        let a = PatternCapture::render(preset, 0);
        let b = PatternCapture::render(preset, 1);
        assert_ne!(a, b);
        assert_eq!(a.get_pixel(0, 16), &Rgba([230, 60, 60, 255]));
        assert_ne!(b.get_pixel(0, 16), &Rgba([230, 60, 60, 255]));
    }

    #[test]
    fn test_start_requires_set_up() {
        let mut capture = PatternCapture::new();
        assert!(capture.preview_layer().is_none());
        assert!(capture.start().is_err());
        capture.set_up(SessionPreset::default()).unwrap();
        assert!(capture.preview_layer().is_some());
    }

    #[test]
    fn test_fps_clamped() {
        let mut capture = PatternCapture::new();
        capture.set_fps(0);
        assert_eq!(capture.fps(), 1);
        capture.set_fps(5);
        assert_eq!(capture.fps(), 5);
    }
}
