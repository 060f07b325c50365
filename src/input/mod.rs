/// 视频输入系统 (Video Input System)
///
/// 独立采集线程, 按目标帧率产生视频帧并回调给代理 (delegate)
/// - PatternCapture: 测试图案生成器 (无需硬件)
/// - FolderCapture:  图片目录回放
/// - PreviewLayer:   预览层句柄, 始终持有最新一帧
pub mod capture_loop;
pub mod folder;
pub mod pattern;

pub use folder::FolderCapture;
pub use pattern::PatternCapture;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Result};
use image::RgbaImage;

use crate::detection::types::Rect;

/// 采集帧 (GPU 纹理的替身): 共享的 RGBA 图像, clone 只增加引用计数
#[derive(Clone)]
pub struct VideoTexture {
    image: Arc<RgbaImage>,
}

impl VideoTexture {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl fmt::Debug for VideoTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoTexture")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// 采集分辨率预设, 形如 "640x480"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPreset {
    pub width: u32,
    pub height: u32,
}

impl SessionPreset {
    pub const VGA_640X480: SessionPreset = SessionPreset {
        width: 640,
        height: 480,
    };
}

impl Default for SessionPreset {
    fn default() -> Self {
        Self::VGA_640X480
    }
}

impl FromStr for SessionPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow!("invalid session preset `{}`, expected WxH", s))?;
        let width: u32 = w.trim().parse()?;
        let height: u32 = h.trim().parse()?;
        if width == 0 || height == 0 {
            return Err(anyhow!("session preset `{}` has a zero dimension", s));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for SessionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 预览层 (Preview layer)
///
/// 采集线程每帧写入最新纹理; UI 通过 `set_frame` 调整其在屏幕上的位置
#[derive(Clone, Default)]
pub struct PreviewLayer {
    frame: Arc<Mutex<Rect>>,
    latest: Arc<Mutex<Option<VideoTexture>>>,
}

impl PreviewLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Rect {
        *lock(&self.frame)
    }

    pub fn set_frame(&self, frame: Rect) {
        *lock(&self.frame) = frame;
    }

    pub fn latest(&self) -> Option<VideoTexture> {
        lock(&self.latest).clone()
    }

    pub(crate) fn present(&self, texture: VideoTexture) {
        *lock(&self.latest) = Some(texture);
    }
}

/// 采集回调 (在采集线程上执行)
pub trait VideoCaptureDelegate: Send + Sync {
    fn did_capture_video_texture(&self, texture: Option<VideoTexture>, timestamp: Duration);

    /// 拍照回调, 默认忽略
    fn did_capture_photo_texture(
        &self,
        _texture: Option<VideoTexture>,
        _preview_image: Option<RgbaImage>,
    ) {
    }
}

/// 视频采集接口 (Frame source)
pub trait VideoCapture: Send {
    /// 初始化采集会话, 可能耗时, 由启动流程在后台线程调用
    fn set_up(&mut self, preset: SessionPreset) -> Result<()>;

    fn set_delegate(&mut self, delegate: Arc<dyn VideoCaptureDelegate>);

    /// 目标帧率, 最小为 1
    fn set_fps(&mut self, fps: u32);

    fn fps(&self) -> u32;

    /// 会话初始化成功后才有预览层
    fn preview_layer(&self) -> Option<PreviewLayer>;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset() {
        let p: SessionPreset = "640x480".parse().unwrap();
        assert_eq!(p, SessionPreset::VGA_640X480);
        let p: SessionPreset = " 1280X720 ".parse().unwrap();
        assert_eq!((p.width, p.height), (1280, 720));
        assert_eq!(p.to_string(), "1280x720");
    }

    #[test]
    fn test_parse_preset_rejects_garbage() {
        assert!("640".parse::<SessionPreset>().is_err());
        assert!("0x480".parse::<SessionPreset>().is_err());
        assert!("axb".parse::<SessionPreset>().is_err());
    }

    #[test]
    fn test_preview_layer_shared() {
        let layer = PreviewLayer::new();
        let handle = layer.clone();
        handle.set_frame(Rect::new(0.0, 0.0, 375.0, 667.0));
        assert_eq!(layer.frame(), Rect::new(0.0, 0.0, 375.0, 667.0));

        assert!(layer.latest().is_none());
        handle.present(VideoTexture::new(RgbaImage::new(4, 3)));
        let latest = layer.latest().unwrap();
        assert_eq!((latest.width(), latest.height()), (4, 3));
    }
}
