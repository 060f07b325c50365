//! 采集线程公共实现: 按帧率节拍产生帧 → 更新预览层 → 回调代理

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use image::RgbaImage;

use super::{PreviewLayer, VideoCaptureDelegate, VideoTexture};

/// 帧生产者: 输入帧序号, 返回一帧图像; 返回 None 表示输入结束
pub type FrameProducer = Box<dyn FnMut(u64) -> Result<Option<RgbaImage>> + Send>;

/// 可启停的采集线程
pub struct CaptureLoop {
    name: &'static str,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureLoop {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn start(
        &mut self,
        fps: u32,
        preview: PreviewLayer,
        delegate: Option<Arc<dyn VideoCaptureDelegate>>,
        mut producer: FrameProducer,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("{} capture already started", self.name);
        }
        let interval = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        let running = self.running.clone();
        running.store(true, Ordering::Release);
        let name = self.name;

        let handle = std::thread::Builder::new()
            .name(format!("capture-{}", name))
            .spawn(move || {
                tracing::info!("📹 采集线程启动: {} ({}fps)", name, fps.max(1));
                let started = Instant::now();
                let mut next_tick = started;
                let mut frame_index: u64 = 0;

                while running.load(Ordering::Acquire) {
                    let image = match producer(frame_index) {
                        Ok(Some(image)) => image,
                        Ok(None) => {
                            tracing::info!("📹 输入结束: {} 共 {} 帧", name, frame_index);
                            break;
                        }
                        Err(e) => {
                            tracing::error!("❌ 采集失败: {:#}", e);
                            break;
                        }
                    };
                    frame_index += 1;

                    let texture = VideoTexture::new(image);
                    preview.present(texture.clone());
                    if let Some(delegate) = &delegate {
                        delegate.did_capture_video_texture(Some(texture), started.elapsed());
                    }

                    next_tick += interval;
                    let now = Instant::now();
                    if next_tick > now {
                        std::thread::sleep(next_tick - now);
                    } else {
                        // 落后于节拍时不追帧
                        next_tick = now;
                    }
                }

                running.store(false, Ordering::Release);
                tracing::info!("📹 采集线程退出: {}", name);
            })?;

        self.handle = Some(handle);
        Ok(())
    }

    /// 停止并等待采集线程退出
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("❌ 采集线程异常退出: {}", self.name);
            }
        }
    }

    /// 等待输入自然结束 (用于有限帧数的输入源)
    pub fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
