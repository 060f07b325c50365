//! 摄像头视图控制器 (Camera View Controller)
//!
//! 启动流程:
//! 1. 前置检查 (设备 / 推理加速), 失败即终止
//! 2. 采集初始化与网络构建并行进行, 两者都完成后
//! 3. 把检测框加到预览层之上, 设置采集回调并开始采集
//!
//! 运行时: 采集线程 → 节流 → 推理线程 → 主线程队列 → 刷新检测框

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};

use super::{Sprite, ViewState};
use crate::detection::overlay::ViewSize;
use crate::detection::palette::{Palette, PALETTE};
use crate::detection::runner::Runner;
use crate::detection::throttle::{CaptureThrottle, InflightPermit};
use crate::device::{check_preconditions, Device, DeviceSource};
use crate::dispatch::{MainQueue, QueueHandle};
use crate::input::{SessionPreset, VideoCapture, VideoCaptureDelegate, VideoTexture};
use crate::models::SharedPredictor;
use crate::ui_config::AppConfig;

/// 采集回调: 在采集线程上执行
struct FrameHandler {
    throttle: CaptureThrottle,
    runner: Arc<Runner>,
    network: SharedPredictor,
    queue: QueueHandle<ViewState>,
    palette: &'static Palette,
}

impl FrameHandler {
    // 每次预测都会触发一次主线程刷新; 节流保证推理不会比主线程处理得更快
    fn predict(&self, texture: VideoTexture, permit: InflightPermit) {
        let palette = self.palette;
        self.runner.predict(
            &self.network,
            texture,
            &self.queue,
            move |state: &mut ViewState, result| {
                state.show_result(result, palette);
                drop(permit);
            },
        );
    }
}

impl VideoCaptureDelegate for FrameHandler {
    fn did_capture_video_texture(&self, texture: Option<VideoTexture>, _timestamp: Duration) {
        let Some(texture) = texture else {
            return;
        };
        if let Some(permit) = self.throttle.try_acquire() {
            self.predict(texture, permit);
        }
    }
}

pub struct CameraViewController {
    config: AppConfig,
    state: ViewState,
    queue: MainQueue<ViewState>,
    throttle: CaptureThrottle,
    device: Option<Device>,
    runner: Option<Arc<Runner>>,
    network: Option<SharedPredictor>,
    capture: Option<Box<dyn VideoCapture>>,
}

impl CameraViewController {
    pub fn new(config: AppConfig) -> Self {
        let state = ViewState::new(config.view_size(), config.render_options());
        Self {
            config,
            state,
            queue: MainQueue::new(),
            throttle: CaptureThrottle::new(),
            device: None,
            runner: None,
            network: None,
            capture: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn device(&self) -> Option<&Device> {
        self.device.as_ref()
    }

    pub fn runner(&self) -> Option<&Runner> {
        self.runner.as_deref()
    }

    pub fn is_inference_in_flight(&self) -> bool {
        self.throttle.is_busy()
    }

    /// 视图加载: 前置检查 → 并行初始化采集与网络 → 开始采集
    ///
    /// `build_network` 在后台线程执行 (加载参数可能需要数秒)
    pub fn view_did_load<F>(
        &mut self,
        devices: &dyn DeviceSource,
        mut capture: Box<dyn VideoCapture>,
        build_network: F,
    ) -> Result<()>
    where
        F: FnOnce(&Device, usize) -> Result<SharedPredictor> + Send,
    {
        self.state.time_label.clear();

        let device = check_preconditions(devices).map_err(|e| {
            tracing::error!("❌ Error: {}", e);
            anyhow!(e)
        })?;
        tracing::info!("✅ 计算设备: {}", device.name());

        let palette: &'static Palette = &PALETTE;
        let inflight_buffers = self.config.inflight_buffers;
        let runner = Arc::new(Runner::new(device.clone(), inflight_buffers)?);

        capture.set_fps(self.config.fps);
        let preset: SessionPreset = self
            .config
            .session_preset
            .parse()
            .context("Invalid session_preset in config")?;

        // ========== 启动组: 采集初始化 + 网络构建 ==========
        let (capture_ready, network) = std::thread::scope(|s| {
            let camera = s.spawn(|| {
                let ready = capture.set_up(preset);
                (capture, ready)
            });
            let net = s.spawn(|| {
                let start = Instant::now();
                let network = build_network(&device, inflight_buffers);
                tracing::info!(
                    "⏱️ Setting up neural network: {:.3}s",
                    start.elapsed().as_secs_f64()
                );
                network
            });
            (camera.join(), net.join())
        });

        let (mut capture, ready) =
            capture_ready.map_err(|_| anyhow!("camera setup thread panicked"))?;
        let network = network.map_err(|_| anyhow!("network setup thread panicked"))??;
        ready.context("Failed to set up video capture")?;

        // 预览层加入界面
        if let Some(layer) = capture.preview_layer() {
            self.state.preview_layer = Some(layer);
            self.state.resize_preview_layer();
        }

        // 检测框加到预览层之上
        self.state.overlays_attached = true;

        capture.set_delegate(Arc::new(FrameHandler {
            throttle: self.throttle.clone(),
            runner: runner.clone(),
            network: network.clone(),
            queue: self.queue.handle(),
            palette,
        }));
        capture.start()?;
        tracing::info!("✅ 系统就绪,开始采集 ({}fps)", capture.fps());

        if self.config.sprite_enabled {
            self.state.sprite = Some(Sprite::new(self.state.view.width));
        }

        self.device = Some(device);
        self.runner = Some(runner);
        self.network = Some(network);
        self.capture = Some(capture);
        Ok(())
    }

    pub fn view_will_layout_subviews(&mut self, view: ViewSize) {
        self.state.layout(view);
    }

    pub fn view_did_appear(&mut self) {
        if let Some(sprite) = &mut self.state.sprite {
            sprite.start();
        }
    }

    pub fn did_receive_memory_warning(&self) {
        tracing::warn!("⚠️ did_receive_memory_warning");
    }

    /// 动画节拍
    pub fn animation_tick(&mut self) {
        if let Some(sprite) = &mut self.state.sprite {
            sprite.step();
        }
    }

    /// 执行主线程上所有待处理的任务
    pub fn pump(&mut self) -> usize {
        self.queue.pump(&mut self.state)
    }

    /// 阻塞处理主线程任务直到截止时间
    pub fn run_until(&mut self, deadline: Instant) -> usize {
        self.queue.run_until(&mut self.state, deadline)
    }

    /// 停止采集. 已提交的推理仍会完成, 其结果留在队列中
    pub fn shutdown(&mut self) {
        if let Some(capture) = &mut self.capture {
            capture.stop();
            tracing::info!("🛑 采集已停止");
        }
    }
}

impl Drop for CameraViewController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
