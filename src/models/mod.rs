// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 预测器统一接口与实现
//!
//! # 架构说明
//!
//! 推理引擎本身不在本 crate 内, 这里只定义调用约定 (Predictor trait)
//! 以及两个无需模型文件即可运行的实现:
//! - **RandomPredictor**: 按种子生成随机检测框, 带可配置的模拟耗时
//!   - 文件: `random.rs`
//! - **ReplayPredictor**: 从 JSON 文件逐帧回放预先录制的检测结果
//!   - 文件: `replay.rs`
//!
//! ## 使用示例
//! ```no_run
//! use yolo_camera_rs::device::{check_preconditions, SystemDevices};
//! use yolo_camera_rs::models::{create_predictor, PredictorOptions, PredictorSource};
//!
//! let device = check_preconditions(&SystemDevices)?;
//! let options = PredictorOptions::default();
//! let _network = create_predictor(&PredictorSource::from_arg("random"), &device, 3, &options)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use image::imageops::{self, FilterType};

use crate::detection::types::{Detection, INF_SIZE};
use crate::device::Device;
use crate::input::VideoTexture;

pub mod random;
pub mod replay;

pub use random::RandomPredictor;
pub use replay::ReplayPredictor;

/// 单次预测输出 (耗时由 Runner 统计)
#[derive(Debug, Clone, Default)]
pub struct Prediction {
    pub detections: Vec<Detection>,
    pub debug_image: Option<VideoTexture>,
}

/// 预测器接口 (Predictor)
///
/// 实现者构造时接收设备句柄与在途缓冲数量;
/// `predict` 可以阻塞调用线程 (由 Runner 的工作线程承担)
pub trait Predictor: Send {
    /// 对一帧执行检测, 坐标位于 416x416 网络输入空间
    fn predict(&mut self, texture: &VideoTexture) -> Result<Prediction>;

    /// 打印模型信息
    fn summary(&self);

    fn name(&self) -> &str;
}

/// 在主线程与推理线程间共享的预测器
pub type SharedPredictor = Arc<Mutex<Box<dyn Predictor>>>;

/// 预测器来源 (命令行参数解析结果)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictorSource {
    Random,
    Replay(PathBuf),
}

impl PredictorSource {
    /// "random" 或 JSON 文件路径
    pub fn from_arg(arg: &str) -> Self {
        if arg.eq_ignore_ascii_case("random") {
            PredictorSource::Random
        } else {
            PredictorSource::Replay(PathBuf::from(arg))
        }
    }
}

/// 预测器构造参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorOptions {
    pub seed: u64,          // 随机预测器种子
    pub debug_images: bool, // 输出调试图像
    pub latency: Duration,  // 随机预测器模拟耗时
}

impl Default for PredictorOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            debug_images: false,
            latency: Duration::ZERO,
        }
    }
}

/// 调试图像: 缩放到网络输入尺寸的输入帧
pub fn debug_image(texture: &VideoTexture) -> VideoTexture {
    VideoTexture::new(imageops::resize(
        texture.image(),
        INF_SIZE,
        INF_SIZE,
        FilterType::Nearest,
    ))
}

/// 按来源创建预测器
pub fn create_predictor(
    source: &PredictorSource,
    device: &Device,
    inflight_buffers: usize,
    options: &PredictorOptions,
) -> Result<SharedPredictor> {
    let predictor: Box<dyn Predictor> = match source {
        PredictorSource::Random => Box::new(
            RandomPredictor::new(device, inflight_buffers, options.seed)
                .with_latency(options.latency)
                .with_debug_images(options.debug_images),
        ),
        PredictorSource::Replay(path) => Box::new(
            ReplayPredictor::load(device, inflight_buffers, path)?
                .with_debug_images(options.debug_images),
        ),
    };
    predictor.summary();
    Ok(Arc::new(Mutex::new(predictor)))
}
