/// 检测系统数据结构定义
/// Data structures for the live detection overlay
use serde::{Deserialize, Serialize};

use crate::input::VideoTexture;

// ========== 公共常量 ==========

/// 网络输入尺寸 (416x416 正方形坐标空间)
pub const INF_SIZE: u32 = 416;

/// 同时在途的命令缓冲数量 (三重缓冲)
pub const MAX_BUFFERS_IN_FLIGHT: usize = 3;

/// 屏幕上最多同时显示的检测框数量
pub const MAX_DETECTIONS: usize = 10;

/// 低于此置信度的检测结果不显示
pub const CONFIDENCE_THRESHOLD: f32 = 0.7;

// ========== 数据结构 ==========

/// 轴对齐矩形 (Axis-aligned rectangle)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// 宽高均为正才可绘制
    pub fn is_drawable(&self) -> bool {
        self.width >= 1.0 && self.height >= 1.0
    }
}

/// 单个检测结果 (One network output)
///
/// `rect` 位于 416x416 网络输入坐标系中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_index: usize,
    pub score: f32,
    pub rect: Rect,
}

impl Detection {
    pub fn new(class_index: usize, score: f32, rect: Rect) -> Self {
        Self {
            class_index,
            score,
            rect,
        }
    }
}

/// 推理结果 (推理线程 → 主线程)
#[derive(Clone, Debug)]
pub struct PredictionResult {
    pub detections: Vec<Detection>,
    pub debug_image: Option<VideoTexture>, // 调试可视化图像 (可选)
    pub elapsed: f64,                      // 处理耗时 (秒)
}

impl PredictionResult {
    /// 根据耗时换算的帧率, 耗时为0时返回0
    pub fn fps(&self) -> f64 {
        if self.elapsed > 0.0 {
            1.0 / self.elapsed
        } else {
            0.0
        }
    }
}
