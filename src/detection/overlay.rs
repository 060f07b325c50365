//! 检测框渲染 (Detection Renderer)
//! 职责: 网络坐标 (416x416) → 屏幕坐标, 更新固定数量的可复用检测框
//!
//! 预览区域与视图等宽, 宽高比 4:3, 在视图中垂直居中 (上下留黑边).

use std::str::FromStr;

use anyhow::{anyhow, ensure};

use super::labels;
use super::palette::{Color, Palette};
use super::types::{Detection, Rect, CONFIDENCE_THRESHOLD, INF_SIZE, MAX_DETECTIONS};

/// 视图尺寸 (屏幕坐标, 点)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
    pub width: f32,
    pub height: f32,
}

impl ViewSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// 形如 "375x667"
impl FromStr for ViewSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow!("invalid view size `{}`, expected WxH", s))?;
        let width: f32 = w.trim().parse()?;
        let height: f32 = h.trim().parse()?;
        ensure!(
            width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0,
            "view size `{}` must be positive",
            s
        );
        Ok(Self::new(width, height))
    }
}

/// 网络坐标到屏幕坐标的仿射变换
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale_x: f32,
    pub scale_y: f32,
    pub top: f32,
}

impl Letterbox {
    pub fn for_view(view: ViewSize) -> Self {
        Self::with_input_size(view, INF_SIZE)
    }

    pub fn with_input_size(view: ViewSize, input_size: u32) -> Self {
        let width = view.width;
        let height = width * 3.0 / 4.0;
        let input = input_size as f32;
        Self {
            scale_x: width / input,
            scale_y: height / input,
            top: (view.height - height) / 2.0,
        }
    }

    /// 4:3 预览区域在视图中的位置
    pub fn display_rect(&self, view: ViewSize) -> Rect {
        Rect::new(0.0, self.top, view.width, view.width * 3.0 / 4.0)
    }

    pub fn apply(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.scale_x,
            rect.y * self.scale_y + self.top,
            rect.width * self.scale_x,
            rect.height * self.scale_y,
        )
    }
}

/// 检测框标签: "{类别名} {置信度百分比:.1}"
pub fn format_label(class_name: &str, score: f32) -> String {
    format!("{} {:.1}", class_name, score * 100.0)
}

/// 一个可复用的检测框控件状态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OverlaySlot {
    #[default]
    Hidden,
    Shown {
        frame: Rect,
        label: String,
        color: Color,
    },
}

impl OverlaySlot {
    pub fn show(&mut self, frame: Rect, label: String, color: Color) {
        *self = OverlaySlot::Shown {
            frame,
            label,
            color,
        };
    }

    pub fn hide(&mut self) {
        *self = OverlaySlot::Hidden;
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, OverlaySlot::Shown { .. })
    }
}

/// 渲染参数 (阈值与容量可由配置调整)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub confidence_threshold: f32,
    pub max_detections: usize,
    pub input_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: CONFIDENCE_THRESHOLD,
            max_detections: MAX_DETECTIONS,
            input_size: INF_SIZE,
        }
    }
}

/// 固定数量的检测框, 每次推理结果到达时整体刷新
pub struct DetectionOverlay {
    slots: Vec<OverlaySlot>,
    options: RenderOptions,
}

impl DetectionOverlay {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            slots: vec![OverlaySlot::Hidden; options.max_detections],
            options,
        }
    }

    pub fn slots(&self) -> &[OverlaySlot] {
        &self.slots
    }

    pub fn shown_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_shown()).count()
    }

    /// 用一次推理的结果刷新所有检测框
    ///
    /// 第 i 个检测结果对应第 i 个检测框. 超出容量的结果被丢弃;
    /// 没有对应结果的检测框隐藏; 置信度低于阈值的结果不更新其检测框.
    pub fn show(&mut self, detections: &[Detection], view: ViewSize, palette: &Palette) {
        let letterbox = Letterbox::with_input_size(view, self.options.input_size);

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let Some(detection) = detections.get(i) else {
                slot.hide();
                continue;
            };

            if detection.score < self.options.confidence_threshold {
                continue;
            }

            let (Some(name), Some(color)) = (
                labels::label(detection.class_index),
                palette.get(detection.class_index),
            ) else {
                tracing::warn!("⚠️ 未知类别索引: {}", detection.class_index);
                continue;
            };

            let label = format_label(name, detection.score);
            tracing::debug!("🎯 {}", label);
            slot.show(letterbox.apply(detection.rect), label, color);
        }
    }
}
