/// 界面系统 (UI System)
///
/// 所有界面状态只在主线程上修改
/// - ViewState:            视图状态 (预览层、检测框、耗时文字、调试图像、精灵)
/// - CameraViewController: 生命周期与采集/推理协调
/// - OverlayCanvas:        软件合成画面
/// - Sprite:               装饰动画
pub mod canvas;
pub mod controller;
pub mod sprite;

pub use canvas::OverlayCanvas;
pub use controller::CameraViewController;
pub use sprite::Sprite;

use crate::detection::overlay::{DetectionOverlay, RenderOptions, ViewSize};
use crate::detection::palette::Palette;
use crate::detection::types::PredictionResult;
use crate::input::{PreviewLayer, VideoTexture};

/// 耗时文字: "Elapsed {秒:.5} seconds ({帧率:.2} FPS)"
pub fn format_time_label(result: &PredictionResult) -> String {
    format!(
        "Elapsed {:.5} seconds ({:.2} FPS)",
        result.elapsed,
        result.fps()
    )
}

/// 视图状态
pub struct ViewState {
    pub view: ViewSize,
    pub preview_layer: Option<PreviewLayer>,
    pub overlay: DetectionOverlay,
    pub overlays_attached: bool, // 检测框已加到预览层之上
    pub time_label: String,
    pub debug_image: Option<VideoTexture>,
    pub sprite: Option<Sprite>,
    pub results_shown: u64,
}

impl ViewState {
    pub fn new(view: ViewSize, options: RenderOptions) -> Self {
        Self {
            view,
            preview_layer: None,
            overlay: DetectionOverlay::new(options),
            overlays_attached: false,
            time_label: String::new(),
            debug_image: None,
            sprite: None,
            results_shown: 0,
        }
    }

    /// 推理完成回调 (主线程)
    pub fn show_result(&mut self, result: PredictionResult, palette: &Palette) {
        self.overlay.show(&result.detections, self.view, palette);
        self.time_label = format_time_label(&result);
        if let Some(debug) = result.debug_image {
            self.debug_image = Some(debug);
        }
        self.results_shown += 1;
    }

    /// 视图尺寸变化: 预览层铺满视图
    pub fn layout(&mut self, view: ViewSize) {
        self.view = view;
        self.resize_preview_layer();
        if let Some(sprite) = &mut self.sprite {
            sprite.resize(view.width);
        }
    }

    pub fn resize_preview_layer(&self) {
        if let Some(layer) = &self.preview_layer {
            layer.set_frame(self.view.bounds());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{Detection, Rect};
    use image::RgbaImage;

    fn timed(elapsed: f64) -> PredictionResult {
        PredictionResult {
            detections: vec![],
            debug_image: None,
            elapsed,
        }
    }

    #[test]
    fn test_time_label() {
        assert_eq!(
            format_time_label(&timed(0.25)),
            "Elapsed 0.25000 seconds (4.00 FPS)"
        );
        assert_eq!(
            format_time_label(&timed(0.033)),
            "Elapsed 0.03300 seconds (30.30 FPS)"
        );
        assert_eq!(
            format_time_label(&timed(0.0)),
            "Elapsed 0.00000 seconds (0.00 FPS)"
        );
    }

    #[test]
    fn test_show_result_updates_everything() {
        let palette = Palette::generate();
        let view = ViewSize::new(375.0, 667.0);
        let mut state = ViewState::new(view, RenderOptions::default());
        state.show_result(
            PredictionResult {
                detections: vec![Detection::new(14, 0.8, Rect::new(10.0, 10.0, 30.0, 60.0))],
                debug_image: Some(VideoTexture::new(RgbaImage::new(4, 4))),
                elapsed: 0.5,
            },
            &palette,
        );
        assert_eq!(state.overlay.shown_count(), 1);
        assert!(state.debug_image.is_some());
        assert_eq!(state.time_label, "Elapsed 0.50000 seconds (2.00 FPS)");
        assert_eq!(state.results_shown, 1);

        // 没有调试图像时保留上一张
        state.show_result(
            PredictionResult {
                detections: vec![],
                debug_image: None,
                elapsed: 0.5,
            },
            &palette,
        );
        assert!(state.debug_image.is_some());
        assert_eq!(state.overlay.shown_count(), 0);
    }

    #[test]
    fn test_layout_resizes_preview_and_sprite() {
        let view = ViewSize::new(375.0, 667.0);
        let mut state = ViewState::new(view, RenderOptions::default());
        let layer = PreviewLayer::new();
        state.preview_layer = Some(layer.clone());
        state.sprite = Some(Sprite::new(375.0));

        state.layout(ViewSize::new(400.0, 800.0));
        assert_eq!(layer.frame(), Rect::new(0.0, 0.0, 400.0, 800.0));
        assert_eq!(state.sprite.as_ref().unwrap().segment_width(), 100.0);
    }
}
