//! 软件画布: 把预览帧、检测框、标签、耗时文字、调试图像和精灵合成为一张 RGBA 图像

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect as PixelRect;

use super::sprite::Sprite;
use super::ViewState;
use crate::detection::overlay::OverlaySlot;
use crate::detection::palette::Color;
use crate::detection::types::Rect;
use crate::gen_time_string;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LINE_WIDTH: i32 = 4;
const LABEL_SCALE: f32 = 13.0;
const TIME_LABEL_SCALE: f32 = 15.0;
const DEBUG_IMAGE_SIZE: u32 = 96;

pub struct OverlayCanvas {
    font: Option<FontVec>,
}

impl OverlayCanvas {
    /// 不带字体的画布只画框, 不画文字
    pub fn new() -> Self {
        Self { font: None }
    }

    pub fn with_font_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font {}", path.display()))?;
        let font = FontVec::try_from_vec(bytes)
            .with_context(|| format!("Invalid font file {}", path.display()))?;
        tracing::info!("✅ 字体加载成功: {}", path.display());
        Ok(Self { font: Some(font) })
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// 合成当前画面
    pub fn compose(&self, state: &ViewState) -> RgbaImage {
        let width = state.view.width.round().max(1.0) as u32;
        let height = state.view.height.round().max(1.0) as u32;
        let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

        if let Some(layer) = &state.preview_layer {
            if let Some(texture) = layer.latest() {
                Self::draw_aspect_fit(&mut canvas, texture.image(), layer.frame());
            }
        }

        if state.overlays_attached {
            for slot in state.overlay.slots() {
                if let OverlaySlot::Shown {
                    frame,
                    label,
                    color,
                } = slot
                {
                    self.draw_bounding_box(&mut canvas, *frame, label, *color);
                }
            }
        }

        if let Some(debug) = &state.debug_image {
            let thumb = imageops::resize(
                debug.image(),
                DEBUG_IMAGE_SIZE,
                DEBUG_IMAGE_SIZE,
                FilterType::Nearest,
            );
            let x = i64::from(width.saturating_sub(DEBUG_IMAGE_SIZE + 8));
            let y = i64::from(height.saturating_sub(DEBUG_IMAGE_SIZE + 8));
            imageops::overlay(&mut canvas, &thumb, x, y);
        }

        if let Some(font) = &self.font {
            if !state.time_label.is_empty() {
                let y = height.saturating_sub(24) as i32;
                draw_text_mut(
                    &mut canvas,
                    Color::WHITE.to_rgba8(),
                    8,
                    y,
                    PxScale::from(TIME_LABEL_SCALE),
                    font,
                    &state.time_label,
                );
            }
        }

        if let Some(sprite) = &state.sprite {
            Self::draw_sprite(&mut canvas, sprite);
        }

        canvas
    }

    /// 保存快照到目录, 文件名为时间戳
    pub fn save_snapshot(&self, state: &ViewState, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        let path = dir.join(format!("{}.png", gen_time_string("-")));
        self.compose(state)
            .save(&path)
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
        Ok(path)
    }

    /// 保持宽高比缩放到目标区域并居中
    fn draw_aspect_fit(canvas: &mut RgbaImage, image: &RgbaImage, frame: Rect) {
        let (iw, ih) = (image.width() as f32, image.height() as f32);
        if iw <= 0.0 || ih <= 0.0 || !frame.is_drawable() {
            return;
        }
        let scale = (frame.width / iw).min(frame.height / ih);
        let w = (iw * scale).round().max(1.0) as u32;
        let h = (ih * scale).round().max(1.0) as u32;
        let x = frame.x + (frame.width - w as f32) / 2.0;
        let y = frame.y + (frame.height - h as f32) / 2.0;
        let scaled = imageops::resize(image, w, h, FilterType::Triangle);
        imageops::overlay(canvas, &scaled, x.round() as i64, y.round() as i64);
    }

    fn draw_bounding_box(&self, canvas: &mut RgbaImage, frame: Rect, label: &str, color: Color) {
        let rgba = color.to_rgba8();
        let Some(outer) = to_pixel_rect(frame) else {
            return;
        };

        // 线宽: 向内逐像素收缩绘制
        for inset in 0..LINE_WIDTH {
            let rect = Rect::new(
                frame.x + inset as f32,
                frame.y + inset as f32,
                frame.width - 2.0 * inset as f32,
                frame.height - 2.0 * inset as f32,
            );
            match to_pixel_rect(rect) {
                Some(r) => draw_hollow_rect_mut(canvas, r, rgba),
                None => break,
            }
        }

        let Some(font) = &self.font else {
            return;
        };
        let scale = PxScale::from(LABEL_SCALE);
        let (tw, th) = text_size(scale, font, label);
        let bg_h = th + 4;
        let bg_y = (outer.top() - bg_h as i32).max(0);
        let background = PixelRect::at(outer.left(), bg_y).of_size(tw + 8, bg_h);
        draw_filled_rect_mut(canvas, background, rgba);
        draw_text_mut(
            canvas,
            Color::WHITE.to_rgba8(),
            outer.left() + 4,
            bg_y + 2,
            scale,
            font,
            label,
        );
    }

    fn draw_sprite(canvas: &mut RgbaImage, sprite: &Sprite) {
        let mut points: Vec<Point<i32>> = sprite
            .body_polygon()
            .into_iter()
            .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32))
            .collect();
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return;
        }
        draw_polygon_mut(canvas, &points, sprite.color.to_rgba8());

        let eye = sprite.eye();
        let eye_rect = Rect::new(eye.x, eye.y, eye.width.max(1.0), eye.height.max(1.0));
        if let Some(r) = to_pixel_rect(eye_rect) {
            draw_filled_rect_mut(canvas, r, Color::BLACK.to_rgba8());
        }
    }
}

impl Default for OverlayCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn to_pixel_rect(rect: Rect) -> Option<PixelRect> {
    if !rect.is_drawable() {
        return None;
    }
    Some(
        PixelRect::at(rect.x.round() as i32, rect.y.round() as i32)
            .of_size(rect.width.round() as u32, rect.height.round() as u32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::overlay::{DetectionOverlay, RenderOptions, ViewSize};
    use crate::detection::palette::Palette;
    use crate::detection::types::Detection;
    use crate::input::{PreviewLayer, VideoTexture};

    fn state() -> ViewState {
        ViewState::new(ViewSize::new(200.0, 300.0), RenderOptions::default())
    }

    #[test]
    fn test_canvas_matches_view() {
        let canvas = OverlayCanvas::new();
        let img = canvas.compose(&state());
        assert_eq!(img.dimensions(), (200, 300));
        assert_eq!(img.get_pixel(0, 0), &BACKGROUND);
    }

    #[test]
    fn test_preview_letterboxed() {
        let mut state = state();
        let layer = PreviewLayer::new();
        layer.set_frame(state.view.bounds());
        layer.present(VideoTexture::new(RgbaImage::from_pixel(
            64,
            48,
            Rgba([10, 200, 10, 255]),
        )));
        state.preview_layer = Some(layer);

        let img = OverlayCanvas::new().compose(&state);
        // 4:3 画面在 200x300 视图中: 高 150, 上边距 75
        assert_eq!(img.get_pixel(100, 10), &BACKGROUND);
        assert_eq!(img.get_pixel(100, 150), &Rgba([10, 200, 10, 255]));
        assert_eq!(img.get_pixel(100, 290), &BACKGROUND);
    }

    #[test]
    fn test_shown_slot_drawn_only_when_attached() {
        let mut state = state();
        let palette = Palette::generate();
        let mut overlay = DetectionOverlay::new(RenderOptions::default());
        overlay.show(
            &[Detection::new(0, 0.9, Rect::new(0.0, 0.0, 208.0, 208.0))],
            state.view,
            &palette,
        );
        state.overlay = overlay;
        state.sprite = None;

        let expected = palette.get(0).unwrap().to_rgba8();
        let OverlaySlot::Shown { frame, .. } = state.overlay.slots()[0].clone() else {
            panic!("slot 0 should be shown");
        };
        let (x, y) = (frame.x.round() as u32 + 1, frame.y.round() as u32 + 1);

        let img = OverlayCanvas::new().compose(&state);
        assert_eq!(img.get_pixel(x, y), &BACKGROUND);

        state.overlays_attached = true;
        let img = OverlayCanvas::new().compose(&state);
        assert_eq!(img.get_pixel(x, y), &expected);
    }

    #[test]
    fn test_sprite_drawn() {
        let mut state = state();
        let sprite = Sprite::new(state.view.width);
        let frame = sprite.frame();
        state.sprite = Some(sprite);
        let img = OverlayCanvas::new().compose(&state);
        let yellow = Color::YELLOW.to_rgba8();
        let mut found = false;
        for y in frame.y as u32..frame.max_y() as u32 {
            for x in frame.x.max(0.0) as u32..frame.max_x() as u32 {
                found |= img.get_pixel(x, y) == &yellow;
            }
        }
        assert!(found);
    }

    #[test]
    fn test_save_snapshot() {
        let dir_name = format!("yolo-camera-snapshot-{}", std::process::id());
        let dir = std::env::temp_dir().join(dir_name);
        let _ = std::fs::remove_dir_all(&dir);

        let path = OverlayCanvas::new().save_snapshot(&state(), &dir).unwrap();
        assert!(path.exists());
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap();
        assert!(stem.split('-').all(|p| p.chars().all(|c| c.is_ascii_digit())));

        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (200, 300));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_font_is_error() {
        assert!(OverlayCanvas::with_font_file(Path::new("/nonexistent/font.ttf")).is_err());
    }
}
