//! 装饰动画: 一个在屏幕上方逐段前进的像素吃豆人

use crate::detection::palette::Color;
use crate::detection::types::Rect;

/// 精灵边长
pub const SPRITE_SIZE: f32 = 25.0;
/// 精灵所在高度
pub const SPRITE_Y: f32 = 100.0;

/// 身体轮廓 (原始设计坐标, 约 35x35 的像素画)
const BODY_OUTLINE: [(f32, f32); 40] = [
    (61.47, 0.41),
    (61.47, 3.04),
    (64.25, 3.04),
    (64.25, 5.93),
    (67.3, 5.93),
    (67.3, 8.56),
    (61.47, 8.56),
    (61.47, 11.34),
    (56.18, 11.34),
    (56.18, 13.75),
    (50.47, 13.75),
    (50.47, 16.53),
    (47.75, 16.48),
    (47.75, 19.31),
    (50.47, 19.15),
    (50.47, 21.87),
    (56.18, 21.87),
    (56.18, 24.65),
    (61.47, 24.65),
    (61.47, 27.37),
    (67.3, 27.37),
    (67.3, 30.0),
    (64.25, 30.0),
    (64.25, 32.78),
    (61.47, 32.78),
    (61.47, 35.56),
    (40.6, 35.61),
    (40.6, 32.78),
    (37.66, 32.78),
    (37.66, 30.25),
    (35.34, 30.25),
    (35.34, 27.48),
    (32.4, 27.48),
    (32.4, 8.96),
    (35.34, 8.96),
    (35.34, 6.23),
    (37.66, 6.23),
    (37.66, 3.1),
    (40.6, 3.1),
    (40.6, 0.41),
];

/// 眼睛 (原始设计坐标)
const EYE: Rect = Rect {
    x: 47.65,
    y: 5.69,
    width: 2.82,
    height: 2.72,
};

const DESIGN_ORIGIN: (f32, f32) = (32.4, 0.41);
const DESIGN_EXTENT: f32 = 35.2;

pub struct Sprite {
    view_width: f32,
    frame: Rect,
    animating: bool,
    pub color: Color,
}

impl Sprite {
    pub fn new(view_width: f32) -> Self {
        let mut sprite = Self {
            view_width,
            frame: Rect::default(),
            animating: false,
            color: Color::YELLOW,
        };
        sprite.frame = Rect::new(sprite.initial_offset(), SPRITE_Y, SPRITE_SIZE, SPRITE_SIZE);
        sprite
    }

    /// 每段宽度: 视图宽度的四分之一
    pub fn segment_width(&self) -> f32 {
        self.view_width / 4.0
    }

    pub fn initial_offset(&self) -> f32 {
        self.segment_width() / 2.0 - SPRITE_SIZE / 2.0
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// 视图尺寸变化时调用, 位置回到起点
    pub fn resize(&mut self, view_width: f32) {
        self.view_width = view_width;
        self.frame.x = self.initial_offset();
    }

    pub fn start(&mut self) {
        self.animating = true;
    }

    /// 前进一段; 越过最后一段时回到起点
    pub fn step(&mut self) {
        if !self.animating {
            return;
        }
        self.frame.x = if self.frame.x > self.view_width - self.segment_width() {
            self.initial_offset()
        } else {
            self.frame.x + self.segment_width()
        };
    }

    /// 身体轮廓 (屏幕坐标, 不闭合)
    pub fn body_polygon(&self) -> Vec<(f32, f32)> {
        BODY_OUTLINE
            .iter()
            .map(|&(x, y)| self.to_screen(x, y))
            .collect()
    }

    /// 眼睛 (屏幕坐标)
    pub fn eye(&self) -> Rect {
        let (x, y) = self.to_screen(EYE.x, EYE.y);
        let s = self.frame.width / DESIGN_EXTENT;
        Rect::new(x, y, EYE.width * s, EYE.height * s)
    }

    fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        let s = self.frame.width / DESIGN_EXTENT;
        (
            self.frame.x + (x - DESIGN_ORIGIN.0) * s,
            self.frame.y + (y - DESIGN_ORIGIN.1) * s,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position() {
        let sprite = Sprite::new(400.0);
        assert_eq!(sprite.segment_width(), 100.0);
        assert_eq!(sprite.frame(), Rect::new(37.5, 100.0, 25.0, 25.0));
    }

    #[test]
    fn test_steps_and_wraps() {
        let mut sprite = Sprite::new(400.0);
        sprite.step();
        assert_eq!(sprite.frame().x, 37.5, "idle sprite must not move");

        sprite.start();
        let xs: Vec<f32> = (0..5)
            .map(|_| {
                sprite.step();
                sprite.frame().x
            })
            .collect();
        // 37.5 → 137.5 → 237.5 → 337.5 (> 300) → 37.5
        assert_eq!(xs, vec![137.5, 237.5, 337.5, 37.5, 137.5]);
    }

    #[test]
    fn test_polygon_inside_frame() {
        let sprite = Sprite::new(375.0);
        let frame = sprite.frame();
        for (x, y) in sprite.body_polygon() {
            assert!(x >= frame.x - 0.01 && x <= frame.max_x() + 0.01);
            assert!(y >= frame.y - 0.01 && y <= frame.max_y() + 0.01);
        }
        let first = sprite.body_polygon()[0];
        let last = *sprite.body_polygon().last().unwrap();
        assert_ne!(first, last);
    }
}
