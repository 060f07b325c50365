//! 类别颜色表 (Class color palette)
//!
//! 每个类别一种颜色, 共 20 种: 红(5) × 绿(2) × 蓝(2)

use image::Rgba;
use once_cell::sync::Lazy;

const REDS: [f32; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];
const GREENS: [f32; 2] = [0.3, 0.7];
const BLUES: [f32; 2] = [0.4, 0.8];

/// RGBA 颜色, 各分量取值 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn to_rgba8(&self) -> Rgba<u8> {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([q(self.red), q(self.green), q(self.blue), q(self.alpha)])
    }
}

/// 全局颜色表, 首次访问时生成
pub static PALETTE: Lazy<Palette> = Lazy::new(Palette::generate);

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// 按 红(外层) → 绿(中层) → 蓝(内层) 的固定顺序枚举
    pub fn generate() -> Self {
        let mut colors = Vec::with_capacity(REDS.len() * GREENS.len() * BLUES.len());
        for r in REDS {
            for g in GREENS {
                for b in BLUES {
                    colors.push(Color::new(r, g, b, 1.0));
                }
            }
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, class_index: usize) -> Option<Color> {
        self.colors.get(class_index).copied()
    }
}
