/// 检测系统 (Detection System)
///
/// - Runner:           推理线程, 限制在途缓冲数量
/// - CaptureThrottle:  同一时刻最多一次推理
/// - DetectionOverlay: 把检测结果映射到屏幕上的检测框
/// - Palette / labels: 颜色与类别名
pub mod labels;
pub mod overlay;
pub mod palette;
pub mod runner;
pub mod throttle;
pub mod types;

pub use overlay::{DetectionOverlay, Letterbox, OverlaySlot, RenderOptions, ViewSize};
pub use palette::{Color, Palette, PALETTE};
pub use runner::Runner;
pub use throttle::{CaptureThrottle, InflightPermit};
pub use types::{Detection, PredictionResult, Rect};
