// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod detection; // 检测结果、节流、推理线程、检测框
pub mod device; // 计算设备与前置检查
pub mod dispatch; // 主线程任务队列
pub mod input; // 视频输入系统
pub mod models; // 预测器接口与实现
pub mod ui; // 视图状态、控制器、画布
pub mod ui_config; // 应用配置

pub use crate::detection::{Detection, PredictionResult, Rect};
pub use crate::device::{check_preconditions, Device, DeviceSource, SetupError, SystemDevices};
pub use crate::models::{create_predictor, Predictor, PredictorSource, SharedPredictor};
pub use crate::ui::CameraViewController;
pub use crate::ui_config::AppConfig;

/// 本地时间字符串, 用于快照文件名
pub fn gen_time_string(delimiter: &str) -> String {
    let t_now = chrono::Local::now();
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_string_shape() {
        let s = gen_time_string("-");
        let parts: Vec<&str> = s.split('-').collect();
        assert_eq!(parts.len(), 7);
        assert_eq!(parts[0].len(), 4);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
    }
}
