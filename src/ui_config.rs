//! 应用配置 - 通过JSON文件调整参数

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detection::overlay::{RenderOptions, ViewSize};
use crate::detection::types::{
    CONFIDENCE_THRESHOLD, INF_SIZE, MAX_BUFFERS_IN_FLIGHT, MAX_DETECTIONS,
};
use crate::models::PredictorOptions;

/// 应用参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // === 检测参数 ===
    pub confidence_threshold: f32, // 显示置信度阈值
    pub max_detections: usize,     // 同时显示的检测框数量
    pub input_size: u32,           // 网络输入边长

    // === 采集参数 ===
    pub fps: u32,               // 目标采集帧率
    pub session_preset: String, // 采集分辨率, 如 "640x480"

    // === 推理参数 ===
    pub inflight_buffers: usize,   // 在途命令缓冲数量
    pub debug_images: bool,        // 预测器输出调试图像
    pub predictor_latency_ms: u64, // 随机预测器模拟耗时

    // === 显示参数 ===
    pub view_width: f32,
    pub view_height: f32,
    pub font_path: Option<PathBuf>, // 标签字体 (TTF/OTF), 为空时不绘制文字
    pub sprite_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: CONFIDENCE_THRESHOLD,
            max_detections: MAX_DETECTIONS,
            input_size: INF_SIZE,

            fps: 5,
            session_preset: "640x480".to_string(),

            inflight_buffers: MAX_BUFFERS_IN_FLIGHT,
            debug_images: true,
            predictor_latency_ms: 0,

            view_width: 375.0,
            view_height: 667.0,
            font_path: None,
            sprite_enabled: true,
        }
    }
}

impl AppConfig {
    /// 从JSON文件加载配置
    ///
    /// 文件不存在时写入默认配置; 解析失败时使用默认值
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    tracing::info!("✅ 配置已从 {} 加载", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("⚠️  配置文件解析失败: {}, 使用默认值", e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("📝 配置文件不存在,创建默认配置...");
                let config = Self::default();
                config.save(path);
                config
            }
        }
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    tracing::error!("❌ 保存配置失败: {}", e);
                } else {
                    tracing::info!("💾 配置已保存到 {}", path.display());
                }
            }
            Err(e) => tracing::error!("❌ 序列化配置失败: {}", e),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            confidence_threshold: self.confidence_threshold,
            max_detections: self.max_detections,
            input_size: self.input_size.max(1),
        }
    }

    pub fn predictor_options(&self, seed: u64) -> PredictorOptions {
        PredictorOptions {
            seed,
            debug_images: self.debug_images,
            latency: Duration::from_millis(self.predictor_latency_ms),
        }
    }

    pub fn view_size(&self) -> ViewSize {
        ViewSize::new(self.view_width, self.view_height)
    }

    /// 打印当前配置
    pub fn print_summary(&self) {
        tracing::info!("🎛️  当前配置:");
        tracing::info!("  置信度阈值: {:.2}", self.confidence_threshold);
        tracing::info!("  最多检测框: {}", self.max_detections);
        tracing::info!("  网络输入: {}x{}", self.input_size, self.input_size);
        tracing::info!("  采集: {} @ {}fps", self.session_preset, self.fps);
        tracing::info!("  在途缓冲: {}", self.inflight_buffers);
        tracing::info!("  调试图像: {}", self.debug_images);
        tracing::info!("  模拟耗时: {}ms", self.predictor_latency_ms);
        tracing::info!("  视图: {}x{}", self.view_width, self.view_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let file_name = format!("yolo-camera-config-{}-{}.json", name, std::process::id());
        std::env::temp_dir().join(file_name)
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.max_detections, 10);
        assert_eq!(config.input_size, 416);
        assert_eq!(config.fps, 5);
        assert_eq!(config.inflight_buffers, 3);
        assert_eq!(config.render_options(), RenderOptions::default());
        assert!(config.debug_images);
    }

    #[test]
    fn test_predictor_options() {
        let config = AppConfig {
            debug_images: false,
            predictor_latency_ms: 40,
            ..AppConfig::default()
        };
        let options = config.predictor_options(9);
        assert_eq!(options.seed, 9);
        assert!(!options.debug_images);
        assert_eq!(options.latency, Duration::from_millis(40));
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let path = scratch("missing");
        let _ = fs::remove_file(&path);
        let config = AppConfig::load(&path);
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(AppConfig::load(&path), AppConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = scratch("partial");
        fs::write(&path, r#"{"confidence_threshold": 0.5, "fps": 15}"#).unwrap();
        let config = AppConfig::load(&path);
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.fps, 15);
        assert_eq!(config.max_detections, 10);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let path = scratch("malformed");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
        let _ = fs::remove_file(&path);
    }
}
