/// 实时摄像头检测 (Realtime Camera Detection)
///
/// 系统架构:
/// 1. 采集线程: 按帧率产生画面 (测试图案或图片目录)
/// 2. 推理线程: 预测器执行检测, 同一时刻最多一次
/// 3. 主线程:   刷新检测框、耗时文字、精灵动画, 可选保存快照
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use yolo_camera_rs::detection::overlay::ViewSize;
use yolo_camera_rs::input::{FolderCapture, PatternCapture, VideoCapture};
use yolo_camera_rs::models::{create_predictor, PredictorSource};
use yolo_camera_rs::ui::OverlayCanvas;
use yolo_camera_rs::{AppConfig, CameraViewController, SystemDevices};

/// 精灵动画节拍
const ANIMATION_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(author, version, about = "实时摄像头目标检测", long_about = None)]
struct Args {
    /// 画面来源: "pattern" 或图片目录
    #[arg(short, long, default_value = "pattern")]
    source: String,

    /// 预测器: "random" 或回放 JSON 文件
    #[arg(short, long, default_value = "random")]
    predictor: String,

    /// 采集帧数上限 (仅测试图案), 0 表示不限
    #[arg(short, long, default_value_t = 50)]
    frames: u64,

    /// 图片目录只播放一遍
    #[arg(long)]
    once: bool,

    /// 输出调试图像 (覆盖配置文件)
    #[arg(long)]
    debug_image: Option<bool>,

    /// 随机预测器模拟耗时, 毫秒 (覆盖配置文件)
    #[arg(long)]
    latency_ms: Option<u64>,

    /// 运行时长 (秒)
    #[arg(short, long, default_value_t = 10.0)]
    duration: f64,

    /// 配置文件
    #[arg(short, long, default_value = "camera_config.json")]
    config: PathBuf,

    /// 快照输出目录, 为空时不保存
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 随机预测器种子
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// 视图尺寸, 如 "375x667" (覆盖配置文件)
    #[arg(long)]
    view: Option<ViewSize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(&args.config);
    if let Some(view) = args.view {
        config.view_width = view.width;
        config.view_height = view.height;
    }
    if let Some(enabled) = args.debug_image {
        config.debug_images = enabled;
    }
    if let Some(latency) = args.latency_ms {
        config.predictor_latency_ms = latency;
    }
    config.print_summary();

    let canvas = match &config.font_path {
        Some(path) => OverlayCanvas::with_font_file(path).unwrap_or_else(|e| {
            tracing::warn!("⚠️  字体加载失败: {:#}, 不绘制文字", e);
            OverlayCanvas::new()
        }),
        None => OverlayCanvas::new(),
    };
    if !canvas.has_font() {
        tracing::info!("🔤 未配置字体, 快照中不绘制文字");
    }

    tracing::info!("🚀 实时检测启动");
    tracing::info!("📹 画面来源: {}", args.source);
    tracing::info!("📦 预测器: {}", args.predictor);

    let capture: Box<dyn VideoCapture> = if args.source.eq_ignore_ascii_case("pattern") {
        let mut pattern = PatternCapture::new();
        if args.frames > 0 {
            pattern = pattern.with_max_frames(args.frames);
        }
        Box::new(pattern)
    } else {
        let mut folder = FolderCapture::new(&args.source);
        if args.once {
            folder = folder.once();
        }
        Box::new(folder)
    };

    let source = PredictorSource::from_arg(&args.predictor);
    let options = config.predictor_options(args.seed);

    let mut controller = CameraViewController::new(config.clone());
    controller.view_did_load(&SystemDevices, capture, move |device, inflight| {
        create_predictor(&source, device, inflight, &options)
    })?;
    controller.view_will_layout_subviews(config.view_size());
    controller.view_did_appear();

    // ========== 主线程循环 ==========
    let end = Instant::now() + Duration::from_secs_f64(args.duration.max(0.0));
    let mut snapshots = 0usize;
    let mut last_saved = 0u64;
    loop {
        let now = Instant::now();
        if now >= end {
            break;
        }
        controller.run_until((now + ANIMATION_INTERVAL).min(end));
        controller.animation_tick();

        let shown = controller.state().results_shown;
        if shown > last_saved {
            last_saved = shown;
            tracing::info!("{}", controller.state().time_label);
            if let Some(dir) = &args.output {
                match canvas.save_snapshot(controller.state(), dir) {
                    Ok(path) => {
                        snapshots += 1;
                        tracing::info!("💾 快照已保存: {}", path.display());
                    }
                    Err(e) => tracing::error!("❌ 保存快照失败: {:#}", e),
                }
            }
        }
    }

    controller.shutdown();
    controller.pump();

    let state = controller.state();
    tracing::info!("📊 运行统计:");
    tracing::info!("  已显示结果: {}", state.results_shown);
    tracing::info!("  当前检测框: {}", state.overlay.shown_count());
    if let Some(runner) = controller.runner() {
        tracing::info!("  完成推理: {}", runner.completed());
    }
    if args.output.is_some() {
        tracing::info!("  保存快照: {}", snapshots);
    }
    Ok(())
}
