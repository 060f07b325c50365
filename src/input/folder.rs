//! 图片目录回放采集: 按文件名顺序循环读取目录中的图片, 缩放到采集预设尺寸

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;

use super::capture_loop::CaptureLoop;
use super::{PreviewLayer, SessionPreset, VideoCapture, VideoCaptureDelegate};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

pub struct FolderCapture {
    dir: PathBuf,
    files: Vec<PathBuf>,
    looping: bool,
    preset: Option<SessionPreset>,
    fps: u32,
    delegate: Option<Arc<dyn VideoCaptureDelegate>>,
    preview: Option<PreviewLayer>,
    worker: CaptureLoop,
}

impl FolderCapture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            looping: true,
            preset: None,
            fps: 30,
            delegate: None,
            preview: None,
            worker: CaptureLoop::new("folder"),
        }
    }

    /// 播放一遍后结束, 不循环
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    pub fn wait(&mut self) {
        self.worker.wait();
    }

    /// 列出目录中的图片文件, 按文件名排序
    pub fn scan(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read image directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn load(path: &Path, preset: SessionPreset) -> Result<RgbaImage> {
        let img = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?
            .to_rgba8();
        if img.dimensions() == (preset.width, preset.height) {
            return Ok(img);
        }
        Ok(imageops::resize(
            &img,
            preset.width,
            preset.height,
            FilterType::Triangle,
        ))
    }
}

impl VideoCapture for FolderCapture {
    fn set_up(&mut self, preset: SessionPreset) -> Result<()> {
        let files = Self::scan(&self.dir)?;
        if files.is_empty() {
            bail!("no images found in {}", self.dir.display());
        }
        tracing::info!(
            "✅ 图片目录采集就绪: {} ({} 张, {})",
            self.dir.display(),
            files.len(),
            preset
        );
        self.files = files;
        self.preset = Some(preset);
        self.preview = Some(PreviewLayer::new());
        Ok(())
    }

    fn set_delegate(&mut self, delegate: Arc<dyn VideoCaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    fn fps(&self) -> u32 {
        self.fps
    }

    fn preview_layer(&self) -> Option<PreviewLayer> {
        self.preview.clone()
    }

    fn start(&mut self) -> Result<()> {
        let (Some(preset), Some(preview)) = (self.preset, self.preview.clone()) else {
            bail!("folder capture started before set_up");
        };
        let files = self.files.clone();
        let looping = self.looping;
        self.worker.start(
            self.fps,
            preview,
            self.delegate.clone(),
            Box::new(move |i: u64| {
                let i = i as usize;
                if !looping && i >= files.len() {
                    return Ok(None);
                }
                let path = &files[i % files.len()];
                FolderCapture::load(path, preset).map(Some)
            }),
        )
    }

    fn stop(&mut self) {
        self.worker.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir_name = format!("yolo-camera-{}-{}", name, std::process::id());
        let dir = std::env::temp_dir().join(dir_name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = scratch_dir("scan");
        RgbaImage::new(4, 4).save(dir.join("b.png")).unwrap();
        RgbaImage::new(4, 4).save(dir.join("a.png")).unwrap();
        std::fs::write(dir.join("notes.txt"), "x").unwrap();

        let files = FolderCapture::scan(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_set_up_rejects_empty_dir() {
        let dir = scratch_dir("empty");
        let mut capture = FolderCapture::new(&dir);
        assert!(capture.set_up(SessionPreset::default()).is_err());
        assert!(capture.preview_layer().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_resizes_to_preset() {
        let dir = scratch_dir("load");
        let path = dir.join("frame.png");
        RgbaImage::new(32, 32).save(&path).unwrap();
        let img = FolderCapture::load(
            &path,
            SessionPreset {
                width: 16,
                height: 12,
            },
        )
        .unwrap();
        assert_eq!(img.dimensions(), (16, 12));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
