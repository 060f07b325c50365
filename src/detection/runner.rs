//! 推理调度器 (Inference Invoker)
//! 职责: 接收纹理 → 在推理线程执行预测器 → 把结果投递到主线程队列
//!
//! 在途命令缓冲数量受限 (默认三重缓冲), 缓冲耗尽时 `predict` 阻塞调用线程.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};

use super::types::PredictionResult;
use crate::device::Device;
use crate::dispatch::QueueHandle;
use crate::input::{lock, VideoTexture};
use crate::models::SharedPredictor;

type InferenceJob = Box<dyn FnOnce() + Send>;

pub struct Runner {
    device: Device,
    inflight_buffers: usize,
    buffers_tx: Sender<()>,
    buffers_rx: Receiver<()>,
    jobs: Option<Sender<InferenceJob>>,
    worker: Option<JoinHandle<()>>,
    completed: Arc<AtomicU64>,
}

impl Runner {
    pub fn new(device: Device, inflight_buffers: usize) -> Result<Self> {
        let inflight_buffers = inflight_buffers.max(1);

        // 预先放入 N 个令牌, 取令牌即占用一个缓冲
        let (buffers_tx, buffers_rx) = crossbeam_channel::bounded(inflight_buffers);
        for _ in 0..inflight_buffers {
            buffers_tx.send(())?;
        }

        let (jobs_tx, jobs_rx): (Sender<InferenceJob>, Receiver<InferenceJob>) =
            crossbeam_channel::unbounded();
        let worker = std::thread::Builder::new()
            .name("inference".to_string())
            .spawn(move || {
                tracing::info!("🔍 推理线程启动");
                while let Ok(job) = jobs_rx.recv() {
                    job();
                }
                tracing::info!("🔍 推理线程退出");
            })?;

        tracing::info!(
            "✅ Runner 就绪: 设备 {} | 在途缓冲 {}",
            device.name(),
            inflight_buffers
        );

        Ok(Self {
            device,
            inflight_buffers,
            buffers_tx,
            buffers_rx,
            jobs: Some(jobs_tx),
            worker: Some(worker),
            completed: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn inflight_buffers(&self) -> usize {
        self.inflight_buffers
    }

    /// 当前空闲缓冲数量
    pub fn free_buffers(&self) -> usize {
        self.buffers_rx.len()
    }

    /// 已完成的预测次数 (不含失败)
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// 提交一次预测. 结果通过 `queue` 在主线程上交给 `completion`.
    ///
    /// 预测失败时只记录日志, `completion` 被丢弃而不调用.
    pub fn predict<S: 'static>(
        &self,
        network: &SharedPredictor,
        texture: VideoTexture,
        queue: &QueueHandle<S>,
        completion: impl FnOnce(&mut S, PredictionResult) + Send + 'static,
    ) {
        let Some(jobs) = &self.jobs else {
            return;
        };
        if self.buffers_rx.recv().is_err() {
            return;
        }

        let network = network.clone();
        let queue = queue.clone();
        let buffers_tx = self.buffers_tx.clone();
        let completed = self.completed.clone();

        let job: InferenceJob = Box::new(move || {
            let start = Instant::now();
            let outcome = lock(&network).predict(&texture);
            let elapsed = start.elapsed().as_secs_f64();
            let _ = buffers_tx.send(());

            match outcome {
                Ok(prediction) => {
                    completed.fetch_add(1, Ordering::AcqRel);
                    let result = PredictionResult {
                        detections: prediction.detections,
                        debug_image: prediction.debug_image,
                        elapsed,
                    };
                    queue.dispatch(move |state: &mut S| completion(state, result));
                }
                Err(e) => {
                    tracing::error!("❌ 推理失败: {:#}", e);
                }
            }
        });

        if jobs.send(job).is_err() {
            // 推理线程已退出, 归还缓冲
            let _ = self.buffers_tx.send(());
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("❌ 推理线程异常退出");
            }
        }
    }
}
