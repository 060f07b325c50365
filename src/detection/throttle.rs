//! 采集节流 (Capture Throttle)
//!
//! 同一时刻最多只有一次推理在途; 推理进行中到达的帧直接丢弃, 不计数也不打印.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CaptureThrottle {
    busy: Arc<AtomicBool>,
}

impl CaptureThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试占用推理窗口. 返回的许可在 drop 时释放窗口.
    pub fn try_acquire(&self) -> Option<InflightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InflightPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 在途推理许可, 随推理任务移动, 完成回调交付后 drop
#[must_use = "dropping the permit immediately reopens the throttle"]
pub struct InflightPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for InflightPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
