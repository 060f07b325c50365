//! 主线程任务队列 (Main queue)
//!
//! UI 状态只在拥有它的线程上修改. 其他线程通过 `QueueHandle` 投递闭包,
//! 主线程调用 `pump` / `run_until` 串行执行.

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

pub type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

pub struct MainQueue<S> {
    tx: Sender<Job<S>>,
    rx: Receiver<Job<S>>,
}

/// 可跨线程克隆的投递端
pub struct QueueHandle<S> {
    tx: Sender<Job<S>>,
}

impl<S> Clone for QueueHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> QueueHandle<S> {
    /// 投递任务, 队列已销毁时返回 false
    pub fn dispatch(&self, job: impl FnOnce(&mut S) + Send + 'static) -> bool {
        self.tx.send(Box::new(job)).is_ok()
    }
}

impl<S> Default for MainQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MainQueue<S> {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn handle(&self) -> QueueHandle<S> {
        QueueHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// 执行当前所有待处理任务, 不阻塞
    pub fn pump(&self, state: &mut S) -> usize {
        let mut executed = 0;
        while let Ok(job) = self.rx.try_recv() {
            job(state);
            executed += 1;
        }
        executed
    }

    /// 阻塞执行任务直到截止时间
    pub fn run_until(&self, state: &mut S, deadline: Instant) -> usize {
        let mut executed = 0;
        while let Ok(job) = self.rx.recv_deadline(deadline) {
            job(state);
            executed += 1;
        }
        executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_jobs_run_in_order() {
        let queue: MainQueue<Vec<u32>> = MainQueue::new();
        let handle = queue.handle();
        for i in 0..5 {
            assert!(handle.dispatch(move |log: &mut Vec<u32>| log.push(i)));
        }
        assert_eq!(queue.pending(), 5);

        let mut log = Vec::new();
        assert_eq!(queue.pump(&mut log), 5);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.pump(&mut log), 0);
    }

    #[test]
    fn test_cross_thread_dispatch() {
        let queue: MainQueue<u32> = MainQueue::new();
        let handle = queue.handle();
        let worker = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            handle.dispatch(|n: &mut u32| *n += 7);
        });

        let mut n = 0;
        let deadline = Instant::now() + Duration::from_secs(2);
        while n == 0 && Instant::now() < deadline {
            queue.run_until(&mut n, Instant::now() + Duration::from_millis(50));
        }
        worker.join().unwrap();
        assert_eq!(n, 7);
    }

    #[test]
    fn test_run_until_returns_at_deadline() {
        let queue: MainQueue<u32> = MainQueue::new();
        let mut n = 0;
        let start = Instant::now();
        let deadline = start + Duration::from_millis(30);
        assert_eq!(queue.run_until(&mut n, deadline), 0);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
