//! 后台计数任务追踪
//!
//! 远程后端的计数任务是 fire-and-forget 的：触发它的 `Get` 不等待、
//! 也不能取消它。这里只做计数，让关闭流程可以在超时内等待它们结束。

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;

#[derive(Default)]
struct PendingInner {
    count: AtomicUsize,
    idle: Notify,
}

/// Drop guard：任务结束（包括 panic）时减少计数
struct PendingGuard {
    inner: Arc<PendingInner>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.inner.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

/// 在途后台任务集合
#[derive(Clone, Default)]
pub struct PendingTasks {
    inner: Arc<PendingInner>,
}

impl PendingTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在指定 runtime 上派发一个分离任务，不返回 JoinHandle
    pub fn spawn<F>(&self, handle: &Handle, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.count.fetch_add(1, Ordering::AcqRel);
        let guard = PendingGuard {
            inner: self.inner.clone(),
        };
        handle.spawn(async move {
            let _guard = guard;
            task.await;
        });
    }

    /// 当前在途任务数
    pub fn pending(&self) -> usize {
        self.inner.count.load(Ordering::Acquire)
    }

    /// 等待所有在途任务结束，最多等待 `timeout`；返回仍未结束的任务数
    pub async fn wait_idle(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        loop {
            // 先注册再检查，避免错过 notify_waiters
            let notified = self.inner.idle.notified();
            let pending = self.pending();
            if pending == 0 {
                return 0;
            }
            trace!("PendingTasks: waiting for {} task(s)", pending);
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.pending();
            }
        }
    }
}
