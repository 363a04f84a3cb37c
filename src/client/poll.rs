use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde_json::Value;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_stream::{wrappers::IntervalStream, StreamExt};

use super::Source;

/// 每种资源最近一次看到的数据，用来判断是否有变化
#[derive(Debug, Default)]
pub struct SnapshotTracker {
    seen: HashMap<String, String>,
}

impl SnapshotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 数据有变化（包括第一次看到）时返回 true
    pub fn observe(&mut self, resource: &str, value: &Value) -> bool {
        let text = value.to_string();
        if self.seen.get(resource) == Some(&text) {
            return false;
        }
        self.seen.insert(resource.to_owned(), text);
        true
    }

    /// 下次无论是否变化都当作新数据
    pub fn forget(&mut self, resource: &str) {
        self.seen.remove(resource);
    }
}

pub type OnChange = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// 每种资源一个后台任务，定时拉取，数据变化时回调。
///
/// 拉取失败只记录日志，不影响上一次的数据。
/// 调用 `stop` 或者丢弃 `Poller` 都会结束所有任务。
pub struct Poller {
    handles: Vec<JoinHandle<()>>,
    tracker: Arc<Mutex<SnapshotTracker>>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("tasks", &self.handles.len())
            .finish()
    }
}

impl Poller {
    pub fn spawn(
        source: Arc<dyn Source>,
        resources: &[&str],
        every: Duration,
        on_change: OnChange,
    ) -> Poller {
        let tracker = Arc::new(Mutex::new(SnapshotTracker::new()));
        let handles = resources
            .iter()
            .map(|resource| {
                let resource = resource.to_string();
                let source = source.clone();
                let tracker = tracker.clone();
                let on_change = on_change.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(every);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    let mut ticks = IntervalStream::new(interval);
                    while ticks.next().await.is_some() {
                        let value = match source.fetch(&resource).await {
                            Ok(value) => value,
                            Err(e) => {
                                tracing::warn!("{} 拉取 {resource} 失败: {e}", source.description());
                                continue;
                            }
                        };
                        let changed = tracker
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .observe(&resource, &value);
                        if changed {
                            tracing::debug!("{resource} 有更新");
                            on_change(&resource, &value);
                        }
                    }
                })
            })
            .collect();
        Poller { handles, tracker }
    }

    /// 强制下一轮把 `resource` 当作新数据回调
    pub fn refresh(&self, resource: &str) {
        self.tracker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .forget(resource);
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
