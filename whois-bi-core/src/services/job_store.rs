//! 任务状态管理与轮询
//!
//! Each domain is either [`PollState::Idle`] (no unfinished jobs) or
//! [`PollState::Polling`]. [`JobStore::watch`] starts a background task for
//! one domain that fetches the job history right away, keeps fetching every
//! `poll_interval` while jobs are unfinished, and parks once they are done.
//! [`JobStore::create_job`] wakes a parked task, or starts a store-owned one
//! that stops once the domain is idle again when nobody watches the domain.
//!
//! When the last unfinished job of a domain finishes, the domain detail is
//! refreshed once so new records and WHOIS data show up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use whois_bi_client::Job;

use crate::config::JobHistoryPolicy;
use crate::error::CoreResult;
use crate::services::{DomainStore, StoreContext};

/// 轮询状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    #[default]
    Idle,
    Polling,
}

/// Jobs of one domain.
#[derive(Debug, Clone, Default)]
pub struct DomainJobs {
    pub jobs: Vec<Job>,
    /// Jobs without a finish time, including ones created but not yet fetched.
    pub unfinished: Vec<Job>,
}

impl DomainJobs {
    pub fn poll_state(&self) -> PollState {
        if self.unfinished.is_empty() {
            PollState::Idle
        } else {
            PollState::Polling
        }
    }
}

/// 任务状态快照，按域名索引
#[derive(Debug, Clone, Default)]
pub struct JobsState {
    by_domain: HashMap<String, DomainJobs>,
}

impl JobsState {
    pub fn domain(&self, name: &str) -> Option<&DomainJobs> {
        self.by_domain.get(name)
    }

    pub fn jobs(&self, name: &str) -> &[Job] {
        self.by_domain.get(name).map(|d| d.jobs.as_slice()).unwrap_or_default()
    }

    pub fn unfinished(&self, name: &str) -> &[Job] {
        self.by_domain
            .get(name)
            .map(|d| d.unfinished.as_slice())
            .unwrap_or_default()
    }

    pub fn poll_state(&self, name: &str) -> PollState {
        self.by_domain
            .get(name)
            .map(DomainJobs::poll_state)
            .unwrap_or_default()
    }
}

/// Registered poll loop of one domain.
struct WatchEntry {
    id: u64,
    kick: Arc<Notify>,
    token: CancellationToken,
}

type Watchers = Arc<Mutex<HashMap<String, WatchEntry>>>;

fn lock(watchers: &Watchers) -> MutexGuard<'_, HashMap<String, WatchEntry>> {
    watchers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 任务 Store
pub struct JobStore {
    ctx: Arc<StoreContext>,
    domains: Arc<DomainStore>,
    state: watch::Sender<Arc<JobsState>>,
    watchers: Watchers,
    next_watch_id: AtomicU64,
    shutdown: CancellationToken,
}

impl JobStore {
    /// 创建任务 Store
    ///
    /// `domains` is refreshed when a domain's jobs finish.
    #[must_use]
    pub fn new(ctx: Arc<StoreContext>, domains: Arc<DomainStore>) -> Self {
        let (state, _) = watch::channel(Arc::new(JobsState::default()));
        Self {
            ctx,
            domains,
            state,
            watchers: Arc::default(),
            next_watch_id: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<JobsState> {
        Arc::clone(&self.state.borrow())
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<JobsState>> {
        self.state.subscribe()
    }

    pub fn poll_state(&self, name: &str) -> PollState {
        self.state.borrow().poll_state(name)
    }

    fn update(&self, f: impl FnOnce(&mut JobsState)) {
        self.state.send_modify(|current| {
            let mut next = JobsState::clone(current);
            f(&mut next);
            *current = Arc::new(next);
        });
    }

    /// 获取任务历史并更新轮询状态
    ///
    /// On failure the state is left as it was.
    pub async fn fetch_jobs(&self, name: &str) -> CoreResult<PollState> {
        let fetched = self.ctx.api.list_jobs(name).await?;
        let policy = self.ctx.config.job_history_policy;

        let mut finished_all = false;
        let mut poll_state = PollState::Idle;
        self.update(|s| {
            let entry = s.by_domain.entry(name.to_string()).or_default();
            let had_unfinished = !entry.unfinished.is_empty();

            entry.jobs = match policy {
                JobHistoryPolicy::Replace => fetched,
                JobHistoryPolicy::MergeById => merge_by_id(std::mem::take(&mut entry.jobs), fetched),
            };
            entry.unfinished = entry
                .jobs
                .iter()
                .filter(|job| !job.is_finished())
                .cloned()
                .collect();

            finished_all = had_unfinished && entry.unfinished.is_empty();
            poll_state = entry.poll_state();
        });

        if finished_all {
            log::info!("All jobs for {name} finished, refreshing domain");
            if let Err(e) = self.domains.get_domain(name).await {
                log::warn!("Failed to refresh {name} after jobs finished: {e}");
            }
        }
        Ok(poll_state)
    }

    /// 创建检查任务
    ///
    /// The returned job counts as unfinished right away. A parked watcher of
    /// the domain is woken; without a watcher, a background poll is started
    /// that fetches once per interval and ends when the domain is idle again.
    pub async fn create_job(self: &Arc<Self>, name: &str) -> CoreResult<Job> {
        let job = self.ctx.api.create_job(name).await?;
        log::info!("Queued job {} for {name}", job.id);

        self.update(|s| {
            let entry = s.by_domain.entry(name.to_string()).or_default();
            if !entry.unfinished.iter().any(|j| j.id == job.id) {
                entry.unfinished.push(job.clone());
            }
        });

        let mut watchers = lock(&self.watchers);
        if let Some(entry) = watchers.get(name) {
            entry.kick.notify_waiters();
        } else {
            log::debug!("No watcher for {name}, polling until job {} finishes", job.id);
            let (entry, _) = self.spawn_loop(
                name,
                LoopMode::UntilIdle,
                NextPoll::After(self.ctx.config.poll_interval),
            );
            watchers.insert(name.to_string(), entry);
        }
        Ok(job)
    }

    /// 开始轮询某个域名的任务
    ///
    /// Replaces an existing watcher of the same domain. Polling stops when
    /// the returned guard is dropped or stopped, or on [`Self::shutdown`].
    pub fn watch(self: &Arc<Self>, name: &str) -> JobWatch {
        let (entry, handle) = self.spawn_loop(name, LoopMode::Watch, NextPoll::Now);
        let id = entry.id;
        let token = entry.token.clone();

        if let Some(previous) = lock(&self.watchers).insert(name.to_string(), entry) {
            log::debug!("Replacing watcher for {name}");
            previous.token.cancel();
        }

        JobWatch {
            name: name.to_string(),
            id,
            token,
            handle: Some(handle),
            watchers: Arc::clone(&self.watchers),
        }
    }

    /// 停止所有轮询
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        lock(&self.watchers).clear();
    }

    fn spawn_loop(
        self: &Arc<Self>,
        name: &str,
        mode: LoopMode,
        first: NextPoll,
    ) -> (WatchEntry, JoinHandle<()>) {
        let entry = WatchEntry {
            id: self.next_watch_id.fetch_add(1, Ordering::Relaxed),
            kick: Arc::new(Notify::new()),
            token: self.shutdown.child_token(),
        };
        let handle = tokio::spawn(poll_loop(
            Arc::clone(self),
            name.to_string(),
            PollTask {
                id: entry.id,
                mode,
                kick: Arc::clone(&entry.kick),
                token: entry.token.clone(),
            },
            first,
        ));
        (entry, handle)
    }

    /// Unregister the loop `id` of `name` unless a job was queued meanwhile.
    ///
    /// Runs under the watcher lock, so a concurrent `create_job` either sees
    /// the loop still registered or starts a new one.
    fn release(&self, name: &str, id: u64, only_if_idle: bool) -> bool {
        let mut watchers = lock(&self.watchers);
        if only_if_idle && self.poll_state(name) == PollState::Polling {
            return false;
        }
        if watchers.get(name).is_some_and(|entry| entry.id == id) {
            watchers.remove(name);
        }
        true
    }
}

/// Fetched jobs replace stored ones with the same id; new ids are appended.
fn merge_by_id(mut stored: Vec<Job>, fetched: Vec<Job>) -> Vec<Job> {
    for job in fetched {
        match stored.iter_mut().find(|j| j.id == job.id) {
            Some(slot) => *slot = job,
            None => stored.push(job),
        }
    }
    stored
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopMode {
    /// Owned by a [`JobWatch`]; parks while idle.
    Watch,
    /// Started by `create_job`; exits once idle.
    UntilIdle,
}

enum NextPoll {
    Now,
    After(Duration),
    /// `recheck`: resume right away if a job was queued before parking.
    Park { recheck: bool },
}

struct PollTask {
    id: u64,
    mode: LoopMode,
    kick: Arc<Notify>,
    token: CancellationToken,
}

async fn poll_loop(store: Arc<JobStore>, name: String, task: PollTask, first: NextPoll) {
    let interval = store.ctx.config.poll_interval;
    let token = &task.token;
    let mut next = first;

    loop {
        match next {
            NextPoll::Now => {}
            NextPoll::After(delay) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
            NextPoll::Park { recheck } if task.mode == LoopMode::UntilIdle => {
                if store.release(&name, task.id, recheck) {
                    break;
                }
                next = NextPoll::After(interval);
                continue;
            }
            NextPoll::Park { recheck } => {
                // 先注册等待再检查状态，避免漏掉 create_job 的唤醒
                let mut notified = std::pin::pin!(task.kick.notified());
                notified.as_mut().enable();
                if !recheck || store.poll_state(&name) == PollState::Idle {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        () = notified => {}
                    }
                }
                next = NextPoll::After(interval);
                continue;
            }
        }

        let result = tokio::select! {
            biased;
            () = token.cancelled() => break,
            result = store.fetch_jobs(&name) => result,
        };

        next = match result {
            Ok(PollState::Polling) => NextPoll::After(interval),
            Ok(PollState::Idle) => NextPoll::Park { recheck: true },
            Err(e) => {
                // 失败后不再重试，等待下一次 create_job 唤醒
                log::warn!("Polling jobs for {name} failed, pausing: {e}");
                NextPoll::Park { recheck: false }
            }
        };
    }

    log::debug!("Stopped polling jobs for {name}");
}

/// 轮询句柄
///
/// Dropping the guard cancels the poll task.
pub struct JobWatch {
    name: String,
    id: u64,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
    watchers: Watchers,
}

impl JobWatch {
    pub fn domain(&self) -> &str {
        &self.name
    }

    /// Cancel the poll task and wait for it to exit.
    pub async fn stop(mut self) {
        self.token.cancel();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = handle.await {
            log::warn!("Job watcher for {} ended abnormally: {e}", self.name);
        }
    }
}

impl Drop for JobWatch {
    fn drop(&mut self) {
        self.token.cancel();
        let mut watchers = lock(&self.watchers);
        if watchers.get(&self.name).is_some_and(|entry| entry.id == self.id) {
            watchers.remove(&self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::test_utils::{MockApi, connection_error, context, domain, job};

    const DOMAIN: &str = "a.com";

    fn stores_with(api: &Arc<MockApi>, config: StoreConfig) -> (Arc<DomainStore>, Arc<JobStore>) {
        api.set_domains(vec![domain(1, DOMAIN)]);
        let ctx = context(Arc::clone(api), config);
        let domains = Arc::new(DomainStore::new(Arc::clone(&ctx)));
        let jobs = Arc::new(JobStore::new(ctx, Arc::clone(&domains)));
        (domains, jobs)
    }

    fn stores(api: &Arc<MockApi>) -> (Arc<DomainStore>, Arc<JobStore>) {
        stores_with(api, StoreConfig::default())
    }

    async fn wait_for_calls(api: &MockApi, method: &str, n: usize) {
        while api.calls(method) < n {
            tokio::task::yield_now().await;
        }
    }

    // ===== fetch_jobs =====

    #[tokio::test]
    async fn unfinished_jobs_are_those_without_finish_time() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, true), job(2, 1, false), job(3, 1, false)]));

        let state = jobs.fetch_jobs(DOMAIN).await.unwrap();

        assert_eq!(state, PollState::Polling);
        let snap = jobs.snapshot();
        assert_eq!(snap.jobs(DOMAIN).len(), 3);
        let ids: Vec<_> = snap.unfinished(DOMAIN).iter().map(|j| j.id).collect();
        assert_eq!(ids, [2, 3]);
    }

    #[tokio::test]
    async fn no_refresh_when_nothing_was_running() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, true)]));

        assert_eq!(jobs.fetch_jobs(DOMAIN).await.unwrap(), PollState::Idle);
        assert_eq!(api.calls("get_domain"), 0);
    }

    #[tokio::test]
    async fn finishing_refreshes_domain_exactly_once() {
        let api = MockApi::new();
        let (domains, jobs) = stores(&api);
        api.set_created_job(job(7, 1, false));
        jobs.create_job(DOMAIN).await.unwrap();
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Polling);

        api.push_jobs(Ok(vec![job(7, 1, true)]));
        assert_eq!(jobs.fetch_jobs(DOMAIN).await.unwrap(), PollState::Idle);
        assert_eq!(jobs.fetch_jobs(DOMAIN).await.unwrap(), PollState::Idle);

        assert_eq!(api.calls("get_domain"), 1);
        assert!(domains.snapshot().domain(DOMAIN).is_some());
        assert!(jobs.snapshot().unfinished(DOMAIN).is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_unchanged() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, false)]));
        jobs.fetch_jobs(DOMAIN).await.unwrap();
        let before = jobs.snapshot();

        api.push_jobs(Err(connection_error()));
        // first response is consumed, the error sticks
        jobs.fetch_jobs(DOMAIN).await.unwrap();
        assert!(jobs.fetch_jobs(DOMAIN).await.is_err());

        let after = jobs.snapshot();
        assert_eq!(after.unfinished(DOMAIN).len(), before.unfinished(DOMAIN).len());
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Polling);
    }

    #[tokio::test]
    async fn replace_policy_drops_jobs_missing_from_response() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, true), job(2, 1, true)]));
        api.push_jobs(Ok(vec![job(3, 1, true)]));

        jobs.fetch_jobs(DOMAIN).await.unwrap();
        jobs.fetch_jobs(DOMAIN).await.unwrap();

        let ids: Vec<_> = jobs.snapshot().jobs(DOMAIN).iter().map(|j| j.id).collect();
        assert_eq!(ids, [3]);
    }

    #[tokio::test]
    async fn merge_policy_replaces_same_id_and_appends_new() {
        let api = MockApi::new();
        let (_, jobs) = stores_with(
            &api,
            StoreConfig {
                job_history_policy: JobHistoryPolicy::MergeById,
                ..StoreConfig::default()
            },
        );
        api.push_jobs(Ok(vec![job(1, 1, true), job(2, 1, false)]));
        api.push_jobs(Ok(vec![job(2, 1, true), job(3, 1, true)]));

        jobs.fetch_jobs(DOMAIN).await.unwrap();
        let state = jobs.fetch_jobs(DOMAIN).await.unwrap();

        assert_eq!(state, PollState::Idle);
        let snap = jobs.snapshot();
        let ids: Vec<_> = snap.jobs(DOMAIN).iter().map(|j| j.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert!(snap.jobs(DOMAIN)[1].is_finished());
    }

    // ===== watch =====

    #[tokio::test(start_paused = true)]
    async fn watcher_polls_until_jobs_finish() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(Vec::new()));
        api.push_jobs(Ok(vec![job(7, 1, false)]));
        api.push_jobs(Ok(vec![job(7, 1, true)]));
        api.set_created_job(job(7, 1, false));

        let _watch = jobs.watch(DOMAIN);
        wait_for_calls(&api, "list_jobs", 1).await;
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Idle);

        jobs.create_job(DOMAIN).await.unwrap();
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Polling);

        // t=10s still running, t=20s finished
        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(api.calls("list_jobs"), 3);
        assert_eq!(api.calls("get_domain"), 1);
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Idle);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(api.calls("list_jobs"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn create_job_schedules_one_fetch_after_interval() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(Vec::new()));

        let _watch = jobs.watch(DOMAIN);
        wait_for_calls(&api, "list_jobs", 1).await;
        jobs.create_job(DOMAIN).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.calls("list_jobs"), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(api.calls("list_jobs"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_failure_stops_rescheduling() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, false)]));
        api.push_jobs(Err(connection_error()));

        let _watch = jobs.watch(DOMAIN);
        tokio::time::sleep(Duration::from_secs(100)).await;

        // initial fetch, then one failing fetch at t=10s
        assert_eq!(api.calls("list_jobs"), 2);
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Polling);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_watch_stops_polling() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, false)]));

        let watch = jobs.watch(DOMAIN);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.calls("list_jobs"), 1);

        drop(watch);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.calls("list_jobs"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_waits_for_task_exit() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, false)]));

        let watch = jobs.watch(DOMAIN);
        wait_for_calls(&api, "list_jobs", 1).await;
        watch.stop().await;

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.calls("list_jobs"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_watch_replaces_first() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, false)]));

        let first = jobs.watch(DOMAIN);
        let _second = jobs.watch(DOMAIN);
        tokio::time::sleep(Duration::from_secs(25)).await;

        // only the second loop runs: t=0, 10, 20
        assert_eq!(api.calls("list_jobs"), 3);

        // dropping the replaced guard leaves the live watcher registered
        drop(first);
        assert!(lock(&jobs.watchers).contains_key(DOMAIN));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_all_watchers() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, false)]));

        let _a = jobs.watch(DOMAIN);
        let _b = jobs.watch("b.com");
        wait_for_calls(&api, "list_jobs", 2).await;

        jobs.shutdown();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.calls("list_jobs"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn create_job_resumes_after_failed_poll() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.push_jobs(Ok(vec![job(1, 1, false)]));
        api.push_jobs(Err(connection_error()));
        api.push_jobs(Ok(vec![job(1, 1, true)]));

        let _watch = jobs.watch(DOMAIN);
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(api.calls("list_jobs"), 2);

        jobs.create_job(DOMAIN).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.calls("list_jobs"), 2);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(api.calls("list_jobs"), 3);
        assert_eq!(api.calls("get_domain"), 1);
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Idle);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(api.calls("list_jobs"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn create_job_while_polling_adds_no_extra_fetch() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.set_created_job(job(1, 1, false));
        api.push_jobs(Ok(vec![job(1, 1, false)]));
        api.push_jobs(Ok(vec![job(1, 1, true)]));

        let _watch = jobs.watch(DOMAIN);
        tokio::time::sleep(Duration::from_secs(5)).await;
        jobs.create_job(DOMAIN).await.unwrap();

        // t=0 and t=10 only; the wake-up while sleeping is not remembered
        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(api.calls("list_jobs"), 2);
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn create_job_without_watch_polls_until_idle() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.set_created_job(job(7, 1, false));
        api.push_jobs(Ok(vec![job(7, 1, false)]));
        api.push_jobs(Ok(vec![job(7, 1, true)]));

        jobs.create_job(DOMAIN).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.calls("list_jobs"), 0);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(api.calls("list_jobs"), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.calls("list_jobs"), 2);
        assert_eq!(api.calls("get_domain"), 1);
        assert_eq!(jobs.poll_state(DOMAIN), PollState::Idle);

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(api.calls("list_jobs"), 2);
        assert!(lock(&jobs.watchers).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_unwatched_poll() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.set_created_job(job(7, 1, false));
        api.push_jobs(Ok(vec![job(7, 1, false)]));

        jobs.create_job(DOMAIN).await.unwrap();
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(api.calls("list_jobs"), 1);

        jobs.shutdown();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.calls("list_jobs"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_takes_over_unwatched_poll() {
        let api = MockApi::new();
        let (_, jobs) = stores(&api);
        api.set_created_job(job(7, 1, false));
        api.push_jobs(Ok(vec![job(7, 1, false)]));

        jobs.create_job(DOMAIN).await.unwrap();
        let _watch = jobs.watch(DOMAIN);
        tokio::time::sleep(Duration::from_secs(25)).await;

        // only the watcher runs: t=0, 10, 20
        assert_eq!(api.calls("list_jobs"), 3);
    }

    #[test]
    fn merge_keeps_order_of_first_appearance() {
        let merged = merge_by_id(
            vec![job(1, 1, false), job(2, 1, false)],
            vec![job(2, 1, true), job(5, 1, false)],
        );
        let ids: Vec<_> = merged.iter().map(|j| j.id).collect();
        assert_eq!(ids, [1, 2, 5]);
        assert!(merged[1].is_finished());
    }
}
