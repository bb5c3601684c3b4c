//! A planning session: the grid plus its cache and remote copies.
//!
//! ## Lifecycle
//!
//! 1. [`PlanSession::open`] reads the local cache (empty plan if missing or
//!    unreadable) so the grid is usable immediately.
//! 2. [`PlanSession::init`] fetches the remote plan for the user. A remote
//!    plan replaces the local state wholesale and is written to the cache.
//! 3. Each mutation saves the cache synchronously, then (re)starts the
//!    debounce timer. When it expires, the latest state is pushed.
//!
//! Failures in any of these steps are logged and otherwise ignored: the
//! in-memory plan stays the source of truth for the session.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::debounce::Debouncer;
use crate::models::{Day, MacroTotals, Meal, MealType, WeeklyPlan};
use crate::planner::{DragSession, DropOutcome, WeeklyPlanStore};
use crate::remote::RemotePlanStore;
use crate::storage::LocalPlanStorage;

/// Delay between the last mutation and the remote save.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Where the session's current plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    /// Fetched from the remote store
    Remote,
    /// Read from the local cache
    Local,
    /// Neither copy existed
    Empty,
}

impl std::fmt::Display for PlanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanSource::Remote => write!(f, "remote"),
            PlanSource::Local => write!(f, "local cache"),
            PlanSource::Empty => write!(f, "empty"),
        }
    }
}

/// Owns the weekly plan for one view and keeps its copies in step.
///
/// Must be used inside a tokio runtime.
pub struct PlanSession {
    store: WeeklyPlanStore,
    drag: DragSession,
    cache: LocalPlanStorage,
    remote: Option<Arc<dyn RemotePlanStore>>,
    user_id: Option<String>,
    debouncer: Debouncer,
    latest: watch::Sender<WeeklyPlan>,
    source: PlanSource,
}

impl PlanSession {
    /// Opens a session on the cached plan.
    pub fn open(cache: LocalPlanStorage, debounce: Duration) -> Self {
        let (plan, source) = match cache.load() {
            Ok(Some(plan)) => (plan, PlanSource::Local),
            Ok(None) => (WeeklyPlan::new(), PlanSource::Empty),
            Err(e) => {
                tracing::warn!("Starting with an empty plan: {}", e);
                (WeeklyPlan::new(), PlanSource::Empty)
            }
        };
        let (latest, _) = watch::channel(plan.clone());

        Self {
            store: WeeklyPlanStore::new(plan),
            drag: DragSession::new(),
            cache,
            remote: None,
            user_id: None,
            debouncer: Debouncer::new(debounce),
            latest,
            source,
        }
    }

    /// Attaches the remote store. Without a user id nothing is fetched or pushed.
    pub fn with_remote(
        mut self,
        remote: Arc<dyn RemotePlanStore>,
        user_id: Option<String>,
    ) -> Self {
        self.remote = Some(remote);
        self.user_id = user_id.filter(|id| !id.is_empty());
        self
    }

    /// Adopts the remote plan if one exists.
    ///
    /// The remote copy wins outright; local edits it does not contain are
    /// lost. On fetch failure the current state is kept.
    pub async fn init(&mut self) -> PlanSource {
        let Some((remote, user_id)) = self.remote_target() else {
            return self.source;
        };

        match remote.fetch_plan(&user_id).await {
            Ok(Some(plan)) => {
                if &plan != self.store.plan() && self.source == PlanSource::Local {
                    tracing::info!("Remote plan replaces the local cache for {}", user_id);
                }
                self.store.replace(plan);
                self.save_cache();
                self.latest.send_replace(self.store.plan().clone());
                self.source = PlanSource::Remote;
            }
            Ok(None) => {
                tracing::debug!("No remote plan for {}, keeping {}", user_id, self.source);
            }
            Err(e) => {
                tracing::warn!("Failed to load remote plan: {}", e);
            }
        }
        self.source
    }

    pub fn source(&self) -> PlanSource {
        self.source
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn plan(&self) -> &WeeklyPlan {
        self.store.plan()
    }

    pub fn store(&self) -> &WeeklyPlanStore {
        &self.store
    }

    /// Receives every state the session commits.
    pub fn subscribe(&self) -> watch::Receiver<WeeklyPlan> {
        self.latest.subscribe()
    }

    pub fn daily_summary(&self, day: Day) -> MacroTotals {
        self.store.daily_summary(day)
    }

    pub fn filtered_view(&self, query: &str) -> Cow<'_, WeeklyPlan> {
        self.store.filtered_view(query)
    }

    pub fn assign(&mut self, day: Day, meal_type: MealType, meal: Arc<Meal>) {
        self.store.assign(day, meal_type, meal);
        self.mutated();
    }

    pub fn clear(&mut self, day: Day, meal_type: MealType) {
        self.store.clear(day, meal_type);
        self.mutated();
    }

    /// Empties the whole week. Callers confirm with the user first.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
        self.mutated();
    }

    pub fn drag_start(&mut self, meal_id: impl Into<String>) {
        self.drag.start(meal_id);
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    pub fn drag_end(&mut self, target: &str) -> DropOutcome {
        let outcome = self.drag.end(&mut self.store, target);
        if outcome.changed_plan() {
            self.mutated();
        }
        outcome
    }

    /// True while a remote save is waiting for its debounce delay.
    pub fn push_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Pushes a pending save now instead of waiting for the timer.
    ///
    /// Returns true if a save was attempted.
    pub async fn flush(&mut self) -> bool {
        if !self.debouncer.cancel() {
            return false;
        }
        let Some((remote, user_id)) = self.remote_target() else {
            return false;
        };
        push(remote.as_ref(), &user_id, self.store.plan()).await;
        true
    }

    fn mutated(&mut self) {
        self.save_cache();
        self.latest.send_replace(self.store.plan().clone());
        self.schedule_push();
    }

    fn save_cache(&self) {
        if let Err(e) = self.cache.save(self.store.plan()) {
            tracing::warn!("Failed to cache plan: {}", e);
        }
    }

    fn schedule_push(&mut self) {
        let Some((remote, user_id)) = self.remote_target() else {
            return;
        };
        let latest = self.latest.subscribe();
        self.debouncer.schedule(async move {
            let plan = latest.borrow().clone();
            push(remote.as_ref(), &user_id, &plan).await;
        });
        tracing::debug!("Remote save scheduled in {:?}", self.debouncer.delay());
    }

    fn remote_target(&self) -> Option<(Arc<dyn RemotePlanStore>, String)> {
        match (&self.remote, &self.user_id) {
            (Some(remote), Some(user_id)) => Some((Arc::clone(remote), user_id.clone())),
            _ => None,
        }
    }
}

async fn push(remote: &dyn RemotePlanStore, user_id: &str, plan: &WeeklyPlan) {
    match remote.save_plan(user_id, plan).await {
        Ok(()) => tracing::info!(
            "Saved plan for {} ({} meal(s))",
            user_id,
            plan.meal_count()
        ),
        Err(e) => tracing::warn!("Failed to save plan: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteError;
    use crate::models::SlotId;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeRemote {
        stored: Mutex<Option<WeeklyPlan>>,
        saves: Mutex<Vec<WeeklyPlan>>,
        fetches: Mutex<usize>,
        offline: bool,
    }

    impl FakeRemote {
        fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        fn with_plan(plan: WeeklyPlan) -> Self {
            Self {
                stored: Mutex::new(Some(plan)),
                ..Self::default()
            }
        }

        fn saves(&self) -> Vec<WeeklyPlan> {
            self.saves.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemotePlanStore for FakeRemote {
        async fn fetch_plan(&self, _user_id: &str) -> Result<Option<WeeklyPlan>, RemoteError> {
            *self.fetches.lock().unwrap() += 1;
            if self.offline {
                return Err(RemoteError::MissingUserId);
            }
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save_plan(&self, _user_id: &str, plan: &WeeklyPlan) -> Result<(), RemoteError> {
            self.saves.lock().unwrap().push(plan.clone());
            if self.offline {
                return Err(RemoteError::MissingUserId);
            }
            *self.stored.lock().unwrap() = Some(plan.clone());
            Ok(())
        }
    }

    fn meal(id: &str, name: &str) -> Arc<Meal> {
        Arc::new(Meal::new(id, name).with_macros(400.0, 25.0, 40.0, 12.0))
    }

    fn plan_with(day: Day, meal_type: MealType, m: Arc<Meal>) -> WeeklyPlan {
        let mut plan = WeeklyPlan::new();
        plan.set(SlotId::new(day, meal_type), Some(m));
        plan
    }

    fn session(temp: &TempDir, remote: &Arc<FakeRemote>) -> PlanSession {
        let remote: Arc<dyn RemotePlanStore> = remote.clone();
        PlanSession::open(LocalPlanStorage::new(temp.path()), DEFAULT_DEBOUNCE)
            .with_remote(remote, Some("user-1".to_string()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_mutations_coalesce_into_one_save() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut session = session(&temp, &remote);

        session.assign(Day::Monday, MealType::Breakfast, meal("a", "Oats"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        session.assign(Day::Monday, MealType::Lunch, meal("b", "Salad"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        session.clear(Day::Monday, MealType::Breakfast);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(remote.saves().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let saves = remote.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(&saves[0], session.plan());
        assert_eq!(saves[0].meal_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_in_separate_windows_save_separately() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut session = session(&temp, &remote);

        session.assign(Day::Monday, MealType::Breakfast, meal("a", "Oats"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        session.assign(Day::Tuesday, MealType::Dinner, meal("b", "Stew"));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let saves = remote.saves();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].meal_count(), 1);
        assert_eq!(saves[1].meal_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_is_written_before_remote() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut session = session(&temp, &remote);

        session.assign(Day::Friday, MealType::Dinner, meal("a", "Pizza"));

        let cached = LocalPlanStorage::new(temp.path()).load().unwrap();
        assert_eq!(cached.as_ref(), Some(session.plan()));
        assert!(remote.saves().is_empty());
        assert!(session.push_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_plan_wins_over_cache() {
        let temp = TempDir::new().unwrap();
        let local = plan_with(Day::Monday, MealType::Breakfast, meal("l", "Local Oats"));
        let remote_plan = plan_with(Day::Sunday, MealType::Dinner, meal("r", "Remote Roast"));
        LocalPlanStorage::new(temp.path()).save(&local).unwrap();

        let remote = Arc::new(FakeRemote::with_plan(remote_plan.clone()));
        let mut session = session(&temp, &remote);
        assert_eq!(session.source(), PlanSource::Local);
        assert_eq!(session.plan(), &local);

        assert_eq!(session.init().await, PlanSource::Remote);
        assert_eq!(session.plan(), &remote_plan);

        let cached = LocalPlanStorage::new(temp.path()).load().unwrap();
        assert_eq!(cached, Some(remote_plan));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_keeps_local_state() {
        let temp = TempDir::new().unwrap();
        let local = plan_with(Day::Monday, MealType::Breakfast, meal("l", "Local Oats"));
        LocalPlanStorage::new(temp.path()).save(&local).unwrap();

        let remote = Arc::new(FakeRemote::offline());
        let mut session = session(&temp, &remote);

        assert_eq!(session.init().await, PlanSource::Local);
        assert_eq!(session.plan(), &local);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_remote_plan_keeps_empty_default() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut session = session(&temp, &remote);

        assert_eq!(session.init().await, PlanSource::Empty);
        assert!(session.plan().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_user_nothing_is_fetched_or_pushed() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::with_plan(WeeklyPlan::new()));
        let dyn_remote: Arc<dyn RemotePlanStore> = remote.clone();
        let mut session = PlanSession::open(LocalPlanStorage::new(temp.path()), DEFAULT_DEBOUNCE)
            .with_remote(dyn_remote, Some(String::new()));

        session.init().await;
        session.assign(Day::Monday, MealType::Lunch, meal("a", "Wrap"));
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(*remote.fetches.lock().unwrap(), 0);
        assert!(remote.saves().is_empty());
        assert!(!session.push_pending());
        assert!(LocalPlanStorage::new(temp.path()).exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_superseded_by_next_window() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::offline());
        let mut session = session(&temp, &remote);

        session.assign(Day::Monday, MealType::Lunch, meal("a", "Wrap"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        session.assign(Day::Monday, MealType::Dinner, meal("b", "Curry"));
        tokio::time::sleep(Duration::from_secs(2)).await;

        let saves = remote.saves();
        assert_eq!(saves.len(), 2);
        assert_eq!(&saves[1], session.plan());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_end_persists_only_real_moves() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut session = session(&temp, &remote);
        session.assign(Day::Monday, MealType::Breakfast, meal("a", "Oats"));
        session.flush().await;
        assert_eq!(remote.saves().len(), 1);

        session.drag_start("a");
        assert!(matches!(
            session.drag_end("Monday-breakfast"),
            DropOutcome::SameSlot
        ));
        assert!(!session.push_pending());

        session.drag_start("a");
        assert!(session.drag_end("Wednesday-dinner").changed_plan());
        assert!(session.push_pending());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let saves = remote.saves();
        assert_eq!(saves.len(), 2);
        assert_eq!(
            saves[1]
                .get(SlotId::new(Day::Wednesday, MealType::Dinner))
                .map(|m| m.id.as_str()),
            Some("a")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_pushes_immediately() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut session = session(&temp, &remote);

        assert!(!session.flush().await);

        session.assign(Day::Saturday, MealType::Lunch, meal("a", "Burger"));
        assert!(session.flush().await);
        assert_eq!(remote.saves().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(remote.saves().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_committed_state() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let mut session = session(&temp, &remote);
        let mut updates = session.subscribe();

        session.clear_all();
        session.assign(Day::Monday, MealType::Dinner, meal("a", "Stew"));

        assert!(updates.has_changed().unwrap());
        assert_eq!(&*updates.borrow_and_update(), session.plan());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_plan_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(FakeRemote::default());
        let expected = {
            let mut session = session(&temp, &remote);
            session.assign(Day::Thursday, MealType::Lunch, meal("a", "Pho"));
            session.plan().clone()
        };

        let reopened = PlanSession::open(LocalPlanStorage::new(temp.path()), DEFAULT_DEBOUNCE);
        assert_eq!(reopened.source(), PlanSource::Local);
        assert_eq!(reopened.plan(), &expected);
    }
}
