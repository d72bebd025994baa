//! Task Manager
//!
//! Application-level state over a `TaskStore`: the loaded lists, search
//! term, settings, loading flag and the current error. Every mutation goes
//! to storage first and then re-reads the whole collection.

mod error;


use std::sync::Arc;

use log::{error, info, warn};

use crate::domain::{
    CompletionStats, DomainResult, Priority, Settings, SettingsPatch, TaskList,
};
use crate::reorder::{ReorderRequest, ReorderScope};
use crate::repository::TaskStore;

pub use error::ManagerError;

pub struct TaskManager {
    store: Arc<dyn TaskStore>,
    lists: Vec<TaskList>,
    search_term: String,
    settings: Settings,
    is_loading: bool,
    error: Option<ManagerError>,
}

impl TaskManager {
    /// Manager in the loading state. Call `load` to populate it.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            lists: Vec::new(),
            search_term: String::new(),
            settings: Settings::default(),
            is_loading: true,
            error: None,
        }
    }

    pub async fn open(store: Arc<dyn TaskStore>) -> Self {
        let mut manager = Self::new(store);
        manager.load().await;
        manager
    }

    /// Initialize storage and read lists and settings
    pub async fn load(&mut self) {
        self.is_loading = true;
        match self.fetch_all().await {
            Ok((lists, settings)) => {
                info!("Loaded {} lists", lists.len());
                self.lists = lists;
                self.settings = settings;
                self.error = None;
            }
            Err(source) => {
                error!("Failed to load workspace: {}", source);
                self.error = Some(ManagerError::Initialization(source));
            }
        }
        self.is_loading = false;
    }

    async fn fetch_all(&self) -> DomainResult<(Vec<TaskList>, Settings)> {
        self.store.initialize().await?;
        let (lists, settings) = tokio::join!(self.store.list_all(), self.store.get_settings());
        Ok((lists?, settings?))
    }

    /// Refetch after a storage call and record its outcome
    async fn finish(&mut self, action: &'static str, outcome: DomainResult<()>) {
        let refetched = match self.store.list_all().await {
            Ok(lists) => {
                self.lists = lists;
                Ok(())
            }
            Err(err) => Err(err),
        };

        match outcome.and(refetched) {
            Ok(()) => self.error = None,
            Err(source) => {
                error!("Failed to {}: {}", action, source);
                self.error = Some(ManagerError::Operation { action, source });
            }
        }
    }

    fn reject_blank(&mut self, entity: &'static str, title: &str) -> bool {
        if title.trim().is_empty() {
            warn!("Rejected {} with empty title", entity.to_lowercase());
            self.error = Some(ManagerError::Validation { entity });
            return true;
        }
        false
    }

    // ========================================================================
    // Lists
    // ========================================================================

    pub async fn create_list(&mut self, title: &str, description: &str) {
        if self.reject_blank("List", title) {
            return;
        }
        let outcome = self.store.create_list(title, description).await.map(|_| ());
        self.finish("create list", outcome).await;
    }

    pub async fn update_list(&mut self, id: &str, title: &str, description: &str) {
        if self.reject_blank("List", title) {
            return;
        }
        let outcome = self.store.update_list(id, title, description).await;
        self.finish("update list", outcome).await;
    }

    pub async fn delete_list(&mut self, id: &str) {
        let outcome = self.store.delete_list(id).await;
        self.finish("delete list", outcome).await;
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    pub async fn create_task(
        &mut self,
        list_id: &str,
        title: &str,
        description: &str,
        priority: Priority,
    ) {
        if self.reject_blank("Task", title) {
            return;
        }
        let outcome = self
            .store
            .create_task(list_id, title, description, priority)
            .await
            .map(|_| ());
        self.finish("create task", outcome).await;
    }

    pub async fn update_task(
        &mut self,
        id: &str,
        title: &str,
        description: &str,
        priority: Priority,
    ) {
        if self.reject_blank("Task", title) {
            return;
        }
        let outcome = self
            .store
            .update_task(id, title, description, priority)
            .await;
        self.finish("update task", outcome).await;
    }

    pub async fn toggle_task(&mut self, id: &str) {
        let outcome = self.store.toggle_task(id).await;
        self.finish("update task", outcome).await;
    }

    pub async fn delete_task(&mut self, id: &str) {
        let outcome = self.store.delete_task(id).await;
        self.finish("delete task", outcome).await;
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Persist `ids` as lists 1..N
    pub async fn reorder_lists(&mut self, ids: &[String]) {
        let outcome = self.write_orders(ReorderScope::Lists, ids).await;
        self.finish("reorder lists", outcome).await;
    }

    /// Persist `ids` as tasks 1..N within their list
    pub async fn reorder_tasks(&mut self, ids: &[String]) {
        let outcome = self.write_orders(ReorderScope::Tasks, ids).await;
        self.finish("reorder tasks", outcome).await;
    }

    /// Dispatch a finished drag gesture
    pub async fn apply_reorder(&mut self, request: ReorderRequest) {
        match request {
            ReorderRequest::Lists(ids) => self.reorder_lists(&ids).await,
            ReorderRequest::Tasks(ids) => self.reorder_tasks(&ids).await,
        }
    }

    /// One write per id; stops at the first failure
    async fn write_orders(&self, scope: ReorderScope, ids: &[String]) -> DomainResult<()> {
        for (index, id) in ids.iter().enumerate() {
            let order = index as i64 + 1;
            match scope {
                ReorderScope::Lists => self.store.set_list_order(id, order).await?,
                ReorderScope::Tasks => self.store.set_task_order(id, order).await?,
            }
        }
        Ok(())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Save the theme, re-read settings, then refetch like every mutation
    pub async fn update_theme_color(&mut self, color: &str) {
        let patch = SettingsPatch::theme_color(color);
        let outcome = match self.store.set_settings(&patch).await {
            Ok(()) => self.store.get_settings().await.map(|settings| {
                info!("Theme changed to {}", settings.theme_color);
                self.settings = settings;
            }),
            Err(err) => Err(err),
        };
        self.finish("update theme", outcome).await;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Lists matching the search term
    pub fn lists(&self) -> Vec<&TaskList> {
        if self.search_term.is_empty() {
            return self.lists.iter().collect();
        }
        self.lists
            .iter()
            .filter(|list| list.matches(&self.search_term))
            .collect()
    }

    pub fn all_lists(&self) -> &[TaskList] {
        &self.lists
    }

    pub fn find_list(&self, id: &str) -> Option<&TaskList> {
        self.lists.iter().find(|list| list.id == id)
    }

    /// Totals over every list, ignoring the search term
    pub fn completion_stats(&self) -> CompletionStats {
        CompletionStats::from_lists(&self.lists)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&ManagerError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}
