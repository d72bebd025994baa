//! Task List Entity
//!
//! A titled, ordered collection of tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Ordered by (order, created_at)
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    /// 1-based position among all lists
    pub order: i64,
}

impl TaskList {
    /// Case-insensitive search over the list and its tasks.
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.tasks.iter().any(|task| task.matches(&needle))
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    pub fn task_ids(&self) -> Vec<String> {
        self.tasks.iter().map(|task| task.id.clone()).collect()
    }
}

impl Entity for TaskList {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

/// Completion totals across lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
    /// Rounded to the nearest integer, 0 when there are no tasks
    pub percentage: u32,
}

impl CompletionStats {
    pub fn from_lists(lists: &[TaskList]) -> Self {
        let total: usize = lists.iter().map(|list| list.tasks.len()).sum();
        let completed: usize = lists.iter().map(TaskList::completed_count).sum();
        let percentage = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };

        Self {
            total,
            completed,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;

    fn task(id: &str, title: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            completed,
            priority: Priority::None,
            created_at: Utc::now(),
            order: 0,
        }
    }

    fn list(title: &str, tasks: Vec<Task>) -> TaskList {
        TaskList {
            id: title.to_lowercase(),
            title: title.to_string(),
            description: String::new(),
            tasks,
            created_at: Utc::now(),
            order: 0,
        }
    }

    #[test]
    fn test_list_matches_title_and_tasks() {
        let groceries = list("Groceries", vec![]);
        let work = list("Work", vec![task("t1", "Buy milk", false)]);

        assert!(!groceries.matches("milk"));
        assert!(work.matches("MILK"));
        assert!(groceries.matches(""));
    }

    #[test]
    fn test_completion_stats() {
        let lists = vec![
            list(
                "A",
                vec![task("1", "a", true), task("2", "b", true), task("3", "c", false)],
            ),
            list("B", vec![]),
        ];

        let stats = CompletionStats::from_lists(&lists);
        assert_eq!(
            stats,
            CompletionStats {
                total: 3,
                completed: 2,
                percentage: 67
            }
        );
    }

    #[test]
    fn test_completion_stats_empty() {
        assert_eq!(CompletionStats::from_lists(&[]), CompletionStats::default());
        assert_eq!(CompletionStats::from_lists(&[list("Empty", vec![])]).percentage, 0);
    }

    #[test]
    fn test_completion_stats_rounds_half_up() {
        let lists = vec![list(
            "Half",
            vec![task("1", "a", true), task("2", "b", false)],
        )];
        assert_eq!(CompletionStats::from_lists(&lists).percentage, 50);

        let eighths: Vec<Task> = (0..8).map(|i| task(&i.to_string(), "t", i < 1)).collect();
        // 12.5% rounds up
        assert_eq!(CompletionStats::from_lists(&[list("E", eighths)]).percentage, 13);
    }
}
