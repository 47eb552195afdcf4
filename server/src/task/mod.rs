use crate::entities::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod memory;
pub mod orm;
pub mod web;

#[derive(Debug, PartialEq, Clone)]
pub struct Task {
    id: i32,
    title: String,
    description: Option<String>,
    priority: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: i32,
        title: String,
        description: Option<String>,
        priority: String,
        completed: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            priority,
            completed,
            created_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the priority tag of the task.
    pub fn priority(&self) -> &str {
        &self.priority
    }

    /// Returns whether the task has been completed.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the creation timestamp of the task.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.title,
            model.description,
            model.priority,
            model.completed,
            model.created_at,
        )
    }
}

/// A validated task input: the caller-supplied fields of a task, not yet
/// bound to an identity.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
}

/// Error type for task store operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Storage backend for task records.
///
/// The store owns identity assignment and the collection itself; handlers
/// receive an implementation through shared state instead of reaching for
/// global mutable data. Two implementations exist: [`memory::InMemoryTaskStore`]
/// for process-lifetime storage and [`orm::DbTaskStore`] for a relational
/// table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new task, assigning the next unique ID, a fresh creation
    /// timestamp, and `completed = false`.
    ///
    /// # Arguments
    ///
    /// * `draft` - The validated task fields to store.
    ///
    /// # Returns
    ///
    /// A `Result` containing the full stored `Task` if successful, or an
    /// error otherwise.
    async fn insert(&self, draft: TaskDraft) -> Result<Task, TaskStoreError>;

    /// Retrieves all task records from the store.
    async fn list(&self) -> Result<Vec<Task>, TaskStoreError>;

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if found, or
    /// `TaskStoreError::TaskNotFound` otherwise.
    async fn find_by_id(&self, id: i32) -> Result<Task, TaskStoreError>;

    /// Replaces the title, description, and priority of a task in place,
    /// leaving `completed` and `created_at` untouched.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `draft` - The new task fields.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or
    /// `TaskStoreError::TaskNotFound` if the ID is absent.
    async fn update(&self, id: i32, draft: TaskDraft) -> Result<Task, TaskStoreError>;

    /// Flips the completion flag of a task.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to toggle.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or
    /// `TaskStoreError::TaskNotFound` if the ID is absent.
    async fn toggle_completed(&self, id: i32) -> Result<Task, TaskStoreError>;

    /// Removes a task permanently. IDs are never reused afterwards.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Task` if successful, or
    /// `TaskStoreError::TaskNotFound` if the ID is absent.
    async fn delete(&self, id: i32) -> Result<Task, TaskStoreError>;
}
