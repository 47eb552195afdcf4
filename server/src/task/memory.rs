use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::task::{Task, TaskDraft, TaskStore, TaskStoreError};

/// Process-lifetime task store backed by a mutex-guarded list.
///
/// Records are kept in insertion order and IDs come from a counter that is
/// never decremented, so an ID is never reused after deletion. All state is
/// lost on process restart.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    tasks: Vec<Task>,
    next_id: i32,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, draft: TaskDraft) -> Result<Task, TaskStoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let task = Task::new(
            id,
            draft.title,
            draft.description,
            draft.priority,
            false,
            Utc::now(),
        );
        inner.tasks.push(task.clone());
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Task>, TaskStoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Task, TaskStoreError> {
        let inner = self.inner.lock().await;
        inner
            .tasks
            .iter()
            .find(|task| task.id() == id)
            .cloned()
            .ok_or(TaskStoreError::TaskNotFound(id))
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: i32, draft: TaskDraft) -> Result<Task, TaskStoreError> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TaskStoreError::TaskNotFound(id))?;

        let existing = &inner.tasks[position];
        let updated = Task::new(
            id,
            draft.title,
            draft.description,
            draft.priority,
            existing.completed(),
            existing.created_at(),
        );
        inner.tasks[position] = updated.clone();
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    async fn toggle_completed(&self, id: i32) -> Result<Task, TaskStoreError> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TaskStoreError::TaskNotFound(id))?;

        let existing = &inner.tasks[position];
        let toggled = Task::new(
            id,
            existing.title().to_string(),
            existing.description().map(|description| description.to_string()),
            existing.priority().to_string(),
            !existing.completed(),
            existing.created_at(),
        );
        inner.tasks[position] = toggled.clone();
        Ok(toggled)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<Task, TaskStoreError> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TaskStoreError::TaskNotFound(id))?;

        Ok(inner.tasks.remove(position))
    }
}
