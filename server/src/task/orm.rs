use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;

use crate::entities::*;
use crate::task::{Task, TaskDraft, TaskStore, TaskStoreError};

/// Durable task store backed by a SeaORM connection.
///
/// Every mutation runs inside its own transaction and is committed before
/// the call returns. Identity comes from the table's auto-increment
/// primary key.
pub struct DbTaskStore {
    db: DatabaseConnection,
}

impl DbTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for DbTaskStore {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, draft: TaskDraft) -> Result<Task, TaskStoreError> {
        let txn = self.db.begin().await?;

        let active_model = task::ActiveModel {
            title: ActiveValue::Set(draft.title),
            description: ActiveValue::Set(draft.description),
            priority: ActiveValue::Set(draft.priority),
            completed: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let created_model = active_model.insert(&txn).await?;

        txn.commit().await?;
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Task>, TaskStoreError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Task, TaskStoreError> {
        let task_model = task::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TaskStoreError::TaskNotFound(id))?;
        Ok(Task::from(task_model))
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: i32, draft: TaskDraft) -> Result<Task, TaskStoreError> {
        let txn = self.db.begin().await?;

        let task_to_update = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TaskStoreError::TaskNotFound(id))?;

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.title = ActiveValue::Set(draft.title);
        active_model.description = ActiveValue::Set(draft.description);
        active_model.priority = ActiveValue::Set(draft.priority);
        let updated_model = active_model.update(&txn).await?;

        txn.commit().await?;
        Ok(Task::from(updated_model))
    }

    #[tracing::instrument(skip(self))]
    async fn toggle_completed(&self, id: i32) -> Result<Task, TaskStoreError> {
        let txn = self.db.begin().await?;

        let task_to_toggle = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TaskStoreError::TaskNotFound(id))?;

        let completed = task_to_toggle.completed;
        let mut active_model: task::ActiveModel = task_to_toggle.into();
        active_model.completed = ActiveValue::Set(!completed);
        let updated_model = active_model.update(&txn).await?;

        txn.commit().await?;
        Ok(Task::from(updated_model))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<Task, TaskStoreError> {
        let txn = self.db.begin().await?;

        let task_to_delete = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TaskStoreError::TaskNotFound(id))?;

        let deleted_task = Task::from(task_to_delete.clone());
        task::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(deleted_task)
    }
}
