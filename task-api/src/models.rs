use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Task row as stored. Completion is derived from `completed_at`; there is no
/// stored boolean.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub goal_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Goal {
    pub id: i64,
    pub title: String,
}

/// Body of `POST /tasks` and `PUT /tasks/{id}`. Fields are optional so the
/// handler can reject missing ones with the contract message instead of a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Body of `POST /goals` and `PUT /goals/{id}`.
#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub title: Option<String>,
}

/// Body of `POST /goals/{id}/tasks`.
#[derive(Debug, Deserialize)]
pub struct AssignTasksRequest {
    pub task_ids: Option<Vec<i64>>,
}

/// Wire shape of a single task.
#[derive(Debug, Serialize)]
pub struct TaskBody {
    pub id: i64,
    pub goal_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub is_complete: bool,
}

impl From<Task> for TaskBody {
    fn from(task: Task) -> Self {
        TaskBody {
            id: task.id,
            goal_id: task.goal_id,
            is_complete: task.is_complete(),
            title: task.title,
            description: task.description,
        }
    }
}

/// Wire shape of a single goal.
#[derive(Debug, Serialize)]
pub struct GoalBody {
    pub id: i64,
    pub title: String,
}

impl From<Goal> for GoalBody {
    fn from(goal: Goal) -> Self {
        GoalBody {
            id: goal.id,
            title: goal.title,
        }
    }
}

/// Response of `GET /goals/{id}/tasks`: the goal with its owned tasks inlined.
#[derive(Debug, Serialize)]
pub struct GoalTasksBody {
    pub id: i64,
    pub title: String,
    pub tasks: Vec<TaskBody>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(completed_at: Option<DateTime<Utc>>) -> Task {
        Task {
            id: 1,
            goal_id: None,
            title: "Water the plants".to_string(),
            description: "Front porch only".to_string(),
            completed_at,
        }
    }

    #[test]
    fn completion_is_derived_from_timestamp() {
        assert!(!sample_task(None).is_complete());
        assert!(sample_task(Some(Utc::now())).is_complete());
    }

    #[test]
    fn task_body_carries_derived_completion() {
        let body = TaskBody::from(sample_task(Some(Utc::now())));
        assert!(body.is_complete);
        assert_eq!(body.goal_id, None);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["goal_id"], serde_json::Value::Null);
        assert_eq!(json["is_complete"], true);
    }
}
