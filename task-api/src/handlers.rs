use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::{SortOrder, Store, TaskFilter};
use crate::error::ApiError;
use crate::models::{
    AssignTasksRequest, GoalBody, GoalRequest, GoalTasksBody, TaskBody, TaskRequest,
};
use crate::AppState;

const TASK_FIELDS: &str = "Must include task title and description";
const GOAL_FIELDS: &str = "Must include goal title";
const TASK_IDS: &str = "Must include task ids";

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::InvalidId)
}

/// Shared lookup contract: non-integer id is a 400, unknown id a 404.
async fn find_task(store: &Store, raw_id: &str) -> Result<crate::models::Task, ApiError> {
    let id = parse_id(raw_id)?;
    store.get_task(id).await?.ok_or(ApiError::NotFound)
}

async fn find_goal(store: &Store, raw_id: &str) -> Result<crate::models::Goal, ApiError> {
    let id = parse_id(raw_id)?;
    store.get_goal(id).await?.ok_or(ApiError::NotFound)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ── Task routes ──────────────────────────────────────────────────────────

pub async fn create_task(
    State(state): State<AppState>,
    body: Option<Json<TaskRequest>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(Json(body)) = body else {
        return Err(ApiError::InvalidData);
    };
    let (Some(title), Some(description)) = (body.title, body.description) else {
        return Err(ApiError::InvalidData);
    };

    let task = state.store.create_task(&title, &description).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "task": TaskBody::from(task) })),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    title: Option<String>,
    sort: Option<String>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskBody>>, ApiError> {
    let filter = TaskFilter {
        title: query.title,
        // Any other sort value falls through to store order.
        order: match query.sort.as_deref() {
            Some("asc") => Some(SortOrder::Asc),
            Some("desc") => Some(SortOrder::Desc),
            _ => None,
        },
    };

    let tasks = state.store.list_tasks(&filter).await?;
    Ok(Json(tasks.into_iter().map(TaskBody::from).collect()))
}

pub async fn get_task(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let task = find_task(&state.store, &task_id).await?;
    Ok(Json(json!({ "task": TaskBody::from(task) })))
}

pub async fn update_task(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
    body: Option<Json<TaskRequest>>,
) -> Result<Json<Value>, ApiError> {
    let task = find_task(&state.store, &task_id).await?;

    let Some(Json(body)) = body else {
        return Err(ApiError::MissingFields(TASK_FIELDS));
    };
    let (Some(title), Some(description)) = (body.title, body.description) else {
        return Err(ApiError::MissingFields(TASK_FIELDS));
    };

    let updated = state
        .store
        .update_task(task.id, &title, &description)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "task": TaskBody::from(updated) })))
}

pub async fn delete_task(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let task = find_task(&state.store, &task_id).await?;
    state.store.delete_task(task.id).await?;

    let details = format!("Task {} \"{}\" successfully deleted", task.id, task.title);
    Ok(Json(json!({ "details": details })))
}

pub async fn mark_task_complete(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&task_id)?;
    let task = state
        .store
        .set_task_completion(id, Some(Utc::now()))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "task": TaskBody::from(task) })))
}

pub async fn mark_task_incomplete(
    Path(task_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&task_id)?;
    let task = state
        .store
        .set_task_completion(id, None)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "task": TaskBody::from(task) })))
}

// ── Goal routes ──────────────────────────────────────────────────────────

pub async fn create_goal(
    State(state): State<AppState>,
    body: Option<Json<GoalRequest>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(Json(GoalRequest { title: Some(title) })) = body else {
        return Err(ApiError::InvalidData);
    };

    let goal = state.store.create_goal(&title).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "goal": GoalBody::from(goal) })),
    ))
}

pub async fn list_goals(
    State(state): State<AppState>,
) -> Result<Json<Vec<GoalBody>>, ApiError> {
    let goals = state.store.list_goals().await?;
    Ok(Json(goals.into_iter().map(GoalBody::from).collect()))
}

pub async fn get_goal(
    Path(goal_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let goal = find_goal(&state.store, &goal_id).await?;
    Ok(Json(json!({ "goal": GoalBody::from(goal) })))
}

pub async fn update_goal(
    Path(goal_id): Path<String>,
    State(state): State<AppState>,
    body: Option<Json<GoalRequest>>,
) -> Result<Json<Value>, ApiError> {
    let goal = find_goal(&state.store, &goal_id).await?;

    let Some(Json(GoalRequest { title: Some(title) })) = body else {
        return Err(ApiError::MissingFields(GOAL_FIELDS));
    };

    let updated = state
        .store
        .update_goal(goal.id, &title)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "goal": GoalBody::from(updated) })))
}

pub async fn delete_goal(
    Path(goal_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let goal = find_goal(&state.store, &goal_id).await?;
    state.store.delete_goal(goal.id).await?;

    let details = format!("Goal {} \"{}\" successfully deleted", goal.id, goal.title);
    Ok(Json(json!({ "details": details })))
}

// ── Linked routes ────────────────────────────────────────────────────────

pub async fn list_goal_tasks(
    Path(goal_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<GoalTasksBody>, ApiError> {
    let goal = find_goal(&state.store, &goal_id).await?;
    let tasks = state.store.tasks_for_goal(goal.id).await?;

    Ok(Json(GoalTasksBody {
        id: goal.id,
        title: goal.title,
        tasks: tasks.into_iter().map(TaskBody::from).collect(),
    }))
}

pub async fn assign_goal_tasks(
    Path(goal_id): Path<String>,
    State(state): State<AppState>,
    body: Option<Json<AssignTasksRequest>>,
) -> Result<Json<Value>, ApiError> {
    let goal = find_goal(&state.store, &goal_id).await?;

    let Some(Json(AssignTasksRequest {
        task_ids: Some(task_ids),
    })) = body
    else {
        return Err(ApiError::MissingFields(TASK_IDS));
    };

    // Every referenced task must exist before anything is linked.
    for task_id in &task_ids {
        state
            .store
            .get_task(*task_id)
            .await?
            .ok_or(ApiError::NotFound)?;
    }

    state.store.assign_tasks_to_goal(goal.id, &task_ids).await?;
    Ok(Json(json!({ "id": goal.id, "task_ids": task_ids })))
}
