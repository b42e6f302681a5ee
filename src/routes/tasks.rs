use crate::{
    attachments::{AttachmentManager, Upload},
    auth::AuthenticatedUser,
    error::AppError,
    models::{Attachment, Task, TaskWithAttachment},
};
use actix_multipart::form::{bytes::Bytes as UploadedFile, text::Text, MultipartForm};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Multipart body for task create and update.
#[derive(Debug, MultipartForm)]
pub struct TaskForm {
    pub title: Option<Text<String>>,
    pub description: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub attachment: Option<UploadedFile>,
}

fn required_title(title: Option<Text<String>>) -> Result<String, AppError> {
    title
        .map(|t| t.into_inner().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("title is required".into()))
}

/// Turns the multipart file field into an upload, ignoring empty payloads.
fn upload_from(attachment: Option<UploadedFile>) -> Option<Upload> {
    let file = attachment.filter(|f| !f.data.is_empty())?;
    Some(Upload {
        filename: file
            .file_name
            .clone()
            .unwrap_or_else(|| "attachment".to_string()),
        content_type: file
            .content_type
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        data: file.data,
    })
}

/// Lists the caller's tasks, newest first.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, user_id, created_at, updated_at
         FROM tasks WHERE user_id = $1
         ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": tasks })))
}

/// Creates a task for the caller, uploading its attachment when one is
/// present.
///
/// The task row and the attachment row share one transaction; the object
/// upload happens before the attachment row so a failed commit cannot leave
/// a row referencing nothing.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    manager: web::Data<AttachmentManager>,
    user: AuthenticatedUser,
    MultipartForm(form): MultipartForm<TaskForm>,
) -> Result<impl Responder, AppError> {
    let title = required_title(form.title)?;
    let description = form.description.map(|d| d.into_inner());
    let upload = upload_from(form.attachment);
    let has_attachment = upload.is_some();

    let draft = Task::new(title, description, user.id);

    let mut tx = pool.begin().await?;

    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, title, description, user_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, title, description, user_id, created_at, updated_at",
    )
    .bind(draft.id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.user_id)
    .bind(draft.created_at)
    .bind(draft.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(upload) = upload {
        manager.attach(&mut tx, task.id, upload).await?;
    }

    tx.commit().await?;

    let mut data = serde_json::to_value(&task).map_err(|e| AppError::Internal(e.to_string()))?;
    data["attachment"] = json!(has_attachment);

    Ok(HttpResponse::Created().json(json!({ "success": true, "data": data })))
}

/// Fetches one of the caller's tasks, with its attachment if any.
///
/// A task owned by someone else yields the same 404 as a missing one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let task = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, user_id, created_at, updated_at
         FROM tasks WHERE id = $1 AND user_id = $2",
    )
    .bind(task_id)
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("task not found".into()))?;

    let attachment = sqlx::query_as::<_, Attachment>(
        "SELECT id, task_id, file_name, file_url, file_type
         FROM attachments WHERE task_id = $1",
    )
    .bind(task_id)
    .fetch_optional(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": TaskWithAttachment { task, attachment }
    })))
}

/// Updates title/description of one of the caller's tasks, replacing its
/// attachment when the request carries a new payload. Owner and id are
/// immutable.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    manager: web::Data<AttachmentManager>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
    MultipartForm(form): MultipartForm<TaskForm>,
) -> Result<impl Responder, AppError> {
    let title = required_title(form.title)?;
    let description = form.description.map(|d| d.into_inner());
    let upload = upload_from(form.attachment);
    let task_id = task_id.into_inner();

    let mut tx = pool.begin().await?;

    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks SET title = $1, description = $2, updated_at = now()
         WHERE id = $3 AND user_id = $4
         RETURNING id, title, description, user_id, created_at, updated_at",
    )
    .bind(&title)
    .bind(&description)
    .bind(task_id)
    .bind(user.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("task not found".into()))?;

    let attachment = match upload {
        Some(upload) => Some(manager.replace(&mut tx, task.id, upload).await?),
        None => {
            sqlx::query_as::<_, Attachment>(
                "SELECT id, task_id, file_name, file_url, file_type
                 FROM attachments WHERE task_id = $1",
            )
            .bind(task.id)
            .fetch_optional(&mut *tx)
            .await?
        }
    };

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": TaskWithAttachment { task, attachment }
    })))
}

/// Deletes one of the caller's tasks and returns the deleted snapshot.
///
/// Attachment rows go first (referential integrity), then the task row, in
/// one transaction; backing objects are removed best-effort after commit.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    manager: web::Data<AttachmentManager>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let mut tx = pool.begin().await?;

    let keys = sqlx::query_scalar::<_, String>(
        "SELECT a.file_name FROM attachments a
         JOIN tasks t ON t.id = a.task_id
         WHERE t.id = $1 AND t.user_id = $2",
    )
    .bind(task_id)
    .bind(user.id)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query(
        "DELETE FROM attachments
         WHERE task_id IN (SELECT id FROM tasks WHERE id = $1 AND user_id = $2)",
    )
    .bind(task_id)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    let task = sqlx::query_as::<_, Task>(
        "DELETE FROM tasks WHERE id = $1 AND user_id = $2
         RETURNING id, title, description, user_id, created_at, updated_at",
    )
    .bind(task_id)
    .bind(user.id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("task not found".into()))?;

    tx.commit().await?;

    // Rows are gone; object removal is best-effort from here on.
    manager.remove_objects(&keys).await;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": task })))
}
