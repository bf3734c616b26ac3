//! Tasks (course materials), submissions and reviews.

use gateway::{ApiPath, ApiRequest, FileUpload, FormData, Gateway, GatewayError, Notification, StatusCode, User};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{ServiceError, expect_status, report_failure};

/// Whether a material is reading matter or an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialType {
    /// Lecture material, nothing to hand in.
    Lecture,
    /// An assignment students submit work for.
    Task,
}

impl MaterialType {
    /// The form value the API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lecture => "lecture",
            Self::Task => "task",
        }
    }
}

/// A file attached to a task or a submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialFile {
    /// Display name.
    pub name: String,
    /// Location on the server.
    pub file_path: String,
}

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier.
    #[serde(deserialize_with = "crate::de::id")]
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// `0` for lectures, anything else for assignments.
    #[serde(default)]
    pub material_type: u8,
    /// Due date as formatted by the API.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Maximum points for an assignment.
    #[serde(default)]
    pub max_points: Option<u32>,
    /// Attached materials.
    #[serde(default)]
    pub materials_files: Vec<MaterialFile>,
}

impl Task {
    /// The kind of material.
    pub fn kind(&self) -> MaterialType {
        if self.material_type == 0 {
            MaterialType::Lecture
        } else {
            MaterialType::Task
        }
    }
}

/// The contents of the task creation form.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lecture or assignment.
    pub kind: MaterialType,
    /// Due date.
    pub due_date: Timestamp,
    /// Due time of day, if separate from the date.
    pub due_time: Option<String>,
    /// Maximum points.
    pub max_points: Option<u32>,
    /// Files to upload.
    pub materials: Vec<FileUpload>,
}

impl CreateTask {
    /// The multipart form for `POST /courses/{code}/tasks/create`.
    pub fn form(&self) -> FormData {
        let mut form = FormData::new()
            .text("Title", &self.title)
            .text("Description", &self.description)
            .text("MaterialType", self.kind.as_str())
            .text("DueDate", self.due_date.to_string());

        form.push_text_opt("DueTime", self.due_time.as_deref());
        form.push_text_opt("MaxPoints", self.max_points.filter(|p| *p > 0).map(|p| p.to_string()));

        for material in &self.materials {
            form.push_file("MaterialsFiles", material.clone());
        }

        form
    }
}

/// The contents of the task edit form.
#[derive(Debug, Clone)]
pub struct EditTask {
    /// The edited fields and newly added files.
    pub task: CreateTask,
    /// Files already on the server that stay attached.
    pub retained: Vec<MaterialFile>,
}

impl EditTask {
    /// The multipart form for `PUT /courses/{code}/tasks/{id}`.
    pub fn form(&self) -> FormData {
        let mut form = self.task.form();

        for (i, file) in self.retained.iter().enumerate() {
            form.push_text(format!("UpdatedMaterials[{i}].Name"), &file.name);
            form.push_text(format!("UpdatedMaterials[{i}].FilePath"), &file.file_path);
        }

        form
    }
}

/// A student's submission for a task.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    /// Identifier.
    #[serde(deserialize_with = "crate::de::id")]
    pub id: String,
    /// Points awarded, once reviewed.
    #[serde(default)]
    pub points: Option<u32>,
    /// Handed-in files.
    #[serde(default)]
    pub submission_files: Vec<MaterialFile>,
    /// The submitting student, in instructor listings.
    #[serde(default)]
    pub user: Option<User>,
}

/// Points awarded to one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReview {
    /// The reviewed submission.
    pub submission_id: i64,
    /// Points, or `None` to leave the submission ungraded.
    pub points: Option<u32>,
}

/// Task, submission and review operations.
pub struct TaskService<'a> {
    gateway: &'a Gateway,
}

impl<'a> TaskService<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Creates a task and navigates to the course.
    pub async fn create(&self, course_code: &str, task: &CreateTask) -> crate::Result<()> {
        let request = ApiRequest::post(tasks_path(course_code).segment("create")).form(task.form());

        let response = self.gateway.send(request).await.inspect_err(|e| report_failure(self.gateway, e))?;
        expect_status(response, &[StatusCode::CREATED])?;

        log::info!("Created task '{}' in course {course_code}", task.title);
        self.gateway
            .notifier()
            .notify(Notification::success("Task created successfully"));
        self.gateway.navigator().navigate(&format!("/courses/{course_code}"));

        Ok(())
    }

    /// Saves an edited task and navigates to it.
    pub async fn edit(&self, course_code: &str, task_id: &str, task: &EditTask) -> crate::Result<()> {
        let request = ApiRequest::put(task_path(course_code, task_id)).form(task.form());

        let response = self.gateway.send(request).await.inspect_err(|e| report_failure(self.gateway, e))?;
        expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT])?;

        self.gateway
            .notifier()
            .notify(Notification::success("Task updated successfully"));
        self.gateway
            .navigator()
            .navigate(&format!("/courses/{course_code}/tasks/{task_id}"));

        Ok(())
    }

    /// Deletes a task and navigates back to the course.
    pub async fn delete(&self, course_code: &str, task_id: &str) -> crate::Result<()> {
        let request = ApiRequest::delete(task_path(course_code, task_id));

        let response = self.gateway.send(request).await?;
        expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT])?;

        self.gateway
            .notifier()
            .notify(Notification::success("Task deleted successfully"));
        self.gateway.navigator().navigate(&format!("/courses/{course_code}"));

        Ok(())
    }

    /// The tasks of a course.
    pub async fn list(&self, course_code: &str) -> crate::Result<Vec<Task>> {
        let response = self
            .gateway
            .send(ApiRequest::get(tasks_path(course_code)))
            .await?;

        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// A single task.
    pub async fn get(&self, course_code: &str, task_id: &str) -> crate::Result<Task> {
        let response = self
            .gateway
            .send(ApiRequest::get(task_path(course_code, task_id)))
            .await?;

        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// Hands in files for a task.
    pub async fn submit(&self, course_code: &str, task_id: &str, files: Vec<FileUpload>) -> crate::Result<()> {
        let mut form = FormData::new();

        for file in files {
            form.push_file("Files", file);
        }

        let request = ApiRequest::post(task_path(course_code, task_id).segment("submit")).form(form);

        let response = self.gateway.send(request).await.inspect_err(|e| report_failure(self.gateway, e))?;
        expect_status(response, &[StatusCode::CREATED, StatusCode::NO_CONTENT])?;

        self.gateway
            .notifier()
            .notify(Notification::success("Task submitted successfully"));

        Ok(())
    }

    /// The current user's submission for a task, or `None` if nothing was handed in yet.
    pub async fn submission(&self, course_code: &str, task_id: &str) -> crate::Result<Option<TaskSubmission>> {
        let request = ApiRequest::get(task_path(course_code, task_id).segment("submission"));

        match self.gateway.send(request).await {
            Ok(response) if response.status() == StatusCode::NO_CONTENT => Ok(None),
            Ok(response) => Ok(Some(expect_status(response, &[StatusCode::OK])?.json()?)),
            Err(GatewayError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Ok(None),
            Err(error) => Err(ServiceError::from(error)),
        }
    }

    /// Withdraws the current user's submission.
    pub async fn delete_submission(&self, course_code: &str, task_id: &str) -> crate::Result<()> {
        let request = ApiRequest::delete(task_path(course_code, task_id).segment("submission"));

        let response = self.gateway.send(request).await?;
        expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT])?;

        self.gateway
            .notifier()
            .notify(Notification::success("Submission deleted successfully"));

        Ok(())
    }

    /// Every submission for a task, for reviewing.
    pub async fn submissions(&self, course_code: &str, task_id: &str) -> crate::Result<Vec<TaskSubmission>> {
        let response = self
            .gateway
            .send(ApiRequest::get(
                task_path(course_code, task_id).segment("submissions"),
            ))
            .await?;

        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// Saves the points of several submissions at once.
    pub async fn review(&self, course_code: &str, task_id: &str, reviews: &[TaskReview]) -> crate::Result<()> {
        let request = ApiRequest::put(task_path(course_code, task_id).segment("review")).json(reviews)?;

        let response = self.gateway.send(request).await?;
        expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT])?;

        self.gateway
            .notifier()
            .notify(Notification::success("Reviews saved successfully"));

        Ok(())
    }
}

fn tasks_path(course_code: &str) -> ApiPath {
    ApiPath::new("/courses").segment(course_code).segment("tasks")
}

fn task_path(course_code: &str, task_id: &str) -> ApiPath {
    tasks_path(course_code).segment(task_id)
}
