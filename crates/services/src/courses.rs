//! Course catalog and course management.

use gateway::{ApiPath, ApiRequest, FileUpload, FormData, Gateway, Notification, StatusCode, User};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{expect_status, report_failure};

/// A course as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Numeric identifier.
    pub id: i64,
    /// Course title.
    pub title: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Location of the cover banner image.
    #[serde(default)]
    pub cover_banner: Option<String>,
    /// Unique course code used in every course URL.
    pub code: String,
    /// Subject category.
    #[serde(default)]
    pub category: String,
    /// Credit points.
    #[serde(default)]
    pub credits: u32,
    /// First day of the course.
    #[serde(default)]
    pub start_date: String,
    /// Last day of the course.
    #[serde(default)]
    pub end_date: String,
    /// Weekly schedule.
    #[serde(default)]
    pub course_schedule: Vec<ScheduleEntry>,
    /// Instructors teaching the course.
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    /// Number of enrolled students.
    #[serde(default)]
    pub enrolled_students: u32,
    /// Status as numbered by the API.
    #[serde(default)]
    pub status: i32,
}

/// One weekly slot of a course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Day of the week.
    pub day: String,
    /// Time of day.
    pub time: String,
    /// Room or link.
    pub location: String,
}

/// An instructor as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    /// Login name.
    pub user_name: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Patronymic.
    #[serde(default)]
    pub father_name: Option<String>,
    /// Contact email.
    pub email: String,
    /// Profile photo location.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Whether this instructor created the course.
    #[serde(default)]
    pub owner: Option<bool>,
    /// What the instructor may do in the course.
    #[serde(flatten)]
    pub permissions: InstructorPermissions,
}

/// Permissions an instructor holds within a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructorPermissions {
    /// May create tasks.
    pub can_create_assignments: bool,
    /// May edit and delete tasks.
    pub can_modify_assignments: bool,
    /// May review submissions.
    pub can_grade_students: bool,
    /// May add users to the course.
    pub can_manage_users: bool,
}

/// Lifecycle status of a course being created or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseStatus {
    /// Running now.
    InProgress,
    /// Not started yet.
    Upcoming,
    /// Finished.
    Completed,
}

impl CourseStatus {
    /// The form value the API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
        }
    }
}

/// An instructor to attach to a new course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstructor {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Patronymic.
    #[serde(default)]
    pub father_name: Option<String>,
    /// Contact email.
    pub email: String,
    /// Login name.
    pub user_name: String,
    /// Profile photo location.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// What the instructor may do in the course.
    #[serde(flatten)]
    pub permissions: InstructorPermissions,
}

/// The contents of the course creation and edit forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    /// Course title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Subject category.
    pub category: String,
    /// Credit points.
    pub credits: u32,
    /// Lifecycle status.
    pub status: CourseStatus,
    /// First day of the course.
    pub start_date: String,
    /// Last day of the course.
    pub end_date: String,
    /// Co-instructors. Only sent on creation.
    #[serde(default)]
    pub instructors: Vec<NewInstructor>,
    /// Weekly schedule.
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
    /// Cover banner image.
    #[serde(skip)]
    pub cover_image: Option<FileUpload>,
}

impl CreateCourse {
    /// The multipart form for `POST /courses/create`.
    pub fn creation_form(&self) -> FormData {
        let mut form = FormData::new();
        self.push_basics(&mut form);

        for (i, instructor) in self.instructors.iter().enumerate() {
            let prefix = format!("Instructors[{i}]");
            let permissions = instructor.permissions;

            form.push_text(format!("{prefix}.FirstName"), &instructor.first_name);
            form.push_text(format!("{prefix}.LastName"), &instructor.last_name);
            form.push_text_opt(format!("{prefix}.FatherName"), instructor.father_name.as_deref());
            form.push_text(format!("{prefix}.Email"), &instructor.email);
            form.push_text(format!("{prefix}.UserName"), &instructor.user_name);
            form.push_text_opt(format!("{prefix}.PhotoUrl"), instructor.photo_url.as_deref());
            form.push_text(
                format!("{prefix}.CanCreateAssignments"),
                permissions.can_create_assignments.to_string(),
            );
            form.push_text(
                format!("{prefix}.CanModifyAssignments"),
                permissions.can_modify_assignments.to_string(),
            );
            form.push_text(
                format!("{prefix}.CanGradeStudents"),
                permissions.can_grade_students.to_string(),
            );
            form.push_text(
                format!("{prefix}.CanManageUsers"),
                permissions.can_manage_users.to_string(),
            );
        }

        self.push_schedule(&mut form);
        form
    }

    /// The multipart form for `PUT /courses/edit`. Instructors are managed separately and
    /// are not part of it.
    pub fn update_form(&self, course_code: &str) -> FormData {
        let mut form = FormData::new().text("CourseCode", course_code);
        self.push_basics(&mut form);
        self.push_schedule(&mut form);
        form
    }

    fn push_basics(&self, form: &mut FormData) {
        form.push_text("Title", &self.title);
        form.push_text("Description", &self.description);
        form.push_text("Category", &self.category);
        form.push_text("Credits", self.credits.to_string());
        form.push_text("Status", self.status.as_str());
        form.push_text("StartDate", &self.start_date);
        form.push_text("EndDate", &self.end_date);

        if let Some(cover) = &self.cover_image {
            form.push_file("CoverBanner", cover.clone());
        }
    }

    fn push_schedule(&self, form: &mut FormData) {
        for (i, entry) in self.schedule.iter().enumerate() {
            form.push_text(format!("Schedule[{i}].Day"), &entry.day);
            form.push_text(format!("Schedule[{i}].Time"), &entry.time);
            form.push_text(format!("Schedule[{i}].Location"), &entry.location);
        }
    }
}

/// Course operations.
pub struct CourseService<'a> {
    gateway: &'a Gateway,
}

impl<'a> CourseService<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Creates a course and navigates to the catalog.
    pub async fn create(&self, course: &CreateCourse) -> crate::Result<()> {
        let request = ApiRequest::post("/courses/create").form(course.creation_form());

        let response = self.gateway.send(request).await.inspect_err(|e| report_failure(self.gateway, e))?;
        expect_status(response, &[StatusCode::CREATED])?;

        log::info!("Created course '{}'", course.title);
        self.gateway
            .notifier()
            .notify(Notification::success("Course created successfully"));
        self.gateway.navigator().navigate("/courses");

        Ok(())
    }

    /// Updates a course and navigates to its page.
    pub async fn update(&self, course_code: &str, course: &CreateCourse) -> crate::Result<()> {
        let request = ApiRequest::put("/courses/edit").form(course.update_form(course_code));

        let response = self.gateway.send(request).await?;
        expect_status(response, &[StatusCode::NO_CONTENT])?;

        self.gateway
            .notifier()
            .notify(Notification::success("Course updated successfully"));
        self.gateway.navigator().navigate(&format!("/courses/{course_code}"));

        Ok(())
    }

    /// Every course visible to the current user.
    pub async fn list(&self) -> crate::Result<Vec<Course>> {
        let response = self.gateway.send(ApiRequest::get("/courses")).await?;
        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// A course by its code.
    pub async fn by_code(&self, course_code: &str) -> crate::Result<Course> {
        let response = self
            .gateway
            .send(ApiRequest::get(ApiPath::new("/courses/code").segment(course_code)))
            .await?;

        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// The instructors of a course.
    pub async fn instructors(&self, course_code: &str) -> crate::Result<Vec<Instructor>> {
        let response = self
            .gateway
            .send(ApiRequest::get(ApiPath::new("/courses/teachers").segment(course_code)))
            .await?;

        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// The students enrolled in a course.
    pub async fn students(&self, course_code: &str) -> crate::Result<Vec<User>> {
        let response = self
            .gateway
            .send(ApiRequest::get(ApiPath::new("/courses/students").segment(course_code)))
            .await?;

        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// Enrolls the user with the given email in a course.
    pub async fn add_user(&self, course_code: &str, user_email: &str) -> crate::Result<()> {
        let request = ApiRequest::put("/courses/add-user").json(&json!({
            "courseCode": course_code,
            "userEmail": user_email,
        }))?;

        let response = self.gateway.send(request).await?;
        expect_status(response, &[StatusCode::NO_CONTENT])?;

        self.gateway
            .notifier()
            .notify(Notification::success("User added successfully"));

        Ok(())
    }
}
