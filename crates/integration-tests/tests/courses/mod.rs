use gateway::StatusCode;
use integration_tests::{MockApi, TestCampus};
use services::{CourseStatus, CreateCourse, FileUpload, InstructorPermissions, NewInstructor, ScheduleEntry};

async fn logged_in() -> TestCampus {
    TestCampus::with_token(MockApi::new().accepting("T0"), "T0").await
}

fn new_course() -> CreateCourse {
    CreateCourse {
        title: "Linear Algebra".to_string(),
        description: "Vectors and matrices".to_string(),
        category: "Mathematics".to_string(),
        credits: 5,
        status: CourseStatus::Upcoming,
        start_date: "2025-09-01".to_string(),
        end_date: "2025-12-20".to_string(),
        instructors: vec![NewInstructor {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            father_name: None,
            email: "prof@campus.test".to_string(),
            user_name: "prof".to_string(),
            photo_url: None,
            permissions: InstructorPermissions {
                can_grade_students: true,
                ..Default::default()
            },
        }],
        schedule: vec![ScheduleEntry {
            day: "Monday".to_string(),
            time: "10:00".to_string(),
            location: "Room 101".to_string(),
        }],
        cover_image: Some(FileUpload::new("banner.png", vec![0u8; 8]).with_mime("image/png")),
    }
}

#[tokio::test]
async fn create_course_uploads_the_form() {
    let campus = logged_in().await;

    campus.services.courses().create(&new_course()).await.unwrap();

    let forms = campus.api.forms();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].path, "/courses/create");

    insta::assert_debug_snapshot!(forms[0].fields, @r#"
    [
        (
            "Title",
            "Linear Algebra",
        ),
        (
            "Description",
            "Vectors and matrices",
        ),
        (
            "Category",
            "Mathematics",
        ),
        (
            "Credits",
            "5",
        ),
        (
            "Status",
            "upcoming",
        ),
        (
            "StartDate",
            "2025-09-01",
        ),
        (
            "EndDate",
            "2025-12-20",
        ),
        (
            "CoverBanner",
            "<banner.png: 8 bytes>",
        ),
        (
            "Instructors[0].FirstName",
            "Grace",
        ),
        (
            "Instructors[0].LastName",
            "Hopper",
        ),
        (
            "Instructors[0].Email",
            "prof@campus.test",
        ),
        (
            "Instructors[0].UserName",
            "prof",
        ),
        (
            "Instructors[0].CanCreateAssignments",
            "false",
        ),
        (
            "Instructors[0].CanModifyAssignments",
            "false",
        ),
        (
            "Instructors[0].CanGradeStudents",
            "true",
        ),
        (
            "Instructors[0].CanManageUsers",
            "false",
        ),
        (
            "Schedule[0].Day",
            "Monday",
        ),
        (
            "Schedule[0].Time",
            "10:00",
        ),
        (
            "Schedule[0].Location",
            "Room 101",
        ),
    ]
    "#);

    assert_eq!(campus.notifier.successes(), vec!["Course created successfully".to_string()]);
    assert_eq!(campus.navigator.targets(), vec!["/courses".to_string()]);
}

#[tokio::test]
async fn update_course_sends_the_code() {
    let campus = logged_in().await;

    campus.services.courses().update("MATH101", &new_course()).await.unwrap();

    let forms = campus.api.forms();
    assert_eq!(forms[0].path, "/courses/edit");
    assert_eq!(forms[0].fields[0], ("CourseCode".to_string(), "MATH101".to_string()));
    assert!(!forms[0].fields.iter().any(|(name, _)| name.starts_with("Instructors")));

    assert_eq!(campus.notifier.successes(), vec!["Course updated successfully".to_string()]);
    assert_eq!(campus.navigator.targets(), vec!["/courses/MATH101".to_string()]);
}

#[tokio::test]
async fn catalog_queries() {
    let campus = logged_in().await;
    let courses = campus.services.courses();

    let list = courses.list().await.unwrap();
    assert_eq!(list[0].code, "MATH101");
    assert_eq!(list[0].course_schedule[0].day, "Monday");

    let course = courses.by_code("MATH101").await.unwrap();
    assert_eq!(course.title, "Linear Algebra");

    let instructors = courses.instructors("MATH101").await.unwrap();
    assert_eq!(instructors[0].owner, Some(true));
    assert!(instructors[0].permissions.can_grade_students);
    assert!(!instructors[0].permissions.can_manage_users);

    let students = courses.students("MATH101").await.unwrap();
    let names: Vec<_> = students.iter().map(|user| user.user_name.as_str()).collect();
    assert_eq!(names, ["ann", "bob"]);
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let campus = logged_in().await;

    let error = campus.services.courses().by_code("NOPE").await.unwrap_err();

    assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(campus.notifier.errors(), vec!["Requested resource not found.".to_string()]);
}

#[tokio::test]
async fn add_user_to_course() {
    let campus = logged_in().await;

    campus
        .services
        .courses()
        .add_user("MATH101", "bob@campus.test")
        .await
        .unwrap();

    insta::assert_json_snapshot!(campus.api.json_bodies("/courses/add-user"), @r#"
    [
      {
        "courseCode": "MATH101",
        "userEmail": "bob@campus.test"
      }
    ]
    "#);

    assert_eq!(campus.notifier.successes(), vec!["User added successfully".to_string()]);
}

#[tokio::test]
async fn add_unknown_user_is_reported_once() {
    let campus = logged_in().await;

    campus
        .services
        .courses()
        .add_user("MATH101", "stranger@example.com")
        .await
        .unwrap_err();

    assert_eq!(campus.notifier.errors(), vec!["Requested resource not found.".to_string()]);
    assert!(campus.notifier.successes().is_empty());
}
