use integration_tests::{MockApi, TestCampus};
use services::{CreateTask, EditTask, FileUpload, MaterialFile, MaterialType, TaskReview};

async fn logged_in() -> TestCampus {
    TestCampus::with_token(MockApi::new().accepting("T0"), "T0").await
}

fn homework() -> CreateTask {
    CreateTask {
        title: "Homework 1".to_string(),
        description: "Exercises 1-10".to_string(),
        kind: MaterialType::Task,
        due_date: "2025-10-01T21:00:00Z".parse().unwrap(),
        due_time: None,
        max_points: Some(10),
        materials: vec![FileUpload::new("sheet.pdf", b"%PDF-1.7".to_vec())],
    }
}

#[tokio::test]
async fn create_task_uploads_materials() {
    let campus = logged_in().await;

    campus.services.tasks().create("MATH101", &homework()).await.unwrap();

    let forms = campus.api.forms();
    assert_eq!(forms[0].path, "/courses/MATH101/tasks/create");

    insta::assert_debug_snapshot!(forms[0].fields, @r#"
    [
        (
            "Title",
            "Homework 1",
        ),
        (
            "Description",
            "Exercises 1-10",
        ),
        (
            "MaterialType",
            "task",
        ),
        (
            "DueDate",
            "2025-10-01T21:00:00Z",
        ),
        (
            "MaxPoints",
            "10",
        ),
        (
            "MaterialsFiles",
            "<sheet.pdf: 8 bytes>",
        ),
    ]
    "#);

    assert_eq!(campus.notifier.successes(), vec!["Task created successfully".to_string()]);
    assert_eq!(campus.navigator.targets(), vec!["/courses/MATH101".to_string()]);
}

#[tokio::test]
async fn edit_and_delete_task() {
    let campus = logged_in().await;
    let tasks = campus.services.tasks();

    let edit = EditTask {
        task: CreateTask {
            materials: Vec::new(),
            ..homework()
        },
        retained: vec![MaterialFile {
            name: "sheet.pdf".to_string(),
            file_path: "/files/tasks/17/sheet.pdf".to_string(),
        }],
    };

    tasks.edit("MATH101", "17", &edit).await.unwrap();
    tasks.delete("MATH101", "17").await.unwrap();

    let forms = campus.api.forms();
    assert_eq!(forms[0].path, "/courses/MATH101/tasks/17");
    assert!(forms[0].fields.contains(&(
        "UpdatedMaterials[0].FilePath".to_string(),
        "/files/tasks/17/sheet.pdf".to_string()
    )));

    assert_eq!(
        campus.notifier.successes(),
        vec!["Task updated successfully".to_string(), "Task deleted successfully".to_string()]
    );

    assert_eq!(
        campus.navigator.targets(),
        vec!["/courses/MATH101/tasks/17".to_string(), "/courses/MATH101".to_string()]
    );
}

#[tokio::test]
async fn list_and_show_tasks() {
    let campus = logged_in().await;
    let tasks = campus.services.tasks();

    let list = tasks.list("MATH101").await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "17");
    assert_eq!(list[0].kind(), MaterialType::Task);

    let task = tasks.get("MATH101", "17").await.unwrap();
    assert_eq!(task.max_points, Some(10));
    assert_eq!(task.materials_files[0].name, "sheet.pdf");
}

#[tokio::test]
async fn submission_lifecycle() {
    let campus = logged_in().await;
    let tasks = campus.services.tasks();

    assert_eq!(tasks.submission("MATH101", "17").await.unwrap(), None);

    let files = vec![FileUpload::new("answers.pdf", b"answers".to_vec())];
    tasks.submit("MATH101", "17", files).await.unwrap();

    let submission = tasks.submission("MATH101", "17").await.unwrap().unwrap();
    assert_eq!(submission.id, "4");
    assert_eq!(submission.points, None);

    tasks.delete_submission("MATH101", "17").await.unwrap();
    assert_eq!(tasks.submission("MATH101", "17").await.unwrap(), None);

    let submit_form = campus
        .api
        .forms()
        .into_iter()
        .find(|form| form.path == "/courses/MATH101/tasks/17/submit")
        .unwrap();

    assert_eq!(
        submit_form.fields,
        vec![("Files".to_string(), "<answers.pdf: 7 bytes>".to_string())]
    );

    assert!(campus.notifier.errors().is_empty());
    assert_eq!(
        campus.notifier.successes(),
        vec![
            "Task submitted successfully".to_string(),
            "Submission deleted successfully".to_string()
        ]
    );
}

#[tokio::test]
async fn review_submissions() {
    let campus = logged_in().await;
    let tasks = campus.services.tasks();

    let submissions = tasks.submissions("MATH101", "17").await.unwrap();
    let ids: Vec<_> = submissions.iter().map(|submission| submission.id.as_str()).collect();
    assert_eq!(ids, ["4", "5"]);

    let reviews = [
        TaskReview {
            submission_id: 4,
            points: Some(9),
        },
        TaskReview {
            submission_id: 5,
            points: Some(7),
        },
    ];

    tasks.review("MATH101", "17", &reviews).await.unwrap();

    insta::assert_json_snapshot!(campus.api.json_bodies("/courses/MATH101/tasks/17/review"), @r#"
    [
      [
        {
          "points": 9,
          "submissionId": 4
        },
        {
          "points": 7,
          "submissionId": 5
        }
      ]
    ]
    "#);

    assert_eq!(campus.notifier.successes(), vec!["Reviews saved successfully".to_string()]);
}
