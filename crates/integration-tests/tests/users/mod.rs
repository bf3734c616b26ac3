use gateway::StatusCode;
use integration_tests::{MockApi, TestCampus, api::PASSWORD};
use secrecy::SecretString;
use services::{FileUpload, LoginRequest};

#[tokio::test]
async fn show_and_search_users() {
    let campus = TestCampus::with_token(MockApi::new().accepting("T0"), "T0").await;
    let users = campus.services.users();

    let user = users.user("bob").await.unwrap();
    assert_eq!(user.email, "bob@campus.test");

    let found = users.search_users("ann").await.unwrap();
    let names: Vec<_> = found.iter().map(|user| user.user_name.as_str()).collect();
    assert_eq!(names, ["ann", "annika"]);

    let search = campus.api.requests_to("/users/search");
    assert_eq!(search.len(), 1);
}

#[tokio::test]
async fn user_names_stay_inside_their_segment() {
    let campus = TestCampus::with_token(MockApi::new().accepting("T0"), "T0").await;
    let users = campus.services.users();

    let user = users.user("ann#x").await.unwrap();
    assert_eq!(user.user_name, "ann#x");

    let user = users.user("../courses").await.unwrap();
    assert_eq!(user.user_name, "../courses");

    let paths: Vec<_> = campus.api.requests().into_iter().map(|request| request.path).collect();
    assert_eq!(paths, ["/users/ann%23x", "/users/..%2Fcourses"]);
    assert!(campus.api.requests_to("/courses").is_empty());
}

#[tokio::test]
async fn missing_user() {
    let campus = TestCampus::with_token(MockApi::new().accepting("T0"), "T0").await;

    let error = campus.services.users().user("ghost").await.unwrap_err();

    assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(campus.notifier.errors(), vec!["Requested resource not found.".to_string()]);
}

#[tokio::test]
async fn upload_photo_updates_the_session_user() {
    let campus = TestCampus::start(MockApi::new()).await;

    let login = LoginRequest {
        user_name: "ann".to_string(),
        password: SecretString::from(PASSWORD.to_string()),
    };

    campus.services.auth().login(&login).await.unwrap();

    let photo = FileUpload::new("ann.png", vec![0u8; 64]).with_mime("image/png");
    campus.services.users().upload_photo(photo).await.unwrap();

    let forms = campus.api.forms();
    assert_eq!(forms[0].path, "/users/upload-photo");
    assert_eq!(forms[0].fields, vec![("photo".to_string(), "<ann.png: 64 bytes>".to_string())]);

    let user = campus.gateway().session().current_user().await.unwrap();
    assert_eq!(user.photo_url.as_deref(), Some("/files/photos/ann.png"));
    assert_eq!(campus.token().await.as_deref(), Some("T0"));
    assert_eq!(campus.notifier.successes(), vec!["Photo updated successfully".to_string()]);
}

#[tokio::test]
async fn upload_photo_without_a_profile_keeps_the_session_user() {
    let campus = TestCampus::start(MockApi::new()).await;

    let login = LoginRequest {
        user_name: "ann".to_string(),
        password: SecretString::from(PASSWORD.to_string()),
    };

    campus.services.auth().login(&login).await.unwrap();
    let before = campus.gateway().session().current_user().await.unwrap();

    let photo = FileUpload::new("blank.png", vec![0u8; 8]).with_mime("image/png");
    campus.services.users().upload_photo(photo).await.unwrap();

    let after = campus.gateway().session().current_user().await.unwrap();

    assert_eq!(after.user_name, "ann");
    assert_eq!(after, before);
    assert_eq!(campus.notifier.successes(), vec!["Photo updated successfully".to_string()]);
}
