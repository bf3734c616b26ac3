use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use services::{CreateCourse, FileUpload, Services};

use crate::args::{Command, CourseCommand, TaskCommand, UserCommand};

pub(crate) async fn run(services: &Services, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Courses(command) => courses(services, command).await,
        Command::Tasks(command) => tasks(services, command).await,
        Command::Users(command) => users(services, command).await,
    }
}

async fn courses(services: &Services, command: CourseCommand) -> anyhow::Result<()> {
    let courses = services.courses();

    match command {
        CourseCommand::List => print(&courses.list().await?),
        CourseCommand::Show { code } => print(&courses.by_code(&code).await?),
        CourseCommand::Students { code } => print(&courses.students(&code).await?),
        CourseCommand::Instructors { code } => print(&courses.instructors(&code).await?),
        CourseCommand::AddUser { code, email } => Ok(courses.add_user(&code, &email).await?),
        CourseCommand::Create { definition, cover } => {
            let mut course = read_course(&definition)?;

            if let Some(cover) = cover {
                course.cover_image = Some(upload(&cover).await?);
            }

            Ok(courses.create(&course).await?)
        }
    }
}

async fn tasks(services: &Services, command: TaskCommand) -> anyhow::Result<()> {
    let tasks = services.tasks();

    match command {
        TaskCommand::List { course } => print(&tasks.list(&course).await?),
        TaskCommand::Show { course, id } => print(&tasks.get(&course, &id).await?),
        TaskCommand::Submissions { course, id } => print(&tasks.submissions(&course, &id).await?),
        TaskCommand::Submit { course, id, files } => {
            let mut uploads = Vec::with_capacity(files.len());

            for file in &files {
                uploads.push(upload(file).await?);
            }

            Ok(tasks.submit(&course, &id, uploads).await?)
        }
    }
}

async fn users(services: &Services, command: UserCommand) -> anyhow::Result<()> {
    let users = services.users();

    match command {
        UserCommand::Show { user_name } => print(&users.user(&user_name).await?),
        UserCommand::Search { query } => print(&users.search_users(&query).await?),
        UserCommand::UploadPhoto { path } => Ok(users.upload_photo(upload(&path).await?).await?),
    }
}

fn read_course(path: &Path) -> anyhow::Result<CreateCourse> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read course definition {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| format!("Invalid course definition in {}", path.display()))
}

async fn upload(path: &Path) -> anyhow::Result<FileUpload> {
    FileUpload::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
