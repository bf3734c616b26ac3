use std::sync::Arc;

use anyhow::Context;
use args::Args;
use clap::Parser;
use gateway::{Gateway, LogNavigator, LogNotifier};
use secrecy::SecretString;
use services::{LoginRequest, Services};

mod args;
mod commands;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.config()?;

    logger::init(&args);

    let gateway = Gateway::builder(&config)
        .notifier(Arc::new(LogNotifier))
        .navigator(Arc::new(LogNavigator))
        .build()?;

    let services = Services::new(gateway);
    let login = login_request(&args, &config)?;

    services
        .auth()
        .login(&login)
        .await
        .with_context(|| format!("Failed to log in as '{}'", login.user_name))?;

    if let Err(e) = commands::run(&services, args.command).await {
        log::error!("{e:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn login_request(args: &Args, config: &config::Config) -> anyhow::Result<LoginRequest> {
    let user_name = args
        .username
        .clone()
        .or_else(|| config.session.username.clone())
        .context("No username given. Pass --username, set CAMPUS_USERNAME or configure session.username")?;

    let password = match &args.password {
        Some(password) => SecretString::from(password.clone()),
        None => config
            .session
            .password
            .clone()
            .context("No password given. Pass --password, set CAMPUS_PASSWORD or configure session.password")?,
    };

    Ok(LoginRequest { user_name, password })
}
