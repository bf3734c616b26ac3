use std::{path::Path, str::FromStr};

use anyhow::{anyhow, bail};
use indoc::formatdoc;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;

use crate::Config;

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref().to_path_buf();
    let content = std::fs::read_to_string(&path)?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;
    validate(&config)?;

    log::debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    let base_url = &config.api.base_url;

    if !matches!(base_url.scheme(), "http" | "https") {
        bail!(formatdoc! {r#"
            The API base URL must use http or https, got '{base_url}'.

            Example configuration:

              [api]
              base_url = "https://campus.example.com/api"
        "#});
    }

    let auth = &config.auth;

    for (name, path) in [
        ("auth.login_path", &auth.login_path),
        ("auth.register_path", &auth.register_path),
        ("auth.refresh_path", &auth.refresh_path),
        ("auth.login_redirect", &auth.login_redirect),
    ] {
        if !path.starts_with('/') {
            bail!("{name} must start with '/', got '{path}'");
        }
    }

    if config.session.username.is_some() != config.session.password.is_some() {
        log::warn!("Only one of session.username and session.password is configured, both are needed to log in");
    }

    Ok(())
}

/// A step from the document root to a value: a table key or an array index.
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Replaces `{{ env.VAR }}` placeholders in every string of the document.
fn expand_dynamic_strings<'a>(trail: &mut Vec<Segment<'a>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => {
            let expanded = DynamicString::<String>::from_str(s)
                .map_err(|err| anyhow!("Failed to expand dynamic string at path '{}': {err}", dotted(trail)))?;

            *s = expanded.into_inner();
        }
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                trail.push(Segment::Index(i));
                expand_dynamic_strings(trail, value)?;
                trail.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                trail.push(Segment::Key(key.as_str()));
                expand_dynamic_strings(trail, value)?;
                trail.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}

fn dotted(trail: &[Segment<'_>]) -> String {
    let mut out = String::new();

    for segment in trail {
        match segment {
            Segment::Key(key) if out.is_empty() => out.push_str(key),
            Segment::Key(key) => {
                out.push('.');
                out.push_str(key);
            }
            Segment::Index(i) => out.push_str(&format!("[{i}]")),
        }
    }

    out
}
