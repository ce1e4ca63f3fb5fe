//! # Substitute Command Implementation
//!
//! Fills `${PLACEHOLDER}` values into the tracked config files under
//! `conf.d`. Each value comes from `--set`, else the saved preferences, else
//! an interactive prompt. Values used are saved for the next run.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::PathBuf;

use hecate::backup::BackupStore;
use hecate::options::RunOptions;
use hecate::preferences::{check_value, Preferences};
use hecate::substitution::{Outcome, Placeholders, TemplateSubstitution};
use hecate::suggestions;

use super::Context;

/// Fill ${PLACEHOLDER} values into the tracked config files
#[derive(Args, Debug)]
pub struct SubstituteArgs {
    /// Placeholder value, repeatable (e.g. --set BACKEND_IP=10.0.0.5)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// Directory to walk (default: conf_dir from the configuration)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Show which files would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: SubstituteArgs, ctx: &Context) -> Result<()> {
    let mut preferences = ctx.preferences()?;
    let placeholders = collect_placeholders(&args.set, &ctx.config.placeholders, &preferences)?;
    let tracked = ctx.config.tracked_files()?;
    let root = args
        .root
        .as_deref()
        .map(|r| ctx.resolve(r))
        .unwrap_or_else(|| ctx.paths.conf_dir.clone());
    let options = RunOptions {
        dry_run: args.dry_run,
        ..RunOptions::default()
    };

    let substitution = TemplateSubstitution::new(placeholders)?;
    let report = substitution
        .apply(&root, |path| tracked.matches(path), &BackupStore::new(), &options)
        .map_err(|e| suggestions::explain(e, None))?;

    for file in &report.files {
        match &file.outcome {
            Outcome::Updated { .. } if options.dry_run => {
                println!("{}", ctx.output.info(format!("Would update {}", file.path.display())))
            }
            Outcome::Updated { .. } => {
                println!("{}", ctx.output.success(format!("Updated {}", file.path.display())))
            }
            Outcome::Unchanged => log::debug!("Unchanged {}", file.path.display()),
            Outcome::Failed { message } => println!(
                "{}",
                ctx.output
                    .failure(format!("{}: {}", file.path.display(), message))
            ),
        }
    }
    println!(
        "{} updated, {} unchanged, {} failed",
        report.updated().count(),
        report.unchanged().count(),
        report.failed().count()
    );

    if !options.dry_run {
        for (name, value) in substitution.placeholders().iter() {
            preferences.set(name.clone(), value.clone())?;
        }
        preferences.save()?;
    }
    report.into_result()?;
    Ok(())
}

/// Values for every configured placeholder plus any extra `--set` names.
fn collect_placeholders(
    assignments: &[String],
    names: &[String],
    preferences: &Preferences,
) -> Result<Placeholders> {
    let mut placeholders = Placeholders::new();
    for raw in assignments {
        let (name, value) = parse_assignment(raw)?;
        check_value(name, value)?;
        placeholders.insert(name, value);
    }

    let theme = ColorfulTheme::default();
    for name in names {
        if placeholders.get(name).is_some() {
            continue;
        }
        if let Some(saved) = preferences.get(name) {
            placeholders.insert(name.clone(), saved);
            continue;
        }
        if !super::interactive() {
            return Err(anyhow::anyhow!(
                "No value for placeholder {name}\n\n\
                 hint: Use --set {name}=VALUE"
            ));
        }
        let value: String = Input::with_theme(&theme)
            .with_prompt(format!("Value for {}", name))
            .interact_text()?;
        check_value(name, value.trim())?;
        placeholders.insert(name.clone(), value.trim());
    }
    Ok(placeholders)
}

fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(suggestions::invalid_assignment(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("A=1").unwrap(), ("A", "1"));
        assert_eq!(parse_assignment("URL=http://x?a=b").unwrap(), ("URL", "http://x?a=b"));
        assert_eq!(parse_assignment("EMPTY=").unwrap(), ("EMPTY", ""));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_collect_prefers_flags_over_saved_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".hecate.conf");
        std::fs::write(&path, "BACKEND_IP=\"10.0.0.1\"\nBASE_DOMAIN=\"old.example\"\n").unwrap();
        let preferences = Preferences::load(&path).unwrap();

        let placeholders = collect_placeholders(
            &["BASE_DOMAIN=new.example".to_string()],
            &["BACKEND_IP".to_string(), "BASE_DOMAIN".to_string()],
            &preferences,
        )
        .unwrap();

        assert_eq!(placeholders.get("BACKEND_IP"), Some("10.0.0.1"));
        assert_eq!(placeholders.get("BASE_DOMAIN"), Some("new.example"));
    }

    #[test]
    fn test_collect_rejects_unsaveable_value_before_any_write() {
        let temp = TempDir::new().unwrap();
        let preferences = Preferences::load(temp.path().join(".hecate.conf")).unwrap();

        let err = collect_placeholders(&["BASE_DOMAIN=x\"".to_string()], &[], &preferences)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid value for BASE_DOMAIN"));
    }
}
