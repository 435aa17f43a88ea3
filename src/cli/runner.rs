//! CLI execution runner.
//!
//! Dispatches the parsed subcommand. UI events flow through the output loop
//! while the command runs; the command's own result is printed once the loop
//! has drained, so it always comes last.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;

use crate::engine::GitleaksEngine;
use crate::reconciler::{
    decode_content, decode_settings, PageLoadReport, PageLoader, PendingState,
};
use crate::share::{
    decode_fragments, fragment_of, ActiveTab, FragmentMap, LogLevel, SessionState,
    ShareComposer,
};
use crate::sink::{snapshot, PresentationSink};

use super::args::{Command, SettingsAction};
use super::bootstrap::{engine_source, CliContext};
use super::output::run_event_loop;

/// A command result in both renderings.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub json: serde_json::Value,
}

impl CommandOutput {
    fn print(&self, json_mode: bool) {
        if json_mode {
            println!("{}", self.json);
        } else {
            println!("{}", self.text);
        }
    }
}

/// Run the command in `ctx.args` to completion.
pub async fn execute(ctx: &mut CliContext) -> Result<()> {
    let event_rx = ctx
        .event_rx
        .take()
        .ok_or_else(|| anyhow::anyhow!("Output loop already started"))?;

    // Spawn the event loop handler
    let json_mode = ctx.args.json;
    let quiet_mode = ctx.args.quiet;
    let output_handle: JoinHandle<Result<()>> =
        tokio::spawn(async move { run_event_loop(event_rx, json_mode, quiet_mode).await });

    let result = match ctx.args.command.clone() {
        Command::Share {
            config,
            input,
            log_level,
            tab,
            base_url,
        } => share(ctx, config.as_deref(), input.as_deref(), log_level, tab, base_url).await,
        Command::Open { url, out_dir } => open(ctx, &url, out_dir).await,
        Command::Inspect { url } => inspect(ctx, &url).await,
        Command::Settings { action } => settings(ctx, action).await,
    };

    // Closing the channel lets the output loop exit
    ctx.shutdown().await?;
    match output_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!("Output handler error: {}", e);
        }
        Err(e) => {
            tracing::warn!("Output handler panicked: {}", e);
        }
    }

    if let Some(output) = result? {
        output.print(json_mode);
    }
    Ok(())
}

async fn share(
    ctx: &CliContext,
    config: Option<&Path>,
    input: Option<&Path>,
    log_level: LogLevel,
    tab: ActiveTab,
    base_url: Option<String>,
) -> Result<Option<CommandOutput>> {
    let settings = ctx.settings().await;
    ctx.engine
        .load_with(
            GitleaksEngine::load_shared(engine_source(&settings)),
            settings.engine.load_timeout(),
        )
        .await;

    let config_text = match config {
        Some(path) => Some(read_text(path).await?),
        None => ctx.engine.default_config().ok(),
    };
    if let Some(text) = config_text {
        ctx.sink.set_config_text(&text);
    }
    if let Some(path) = input {
        ctx.sink.set_input_text(&read_text(path).await?);
    }
    ctx.sink.set_log_level(log_level);
    ctx.sink.set_active_tab(tab);

    let base_url = base_url.unwrap_or(settings.share.base_url);
    let composer = ShareComposer::new(&base_url, settings.share.max_content_bytes)
        .with_context(|| format!("Invalid base URL '{}'", base_url))?;
    composer.share(ctx.sink.as_ref(), &ctx.engine, ctx.runtime.as_ref())?;
    Ok(None)
}

async fn open(
    ctx: &CliContext,
    url: &str,
    out_dir: Option<PathBuf>,
) -> Result<Option<CommandOutput>> {
    let settings = ctx.settings().await;
    let loader = PageLoader::new(
        ctx.runtime.clone(),
        ctx.sink.clone(),
        ctx.engine.clone(),
        settings.page_load_options(),
    );
    let report = loader
        .load(url, GitleaksEngine::load_shared(engine_source(&settings)))
        .await;

    match out_dir {
        Some(dir) => {
            ctx.sink.export(&dir).await?;
            Ok(Some(CommandOutput {
                text: format!("Exported session to {}", dir.display()),
                json: json!({
                    "exported": dir.display().to_string(),
                    "failures": failure_messages(&report),
                }),
            }))
        }
        None => Ok(Some(session_output(&snapshot(ctx.sink.as_ref()), &report))),
    }
}

async fn inspect(ctx: &CliContext, url: &str) -> Result<Option<CommandOutput>> {
    let settings = ctx.settings().await;
    let fragments = decode_fragments(&fragment_of(url));
    Ok(Some(inspect_report(
        &fragments,
        settings.share.max_content_bytes,
    )))
}

async fn settings(ctx: &CliContext, action: SettingsAction) -> Result<Option<CommandOutput>> {
    let manager = &ctx.settings_manager;
    let output = match action {
        SettingsAction::Get { key } => {
            let value = manager.get_value(&key).await?;
            let text = match &value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            CommandOutput { text, json: value }
        }
        SettingsAction::Set { key, value } => {
            let parsed = parse_setting_value(&value);
            manager
                .set_value(&key, parsed.clone())
                .await
                .with_context(|| format!("Failed to set '{}'", key))?;
            CommandOutput {
                text: format!("{} = {}", key, parsed),
                json: json!({ "key": key, "value": parsed }),
            }
        }
        SettingsAction::Reset => {
            manager.reset().await?;
            CommandOutput {
                text: format!("Reset settings at {}", manager.path().display()),
                json: json!({ "reset": manager.path().display().to_string() }),
            }
        }
        SettingsAction::Path => CommandOutput {
            text: manager.path().display().to_string(),
            json: json!({ "path": manager.path().display().to_string() }),
        },
    };
    Ok(Some(output))
}

/// JSON if it parses, otherwise the raw string.
fn parse_setting_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Read a file, or stdin for `-`.
async fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("Reading from terminal, finish with Ctrl-D");
        }
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn failure_messages(report: &PageLoadReport) -> Vec<String> {
    report.failures.iter().map(ToString::to_string).collect()
}

fn session_output(state: &SessionState, report: &PageLoadReport) -> CommandOutput {
    let config = state.config.as_deref().unwrap_or_default();
    let input = state.input_text.as_deref().unwrap_or_default();

    let text = format!(
        "log level: {}\ntab: {}\n--- config ---\n{}\n--- input ---\n{}",
        state.log_level, state.active_tab, config, input
    );
    let json = json!({
        "logLevel": state.log_level.as_str(),
        "activeTab": state.active_tab.as_str(),
        "config": state.config,
        "inputText": state.input_text,
        "failures": failure_messages(report),
    });
    CommandOutput { text, json }
}

fn inspect_report(fragments: &FragmentMap, max_content_bytes: usize) -> CommandOutput {
    let mut lines = Vec::new();

    let settings = match decode_settings(fragments, max_content_bytes) {
        Ok(None) => {
            lines.push("settings: none".to_string());
            serde_json::Value::Null
        }
        Ok(Some(PendingState::DefaultConfig {
            log_level,
            active_tab,
        })) => {
            lines.push(format!(
                "settings: default config, log level {}, tab {}",
                log_level, active_tab
            ));
            json!({
                "default": true,
                "logLevel": log_level.as_str(),
                "activeTab": active_tab.as_str(),
            })
        }
        Ok(Some(PendingState::Shared(payload))) => {
            lines.push(format!(
                "settings: shared config ({} bytes), log level {}, tab {}",
                payload.config.as_deref().map_or(0, str::len),
                payload.log_level.map_or("-", |level| level.as_str()),
                payload.active_tab.map_or("-", |tab| tab.as_str()),
            ));
            json!({
                "default": false,
                "config": payload.config,
                "logLevel": payload.log_level.map(|level| level.as_str()),
                "activeTab": payload.active_tab.map(|tab| tab.as_str()),
            })
        }
        Err(e) => {
            lines.push(format!("settings: error: {}", e));
            json!({ "error": e.to_string() })
        }
    };

    let content = match decode_content(fragments, max_content_bytes) {
        Ok(None) => {
            lines.push("content: none".to_string());
            serde_json::Value::Null
        }
        Ok(Some(text)) => {
            lines.push(format!("content: {} bytes", text.len()));
            json!({ "inputText": text, "bytes": text.len() })
        }
        Err(e) => {
            lines.push(format!("content: error: {}", e));
            json!({ "error": e.to_string() })
        }
    };

    let unknown = fragments.unknown_names();
    if !unknown.is_empty() {
        lines.push(format!("ignored: {}", unknown.join(", ")));
    }

    CommandOutput {
        text: lines.join("\n"),
        json: json!({ "settings": settings, "content": content, "unknown": unknown }),
    }
}
