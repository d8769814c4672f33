use anyhow::{anyhow, Result};
use std::process::Stdio;
use tokio::process::Command;

/// Desktop notification sink. Delivery is best-effort.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Sends notifications through the platform's command-line notifier
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let args = notification_command(title, body);
        tokio::spawn(async move {
            if let Err(e) = run_command(&args).await {
                tracing::debug!("Notification not delivered: {e}");
            }
        });
    }
}

/// Notifier that drops everything, used when notifications are disabled
#[derive(Debug, Clone, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}

/// Build the argv for the platform notifier
pub fn notification_command(title: &str, body: &str) -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec![
            "osascript".to_string(),
            "-e".to_string(),
            format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(body),
                escape_applescript(title)
            ),
        ]
    } else {
        vec![
            "notify-send".to_string(),
            "--app-name=nag".to_string(),
            title.to_string(),
            body.to_string(),
        ]
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Run a command to completion with no stdio attached, returning its exit code
pub async fn run_command(command_args: &[String]) -> Result<i32> {
    let (command_name, args) = command_args
        .split_first()
        .ok_or_else(|| anyhow!("No command provided"))?;

    let status = Command::new(command_name)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| anyhow!("Failed to execute command '{}': {}", command_name, e))?;

    let exit_code = status.code().unwrap_or(-1);
    if exit_code != 0 {
        return Err(anyhow!(
            "Command '{}' exited with code {}",
            command_name,
            exit_code
        ));
    }
    Ok(exit_code)
}
