//! Control commands: send, flymode and reboot.
//!
//! These are one-shot requests issued on explicit operator action; nothing
//! here is polled or retried.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use smsfwd_core::{DeviceClient, SendSmsRequest};
use tracing::info;

use super::render_action;
use crate::cli::{OutputFormat, Toggle};
use crate::format::FormatOptions;
use crate::util::{with_spinner, write_output};

pub async fn cmd_send(
    client: &impl DeviceClient,
    to: String,
    content: String,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let request = SendSmsRequest::new(to.trim(), content);
    request.validate().context("Invalid message")?;

    with_spinner("Sending message...", quiet, client.send_sms(&request))
        .await
        .with_context(|| format!("Failed to send SMS to {}", request.to))?;
    info!(to = %request.to, chars = request.content.chars().count(), "SMS queued");

    let message = format!("Message queued for {}", request.to);
    write_output(output, &render_action("send", &message, format, opts)?)
}

pub async fn cmd_flymode(
    client: &impl DeviceClient,
    state: Toggle,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let enabled = state.enabled();
    with_spinner("Switching flight mode...", quiet, client.set_flymode(enabled))
        .await
        .context("Failed to switch flight mode")?;

    let message = if enabled {
        "Flight mode enabled"
    } else {
        "Flight mode disabled"
    };
    write_output(output, &render_action("flymode", message, format, opts)?)
}

pub async fn cmd_reboot(
    client: &impl DeviceClient,
    yes: bool,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    if !yes && !confirm_reboot()? {
        eprintln!("Aborted.");
        return Ok(());
    }

    with_spinner("Rebooting modem...", quiet, client.reboot_mcu())
        .await
        .context("Failed to reboot modem")?;

    write_output(
        output,
        &render_action("reboot", "Reboot requested", format, opts)?,
    )
}

fn confirm_reboot() -> Result<bool> {
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
        bail!("Refusing to reboot without confirmation. Pass --yes to skip the prompt.");
    }

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Reboot the modem? It will be offline for a short while")
        .default(false)
        .interact()
        .context("Failed to get user confirmation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsfwd_core::MockController;

    fn json() -> (OutputFormat, FormatOptions) {
        (OutputFormat::Json, FormatOptions::new(true, true))
    }

    #[tokio::test]
    async fn test_send_writes_outcome() {
        let mock = MockController::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let (format, opts) = json();

        cmd_send(
            &mock,
            " 10086 ".to_string(),
            "balance".to_string(),
            format,
            Some(&path),
            &opts,
            true,
        )
        .await
        .unwrap();

        let sent = mock.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "10086");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["action"], "send");
        assert_eq!(value["ok"], true);
        assert_eq!(value["message"], "Message queued for 10086");
    }

    #[tokio::test]
    async fn test_send_rejects_empty_content() {
        let mock = MockController::new();
        let (format, opts) = json();
        let err = cmd_send(&mock, "10086".into(), "  ".into(), format, None, &opts, true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid message"));
        assert!(mock.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_flymode_text() {
        let mock = MockController::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        cmd_flymode(
            &mock,
            Toggle::On,
            OutputFormat::Text,
            Some(&path),
            &FormatOptions::default(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(mock.flymode().await, Some(true));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Flight mode enabled\n");
    }

    #[tokio::test]
    async fn test_reboot_with_yes() {
        let mock = MockController::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        cmd_reboot(
            &mock,
            true,
            OutputFormat::Text,
            Some(&path),
            &FormatOptions::default(),
            true,
        )
        .await
        .unwrap();
        assert_eq!(mock.reboot_count(), 1);
    }

    #[tokio::test]
    async fn test_control_failure_is_reported() {
        let mock = MockController::new();
        mock.set_controls_failing(true);
        mock.set_fail_message("serial port not open").await;

        let err = cmd_reboot(
            &mock,
            true,
            OutputFormat::Text,
            None,
            &FormatOptions::default(),
            true,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to reboot modem");
        assert!(format!("{:#}", err).contains("serial port not open"));
    }
}
