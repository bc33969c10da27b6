//! Phase-end sound playback through a user-supplied shell command

use tokio::process::Command;
use tracing::{debug, info};

/// Run a sound command such as `paplay ~/bell.oga` and wait for it to finish
pub async fn play_sound(command_line: &str) -> Result<(), String> {
    debug!("Playing sound with: {}", command_line);

    let output = Command::new("sh")
        .args(["-c", command_line])
        .output()
        .await
        .map_err(|e| format!("Failed to execute sound command: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("Sound command failed: {}", stderr.trim()));
    }

    info!("Sound played");
    Ok(())
}
