use notify_rust::{Notification, Timeout};

pub const APP_SUMMARY: &str = "Interval It";

pub fn send_notification(
    message: &str,
    sound: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut notification = Notification::new();
    notification.summary(APP_SUMMARY).body(message);
    if let Some(sound) = sound {
        notification.sound_name(sound);
    }
    notification.show()?;
    Ok(())
}

/// Puts a message in front of the user that stays until dismissed.
pub fn alert_user(message: &str) {
    eprintln!("\n⚠️  {}", message);
    let shown = Notification::new()
        .summary(&format!("{} - Alert", APP_SUMMARY))
        .body(message)
        .timeout(Timeout::Never) // No auto-dismiss
        .show();
    if let Err(e) = shown {
        tracing::warn!("Failed to show alert dialog: {}", e);
    }
}
