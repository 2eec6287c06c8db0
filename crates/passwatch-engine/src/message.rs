//! Notification message rendering.

/// Subject line for every reminder.
pub const SUBJECT: &str = "Password change required";

/// Render the plain-text reminder body.
pub fn notification_body(salutation: &str, threshold_days: u32) -> String {
    format!(
        r#"Hello {salutation},

Your password was last changed more than {threshold_days} days ago.
Please change it at your earliest convenience.

This is an automated message. Do not reply to this email.
"#
    )
}
