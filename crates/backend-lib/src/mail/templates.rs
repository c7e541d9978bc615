//! Email bodies.
use super::OutgoingEmail;

pub const VERIFICATION_SUBJECT: &str = "Verify your email address";

/// Link the web client handles for verification
pub fn verification_url(frontend_url: &str, token: &str) -> String {
    format!("{}/verify-email/{token}", frontend_url.trim_end_matches('/'))
}

pub fn verification_email(to: &str, url: &str, ttl_hours: u64) -> OutgoingEmail {
    let html_body = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Welcome to SaaS App!</h2>
  <p>Thank you for signing up. Please verify your email address by clicking the button below:</p>
  <div style="text-align: center; margin: 30px 0;">
    <a href="{url}" style="background-color: #007bff; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block;">
      Verify Email Address
    </a>
  </div>
  <p>Or copy and paste this link into your browser:</p>
  <p style="word-break: break-all; color: #666;">{url}</p>
  <p style="color: #666; font-size: 14px;">This link will expire in {ttl_hours} hours.</p>
  <hr style="margin: 30px 0; border: none; border-top: 1px solid #eee;">
  <p style="color: #999; font-size: 12px;">If you didn't create an account, you can safely ignore this email.</p>
</div>"#
    );

    let text_body = format!(
        "Welcome to SaaS App!\n\n\
         Thank you for signing up. Please verify your email address by opening this link:\n\n\
         {url}\n\n\
         This link will expire in {ttl_hours} hours.\n\n\
         If you didn't create an account, you can safely ignore this email.\n"
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: VERIFICATION_SUBJECT.to_string(),
        html_body,
        text_body,
    }
}
