//! Outgoing email subjects and bodies.

use crate::models::{Registration, EVENT_DATE, EVENT_NAME, EVENT_VENUE, REGISTRATION_FEE_INR};
use crate::wizard::otp::CODE_VALIDITY_HOURS;

pub fn otp_subject(team_name: &str) -> String {
    format!(
        "Your HackVibe 2025 OTP Code - {} Team Registration",
        team_name
    )
}

pub fn otp_body(team_name: &str, code: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Hello from Team {team}!</h2>
    <p>Use this one-time code to verify your email address for {event} registration:</p>
    <p style="font-size: 28px; letter-spacing: 6px; font-weight: bold; text-align: center;">{code}</p>
    <p>This code is valid for {validity} hours. If you did not request it, you can ignore this email.</p>
    <p><strong>Event Details:</strong></p>
    <ul>
        <li>Date: {date}</li>
        <li>Venue: {venue}</li>
    </ul>
    <p>Best regards,<br>The {event} Team</p>
</div>"#,
        team = escape_html(team_name),
        event = EVENT_NAME,
        code = code,
        validity = CODE_VALIDITY_HOURS,
        date = EVENT_DATE,
        venue = EVENT_VENUE,
    )
}

pub fn confirmation_subject() -> String {
    "HackVibe 2025 Registration Confirmation".to_string()
}

pub fn confirmation_body(registration: &Registration) -> String {
    format!(
        r#"<h2>Thank you for registering for {event}!</h2>
<p>Dear {leader},</p>
<p>Your team <b>{team}</b> has been successfully registered.</p>
<h3>Team Details:</h3>
<ul>
    <li><b>Team Name:</b> {team}</li>
    <li><b>College:</b> {college}</li>
    <li><b>Leader:</b> {leader} ({leader_email})</li>
    <li><b>Member 2:</b> {m2} ({m2_email})</li>
    <li><b>Member 3:</b> {m3} ({m3_email})</li>
    <li><b>UTR Number:</b> {utr}</li>
    <li><b>Account Holder:</b> {holder}</li>
    <li><b>Registration Fee:</b> Rs. {fee} (already paid)</li>
</ul>
<p>We will contact you soon with further details. If you have any questions, reply to this email.</p>
<p>Best regards,<br>{event} Team</p>"#,
        event = EVENT_NAME,
        leader = escape_html(&registration.leader_name),
        team = escape_html(&registration.team_name),
        college = escape_html(&registration.college_name),
        leader_email = escape_html(&registration.leader_email),
        m2 = escape_html(&registration.member2_name),
        m2_email = escape_html(&registration.member2_email),
        m3 = escape_html(&registration.member3_name),
        m3_email = escape_html(&registration.member3_email),
        utr = escape_html(&registration.utr_number),
        holder = escape_html(&registration.account_holder_name),
        fee = REGISTRATION_FEE_INR,
    )
}

/// Minimal HTML escaping for user-entered values embedded in mail bodies.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_body_carries_code() {
        let body = otp_body("Byte Ninjas", "482913");
        assert!(body.contains("482913"));
        assert!(body.contains("Byte Ninjas"));
        assert!(body.contains("24 hours"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>&"x"'</b>"#),
            "&lt;b&gt;&amp;&quot;x&quot;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_confirmation_body_embeds_team_fields() {
        let registration = Registration {
            leader_name: "Asha".to_string(),
            leader_email: "asha@ex.co".to_string(),
            team_name: "Byte Ninjas".to_string(),
            utr_number: "123456789012".to_string(),
            ..Default::default()
        };
        let body = confirmation_body(&registration);
        assert!(body.contains("Byte Ninjas"));
        assert!(body.contains("asha@ex.co"));
        assert!(body.contains("123456789012"));
        assert!(body.contains("600"));
    }
}
