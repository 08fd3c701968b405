//! Self-contained HTML receipt for a registration.
//!
//! Built entirely from submitted data with no network dependency, so it
//! works both as a pre-submission preview and as the post-submission
//! confirmation artifact.

use chrono::Utc;

use crate::email::templates::escape_html;
use crate::models::{
    NewRegistration, Registration, EVENT_DATE, EVENT_NAME, EVENT_VENUE, REGISTRATION_FEE_INR,
};

/// Receipt rendered before submission.
pub fn preview(registration: &NewRegistration) -> String {
    render(&Fields::from_payload(registration), false)
}

/// Receipt rendered from the store's echoed record after submission.
pub fn confirmation(registration: &Registration) -> String {
    render(&Fields::from_record(registration), true)
}

struct Fields<'a> {
    team_name: &'a str,
    college_name: &'a str,
    leader: [&'a str; 4],
    member2: [&'a str; 4],
    member3: [&'a str; 4],
    utr_number: &'a str,
    account_holder_name: &'a str,
    project_idea: Option<&'a str>,
}

impl<'a> Fields<'a> {
    fn from_payload(r: &'a NewRegistration) -> Self {
        Self {
            team_name: &r.team_name,
            college_name: &r.college_name,
            leader: [
                &r.leader_name,
                &r.leader_email,
                &r.leader_phone,
                &r.leader_tshirt_size,
            ],
            member2: [
                &r.member2_name,
                &r.member2_email,
                &r.member2_phone,
                &r.member2_tshirt_size,
            ],
            member3: [
                &r.member3_name,
                &r.member3_email,
                &r.member3_phone,
                &r.member3_tshirt_size,
            ],
            utr_number: &r.utr_number,
            account_holder_name: &r.account_holder_name,
            project_idea: r.project_idea.as_deref(),
        }
    }

    fn from_record(r: &'a Registration) -> Self {
        Self {
            team_name: &r.team_name,
            college_name: &r.college_name,
            leader: [
                &r.leader_name,
                &r.leader_email,
                &r.leader_phone,
                &r.leader_tshirt_size,
            ],
            member2: [
                &r.member2_name,
                &r.member2_email,
                &r.member2_phone,
                &r.member2_tshirt_size,
            ],
            member3: [
                &r.member3_name,
                &r.member3_email,
                &r.member3_phone,
                &r.member3_tshirt_size,
            ],
            utr_number: &r.utr_number,
            account_holder_name: &r.account_holder_name,
            project_idea: r.project_idea.as_deref(),
        }
    }
}

fn member_section(title: &str, person: &[&str; 4]) -> String {
    format!(
        r#"        <div class="member">
            <h4>{title}</h4>
            <p><strong>Name:</strong> {name}</p>
            <p><strong>Email:</strong> {email}</p>
            <p><strong>Phone:</strong> {phone}</p>
            <p><strong>T-Shirt Size:</strong> {size}</p>
        </div>"#,
        title = title,
        name = escape_html(person[0]),
        email = escape_html(person[1]),
        phone = escape_html(person[2]),
        size = escape_html(person[3]),
    )
}

fn render(fields: &Fields<'_>, confirmed: bool) -> String {
    let heading = if confirmed {
        format!("{} - REGISTRATION CONFIRMATION", EVENT_NAME.to_uppercase())
    } else {
        format!("{} - REGISTRATION PREVIEW", EVENT_NAME.to_uppercase())
    };
    let subheading = if confirmed {
        "Your registration has been successfully completed!"
    } else {
        "Review your details below before submitting."
    };
    let payment_status = if confirmed { "Confirmed" } else { "Pending submission" };

    let project_section = match fields.project_idea {
        Some(idea) if !idea.trim().is_empty() => format!(
            r#"    <div class="section">
        <h3>PROJECT IDEA</h3>
        <p>{}</p>
    </div>
"#,
            escape_html(idea)
        ),
        _ => String::new(),
    };

    let generated_at = Utc::now();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{event} Registration</title>
    <style>
        body {{
            font-family: 'Arial', sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background: #f9f9f9;
        }}
        .header {{
            text-align: center;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 30px;
            border-radius: 10px;
            margin-bottom: 30px;
        }}
        .section {{
            background: white;
            padding: 20px;
            border-radius: 10px;
            margin: 20px 0;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }}
        .section h3 {{
            color: #667eea;
            border-bottom: 2px solid #667eea;
            padding-bottom: 10px;
            margin-bottom: 15px;
        }}
        .member {{
            background: #f8f9fa;
            padding: 15px;
            border-radius: 8px;
            margin: 10px 0;
            border-left: 4px solid #667eea;
        }}
        .important {{
            background: #d4edda;
            color: #155724;
            padding: 15px;
            border-radius: 8px;
            border-left: 4px solid #28a745;
            margin: 15px 0;
        }}
        .footer {{
            text-align: center;
            margin-top: 30px;
            padding: 20px;
            background: #e9ecef;
            border-radius: 10px;
        }}
    </style>
</head>
<body>
    <div class="header">
        <h1>{heading}</h1>
        <p>{subheading}</p>
    </div>

    <div class="section">
        <h3>TEAM INFORMATION</h3>
        <p><strong>Team Name:</strong> {team}</p>
        <p><strong>College:</strong> {college}</p>
    </div>

    <div class="section">
        <h3>TEAM MEMBERS</h3>
{leader}

{member2}

{member3}
    </div>

    <div class="section">
        <h3>PAYMENT DETAILS</h3>
        <p><strong>UTR Number:</strong> {utr}</p>
        <p><strong>Account Holder:</strong> {holder}</p>
        <p><strong>Amount:</strong> Rs. {fee}</p>
        <p><strong>Payment Status:</strong> {payment_status}</p>
    </div>

{project_section}    <div class="important">
        <h3>IMPORTANT REMINDERS</h3>
        <ul>
            <li>Bring a valid ID proof to the event</li>
            <li><strong>Event Date:</strong> {date}</li>
            <li><strong>Venue:</strong> {venue}</li>
            <li><strong>Registration Fee:</strong> Rs. {fee}</li>
        </ul>
    </div>

    <div class="footer">
        <p>Thank you for registering for {event}!</p>
        <p>For any queries, contact the organizing team.</p>
        <p><small>Generated on: {generated}</small></p>
    </div>
</body>
</html>"#,
        event = EVENT_NAME,
        heading = heading,
        subheading = subheading,
        team = escape_html(fields.team_name),
        college = escape_html(fields.college_name),
        leader = member_section("Team Leader", &fields.leader),
        member2 = member_section("Member 2", &fields.member2),
        member3 = member_section("Member 3", &fields.member3),
        utr = escape_html(fields.utr_number),
        holder = escape_html(fields.account_holder_name),
        fee = REGISTRATION_FEE_INR,
        payment_status = payment_status,
        project_section = project_section,
        date = EVENT_DATE,
        venue = EVENT_VENUE,
        generated = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> NewRegistration {
        NewRegistration {
            leader_name: "Asha Rao".to_string(),
            leader_email: "asha@college.edu".to_string(),
            leader_phone: "9876543210".to_string(),
            leader_tshirt_size: "M".to_string(),
            college_name: "Vignan Institute".to_string(),
            team_name: "Byte Ninjas".to_string(),
            member2_name: "Ravi".to_string(),
            member2_email: "ravi@college.edu".to_string(),
            member2_phone: "9876543211".to_string(),
            member2_tshirt_size: "L".to_string(),
            member3_name: "Divya".to_string(),
            member3_email: "divya@college.edu".to_string(),
            member3_phone: "9876543212".to_string(),
            member3_tshirt_size: "S".to_string(),
            utr_number: "123456789012".to_string(),
            account_holder_name: "Asha Rao".to_string(),
            project_idea: Some("AI for mess queues".to_string()),
            payment_screenshot_path: Some("payment_x.png".to_string()),
            ip_address: "203.0.113.9".to_string(),
        }
    }

    #[test]
    fn test_preview_embeds_all_key_fields() {
        let html = preview(&sample_payload());
        assert!(html.contains("PREVIEW"));
        assert!(html.contains("Byte Ninjas"));
        assert!(html.contains("asha@college.edu"));
        assert!(html.contains("ravi@college.edu"));
        assert!(html.contains("divya@college.edu"));
        assert!(html.contains("123456789012"));
        assert!(html.contains("Rs. 600"));
        assert!(html.contains("AI for mess queues"));
    }

    #[test]
    fn test_confirmation_marks_payment_confirmed() {
        let record = Registration {
            id: Some(3),
            team_name: "Byte Ninjas".to_string(),
            leader_name: "Asha Rao".to_string(),
            leader_email: "asha@college.edu".to_string(),
            utr_number: "123456789012".to_string(),
            ..Default::default()
        };
        let html = confirmation(&record);
        assert!(html.contains("CONFIRMATION"));
        assert!(html.contains("Payment Status:</strong> Confirmed"));
    }

    #[test]
    fn test_user_content_is_escaped() {
        let mut payload = sample_payload();
        payload.team_name = "<script>alert(1)</script>".to_string();
        let html = preview(&payload);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_empty_project_idea_has_no_section() {
        let mut payload = sample_payload();
        payload.project_idea = None;
        let html = preview(&payload);
        assert!(!html.contains("PROJECT IDEA"));
    }
}
