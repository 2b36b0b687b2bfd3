/// Assignment email rendering

use super::Email;
use crate::models::task::Task;
use crate::models::user::User;

/// Renders the email sent to `assignee` when `task` is assigned to them
///
/// All interpolated values are HTML-escaped.
pub fn assignment_email(assignee: &User, task: &Task) -> Email {
    let description = task
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or("No description provided");

    let due_date = task
        .due_date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Not specified".to_string());

    let html = format!(
        "<h2>Hi {name},</h2>\n\
         <p>You have been assigned a new task.</p>\n\
         <p><strong>Title:</strong> {title}</p>\n\
         <p><strong>Description:</strong> {description}</p>\n\
         <p><strong>Priority:</strong> {priority}</p>\n\
         <p><strong>Due Date:</strong> {due_date}</p>\n\
         <p>Please log in to your dashboard to view more details.</p>\n\
         <br/>\n\
         <p>- Task Management System</p>\n",
        name = escape_html(&assignee.name),
        title = escape_html(&task.title),
        description = escape_html(description),
        priority = task.priority,
        due_date = escape_html(&due_date),
    );

    Email {
        to: assignee.email.clone(),
        subject: format!("New Task Assigned: {}", task.title),
        html,
    }
}

/// Escapes the five HTML-significant characters
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use crate::models::user::Role;
    use chrono::{NaiveDate, Utc};

    fn assignee() -> User {
        User {
            id: 3,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    fn task(description: Option<&str>) -> Task {
        Task {
            id: 1,
            title: "Fix <login> & deploy".to_string(),
            description: description.map(str::to_string),
            assigned_to: Some(3),
            due_date: None,
            priority: TaskPriority::High,
            status: TaskStatus::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_assignment_email_fields() {
        let mut t = task(Some("Rotate the keys"));
        t.due_date = NaiveDate::from_ymd_opt(2025, 11, 19).and_then(|d| d.and_hms_opt(0, 0, 0));

        let email = assignment_email(&assignee(), &t);

        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "New Task Assigned: Fix <login> & deploy");
        assert!(email.html.contains("Hi Ada,"));
        assert!(email.html.contains("Fix &lt;login&gt; &amp; deploy"));
        assert!(email.html.contains("Rotate the keys"));
        assert!(email.html.contains("<strong>Priority:</strong> High"));
        assert!(email.html.contains("2025-11-19 00:00:00"));
    }

    #[test]
    fn test_assignment_email_fallbacks() {
        let email = assignment_email(&assignee(), &task(None));
        assert!(email.html.contains("No description provided"));
        assert!(email.html.contains("Not specified"));

        let email = assignment_email(&assignee(), &task(Some("")));
        assert!(email.html.contains("No description provided"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
