// Email templates - render an alert request into subject/text/html
//
// Pure formatting, no I/O. The optional request fields (amount, category,
// goal progress) are folded into the body when present.

use crate::notifications::NotificationRequest;

/// Rendered email content, matching the backend send endpoint's body shape.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render the email for one alert.
pub fn render_email(request: &NotificationRequest) -> EmailContent {
    let subject = format!("[Finpulse] {}", request.title);

    let mut lines = vec![request.message.clone()];
    if let Some(amount) = request.amount {
        lines.push(format!("Amount: ${:.2}", amount));
    }
    if let Some(ref category) = request.category {
        lines.push(format!("Category: {}", category));
    }
    if let (Some(ref goal), Some(progress)) = (&request.goal_name, request.progress) {
        lines.push(format!("{}: {}% complete", goal, progress));
    }
    let text = lines.join("\n");

    let detail_rows: String = lines[1..]
        .iter()
        .map(|line| format!("      <p style=\"margin:4px 0;color:#555;\">{}</p>\n", line))
        .collect();
    let html = format!(
        "<div style=\"font-family:sans-serif;max-width:480px;margin:0 auto;\">\n\
         \x20 <h2 style=\"color:#1a7f64;\">{title}</h2>\n\
         \x20 <p>{message}</p>\n\
         \x20 <div>\n{details}  </div>\n\
         \x20 <p style=\"font-size:12px;color:#999;\">Sent by Finpulse alerts</p>\n\
         </div>",
        title = request.title,
        message = request.message,
        details = detail_rows,
    );

    EmailContent {
        subject,
        text,
        html,
    }
}
