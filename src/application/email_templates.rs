//! Fixed templates for the confirmation email and the unsubscribe page.
//!
//! User-supplied values (the email address) are always escaped before being
//! interpolated into HTML, and query-encoded before being placed in a URL.

/// Escapes the five HTML-significant characters. Applied to every
/// user-supplied value before it reaches markup.
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

fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Renders the waitlist confirmation email once as both a plain-text and an
/// HTML body. Returns `(subject, text, html)`.
pub fn confirmation_email(app_origin: &str, email: &str) -> (String, String, String) {
    let subject = "You're on the waitlist!".to_string();
    let unsubscribe_url = format!(
        "{}/unsubscribe?email={}",
        app_origin.trim_end_matches('/'),
        encode_query_value(email)
    );

    let text = format!(
        "Thanks for joining the waitlist!\n\n\
         We'll email you as soon as your spot opens up.\n\n\
         Didn't sign up, or changed your mind? Unsubscribe here:\n{unsubscribe_url}\n"
    );

    let escaped_email = escape_html(email);
    let html = format!(
        r#"<div style="font-family:-apple-system,Segoe UI,Roboto,sans-serif;max-width:560px;margin:0 auto;padding:24px;">
  <h1 style="font-size:20px;color:#111827;margin:0 0 12px;">You're on the waitlist!</h1>
  <p style="margin:12px 0 0;color:#374151;">Thanks for joining with <strong>{escaped_email}</strong>. We'll email you as soon as your spot opens up.</p>
  <p style="margin:24px 0 0;color:#6b7280;font-size:12px;">Didn't sign up, or changed your mind? <a href="{unsubscribe_url}" style="color:#6b7280;">Unsubscribe</a>.</p>
</div>"#
    );

    (subject, text, html)
}

/// Renders the unsubscribe confirmation page served by `GET /unsubscribe`.
/// The page shows the (escaped) email and posts it back to `/unsubscribe`
/// when the button is clicked.
pub fn unsubscribe_page(email: &str) -> String {
    let escaped_email = escape_html(email);
    // JSON-encoding yields a quoted JS string literal; angle brackets are
    // additionally unicode-escaped so a literal "</script>" in the value
    // cannot terminate the script element.
    let email_js = serde_json::to_string(email)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e");

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width,initial-scale=1">
  <title>Unsubscribe</title>
</head>
<body style="font-family:-apple-system,Segoe UI,Roboto,sans-serif;max-width:560px;margin:48px auto;padding:0 24px;color:#111827;">
  <h1 style="font-size:20px;">Unsubscribe from the waitlist</h1>
  <p style="color:#374151;">Stop receiving emails for <strong>{escaped_email}</strong>?</p>
  <button id="unsubscribe" style="padding:12px 18px;background-color:#111827;color:#ffffff;border:none;border-radius:8px;font-weight:600;cursor:pointer;">Unsubscribe</button>
  <p id="result" style="color:#374151;"></p>
  <script>
    document.getElementById('unsubscribe').addEventListener('click', async () => {{
      const res = await fetch('/unsubscribe', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify({{ email: {email_js} }}),
      }});
      const data = await res.json();
      document.getElementById('result').textContent = data.message || 'Done.';
    }});
  </script>
</body>
</html>"#
    )
}
