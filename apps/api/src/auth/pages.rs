//! Server-rendered HTML for the landing page and the auth forms.

use std::fmt::Write as _;

use crate::render::html::escape;

const PAGE_CSS: &str = "body { font-family: Arial, Helvetica, sans-serif; max-width: 420px; \
    margin: 48px auto; color: #1f2937; } label { display: block; margin-top: 12px; } \
    input { width: 100%; padding: 6px; box-sizing: border-box; } \
    button { margin-top: 16px; padding: 8px 16px; } .error { color: #b91c1c; }";

pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | Resume Builder</title>\n<style>{PAGE_CSS}</style>\n</head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    )
}

pub fn landing() -> String {
    page(
        "Welcome",
        "<h1>Resume Builder</h1>\
         <p>Fill in your details once, pick a template and download a polished PDF.</p>\
         <p><a href=\"/register/\">Create an account</a> or <a href=\"/login/\">sign in</a>.</p>\
         <p><a href=\"/templates/\">Browse templates</a></p>",
    )
}

/// Form kinds share markup; only the action, title and alternate link differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    Login,
    Register,
}

impl AuthForm {
    fn action(self) -> &'static str {
        match self {
            AuthForm::Login => "/login/",
            AuthForm::Register => "/register/",
        }
    }

    fn title(self) -> &'static str {
        match self {
            AuthForm::Login => "Sign in",
            AuthForm::Register => "Create an account",
        }
    }
}

pub fn auth_form(kind: AuthForm, email: &str, next: Option<&str>, error: Option<&str>) -> String {
    let mut body = format!("<h1>{}</h1>", kind.title());
    if let Some(error) = error {
        let _ = write!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    let _ = write!(
        body,
        "<form method=\"post\" action=\"{action}\">\
         <label>Email <input type=\"email\" name=\"email\" value=\"{email}\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <input type=\"hidden\" name=\"next\" value=\"{next}\">\
         <button type=\"submit\">{title}</button></form>",
        action = kind.action(),
        email = escape(email),
        next = escape(next.unwrap_or_default()),
        title = kind.title(),
    );
    match kind {
        AuthForm::Login => body.push_str("<p>No account? <a href=\"/register/\">Register</a></p>"),
        AuthForm::Register => {
            body.push_str("<p>Already registered? <a href=\"/login/\">Sign in</a></p>")
        }
    }
    page(kind.title(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_carries_next_and_error() {
        let html = auth_form(
            AuthForm::Login,
            "a@b.co",
            Some("/profile/"),
            Some("Invalid email or password"),
        );
        assert!(html.contains("action=\"/login/\""));
        assert!(html.contains("name=\"next\" value=\"/profile/\""));
        assert!(html.contains("Invalid email or password"));
        assert!(html.contains("value=\"a@b.co\""));
    }

    #[test]
    fn test_form_escapes_echoed_values() {
        let html = auth_form(AuthForm::Register, "\"><script>", None, None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("action=\"/register/\""));
    }
}
