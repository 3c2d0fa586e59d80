//! Public site
//!
//! Server-rendered HTML pages built with Tera. Templates are compiled into
//! the binary and loaded once at startup.
//!
//! Pages:
//! - `/` home: federation info, upcoming events, latest news
//! - `/news`, `/news/{id}`
//! - `/events` calendar
//! - `/team` roster grouped by category and discipline
//! - `/leadership` org chart
//! - `/documents` category tree
//! - `/contacts` contact form

mod pages;

use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Datelike;
use std::error::Error as StdError;
use tera::{Context as TeraContext, Tera};

use crate::services::federation_info;

pub use pages::router;

const TEMPLATES: [(&str, &str); 10] = [
    ("base.html", include_str!("templates/base.html")),
    ("home.html", include_str!("templates/home.html")),
    ("news_list.html", include_str!("templates/news_list.html")),
    ("news_detail.html", include_str!("templates/news_detail.html")),
    ("events.html", include_str!("templates/events.html")),
    ("team.html", include_str!("templates/team.html")),
    ("leadership.html", include_str!("templates/leadership.html")),
    ("documents.html", include_str!("templates/documents.html")),
    ("contacts.html", include_str!("templates/contacts.html")),
    ("error.html", include_str!("templates/error.html")),
];

/// Template renderer for the public pages
pub struct SiteRenderer {
    tera: Tera,
}

impl SiteRenderer {
    /// Compile the built-in templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .context("Failed to compile site templates")?;
        Ok(Self { tera })
    }

    /// Render a template, flattening Tera's error chain into one message
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            let mut message = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(cause) = source {
                message.push_str(&format!("\n  Caused by: {}", cause));
                source = cause.source();
            }
            anyhow::anyhow!(message)
        })
    }

    /// Render a full page with the shared layout variables
    pub fn page(&self, template: &str, request_path: &str, mut context: TeraContext) -> Response {
        insert_layout_vars(&mut context, request_path);
        match self.render(template, &context) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("{}", e);
                self.error_page(StatusCode::INTERNAL_SERVER_ERROR, "Не удалось отобразить страницу")
            }
        }
    }

    /// Error page; falls back to bare HTML if even that template fails
    pub fn error_page(&self, status: StatusCode, message: &str) -> Response {
        let mut context = TeraContext::new();
        insert_layout_vars(&mut context, "");
        context.insert("status", &status.as_u16());
        context.insert("message", message);

        let html = match self.render("error.html", &context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Error template failed: {}", e);
                format!(
                    "<!DOCTYPE html><html lang=\"ru\"><head><meta charset=\"UTF-8\">\
                     <title>{code}</title></head><body><h1>{code}</h1></body></html>",
                    code = status.as_u16()
                )
            }
        };
        (status, Html(html)).into_response()
    }
}

fn insert_layout_vars(context: &mut TeraContext, request_path: &str) {
    let info = federation_info();
    context.insert("site_name", "ФСП Чувашии");
    context.insert("site_full_name", &info.short_name);
    context.insert("site_contacts", &info.contacts);
    context.insert("request_path", request_path);
    context.insert("year", &chrono::Local::now().year());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_compile() {
        SiteRenderer::new().expect("templates should compile");
    }

    #[test]
    fn test_error_page_keeps_status() {
        let renderer = SiteRenderer::new().unwrap();
        let response = renderer.error_page(StatusCode::NOT_FOUND, "Новость не найдена");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let renderer = SiteRenderer::new().unwrap();
        let err = renderer.render("nope.html", &TeraContext::new()).unwrap_err();
        assert!(err.to_string().contains("nope.html"));
    }
}
