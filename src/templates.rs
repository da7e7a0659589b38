use serde::Serialize;
use tera::Tera;

use crate::config::UiConfig;
use crate::error::AppError;

/// Name the form page is registered under
pub const INDEX_TEMPLATE: &str = "index.html";

const BUILTIN_INDEX: &str = include_str!("../templates/index.html");

/// Initialize the Tera template engine.
///
/// Uses the built-in page unless `ui.templates_dir` points at a directory
/// containing a replacement `index.html`.
pub fn init_templates(ui: &UiConfig) -> Result<Tera, AppError> {
    match &ui.templates_dir {
        Some(dir) => {
            let tera = Tera::new(&format!("{}/**/*", dir.trim_end_matches('/')))?;
            if !tera.get_template_names().any(|name| name == INDEX_TEMPLATE) {
                return Err(AppError::Template(tera::Error::msg(format!(
                    "{} not found in templates directory {}",
                    INDEX_TEMPLATE, dir
                ))));
            }
            Ok(tera)
        }
        None => {
            let mut tera = Tera::default();
            tera.add_raw_template(INDEX_TEMPLATE, BUILTIN_INDEX)?;
            Ok(tera)
        }
    }
}

/// Style of the status box under the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Inline status message rendered beneath the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Render the form page, with an optional notice.
pub fn render_index(
    tera: &Tera,
    ui: &UiConfig,
    notice: Option<&Notice>,
) -> Result<String, AppError> {
    let mut context = tera::Context::new();
    context.insert("config", ui);
    if let Some(notice) = notice {
        context.insert("notice", notice);
    }
    Ok(tera.render(INDEX_TEMPLATE, &context)?)
}
