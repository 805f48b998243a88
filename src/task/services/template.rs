//! Rendering of task prototypes into create requests.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};

use crate::task::{
    domain::{ChecklistItem, TaskPrototype},
    ports::{TaskTemplateCatalog, TaskTemplateError, TaskTemplateResult},
};

use super::CreateTaskRequest;

/// Looks up `key` in `catalog` and renders it against `context`.
///
/// # Errors
///
/// Returns [`TaskTemplateError::NotFound`] for an unknown key,
/// [`TaskTemplateError::Render`] when a template fails to render, and
/// propagates catalogue failures.
pub fn resolve_template<T>(
    catalog: &T,
    key: &str,
    context: &Map<String, Value>,
) -> TaskTemplateResult<CreateTaskRequest>
where
    T: TaskTemplateCatalog + ?Sized,
{
    let prototype = catalog
        .find_by_key(key)?
        .ok_or_else(|| TaskTemplateError::NotFound(key.to_owned()))?;
    render_prototype(key, &prototype, context)
}

/// Renders a prototype's title and description against `context`.
///
/// The template key is available to templates as `template`. Undefined
/// variables are render errors.
///
/// # Errors
///
/// Returns [`TaskTemplateError::Render`] when rendering fails or a
/// checklist entry is blank.
pub fn render_prototype(
    key: &str,
    prototype: &TaskPrototype,
    context: &Map<String, Value>,
) -> TaskTemplateResult<CreateTaskRequest> {
    let mut environment = Environment::new();
    environment.set_undefined_behavior(UndefinedBehavior::Strict);
    let template_context = build_template_context(key, context);
    let render = |template: &str| {
        environment
            .render_str(template, &template_context)
            .map_err(|error| render_error(key, error))
    };

    let title = render(&prototype.title_template)?;
    let checklist = prototype
        .checklist
        .iter()
        .map(|text| ChecklistItem::new(text.as_str()).map_err(|error| render_error(key, error)))
        .collect::<TaskTemplateResult<Vec<_>>>()?;

    let mut request = CreateTaskRequest::new(title, prototype.task_type)
        .with_priority(prototype.priority)
        .with_checklist(checklist)
        .with_tags(prototype.tags.iter().cloned());
    if let Some(template) = prototype.description_template.as_deref() {
        request = request.with_description(render(template)?);
    }
    if let Some(minutes) = prototype.estimated_duration_minutes {
        request = request.with_estimated_duration(minutes);
    }
    if let Some(reminder) = prototype.reminder {
        request = request.with_reminder(reminder);
    }
    Ok(request)
}

fn build_template_context(key: &str, context: &Map<String, Value>) -> Map<String, Value> {
    let mut template_context = context.clone();
    template_context
        .entry("template")
        .or_insert_with(|| Value::String(key.to_owned()));
    template_context
}

fn render_error(key: &str, error: impl std::fmt::Display) -> TaskTemplateError {
    TaskTemplateError::Render {
        key: key.to_owned(),
        reason: error.to_string(),
    }
}
