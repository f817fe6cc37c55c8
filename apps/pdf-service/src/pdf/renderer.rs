//! Renderer Engine — compiles a template body against a render context.

use chrono::NaiveDate;
use handlebars::{Handlebars, RenderError};
use serde::Serialize;
use serde_json::Value;

use crate::pdf::helpers::{self, iso_date};
use crate::pdf::templates::DocumentTemplate;

/// Data handed to a template: the document itself plus fields derived at
/// render time.
#[derive(Debug, Clone)]
pub struct RenderContext {
    data: Value,
}

impl RenderContext {
    /// Serializes `document` and adds `currentDate` unless the document
    /// already carries one.
    pub fn from_document<T: Serialize>(document: &T, today: NaiveDate) -> serde_json::Result<Self> {
        let mut data = serde_json::to_value(document)?;
        if let Value::Object(map) = &mut data {
            map.entry("currentDate")
                .or_insert_with(|| Value::String(iso_date(today)));
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// Holds the helper registry. Templates are compiled on every call.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        helpers::register_all(&mut registry);
        Self { registry }
    }

    pub fn render(
        &self,
        template: &DocumentTemplate,
        context: &RenderContext,
    ) -> Result<String, RenderError> {
        self.registry.render_template(&template.body, context.data())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
