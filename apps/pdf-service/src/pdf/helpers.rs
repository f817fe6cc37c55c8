//! Handlebars helpers available to every resume and cover-letter template.
//!
//! Each helper is a thin adapter over a pure function in this module so the
//! formatting rules can be tested without a registry.

use chrono::{NaiveDate, Utc};
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, Output,
    RenderContext, RenderError, Renderable, ScopedJson,
};
use serde_json::Value;

/// Registers every template helper on `registry`.
pub fn register_all(registry: &mut Handlebars<'static>) {
    registry.register_helper("formatDate", Box::new(format_date_helper));
    registry.register_helper("ifEquals", Box::new(IfEquals));
    registry.register_helper("join", Box::new(Join));
    registry.register_helper("hasItems", Box::new(has_items_helper));
    registry.register_helper("capitalize", Box::new(capitalize_helper));
    registry.register_helper("formatCurrentDate", Box::new(Today(long_date)));
    registry.register_helper("currentDate", Box::new(Today(iso_date)));
    registry.register_helper("formatParagraph", Box::new(format_paragraph_helper));
}

handlebars_helper!(format_date_helper: |v: Json| format_month_year(v));
handlebars_helper!(has_items_helper: |v: Json| has_items(v));
handlebars_helper!(capitalize_helper: |v: Json| capitalize(v));
handlebars_helper!(format_paragraph_helper: |v: Json| paragraph_html(v));

/// `YYYY-MM` → `Mon YYYY`. Anything else renders as an empty string.
pub fn format_month_year(value: &Value) -> String {
    let Some(raw) = value.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_default()
}

/// Non-blank strings of `items` joined by `separator` (default `", "`).
pub fn join_non_blank(items: &Value, separator: Option<&str>) -> String {
    let Some(items) = items.as_array() else {
        return String::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator.unwrap_or(", "))
}

pub fn has_items(value: &Value) -> bool {
    value.as_array().is_some_and(|items| !items.is_empty())
}

pub fn capitalize(value: &Value) -> String {
    let Some(s) = value.as_str() else {
        return String::new();
    };
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escapes the text and turns newlines into `<br>` for use with `{{{ }}}`.
pub fn paragraph_html(value: &Value) -> String {
    match value.as_str() {
        Some(text) if !text.is_empty() => handlebars::html_escape(text).replace('\n', "<br>"),
        _ => String::new(),
    }
}

/// `Month D, YYYY`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `YYYY-MM-DD`
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Loose equality between two JSON values: numbers compare with numeric
/// strings, booleans compare as 0/1, everything else compares structurally.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Bool(x), other) | (other, Value::Bool(x)) => {
            loose_eq(&Value::from(u8::from(*x)), other)
        }
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            numeric(s).is_some_and(|parsed| Some(parsed) == n.as_f64())
        }
        _ => a == b,
    }
}

fn numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Some(0.0)
    } else {
        trimmed.parse().ok()
    }
}

/// `{{#ifEquals a b}}…{{else}}…{{/ifEquals}}`
struct IfEquals;

impl HelperDef for IfEquals {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let left = h.param(0).map(|p| p.value().clone()).unwrap_or(Value::Null);
        let right = h.param(1).map(|p| p.value().clone()).unwrap_or(Value::Null);

        let branch = if loose_eq(&left, &right) {
            h.template()
        } else {
            h.inverse()
        };

        match branch {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

/// `{{join items ", "}}`; the separator is optional.
struct Join;

impl HelperDef for Join {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let joined = match h.param(0) {
            Some(items) => join_non_blank(items.value(), h.param(1).and_then(|p| p.value().as_str())),
            None => String::new(),
        };
        Ok(ScopedJson::Derived(Value::String(joined)))
    }
}

/// Zero-argument helper that formats today's date.
struct Today(fn(NaiveDate) -> String);

/// Today's calendar date in UTC, so `currentDate` does not depend on the
/// host's timezone.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl HelperDef for Today {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        _: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        Ok(ScopedJson::Derived(Value::String((self.0)(today()))))
    }
}
