//! HTML pages. Everything user-supplied goes through `escape`.

use std::fmt::Write;
use serde_json::Value;

use crate::fields::{FieldSpec, MEASUREMENTS, PRESETS, WINE_TYPE_FIELD};
use crate::request::FormFields;

pub const APP_TITLE: &str = "Wine Quality Prediction";

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#222}\
nav a{margin-right:1rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:.75rem}\
label{display:block;font-size:.9rem}\
input,select{width:100%;padding:.35rem}\
.alert{padding:.75rem;border-radius:4px;margin:1rem 0}\
.alert-error{background:#fde2e2;border:1px solid #e0a0a0}\
.result{background:#e7f5e7;border:1px solid #9c9}\
.score{font-size:3rem;font-weight:bold}\
pre{background:#f4f4f4;padding:.75rem;overflow:auto}";

/// Minimal HTML escaping for text and attribute values
pub fn escape(raw: &str) -> String
{   let mut out = String::with_capacity(raw.len());
    for c in raw.chars()
    {   match c
        {   '&' => out.push_str("&amp;")
          , '<' => out.push_str("&lt;")
          , '>' => out.push_str("&gt;")
          , '"' => out.push_str("&quot;")
          , '\'' => out.push_str("&#39;")
          , _ => out.push(c)
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String
{   format!(
      "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
       <meta charset=\"utf-8\">\n\
       <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
       <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
       <nav><a href=\"/\">Predict</a><a href=\"/api-info\">API</a></nav>\n\
       {body}\n</body>\n</html>\n",
      title = escape(title),
      style = STYLE,
      body = body
    )
}

/// What the index page shows besides the form
#[derive(Debug, Default)]
pub struct IndexView<'a>
{   pub inputs: Option<&'a FormFields>
  , pub result: Option<&'a Value>
  , pub error: Option<&'a str>
}

pub fn index(view: &IndexView<'_>) -> String
{   let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>\n", escape(APP_TITLE));

    if let Some(message) = view.error
    {   let _ = write!(
          body,
          "<div class=\"alert alert-error\" id=\"error\">{}</div>\n",
          escape(message)
        );
    }
    if let Some(result) = view.result
    {   body.push_str(&render_result(result));
    }

    body.push_str("<p>Examples: ");
    for preset in PRESETS.iter()
    {   let _ = write!(
          body,
          "<a href=\"/?example={}\">{}</a> ",
          escape(preset.key),
          escape(preset.title)
        );
    }
    body.push_str("<a href=\"/\">Clear</a></p>\n");

    body.push_str(&render_form(view.inputs));
    layout(APP_TITLE, &body)
}

fn field_value<'a>(inputs: Option<&'a FormFields>, name: &str) -> &'a str
{   inputs
      .and_then(|fields| fields.get(name))
      .map(String::as_str)
      .unwrap_or("")
}

fn render_input(spec: &FieldSpec, value: &str) -> String
{   let label = if spec.unit.is_empty()
    {   spec.label.to_string()
    } else
    {   format!("{} ({})", spec.label, spec.unit)
    };
    format!(
      "<div><label for=\"{name}\">{label}</label>\
       <input type=\"number\" id=\"{name}\" name=\"{name}\" \
       min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" \
       title=\"{title}\" required></div>\n",
      name = escape(spec.name),
      label = escape(&label),
      min = spec.min,
      max = spec.max,
      step = spec.step,
      value = escape(value),
      title = escape(spec.description)
    )
}

fn render_form(inputs: Option<&FormFields>) -> String
{   let mut form = String::from(
      "<form method=\"post\" action=\"/predict\" id=\"wineForm\">\n\
       <div class=\"grid\">\n"
    );

    let wine_type = field_value(inputs, WINE_TYPE_FIELD);
    let selected = |v: &str| if wine_type == v { " selected" } else { "" };
    let _ = write!(
      form,
      "<div><label for=\"{name}\">Wine type</label>\
       <select id=\"{name}\" name=\"{name}\" required>\
       <option value=\"\"{blank}>Choose...</option>\
       <option value=\"1\"{red}>Red</option>\
       <option value=\"0\"{white}>White</option>\
       </select></div>\n",
      name = WINE_TYPE_FIELD,
      blank = selected(""),
      red = selected("1"),
      white = selected("0")
    );

    for spec in MEASUREMENTS.iter()
    {   form.push_str(&render_input(spec, field_value(inputs, spec.name)));
    }

    form.push_str(
      "</div>\n<p><button type=\"submit\">Predict quality</button></p>\n\
       </form>\n"
    );
    form
}

fn render_result(result: &Value) -> String
{   let mut out = String::from("<section class=\"alert result\" id=\"result\">\n");
    out.push_str("<h2>Prediction</h2>\n");

    if let Some(prediction) = result.get("prediction")
    {   let _ = write!(
          out,
          "<div class=\"score\">{}</div><p>Predicted quality score (0-10)</p>\n",
          escape(&display_scalar(prediction))
        );
    }
    if let Some(confidence) = result.get("confidence").and_then(Value::as_f64)
    {   let _ = write!(
          out,
          "<p>Confidence: <strong>{:.1}%</strong></p>\n",
          confidence * 100.0
        );
    }
    if let Some(probabilities) = result
      .get("probabilities")
      .and_then(Value::as_object)
    {   out.push_str("<table><tr><th>Quality</th><th>Probability</th></tr>\n");
        for (class, probability) in probabilities
        {   let shown = probability
              .as_f64()
              .map(|p| format!("{:.1}%", p * 100.0))
              .unwrap_or_else(|| display_scalar(probability));
            let _ = write!(
              out,
              "<tr><td>{}</td><td>{}</td></tr>\n",
              escape(class),
              escape(&shown)
            );
        }
        out.push_str("</table>\n");
    }

    let raw = serde_json::to_string_pretty(result)
      .unwrap_or_else(|_| result.to_string());
    let _ = write!(out, "<pre id=\"result-json\">{}</pre>\n", escape(&raw));
    out.push_str("</section>\n");
    out
}

fn display_scalar(value: &Value) -> String
{   match value
    {   Value::String(s) => s.clone()
      , other => other.to_string()
    }
}

pub fn api_info() -> String
{   let example = serde_json::to_string_pretty(&crate::fields::example_payload())
      .unwrap_or_default();

    let mut fields = String::new();
    for spec in MEASUREMENTS.iter()
    {   let _ = write!(
          fields,
          "<tr><td><code>{}</code></td><td>{}</td><td>{}</td></tr>\n",
          escape(spec.name),
          escape(spec.description),
          escape(spec.unit)
        );
    }
    let _ = write!(
      fields,
      "<tr><td><code>{}</code></td><td>Wine type, 1 for red, 0 for white</td><td></td></tr>\n",
      WINE_TYPE_FIELD
    );

    let body = format!(
      "<h1>API Information</h1>\n\
       <h2>Endpoints</h2>\n<ul>\n\
       <li><code>POST /api/predict</code>: predict quality from a JSON sample</li>\n\
       <li><code>GET /api/best-worst-wines</code>: best and worst wine in the dataset</li>\n\
       <li><code>GET /health</code>: frontend and prediction API status</li>\n\
       </ul>\n\
       <h2>Fields</h2>\n\
       <table><tr><th>Name</th><th>Description</th><th>Unit</th></tr>\n{fields}</table>\n\
       <h2>Example request</h2>\n<pre>{example}</pre>\n\
       <h2>Example response</h2>\n\
       <pre>{{\n  \"prediction\": 6,\n  \"confidence\": 0.71,\n  \
       \"probabilities\": {{ \"5\": 0.2, \"6\": 0.71, \"7\": 0.09 }}\n}}</pre>\n",
      fields = fields,
      example = escape(&example)
    );
    layout("API Information", &body)
}

pub fn not_found(path: &str) -> String
{   let body = format!(
      "<h1>Page not found</h1>\n<p>Nothing lives at <code>{}</code>.</p>\n\
       <p><a href=\"/\">Back to the prediction form</a></p>\n",
      escape(path)
    );
    layout("Page not found", &body)
}

pub fn error_page(message: &str) -> String
{   let body = format!(
      "<h1>Server error</h1>\n<div class=\"alert alert-error\">{}</div>\n\
       <p><a href=\"/\">Back to the prediction form</a></p>\n",
      escape(message)
    );
    layout("Server error", &body)
}
