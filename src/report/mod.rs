// src/report/mod.rs

//! Report rendering.
//!
//! Renderers turn unit records into bytes; the pipeline decides where the
//! bytes are written.

use std::fmt;

use crate::types::{Classification, UnitResult};

pub trait ReportRenderer: Send + Sync + fmt::Debug {
    /// Page for a single unit.
    fn render_unit(&self, unit: &UnitResult) -> Vec<u8>;

    /// Index page listing every unit.
    fn render_summary(&self, units: &[UnitResult]) -> Vec<u8>;
}

/// Minimal self-contained HTML pages.
///
/// Pages reference `style.css` relative to the report root, which is where
/// a configured assets directory lands.
#[derive(Debug, Clone, Default)]
pub struct HtmlReportRenderer;

impl ReportRenderer for HtmlReportRenderer {
    fn render_unit(&self, unit: &UnitResult) -> Vec<u8> {
        let depth = unit.name.matches('/').count();
        let root = "../".repeat(depth);

        let mut html = String::new();
        html.push_str(&page_head(&unit.name, &root));
        html.push_str(&format!(
            "<h1>{}</h1>\n<p class=\"{}\">{}</p>\n<p><a href=\"{root}index.html\">all units</a></p>\n",
            escape(&unit.name),
            css_class(unit.classification),
            unit.classification
        ));

        html.push_str(&format!(
            "<h2>Compile (exit code {})</h2>\n<pre>{}</pre>\n",
            unit.compile_exit_code,
            escape(&unit.compile_output)
        ));

        match (&unit.run_output, unit.run_exit_code) {
            (Some(output), Some(code)) => html.push_str(&format!(
                "<h2>Run (exit code {code})</h2>\n<pre>{}</pre>\n",
                escape(output)
            )),
            _ => html.push_str("<h2>Run</h2>\n<p>not run</p>\n"),
        }

        html.push_str("</body>\n</html>\n");
        html.into_bytes()
    }

    fn render_summary(&self, units: &[UnitResult]) -> Vec<u8> {
        let passed = units
            .iter()
            .filter(|u| u.classification.is_success())
            .count();

        let mut html = String::new();
        html.push_str(&page_head("Testbench summary", ""));
        html.push_str(&format!(
            "<h1>Testbench summary</h1>\n<p>{passed} of {} units succeeded</p>\n<table>\n<tr><th>unit</th><th>result</th></tr>\n",
            units.len()
        ));
        for unit in units {
            html.push_str(&format!(
                "<tr><td><a href=\"{}.html\">{}</a></td><td class=\"{}\">{}</td></tr>\n",
                escape(&unit.name),
                escape(&unit.name),
                css_class(unit.classification),
                unit.classification
            ));
        }
        html.push_str("</table>\n</body>\n</html>\n");
        html.into_bytes()
    }
}

fn page_head(title: &str, root: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<link rel=\"stylesheet\" href=\"{root}style.css\">\n</head>\n<body>\n",
        escape(title)
    )
}

fn css_class(classification: Classification) -> &'static str {
    match classification {
        Classification::Success => "success",
        Classification::CompileFailed => "compile-failed",
        Classification::RunFailed => "run-failed",
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
