//! Error rendering using ariadne
//!
//! This module renders compilation diagnostics with source code snippets
//! and the help attached to each diagnostic.

use crate::{Diagnostic, Diagnostics, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<filter>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use flowfilter::{FieldDescriptor, Filter, FilterOptions, render_error};
///
/// let lookup = |_: &str, _: &()| -> Option<FieldDescriptor> { None };
/// let accessor = |_: &FieldDescriptor, _: &(), _: &()| None;
///
/// let source = "port == 80";
/// match Filter::compile(source, FilterOptions::<(), ()>::new(&lookup, &accessor, &())) {
///     Err(e) => render_error(&e),
///     Ok(_) => {}
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
///
/// This is useful when you want to control where the error is written,
/// such as to a file, a buffer, or a custom output stream.
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs, UIs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
///
/// This is the same as `render_error_to_string` but without ANSI color codes,
/// making the output easier to compare in tests.
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation {
            diagnostics,
            source,
        } => render_diagnostics_to_writer(source, diagnostics, writer, use_color),
    }
}

/// Render the diagnostics of a compiled filter, such as the constant filter
/// warning, to stderr.
pub fn render_diagnostics(source: &str, diagnostics: &Diagnostics) {
    render_diagnostics_to_writer(source, diagnostics, &mut std::io::stderr(), true).ok();
}

/// Render every diagnostic of `diagnostics`, warnings included.
fn render_diagnostics_to_writer(
    source: &str,
    diagnostics: &Diagnostics,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        render_diagnostic(source, diag, writer, use_color)?;
    }
    Ok(())
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    // Allocation failures carry no span; anchor them at the start.
    let range = diag.span.as_ref().map(|s| s.0.clone()).unwrap_or(0..0);

    let mut report = Report::build(kind, (SOURCE_ID, range.clone()))
        .with_message(&diag.message)
        .with_code(diag.id)
        .with_config(ariadne::Config::default().with_color(use_color));

    if diag.span.is_some() {
        report = report.with_label(
            Label::new((SOURCE_ID, range))
                .with_message(diag.code.name())
                .with_color(colors.next()),
        );
    }

    // Help text as notes
    for help_msg in &diag.help {
        report = report.with_help(help_msg);
    }

    // Render to the writer (need to reborrow to avoid moving)
    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}
