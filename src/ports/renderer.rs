use crate::domain::Report;

/// Turns a finished report into the text written to stdout.
pub trait Renderer: Send + Sync {
    fn render(&self, report: &Report) -> String;
}
