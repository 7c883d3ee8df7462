/// Final product of a conversion
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Generated JavaScript text, one statement per line
    pub javascript: String,
    /// Logical lines fed to the translator (sentinel included)
    pub logical_line_count: usize,
    /// Lines of generated output
    pub output_line_count: usize,
}

impl PipelineOutput {
    pub fn new(javascript: String, logical_line_count: usize) -> Self {
        let output_line_count = javascript.lines().count();
        Self {
            javascript,
            logical_line_count,
            output_line_count,
        }
    }
}
