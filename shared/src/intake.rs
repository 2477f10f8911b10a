//! Turning raw user input into signals worth classifying.

/// Lines this short or shorter are treated as noise.
pub const MIN_SIGNAL_CHARS: usize = 5;

/// Maximum number of lines taken from an uploaded file.
pub const MAX_UPLOAD_SIGNALS: usize = 10;

fn is_signal(line: &str) -> bool {
    line.trim().chars().count() > MIN_SIGNAL_CHARS
}

/// Split a manual submission into one signal per meaningful line.
///
/// Lines are kept as typed. When no line is long enough the whole input is
/// sent as a single signal; blank input yields nothing.
pub fn manual_signals(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }

    let lines: Vec<String> = input
        .split('\n')
        .filter(|line| is_signal(line))
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        vec![input.to_string()]
    } else {
        lines
    }
}

/// Trimmed, meaningful lines of an uploaded text file, capped at
/// [`MAX_UPLOAD_SIGNALS`].
pub fn upload_signals(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| is_signal(line))
        .take(MAX_UPLOAD_SIGNALS)
        .map(str::to_string)
        .collect()
}
