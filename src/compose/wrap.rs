/// Pixel-width measurement of a single line of text.
pub trait TextMeasure {
    /// Advance width of `text` laid out on one line, in pixels.
    fn measure(&mut self, text: &str) -> f32;
}

/// Greedy word wrap bounded by `max_width_px`.
///
/// Words are appended to the current line while the measured width of the candidate line stays
/// within `max_width_px`. On overflow the current line is committed and the overflowing word
/// starts the next one. A word that is wider than the limit on its own still gets a line of its
/// own; words are never split. Lines never carry leading or trailing whitespace, and a blank
/// caption yields no lines.
///
/// Any whitespace (including newlines) separates words, so wrapping the joined output again
/// reproduces the same lines.
pub fn wrap_lines(text: &str, max_width_px: f32, measure: &mut impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{line} {word}");
        if measure.measure(&candidate) > max_width_px {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/compose/wrap.rs"]
mod tests;
