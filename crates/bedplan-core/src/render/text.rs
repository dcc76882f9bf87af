//! Label fitting: how many characters fit in a box, truncation, and
//! greedy word wrap. Lengths are counted in characters, not bytes.

/// Estimates how many characters of text fit in a given pixel width.
pub trait TextMeasure {
    /// Characters that fit in `width_px` at `font_size`; always at least 1.
    fn line_capacity(&self, font_size: u32, width_px: f64) -> usize;
}

/// Treats every glyph as a fixed fraction of the font size wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageGlyphWidth {
    pub ratio: f64,
}

impl Default for AverageGlyphWidth {
    fn default() -> Self {
        Self { ratio: 0.6 }
    }
}

impl TextMeasure for AverageGlyphWidth {
    fn line_capacity(&self, font_size: u32, width_px: f64) -> usize {
        let glyph = f64::from(font_size) * self.ratio;
        let fits = (width_px / glyph).floor();
        if fits.is_finite() && fits >= 1.0 {
            fits as usize
        } else {
            1
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate `text` to `max_chars`, ending in `...` when there is room for
/// it. Budgets of three or fewer are hard-cut.
pub fn fit_text(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if char_len(text) <= max_chars {
        return text.to_owned();
    }
    if max_chars <= 3 {
        return take_chars(text, max_chars).to_owned();
    }
    format!("{}...", take_chars(text, max_chars - 3))
}

/// Greedily pack whitespace-separated words into at most `max_lines` lines
/// of `max_chars`. When words are dropped, the last line is truncated.
///
/// A single word longer than `max_chars` is kept whole on its own line.
pub fn wrap_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_chars == 0 || max_lines == 0 {
        return Vec::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![fit_text(text, max_chars)];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in &words {
        let candidate_len = if current.is_empty() {
            char_len(word)
        } else {
            char_len(&current) + 1 + char_len(word)
        };
        if candidate_len <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = (*word).to_owned();
        }
        if lines.len() >= max_lines {
            break;
        }
    }
    if lines.len() < max_lines && !current.is_empty() {
        lines.push(current);
    }
    lines.truncate(max_lines);

    if lines.len() == max_lines && words.join(" ") != lines.join(" ") {
        if let Some(last) = lines.last_mut() {
            *last = fit_text(last, max_chars);
        }
    }
    lines
}

/// Crop name over variety name, each on one line sized to the run.
pub fn build_crop_label_lines(
    crop: &str,
    variety: &str,
    width_px: f64,
    font_size: u32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let max_chars = measure.line_capacity(font_size, width_px);
    let one_line = |text: &str| {
        let line = wrap_text(text, max_chars, 1).into_iter().next().unwrap_or_default();
        if char_len(&line) > max_chars {
            fit_text(&line, max_chars)
        } else {
            line
        }
    };
    vec![one_line(crop), one_line(variety)]
}

/// A `!` marker followed by conflict descriptions, never more than
/// `max_lines` lines in total. When descriptions do not fit, the last line
/// becomes `+N more` counting the ones left out.
pub fn build_conflict_label_lines(
    details: &[&str],
    width_px: f64,
    font_size: u32,
    max_lines: usize,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let max_chars = measure.line_capacity(font_size, width_px);
    let available = max_lines.saturating_sub(1);
    let mut lines = vec!["!".to_owned()];
    if details.len() <= available {
        lines.extend(details.iter().map(|d| fit_text(d, max_chars)));
    } else if available > 0 {
        let shown = available - 1;
        lines.extend(details[..shown].iter().map(|d| fit_text(d, max_chars)));
        lines.push(format!("+{} more", details.len() - shown));
    }
    lines
}
