use super::*;

/// Every char advances 10px.
struct Mono;

impl TextMeasure for Mono {
    fn measure(&mut self, text: &str) -> f32 {
        mono(text)
    }
}

fn mono(text: &str) -> f32 {
    text.chars().count() as f32 * 10.0
}

struct Recording(Vec<String>);

impl TextMeasure for Recording {
    fn measure(&mut self, text: &str) -> f32 {
        self.0.push(text.to_string());
        0.0
    }
}

#[test]
fn short_caption_stays_on_one_line() {
    let lines = wrap_lines("Once upon a time", 1024.0, &mut Mono);
    assert_eq!(lines, vec!["Once upon a time"]);
}

#[test]
fn wraps_when_candidate_exceeds_width() {
    // "aaa bbb" = 70px fits in 75; "aaa bbb ccc" = 110px does not.
    let lines = wrap_lines("aaa bbb ccc ddd", 75.0, &mut Mono);
    assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
}

#[test]
fn exact_fit_is_kept() {
    let lines = wrap_lines("aaa bbb", 70.0, &mut Mono);
    assert_eq!(lines, vec!["aaa bbb"]);
}

#[test]
fn overlong_word_gets_its_own_line() {
    let lines = wrap_lines("a supercalifragilistic b", 50.0, &mut Mono);
    assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
}

#[test]
fn first_word_overflow_does_not_emit_empty_line() {
    let lines = wrap_lines("enormousword tiny", 30.0, &mut Mono);
    assert_eq!(lines, vec!["enormousword", "tiny"]);
}

#[test]
fn blank_caption_has_no_lines() {
    assert!(wrap_lines("   \n ", 100.0, &mut Mono).is_empty());
}

#[test]
fn collapses_runs_of_whitespace() {
    let lines = wrap_lines("  one   two\tthree  ", 1000.0, &mut Mono);
    assert_eq!(lines, vec!["one two three"]);
}

#[test]
fn wrapping_is_idempotent() {
    let text = "Once upon a time, in a sky full of twinkling stars, there was a little \
                star who dreamed of shining the brightest.";
    for width in [60.0, 150.0, 333.0, 1024.0] {
        let first = wrap_lines(text, width, &mut Mono);
        let again_space = wrap_lines(&first.join(" "), width, &mut Mono);
        let again_newline = wrap_lines(&first.join("\n"), width, &mut Mono);
        assert_eq!(first, again_space, "width {width}");
        assert_eq!(first, again_newline, "width {width}");
    }
}

#[test]
fn every_multi_word_line_fits() {
    let text = "Every night, the little star tried its best, but it was always a little \
                dimmer than the others.";
    let max = 200.0;
    for line in wrap_lines(text, max, &mut Mono) {
        if line.contains(' ') {
            assert!(mono(&line) <= max, "{line:?} overflows");
        }
    }
}

#[test]
fn measure_is_consulted_with_candidate_lines() {
    let mut recording = Recording(Vec::new());
    wrap_lines("a b c", 10.0, &mut recording);
    assert_eq!(recording.0, vec!["a b", "a b c"]);
}
