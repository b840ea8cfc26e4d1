//! End-to-end layout behaviour through the public API, using a fixed-pitch
//! metrics fake (0.6 em glyphs, 0.75 em ascender, one-em line height) so
//! every coordinate can be computed by hand.

use pdf_flow::text::{
    plain_text, Align, BoxOptions, CursorGuard, FontKey, FontStyle, MetricsProvider, Overflow,
    PageCanvas, Run, TextBox, VAlign,
};
use pdf_flow::{Colour, FlowError, Pt, Rect, SpanFont};

struct FixedMetrics {
    /// Advance delta applied to every A→V pair, Pt(0.0) for no kerning
    av_kern: Pt,
}

impl FixedMetrics {
    fn new() -> FixedMetrics {
        FixedMetrics { av_kern: Pt(0.0) }
    }

    fn with_av_kern(delta: Pt) -> FixedMetrics {
        FixedMetrics { av_kern: delta }
    }
}

impl MetricsProvider for FixedMetrics {
    fn resolve(&self, family: &str, style: FontStyle) -> Result<FontKey, FlowError> {
        if family == "Helvetica" {
            Ok(FontKey(match style {
                FontStyle::Regular => 0,
                FontStyle::Bold => 1,
                FontStyle::Italic => 2,
                FontStyle::BoldItalic => 3,
            }))
        } else {
            Err(FlowError::UnknownFont {
                family: family.to_string(),
                style,
            })
        }
    }

    fn width_of(&self, _font: FontKey, size: Pt, text: &str) -> Result<Pt, FlowError> {
        let glyphs = text.chars().filter(|c| *c != '\n').count();
        Ok(size * 0.6 * glyphs as f32)
    }

    fn kerning_pairs(&self, _font: FontKey, _size: Pt, text: &str) -> Vec<(usize, Pt)> {
        if self.av_kern == Pt(0.0) {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        chars
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] == 'A' && pair[1] == 'V')
            .map(|(i, _)| (i + 1, self.av_kern))
            .collect()
    }

    fn ascender(&self, _font: FontKey, size: Pt) -> Pt {
        size * 0.75
    }

    fn descender(&self, _font: FontKey, size: Pt) -> Pt {
        size * -0.25
    }

    fn line_height(&self, _font: FontKey, size: Pt) -> Pt {
        size
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DrawnSpan {
    text: String,
    at: (Pt, Pt),
    font: SpanFont,
    colour: Colour,
}

struct RecordingCanvas {
    content_box: Rect,
    cursor: (Pt, Pt),
    spans: Vec<DrawnSpan>,
}

impl RecordingCanvas {
    fn new(width: f32, height: f32) -> RecordingCanvas {
        RecordingCanvas {
            content_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: Pt(width),
                y2: Pt(height),
            },
            cursor: (Pt(0.0), Pt(height)),
            spans: Vec::new(),
        }
    }
}

impl PageCanvas for RecordingCanvas {
    fn content_box(&self) -> Rect {
        self.content_box
    }

    fn cursor(&self) -> (Pt, Pt) {
        self.cursor
    }

    fn set_cursor(&mut self, at: (Pt, Pt)) {
        self.cursor = at;
    }

    fn draw_glyphs(&mut self, text: &str, at: (Pt, Pt), font: SpanFont, colour: Colour, _kerning: bool) {
        self.spans.push(DrawnSpan {
            text: text.to_string(),
            at,
            font,
            colour,
        });
    }
}

fn options(width: f32, height: f32) -> BoxOptions {
    BoxOptions {
        at: Some((Pt(0.0), Pt(height))),
        width: Some(Pt(width)),
        height: Some(Pt(height)),
        ..BoxOptions::default()
    }
}

#[test]
fn wraps_lines_at_spaces() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(220.0, 400.0);
    let mut tb = TextBox::new(
        vec![Run::new(
            "Please wrap this text about HERE. More text that should be wrapped",
        )],
        options(220.0, 400.0),
    );
    let leftover = tb.render(&metrics, &mut canvas).unwrap();
    assert!(leftover.is_empty());
    assert_eq!(
        tb.text(),
        "Please wrap this text about\nHERE. More text that should be\nwrapped"
    );
    // one span per line, each starting at the left edge
    assert_eq!(canvas.spans.len(), 3);
    assert!(canvas.spans.iter().all(|s| s.at.0 == Pt(0.0)));
    // baselines: -9, -21, -33 from the top at 400
    assert_eq!(canvas.spans[0].at.1, Pt(391.0));
    assert_eq!(canvas.spans[1].at.1, Pt(379.0));
    assert_eq!(canvas.spans[2].at.1, Pt(367.0));
}

#[test]
fn oversized_token_occupies_a_single_line() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(180.0, 400.0);
    let mut tb = TextBox::new(
        vec![Run::new("You_can_wrap_this_text_HERE")],
        options(180.0, 400.0),
    );
    let leftover = tb.render(&metrics, &mut canvas).unwrap();
    assert!(leftover.is_empty());
    assert_eq!(tb.line_count(), 1);
    assert_eq!(tb.text(), "You_can_wrap_this_text_HERE");
}

#[test]
fn explicit_newlines_make_blank_lines() {
    let metrics = FixedMetrics::new();
    let mut tb = TextBox::new(
        vec![Run::new("Please wrap only before THIS\n\nword. Don't wrap this")],
        options(200.0, 400.0),
    );
    tb.dry_run(&metrics).unwrap();
    assert_eq!(
        tb.text(),
        "Please wrap only before\nTHIS\n\nword. Don't wrap this"
    );
    assert_eq!(tb.height(), Pt(48.0));
}

#[test]
fn truncated_text_flows_into_a_second_box() {
    let metrics = FixedMetrics::new();
    let input = "one two three four five six seven";
    let mut first = TextBox::new(vec![Run::new(input)], options(60.0, 27.0));
    let leftover = first.dry_run(&metrics).unwrap();
    assert!(!leftover.is_empty());

    // two 12pt lines consume 24pt of the 27pt budget; a third would burst it
    assert!(first.height() <= Pt(27.0));
    assert!(first.height() > Pt(27.0) - Pt(12.0));

    // nothing lost at the truncation boundary
    let rebuilt = format!("{} {}", first.text().replace('\n', " "), plain_text(&leftover));
    assert_eq!(rebuilt, input);

    // the remainder lays out cleanly in a taller box
    let mut second = TextBox::new(leftover, options(60.0, 200.0));
    let rest = second.dry_run(&metrics).unwrap();
    assert!(rest.is_empty());
    assert_eq!(second.text(), "four\nfive six\nseven");
}

#[test]
fn expand_grows_past_the_height_budget() {
    let metrics = FixedMetrics::new();
    let mut tb = TextBox::new(
        vec![Run::new("one two three four five six seven")],
        BoxOptions {
            overflow: Overflow::Expand,
            ..options(60.0, 20.0)
        },
    );
    let leftover = tb.dry_run(&metrics).unwrap();
    assert!(leftover.is_empty());
    assert!(tb.height() > Pt(20.0));
}

#[test]
fn ellipses_appear_on_the_last_visible_line() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(60.0, 27.0);
    let mut tb = TextBox::new(
        vec![Run::new("one two three four five six seven")],
        BoxOptions {
            overflow: Overflow::Ellipses,
            ..options(60.0, 27.0)
        },
    );
    tb.render(&metrics, &mut canvas).unwrap();
    let last = canvas.spans.last().unwrap();
    assert!(last.text.ends_with("..."), "got {:?}", last.text);
    // the amended line still fits: 60pt / 7.2pt per glyph
    assert!(last.text.chars().count() as f32 * 7.2 <= 60.0 + 0.01);
    // and the box itself stays within its height budget
    assert!(tb.height() <= Pt(27.0));
    assert!(tb.height() > Pt(27.0) - Pt(12.0));
}

#[test]
fn ellipsis_trims_mixed_size_runs_with_their_own_metrics() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(60.0, 30.0);
    let mut big = Run::new("BB");
    big.size = Some(Pt(24.0));
    let mut tb = TextBox::new(
        vec![Run::new("aaaa"), big, Run::new(" spill over the bottom")],
        BoxOptions {
            overflow: Overflow::Ellipses,
            ..options(60.0, 30.0)
        },
    );
    tb.render(&metrics, &mut canvas).unwrap();
    // the 24pt "BB" run trims away at 14.4pt per glyph; once the dots attach
    // to the 12pt run instead, "aaaa" plus dots is 50.4pt and fits whole
    assert_eq!(tb.text(), "aaaa...");
    assert_eq!(canvas.spans.len(), 1);
    assert_eq!(canvas.spans[0].text, "aaaa...");
    assert!(tb.height() <= Pt(30.0));
}

#[test]
fn shrink_to_fit_settles_between_floor_and_base() {
    let metrics = FixedMetrics::new();
    let mut tb = TextBox::new(
        vec![Run::new(
            "this will need to get smaller to fit in such a cramped space",
        )],
        BoxOptions {
            overflow: Overflow::ShrinkToFit,
            min_font_size: Pt(5.0),
            ..options(100.0, 40.0)
        },
    );
    let leftover = tb.dry_run(&metrics).unwrap();
    assert!(leftover.is_empty());
    assert!(tb.font_size() < Pt(12.0));
    assert!(tb.font_size() >= Pt(5.0));
}

#[test]
fn shrink_to_fit_stops_at_the_floor_when_text_still_overflows() {
    let metrics = FixedMetrics::new();
    let long: String = std::iter::repeat("word ").take(200).collect();
    let mut tb = TextBox::new(
        vec![Run::new(long)],
        BoxOptions {
            overflow: Overflow::ShrinkToFit,
            min_font_size: Pt(5.0),
            ..options(50.0, 20.0)
        },
    );
    let leftover = tb.dry_run(&metrics).unwrap();
    assert!(!leftover.is_empty());
    assert_eq!(tb.font_size(), Pt(5.0));
}

#[test]
fn centered_lines_split_the_slack_evenly() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(100.0, 100.0);
    let mut tb = TextBox::new(
        vec![Run::new("tiny")],
        BoxOptions {
            align: Align::Center,
            ..options(100.0, 100.0)
        },
    );
    tb.render(&metrics, &mut canvas).unwrap();
    // 4 glyphs at 7.2pt = 28.8pt wide, centred in 100pt
    let x = canvas.spans[0].at.0;
    assert!((x.0 - 35.6).abs() < 0.01, "got {x}");
}

#[test]
fn right_aligned_lines_end_at_the_right_edge() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(100.0, 100.0);
    let mut tb = TextBox::new(
        vec![Run::new("tiny")],
        BoxOptions {
            align: Align::Right,
            ..options(100.0, 100.0)
        },
    );
    tb.render(&metrics, &mut canvas).unwrap();
    let x = canvas.spans[0].at.0;
    assert!((x.0 - 71.2).abs() < 0.01, "got {x}");
}

#[test]
fn bottom_valign_pushes_text_to_the_box_floor() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(100.0, 100.0);
    let mut tb = TextBox::new(
        vec![Run::new("tiny")],
        BoxOptions {
            valign: VAlign::Bottom,
            ..options(100.0, 100.0)
        },
    );
    tb.render(&metrics, &mut canvas).unwrap();
    // one 12pt line shifted down by the 88pt of slack: baseline at
    // 100 - 9 - 88 = 3
    assert_eq!(canvas.spans[0].at.1, Pt(3.0));
}

#[test]
fn render_leaves_the_cursor_below_the_text() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(200.0, 400.0);
    let mut tb = TextBox::new(vec![Run::new("a few words here")], options(200.0, 400.0));
    tb.render(&metrics, &mut canvas).unwrap();
    assert_eq!(canvas.cursor(), (Pt(0.0), Pt(400.0) - tb.height()));
}

#[test]
fn geometry_defaults_derive_from_the_canvas() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(220.0, 400.0);
    canvas.set_cursor((Pt(10.0), Pt(390.0)));
    let mut tb = TextBox::new(
        vec![Run::new("defaults from the cursor")],
        BoxOptions::default(),
    );
    tb.render(&metrics, &mut canvas).unwrap();
    assert_eq!(canvas.spans[0].at.0, Pt(10.0));
    assert_eq!(canvas.spans[0].at.1, Pt(381.0));
}

#[test]
fn cursor_guard_restores_on_exit() {
    let mut canvas = RecordingCanvas::new(100.0, 100.0);
    canvas.set_cursor((Pt(7.0), Pt(70.0)));
    {
        let mut guard = CursorGuard::new(&mut canvas);
        guard.set_cursor((Pt(50.0), Pt(5.0)));
        assert_eq!(guard.cursor(), (Pt(50.0), Pt(5.0)));
    }
    assert_eq!(canvas.cursor(), (Pt(7.0), Pt(70.0)));
}

#[test]
fn markup_styles_resolve_to_styled_fonts() {
    let metrics = FixedMetrics::new();
    let mut canvas = RecordingCanvas::new(300.0, 100.0);
    let mut tb = TextBox::from_markup(
        "plain <b>bold</b> <i>italic</i> <color rgb=\"ff0000\">red</color>",
        options(300.0, 100.0),
    );
    tb.render(&metrics, &mut canvas).unwrap();
    let by_text = |t: &str| canvas.spans.iter().find(|s| s.text.trim() == t).unwrap();
    assert_eq!(by_text("plain").font.key, FontKey(0));
    assert_eq!(by_text("bold").font.key, FontKey(1));
    assert_eq!(by_text("italic").font.key, FontKey(2));
    assert_eq!(by_text("red").colour, Colour::new_rgb(1.0, 0.0, 0.0));
}

#[test]
fn per_run_sizes_grow_the_line() {
    let metrics = FixedMetrics::new();
    let mut big = Run::new("big");
    big.size = Some(Pt(24.0));
    let mut tb = TextBox::new(
        vec![Run::new("small "), big],
        options(300.0, 100.0),
    );
    tb.dry_run(&metrics).unwrap();
    // the 24pt run sets the line's height
    assert_eq!(tb.height(), Pt(24.0));
}

#[test]
fn unknown_fonts_fail_loudly() {
    let metrics = FixedMetrics::new();
    let mut tb = TextBox::new(
        vec![Run::new("x")],
        BoxOptions {
            font_family: "Comic Sans".to_string(),
            ..options(100.0, 100.0)
        },
    );
    assert!(matches!(
        tb.dry_run(&metrics),
        Err(FlowError::UnknownFont { family, .. }) if family == "Comic Sans"
    ));
}

#[test]
fn kerning_tightens_measurement_enough_to_change_wrapping() {
    // "AV AV AV" is 57.6pt unkerned; three -2pt pairs bring it to 51.6pt
    let text = "AV AV AV";
    let mut kerned = TextBox::new(vec![Run::new(text)], options(55.0, 100.0));
    kerned.dry_run(&FixedMetrics::with_av_kern(Pt(-2.0))).unwrap();
    assert_eq!(kerned.line_count(), 1);

    let mut unkerned = TextBox::new(vec![Run::new(text)], options(55.0, 100.0));
    unkerned.dry_run(&FixedMetrics::new()).unwrap();
    assert_eq!(unkerned.line_count(), 2);
}
