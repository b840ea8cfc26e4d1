use crate::colour::Colour;
use crate::page::SpanFont;
use crate::rect::Rect;
use crate::units::Pt;

/// The drawing surface a text box renders onto. [Page](crate::Page)
/// implements this by buffering spans into its content list; tests use
/// recording fakes.
///
/// The canvas owns a single drawing cursor shared by all layout calls on it.
/// Nested invocations (a table cell laying out its own box, for instance)
/// must save and restore the cursor around the nested call; [CursorGuard]
/// does so on every exit path.
pub trait PageCanvas {
    /// The region of the canvas that content may occupy
    fn content_box(&self) -> Rect;

    /// The current drawing cursor position
    fn cursor(&self) -> (Pt, Pt);

    fn set_cursor(&mut self, at: (Pt, Pt));

    /// Emit one span of glyphs with its baseline origin at `at`. The font
    /// resource is registered at most once per page when the page is written.
    fn draw_glyphs(&mut self, text: &str, at: (Pt, Pt), font: SpanFont, colour: Colour, kerning: bool);
}

/// Saves a canvas's cursor on creation and restores it on drop, so nested
/// layout calls leave the cursor as they found it no matter how they
/// terminate.
pub struct CursorGuard<'a, C: PageCanvas + ?Sized> {
    canvas: &'a mut C,
    saved: (Pt, Pt),
}

impl<'a, C: PageCanvas + ?Sized> CursorGuard<'a, C> {
    pub fn new(canvas: &'a mut C) -> CursorGuard<'a, C> {
        let saved = canvas.cursor();
        CursorGuard { canvas, saved }
    }
}

impl<C: PageCanvas + ?Sized> std::ops::Deref for CursorGuard<'_, C> {
    type Target = C;
    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<C: PageCanvas + ?Sized> std::ops::DerefMut for CursorGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<C: PageCanvas + ?Sized> Drop for CursorGuard<'_, C> {
    fn drop(&mut self) {
        self.canvas.set_cursor(self.saved);
    }
}
