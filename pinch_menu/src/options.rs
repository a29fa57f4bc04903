//! The closed set of things a menu can offer, and hit testing against them.

use hand_signal::{Point, distance};
use icon_overlay::Sprite;

/// What a menu entry controls once committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Volume,
    Brightness,
}

impl OptionKind {
    pub fn name(self) -> &'static str {
        match self {
            OptionKind::Volume     => "volume",
            OptionKind::Brightness => "brightness",
        }
    }
}

/// One entry on the open menu: its icon sprite, where it sits relative to
/// the menu anchor, and where it was last laid out on screen.
#[derive(Clone, Debug)]
pub struct MenuOption {
    pub kind:   OptionKind,
    pub offset: (i32, i32),
    pub sprite: Sprite,
    anchor:     Option<Point>,
}

impl MenuOption {
    pub fn new(kind: OptionKind, offset: (i32, i32), sprite: Sprite) -> Self {
        MenuOption { kind, offset, sprite, anchor: None }
    }

    /// Screen point the icon is centered on (and hit-tested against).
    pub fn anchor(&self) -> Option<Point> { self.anchor }

    /// Lay the option out around the menu anchor.
    pub fn place(&mut self, menu_anchor: Point) {
        self.anchor = Some(menu_anchor.offset(self.offset.0, self.offset.1));
    }

    pub fn clear(&mut self) {
        self.anchor = None;
        self.sprite.reset();
    }
}

/// First option, in declaration order, whose anchor lies within `radius`
/// of `point`.
///
/// Overlapping radii are resolved by order alone: an earlier option wins
/// even when a later one is nearer.
pub fn hit_test(options: &[MenuOption], point: Point, radius: f32) -> Option<OptionKind> {
    options
        .iter()
        .find(|o| o.anchor.map_or(false, |a| distance(a, point) <= radius))
        .map(|o| o.kind)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
