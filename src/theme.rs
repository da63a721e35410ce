use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
  /// Marker color for favorites and featured channels.
  pub favorite: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Andes",
    bg: Color::Rgb(24, 26, 31),
    fg: Color::Rgb(220, 223, 228),
    accent: Color::Rgb(229, 192, 123),
    muted: Color::Rgb(120, 126, 138),
    border: Color::Rgb(62, 68, 81),
    highlight_fg: Color::Rgb(24, 26, 31),
    highlight_bg: Color::Rgb(229, 192, 123),
    stripe_bg: Color::Rgb(30, 33, 39),
    status: Color::Rgb(152, 195, 121),
    error: Color::Rgb(224, 108, 117),
    key_fg: Color::Rgb(24, 26, 31),
    key_bg: Color::Rgb(120, 126, 138),
    favorite: Color::Rgb(224, 108, 117),
  },
  Theme {
    name: "Pacífico",
    bg: Color::Rgb(15, 27, 38),
    fg: Color::Rgb(208, 226, 240),
    accent: Color::Rgb(94, 200, 229),
    muted: Color::Rgb(103, 134, 158),
    border: Color::Rgb(40, 66, 88),
    highlight_fg: Color::Rgb(15, 27, 38),
    highlight_bg: Color::Rgb(94, 200, 229),
    stripe_bg: Color::Rgb(20, 35, 48),
    status: Color::Rgb(126, 214, 166),
    error: Color::Rgb(240, 113, 120),
    key_fg: Color::Rgb(15, 27, 38),
    key_bg: Color::Rgb(103, 134, 158),
    favorite: Color::Rgb(255, 143, 163),
  },
  Theme {
    name: "Papel",
    bg: Color::Rgb(246, 243, 236),
    fg: Color::Rgb(46, 44, 41),
    accent: Color::Rgb(181, 82, 51),
    muted: Color::Rgb(140, 134, 124),
    border: Color::Rgb(204, 198, 186),
    highlight_fg: Color::Rgb(246, 243, 236),
    highlight_bg: Color::Rgb(181, 82, 51),
    stripe_bg: Color::Rgb(238, 234, 225),
    status: Color::Rgb(74, 124, 89),
    error: Color::Rgb(178, 34, 52),
    key_fg: Color::Rgb(246, 243, 236),
    key_bg: Color::Rgb(140, 134, 124),
    favorite: Color::Rgb(178, 34, 52),
  },
];
