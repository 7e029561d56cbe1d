use owo_colors::{AnsiColors, OwoColorize, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCode {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl ColorCode {
    fn parse(code: char) -> Option<ColorCode> {
        Some(match code {
            '0' => ColorCode::Black,
            '1' => ColorCode::DarkBlue,
            '2' => ColorCode::DarkGreen,
            '3' => ColorCode::DarkAqua,
            '4' => ColorCode::DarkRed,
            '5' => ColorCode::DarkPurple,
            '6' => ColorCode::Gold,
            '7' => ColorCode::Gray,
            '8' => ColorCode::DarkGray,
            '9' => ColorCode::Blue,
            'a' => ColorCode::Green,
            'b' => ColorCode::Aqua,
            'c' => ColorCode::Red,
            'd' => ColorCode::LightPurple,
            'e' => ColorCode::Yellow,
            'f' => ColorCode::White,
            'k' => ColorCode::Obfuscated,
            'l' => ColorCode::Bold,
            'm' => ColorCode::Strikethrough,
            'n' => ColorCode::Underline,
            'o' => ColorCode::Italic,
            'r' => ColorCode::Reset,
            _ => return None,
        })
    }

    fn is_formatting(self) -> bool {
        use ColorCode::*;
        matches!(
            self,
            Obfuscated | Bold | Strikethrough | Underline | Italic | Reset
        )
    }

    /// Closest terminal color, `None` for formatting codes.
    fn ansi(self) -> Option<AnsiColors> {
        use ColorCode::*;
        Some(match self {
            Black => AnsiColors::Black,
            DarkBlue => AnsiColors::Blue,
            DarkGreen => AnsiColors::Green,
            DarkAqua => AnsiColors::Cyan,
            DarkRed => AnsiColors::Red,
            DarkPurple => AnsiColors::Magenta,
            Gold => AnsiColors::Yellow,
            Gray => AnsiColors::White,
            DarkGray => AnsiColors::BrightBlack,
            Blue => AnsiColors::BrightBlue,
            Green => AnsiColors::BrightGreen,
            Aqua => AnsiColors::BrightCyan,
            Red => AnsiColors::BrightRed,
            LightPurple => AnsiColors::BrightMagenta,
            Yellow => AnsiColors::BrightYellow,
            White => AnsiColors::BrightWhite,
            Obfuscated | Bold | Strikethrough | Underline | Italic | Reset => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextColor {
    Hex(String),
    ColorCode(ColorCode),
}

impl TextColor {
    fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}

pub struct TextComponentBuilder {
    component: TextComponent,
}

impl TextComponentBuilder {
    pub fn new(text: String) -> Self {
        let component = TextComponent {
            text,
            ..Default::default()
        };
        Self { component }
    }

    pub fn color_code(mut self, color: ColorCode) -> Self {
        self.component.color = Some(TextColor::ColorCode(color));
        self
    }

    pub fn italic(mut self, val: bool) -> Self {
        self.component.italic = val;
        self
    }

    pub fn finish(self) -> TextComponent {
        self.component
    }
}

/// A styled run of chat text with optional child components.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TextComponent {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
    pub obfuscated: bool,
    pub color: Option<TextColor>,
    pub extra: Vec<TextComponent>,
}

impl TextComponent {
    pub fn builder(text: impl Into<String>) -> TextComponentBuilder {
        TextComponentBuilder::new(text.into())
    }

    pub fn colored(text: impl Into<String>, color: ColorCode) -> TextComponent {
        Self::builder(text).color_code(color).finish()
    }

    /// Parses `&`-prefixed legacy color codes (`&cError: &e/sum`) and `#rrggbb` colors.
    ///
    /// A color code starts a new, otherwise unstyled component. Formatting codes add to
    /// the style of the text that follows them. Unknown codes are kept as text.
    pub fn from_legacy_text(message: &str) -> Vec<TextComponent> {
        let mut components = Vec::new();
        let mut current = TextComponent::default();

        let mut chars = message.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '&' => {
                    let Some(code) = chars.peek().copied().and_then(ColorCode::parse) else {
                        current.text.push(c);
                        continue;
                    };
                    chars.next();
                    if !code.is_formatting() || code == ColorCode::Reset {
                        components.push(std::mem::take(&mut current));
                        if code != ColorCode::Reset {
                            current.color = Some(TextColor::ColorCode(code));
                        }
                        continue;
                    }
                    if !current.text.is_empty() {
                        let style = TextComponent {
                            text: String::new(),
                            ..current.clone()
                        };
                        components.push(std::mem::replace(&mut current, style));
                    }
                    current.apply_formatting(code);
                }
                '#' => {
                    let hex: String = chars.clone().take(6).collect();
                    if hex.len() == 6 && hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
                        chars.nth(5);
                        components.push(std::mem::take(&mut current));
                        current.color = Some(TextColor::Hex(format!("#{hex}")));
                    } else {
                        current.text.push(c);
                    }
                }
                _ => current.text.push(c),
            }
        }
        components.push(current);

        components.retain(|component| !component.text.is_empty());
        components
    }

    fn apply_formatting(&mut self, code: ColorCode) {
        match code {
            ColorCode::Bold => self.bold = true,
            ColorCode::Italic => self.italic = true,
            ColorCode::Underline => self.underlined = true,
            ColorCode::Strikethrough => self.strikethrough = true,
            ColorCode::Obfuscated => self.obfuscated = true,
            _ => {}
        }
    }

    pub fn is_text_only(&self) -> bool {
        !self.bold
            && !self.italic
            && !self.underlined
            && !self.strikethrough
            && !self.obfuscated
            && self.color.is_none()
    }

    /// The text of this component and its children without any styling.
    pub fn to_plain(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.extra {
            out.push_str(&child.to_plain());
        }
        out
    }

    /// The component rendered with ANSI escape sequences for a terminal.
    pub fn to_ansi(&self) -> String {
        let mut out = if self.is_text_only() {
            self.text.clone()
        } else {
            self.text.style(self.ansi_style()).to_string()
        };
        for child in &self.extra {
            out.push_str(&child.to_ansi());
        }
        out
    }

    fn ansi_style(&self) -> Style {
        let mut style = Style::new();
        match &self.color {
            Some(TextColor::ColorCode(code)) => {
                if let Some(color) = code.ansi() {
                    style = style.color(color);
                }
            }
            Some(TextColor::Hex(hex)) => {
                if let Some((r, g, b)) = TextColor::rgb(hex) {
                    style = style.truecolor(r, g, b);
                }
            }
            None => {}
        }
        if self.bold {
            style = style.bold();
        }
        if self.italic {
            style = style.italic();
        }
        if self.underlined {
            style = style.underline();
        }
        if self.strikethrough {
            style = style.strikethrough();
        }
        style
    }
}

/// Renders a sequence of components as one ANSI string.
pub fn to_ansi(components: &[TextComponent]) -> String {
    components.iter().map(TextComponent::to_ansi).collect()
}

/// Renders a sequence of components as unstyled text.
pub fn to_plain(components: &[TextComponent]) -> String {
    components.iter().map(TextComponent::to_plain).collect()
}

impl<S> From<S> for TextComponent
where
    S: Into<String>,
{
    fn from(value: S) -> Self {
        TextComponent {
            text: value.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_colors_split_components() {
        let components = TextComponent::from_legacy_text("&cUsage: &e/sum <a>");
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].text, "Usage: ");
        assert_eq!(
            components[0].color,
            Some(TextColor::ColorCode(ColorCode::Red))
        );
        assert_eq!(components[1].text, "/sum <a>");
        assert_eq!(to_plain(&components), "Usage: /sum <a>");
    }

    #[test]
    fn unknown_code_is_kept_verbatim() {
        let components = TextComponent::from_legacy_text("a&zb");
        assert_eq!(to_plain(&components), "a&zb");
    }

    #[test]
    fn formatting_carries_the_color() {
        let components = TextComponent::from_legacy_text("&6Gold &lbold&r plain");
        assert_eq!(components.len(), 3);
        assert!(!components[0].bold);
        assert!(components[1].bold);
        assert_eq!(components[1].color, Some(TextColor::ColorCode(ColorCode::Gold)));
        assert_eq!(components[2], TextComponent::from(" plain"));
    }

    #[test]
    fn short_hex_is_text() {
        assert_eq!(to_plain(&TextComponent::from_legacy_text("#12 apples")), "#12 apples");
    }

    #[test]
    fn hex_colors() {
        let components = TextComponent::from_legacy_text("#ff8800warm");
        assert_eq!(components[0].color, Some(TextColor::Hex("#ff8800".into())));
        assert_eq!(TextColor::rgb("#ff8800"), Some((255, 136, 0)));
    }

    #[test]
    fn colored_component_renders_plain_text() {
        let component = TextComponent::colored("hi", ColorCode::Gold);
        assert!(!component.is_text_only());
        assert_eq!(component.to_plain(), "hi");
    }

    #[test]
    fn ansi_leaves_plain_text_untouched() {
        let plain = TextComponent::from("plain");
        assert_eq!(plain.to_ansi(), "plain");
        let red = TextComponent::colored("red", ColorCode::Red);
        assert!(red.to_ansi().contains("red"));
        assert_ne!(red.to_ansi(), "red");
    }
}
