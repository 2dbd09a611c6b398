use colored::Colorize;

pub struct Theme {
    pub title: fn(&str) -> String,
    pub label: fn(&str) -> String,
    pub value: fn(&str) -> String,
    pub line: fn(&str) -> String,
    pub idx: fn(&str) -> String,
    pub muted: fn(&str) -> String,
    pub warn: fn(&str) -> String,
    pub error: fn(&str) -> String,
    accent: (u8, u8, u8),
}

const DEFAULT_ACCENT: (u8, u8, u8) = (0x30, 0xB2, 0x7C);

impl Theme {
    /// Theme for a mode name (`dark`/`light`) and an accent color in `#RRGGBB`.
    pub fn from_settings(mode: &str, accent_color: &str) -> Self {
        let mut theme = match mode {
            "dark" | "" => Self::dark(),
            "light" => Self::light(),
            _ => {
                eprintln!("{}", format!("✘ Unknown theme: {}", mode).red());
                Self::dark() // Fallback to default
            }
        };
        theme.accent = parse_hex_color(accent_color).unwrap_or(DEFAULT_ACCENT);
        theme
    }

    pub fn accent(&self, s: &str) -> String {
        let (r, g, b) = self.accent;
        s.truecolor(r, g, b).bold().to_string()
    }

    fn dark() -> Self {
        Self {
            title: |s| s.bright_white().bold().underline().to_string(),
            label: |s| s.bright_black().to_string(),
            value: |s| s.white().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.bright_white().to_string(),
            muted: |s| s.bright_black().italic().to_string(),
            warn: |s| s.yellow().to_string(),
            error: |s| s.red().to_string(),
            accent: DEFAULT_ACCENT,
        }
    }

    fn light() -> Self {
        Self {
            title: |s| s.black().bold().underline().to_string(),
            label: |s| s.bright_black().to_string(),
            value: |s| s.black().to_string(),
            line: |s| s.bright_black().dimmed().to_string(),
            idx: |s| s.blue().to_string(),
            muted: |s| s.bright_black().italic().to_string(),
            warn: |s| s.yellow().bold().to_string(),
            error: |s| s.red().bold().to_string(),
            accent: DEFAULT_ACCENT,
        }
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
