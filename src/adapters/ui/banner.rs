//! Startup banner: "AS EXPENSES" in figlet letters with a yellow-to-amber gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

const TITLE: &str = "AS EXPENSES";

/// Brand yellow (#facc15).
const YELLOW: (u8, u8, u8) = (0xfa, 0xcc, 0x15);
/// Amber (#f59e0b).
const AMBER: (u8, u8, u8) = (0xf5, 0x9e, 0x0b);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Figlet art for the title, or the plain title if the font cannot render it.
fn render_title() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(TITLE).map(|figure| figure.to_string()))
        .unwrap_or_else(|| format!("{}\n", TITLE))
}

/// Prints the welcome banner followed by the version and tagline.
pub fn print_welcome() {
    let mut out = stdout();
    let art = render_title();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(YELLOW, AMBER, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::DarkGrey));
    let _ = out.execute(Print(format!("v{}  Daily Expenses\r\n\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_rgb(YELLOW, AMBER, 0.0), YELLOW);
        assert_eq!(lerp_rgb(YELLOW, AMBER, 1.0), AMBER);
    }

    #[test]
    fn test_render_title_not_empty() {
        assert!(!render_title().trim().is_empty());
    }
}
