//! Confirmation prompt with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{SdpError, SdpResult};
use console::{style, Term};

/// Ask a yes/no question. Returns `default` when not interactive,
/// `true` when --yes was given.
pub fn confirm(ctx: &UiContext, message: &str, default: bool) -> SdpResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let choices = if default { "[Y/n]" } else { "[y/N]" };
    let term = Term::stdout();
    term.write_str(&format!("{} {} ", style(message).bold(), style(choices).dim()))
        .map_err(|e| SdpError::io("writing prompt", e))?;
    let answer = term
        .read_line()
        .map_err(|e| SdpError::io("reading answer", e))?;

    Ok(parse_answer(&answer).unwrap_or(default))
}

fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_returns_default() {
        let ctx = UiContext::non_interactive();
        assert!(!confirm(&ctx, "Remove?", false).unwrap());
        assert!(confirm(&ctx, "Remove?", true).unwrap());
    }

    #[test]
    fn auto_yes_approves() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Remove?", false).unwrap());
    }

    #[test]
    fn answers_parse() {
        assert_eq!(parse_answer(" Yes\n"), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer(""), None);
    }
}
