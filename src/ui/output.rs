//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;

/// Bold cyan title line
pub fn header(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        println!("{}", style(title).cyan().bold());
    } else {
        println!("{}", title);
    }
}

/// Display a section header
pub fn section(_ctx: &UiContext, title: &str) {
    println!();
    println!("{}", style(title).bold());
}

/// Display a success step
pub fn step_ok(_ctx: &UiContext, message: &str) {
    println!("  {} {}", style("[OK]").green(), message);
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        println!("  {} {} ({})", style("[OK]").green(), message, style(detail).dim());
    } else {
        println!("  [OK] {} ({})", message, detail);
    }
}

/// Display a warning step
pub fn step_warn(_ctx: &UiContext, message: &str) {
    println!("  {} {}", style("[WARN]").yellow(), message);
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        println!("  {} {} - {}", style("[WARN]").yellow(), message, style(hint).dim());
    } else {
        println!("  [WARN] {} - {}", message, hint);
    }
}

/// Display an info step
pub fn step_info(_ctx: &UiContext, message: &str) {
    println!("  {} {}", style("[INFO]").cyan(), message);
}

/// Display a remark/hint
pub fn remark(_ctx: &UiContext, message: &str) {
    println!("  {}", style(message).dim());
}

/// Print styled key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Print a named row of numbers, comma separated
pub fn values_row(ctx: &UiContext, key: &str, values: &[f64]) {
    let joined = values
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(", ");
    key_value(ctx, key, &joined);
}
