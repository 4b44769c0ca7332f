//! Terminal output for the CLI
//!
//! Styled with `console`, spinners from `indicatif`. Everything falls back
//! to plain lines when stdout is not a terminal or a CI variable is set.
//!
//! # Example
//!
//! ```rust,ignore
//! use sdpcache::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Building relaxation...");
//! // ... do work ...
//! spinner.stop("Relaxation ready");
//!
//! ui::key_value(&ctx, "primal", "-1.25");
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    header, key_value, remark, section, step_info, step_ok, step_ok_detail, step_warn,
    step_warn_hint, values_row,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
