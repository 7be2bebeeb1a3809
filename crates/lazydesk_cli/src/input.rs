//! Line-oriented stdin prompts.
//!
//! Every prompt returns `None` on end of input so callers can unwind
//! cleanly when stdin closes.

use std::io::{self, BufRead, Write};

/// Prints `label` and reads one trimmed line.
pub fn prompt(label: &str) -> Option<String> {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Like [`prompt`], substituting `default` for an empty answer.
pub fn prompt_or(label: &str, default: &str) -> Option<String> {
    prompt(label).map(|value| {
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    })
}

/// Parsed answer, or `Err(raw)` when the text is not a valid `T`.
pub fn prompt_parse<T: std::str::FromStr>(label: &str, default: &str) -> Option<Result<T, String>> {
    prompt_or(label, default).map(|raw| raw.parse::<T>().map_err(|_| raw))
}

/// Optional free text; blank becomes `None`.
pub fn prompt_optional(label: &str) -> Option<Option<String>> {
    prompt(label).map(|value| if value.is_empty() { None } else { Some(value) })
}

pub fn invalid_input(raw: &str) {
    println!("Invalid input `{raw}`. Please try again.");
}
