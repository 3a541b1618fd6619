use std::io::Write;

/// Trait for abstracting terminal input, enabling testable prompts.
pub trait PromptInput {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize>;
}

/// Real stdin implementation of PromptInput.
pub struct StdinInput;

impl PromptInput for StdinInput {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize> {
        std::io::stdin().read_line(buf)
    }
}

/// Ask for y/n confirmation, writing the question to `out` and reading the
/// answer from `input`. Returns true only for "y" or "yes" (any case).
/// Closed input or a read error counts as a decline.
pub fn confirm(message: &str, input: &mut dyn PromptInput, out: &mut dyn Write) -> bool {
    if write!(out, "{} [y/N] ", message).is_err() {
        return false;
    }
    out.flush().ok();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => return false,
        Ok(_) => {}
    }

    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
