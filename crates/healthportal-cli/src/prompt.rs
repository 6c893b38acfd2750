use std::io::{self, Write};

use anyhow::Result;

pub(crate) fn line(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt with a default shown in brackets; empty input takes the default
pub(crate) fn line_or(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => {
            let input = line(&format!("{} [{}]", label, default))?;
            Ok(if input.is_empty() { default.to_string() } else { input })
        }
        None => line(label),
    }
}

pub(crate) fn password(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}

pub(crate) fn otp() -> Result<String> {
    line("Enter the code sent to your email")
}
