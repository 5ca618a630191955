use anyhow::{Result, bail};
use hela_finance::store::validate_user;
use std::io::{self, BufRead, Write};

use crate::config::{config_path, load_config, save_config};
use crate::state::{Profile, profile_path, read_profile, write_profile};

/// Read one answer; an empty line keeps `default`. Closed input is an error.
fn prompt(input: &mut impl BufRead, label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        print!("{label}: ");
    } else {
        print!("{label} [{default}]: ");
    }
    io::stdout().flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        bail!("input closed before setup finished");
    }
    let s = s.trim();
    Ok(if s.is_empty() { default.to_string() } else { s.to_string() })
}

/// Ask again until `check` accepts the answer
fn prompt_valid(
    input: &mut impl BufRead,
    label: &str,
    default: &str,
    check: impl Fn(&str) -> Result<()>,
) -> Result<String> {
    loop {
        let answer = prompt(input, label, default)?;
        match check(&answer) {
            Ok(()) => return Ok(answer),
            Err(e) => println!("  {e}"),
        }
    }
}

pub fn run_setup() -> Result<()> {
    println!("Hela setup\n");
    let mut cfg = load_config()?;
    let existing = read_profile()?;
    let mut input = io::stdin().lock();

    let user_id = prompt_valid(&mut input, "User id (letters, digits, - or _)", &cfg.user.id, |s| {
        validate_user(s)?;
        Ok(())
    })?;
    let display_name = prompt(&mut input, "Your name (optional)", &cfg.user.display_name)?;
    let timezone = prompt_valid(&mut input, "Timezone", &cfg.display.timezone, |s| {
        hela_core::time::today_in(s).map(|_| ())
    })?;
    let currency = prompt(&mut input, "Currency", &cfg.display.currency)?;

    cfg.user.id = user_id.clone();
    cfg.user.display_name = display_name.clone();
    cfg.display.timezone = timezone.clone();
    cfg.display.currency = currency;
    save_config(&cfg)?;

    let created_at_utc = existing
        .and_then(|p| p.created_at_utc)
        .or_else(|| Some(chrono::Utc::now().to_rfc3339()));
    let profile = Profile {
        created_at_utc,
        user_id,
        display_name,
        timezone,
    };
    write_profile(&profile)?;

    println!("\nWrote:");
    println!("- {}", config_path()?.display());
    println!("- {}", profile_path()?.display());

    println!("\nNext steps:");
    println!("- hela sms import \"<paste an M-Pesa confirmation>\"");
    println!("- hela budget set --category food --limit 8000");
    println!("- hela dashboard --tui");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_invalid(_: &str) -> Result<()> {
        bail!("not accepted")
    }

    #[test]
    fn test_closed_input_stops_retry_loop() {
        let mut input: &[u8] = b"";
        let err = prompt_valid(&mut input, "Timezone", "Mars/Olympus", always_invalid).unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn test_blank_line_keeps_default_and_retries() {
        let mut input: &[u8] = b"\nbad user\namina\n";
        let answer = prompt(&mut input, "Name", "Amina").unwrap();
        assert_eq!(answer, "Amina");

        let answer = prompt_valid(&mut input, "User id", "", |s| {
            validate_user(s)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(answer, "amina");
    }
}
