//! Terminal prompts for the one-shot commands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Outcome of feeding one key to a secret prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SecretStep {
    Continue,
    Done,
    Cancelled,
}

/// Applies `key` to `buffer`.
fn apply_secret_key(buffer: &mut String, key: KeyEvent) -> SecretStep {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => SecretStep::Cancelled,
        (_, KeyCode::Enter) => SecretStep::Done,
        (_, KeyCode::Backspace) => {
            buffer.pop();
            SecretStep::Continue
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            buffer.push(c);
            SecretStep::Continue
        }
        _ => SecretStep::Continue,
    }
}

#[cfg(not(test))]
struct RawModeGuard;

#[cfg(not(test))]
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

/// Reads a line without echoing it, printing `*` per character.
#[cfg(not(test))]
pub fn read_secret(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;

    use crossterm::event::{Event, KeyEventKind, read};

    print!("{prompt}");
    std::io::stdout().flush()?;
    crossterm::terminal::enable_raw_mode()?;
    let guard = RawModeGuard;

    let mut buffer = String::new();
    let step = loop {
        if let Event::Key(key) = read()?
            && key.kind == KeyEventKind::Press
        {
            let before = buffer.chars().count();
            let step = apply_secret_key(&mut buffer, key);
            let after = buffer.chars().count();
            if after > before {
                print!("*");
            } else if after < before {
                print!("\x08 \x08");
            }
            std::io::stdout().flush()?;
            if step != SecretStep::Continue {
                break step;
            }
        }
    };
    drop(guard);
    println!();
    match step {
        SecretStep::Cancelled => anyhow::bail!("Cancelled"),
        _ => Ok(buffer),
    }
}

/// Reads one trimmed line from stdin.
#[cfg(not(test))]
pub fn read_line(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;

    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
