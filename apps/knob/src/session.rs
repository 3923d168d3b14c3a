use std::io::Write;

use anyhow::Result;
use sequence::SequenceController;
use tracing::warn;

use crate::{input::InputItem, render::Renderer};

pub fn run_session<W: Write>(
    seq: &mut SequenceController,
    items: impl IntoIterator<Item = InputItem>,
    out: &mut Renderer<W>,
) -> Result<()> {
    out.prompt(seq)?;
    out.flush()?;

    let mut summary_shown = false;
    for item in items {
        summary_shown |= handle(seq, item, out)?;
        out.flush()?;
    }

    match seq.compose_result() {
        Ok(result) if !summary_shown => out.result(&result)?,
        Ok(_) => {}
        Err(err) => {
            warn!(error = %err, "input ended before the sequence finished");
            out.error(err)?;
        }
    }
    out.flush()
}

// Returns true when the item displayed the composed result.
fn handle<W: Write>(
    seq: &mut SequenceController,
    item: InputItem,
    out: &mut Renderer<W>,
) -> Result<bool> {
    let action = match item {
        Ok(action) => action,
        Err(err) => {
            warn!(token = %err.0, "skipping unknown knob action");
            out.rejected(&err)?;
            return Ok(false);
        }
    };

    let before = seq.current_index();
    match seq.apply(action) {
        Some(outcome) => {
            out.outcome(&outcome)?;
            if seq.current_index() != before {
                out.prompt(seq)?;
            }
            Ok(outcome.summary().is_some())
        }
        None if seq.is_finished() => {
            out.ignored(action)?;
            Ok(false)
        }
        None => {
            out.prompt(seq)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sequence::clock::{clock_sequence, ClockOptions};
    use shared::protocol::parse_script;

    fn clock() -> SequenceController {
        clock_sequence(&ClockOptions {
            today: NaiveDate::from_ymd_opt(2024, 6, 15).expect("date"),
            start_year: None,
            year_span: 6,
        })
        .expect("clock")
    }

    fn run(script: &str, json: bool) -> String {
        let mut seq = clock();
        let mut buf = Vec::new();
        let mut out = Renderer::new(json, &mut buf);
        run_session(&mut seq, parse_script(script), &mut out).expect("session");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn unknown_token_is_reported_and_skipped() {
        let text = run("r wiggle push", false);
        assert!(text.contains("Ignored: unknown knob action 'wiggle'"));
        assert!(text.contains("Year set to 2025"));
        assert!(text.contains("Please set the month..."));
    }

    #[test]
    fn terminal_result_is_shown_once() {
        let text = run("push push push push", false);
        assert_eq!(text.matches("Date set to: 2024-06-15").count(), 1);
        assert!(!text.contains("Error"));
    }

    #[test]
    fn result_is_shown_at_end_of_input_when_not_pushed() {
        let text = run("push push push", false);
        assert_eq!(text.matches("Date set to: 2024-06-15").count(), 1);
    }

    #[test]
    fn early_end_of_input_reports_invalid_state() {
        let text = run("push", false);
        let last = text.lines().last().expect("output");
        assert!(last.starts_with("Error: invalid state:"), "got {last}");

        let json = run("push", true);
        let last: serde_json::Value =
            serde_json::from_str(json.lines().last().expect("output")).expect("json line");
        assert_eq!(last["event"], "error");
        assert_eq!(last["code"], "invalid_state");
    }

    #[test]
    fn rotation_after_terminal_is_ignored() {
        let text = run("push push push r l", false);
        assert_eq!(text.matches("Ignored...").count(), 2);
        assert_eq!(text.matches("Date set to: 2024-06-15").count(), 1);

        let json = run("push push push l", true);
        let ignored: Vec<serde_json::Value> = json
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .filter(|event: &serde_json::Value| event["event"] == "ignored")
            .collect();
        assert_eq!(ignored.len(), 1);
        assert_eq!(ignored[0]["action"], "rotate_left");
    }
}
