use std::io::Write;

use chrono::NaiveDate;
use sequence::{clock::selected_date, ComposedResult, SelectOutcome, SequenceController};
use serde::Serialize;
use shared::{
    error::{ErrorReport, SequenceError},
    protocol::{KnobAction, SequenceSnapshot, UnknownAction},
};

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum OutputEvent<'a> {
    Prompt(&'a SequenceSnapshot),
    Locked {
        field: &'a str,
        value: i64,
    },
    Result {
        result: &'a ComposedResult,
        date: Option<NaiveDate>,
    },
    Rejected {
        message: String,
    },
    Ignored {
        action: KnobAction,
    },
    Error(&'a ErrorReport),
}

pub struct Renderer<W: Write> {
    json: bool,
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(json: bool, out: W) -> Self {
        Self { json, out }
    }

    pub fn prompt(&mut self, seq: &SequenceController) -> anyhow::Result<()> {
        let snapshot = seq.snapshot();
        if self.json {
            return self.emit(&OutputEvent::Prompt(&snapshot));
        }
        match (&snapshot.field, snapshot.value, snapshot.min, snapshot.max) {
            (Some(field), Some(value), Some(min), Some(max)) => writeln!(
                self.out,
                "{} [{field}: {value} ({min}..={max})]",
                snapshot.instructions
            )?,
            _ => writeln!(self.out, "{}", snapshot.instructions)?,
        }
        Ok(())
    }

    pub fn outcome(&mut self, outcome: &SelectOutcome) -> anyhow::Result<()> {
        match outcome {
            SelectOutcome::Advanced { locked, .. } | SelectOutcome::Finished { locked } => {
                if self.json {
                    self.emit(&OutputEvent::Locked {
                        field: &locked.name,
                        value: locked.value,
                    })
                } else {
                    writeln!(self.out, "{} set to {}", locked.name, locked.value)?;
                    Ok(())
                }
            }
            SelectOutcome::Summary(result) => self.result(result),
        }
    }

    pub fn result(&mut self, result: &ComposedResult) -> anyhow::Result<()> {
        let date = selected_date(result);
        if self.json {
            return self.emit(&OutputEvent::Result { result, date });
        }
        match date {
            Some(date) => writeln!(self.out, "Date set to: {date}")?,
            None => writeln!(self.out, "Result: {result}")?,
        }
        Ok(())
    }

    pub fn rejected(&mut self, err: &UnknownAction) -> anyhow::Result<()> {
        if self.json {
            return self.emit(&OutputEvent::Rejected {
                message: err.to_string(),
            });
        }
        writeln!(self.out, "Ignored: {err}")?;
        Ok(())
    }

    pub fn ignored(&mut self, action: KnobAction) -> anyhow::Result<()> {
        if self.json {
            return self.emit(&OutputEvent::Ignored { action });
        }
        writeln!(self.out, "Ignored...")?;
        Ok(())
    }

    pub fn error(&mut self, err: SequenceError) -> anyhow::Result<()> {
        let report = ErrorReport::from(err);
        if self.json {
            return self.emit(&OutputEvent::Error(&report));
        }
        writeln!(self.out, "Error: {}", report.message)?;
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn emit(&mut self, event: &OutputEvent<'_>) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequence::FieldSpec;

    fn controller() -> SequenceController {
        SequenceController::new(vec![
            FieldSpec::new("Year", 2024, 2024, 2030),
            FieldSpec::new("Month", 6, 1, 12),
            FieldSpec::new("Day", 15, 1, 31),
        ])
        .expect("valid")
    }

    fn rendered(json: bool, f: impl FnOnce(&mut Renderer<&mut Vec<u8>>)) -> String {
        let mut buf = Vec::new();
        let mut renderer = Renderer::new(json, &mut buf);
        f(&mut renderer);
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn text_prompt_shows_field_range() {
        let seq = controller();
        let text = rendered(false, |r| r.prompt(&seq).expect("prompt"));
        assert_eq!(text, "Please set the year... [Year: 2024 (2024..=2030)]\n");
    }

    #[test]
    fn text_summary_prints_date() {
        let mut seq = controller();
        for _ in 0..3 {
            seq.select();
        }
        let outcome = seq.select();
        let text = rendered(false, |r| r.outcome(&outcome).expect("outcome"));
        assert_eq!(text, "Date set to: 2024-06-15\n");
    }

    #[test]
    fn json_lines_are_tagged_events() {
        let mut seq = controller();
        let locked = seq.select();
        let text = rendered(true, |r| {
            r.outcome(&locked).expect("outcome");
            r.error(SequenceError::invalid_state("sequence is still editing"))
                .expect("error");
        });

        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines[0]["event"], "locked");
        assert_eq!(lines[0]["field"], "Year");
        assert_eq!(lines[0]["value"], 2024);
        assert_eq!(lines[1]["event"], "error");
        assert_eq!(lines[1]["code"], "invalid_state");
    }

    #[test]
    fn json_result_keeps_field_order() {
        let mut seq = controller();
        for _ in 0..3 {
            seq.select();
        }
        let result = seq.compose_result().expect("finished");
        let text = rendered(true, |r| r.result(&result).expect("result"));
        let expected = concat!(
            r#"{"event":"result","#,
            r#""result":{"Year":2024,"Month":6,"Day":15},"#,
            r#""date":"2024-06-15"}"#,
            "\n"
        );
        assert_eq!(text, expected);
    }
}
