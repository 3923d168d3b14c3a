//! Reader thread that turns input lines into knob actions on a bounded queue.

use std::{
    io::{self, BufRead, BufReader, Read},
    thread,
};

use crossbeam_channel::{bounded, Receiver, Sender};
use shared::protocol::{parse_script, KnobAction, UnknownAction};

pub type InputItem = Result<KnobAction, UnknownAction>;

pub fn spawn_stdin_reader(capacity: usize) -> io::Result<Receiver<InputItem>> {
    spawn_reader(io::stdin(), capacity)
}

pub fn spawn_reader<R>(reader: R, capacity: usize) -> io::Result<Receiver<InputItem>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = bounded(capacity);
    thread::Builder::new()
        .name("knob-input".into())
        .spawn(move || pump_lines(BufReader::new(reader), &tx))?;
    Ok(rx)
}

fn pump_lines(reader: impl BufRead, tx: &Sender<InputItem>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "input read failed; closing input");
                return;
            }
        };
        for item in parse_script(&line) {
            if let Ok(action) = &item {
                tracing::debug!(action = action.as_str(), "queued knob action");
            }
            if tx.send(item).is_err() {
                tracing::debug!("controller loop gone; stopping input reader");
                return;
            }
        }
    }
}
