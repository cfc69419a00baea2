use std::sync::{Arc, Mutex};
use std::time::Duration;

use enricher_core::{FieldNames, FormRecord, FormState, ImageRef, Notice};
use enricher_engine::{EnrichmentPipeline, NotificationSink};
use enricher_logging::enrich_info;
use tokio::io::{AsyncBufReadExt, BufReader};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Prints notices to stdout, one per line.
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&self, notice: Notice) {
        println!("[{}] {}", notice.kind, notice.text);
    }
}

enum Input {
    Edit(String),
    FetchNow,
    Show,
    Quit,
}

fn parse_line(line: &str) -> Input {
    match line.trim() {
        ":fetch" => Input::FetchNow,
        ":show" => Input::Show,
        ":quit" | ":q" => Input::Quit,
        _ => Input::Edit(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Treat each stdin line as the new content of the trigger field until EOF
/// or `:quit`, then let outstanding work settle and tear down.
pub async fn run(
    pipeline: EnrichmentPipeline,
    form: Arc<Mutex<FormRecord>>,
    names: FieldNames,
    quiet_period: Duration,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Edit(value) => {
                set_trigger(&form, &names, &value);
                pipeline.on_trigger_edited(value);
            }
            Input::FetchNow => {
                let current = read_trigger(&form, &names);
                pipeline.fetch_now(current);
            }
            Input::Show => print_record(&form, &names),
            Input::Quit => break,
        }
    }

    // Give a pending edit its quiet period, then wait for the request.
    tokio::time::sleep(quiet_period + POLL_INTERVAL).await;
    while pipeline.in_flight() {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    pipeline.teardown();
    enrich_info!("Input closed; pipeline torn down");

    print_record(&form, &names);
    Ok(())
}

fn set_trigger(form: &Mutex<FormRecord>, names: &FieldNames, value: &str) {
    if let Ok(mut form) = form.lock() {
        form.set_field(&names.trigger, value.to_string());
    }
}

fn read_trigger(form: &Mutex<FormRecord>, names: &FieldNames) -> String {
    form.lock()
        .ok()
        .and_then(|form| form.get_field(&names.trigger).map(str::to_string))
        .unwrap_or_default()
}

fn print_record(form: &Mutex<FormRecord>, names: &FieldNames) {
    let Ok(form) = form.lock() else {
        return;
    };
    for (name, value) in form.iter() {
        if name == names.image_url {
            if let ImageRef::RequiresManualAction(reason) = ImageRef::parse(value) {
                println!("{name}: <needs manual upload: {reason}>");
                continue;
            }
        }
        println!("{name}: {value}");
    }
}
