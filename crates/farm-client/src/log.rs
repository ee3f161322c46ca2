use near_sdk::serde_json;
use near_workspaces::result::{ExecutionFinalResult, ExecutionSuccess, ViewResultDetails};
use owo_colors::OwoColorize;

use crate::ContractEvent;

/// `println!` that indents output coming from spawned threads under the
/// thread's name.
#[macro_export]
macro_rules! print_log {
    ( $x:expr, $($y:expr),+ ) => {
        let thread_name = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        if thread_name == "main" {
            println!($x, $($y),+);
        } else {
            let mut s = format!($x, $($y),+);
            s = s.split('\n').map(|s| {
                let mut pre = "    ".to_string();
                pre.push_str(s);
                pre.push('\n');
                pre
            }).collect::<String>();
            println!(
                "{}\n{}",
                $crate::owo_colors::OwoColorize::bold(&thread_name),
                &s[..s.len() - 1],
            );
        }
    };
}

const EVENT_PREFIX: &str = "EVENT_JSON:";

pub fn parse_event(log: &str) -> Option<ContractEvent> {
    let json = log.strip_prefix(EVENT_PREFIX)?;
    serde_json::from_str(json).ok()
}

/// Prints receipt failures, contract logs and burnt gas of a transaction and
/// returns its outcome together with the emitted events.
pub fn log_tx_result(
    ident: &str,
    res: ExecutionFinalResult,
) -> anyhow::Result<(ExecutionSuccess, Vec<ContractEvent>)> {
    for failure in res.receipt_failures() {
        print_log!("{:#?}", failure.bright_red());
    }
    let mut events = vec![];
    for outcome in res.receipt_outcomes() {
        for log in outcome.logs.iter() {
            match parse_event(log) {
                Some(event) => {
                    print_log!(
                        "{}: {}\n{}",
                        "account".bright_cyan(),
                        outcome.executor_id,
                        event
                    );
                    events.push(event);
                }
                None => {
                    print_log!("{}", log.bright_yellow());
                }
            }
        }
    }
    print_log!(
        "{} gas burnt: {:.3} {}",
        ident.italic(),
        res.total_gas_burnt.as_tgas().bright_magenta().bold(),
        "TGas".bright_magenta().bold()
    );
    Ok((res.into_result()?, events))
}

pub fn log_view_result(res: ViewResultDetails) -> anyhow::Result<ViewResultDetails> {
    for log in res.logs.iter() {
        print_log!("{}", log.bright_yellow());
    }
    Ok(res)
}
