//! One-shot mode: register a single batch and print it.

use super::config::AppConfig;
use deveui::{BatchResult, DevEui, Progress, Registrar, RegistrationEngine};
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;

/// Writes one `.` to stderr per registered identifier.
#[derive(Default, Clone, Copy, Debug)]
pub struct DotProgress;

impl Progress for DotProgress {
    fn tick(&self, _deveui: DevEui) {
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(b".");
        let _ = stderr.flush();
    }
}

/// Runs one batch of `config.batch_size` and prints the registered
/// identifiers to stdout.
///
/// Ctrl+C stops the batch the same way the aggregate deadline does: requests
/// already sent are awaited and whatever was registered is still printed.
pub async fn run_once<R>(config: &AppConfig, registrar: R) -> anyhow::Result<()>
where
    R: Registrar,
{
    let mut engine = RegistrationEngine::new(config.engine.clone(), registrar)?;
    // Debug logs already show every request when verbose.
    if !config.verbose {
        engine = engine.with_progress(DotProgress);
    }

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(
        cancel.clone(),
        config.engine.attempt_timeout.as_secs(),
    ));

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Registering {} DevEUIs against {}",
        config.batch_size,
        config.engine.endpoint
    );
    let result = engine
        .run_batch_cancellable(config.batch_size, &cancel)
        .await;
    interrupt.abort();

    if !config.verbose {
        eprintln!();
    }
    write_result(&mut io::stdout().lock(), result)?;
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken, timeout_secs: u64) {
    if tokio::signal::ctrl_c().await.is_ok() {
        let notice = interrupt_notice(timeout_secs);
        #[cfg(feature = "tracing")]
        tracing::warn!("{notice}");
        #[cfg(not(feature = "tracing"))]
        eprintln!("\n{notice}");
        cancel.cancel();
    }
}

fn interrupt_notice(timeout_secs: u64) -> String {
    format!(
        "SIGINT detected... waiting for in-flight requests to finish (request timeout={timeout_secs} s)"
    )
}

/// Prints the result table: a header, one `short code / DevEUI` row per
/// identifier ordered by value, and the total.
pub fn write_result<W>(out: &mut W, result: BatchResult) -> io::Result<()>
where
    W: Write,
{
    writeln!(out, "Short Code\tDevEUI")?;
    let total = result.len();
    for deveui in result.into_sorted_vec() {
        writeln!(out, "{:10}\t{}", deveui.short_code().to_string(), deveui)?;
    }
    writeln!(out)?;
    writeln!(out, "{total} DevEUIs total")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::testing::{AcceptAll, engine_config};

    async fn run(batch_size: usize) -> BatchResult {
        RegistrationEngine::new(engine_config(), AcceptAll::default())
            .unwrap()
            .run_batch(batch_size)
            .await
    }

    #[tokio::test]
    async fn table_lists_every_identifier_then_the_total() {
        let result = run(5).await;
        let expected: Vec<DevEui> = result.clone().into_sorted_vec();

        let mut out = Vec::new();
        write_result(&mut out, result).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Short Code\tDevEUI");
        assert_eq!(lines.len(), 1 + 5 + 2);
        for (line, deveui) in lines[1..6].iter().zip(&expected) {
            let (code, id) = line.split_once('\t').unwrap();
            assert_eq!(code.trim_end(), deveui.short_code().to_string());
            assert_eq!(code.len(), 10);
            assert_eq!(id, deveui.to_string());
            assert!(id.ends_with(code.trim_end()));
        }
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "5 DevEUIs total");
    }

    #[test]
    fn interrupt_notice_names_the_request_timeout() {
        let notice = interrupt_notice(7);
        assert!(notice.starts_with("SIGINT detected"));
        assert!(notice.contains("in-flight requests"));
        assert!(notice.contains("request timeout=7 s"));
    }

    #[tokio::test]
    async fn empty_result_still_prints_header_and_total() {
        let mut out = Vec::new();
        write_result(&mut out, run(0).await).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Short Code\tDevEUI\n\n0 DevEUIs total\n"
        );
    }
}
