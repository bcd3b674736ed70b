use std::{fmt::Display, future::Future, io};

use log::warn;
use tokio_util::sync::CancellationToken;

const MAX_FILENAME_LEN: usize = 255;

/// Link to `{explorer}/{kind}/{id}`, tolerating a trailing slash on the base url.
pub fn explorer_link(explorer: &str, kind: &str, id: impl Display) -> String {
    format!("{}/{kind}/{id}", explorer.trim_end_matches('/'))
}

/// Lowercase `input` and replace characters that are illegal in file names with underscores
pub fn sanitize_filename(input: &str) -> String {
    const INVALID: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' '];

    input
        .to_lowercase()
        .chars()
        .map(|c| if INVALID.contains(&c) || c.is_control() { '_' } else { c })
        .take(MAX_FILENAME_LEN)
        .collect()
}

/// Cancel the returned token on the first interrupt and call `abort` on the second.
///
/// `interrupts` yields one future per signal to wait for, `tokio::signal::ctrl_c` in the binary.
pub fn cancel_on_interrupt<S, F>(mut interrupts: S, abort: impl FnOnce() + Send + 'static) -> CancellationToken
where
    S: FnMut() -> F + Send + 'static,
    F: Future<Output = io::Result<()>> + Send,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        if interrupts().await.is_err() {
            return;
        }
        warn!("Interrupted, finishing the current transaction. Press Ctrl-C again to abort");
        token.cancel();

        if interrupts().await.is_ok() {
            abort();
        }
    });

    cancel
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use std::sync::Arc;

    use tokio::sync::{oneshot, Notify};

    use super::*;

    #[test]
    fn explorer_links() {
        let addr = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
        assert_eq!(
            explorer_link("https://sepolia.etherscan.io/", "address", addr),
            "https://sepolia.etherscan.io/address/0x5FbDB2315678afecb367f032d93F642f64180aa3"
        );

        let hash = b256!("0000000000000000000000000000000000000000000000000000000000000001");
        assert_eq!(
            explorer_link("http://localhost:4000", "tx", hash),
            format!("http://localhost:4000/tx/{hash}")
        );
    }

    #[test]
    fn sanitizes_filenames() {
        assert_eq!(sanitize_filename("Base Sepolia: 84532"), "base_sepolia__84532");
        assert_eq!(sanitize_filename(&"x".repeat(300)).len(), MAX_FILENAME_LEN);
    }

    #[tokio::test]
    async fn first_interrupt_cancels_second_aborts() {
        let signal = Arc::new(Notify::new());
        let (aborted, on_abort) = oneshot::channel();

        let source = signal.clone();
        let cancel = cancel_on_interrupt(
            move || {
                let source = source.clone();
                async move {
                    source.notified().await;
                    Ok(())
                }
            },
            move || {
                let _ = aborted.send(());
            },
        );
        assert!(!cancel.is_cancelled());

        signal.notify_one();
        cancel.cancelled().await;

        signal.notify_one();
        on_abort.await.unwrap();
    }

    #[tokio::test]
    async fn failing_signal_listener_never_cancels() {
        let cancel = cancel_on_interrupt(
            || async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) },
            || panic!("aborted without an interrupt"),
        );

        tokio::task::yield_now().await;
        assert!(!cancel.is_cancelled());
    }
}
