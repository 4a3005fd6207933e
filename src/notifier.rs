/// Notifier: asks a tab's content script to show the warning overlay
use async_trait::async_trait;

use crate::error::{DeliveryError, ExtensionError, Result};
use crate::models::{ClassificationResult, ExtensionMessage, ModalAck};
use crate::retry::{RetryPolicy, Timer, retry};

/// `chrome.tabs.sendMessage`
#[async_trait(?Send)]
pub trait TabMessenger {
    async fn send_to_tab(
        &self,
        tab_id: i32,
        message: &ExtensionMessage,
    ) -> std::result::Result<ModalAck, DeliveryError>;
}

pub struct Notifier<'a, M: ?Sized, T: ?Sized> {
    messenger: &'a M,
    timer: &'a T,
    policy: RetryPolicy,
}

impl<'a, M: TabMessenger + ?Sized, T: Timer + ?Sized> Notifier<'a, M, T> {
    pub fn new(messenger: &'a M, timer: &'a T, policy: RetryPolicy) -> Self {
        Notifier {
            messenger,
            timer,
            policy,
        }
    }

    /// Deliver the warning for `result` to `tab_id`. Only "no receiver"
    /// failures are retried; the content script may not have attached yet.
    pub async fn warn(&self, tab_id: i32, result: &ClassificationResult) -> Result<ModalAck> {
        let message = ExtensionMessage::ShowSuspiciousModal {
            summary: result.warning_summary().to_string(),
        };

        let outcome = retry(&self.policy, self.timer, DeliveryError::is_no_receiver, |attempt| {
            log::debug!("Sending showSuspiciousModal to tab {} (attempt {})", tab_id, attempt);
            self.messenger.send_to_tab(tab_id, &message)
        })
        .await;

        match outcome {
            Ok(ack) => {
                log::info!("Warning shown in tab {}: {}", tab_id, ack.status);
                Ok(ack)
            }
            Err(err) => {
                log::error!("Failed to send warning to tab {}: {}", tab_id, err);
                Err(ExtensionError::Delivery {
                    tab_id,
                    reason: err.message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_WARNING_SUMMARY;
    use crate::testing::{RecordingTimer, ScriptedMessenger};
    use futures::executor::block_on;
    use std::time::Duration;

    const NO_RECEIVER: &str = "Could not establish connection. Receiving end does not exist.";

    fn suspicious(summary: Option<&str>) -> ClassificationResult {
        ClassificationResult {
            label: "suspicious".to_string(),
            summary: summary.map(str::to_string),
            from_cache: false,
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(250))
    }

    #[test]
    fn test_retries_until_receiver_attaches() {
        let messenger = ScriptedMessenger::failing_with(&[NO_RECEIVER, NO_RECEIVER]);
        let timer = RecordingTimer::default();
        let notifier = Notifier::new(&messenger, &timer, policy());

        let ack = block_on(notifier.warn(42, &suspicious(Some("Lookalike login page")))).unwrap();

        assert_eq!(ack, ModalAck::shown());
        assert_eq!(messenger.attempts(), 3);
        assert_eq!(timer.delays(), vec![Duration::from_millis(250); 2]);
        assert!(messenger.sent.borrow().iter().all(|(tab, _)| *tab == 42));
    }

    #[test]
    fn test_other_failures_are_not_retried() {
        let messenger = ScriptedMessenger::failing_with(&["No tab with id: 42."]);
        let timer = RecordingTimer::default();
        let notifier = Notifier::new(&messenger, &timer, policy());

        let err = block_on(notifier.warn(42, &suspicious(None))).unwrap_err();

        assert_eq!(messenger.attempts(), 1);
        assert!(timer.delays().is_empty());
        assert_eq!(err.status_text(), "Error: Failed to warn tab 42");
    }

    #[test]
    fn test_gives_up_after_three_attempts() {
        let messenger = ScriptedMessenger::failing_with(&[NO_RECEIVER; 5]);
        let timer = RecordingTimer::default();
        let notifier = Notifier::new(&messenger, &timer, policy());

        let err = block_on(notifier.warn(7, &suspicious(None))).unwrap_err();

        assert_eq!(messenger.attempts(), 3);
        assert!(matches!(err, ExtensionError::Delivery { tab_id: 7, .. }));
    }

    #[test]
    fn test_summary_fallback() {
        let messenger = ScriptedMessenger::default();
        let timer = RecordingTimer::default();
        let notifier = Notifier::new(&messenger, &timer, policy());

        block_on(notifier.warn(1, &suspicious(None))).unwrap();

        assert_eq!(
            messenger.sent.borrow()[0].1,
            ExtensionMessage::ShowSuspiciousModal {
                summary: DEFAULT_WARNING_SUMMARY.to_string()
            }
        );
    }
}
