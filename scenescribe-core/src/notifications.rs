// scenescribe-core/src/notifications.rs
//
// Module for handling ntfy notifications. A run-completion summary is the
// only notification the pipeline sends; failures to notify are logged and
// never fail the run.

use crate::error::{CoreError, CoreResult};
use ntfy::error::Error as NtfyError;
use ntfy::payload::{Payload, Priority as NtfyPriority};
use ntfy::DispatcherBuilder;
use url::Url;

/// Trait for sending notifications.
pub trait Notifier: Send + Sync {
    /// Sends a notification to the given topic URL.
    fn send(
        &self,
        topic_url: &str,
        message: &str,
        title: Option<&str>,
        priority: Option<u8>,
    ) -> CoreResult<()>;
}

/// Implementation of `Notifier` using the `ntfy` crate (blocking).
#[derive(Debug, Default)]
pub struct NtfyNotifier;

impl NtfyNotifier {
    pub fn new() -> CoreResult<Self> {
        Ok(Self)
    }
}

fn map_priority(p: u8) -> Option<NtfyPriority> {
    match p {
        1 => Some(NtfyPriority::Min),
        2 => Some(NtfyPriority::Low),
        3 => Some(NtfyPriority::Default),
        4 => Some(NtfyPriority::High),
        5 => Some(NtfyPriority::Max),
        _ => None,
    }
}

impl Notifier for NtfyNotifier {
    fn send(
        &self,
        topic_url: &str,
        message: &str,
        title: Option<&str>,
        priority: Option<u8>,
    ) -> CoreResult<()> {
        let parsed_url = Url::parse(topic_url).map_err(|e| {
            CoreError::NotificationError(format!("Invalid ntfy topic URL '{topic_url}': {e}"))
        })?;

        let host = match parsed_url.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(CoreError::NotificationError(format!(
                    "URL '{topic_url}' must have a non-empty host"
                )))
            }
        };
        let base_url = format!("{}://{}", parsed_url.scheme(), host);

        let topic = parsed_url.path().trim_start_matches('/');
        if topic.is_empty() {
            return Err(CoreError::NotificationError(format!(
                "URL '{topic_url}' is missing topic path"
            )));
        }

        let dispatcher = DispatcherBuilder::new(&base_url)
            .build_blocking()
            .map_err(|e: NtfyError| {
                CoreError::NotificationError(format!(
                    "Failed to build ntfy dispatcher for {base_url}: {e}"
                ))
            })?;

        let mut payload = Payload::new(topic).message(message);
        if let Some(t) = title {
            payload = payload.title(t);
        }
        if let Some(p_val) = priority {
            if let Some(ntfy_p) = map_priority(p_val) {
                payload = payload.priority(ntfy_p);
            } else {
                log::warn!("Invalid ntfy priority value provided: {p_val}");
            }
        }
        payload = payload.tags(vec!["scenescribe".to_string()]);

        dispatcher.send(&payload).map_err(|e: NtfyError| {
            CoreError::NotificationError(format!(
                "Failed to send ntfy notification to {topic_url}: {e}"
            ))
        })
    }
}
