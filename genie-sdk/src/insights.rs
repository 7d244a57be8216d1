//! Usage insights, refreshed in the background

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

use genie_api::wire::Insights;
use parking_lot::RwLock;

use crate::context::HomeContext;
use crate::poller::Poller;
use crate::SdkError;

#[derive(Debug, Default)]
struct Latest {
    insights: Option<Insights>,
    fetched_at: Option<Instant>,
    failures: u64,
}

/// Periodically refetches `/automation/insights`
///
/// The first fetch happens when the feed starts, then once per configured
/// insights interval. A failed fetch is logged and keeps the last good value.
/// Dropping the feed stops the poller and waits for it.
pub struct InsightsFeed {
    latest: Arc<RwLock<Latest>>,
    poller: Option<Poller>,
}

impl InsightsFeed {
    pub(crate) fn start(context: Arc<HomeContext>) -> Result<Self, SdkError> {
        let latest = Arc::new(RwLock::new(Latest::default()));
        let interval = context.config.insights_interval;

        let target = latest.clone();
        let poller = Poller::spawn("insights-feed", interval, move || {
            match context.client.insights() {
                Ok(reply) => {
                    let mut latest = target.write();
                    latest.insights = Some(reply.insights);
                    latest.fetched_at = Some(Instant::now());
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch insights: {}", e);
                    target.write().failures += 1;
                }
            }
            ControlFlow::Continue(())
        })?;

        Ok(Self {
            latest,
            poller: Some(poller),
        })
    }

    /// The most recent successful fetch
    pub fn latest(&self) -> Option<Insights> {
        self.latest.read().insights.clone()
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.latest.read().fetched_at
    }

    /// Fetches that failed since the feed started
    pub fn failures(&self) -> u64 {
        self.latest.read().failures
    }

    pub fn is_running(&self) -> bool {
        self.poller.as_ref().map_or(false, |p| !p.is_finished())
    }

    /// Stop polling; the last value stays readable
    pub fn stop(&mut self) {
        drop(self.poller.take());
    }
}

impl Drop for InsightsFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for InsightsFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightsFeed")
            .field("running", &self.is_running())
            .field("failures", &self.failures())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenieConfig;
    use std::net::TcpListener;
    use std::time::Duration;

    #[test]
    fn test_failed_fetch_keeps_running() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let context = HomeContext::new(
            GenieConfig::new(format!("http://127.0.0.1:{}/api", port))
                .with_connect_timeout(Duration::from_millis(200))
                .with_insights_interval(Duration::from_millis(20)),
        );

        let mut feed = InsightsFeed::start(context).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while feed.failures() < 2 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(feed.failures() >= 2);
        assert!(feed.latest().is_none());
        assert!(feed.is_running());

        feed.stop();
        assert!(!feed.is_running());
    }
}
