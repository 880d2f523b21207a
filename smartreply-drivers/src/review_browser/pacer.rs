use anyhow::Result;
use fantoccini::elements::Element;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
/// Produces human-like delays and typing behavior to reduce automation
/// signals. Simultaneous automated actions are the strongest bot tell, so
/// every interaction in this workspace runs through a `Pacer`.
pub struct Pacer {}

impl Pacer {
    pub fn new() -> Self {
        Self {}
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn jitter(&self, min: u64, max: u64) {
        let mut rng = OsRng;
        let ms = rng.gen_range(min..=max);
        sleep(Duration::from_millis(ms)).await;
    }

    /// Fixed settle wait after navigation, letting late-rendered content
    /// attach before queries run.
    pub async fn settle(&self, delay: Duration) {
        sleep(delay).await;
    }

    /// Exact inter-submission wait used by bulk posting. Not jittered: the
    /// caller-supplied delay is a contract, not a hint.
    pub async fn between_submissions(&self, delay: Duration) {
        sleep(delay).await;
    }

    /// Type the provided text with small random delays between characters.
    pub async fn type_text_human_like(&self, element: &Element, text: &str) -> Result<()> {
        for ch in text.chars() {
            element.send_keys(&ch.to_string()).await?;
            self.jitter(30, 150).await;
        }
        Ok(())
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}
