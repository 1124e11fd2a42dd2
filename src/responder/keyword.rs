use super::{Responder, ResponderError, ResponderRequest};
use async_trait::async_trait;

/// Keyword groups checked in order; the first group with a hit wins
const KEYWORD_REPLIES: &[(&[&str], &str)] = &[
    (
        &["maintenance", "repair", "service", "fix"],
        "Based on the current machine health, prioritize maintenance on any machine in \
         critical or warning status. Schedule the critical units first and inspect \
         machines whose next maintenance date has already passed.",
    ),
    (
        &["critical", "alert", "warning", "failure", "issue", "problem"],
        "Open alerts are listed in the notifications panel. Critical machines should be \
         taken offline for inspection; warning machines can keep running under closer \
         monitoring until a maintenance window is available.",
    ),
    (
        &["efficiency", "performance", "productivity", "output"],
        "Overall efficiency tracks the machine average. Machines below 80% efficiency \
         are the main drag on throughput; clearing their detected issues gives the \
         largest gain.",
    ),
    (
        &["energy", "power", "sustainab", "co2", "carbon", "emission"],
        "Energy usage follows production rate. Shifting load away from peak hours and \
         keeping machines in operational status reduces both energy use and CO2 \
         emissions.",
    ),
    (
        &["optimi", "improve", "suggest", "recommend"],
        "Review the pending optimization suggestions. Approving them applies the \
         recommended changes; each lists its expected impact.",
    ),
    (
        &["production", "rate", "throughput"],
        "The production chart shows the last twelve samples. A falling rate usually \
         follows a machine leaving operational status.",
    ),
];

const DEFAULT_REPLY: &str = "I can help with machine maintenance, alerts, efficiency, \
    energy usage and optimization suggestions. What would you like to know?";

/// Deterministic canned-reply responder
///
/// Case-insensitive match against [`KEYWORD_REPLIES`]: a keyword hits when a
/// word of the message starts with it, so "rates" matches "rate" but
/// "accurate" does not.
#[derive(Clone, Debug, Default)]
pub struct KeywordResponder;

impl KeywordResponder {
    pub fn new() -> Self {
        Self
    }

    /// Pick the reply for `message`
    pub fn reply_for(&self, message: &str) -> &'static str {
        let lowered = message.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        KEYWORD_REPLIES
            .iter()
            .find(|(keywords, _)| {
                keywords
                    .iter()
                    .any(|k| words.iter().any(|w| w.starts_with(k)))
            })
            .map(|(_, reply)| *reply)
            .unwrap_or(DEFAULT_REPLY)
    }
}

#[async_trait]
impl Responder for KeywordResponder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn respond(&self, request: &ResponderRequest) -> Result<String, ResponderError> {
        Ok(self.reply_for(&request.user_message).to_string())
    }
}
