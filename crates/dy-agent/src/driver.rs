//! Run a conversation on real tokio timers and stream its events.

use async_stream::stream;
use dy_protocol::ConversationEvent;
use futures::Stream;
use tokio::runtime::Handle;
use tracing::debug;

use crate::conversation::Conversation;
use crate::scheduler::TokioScheduler;
use crate::script::SimulatorConfig;

/// Submit each prompt in turn, waiting for its response to finish before
/// the next, and yield every transcript change. Blank prompts are skipped.
///
/// Must be polled inside a tokio runtime.
pub fn simulate(
    config: SimulatorConfig,
    prompts: Vec<String>,
) -> impl Stream<Item = ConversationEvent> {
    stream! {
        let (scheduler, mut fired) = TokioScheduler::new(Handle::current());
        let mut conversation = Conversation::new(config, scheduler);
        let events = conversation.subscribe();

        for prompt in prompts {
            if let Err(e) = conversation.submit(&prompt) {
                debug!(error = %e, "skipping prompt");
                continue;
            }
            let batch: Vec<_> = events.try_iter().collect();
            for event in batch {
                yield event;
            }

            while conversation.is_building() {
                let (id, timer) = match fired.recv().await {
                    Some(fired) => fired,
                    None => break,
                };
                conversation.fire(id, timer);
                let batch: Vec<_> = events.try_iter().collect();
                for event in batch {
                    yield event;
                }
            }
        }
    }
}
