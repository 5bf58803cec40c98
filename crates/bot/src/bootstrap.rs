use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use migration::MigratorTrait;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use common::admin_http;
use configs::AppConfig;
use integrations::{Assistant, OpenAiAssistant};
use service::directory::{DirectoryRepository, DirectoryService, SeaOrmDirectoryRepository};

use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::observability::{self, POLL_ERRORS_TOTAL};
use crate::telegram::types::Update;
use crate::telegram::{TelegramApi, TelegramClient};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Split a batch into per-sender queues, keeping arrival order inside each queue.
/// Updates without a sender get a queue of their own.
fn group_by_sender(updates: Vec<Update>, offset: &mut i64) -> Vec<(Option<i64>, Vec<Update>)> {
    let mut queues: Vec<(Option<i64>, Vec<Update>)> = Vec::new();
    for update in updates {
        *offset = (*offset).max(update.update_id + 1);
        let sender = update.sender_id();
        match queues.iter_mut().find(|(s, _)| sender.is_some() && *s == sender) {
            Some((_, queue)) => queue.push(update),
            None => queues.push((sender, vec![update])),
        }
    }
    queues
}

/// Long-poll `getUpdates` until `shutdown` resolves.
///
/// Each batch is fanned out as one task per sender, and a sender's updates run
/// in order inside its task. The next poll starts once the batch is done.
pub async fn run_polling<R, T, F>(dispatcher: Arc<Dispatcher<R, T>>, poll_timeout_secs: u64, shutdown: F)
where
    R: DirectoryRepository + 'static,
    T: TelegramApi + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut offset: i64 = 0;
    loop {
        let batch = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(service = "bot", event = "shutdown", "polling stopped");
                return;
            }
            res = dispatcher.telegram().get_updates(offset, poll_timeout_secs) => res,
        };

        let updates = match batch {
            Ok(u) => u,
            Err(e) => {
                POLL_ERRORS_TOTAL.inc();
                warn!(service = "bot", event = "poll_failed", error = %e, "getUpdates failed; retrying");
                tokio::select! {
                    biased;
                    _ = &mut shutdown => return,
                    _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                }
            }
        };

        let mut tasks = JoinSet::new();
        for (_, queue) in group_by_sender(updates, &mut offset) {
            let d = Arc::clone(&dispatcher);
            tasks.spawn(async move {
                for update in queue {
                    d.handle_update(update).await;
                }
            });
        }
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!(service = "bot", event = "task_join_error", error = %e, "update task failed");
            }
        }
    }
}

/// Wire the bot from configuration and poll until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    cfg.require_bot_token()?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;

    let telegram = Arc::new(TelegramClient::new(&cfg.telegram)?);
    let assistant: Option<Arc<dyn Assistant>> = match OpenAiAssistant::new(&cfg.openai) {
        Ok(a) => Some(Arc::new(a)),
        Err(e) => {
            warn!(service = "bot", error = %e, "AI assistant disabled; search uses the raw text and voice is unsupported");
            None
        }
    };

    let repo = Arc::new(SeaOrmDirectoryRepository::new(db));
    let directory = DirectoryService::new(repo, cfg.bot.page_size);
    let dispatcher = Arc::new(Dispatcher::new(
        directory,
        telegram,
        assistant,
        DispatcherConfig { max_search_results: cfg.bot.max_search_results, admin_chat_id: cfg.bot.admin_chat_id },
    ));

    // healthz/metrics 独立端口
    admin_http::spawn_admin_server(&cfg.bot.metrics_addr, observability::encode_metrics);

    info!(
        service = "bot",
        event = "polling_start",
        page_size = cfg.bot.page_size,
        metrics_addr = %cfg.bot.metrics_addr,
        "bot polling started"
    );
    run_polling(dispatcher, cfg.telegram.poll_timeout_secs, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(service = "bot", error = %e, "ctrl_c listener failed");
        }
    })
    .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::directory::repository::mock::InMemoryDirectory;
    use crate::telegram::mock::RecordingTelegram;

    fn from_user(update_id: i64, user_id: i64) -> Update {
        serde_json::from_value(serde_json::json!({
            "update_id": update_id,
            "message": {"message_id": update_id, "from": {"id": user_id, "first_name": "U"}, "chat": {"id": user_id}, "text": "hi"}
        }))
        .expect("update")
    }

    #[test]
    fn batch_is_grouped_per_sender_in_arrival_order() {
        let mut offset = 0;
        let batch = vec![from_user(5, 7), from_user(6, 8), from_user(7, 7), Update { update_id: 8, message: None, callback_query: None }];
        let queues = group_by_sender(batch, &mut offset);

        assert_eq!(offset, 9);
        let ids: Vec<(Option<i64>, Vec<i64>)> =
            queues.iter().map(|(s, q)| (*s, q.iter().map(|u| u.update_id).collect())).collect();
        assert_eq!(ids, vec![(Some(7), vec![5, 7]), (Some(8), vec![6]), (None, vec![8])]);
    }

    #[tokio::test]
    async fn polling_returns_on_shutdown() {
        let directory = DirectoryService::new(Arc::new(InMemoryDirectory::new()), 5);
        let dispatcher = Arc::new(Dispatcher::new(
            directory,
            Arc::new(RecordingTelegram::new()),
            None,
            DispatcherConfig { max_search_results: 10, admin_chat_id: None },
        ));
        tokio::time::timeout(Duration::from_secs(5), run_polling(dispatcher, 0, async {}))
            .await
            .expect("polling should stop");
    }
}
