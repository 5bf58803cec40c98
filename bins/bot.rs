use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;
use common::utils::logging::init_logging_json;

fn init_logging() {
    // 加载 .env（允许使用 RUST_LOG 配置日志级别）
    dotenv().ok();
    // 使用统一的JSON结构化日志初始化
    init_logging_json();
    info!(service = "bot", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    // 生成服务实例上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：捕获异常并输出错误日志
    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "bot",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    // 配置加载失败直接退出（缺少 BOT_TOKEN 时 bot 无法工作）
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "bot", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "bot", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "bot",
        event = "start",
        %service_id,
        pid,
        version,
        page_size = cfg.bot.page_size,
        "bot starting"
    );

    rt.block_on(async move {
        let bot_task = tokio::spawn(async move {
            if let Err(e) = bot::bootstrap::run(cfg).await {
                error!(service = "bot", event = "run_failed", error = %e, "bot::bootstrap::run returned error");
                Err(e)
            } else {
                Ok(())
            }
        });

        tokio::select! {
            res = bot_task => {
                match res {
                    Ok(Ok(())) => {
                        info!(service = "bot", event = "stop", %service_id, pid, "bot stopped normally");
                        std::process::ExitCode::SUCCESS
                    }
                    Ok(Err(_)) => std::process::ExitCode::FAILURE,
                    Err(e) => {
                        error!(service = "bot", event = "task_join_error", error = %e, "bot task join error");
                        std::process::ExitCode::FAILURE
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                // 轮询循环自身也监听 Ctrl+C，这里只负责尽快退出进程
                info!(service = "bot", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                std::process::ExitCode::SUCCESS
            }
        }
    })
}
