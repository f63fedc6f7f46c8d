use asset_export::app::query::parse_filter_args;
use asset_export::config::cli::{Command, MediaCommand, MetapropertyCommand};
use asset_export::config::{LogFormat, UpstreamMode};
use asset_export::utils::error::ErrorSeverity;
use asset_export::utils::{logger, validation::Validate};
use asset_export::{build_service, AppConfig, CliConfig, EtlError, MediaQuery, MetapropertyQuery, Reply};
use clap::Parser;
use serde::Serialize;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            // 配置讀不到時日誌尚未初始化，直接輸出到 stderr
            logger::init_cli_logger(cli.verbose);
            fail(&e);
        }
    };

    // 初始化日誌
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting asset-export CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => fail(&e),
    };

    let exit_code = match cli.command {
        Command::Media(MediaCommand::List(args)) => match parse_filter_args(&args.filters) {
            Ok(filters) => {
                let query = MediaQuery {
                    limit: args.limit,
                    page: args.page,
                    total: Some(args.total.to_string()),
                    filters,
                    name: None,
                };
                emit(service.list_media(&query).await)
            }
            Err(e) => emit(Reply::<()>::from_error(&e, config.is_production())),
        },
        Command::Media(MediaCommand::Get { id }) => emit(service.get_media(Some(&id)).await),
        Command::Media(MediaCommand::Export(args)) => match parse_filter_args(&args.filters) {
            Ok(filters) => {
                let query = MediaQuery {
                    limit: args.limit,
                    filters,
                    name: args.name,
                    ..Default::default()
                };
                emit(service.export_media(&query).await)
            }
            Err(e) => emit(Reply::<()>::from_error(&e, config.is_production())),
        },
        Command::Metaproperties(MetapropertyCommand::List { no_options, count }) => {
            let query = MetapropertyQuery {
                options: Some((!no_options).to_string()),
                count: Some(count.to_string()),
            };
            emit(service.list_metaproperties(&query).await)
        }
        Command::Metaproperties(MetapropertyCommand::Export { name }) => {
            emit(service.export_metaproperties(name.as_deref()).await)
        }
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

/// 讀取配置檔並套用命令列覆寫
fn load_config(cli: &CliConfig) -> Result<AppConfig, EtlError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if cli.sample {
        config.upstream.mode = UpstreamMode::Sample;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.export.output_dir = output_dir.clone();
    }
    Ok(config)
}

/// 回應寫到 stdout，並依狀態碼決定退出碼
fn emit<T: Serialize>(reply: Reply<T>) -> i32 {
    match serde_json::to_string_pretty(&reply.body) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("❌ Failed to serialize response: {}", e);
            return 3;
        }
    }

    match reply.status {
        200..=299 | 404 => 0, // 找不到資料只是警告
        502 => 2,             // 可重試
        503 => 3,             // 上游未配置或拒絕連線
        _ => 1,
    }
}

fn fail(e: &EtlError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
