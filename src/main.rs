// ==========================================
// 高校校舍面积缺口测算系统 - 命令行入口
// ==========================================
// 用法:
//   campus-area-gap [--import <standards.csv|xlsx>] <submission.json> [db_path]
// 输出: 测算响应 JSON（stdout）;测算失败时输出失败 JSON 并以非零状态退出
// ==========================================

use anyhow::Context;
use campus_area_gap::api::CalculationRequest;
use campus_area_gap::app::{get_default_db_path, AppState};
use campus_area_gap::logging;
use std::path::PathBuf;
use std::process::ExitCode;

struct CliArgs {
    import: Option<PathBuf>,
    submission: PathBuf,
    db_path: Option<String>,
}

fn usage() -> String {
    "用法: campus-area-gap [--import <标准文件>] <submission.json> [db_path]".to_string()
}

fn parse_args() -> Result<CliArgs, String> {
    let mut import = None;
    let mut positional = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--import" => {
                let path = args.next().ok_or_else(usage)?;
                import = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Err(usage()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let submission = positional.next().map(PathBuf::from).ok_or_else(usage)?;
    let db_path = positional.next();

    Ok(CliArgs {
        import,
        submission,
        db_path,
    })
}

async fn run(args: CliArgs) -> anyhow::Result<bool> {
    let db_path = args.db_path.unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)
        .await
        .map_err(anyhow::Error::msg)
        .context("应用初始化失败")?;

    if let Some(path) = &args.import {
        let summary = state
            .standards_api
            .import_file(path)
            .await
            .with_context(|| format!("导入面积标准 {} 失败", path.display()))?;
        tracing::info!(
            rows_written = summary.rows_written,
            school_types = ?summary.school_types,
            "面积标准已导入"
        );
    }

    let text = std::fs::read_to_string(&args.submission)
        .with_context(|| format!("读取填报文件 {} 失败", args.submission.display()))?;
    let request: CalculationRequest = serde_json::from_str(&text)
        .with_context(|| format!("填报文件 {} 不是有效的测算请求", args.submission.display()))?;

    match state.calculation_api.calculate(&request).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(true)
        }
        Err(failure) => {
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    tracing::info!("{} v{}", campus_area_gap::APP_NAME, campus_area_gap::VERSION);

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = ?e, "执行失败");
            eprintln!("错误: {:#}", e);
            ExitCode::from(2)
        }
    }
}
