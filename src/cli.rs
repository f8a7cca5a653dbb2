//! Command-line front end.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::ledger_csv_adapter::LedgerCsvAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::config_validation::build_strategy_config;
use crate::domain::error::SignalTraderError;
use crate::domain::metrics::TickerResult;
use crate::domain::signal::CompiledLogic;
use crate::domain::strategy::StrategyConfig;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_LEDGER_PATH: &str = "backtesting_results.csv";
pub const DEFAULT_REPORT_PATH: &str = "backtesting_results.typ";

#[derive(Parser, Debug)]
#[command(name = "signaltrader", about = "Rule-based strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of per-ticker CSV files (overrides [data] path)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long, default_value = DEFAULT_LEDGER_PATH)]
        output: PathBuf,
        #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
        report: PathBuf,
        /// Typst template with {{PLACEHOLDER}} markers (built-in when omitted)
        #[arg(short, long)]
        template: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers with data files
    ListTickers {
        #[arg(short, long)]
        data_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            output,
            report,
            template,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(
                    &config,
                    data_dir.as_deref(),
                    &output,
                    &report,
                    template.as_deref(),
                )
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListTickers { data_dir } => run_list_tickers(&data_dir),
    }
}

fn fail(err: &SignalTraderError) -> ExitCode {
    eprintln!("error: {}", err.detailed());
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Load, validate and compile a strategy file.
pub fn load_strategy(path: &Path) -> Result<(StrategyConfig, CompiledLogic), ExitCode> {
    let adapter = load_config(path)?;
    let strategy = build_strategy_config(&adapter).map_err(|e| fail(&e))?;
    let logic = CompiledLogic::compile(&strategy.buy_condition, &strategy.sell_condition)
        .map_err(|e| fail(&e))?;
    Ok((strategy, logic))
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    output_path: &Path,
    report_path: &Path,
    template_path: Option<&Path>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let (mut strategy, logic) = match load_strategy(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Some(dir) = data_override {
        strategy.data_path = dir.to_path_buf();
    }

    let template = match template_path.map(std::fs::read_to_string).transpose() {
        Ok(t) => t,
        Err(e) => return fail(&SignalTraderError::Io(e)),
    };

    let data = CsvAdapter::new(strategy.data_path.clone());
    run_backtest_pipeline(&data, &strategy, &logic, output_path, report_path, template)
}

/// Everything after config loading: fetch, simulate, summarise, persist.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    logic: &CompiledLogic,
    output_path: &Path,
    report_path: &Path,
    template: Option<String>,
) -> ExitCode {
    info!(
        strategy = %strategy.name,
        tickers = strategy.tickers.len(),
        "starting backtest"
    );

    let bars = match backtest_engine::load_bars(data_port, strategy) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Running backtest: {} tickers, {} to {}",
        strategy.tickers.len(),
        strategy.start_date,
        strategy.end_date,
    );
    eprintln!("  Loaded: {} bars", bars.len());

    let result = backtest_engine::run_compiled(&bars, strategy, logic);
    print_summary(&result, strategy);

    let typst = match template {
        Some(t) => TypstReportAdapter::with_template(t),
        None => TypstReportAdapter::new(),
    };
    let outputs: [(&dyn ReportPort, &Path, &str); 2] = [
        (&LedgerCsvAdapter, output_path, "Ledger"),
        (&typst, report_path, "Report"),
    ];
    for (port, path, label) in outputs {
        let path_str = path.to_string_lossy();
        if let Err(e) = port.write(&result, strategy, &path_str) {
            return fail(&e);
        }
        eprintln!("{} written to: {}", label, path.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult, strategy: &StrategyConfig) {
    let metrics = &result.metrics;
    eprintln!("\n=== Results ===");
    eprintln!("Bars Simulated:   {}", result.bars_processed);
    eprintln!("Cumulative PnL:   ${:.2}", metrics.cumulative_pnl);
    eprintln!("Effective Return: {:.2}%", metrics.effective_return_pct);
    eprintln!("Operations:       {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!(
        "Exits:            {} signal, {} stop loss, {} take profit",
        metrics.exits_by_signal, metrics.exits_by_stop_loss, metrics.exits_by_take_profit
    );
    eprintln!("Final Cash:       ${:.2}", result.final_cash);

    for pos in result.open_positions.values() {
        eprintln!(
            "Open Position:    {} since {} at {:.4} (${:.2})",
            pos.ticker, pos.entry_timestamp, pos.entry_price, pos.allocated_cash
        );
    }

    let ticker_results = TickerResult::compute_per_ticker(&result.trades);
    if strategy.tickers.len() > 1 && !ticker_results.is_empty() {
        eprintln!("\n=== Per-Ticker Summary ===");
        for tr in &ticker_results {
            let pnl_sign = if tr.total_pnl >= 0.0 { "+" } else { "" };
            eprintln!(
                "  {}:  {} trades, {:.1}% win rate, {}${:.2}",
                tr.ticker,
                tr.total_trades,
                tr.win_rate * 100.0,
                pnl_sign,
                tr.total_pnl,
            );
        }
    }
}

fn print_strategy(strategy: &StrategyConfig, logic: &CompiledLogic) {
    eprintln!("\nStrategy: {}", strategy.name);
    if !strategy.description.is_empty() {
        eprintln!("  {}", strategy.description);
    }

    eprintln!("\nConditions (parsed):");
    eprintln!("  buy:  {}", logic.buy);
    eprintln!("  sell: {}", logic.sell);

    let mut fields = logic.buy.fields();
    for f in logic.sell.fields() {
        if !fields.contains(&f) {
            fields.push(f);
        }
    }
    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    eprintln!("\nFields referenced: {}", names.join(", "));

    eprintln!("\nParameters:");
    eprintln!(
        "  windows: short {} / long {}",
        strategy.short_window, strategy.long_window
    );
    eprintln!("  dates:   {} to {}", strategy.start_date, strategy.end_date);
    eprintln!("  capital: {:.2}", strategy.capital);
    eprintln!(
        "  risk:    stop loss {:.2}%, take profit {:.2}%",
        strategy.stop_loss_pct * 100.0,
        strategy.take_profit_pct * 100.0
    );
    eprintln!(
        "  sizing:  {} (every entry commits all cash)",
        strategy.sizing_method
    );
}

pub fn run_dry_run(config_path: &Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let (strategy, logic) = match load_strategy(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    eprintln!("Config validated successfully");
    print_strategy(&strategy, &logic);

    eprintln!("\nUniverse:");
    eprintln!("  tickers: {}", strategy.tickers.join(", "));
    eprintln!("  data:    {}", strategy.data_path.display());

    eprintln!("\nDry run complete. No data fetched.");
    ExitCode::SUCCESS
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating strategy: {}", config_path.display());
    let (strategy, logic) = match load_strategy(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    print_strategy(&strategy, &logic);
    eprintln!("\nStrategy configuration is valid.");
    ExitCode::SUCCESS
}

pub fn run_list_tickers(data_dir: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    match adapter.list_tickers() {
        Ok(tickers) => {
            if tickers.is_empty() {
                eprintln!("No ticker files found in {}", data_dir.display());
            }
            for t in tickers {
                println!("{}", t);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
