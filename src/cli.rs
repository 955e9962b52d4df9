//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::adapters::paper_account::PaperAccount;
use crate::adapters::system_clock::SystemClock;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestMode, BacktestResult};
use crate::domain::candle::{sort_candles, Candle};
use crate::domain::error::CoinbotError;
use crate::domain::selector::{self, Selection, DEFAULT_K_RANGE, DEFAULT_LOOKBACK_DAYS, DEFAULT_MARKETS};
use crate::domain::settings::{self, BacktestSettings};
use crate::domain::shutdown::ShutdownSignal;
use crate::domain::strategy::{build_strategy, CandleInterval, StrategyKind, StrategyParams};
use crate::domain::trader::Trader;
use crate::ports::market_data_port::MarketDataSource;

/// Most minute candles a single backtest loads.
const MAX_MINUTE_CANDLES: usize = 200;
const MINUTES_PER_DAY: usize = 24 * 60;

#[derive(Parser, Debug)]
#[command(name = "coinbot", about = "Indicator-driven crypto trading bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by the commands that replay stored candles.
#[derive(Args, Debug, Clone, Default)]
pub struct ReplayArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub market: Option<String>,
    /// ma, rsi, macd, bb, volatility, percentage or combined
    #[arg(short, long)]
    pub strategy: Option<String>,
    #[arg(short, long)]
    pub days: Option<usize>,
    #[arg(long)]
    pub initial_capital: Option<f64>,
    /// Breakout range multiplier
    #[arg(short, long)]
    pub k: Option<f64>,
    /// Pick the market and k with the coin selector first
    #[arg(long)]
    pub find_best: bool,
    /// Directory holding candle CSV files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest one strategy over stored candles
    Backtest {
        #[command(flatten)]
        replay: ReplayArgs,
        /// Replay the built-in daily breakout instead of a strategy object
        #[arg(long)]
        builtin_breakout: bool,
    },
    /// Backtest every strategy over the same candles
    Compare {
        #[command(flatten)]
        replay: ReplayArgs,
    },
    /// Find the market and k with the best recent breakout profit
    Select {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated markets; defaults to the built-in universe
        #[arg(long, value_delimiter = ',')]
        markets: Vec<String>,
        #[arg(short, long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
        days: usize,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Run the trading loop against a simulated account
    Paper {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        market: Option<String>,
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    run_with_shutdown(cli, ShutdownSignal::new())
}

/// Dispatch `cli`; `shutdown` stops the paper trading loop.
pub fn run_with_shutdown(cli: Cli, shutdown: ShutdownSignal) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            replay,
            builtin_breakout,
        } => run_backtest(&replay, builtin_breakout),
        Command::Compare { replay } => run_compare(&replay),
        Command::Select {
            config,
            markets,
            days,
            data_dir,
        } => run_select(config.as_ref(), markets, days, data_dir),
        Command::Paper {
            config,
            market,
            strategy,
            data_dir,
        } => run_paper(
            config.as_ref(),
            market,
            strategy.as_deref(),
            data_dir,
            &shutdown,
        ),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load and validate the INI file at `path`, or the all-defaults config.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, CoinbotError> {
    let config = match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)?
        }
        None => FileConfigAdapter::from_string("")?,
    };
    settings::validate_config(&config)?;
    Ok(config)
}

/// Everything a replay needs once config and flags are merged.
struct ReplayPlan {
    market: String,
    kind: StrategyKind,
    params: StrategyParams,
    settings: BacktestSettings,
}

fn plan_replay(args: &ReplayArgs) -> Result<ReplayPlan, CoinbotError> {
    let config = load_config(args.config.as_ref())?;

    let mut bt = settings::backtest_settings(&config)?;
    if let Some(days) = args.days {
        bt.days = days;
    }
    if let Some(capital) = args.initial_capital {
        bt.initial_capital = capital;
    }
    if let Some(dir) = &args.data_dir {
        bt.data_dir = dir.clone();
    }

    let mut params = settings::strategy_params(&config);
    if let Some(k) = args.k {
        params.k = k;
    }

    let kind = match &args.strategy {
        Some(name) => name.parse()?,
        None => settings::strategy_kind(&config)?,
    };
    let mut market = match &args.market {
        Some(m) => m.clone(),
        None => settings::trader_config(&config)?.market,
    };

    if args.find_best {
        eprintln!("Searching for the best market and k...");
        let data = CsvAdapter::new(bt.data_dir.clone());
        let universe: Vec<String> = DEFAULT_MARKETS.iter().map(|m| m.to_string()).collect();
        let best = select_best(&data, &universe, bt.days)?;
        eprintln!(
            "Best market: {}, k: {}, profit: {:.4}",
            best.market, best.k, best.profit
        );
        market = best.market;
        params.k = best.k;
    }

    Ok(ReplayPlan {
        market,
        kind,
        params,
        settings: bt,
    })
}

/// Candles for a `days`-long replay: `days + 1` daily bars, or the matching
/// number of minute bars capped at [`MAX_MINUTE_CANDLES`].
pub fn fetch_replay_candles(
    data: &dyn MarketDataSource,
    market: &str,
    interval: CandleInterval,
    days: usize,
) -> Result<Vec<Candle>, CoinbotError> {
    let mut candles = match interval {
        CandleInterval::Daily => data.get_day_candles(market, days + 1)?,
        CandleInterval::Minutes(unit) => {
            let per_day = MINUTES_PER_DAY / (unit.max(1) as usize);
            let count = days.saturating_mul(per_day).min(MAX_MINUTE_CANDLES);
            data.get_minute_candles(market, unit, count)?
        }
    };
    sort_candles(&mut candles);
    Ok(candles)
}

fn too_short(market: &str, candles: &[Candle], warmup: usize) -> CoinbotError {
    CoinbotError::InsufficientData {
        market: market.to_string(),
        bars: candles.len(),
        minimum: warmup + 1,
    }
}

fn run_backtest(args: &ReplayArgs, builtin_breakout: bool) -> Result<(), CoinbotError> {
    let plan = plan_replay(args)?;
    let data = CsvAdapter::new(plan.settings.data_dir.clone());
    let bt_config = plan.settings.backtest_config();

    let (label, candles, result) = if builtin_breakout {
        let candles =
            fetch_replay_candles(&data, &plan.market, CandleInterval::Daily, plan.settings.days)?;
        eprintln!(
            "Replaying built-in breakout on {} ({} candles)",
            plan.market,
            candles.len()
        );
        let result =
            backtest_engine::run_backtest(&candles, BacktestMode::VolatilityBreakout, &bt_config);
        ("volatility (built-in)".to_string(), candles, result)
    } else {
        let mut strategy = build_strategy(plan.kind, &plan.params);
        let candles =
            fetch_replay_candles(&data, &plan.market, strategy.interval(), plan.settings.days)?;
        eprintln!(
            "Backtesting {} on {} ({} candles)",
            plan.kind,
            plan.market,
            candles.len()
        );
        let result = backtest_engine::run_backtest(
            &candles,
            BacktestMode::Strategy(strategy.as_mut()),
            &bt_config,
        );
        (plan.kind.to_string(), candles, result)
    };

    let result = result.ok_or_else(|| too_short(&plan.market, &candles, bt_config.warmup))?;
    info!(
        market = %plan.market,
        strategy = %label,
        total_return_pct = result.total_return_pct,
        "backtest finished"
    );
    print_summary(&plan.market, &label, &result);
    Ok(())
}

fn print_summary(market: &str, label: &str, result: &BacktestResult) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Market:           {}", market);
    eprintln!("Strategy:         {}", label);
    eprintln!("Initial Capital:  {:.0} KRW", result.initial_capital);
    eprintln!("Final Capital:    {:.0} KRW", result.final_capital);
    eprintln!("Total Return:     {:.2}%", result.total_return_pct);
    eprintln!("Buys:             {}", result.buy_count);
    eprintln!("Sells:            {}", result.sell_count);
}

fn run_compare(args: &ReplayArgs) -> Result<(), CoinbotError> {
    let plan = plan_replay(args)?;
    let data = CsvAdapter::new(plan.settings.data_dir.clone());
    // The configured strategy decides which candles everyone replays.
    let interval = build_strategy(plan.kind, &plan.params).interval();
    let bt_config = BacktestConfig {
        candle_interval: Some(interval),
        ..plan.settings.backtest_config()
    };
    let candles = fetch_replay_candles(&data, &plan.market, interval, plan.settings.days)?;
    eprintln!(
        "Comparing strategies on {} ({} candles)",
        plan.market,
        candles.len()
    );

    let results = backtest_engine::compare_strategies(&candles, &bt_config, &plan.params);
    let Some((best, best_result)) = results.first() else {
        return Err(too_short(&plan.market, &candles, bt_config.warmup));
    };

    eprintln!("\n=== Strategy Comparison ===");
    eprintln!(
        "{:<12} {:>10} {:>8} {:>16}",
        "Strategy", "Return", "Trades", "Final Capital"
    );
    for (kind, result) in &results {
        eprintln!(
            "{:<12} {:>9.2}% {:>8} {:>16.0}",
            kind.as_str(),
            result.total_return_pct,
            result.buy_count,
            result.final_capital
        );
    }
    eprintln!(
        "\nBest strategy: {} ({:.2}%)",
        best, best_result.total_return_pct
    );
    Ok(())
}

/// Score every market in `markets` over the last `days` daily candles.
/// Markets whose candles cannot be loaded are skipped with a warning.
pub fn select_best(
    data: &dyn MarketDataSource,
    markets: &[String],
    days: usize,
) -> Result<Selection, CoinbotError> {
    let mut series: Vec<(String, Vec<Candle>)> = Vec::with_capacity(markets.len());
    for market in markets {
        match data.get_day_candles(market, days + 1) {
            Ok(mut candles) => {
                sort_candles(&mut candles);
                series.push((market.clone(), candles));
            }
            Err(e) => warn!(%market, error = %e, "skipping market"),
        }
    }

    selector::find_best_k_and_coin(&series, &DEFAULT_K_RANGE).ok_or_else(|| {
        CoinbotError::InsufficientData {
            market: markets.join(","),
            bars: series.iter().map(|(_, c)| c.len()).max().unwrap_or(0),
            minimum: 2,
        }
    })
}

fn run_select(
    config_path: Option<&PathBuf>,
    markets: Vec<String>,
    days: usize,
    data_dir: Option<PathBuf>,
) -> Result<(), CoinbotError> {
    let config = load_config(config_path)?;
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => settings::backtest_settings(&config)?.data_dir,
    };
    let markets = if markets.is_empty() {
        DEFAULT_MARKETS.iter().map(|m| m.to_string()).collect()
    } else {
        markets
    };

    eprintln!(
        "Scoring {} markets over {} days...",
        markets.len(),
        days
    );
    let best = select_best(&CsvAdapter::new(data_dir), &markets, days)?;
    println!("{}\t{}\t{:.4}", best.market, best.k, best.profit);
    Ok(())
}

fn run_paper(
    config_path: Option<&PathBuf>,
    market: Option<String>,
    strategy: Option<&str>,
    data_dir: Option<PathBuf>,
    shutdown: &ShutdownSignal,
) -> Result<(), CoinbotError> {
    let config = load_config(config_path)?;

    let mut trader_config = settings::trader_config(&config)?;
    if let Some(m) = market {
        trader_config.market = m;
    }
    let kind = match strategy {
        Some(name) => name.parse()?,
        None => settings::strategy_kind(&config)?,
    };
    let params = settings::strategy_params(&config);
    let paper = settings::paper_settings(&config)?;
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => settings::backtest_settings(&config)?.data_dir,
    };

    let data = CsvAdapter::new(data_dir);
    let account = PaperAccount::new(&data, paper.initial_krw, paper.fee_rate);
    let notifier = LogNotifier;
    let clock = SystemClock::new(shutdown.clone());

    eprintln!(
        "Paper trading {} with {} (fee rate {})",
        trader_config.market,
        kind,
        account.fee_rate()
    );
    let mut trader = Trader::new(
        trader_config,
        build_strategy(kind, &params),
        &data,
        &account,
        &notifier,
        &clock,
    )?;
    trader.run(shutdown)
}

fn run_validate(config_path: &PathBuf) -> Result<(), CoinbotError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(Some(config_path))?;

    let trader = settings::trader_config(&config)?;
    let kind = settings::strategy_kind(&config)?;
    let bt = settings::backtest_settings(&config)?;
    eprintln!("  market:          {}", trader.market);
    eprintln!("  strategy:        {}", kind);
    eprintln!("  interval:        {}s", trader.interval.as_secs());
    eprintln!("  buy_amount_pct:  {}", trader.buy_fraction);
    eprintln!("  min_order_krw:   {}", trader.min_order_krw);
    eprintln!("  data_dir:        {}", bt.data_dir.display());
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
