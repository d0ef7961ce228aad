//! Interactive terminal viewer for stock quotes, history and news
//!
//! # Usage
//!
//! ```bash
//! # Google News (default)
//! cargo run -p lens-cli -- RELIANCE.NS
//!
//! # Finnhub news with auto-refresh
//! export FINNHUB_API_KEY="your-key"
//! cargo run -p lens-cli -- --news-provider finnhub --auto-refresh TCS.NS
//! ```

mod terminal;

use clap::Parser;
use lens_market::{
    Command, Dashboard, LensConfig, Lookback, MarketData, NewsProvider,
};
use std::io::{self, Write};
use std::time::Duration;
use terminal::TerminalRenderer;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

type Viewer = Dashboard<TerminalRenderer<io::Stdout>>;

#[derive(Parser, Debug)]
#[command(name = "tickerlens")]
#[command(about = "Stock quotes, price history and news with news impact views", long_about = None)]
struct Args {
    /// Symbol to load on start, e.g. RELIANCE.NS
    symbol: Option<String>,

    /// Reload the current symbol every refresh interval
    #[arg(long)]
    auto_refresh: bool,

    /// News provider: google or finnhub
    #[arg(long)]
    news_provider: Option<NewsProvider>,

    /// Main history lookback: 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max
    #[arg(long)]
    lookback: Option<Lookback>,

    /// Auto-refresh interval in seconds
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Drop results of superseded searches
    #[arg(long)]
    discard_stale: bool,
}

fn print_banner() {
    println!(
        r"
╔══════════════════════════════════════════════════════════╗
║                       tickerlens                         ║
║                                                          ║
║  Type a symbol (e.g. RELIANCE.NS) to load it             ║
║    /news <n>             - news impact view for item n   ║
║    /before <v> <days>    - widen or narrow a view        ║
║    /auto on|off          - auto-refresh                  ║
║    /help                 - all commands                  ║
║    /exit                 - exit                          ║
╚══════════════════════════════════════════════════════════╝
"
    );
}

fn build_config(args: &Args) -> anyhow::Result<LensConfig> {
    let mut builder = LensConfig::builder()
        .with_env_news_provider()
        .with_env_finnhub_key()
        .discard_stale_results(args.discard_stale);

    if let Some(provider) = args.news_provider {
        builder = builder.news_provider(provider);
    }
    if let Some(lookback) = args.lookback {
        builder = builder.history_lookback(lookback);
    }
    if let Some(secs) = args.refresh_secs {
        builder = builder.refresh_interval(Duration::from_secs(secs));
    }

    Ok(builder.build()?)
}

/// Apply one command. Returns `false` when the user asked to exit.
fn run_command(dashboard: &mut Viewer, command: Command) -> bool {
    match command {
        Command::Search { symbol } => {
            dashboard.search(&symbol);
        }
        Command::Popular => {
            let symbols = dashboard.popular_symbols().to_vec();
            dashboard.renderer_mut().show_popular(&symbols);
        }
        Command::Quick { index } => {
            dashboard.quick_search(index);
        }
        Command::AutoRefresh { enabled } => dashboard.set_auto_refresh(enabled),
        Command::Analyze { news_index } => {
            dashboard.open_analysis(news_index);
        }
        Command::Before { view, days } => {
            dashboard.set_days_before(view, days);
        }
        Command::After { view, days } => {
            dashboard.set_days_after(view, days);
        }
        Command::Close { view } => {
            dashboard.close_analysis(view);
        }
        Command::Views => {
            let rows: Vec<(u64, String, u32, u32)> = dashboard
                .views()
                .map(|v| {
                    let window = v.window();
                    (v.id(), v.item().title.clone(), window.days_before(), window.days_after())
                })
                .collect();
            dashboard.renderer_mut().show_views(
                rows.iter()
                    .map(|(id, title, before, after)| (*id, title.as_str(), *before, *after)),
            );
        }
        Command::Help => dashboard.renderer_mut().show_text(Command::help_text()),
        Command::Exit => return false,
    }
    true
}

fn prompt(dashboard: &Viewer) -> io::Result<()> {
    let symbol = dashboard.session().current_symbol().unwrap_or("-");
    print!("tickerlens [{symbol}]> ");
    io::stdout().flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lens_utils::init_tracing_with_default("warn,lens_market=info");

    let args = Args::parse();
    let config = build_config(&args)?;
    let market = MarketData::from_config(&config)?;

    info!(
        "Starting tickerlens (news from {}, refresh every {:?})",
        market.news_provider_name(),
        config.refresh_interval
    );

    print_banner();
    let renderer = TerminalRenderer::new(io::stdout(), config.currency_symbol.clone());
    let mut dashboard = Dashboard::new(config, market, renderer);

    if let Some(symbol) = &args.symbol {
        dashboard.search(symbol);
    }
    if args.auto_refresh {
        dashboard.set_auto_refresh(true);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&dashboard)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nGoodbye!");
                    break;
                };
                let input = line.trim();
                if !input.is_empty() {
                    match Command::parse(input) {
                        Ok(command) => {
                            if !run_command(&mut dashboard, command) {
                                println!("Goodbye!");
                                break;
                            }
                        }
                        Err(e) => dashboard.renderer_mut().show_text(&e.to_string()),
                    }
                }
                prompt(&dashboard)?;
            }
            Some(event) = dashboard.next_event() => {
                dashboard.handle_event(event);
                dashboard.drain_events();
                prompt(&dashboard)?;
            }
        }
    }

    dashboard.shutdown();
    Ok(())
}
