use clap::{Parser, ValueEnum};
use log::info;
use simplelog::LevelFilter;

use ntt_red::analysis::Analyzer;
use ntt_red::bounds::{max_red_mul_interval, min_red_mul_interval};
use ntt_red::interval::Interval;
use ntt_red::ntt::INPUT_BOUND;
use ntt_red::product::ProductVariant;
use ntt_red::rounds::{ct_bound, gs_bound, ntt_ct_bounds, ntt_gs_bounds};
use ntt_red::tables::NttTables;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Transform size (power of two, 16..=2048).
    #[arg(long, value_name = "INT", default_value = "1024")]
    size: usize,

    /// Bound on the magnitude of transform inputs.
    #[arg(long, value_name = "INT", default_value_t = INPUT_BOUND as i64)]
    input_bound: i64,

    /// Bound on the magnitude of multipliers, for table-independent round bounds.
    #[arg(long, value_name = "INT", default_value = "6144")]
    multiplier_bound: i64,

    /// Also run the interval analysis of all five products.
    #[arg(long)]
    products: bool,

    /// Log level.
    #[arg(long, value_enum, default_value = "info")]
    log_level: Level,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => LevelFilter::Error,
            Level::Warn => LevelFilter::Warn,
            Level::Info => LevelFilter::Info,
            Level::Debug => LevelFilter::Debug,
            Level::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level.into(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!("args = {:?}", args);
    let time_total = std::time::Instant::now();

    let tables = NttTables::standard(args.size)?;
    println!("tables = {:?}", tables);

    // Products of centred residues, as in the pointwise multiplication step.
    let (b, w) = (args.input_bound, args.multiplier_bound);
    let max = max_red_mul_interval(-b, b, -w, w)?;
    let min = min_red_mul_interval(-b, b, -w, w)?;
    println!("red(w*x) for |x| <= {}, |w| <= {}:", b, w);
    println!("  max = {} at x = {}, w = {}", max.value, max.x, max.w);
    println!("  min = {} at x = {}, w = {}", min.value, min.x, min.w);
    println!("  one CT round: {}", ct_bound(b, -w, w)?);
    println!("  one GS round: {}", gs_bound(b, -w, w)?);

    println!("Round bounds for n = {}:", args.size);
    for (name, table) in tables.named_tables() {
        if !name.contains("omega") && !name.contains("mixed") {
            continue;
        }
        let ct = ntt_ct_bounds(b, table)?;
        let gs = ntt_gs_bounds(b, table)?;
        println!("  {:<22} CT: {}{}", name, ct, if ct.fits_i32() { "" } else { "  OVERFLOW" });
        println!("  {:<22} GS: {}{}", name, gs, if gs.fits_i32() { "" } else { "  OVERFLOW" });
    }

    if args.products {
        let mut analyzer = Analyzer::new();
        for variant in ProductVariant::ALL {
            let time = std::time::Instant::now();
            analyzer.clear();
            let c = analyzer.analyze_product(variant, tables)?;
            let hull = c.iter().copied().reduce(Interval::join).unwrap_or(Interval::point(0));
            info!(
                "{}: output in {}, {} warnings, {:.3}s",
                variant,
                hull,
                analyzer.warnings().len(),
                time.elapsed().as_secs_f64()
            );
            for stage in analyzer.history().iter().filter(|s| s.round == 0) {
                println!("  {:<26} {}", stage.stage, stage.bounds);
            }
        }
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
