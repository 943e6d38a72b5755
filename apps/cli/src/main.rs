//! Command-line driver for the guarded stack
//!
//! Thin exercise harness over `vigil-stack`: runs a scripted push/pop drill
//! over a chosen element kind, shows the dump output, and deliberately
//! triggers the defined empty-pop fault so the diagnostic path is visible
//! end to end.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vigil_stack::{Element, FaultMask, FileSink, GuardedStack, StackConfig, provenance};

#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version = vigil_stack::VERSION,
    about = "Self-validating guarded stack driver",
    arg_required_else_help = true
)]
struct Cli {
    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scripted push/pop drill, fault demonstration included.
    Demo(DemoArgs),

    /// Print the fault bit table.
    Faults,
}

#[derive(clap::Args, Debug)]
struct DemoArgs {
    /// Element kind to exercise.
    #[arg(long, value_enum, default_value_t = Kind::Int)]
    kind: Kind,

    /// Dump depth: 1 descriptor only, 2 truncated slots, 3 every slot.
    #[arg(long, default_value_t = 2)]
    verbosity: u8,

    /// Append diagnostic output to this file as well as stdout.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Int,
    Long,
    Float,
    Char,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Demo(args) => match args.kind {
            Kind::Int => run_demo::<i32>(
                &[1000, 100, 10, 1, -1000, -100, -10, -1, 0, 1, 2, 3, 4],
                &args,
            ),
            Kind::Long => run_demo::<i64>(
                &[1 << 40, -(1 << 40), 0, i64::MIN + 1, i64::MAX - 1],
                &args,
            ),
            Kind::Float => run_demo::<f64>(&[3.25, -1.5, 0.0, 12.75, -0.001], &args),
            Kind::Char => run_demo::<char>(&['v', 'i', 'g', 'i', 'l'], &args),
        },
        Command::Faults => {
            print_fault_table();
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_demo<T: Element>(values: &[T], args: &DemoArgs) -> anyhow::Result<()> {
    let config = StackConfig {
        dump_verbosity: args.verbosity,
        ..StackConfig::default()
    };
    let mut stack = GuardedStack::<T>::with_config(0, provenance!("demo"), config)
        .context("constructing the demo stack")?;

    if let Some(path) = &args.log {
        let sink = FileSink::open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        stack.set_sink(Box::new(sink));
    }
    info!(kind = %T::KIND, values = values.len(), "starting drill");

    for &value in values {
        stack
            .push(value)
            .with_context(|| format!("pushing {}", value.render()))?;
        println!(
            "push {:>12}   size {:>2} / capacity {:>2}",
            value.render(),
            stack.len(),
            stack.capacity()
        );
    }

    println!("\n{}\n", stack.dump());
    if args.log.is_some() {
        stack.dump_to_sink();
    }

    for &expected in values.iter().rev() {
        let value = stack.pop().context("popping the drill values back")?;
        if value != expected {
            anyhow::bail!(
                "LIFO order violated: popped {}, expected {}",
                value.render(),
                expected.render()
            );
        }
        println!(
            "pop  {:>12}   size {:>2} / capacity {:>2}",
            value.render(),
            stack.len(),
            stack.capacity()
        );
    }

    // The deliberate part: popping an empty stack is a defined fault, and
    // the attached sink receives the full report.
    println!("\npopping the now-empty stack on purpose:");
    match stack.pop() {
        Err(err) => {
            let mask = err.fault_mask();
            println!("fault mask: {mask}");
            for (name, text) in mask.describe() {
                println!("  {name}: {text}");
            }
        }
        Ok(value) => anyhow::bail!("empty pop unexpectedly produced {}", value.render()),
    }

    stack.destroy();
    println!("\nafter destroy:\n{}", stack.dump());
    Ok(())
}

fn print_fault_table() {
    println!("{:>10}  {:<26} description", "bit", "name");
    for (flag, (name, text)) in FaultMask::all().iter().zip(FaultMask::all().describe()) {
        println!("{:#010X}  {name:<26} {text}", flag.bits());
    }
}
