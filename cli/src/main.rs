use std::io::Write;

use anyhow::Error;

use clap::{ArgAction, Parser, Subcommand};

mod add;
use add::AddProperty;

mod delete;
use delete::DeleteProperty;

mod generate;
use generate::AddSimulation;

mod show;
use show::Show;

mod warnings;

const NAME: &str = env!("CARGO_BIN_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Tools for building tables of halo property time series.
#[derive(Debug, Parser)]
#[clap(name = NAME, author = AUTHOR, version = VERSION, about)]
#[clap(subcommand_required = true)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress warnings.
    ///
    /// By default, only warnings are printed. By setting this flag, warnings will be disabled.
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbosity.
    ///
    /// Flag can be set multiply times to increase verbosity, or left unset for quiet mode.
    #[clap(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print CLI arguments for debugging.
    #[clap(long, hide = true, global = true)]
    debug: bool,
}

impl Cli {
    pub fn run(self) -> Result<(), Error> {
        if self.debug {
            eprintln!("{self:#?}");
        }

        let level = if self.quiet {
            log::LevelFilter::Off
        } else {
            match self.verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        };

        match env_logger::Builder::new()
            .filter_level(level)
            .target(env_logger::Target::Stderr)
            .format(|buf, record| {
                let level = record.level().as_str().to_lowercase();
                let args = record.args();
                writeln!(buf, "[halodb {level:>5}] {args}")
            })
            .try_init()
        {
            Ok(()) => (),
            Err(e) => eprintln!("failed to setup logger: {e}"),
        }

        self.command.run()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(visible_alias = "generate")]
    AddSimulation(AddSimulation),
    #[command(visible_alias = "add")]
    AddProperty(AddProperty),
    #[command(visible_alias = "delete")]
    DeleteProperty(DeleteProperty),
    Show(Show),
}

impl Command {
    fn run(self) -> Result<(), Error> {
        match self {
            Command::AddSimulation(add_simulation) => add_simulation.run(),
            Command::AddProperty(add_property) => add_property.run(),
            Command::DeleteProperty(delete_property) => delete_property.run(),
            Command::Show(show) => show.run(),
        }
    }
}

macro_rules! impl_try_from_command {
    ($variant:ident, $args:ty) => {
        impl TryFrom<Command> for $args {
            type Error = Command;

            fn try_from(command: Command) -> Result<Self, Self::Error> {
                match command {
                    Command::$variant(args) => Ok(args),
                    command => Err(command),
                }
            }
        }
    };
}

impl_try_from_command!(AddSimulation, AddSimulation);
impl_try_from_command!(AddProperty, AddProperty);
impl_try_from_command!(DeleteProperty, DeleteProperty);
impl_try_from_command!(Show, Show);

fn main() {
    let cli = Cli::parse();

    match cli.run() {
        Ok(()) => (),
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    }
}
