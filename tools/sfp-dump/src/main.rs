//! Display SFP module dump information.
//!
//! Reads a 512-byte image (A0 followed by A2) or two 256-byte bank files and
//! prints the decoded report to stdout, as text or as an HTML table.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use sfp_eeprom::tracing::init_stderr;
use sfp_eeprom::{Config, DumpImage, HtmlSink, PrintFlags, Sfp, TextSink};

#[derive(Parser, Debug)]
#[command(
    name = "sfp-dump",
    about = "Display SFP module dump information",
    long_about = "Decode SFF-8472 A0/A2 EEPROM dumps. FILE1 is either a 512-byte image \
                  holding both banks or the 256-byte A0 bank, in which case FILE2 holds A2."
)]
struct Cli {
    /// Show verbose info (same as -uctbm)
    #[arg(short, long)]
    verbose: bool,

    /// Show hex data
    #[arg(short = 'x', long)]
    hex: bool,

    /// Show bit fields in short format
    #[arg(short, long)]
    short: bool,

    /// Show fields with unknown/undefined values
    #[arg(short, long)]
    unknown: bool,

    /// Show calibration parameters
    #[arg(short, long)]
    calibrations: bool,

    /// Show threshold parameters
    #[arg(short, long)]
    thresholds: bool,

    /// Show bit fields
    #[arg(short, long)]
    bit_options: bool,

    /// Show checksum fields
    #[arg(short = 'm', long)]
    checksums: bool,

    /// Show vendor-specific fields
    #[arg(short = 'n', long)]
    vendor: bool,

    /// Hide optical or copper fields depending on the module type
    #[arg(short, long)]
    laser_auto: bool,

    /// Output as an HTML table
    #[arg(short = 'H', long)]
    html: bool,

    /// Fail when a stored checksum does not match
    #[arg(long)]
    strict: bool,

    /// Print vendor, part number, speed and power as JSON
    #[arg(long, conflicts_with = "html")]
    brief: bool,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image file(s)
    #[arg(required = true, num_args = 1..=2, value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Cli {
    /// Overlay command-line switches on configured flags.
    fn flags(&self, base: PrintFlags) -> PrintFlags {
        let mut flags = base;
        let switches = [
            (self.verbose, PrintFlags::VERBOSE),
            (self.hex, PrintFlags::HEX_OUTPUT),
            (self.unknown, PrintFlags::PRINT_UNKNOWN),
            (self.calibrations, PrintFlags::CALIBRATIONS),
            (self.thresholds, PrintFlags::THRESHOLDS),
            (self.bit_options, PrintFlags::BIT_OPTIONS),
            (self.checksums, PrintFlags::CHECKSUMS),
            (self.vendor, PrintFlags::VENDOR),
            (self.laser_auto, PrintFlags::LASER_AUTO),
        ];
        for (on, flag) in switches {
            if on {
                flags.insert(flag);
            }
        }
        if self.short {
            flags.remove(PrintFlags::LONG_OPT);
        }
        flags
    }
}

fn main() -> Result<()> {
    init_stderr();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };
    config.flags = cli.flags(config.flags);
    config.enforce_checksum |= cli.strict;
    debug!("Flags {:?}, strict {}", config.flags, config.enforce_checksum);

    let image = DumpImage::load(&cli.files[0], cli.files.get(1).map(PathBuf::as_path))
        .with_context(|| format!("reading {}", cli.files[0].display()))?
        .with_addresses(config.a0_address, config.a2_address);
    let mut sfp = Sfp::new(image, config);

    let report = if cli.brief {
        let info = sfp.read_brief().context("reading brief info")?;
        let mut json = serde_json::to_string_pretty(&info)?;
        json.push('\n');
        json
    } else if cli.html {
        sfp.show_info(HtmlSink::new())
            .context("reading module information")?
            .finish()
    } else {
        sfp.show_info(TextSink::new())
            .context("reading module information")?
            .into_string()
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(report.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sfp-dump").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_flags() {
        let cli = parse(&["dump.bin"]);
        assert_eq!(cli.flags(PrintFlags::default()), PrintFlags::LONG_OPT);
        assert_eq!(cli.files.len(), 1);
    }

    #[test]
    fn test_verbose_and_short() {
        let cli = parse(&["-v", "-s", "-x", "a0.bin", "a2.bin"]);
        let flags = cli.flags(PrintFlags::default());
        assert!(flags.contains(PrintFlags::CHECKSUMS | PrintFlags::HEX_OUTPUT));
        assert!(!flags.contains(PrintFlags::LONG_OPT), "-s wins over -v");
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn test_switches_add_to_configured_flags() {
        let cli = parse(&["-l", "-n", "dump.bin"]);
        let flags = cli.flags(PrintFlags::THRESHOLDS);
        assert_eq!(
            flags,
            PrintFlags::THRESHOLDS | PrintFlags::LASER_AUTO | PrintFlags::VENDOR
        );
    }

    #[test]
    fn test_file_count() {
        let no_args = Cli::try_parse_from(["sfp-dump"]);
        assert!(no_args.is_err(), "an image file is required");
        let too_many = Cli::try_parse_from(["sfp-dump", "a", "b", "c"]);
        assert!(too_many.is_err());
        let both = Cli::try_parse_from(["sfp-dump", "--brief", "-H", "a"]);
        assert!(both.is_err(), "brief output is JSON only");
    }
}
