//! cart8
//!
//! Command-line editor for the cartridge slots of a CHIPnGo SD card

use anyhow::{bail, Context};
use chipngo_cart::{
    ButtonMap, CartridgeRecord, DisplayFrame, Geometry, Glyph, Library, LibraryBuilder, Quirk,
    RecordFormat, SlotSummary, TitlePolicy, ToolConfig, MAX_ROM_SIZE,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cart8")]
#[command(about = "Edit CHIPnGo cartridges on an SD card or image", version)]
struct Cli {
    /// SD card device or image (overrides the config file)
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Record format to write (overrides the config file)
    #[arg(long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// Reject titles that don't fit instead of truncating them
    #[arg(long, global = true)]
    strict_title: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Legacy,
    Sentinel,
}

impl From<FormatArg> for RecordFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Legacy => RecordFormat::Legacy,
            FormatArg::Sentinel => RecordFormat::Sentinel,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the slot grid
    List {
        /// Print every slot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every field of one slot
    Show { slot: usize },

    /// Write metadata (and optionally a ROM) into a slot
    Save(SaveArgs),

    /// Zero a slot's metadata so the console treats it as empty
    Erase { slot: usize },

    /// Copy a slot's ROM payload to a file
    Dump {
        slot: usize,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Bytes to copy
        #[arg(long, default_value_t = MAX_ROM_SIZE)]
        len: usize,
    },

    /// Create a zero-filled card image sized for the configured grid
    Init,

    /// Print the font table line for a 5x5 glyph drawn in a text file
    Font { glyph: PathBuf },

    /// Render a captured 1024-byte display frame as text
    Frame { dump: PathBuf },
}

#[derive(Args, Debug)]
struct SaveArgs {
    slot: usize,

    /// Cartridge title (ASCII)
    #[arg(short, long)]
    title: Option<String>,

    /// ROM file to copy into the slot payload
    #[arg(short, long)]
    rom: Option<PathBuf>,

    #[arg(long)]
    cpu_freq: Option<u32>,

    #[arg(long)]
    timer_freq: Option<u8>,

    #[arg(long)]
    display_freq: Option<u8>,

    /// Replace the quirk set; repeat for each quirk (e.g. --quirk jump)
    #[arg(long = "quirk", value_parser = parse_quirk)]
    quirks: Vec<Quirk>,

    /// Clear every quirk
    #[arg(long, conflicts_with = "quirks")]
    no_quirks: bool,

    /// Keys for each button as hex digits, e.g. --left 4,7
    #[arg(long, value_parser = parse_map)]
    left: Option<ButtonMap>,
    #[arg(long, value_parser = parse_map)]
    right: Option<ButtonMap>,
    #[arg(long, value_parser = parse_map)]
    up: Option<ButtonMap>,
    #[arg(long, value_parser = parse_map)]
    down: Option<ButtonMap>,
    #[arg(long, value_parser = parse_map)]
    a: Option<ButtonMap>,
    #[arg(long, value_parser = parse_map)]
    b: Option<ButtonMap>,
}

fn parse_quirk(s: &str) -> Result<Quirk, String> {
    s.parse().map_err(|e: chipngo_cart::CartError| e.to_string())
}

fn parse_map(s: &str) -> Result<ButtonMap, String> {
    s.parse().map_err(|e: chipngo_cart::CartError| e.to_string())
}

impl SaveArgs {
    /// Apply the given fields on top of the slot's current record
    fn apply(&self, current: &CartridgeRecord) -> anyhow::Result<CartridgeRecord> {
        let mut record = current.clone();

        match &self.title {
            Some(title) => record.title = title.clone(),
            None if !current.valid => bail!("slot {} is empty; --title is required", self.slot),
            None => {
                // Stored titles may carry garbage after the NUL padding
                let kept = current.title.split('\0').next().unwrap_or_default();
                if !kept.is_ascii() {
                    bail!(
                        "slot {} title {:?} is not ASCII; pass --title to replace it",
                        self.slot,
                        kept
                    );
                }
                record.title = kept.to_string();
            }
        }
        record.valid = true;

        if let Some(v) = self.cpu_freq {
            record.cpu_freq = v;
        }
        if let Some(v) = self.timer_freq {
            record.timer_freq = v;
        }
        if let Some(v) = self.display_freq {
            record.display_freq = v;
        }

        if self.no_quirks || !self.quirks.is_empty() {
            record.quirks = Default::default();
            for quirk in &self.quirks {
                record.quirks.set(*quirk, true);
            }
        }

        let maps = [
            (&mut record.left, self.left),
            (&mut record.right, self.right),
            (&mut record.up, self.up),
            (&mut record.down, self.down),
            (&mut record.a, self.a),
            (&mut record.b, self.b),
        ];
        for (target, new) in maps {
            if let Some(map) = new {
                *target = map;
            }
        }

        Ok(record)
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ToolConfig> {
    let mut config = match &cli.config {
        Some(path) => ToolConfig::load(path)
            .with_context(|| format!("Unable to read config {}", path.display()))?,
        None => ToolConfig::default(),
    };

    if let Some(device) = &cli.device {
        config.device = Some(device.clone());
    }
    if let Some(format) = cli.format {
        config.record.format = format.into();
    }
    if cli.strict_title {
        config.record.title_policy = TitlePolicy::Strict;
    }
    Ok(config)
}

fn open_library(config: &ToolConfig, create: bool) -> anyhow::Result<Library> {
    let Some(device) = &config.device else {
        bail!("no SD card given; pass --device or set `device` in the config");
    };

    let mut builder = LibraryBuilder::new().config(config);
    if create {
        builder = builder.create_image();
    }
    builder
        .build()
        .with_context(|| format!("Unable to open SD card {}", device.display()))
}

fn print_grid(library: &Library) {
    let geometry: &Geometry = library.geometry();
    for row in 0..geometry.rows {
        let cells: Vec<String> = (0..geometry.cols)
            .filter_map(|col| geometry.slot_at(row, col))
            .map(|slot| {
                let record = &library.records()[slot];
                let marker = if record.valid { '*' } else { ' ' };
                format!("{:>2}{}{:<11}", slot, marker, record.title)
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn print_record(record: &CartridgeRecord) {
    println!("Slot:          {}", record.slot);
    if !record.valid {
        println!("Status:        empty");
        return;
    }
    println!(
        "Status:        {}",
        if record.complete { "complete" } else { "legacy (no trailer)" }
    );
    println!("Title:         {}", record.title);
    println!("CPU freq:      {} Hz", record.cpu_freq);
    println!("Timer freq:    {} Hz", record.timer_freq);
    println!("Display freq:  {} Hz", record.display_freq);

    println!("Quirks:");
    let mut any = false;
    for quirk in record.quirks.enabled() {
        println!("  {:<24} {}", quirk.name(), quirk.description());
        any = true;
    }
    if !any {
        println!("  (none)");
    }

    println!("Button maps:");
    let names = ["Left", "Right", "Up", "Down", "A", "B"];
    for (name, map) in names.iter().zip(record.button_maps()) {
        println!("  {:<6} {:#06x}  [{}]", name, map.bits(), map);
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::List { json } => {
            let library = open_library(&config, false)?;
            if *json {
                let summaries: Vec<SlotSummary> =
                    library.records().iter().map(SlotSummary::from).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_grid(&library);
            }
        }

        Command::Show { slot } => {
            let library = open_library(&config, false)?;
            print_record(library.record(*slot)?);
        }

        Command::Save(args) => {
            let mut library = open_library(&config, false)?;
            let record = args.apply(library.record(args.slot)?)?;
            match &args.rom {
                Some(rom) => library
                    .save_from_file(args.slot, &record, rom)
                    .with_context(|| format!("ROM data not saved from {}", rom.display()))?,
                None => library.save(args.slot, &record, None)?,
            }
            library.sync()?;
            print_record(library.record(args.slot)?);
        }

        Command::Erase { slot } => {
            let mut library = open_library(&config, false)?;
            library.erase(*slot)?;
            library.sync()?;
        }

        Command::Dump { slot, out, len } => {
            let mut library = open_library(&config, false)?;
            let rom = library.dump_rom(*slot, *len)?;
            std::fs::write(out, &rom)
                .with_context(|| format!("Unable to write {}", out.display()))?;
            info!("Dumped {} bytes from slot {} to {:?}", rom.len(), slot, out);
        }

        Command::Init => {
            let library = open_library(&config, true)?;
            info!(
                "Created {} empty slots at {:?}",
                library.records().len(),
                library.device_path()
            );
        }

        Command::Font { glyph } => {
            let text = std::fs::read_to_string(glyph)
                .with_context(|| format!("Unable to read glyph {}", glyph.display()))?;
            let glyph: Glyph = text.parse()?;
            print!("{}", glyph);
            println!("{}", glyph.hex_line());
        }

        Command::Frame { dump } => {
            let bytes = std::fs::read(dump)
                .with_context(|| format!("Unable to read frame {}", dump.display()))?;
            let frame = DisplayFrame::from_bytes(&bytes)?;
            print!("{}", frame.to_ascii());
        }
    }

    Ok(())
}
