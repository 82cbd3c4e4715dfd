use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use threadstate_core::constants::{
    ARM_CPSR_INDEX, ARM_FPSCR_INDEX, ARM_GENERAL_REGISTER_COUNT, ARM_PC_INDEX, ARM_SP_INDEX, ARM_THREAD_STATE_COUNT,
    ARM_VFP_STATE_COUNT, RawFlavor,
};
use threadstate_core::prelude::*;
use threadstate_utils::{debug, info, init_logging_with, LogConfig, LogFormat, LogLevel};

/// Inspect the ARM thread-state flavor catalog and exercise the state accessors.
#[derive(Parser, Debug)]
#[command(name = "threadstate")]
#[command(version)]
#[command(about = "Inspect the ARM thread-state flavor catalog and control-word sanitizer", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true, value_parser = LogLevel::from_str)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json (overrides THREADSTATE_LOG_FORMAT)
    #[arg(long, global = true, value_parser = LogFormat::from_str)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List the flavors a caller can query, with their word counts
    Flavors
    {
        /// Use the extended list (includes the exception flavor)
        #[arg(long, default_value_t = false)]
        extended: bool,
    },
    /// Show what the sanitizer does to a status word
    Sanitize
    {
        /// Status word (hex format: 0x600001d3 or decimal)
        #[arg(value_parser = parse_word)]
        word: u32,
    },
    /// Load a sample thread context through the setters and print every flavor
    Dump
    {
        /// Also print the raw word buffers
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
}

fn main()
{
    let cli = Cli::parse();

    let mut config = LogConfig::from_env();
    if let Some(level) = cli.log_level {
        config = config.with_level(level);
    }
    if let Some(format) = cli.log_format {
        config = config.with_format(format);
    }

    // Keep the file writer alive until exit
    let _guard = match init_logging_with(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(&cli.command) {
        eprintln!("Error: {} (kern_return {})", e, KernReturn::from(&e).code());
        process::exit(1);
    }
}

fn run_command(command: &Commands) -> StateResult<()>
{
    match command {
        Commands::Flavors { extended } => print_flavors(*extended),
        Commands::Sanitize { word } => {
            print_sanitized(*word);
            Ok(())
        }
        Commands::Dump { raw } => dump_sample(*raw),
    }
}

/// Parse a 32-bit word given in hex (`0x` prefix) or decimal
fn parse_word(input: &str) -> Result<u32, String>
{
    let trimmed = input.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid status word '{}': {}", input, e))
}

fn print_flavors(extended: bool) -> StateResult<()>
{
    let list = if extended {
        StateFlavor::FlavorListExtended
    } else {
        StateFlavor::FlavorList
    };

    // Query the list the same way a caller would, through the raw entry point
    let mut codes = vec![0u32; list.required_count()];
    let written = get_state_raw(&ThreadContext::new(), list.raw(), &mut codes)?;
    debug!(%list, written, "queried flavor list");

    println!("{} ({} entries):", list, written);
    for &code in &codes[..written] {
        let flavor = StateFlavor::try_from(RawFlavor::try_from(code).unwrap_or(RawFlavor::MIN))?;
        println!("  {:>3}  {:<22} {:>3} words", flavor.raw(), flavor.to_string(), flavor.required_count());
    }
    Ok(())
}

fn print_sanitized(word: u32)
{
    let clean = sanitize_cpsr(word);
    println!("input:     0x{:08x}", word);
    println!("sanitized: 0x{:08x}", clean);
    println!("cleared:   0x{:08x}", word & !clean);
    println!("user mode: {}", if is_user_cpsr(word) { "yes" } else { "no" });
}

fn dump_sample(raw: bool) -> StateResult<()>
{
    let mut context = ThreadContext::new();

    let mut gp = [0u32; ARM_THREAD_STATE_COUNT];
    for (word, index) in gp[..ARM_GENERAL_REGISTER_COUNT].iter_mut().zip(0u32..) {
        // r0..r12 hold recognizable patterns
        *word = 0x1111_1111u32.wrapping_mul(index);
    }
    gp[ARM_SP_INDEX] = thread_userstackdefault().value();
    gp[ARM_PC_INDEX] = 0x0000_8000;
    gp[ARM_CPSR_INDEX] = 0x6000_01d3; // SVC mode, IRQ and FIQ masked, Z and C set
    set_state(&mut context, StateFlavor::GeneralPurpose, &gp)?;

    let mut vfp = [0u32; ARM_VFP_STATE_COUNT];
    vfp[0] = 0x3f80_0000; // 1.0f
    vfp[1] = 0x4000_0000; // 2.0f
    vfp[ARM_FPSCR_INDEX] = 0x0300_0000;
    set_state(&mut context, StateFlavor::FloatingPoint, &vfp)?;

    context.record_fault(ExceptionState {
        fsr: 0x0000_0005,
        far: 0xdead_0000,
        exception: 0,
    });
    info!("sample context loaded");

    for flavor in [
        StateFlavor::GeneralPurpose,
        StateFlavor::FloatingPoint,
        StateFlavor::Exception,
    ] {
        let mut words = vec![0u32; flavor.required_count()];
        let written = get_state(&context, flavor, &mut words)?;
        println!("== {} ({} words) ==", flavor, written);
        match flavor {
            StateFlavor::GeneralPurpose => println!("{}", GeneralPurposeState::from_words(&words)?),
            StateFlavor::FloatingPoint => println!("{}", FloatingPointState::from_words(&words)?),
            StateFlavor::Exception => println!("{}", ExceptionState::from_words(&words)?),
            _ => {}
        }
        if raw {
            print_words(&words[..written]);
        }
    }

    let mut gp_words = [0u32; ARM_THREAD_STATE_COUNT];
    get_state(&context, StateFlavor::GeneralPurpose, &mut gp_words)?;
    println!("== ancillary ==");
    println!("user stack:  {}", thread_userstack(StateFlavor::GeneralPurpose.raw(), &gp_words)?);
    println!("entry point: {}", thread_entrypoint(StateFlavor::GeneralPurpose.raw(), &gp_words)?);
    Ok(())
}

fn print_words(words: &[u32])
{
    for (row, chunk) in words.chunks(8).enumerate() {
        let line: Vec<String> = chunk.iter().map(|w| format!("{:08x}", w)).collect();
        println!("  {:>3}: {}", row * 8, line.join(" "));
    }
}
