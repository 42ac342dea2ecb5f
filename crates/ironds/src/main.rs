use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use ironds_core::error::IrondsResult;
use ironds_core::names::{
    errno_name, lookup_errno, lookup_ptrace_request, lookup_signal, ptrace_request_name, signal_code_name, signal_name,
};
use ironds_core::types::{Architecture, CpuState};
use ironds_utils::{init_logging_with, LogConfig, LogFormat, LogLevel};

/// Process-control backend of the ironds debug server.
#[derive(Parser, Debug)]
#[command(name = "ironds")]
#[command(version)]
#[command(about = "Inspect signals, errno values, ptrace requests and live register state", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log output format (overrides IRONDS_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Name of a signal number
    Signal
    {
        #[arg(value_parser = parse_code, allow_hyphen_values = true)]
        signal: i32,
    },
    /// Name of a signal's si_code
    SignalCode
    {
        #[arg(value_parser = parse_code, allow_hyphen_values = true)]
        signal: i32,
        #[arg(value_parser = parse_code, allow_hyphen_values = true)]
        code: i32,
    },
    /// Name of an errno value
    Errno
    {
        #[arg(value_parser = parse_code, allow_hyphen_values = true)]
        error: i32,
    },
    /// Name of a ptrace request (decimal or 0x-prefixed hex)
    Ptrace
    {
        #[arg(value_parser = parse_code, allow_hyphen_values = true)]
        request: i32,
    },
    /// List every name this host knows
    List
    {
        #[arg(value_enum)]
        table: Table,
    },
    /// Attach to a process, print its registers, and detach
    Regs
    {
        /// Process ID (PID) to attach to
        pid: u32,
        /// Thread to read instead of the main thread
        #[arg(long)]
        tid: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Table
{
    Signals,
    Errnos,
    Ptrace,
}

fn main()
{
    let cli = Cli::parse();

    let mut config = match LogConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };
    if let Some(level) = cli.log_level {
        config = config.with_level(level);
    }
    if let Some(format) = cli.log_format {
        config = config.with_format(format);
    }
    let guard = match init_logging_with(config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    let result = run_command(cli.command);
    drop(guard);
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Commands) -> IrondsResult<()>
{
    match command {
        Commands::Signal { signal } => println!("{}", signal_name(signal)),
        Commands::SignalCode { signal, code } => println!("{}", signal_code_name(signal, code)),
        Commands::Errno { error } => println!("{}", errno_name(error)),
        Commands::Ptrace { request } => println!("{}", ptrace_request_name(request)),
        Commands::List { table } => {
            for (code, name) in known_names(table) {
                println!("{code:>6}  {name}");
            }
        }
        Commands::Regs { pid, tid } => show_registers(pid, tid)?,
    }

    Ok(())
}

/// Accept decimal, `0x` hex, and negative values.
fn parse_code(value: &str) -> Result<i32, String>
{
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|e| format!("invalid number '{value}': {e}"))?;

    let signed = if negative { -parsed } else { parsed };
    i32::try_from(signed).map_err(|_| format!("'{value}' is out of range"))
}

fn known_names(table: Table) -> Vec<(i32, &'static str)>
{
    let named = |codes: &mut dyn Iterator<Item = i32>, lookup: fn(i32) -> Option<&'static str>| {
        codes.filter_map(|code| lookup(code).map(|name| (code, name))).collect::<Vec<_>>()
    };

    match table {
        Table::Signals => named(&mut (1..=64), lookup_signal),
        Table::Errnos => named(&mut (1..=256), lookup_errno),
        // Classic requests are small; the extended ones start at 0x4200.
        Table::Ptrace => named(&mut (0..=64).chain(0x4200..=0x4240), lookup_ptrace_request),
    }
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
fn show_registers(pid: u32, tid: Option<u32>) -> IrondsResult<()>
{
    use ironds_core::accessor::CpuStateAccessor;
    use ironds_core::platform::linux::{AttachGuard, ProcfsResolver, PtraceTracer};
    use ironds_core::types::{EntityId, ProcessId, ThreadId};
    use ironds_utils::info;

    let pid = ProcessId(pid);
    let entity = match tid {
        Some(tid) => EntityId::thread(pid, ThreadId(tid)),
        None => EntityId::process(pid),
    };

    // Only the named thread is traced; its siblings keep running.
    let attached = AttachGuard::attach_entity(entity)?;
    info!("Reading registers of {entity}");

    let tracer = PtraceTracer::new();
    let mut accessor = CpuStateAccessor::new(tracer, ProcfsResolver::new(), tracer.architecture());
    let state = accessor.read_cpu_state(entity)?;
    accessor.release(entity);
    attached.detach()?;

    print_cpu_state(&state);
    Ok(())
}

#[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
fn show_registers(_pid: u32, _tid: Option<u32>) -> IrondsResult<()>
{
    Err(ironds_core::error::IrondsError::InvalidArgument(
        "register access needs the Linux x86 ptrace backend".to_string(),
    ))
}

#[cfg_attr(
    not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))),
    allow(dead_code)
)]
fn print_cpu_state(state: &CpuState)
{
    let gp = &state.gp;
    println!("Architecture: {}", state.architecture());
    println!("\nGeneral purpose:");
    match state.architecture() {
        Architecture::X86 => {
            for (name, value) in [
                ("eax", gp.rax),
                ("ebx", gp.rbx),
                ("ecx", gp.rcx),
                ("edx", gp.rdx),
                ("esi", gp.rsi),
                ("edi", gp.rdi),
                ("ebp", gp.rbp),
                ("esp", gp.rsp),
                ("eip", gp.rip),
                ("eflags", gp.rflags),
                ("orig_eax", gp.orig_rax),
            ] {
                println!("  {name:<8} 0x{value:08x}");
            }
        }
        Architecture::X86_64 => {
            for (name, value) in [
                ("rax", gp.rax),
                ("rbx", gp.rbx),
                ("rcx", gp.rcx),
                ("rdx", gp.rdx),
                ("rsi", gp.rsi),
                ("rdi", gp.rdi),
                ("rbp", gp.rbp),
                ("rsp", gp.rsp),
                ("r8", gp.r8),
                ("r9", gp.r9),
                ("r10", gp.r10),
                ("r11", gp.r11),
                ("r12", gp.r12),
                ("r13", gp.r13),
                ("r14", gp.r14),
                ("r15", gp.r15),
                ("rip", gp.rip),
                ("rflags", gp.rflags),
                ("fs_base", gp.fs_base),
                ("gs_base", gp.gs_base),
                ("orig_rax", gp.orig_rax),
            ] {
                println!("  {name:<8} 0x{value:016x}");
            }
        }
    }
    println!(
        "  cs=0x{:x} ss=0x{:x} ds=0x{:x} es=0x{:x} fs=0x{:x} gs=0x{:x}",
        gp.cs, gp.ss, gp.ds, gp.es, gp.fs, gp.gs
    );

    let x87 = &state.x87;
    println!("\nx87:");
    println!(
        "  fctw=0x{:04x} fstw=0x{:04x} ftag=0x{:04x} fop=0x{:04x}",
        x87.fctw, x87.fstw, x87.ftag, x87.fop
    );
    println!(
        "  fip={:04x}:{:x} fdp={:04x}:{:x}",
        x87.fiseg, x87.fioff, x87.foseg, x87.fooff
    );
    for (index, reg) in x87.regs.iter().enumerate() {
        // Most significant byte first, the way the value reads.
        let hex: String = reg.significant().iter().rev().map(|b| format!("{b:02x}")).collect();
        println!("  st{index}      0x{hex}");
    }

    let sse = &state.sse;
    let xmm_count = match state.architecture() {
        Architecture::X86 => 8,
        Architecture::X86_64 => sse.regs.len(),
    };
    println!("\nSSE:");
    println!("  mxcsr=0x{:08x} mask=0x{:08x}", sse.mxcsr, sse.mxcsrmask);
    for (index, reg) in sse.regs.iter().take(xmm_count).enumerate() {
        println!("  xmm{index:<5} 0x{:032x}", reg.as_u128());
    }
}
