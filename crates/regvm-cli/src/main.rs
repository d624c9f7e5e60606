//! Register VM - CLI
//!
//! Loads stored bytecode and either executes it or prints its disassembly.
//!
//! Usage: `regvm run <file> [-r 8|16|32] [-e LABEL] [--disassemble]`
//!        `regvm generate <file>`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use regvm_core::config::DEFAULT_ENTRY_LABEL;
use regvm_core::{
    render, BytecodeLoader, BytecodeWriter, InstructionBuffer, OpCode, Program, RegisterCount,
    RunMode, VirtualMachine, VmConfig, VmResult,
};

#[derive(Parser, Debug)]
#[command(name = "regvm")]
#[command(about = "Execute or disassemble register VM bytecode")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a bytecode file and run it
    Run {
        /// Path to the bytecode file
        path: PathBuf,

        /// Register file size (8, 16 or 32)
        #[arg(short = 'r', long = "registers", default_value_t = 16)]
        registers: usize,

        /// Label to start execution at
        #[arg(short = 'e', long = "entry", default_value = DEFAULT_ENTRY_LABEL)]
        entry: String,

        /// Only print the disassembly
        #[arg(long)]
        disassemble: bool,
    },

    /// Write a sample bytecode file
    Generate {
        /// Output path
        path: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,regvm_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run {
            path,
            registers,
            entry,
            disassemble,
        } => build_config(registers, entry, disassemble).and_then(|config| run(&path, &config)),
        Command::Generate { path } => generate(&path),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Settings are validated here, before anything is loaded.
fn build_config(registers: usize, entry: String, disassemble: bool) -> VmResult<VmConfig> {
    let mode = if disassemble {
        RunMode::Disassemble
    } else {
        RunMode::Execute
    };

    Ok(VmConfig::new()
        .with_registers(RegisterCount::try_from(registers)?)
        .with_entry_label(entry)
        .with_mode(mode))
}

fn run(path: &Path, config: &VmConfig) -> VmResult<()> {
    let bytes = fs::read(path)?;
    let program = BytecodeLoader::load(&bytes)?;
    debug!(path = %path.display(), ?config, "program loaded");

    match config.mode {
        RunMode::Disassemble => {
            print!("{}", render(&program.code));
            Ok(())
        }
        RunMode::Execute => {
            let stdout = io::stdout();
            let mut vm = VirtualMachine::new(config, &program, stdout.lock())?;
            vm.execute()
        }
    }
}

fn generate(path: &Path) -> VmResult<()> {
    let bytes = BytecodeWriter::encode(&sample_program())?;
    fs::write(path, bytes)?;
    info!(path = %path.display(), "wrote sample bytecode");
    Ok(())
}

/// Counts down from 5 while summing into r2, then prints 15.0 / 5.0.
fn sample_program() -> Program {
    let mut code = InstructionBuffer::new();
    code.push_opcode(OpCode::Noop);

    // r0 = 5 (counter), r1 = 1 (step), r2 = 0 (sum)
    let start = code.push_opcode(OpCode::Cil);
    code.push_integer(5);
    code.push_integer(0);
    code.push_opcode(OpCode::Cil);
    code.push_integer(1);
    code.push_integer(1);
    code.push_opcode(OpCode::Cil);
    code.push_integer(0);
    code.push_integer(2);

    let body = code.push_opcode(OpCode::Ofv);
    code.push_integer(0);
    code.push_opcode(OpCode::Onl);
    code.push_opcode(OpCode::Add);
    code.push_integer(0);
    code.push_integer(2);
    code.push_opcode(OpCode::Sub);
    code.push_integer(1);
    code.push_integer(0);
    code.push_opcode(OpCode::Cmpz);
    code.push_integer(0);
    code.push_opcode(OpCode::Jgt);
    code.push_integer(body as i64);

    // 15 / 5 as floats
    code.push_opcode(OpCode::Cfl);
    code.push_float(15.0);
    code.push_integer(3);
    code.push_opcode(OpCode::Cfl);
    code.push_float(5.0);
    code.push_integer(4);
    code.push_opcode(OpCode::Div);
    code.push_integer(4);
    code.push_integer(3);
    code.push_opcode(OpCode::Ofv);
    code.push_integer(3);
    code.push_opcode(OpCode::Onl);
    code.push_opcode(OpCode::Halt);

    Program::new(code)
        .with_label(DEFAULT_ENTRY_LABEL, start)
        .with_label("loop", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_program_runs() {
        let program = sample_program();
        let config = VmConfig::new();
        let mut vm = VirtualMachine::new(&config, &program, Vec::new()).expect("vm");
        vm.execute().expect("execution failed");
        assert_eq!(vm.into_output(), b"5\n4\n3\n2\n1\n3.0\n".to_vec());
    }

    #[test]
    fn sample_program_survives_storage() {
        let program = sample_program();
        let bytes = BytecodeWriter::encode(&program).expect("encode failed");
        let loaded = BytecodeLoader::load(&bytes).expect("load failed");
        assert_eq!(loaded, program);
    }

    #[test]
    fn unsupported_register_count_rejected() {
        assert!(build_config(12, "start".to_string(), false).is_err());
        let cfg = build_config(32, "loop".to_string(), true).expect("config");
        assert_eq!(cfg.register_count, RegisterCount::R32);
        assert_eq!(cfg.mode, RunMode::Disassemble);
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from(["regvm", "run", "prog.rgvm", "-r", "8", "-e", "loop", "--disassemble"])
            .expect("parse");
        match cli.command {
            Command::Run { path, registers, entry, disassemble } => {
                assert_eq!(path, PathBuf::from("prog.rgvm"));
                assert_eq!(registers, 8);
                assert_eq!(entry, "loop");
                assert!(disassemble);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
