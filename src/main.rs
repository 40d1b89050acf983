use std::path::PathBuf;

use clap::{Parser, Subcommand};
use intcode::arcade::Arcade;
use intcode::fuzz::{FuzzConfig, fuzz};
use intcode::robot::{Colour, Robot};
use intcode::{Machine, Result, amplifier, disasm, explore, probe, program};

#[derive(Parser)]
#[command(name = "intcode", about = "Intcode virtual machine and drivers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a program to completion or until it needs more input.
    Run {
        program: PathBuf,
        /// Comma-separated input values.
        #[arg(long, default_value = "")]
        input: String,
        /// Print the final tape.
        #[arg(long)]
        dump: bool,
    },
    /// Print a disassembly of a program.
    Disasm { program: PathBuf },
    /// Scan a drone program over a grid, one fresh machine per point.
    Probe {
        program: PathBuf,
        #[arg(long, default_value_t = 50)]
        width: usize,
        #[arg(long, default_value_t = 50)]
        height: usize,
        /// Also find the first square of this size inside the beam.
        #[arg(long)]
        square: Option<i64>,
        /// Rows to search for the square.
        #[arg(long, default_value_t = 10_000)]
        max_rows: i64,
    },
    /// Map a droid program by breadth-first search over forked machines.
    Explore {
        program: PathBuf,
        #[arg(long)]
        render: bool,
    },
    /// Play an arcade program, keeping the paddle under the ball.
    Arcade {
        program: PathBuf,
        /// Insert quarters (set cell 0 to 2) before playing.
        #[arg(long)]
        free_play: bool,
    },
    /// Run an amplifier chain over every ordering of the phase settings.
    Amplify {
        program: PathBuf,
        /// Comma-separated phase settings.
        #[arg(long, default_value = "0,1,2,3,4")]
        phases: String,
        /// Wire the last amplifier back into the first.
        #[arg(long)]
        feedback: bool,
    },
    /// Run a hull painting robot.
    Paint {
        program: PathBuf,
        /// Start on a white panel.
        #[arg(long)]
        white: bool,
    },
    /// Run seeded random programs under a step budget.
    Fuzz {
        /// Random seed for reproducibility.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Number of programs to run.
        #[arg(long, default_value_t = 1 << 12)]
        programs: usize,
        /// Cells per program.
        #[arg(long, default_value_t = 64)]
        program_size: usize,
        /// Max instructions per program.
        #[arg(long, default_value_t = 1 << 13)]
        step_limit: usize,
        /// Probability that a generated cell is an instruction header.
        #[arg(long, default_value_t = 0.4)]
        header_rate: f64,
        /// Print throughput stats.
        #[arg(long)]
        benchmark: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = dispatch(cli.command) {
        if e.is_fault() {
            eprintln!("machine fault: {e}");
        } else {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

fn join(values: &[i64]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run { program: path, input, dump } => {
            let mut machine = Machine::new(program::load(&path)?);
            let state = machine.run(program::parse_inputs(&input)?)?;
            println!("{}", join(machine.output()));
            eprintln!("state: {state:?}");
            if dump {
                println!("{}", join(machine.tape().as_slice()));
                for (address, cell) in machine.tape().sparse_cells() {
                    println!("{address}: {cell}");
                }
            }
        }
        Command::Disasm { program: path } => {
            print!("{}", disasm::disassemble(&program::load(&path)?));
        }
        Command::Probe { program: path, width, height, square, max_rows } => {
            let image = program::load(&path)?;
            let grid = probe::scan(&image, width, height)?;
            print!("{}", probe::render(&grid));
            println!("pulled: {}", probe::pulled(&grid));
            if let Some(size) = square {
                match probe::fit_square(&image, size, max_rows)? {
                    Some((x, y)) => println!("square {size}: ({x}, {y})"),
                    None => println!("square {size}: not found in {max_rows} rows"),
                }
            }
        }
        Command::Explore { program: path, render } => {
            let result = explore::explore(&Machine::new(program::load(&path)?))?;
            if render {
                print!("{}", result.render());
            }
            match &result.target {
                Some(found) => {
                    println!("target {:?} at distance {}", found.position, found.distance);
                    if let Some(minutes) = result.fill_time() {
                        println!("fill time: {minutes}");
                    }
                }
                None => println!("no target reachable ({} cells explored)", result.map.len()),
            }
        }
        Command::Arcade { program: path, free_play } => {
            let mut image = program::load(&path)?;
            if free_play && !image.is_empty() {
                image[0] = 2;
            }
            let mut arcade = Arcade::new(Machine::new(image));
            if free_play {
                println!("score: {}", arcade.play()?);
            } else {
                arcade.boot()?;
                print!("{}", arcade.render());
                println!("blocks: {}", arcade.blocks());
            }
        }
        Command::Amplify { program: path, phases, feedback } => {
            let image = program::load(&path)?;
            let phases = program::parse_inputs(&phases)?;
            let best = if feedback {
                amplifier::best_feedback(&image, &phases)?
            } else {
                amplifier::best_chain(&image, &phases)?
            };
            if let Some((signal, order)) = best {
                println!("{signal} (phases {})", join(&order));
            }
        }
        Command::Paint { program: path, white } => {
            let mut robot = Robot::new(Machine::new(program::load(&path)?));
            if white {
                robot = robot.starting_on(Colour::White);
            }
            robot.run()?;
            print!("{}", robot.render());
            println!("painted: {}", robot.painted());
        }
        Command::Fuzz { seed, programs, program_size, step_limit, header_rate, benchmark } => {
            let config = FuzzConfig {
                programs,
                program_size,
                step_limit,
                header_rate,
                seed,
            };
            let start = std::time::Instant::now();
            let report = fuzz(&config);
            let elapsed = start.elapsed();

            println!("outcome,count");
            println!("halted,{}", report.halted);
            println!("exhausted,{}", report.exhausted);
            println!("unknown_opcode,{}", report.unknown_opcode);
            println!("invalid_address,{}", report.invalid_address);
            println!("invalid_mode,{}", report.invalid_mode);
            println!("invalid_write_mode,{}", report.invalid_write_mode);
            println!("overflow,{}", report.overflow);
            println!("other,{}", report.other);

            if benchmark {
                let steps_per_sec = report.steps as f64 / elapsed.as_secs_f64();
                eprintln!("Benchmark results:");
                eprintln!("  Programs:          {programs}");
                eprintln!("  Instructions:      {}", report.steps);
                eprintln!("  Outputs:           {}", report.outputs);
                eprintln!("  Elapsed:           {elapsed:.2?}");
                eprintln!("  Instructions/sec:  {steps_per_sec:.0}");
            }
        }
    }
    Ok(())
}
