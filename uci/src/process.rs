use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::debug;

use super::commands::{EngineOutput, GoParams, Info, UciCommand};
use super::decoder::Decoder;
use super::encoder::Encoder;

/// Outcome of one `go` on a spawned engine.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Last complete info line per MultiPV index, ordered by index.
    pub lines: Vec<Info>,
    pub best_move: String,
}

/// A UCI engine running as a child process, driven over its stdin/stdout.
pub struct EngineProcess {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    encoder: Encoder,
    decoder: Decoder,
    name: Option<String>,
}

impl EngineProcess {
    /// Spawns the engine and completes the `uci`/`isready` handshake.
    pub fn spawn(path: &Path) -> io::Result<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine stdout unavailable"))?;

        let mut engine = Self {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            encoder: Encoder {},
            decoder: Decoder::new(),
            name: None,
        };
        engine.handshake()?;

        Ok(engine)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn send(&mut self, command: &UciCommand) -> io::Result<()> {
        let line = self.encoder.encode(command);
        debug!("Engine <- {:?}", line);

        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()
    }

    pub fn read(&mut self) -> io::Result<EngineOutput> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "engine closed its output",
            ));
        }

        let line = line.trim();
        debug!("Engine -> {:?}", line);

        Ok(self.decoder.decode(line))
    }

    fn handshake(&mut self) -> io::Result<()> {
        self.send(&UciCommand::Uci)?;
        loop {
            match self.read()? {
                EngineOutput::IdName(name) => self.name = Some(name),
                EngineOutput::UciOk => break,
                _ => {}
            }
        }
        self.sync()
    }

    /// Blocks until the engine has processed everything sent so far.
    pub fn sync(&mut self) -> io::Result<()> {
        self.send(&UciCommand::IsReady)?;
        while self.read()? != EngineOutput::ReadyOk {}
        Ok(())
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.send(&UciCommand::SetOption {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    pub fn new_game(&mut self) -> io::Result<()> {
        self.send(&UciCommand::UciNewGame)?;
        self.sync()
    }

    /// Searches `fen` (after `moves`) and collects the final line of every MultiPV slot.
    pub fn search(&mut self, fen: &str, moves: &[String], params: GoParams) -> io::Result<SearchReport> {
        self.send(&UciCommand::Position {
            fen: fen.to_string(),
            moves: moves.to_vec(),
        })?;
        self.send(&UciCommand::Go(params))?;

        let mut report = SearchReport::default();
        loop {
            match self.read()? {
                EngineOutput::Info(info) if info.score.is_some() && !info.bound => {
                    let slot = info.multipv.unwrap_or(1).max(1) as usize;
                    if report.lines.len() < slot {
                        report.lines.resize(slot, Info::default());
                    }
                    report.lines[slot - 1] = info;
                }
                EngineOutput::BestMove { best_move, .. } => {
                    report.best_move = best_move;
                    break;
                }
                _ => {}
            }
        }

        // Slots the engine never filled (fewer legal moves than MultiPV)
        report.lines.retain(|info| info.score.is_some());

        Ok(report)
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        // Send quit command to gracefully shutdown the engine
        if self.send(&UciCommand::Quit).is_err() {
            // If we can't send quit, force kill the process
            let _ = self.child.kill();
            return;
        }

        // Give the engine a moment to quit gracefully
        std::thread::sleep(std::time::Duration::from_millis(50));

        match self.child.try_wait() {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => {
                let _ = self.child.kill();
                let _ = self.child.wait();
            }
        }
    }
}
